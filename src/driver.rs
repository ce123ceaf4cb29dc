//! The generation loop: every selected style × every selected original.
//!
//! ```text
//! for style in styles                      StyleStarted
//!     for (count, file) in files (1-based)
//!         destination = styles/<style>/<scheme>/<target>
//!         purge?  and exists  → delete
//!         missing             → materialize, maybe StyleProgress
//!         present             → skip
//!                                          StyleFinished
//! ```
//!
//! Skipping existing derivatives makes repeated runs cheap: a second run
//! without `--purge` generates nothing. There is no per-file isolation; the
//! first storage or imaging failure aborts the run and leaves whatever was
//! already written on disk.

use crate::imaging::{ImageBackend, Quality};
use crate::index::FileRecord;
use crate::progress::ProgressState;
use crate::storage::{PublicStore, StorageError};
use crate::style::{Style, StyleError};
use crate::types::Event;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Style error: {0}")]
    Style(#[from] StyleError),
}

/// What a run did, across all styles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub generated: u32,
    pub skipped: u32,
    pub purged: u32,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} generated, {} skipped", self.generated, self.skipped)?;
        if self.purged > 0 {
            write!(f, ", {} purged", self.purged)?;
        }
        Ok(())
    }
}

/// Drives derivative generation for one run.
pub struct Driver<'a, B: ImageBackend> {
    backend: &'a B,
    store: &'a PublicStore,
    quality: Quality,
    purge: bool,
    progress: ProgressState,
}

impl<'a, B: ImageBackend> Driver<'a, B> {
    pub fn new(backend: &'a B, store: &'a PublicStore, quality: Quality, purge: bool) -> Self {
        Self {
            backend,
            store,
            quality,
            purge,
            progress: ProgressState::new(),
        }
    }

    /// Generate missing derivatives of `files` for each of `styles`, in order.
    pub fn run(
        &mut self,
        styles: &[&Style],
        files: &[FileRecord],
        on_event: &mut impl FnMut(Event),
    ) -> Result<RunSummary, DriverError> {
        let mut summary = RunSummary::default();
        let total = files.len();

        for style in styles {
            on_event(Event::StyleStarted {
                name: style.name.clone(),
            });
            self.progress.start(&style.name);

            for (i, file) in files.iter().enumerate() {
                let count = i + 1;
                let destination = style.build_destination_uri(&file.uri);

                if self.purge && self.store.exists(&destination)? {
                    tracing::debug!(%destination, "purging derivative");
                    self.store.delete(&destination)?;
                    summary.purged += 1;
                }

                if self.store.exists(&destination)? {
                    tracing::debug!(%destination, "derivative exists, skipping");
                    summary.skipped += 1;
                    continue;
                }

                tracing::debug!(source = %file.uri, %destination, style = %style.name, "generating");
                style.materialize(
                    self.backend,
                    self.store,
                    &file.uri,
                    &destination,
                    self.quality,
                )?;
                summary.generated += 1;

                if let Some(percent) = self.progress.report(&style.name, count, total) {
                    on_event(Event::StyleProgress {
                        name: style.name.clone(),
                        percent,
                    });
                }
            }

            on_event(Event::StyleFinished {
                name: style.name.clone(),
            });
        }

        Ok(summary)
    }
}
