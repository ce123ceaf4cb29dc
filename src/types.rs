//! Shared types used across the selection and generation stages.

/// A status or progress update emitted while a run is in flight.
///
/// Components hand these to a caller-supplied `FnMut(Event)`; the CLI prints
/// them through [`output::format_event`](crate::output::format_event) and
/// tests collect them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The file selector matched `count` originals.
    FilesFound { count: usize },
    /// A style was dropped by the exclude list.
    StyleExcluded { name: String },
    StyleStarted { name: String },
    /// A progress threshold was crossed for a style.
    StyleProgress { name: String, percent: u32 },
    StyleFinished { name: String },
}
