use clap::{Parser, Subcommand};
use derivgen::config::{self, DerivConfig};
use derivgen::driver::Driver;
use derivgen::imaging::RustBackend;
use derivgen::select::{self, FileFilter, SelectionCriteria};
use derivgen::types::Event;
use derivgen::{index, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "derivgen")]
#[command(about = "Batch-generate image style derivatives for a public file store")]
#[command(long_about = "\
Batch-generate image style derivatives for a public file store

Every JPEG, PNG and GIF original in the store gets one derivative per
configured style. Derivatives that already exist are left alone unless
--purge is given.

Store layout:

  files/                              # storage.root = public://
  ├── dawn.jpg                        # public://dawn.jpg
  ├── xyz/dusk.png                    # public://xyz/dusk.png
  └── styles/                         # derivatives (never treated as originals)
      └── thumbnail/public/
          ├── dawn.jpg
          └── xyz/dusk.png

Run 'derivgen gen-config' to generate a documented derivgen.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Store root directory (overrides storage.root)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// JSON file index (overrides index.path)
    #[arg(long, global = true)]
    index: Option<PathBuf>,

    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate missing derivatives
    Generate {
        /// Comma-delimited styles to process (default: all)
        styles: Option<String>,
        /// Comma-delimited styles to skip; wins over STYLES
        #[arg(long)]
        exclude: Option<String>,
        /// Directory scope: 'public' = store root only, otherwise a path prefix
        #[arg(long)]
        dir: Option<String>,
        /// Delete existing derivatives and regenerate them
        #[arg(long)]
        purge: bool,
    },
    /// List configured styles in processing order
    Styles,
    /// Show which originals a run would select
    Files {
        /// Directory scope: 'public' = store root only, otherwise a path prefix
        #[arg(long)]
        dir: Option<String>,
    },
    /// Print a stock derivgen.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let mut on_event = |event: Event| output::print_event(&event);

    match cli.command {
        Command::Generate {
            styles,
            exclude,
            dir,
            purge,
        } => {
            let criteria = SelectionCriteria::from_args(
                styles.as_deref(),
                exclude.as_deref(),
                dir.as_deref(),
                purge,
            );
            let store = config.store();
            let file_index = index::open(config.index.path.as_deref(), &store)?;
            let filter = FileFilter::new(store.scheme(), criteria.scope.clone());
            let files = select::select_files(&*file_index, &filter, &mut on_event)?;

            let registry = config.registry();
            let selected = select::select_styles(
                registry.load_all(),
                &criteria.includes,
                &criteria.excludes,
                &mut on_event,
            );

            let backend = RustBackend::new();
            let mut driver = Driver::new(&backend, &store, config.quality(), criteria.purge);
            let summary = driver.run(&selected, &files, &mut on_event)?;
            output::print_summary(&summary);
        }
        Command::Styles => {
            output::print_style_list(config.registry().load_all());
        }
        Command::Files { dir } => {
            let store = config.store();
            let file_index = index::open(config.index.path.as_deref(), &store)?;
            let filter = FileFilter::new(
                store.scheme(),
                select::DirectoryScope::from_option(dir.as_deref()),
            );
            let files = select::select_files(&*file_index, &filter, &mut on_event)?;
            output::print_file_list(&files);
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Load `--config` and apply the `--root` / `--index` overrides.
fn load_config(cli: &Cli) -> Result<DerivConfig, config::ConfigError> {
    let mut config = config::load_config(&cli.config)?;
    if let Some(root) = &cli.root {
        config.storage.root = root.clone();
    }
    if let Some(index) = &cli.index {
        config.index.path = Some(index.clone());
    }
    tracing::debug!(
        root = %config.storage.root.display(),
        styles = config.styles.len(),
        "configuration loaded"
    );
    Ok(config)
}

/// Diagnostics go to stderr so stdout stays the status report.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
