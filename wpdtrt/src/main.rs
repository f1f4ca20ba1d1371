use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use wpdtrt::{
    api::HttpDataSource,
    cmd::{self, DataHandler, DepsHandler, OptionsHandler},
    config::DEFAULT_CONFIG_PATH,
    ctx::{PluginContext, config_dir},
};

/// Plugin options and dependency tool.
#[derive(Parser, Debug)]
#[command(name = "wpdtrt", version, about)]
struct Cli {
    /// Plugin config file.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect and edit settings page options.
    Options {
        #[command(subcommand)]
        action: OptionsAction,
    },
    /// Resolve plugin dependencies from a Composer manifest.
    Deps {
        #[command(subcommand)]
        action: DepsAction,
    },
    /// Load plugin data from its JSON API.
    Data {
        #[command(subcommand)]
        action: DataAction,
    },
    /// Print the JSON Schema of the plugin config file.
    Schema,
}

#[derive(Subcommand, Debug)]
enum DataAction {
    /// Fetch plugin data unless it is cached.
    Fetch {
        /// JSON endpoint (defaults to the config's `api_endpoint`).
        endpoint: Option<String>,
        #[arg(long)]
        state: Option<PathBuf>,
        /// Refetch even when data is cached.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum OptionsAction {
    /// Show every option with its current value.
    Show {
        /// Persisted options file (defaults to the config's state file).
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Set option values.
    Set {
        #[arg(long)]
        state: Option<PathBuf>,
        /// `KEY=VALUE` pairs.
        #[arg(required = true)]
        pairs: Vec<String>,
    },
    /// Clear every option value.
    Unset {
        #[arg(long)]
        state: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum DepsAction {
    /// List the dependencies a manifest declares.
    List {
        /// Path to composer.json (defaults to the config's manifest).
        manifest: Option<PathBuf>,
        /// Installer tag under `extra`.
        #[arg(long)]
        tag: Option<String>,
    },
    /// Declare the manifest's dependencies in the persisted options.
    Install {
        manifest: Option<PathBuf>,
        #[arg(long)]
        state: Option<PathBuf>,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Print the plugin entry files a unit-test bootstrap must load.
    Wpunit {
        manifest: Option<PathBuf>,
        /// Directory holding `vendor/` and `wp-content/`.
        #[arg(long, default_value = ".")]
        root: PathBuf,
        #[arg(long)]
        tag: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Options { action } => match action {
            OptionsAction::Show { state } => {
                let ctx = open(&cli.config, state)?;
                OptionsHandler::show(&ctx);
            }
            OptionsAction::Set { state, pairs } => {
                let mut ctx = open(&cli.config, state)?;
                OptionsHandler::set(&mut ctx, &pairs)?;
            }
            OptionsAction::Unset { state } => {
                let mut ctx = open(&cli.config, state)?;
                OptionsHandler::unset(&mut ctx)?;
            }
        },
        Commands::Deps { action } => match action {
            DepsAction::List { manifest, tag } => {
                let ctx = PluginContext::from_config_file(&cli.config)?;
                let manifest = manifest_or_default(&ctx, &cli.config, manifest);
                let tag = tag.unwrap_or_else(|| ctx.config.manifest_tag.clone());
                DepsHandler::list(&manifest, &tag)?;
            }
            DepsAction::Install {
                manifest,
                state,
                tag,
            } => {
                let mut ctx = open(&cli.config, state)?;
                if let Some(tag) = tag {
                    ctx.config.manifest_tag = tag;
                }
                let manifest = manifest_or_default(&ctx, &cli.config, manifest);
                DepsHandler::install(&mut ctx, &manifest)?;
            }
            DepsAction::Wpunit {
                manifest,
                root,
                tag,
            } => {
                let ctx = PluginContext::from_config_file(&cli.config)?;
                let manifest = manifest_or_default(&ctx, &cli.config, manifest);
                let tag = tag.unwrap_or_else(|| ctx.config.manifest_tag.clone());
                DepsHandler::wpunit(&manifest, &root, &tag)?;
            }
        },
        Commands::Data { action } => match action {
            DataAction::Fetch {
                endpoint,
                state,
                force,
            } => {
                let mut ctx = open(&cli.config, state)?;
                DataHandler::fetch(
                    &mut ctx,
                    &HttpDataSource::default(),
                    endpoint.as_deref(),
                    force,
                )?;
            }
        },
        Commands::Schema => cmd::print_schema()?,
    }

    Ok(())
}

/// Builds the context from the config file and merges the persisted state.
fn open(config: &Path, state: Option<PathBuf>) -> Result<PluginContext> {
    let mut ctx = PluginContext::from_config_file(config)?;
    if let Some(state) = state {
        ctx.state_path = state;
    }
    ctx.load()?;
    Ok(ctx)
}

fn manifest_or_default(ctx: &PluginContext, config: &Path, manifest: Option<PathBuf>) -> PathBuf {
    manifest.unwrap_or_else(|| ctx.config.manifest_path(&config_dir(config)))
}
