//! Photo Exporter - CLI
//!
//! Drives the export channel against the directory-backed library.

use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use photo_exporter::authorization::{AuthorizationStatus, PermissionPlatform};
use photo_exporter::config::ScopePreference;
use photo_exporter::desktop::{ConsolePermissions, DirectoryLibrary, PresetPermissions};
use photo_exporter::request::BYTES_ARGUMENT;
use photo_exporter::{ExporterConfig, ImageExporter, MainThread, MethodCall, MethodChannelRegistry, MethodValue};

#[derive(Parser)]
#[command(name = "photo-exporter")]
#[command(author = "Karen Tonoyan")]
#[command(version = photo_exporter::VERSION)]
#[command(about = "Photo Exporter - save PNG images into the photo library")]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Library directory, overrides the configuration
    #[arg(short, long)]
    library: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    Auto,
    AddOnly,
    Legacy,
}

impl From<ScopeArg> for ScopePreference {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Auto => ScopePreference::Auto,
            ScopeArg::AddOnly => ScopePreference::AddOnly,
            ScopeArg::Legacy => ScopePreference::Legacy,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Save a PNG file into the library
    Save {
        /// PNG file
        path: PathBuf,

        /// Preset authorization status; asks on the terminal when omitted
        #[arg(long)]
        status: Option<AuthorizationStatus>,

        /// Answer to the permission prompt when the status is preset
        #[arg(long, default_value = "denied")]
        answer: AuthorizationStatus,

        /// Authorization scope
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,

        /// Pretend the platform has no add-only scope
        #[arg(long)]
        legacy_platform: bool,

        /// Method name to call
        #[arg(long)]
        method: Option<String>,
    },

    /// List saved assets
    List,

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

/// Returns false when the reply was not a success
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = ExporterConfig::load_or_default(cli.config.as_deref())?;
    if let Some(library) = cli.library {
        config.library_path = library;
    }

    match cli.command {
        Commands::Save { path, status, answer, scope, legacy_platform, method } => {
            if let Some(scope) = scope {
                config.access_scope = scope.into();
            }

            let bytes = std::fs::read(&path)
                .with_context(|| format!("reading {}", path.display()))?;

            let platform: Arc<dyn PermissionPlatform> = match status {
                Some(status) => Arc::new(PresetPermissions::new(status, answer, !legacy_platform)),
                None => Arc::new(ConsolePermissions::new(!legacy_platform)),
            };
            let library = Arc::new(DirectoryLibrary::open(&config.library_path)?);

            let main_thread = Arc::new(MainThread::spawn("platform-main")?);
            let registry = MethodChannelRegistry::new(main_thread);
            let exporter = ImageExporter::for_platform(&config, platform, library).register(&registry);

            let method = method.unwrap_or_else(|| config.method_name.clone());
            let call = MethodCall::with_argument(method, BYTES_ARGUMENT, MethodValue::Bytes(bytes));

            let response = registry
                .invoke(exporter.channel_name(), call)
                .await
                .await
                .context("no reply received")?;

            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(response.is_success())
        }

        Commands::List => {
            let library = DirectoryLibrary::open(&config.library_path)?;
            let assets = library.list_assets()?;

            if assets.is_empty() {
                println!("No assets in {}", library.root().display());
            } else {
                println!("Assets in {} ({}):", library.root().display(), assets.len());
                println!("{:-<60}", "");
                for asset in assets {
                    println!(
                        "{} - {} ({} bytes, {})",
                        asset.id,
                        library.asset_path(&asset).display(),
                        asset.size,
                        asset.created_at.to_rfc3339()
                    );
                }
            }
            Ok(true)
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(true)
        }
    }
}
