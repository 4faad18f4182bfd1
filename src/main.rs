//! ndk-recipe - Android NDK package recipe
//!
//! Validates target settings, stages the NDK for the build machine and
//! prints the flags and environment a consuming build needs.

use std::path::PathBuf;
use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, error};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ndk_recipe::commands::{EnvCommand, FlagsCommand, InfoCommand, InstallCommand, Recipe, ValidateCommand};
use ndk_recipe::core::{ArmMode, BuildType, HostPlatform, RecipeConfig, RecipeError, RecipeVariant, StlLinkage};
use ndk_recipe::toolchain::ProgressCallback;

#[derive(Parser)]
#[command(name = "ndk-recipe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Stage the Android NDK and derive cross-compilation flags")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Recipe configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// NDK release (r19b, r19c)
    #[arg(long, global = true)]
    variant: Option<RecipeVariant>,

    /// Directory holding staged packages
    #[arg(long, global = true, value_name = "DIR")]
    package_root: Option<PathBuf>,

    /// Target operating system
    #[arg(long, global = true)]
    os: Option<String>,

    /// Target architecture (x86, x86_64, armv7, armv8)
    #[arg(long, global = true)]
    arch: Option<String>,

    /// Target API level
    #[arg(long, global = true)]
    api_level: Option<u32>,

    /// Compiler identity
    #[arg(long, global = true)]
    compiler: Option<String>,

    /// Compiler version
    #[arg(long, global = true)]
    compiler_version: Option<String>,

    /// Build type (Debug, Release)
    #[arg(long, global = true)]
    build_type: Option<BuildType>,

    /// C++ standard library linkage (static, shared)
    #[arg(long, global = true)]
    libcxx: Option<StlLinkage>,

    /// ARM instruction set for armv7 (thumb, arm)
    #[arg(long, global = true)]
    arm_mode: Option<ArmMode>,

    /// NEON for armv7
    #[arg(long, global = true)]
    neon: Option<bool>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the settings against what the NDK supports
    Validate,

    /// Download and stage the NDK for this machine
    Install {
        /// Replace an already staged package
        #[arg(long)]
        force: bool,
    },

    /// Print compiler/linker flags and exported variables as JSON
    Flags,

    /// Print shell exports for the toolchain environment
    Env {
        /// Also write a .env file
        #[arg(long, value_name = "FILE")]
        dotenv: Option<PathBuf>,

        /// Also write a shell script
        #[arg(long, value_name = "FILE")]
        script: Option<PathBuf>,
    },

    /// Show the staged package
    Info,
}

impl Cli {
    /// Command line values take precedence over the configuration file
    fn apply_overrides(&self, config: &mut RecipeConfig) {
        if let Some(variant) = self.variant {
            config.variant = variant;
        }
        if let Some(root) = &self.package_root {
            config.package_root = Some(root.clone());
        }
        let settings = &mut config.settings;
        if let Some(os) = &self.os {
            settings.os = os.clone();
        }
        if let Some(arch) = &self.arch {
            settings.arch = arch.clone();
        }
        if let Some(api_level) = self.api_level {
            settings.api_level = api_level;
        }
        if let Some(compiler) = &self.compiler {
            settings.compiler = compiler.clone();
        }
        if let Some(version) = &self.compiler_version {
            settings.compiler_version = version.clone();
        }
        if let Some(build_type) = self.build_type {
            settings.build_type = build_type;
        }
        let options = &mut config.options;
        if let Some(libcxx) = self.libcxx {
            options.libcxx = libcxx;
        }
        if let Some(arm_mode) = self.arm_mode {
            options.arm_mode = arm_mode;
        }
        if let Some(neon) = self.neon {
            options.neon = neon;
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("A tracing subscriber was already installed");
    }
}

fn progress_bar() -> ProgressCallback {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    Box::new(move |downloaded, total| {
        if total > 0 && bar.length() != Some(total) {
            bar.set_length(total);
        }
        bar.set_position(downloaded);
        if total > 0 && downloaded >= total {
            bar.finish_and_clear();
        }
    })
}

async fn load_config(cli: &Cli) -> Result<RecipeConfig> {
    let mut config = match &cli.config {
        Some(path) => RecipeConfig::load_from(path).await?,
        None => RecipeConfig::load().await?,
    };
    cli.apply_overrides(&mut config);
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli).await?;
    let recipe = Recipe::new(config, HostPlatform::detect());

    match cli.command {
        Commands::Validate => {
            ValidateCommand { recipe }.execute()?;
        }
        Commands::Install { force } => {
            let path = InstallCommand { recipe, force }.execute(Some(progress_bar())).await?;
            info!("Package ready at {:?}", path);
        }
        Commands::Flags => {
            println!("{}", FlagsCommand { recipe }.execute()?);
        }
        Commands::Env { dotenv, script } => {
            print!("{}", EnvCommand { recipe, dotenv, script }.execute().await?);
        }
        Commands::Info => {
            print!("{}", InfoCommand { recipe }.execute().await?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<RecipeError>() {
            Some(recipe_error) => error!("{}", recipe_error.user_message()),
            None => error!("{:#}", e),
        }
        std::process::exit(1);
    }
}
