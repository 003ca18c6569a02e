//! isolinux-config CLI
//!
//! Renders isolinux boot menus and stages syslinux loader files for an ISO
//! root directory.
//!
//! # Usage
//!
//! ```bash
//! # Show the architecture tag used for boot/<arch>/loader
//! isolinux-config arch
//!
//! # Check host tools and syslinux files before staging
//! isolinux-config preflight --root /tmp/iso-root
//!
//! # Render and write isolinux.cfg and isolinux.msg
//! isolinux-config config --root /tmp/iso-root --description build.toml --mode live
//!
//! # Copy the loader files into boot/<arch>/loader
//! isolinux-config stage --root /tmp/iso-root --description build.toml
//!
//! # Both of the above
//! isolinux-config build --root /tmp/iso-root --description build.toml --mode install
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::stderr;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

use isolinux_config::arch;
use isolinux_config::bootloader::{BootLoaderConfig, ImageFiles, IsolinuxConfig};
use isolinux_config::config::BuildType;
use isolinux_config::defaults::BootPolicy;
use isolinux_config::preflight::PreflightChecker;

#[derive(Parser)]
#[command(name = "isolinux-config")]
#[command(author, version, about = "isolinux bootloader setup for ISO images", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Machine to configure for instead of the host (x86_64, i686, i586)
    #[arg(long, global = true)]
    arch: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the architecture tag of the boot directory
    Arch,

    /// Render and write isolinux.cfg and isolinux.msg
    Config {
        #[command(flatten)]
        image: ImageArgs,

        #[command(flatten)]
        files: FileArgs,
    },

    /// Stage the syslinux loader files
    Stage {
        #[command(flatten)]
        image: ImageArgs,

        /// Tree containing the syslinux files (default: the root directory)
        #[arg(long)]
        lookup_path: Option<PathBuf>,
    },

    /// Stage loader files, then render and write the config
    Build {
        #[command(flatten)]
        image: ImageArgs,

        #[command(flatten)]
        files: FileArgs,

        /// Tree containing the syslinux files (default: the root directory)
        #[arg(long)]
        lookup_path: Option<PathBuf>,
    },

    /// Check host tools and syslinux files
    Preflight {
        /// ISO root directory
        #[arg(long)]
        root: PathBuf,

        /// Tree containing the syslinux files (default: the root directory)
        #[arg(long)]
        lookup_path: Option<PathBuf>,

        /// gfxboot theme to check for
        #[arg(long)]
        theme: Option<String>,
    },
}

#[derive(Args)]
struct ImageArgs {
    /// ISO root directory
    #[arg(long)]
    root: PathBuf,

    /// Build description (TOML)
    #[arg(long)]
    description: PathBuf,
}

#[derive(Args)]
struct FileArgs {
    /// Boot menu to render
    #[arg(long, value_enum, default_value_t = Mode::Live)]
    mode: Mode,

    /// Kernel file name inside the loader directory
    #[arg(long, default_value = "linux")]
    kernel: String,

    /// Initrd file name inside the loader directory
    #[arg(long, default_value = "initrd")]
    initrd: String,

    /// Hypervisor file name for multiboot images
    #[arg(long, default_value = "xen.gz")]
    hypervisor: String,
}

impl FileArgs {
    fn image_files(&self) -> ImageFiles {
        ImageFiles {
            hypervisor: self.hypervisor.clone(),
            kernel: self.kernel.clone(),
            initrd: self.initrd.clone(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Install,
    Live,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("isolinux_config={}", default_level)));
    registry().with(filter).with(fmt::layer().with_writer(stderr)).init();

    let machine = cli.arch.clone().unwrap_or_else(arch::host_machine);
    debug!(machine = %machine, "Resolved target machine");

    let result = match &cli.command {
        Commands::Arch => cmd_arch(&machine),
        Commands::Config { image, files } => cmd_config(image, files, &machine),
        Commands::Stage { image, lookup_path } => {
            cmd_stage(image, lookup_path.as_deref(), &machine)
        }
        Commands::Build {
            image,
            files,
            lookup_path,
        } => cmd_build(image, files, lookup_path.as_deref(), &machine),
        Commands::Preflight {
            root,
            lookup_path,
            theme,
        } => cmd_preflight(root, lookup_path.as_deref(), theme.clone()),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(image: &ImageArgs, machine: &str) -> Result<IsolinuxConfig> {
    let build = BuildType::load(&image.description).with_context(|| {
        format!("Failed to load build description {}", image.description.display())
    })?;
    let isolinux = IsolinuxConfig::new(&image.root, &build, &BootPolicy::default(), machine)?;
    Ok(isolinux)
}

fn cmd_arch(machine: &str) -> Result<()> {
    println!("{}", arch::resolve(machine)?);
    Ok(())
}

fn render_and_write(isolinux: &mut IsolinuxConfig, files: &FileArgs) -> Result<()> {
    let image_files = files.image_files();
    match files.mode {
        Mode::Install => isolinux.setup_install_image_config(&image_files),
        Mode::Live => isolinux.setup_live_image_config(&image_files),
    }
    .context("Failed to render isolinux config")?;

    isolinux.write().with_context(|| {
        format!("Failed to write isolinux config to {}", isolinux.boot_path().display())
    })?;
    Ok(())
}

fn stage(isolinux: &IsolinuxConfig, files_mode: Mode, lookup_path: Option<&Path>) -> Result<()> {
    match files_mode {
        Mode::Install => isolinux.setup_install_boot_images(lookup_path),
        Mode::Live => isolinux.setup_live_boot_images(lookup_path),
    }
    .context("Failed to stage loader files")
}

fn cmd_config(image: &ImageArgs, files: &FileArgs, machine: &str) -> Result<()> {
    let mut isolinux = load_config(image, machine)?;
    render_and_write(&mut isolinux, files)?;

    let boot_path = isolinux.boot_path();
    println!("=== isolinux config written ===");
    println!("  Config:  {}", boot_path.join("isolinux.cfg").display());
    println!("  Message: {}", boot_path.join("isolinux.msg").display());
    Ok(())
}

fn cmd_stage(image: &ImageArgs, lookup_path: Option<&Path>, machine: &str) -> Result<()> {
    let isolinux = load_config(image, machine)?;
    stage(&isolinux, Mode::Live, lookup_path)?;

    println!("=== Loader files staged ===");
    println!("  Loader: {}", isolinux.boot_path().display());
    Ok(())
}

fn cmd_build(
    image: &ImageArgs,
    files: &FileArgs,
    lookup_path: Option<&Path>,
    machine: &str,
) -> Result<()> {
    let mut isolinux = load_config(image, machine)?;

    println!("Staging loader files...");
    stage(&isolinux, files.mode, lookup_path)?;

    println!("Rendering isolinux config...");
    render_and_write(&mut isolinux, files)?;

    let build = isolinux.build();
    println!("\n=== isolinux Setup Complete ===");
    println!("  Loader:   {}", isolinux.boot_path().display());
    println!("  Title:    {}", build.title);
    println!("  Timeout:  {}", build.timeout);
    if build.multiboot {
        println!("  Multiboot: {}", files.hypervisor);
    }
    Ok(())
}

fn cmd_preflight(root: &Path, lookup_path: Option<&Path>, theme: Option<String>) -> Result<()> {
    let lookup_path = lookup_path.unwrap_or(root);
    let report = PreflightChecker::new(lookup_path, theme).run_all();
    report.print_summary();

    if !report.is_ok() {
        anyhow::bail!("{} preflight check(s) failed", report.errors().len());
    }
    Ok(())
}
