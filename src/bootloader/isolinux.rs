//! isolinux configuration.
//!
//! Renders `isolinux.cfg` and `isolinux.msg` for install and live ISOs and
//! stages the syslinux loader files next to them in `boot/<arch>/loader`.
//!
//! # Example
//!
//! ```rust,no_run
//! use isolinux_config::bootloader::{BootLoaderConfig, ImageFiles, IsolinuxConfig};
//! use isolinux_config::config::BuildType;
//! use isolinux_config::defaults::BootPolicy;
//! use std::path::Path;
//!
//! let build = BuildType::load(Path::new("build.toml"))?;
//! let mut isolinux =
//!     IsolinuxConfig::new(Path::new("/tmp/iso-root"), &build, &BootPolicy::default(), "x86_64")?;
//! isolinux.setup_live_boot_images(None)?;
//! isolinux.setup_live_image_config(&ImageFiles::default())?;
//! isolinux.write()?;
//! # Ok::<(), isolinux_config::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::loader::copy_loader_data;
use super::options::BuildConfiguration;
use super::{BootLoaderConfig, ImageFiles};
use crate::config::BuildType;
use crate::defaults::BootPolicy;
use crate::error::{Error, Result};
use crate::template::isolinux::{
    select, BootMode, IsolinuxTemplates, TemplateFlags, TemplateProvider,
};
use crate::template::{Parameters, SubstituteError};

/// isolinux bootloader configuration of one image.
#[derive(Debug)]
pub struct IsolinuxConfig<T = IsolinuxTemplates> {
    root_dir: PathBuf,
    build: BuildConfiguration,
    templates: T,
    config: Option<String>,
    config_message: Option<String>,
}

impl IsolinuxConfig<IsolinuxTemplates> {
    /// Create the config with the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Platform`] if `machine` is not an x86 architecture.
    pub fn new(
        root_dir: &Path,
        build: &BuildType,
        policy: &BootPolicy,
        machine: &str,
    ) -> Result<Self> {
        Self::with_templates(root_dir, build, policy, machine, IsolinuxTemplates)
    }
}

impl<T: TemplateProvider> IsolinuxConfig<T> {
    pub fn with_templates(
        root_dir: &Path,
        build: &BuildType,
        policy: &BootPolicy,
        machine: &str,
        templates: T,
    ) -> Result<Self> {
        Ok(Self {
            root_dir: root_dir.to_path_buf(),
            build: BuildConfiguration::assemble(build, policy, machine)?,
            templates,
            config: None,
            config_message: None,
        })
    }

    pub fn build(&self) -> &BuildConfiguration {
        &self.build
    }

    /// Rendered `isolinux.cfg`, if any.
    pub fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Rendered `isolinux.msg`, if any.
    pub fn config_message(&self) -> Option<&str> {
        self.config_message.as_deref()
    }

    /// `<root>/boot/<arch>/loader`
    pub fn boot_path(&self) -> PathBuf {
        self.root_dir.join("boot").join(self.build.arch).join("loader")
    }

    /// A gfxboot theme has been staged into the boot path.
    pub fn have_theme(&self) -> bool {
        self.boot_path().join("bootlogo").exists()
    }

    /// Substitution values for one boot mode.
    pub fn template_parameters(&self, mode: BootMode, files: &ImageFiles) -> Parameters {
        let build = &self.build;
        let (default_boot, mode_options) = match mode {
            BootMode::Install => (&build.install_boot_default, &build.install_boot_options),
            BootMode::Live => (&build.title, &build.live_boot_options),
        };

        let mut parameters = Parameters::new();
        parameters.insert("default_boot".into(), default_boot.clone());
        parameters.insert("kernel_file".into(), files.kernel.clone());
        parameters.insert("initrd_file".into(), files.initrd.clone());
        parameters.insert("boot_options".into(), join_options(&build.cmdline, mode_options));
        parameters.insert(
            "failsafe_boot_options".into(),
            join_options(&build.cmdline_failsafe, mode_options),
        );
        parameters.insert("gfxmode".into(), build.gfxmode.clone());
        parameters.insert("boot_timeout".into(), build.timeout.to_string());
        parameters.insert("title".into(), build.title.clone());
        if build.multiboot {
            parameters.insert("hypervisor".into(), files.hypervisor.clone());
        }
        parameters
    }

    fn render(&mut self, mode: BootMode, files: &ImageFiles) -> Result<()> {
        let parameters = self.template_parameters(mode, files);
        let handle = select(TemplateFlags {
            mode,
            multiboot: self.build.multiboot,
            failsafe: self.build.failsafe_boot,
            theme: self.have_theme(),
            terminal: self.build.terminal,
            mediacheck: self.build.mediacheck_boot,
        });
        info!(template = ?handle, "Using isolinux template");

        let config = self
            .templates
            .config_template(&handle)
            .substitute(&parameters)
            .map_err(template_error)?;
        let message = self
            .templates
            .message_template(&handle)
            .substitute(&parameters)
            .map_err(template_error)?;

        self.config = Some(config);
        self.config_message = Some(message);
        Ok(())
    }
}

impl<T: TemplateProvider> BootLoaderConfig for IsolinuxConfig<T> {
    fn setup_install_image_config(&mut self, files: &ImageFiles) -> Result<()> {
        info!("Creating isolinux install config from template");
        self.render(BootMode::Install, files)
    }

    fn setup_live_image_config(&mut self, files: &ImageFiles) -> Result<()> {
        info!("Creating isolinux live ISO config from template");
        self.render(BootMode::Live, files)
    }

    fn setup_install_boot_images(&self, lookup_path: Option<&Path>) -> Result<()> {
        let lookup_path = lookup_path.unwrap_or(&self.root_dir);
        copy_loader_data(lookup_path, &self.boot_path(), self.build.theme.as_deref())?;
        Ok(())
    }

    fn setup_live_boot_images(&self, lookup_path: Option<&Path>) -> Result<()> {
        self.setup_install_boot_images(lookup_path)
    }

    fn write(&self) -> Result<()> {
        let boot_path = self.boot_path();
        if self.config.is_none() && self.config_message.is_none() {
            return Ok(());
        }
        fs::create_dir_all(&boot_path)?;

        if let Some(config) = &self.config {
            info!(path = %boot_path.join("isolinux.cfg").display(), "Writing isolinux.cfg file");
            fs::write(boot_path.join("isolinux.cfg"), config)?;
        }
        if let Some(message) = &self.config_message {
            fs::write(boot_path.join("isolinux.msg"), message)?;
        }
        Ok(())
    }
}

fn join_options(cmdline: &str, options: &[String]) -> String {
    std::iter::once(cmdline.trim())
        .filter(|cmdline| !cmdline.is_empty())
        .chain(options.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

fn template_error(e: SubstituteError) -> Error {
    Error::Template {
        kind: e.kind().to_string(),
        message: e.to_string(),
    }
}
