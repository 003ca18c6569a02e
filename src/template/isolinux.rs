//! isolinux template families.
//!
//! A template family is picked by [`select`], a pure function of the current
//! flags. The resulting [`TemplateHandle`] is all a [`TemplateProvider`] needs
//! to hand back the config and message templates.

use super::Template;
use crate::config::Terminal;

/// Which kind of ISO the config boots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootMode {
    Install,
    Live,
}

/// Flags that decide the template family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateFlags {
    pub mode: BootMode,
    pub multiboot: bool,
    pub failsafe: bool,
    /// A gfxboot `bootlogo` is present in the boot path
    pub theme: bool,
    pub terminal: Option<Terminal>,
    /// Only honoured in live mode
    pub mediacheck: bool,
}

/// Menu options shared by every family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuOptions {
    pub failsafe: bool,
    pub theme: bool,
    pub terminal: Option<Terminal>,
}

impl MenuOptions {
    /// gfxboot only works on a graphical console.
    pub fn graphical(&self) -> bool {
        self.theme && !matches!(self.terminal, Some(Terminal::Console | Terminal::Serial))
    }
}

/// Concrete template family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateHandle {
    Install(MenuOptions),
    MultibootInstall(MenuOptions),
    Live { menu: MenuOptions, mediacheck: bool },
    MultibootLive { menu: MenuOptions, mediacheck: bool },
}

impl TemplateHandle {
    pub fn menu(&self) -> &MenuOptions {
        match self {
            TemplateHandle::Install(menu) | TemplateHandle::MultibootInstall(menu) => menu,
            TemplateHandle::Live { menu, .. } | TemplateHandle::MultibootLive { menu, .. } => menu,
        }
    }

    pub fn mode(&self) -> BootMode {
        match self {
            TemplateHandle::Install(_) | TemplateHandle::MultibootInstall(_) => BootMode::Install,
            TemplateHandle::Live { .. } | TemplateHandle::MultibootLive { .. } => BootMode::Live,
        }
    }

    pub fn is_multiboot(&self) -> bool {
        matches!(
            self,
            TemplateHandle::MultibootInstall(_) | TemplateHandle::MultibootLive { .. }
        )
    }
}

/// Pick the template family for a set of flags.
pub fn select(flags: TemplateFlags) -> TemplateHandle {
    let menu = MenuOptions {
        failsafe: flags.failsafe,
        theme: flags.theme,
        terminal: flags.terminal,
    };
    let mediacheck = flags.mediacheck;

    match (flags.mode, flags.multiboot) {
        (BootMode::Install, false) => TemplateHandle::Install(menu),
        (BootMode::Install, true) => TemplateHandle::MultibootInstall(menu),
        (BootMode::Live, false) => TemplateHandle::Live { menu, mediacheck },
        (BootMode::Live, true) => TemplateHandle::MultibootLive { menu, mediacheck },
    }
}

/// Source of config and message templates.
pub trait TemplateProvider {
    /// Template for `isolinux.cfg`.
    fn config_template(&self, handle: &TemplateHandle) -> Template;

    /// Template for `isolinux.msg`.
    fn message_template(&self, handle: &TemplateHandle) -> Template;
}

const SERIAL: &str = "serial 0 115200\n";

const HEADER: &str = "\
# isolinux.cfg generated by isolinux-config
implicit 1
prompt   1
timeout  ${boot_timeout}
display isolinux.msg
";

const UI_THEME: &str = "ui gfxboot bootlogo isolinux.msg\n";

const UI_PLAIN: &str = "\
ui menu.c32
menu title ${title}
";

const DEFAULT: &str = "default  ${default_boot}\n";

const HARDDISK_ENTRY: &str = "
label Boot_from_Hard_Disk
  localboot 0x80
";

const ENTRY: &str = "
label ${title}
  kernel ${kernel_file}
  append initrd=${initrd_file} ${boot_options}
";

const FAILSAFE_ENTRY: &str = "
label Failsafe_--_${title}
  kernel ${kernel_file}
  append initrd=${initrd_file} ${failsafe_boot_options}
";

const MEDIACHECK_ENTRY: &str = "
label Mediacheck_--_${title}
  kernel ${kernel_file}
  append initrd=${initrd_file} rd.live.check ${boot_options}
";

const MULTIBOOT_ENTRY: &str = "
label ${title}
  kernel mboot.c32
  append ${hypervisor} --- ${kernel_file} ${boot_options} --- ${initrd_file}
";

const MULTIBOOT_FAILSAFE_ENTRY: &str = "
label Failsafe_--_${title}
  kernel mboot.c32
  append ${hypervisor} --- ${kernel_file} ${failsafe_boot_options} --- ${initrd_file}
";

const MULTIBOOT_MEDIACHECK_ENTRY: &str = "
label Mediacheck_--_${title}
  kernel mboot.c32
  append ${hypervisor} --- ${kernel_file} rd.live.check ${boot_options} --- ${initrd_file}
";

const INSTALL_MESSAGE: &str = "
Welcome to the ${title} installer!

Press <return> to start '${default_boot}', or type one of the
labels below followed by extra kernel options:

  ${title}
  Boot_from_Hard_Disk

";

const LIVE_MESSAGE: &str = "
Welcome to ${title}!

Press <return> to start '${default_boot}', or type one of the
labels below followed by extra kernel options:

  ${title}
  Boot_from_Hard_Disk

";

/// Built-in isolinux templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsolinuxTemplates;

impl IsolinuxTemplates {
    fn head(menu: &MenuOptions) -> String {
        let mut text = String::new();
        if menu.terminal == Some(Terminal::Serial) {
            text.push_str(SERIAL);
        }
        text.push_str(HEADER);
        text.push_str(if menu.graphical() { UI_THEME } else { UI_PLAIN });
        text.push_str(DEFAULT);
        text
    }
}

impl TemplateProvider for IsolinuxTemplates {
    fn config_template(&self, handle: &TemplateHandle) -> Template {
        let menu = handle.menu();
        let (entry, failsafe, mediacheck) = if handle.is_multiboot() {
            (MULTIBOOT_ENTRY, MULTIBOOT_FAILSAFE_ENTRY, MULTIBOOT_MEDIACHECK_ENTRY)
        } else {
            (ENTRY, FAILSAFE_ENTRY, MEDIACHECK_ENTRY)
        };

        let mut text = Self::head(menu);
        match handle {
            TemplateHandle::Install(_) | TemplateHandle::MultibootInstall(_) => {
                text.push_str(HARDDISK_ENTRY);
                text.push_str(entry);
                if menu.failsafe {
                    text.push_str(failsafe);
                }
            }
            TemplateHandle::Live { mediacheck: check, .. }
            | TemplateHandle::MultibootLive { mediacheck: check, .. } => {
                text.push_str(entry);
                if menu.failsafe {
                    text.push_str(failsafe);
                }
                if *check {
                    text.push_str(mediacheck);
                }
                text.push_str(HARDDISK_ENTRY);
            }
        }
        Template::new(text)
    }

    fn message_template(&self, handle: &TemplateHandle) -> Template {
        match handle.mode() {
            BootMode::Install => Template::new(INSTALL_MESSAGE),
            BootMode::Live => Template::new(LIVE_MESSAGE),
        }
    }
}
