//! Host architecture resolution.
//!
//! isolinux only exists for x86. The boot path on the ISO uses the
//! normalized tag, so every 32-bit variant collapses into `ix86`.

use crate::error::{Error, Result};
use crate::process::Cmd;

/// Normalize a machine identifier (as printed by `uname -m`) into the
/// architecture tag used under `boot/<arch>/loader`.
pub fn resolve(machine: &str) -> Result<&'static str> {
    match machine {
        "x86_64" => Ok("x86_64"),
        "i686" | "i586" => Ok("ix86"),
        other => Err(Error::Platform(other.to_string())),
    }
}

/// Machine identifier of the running host.
///
/// Asks `uname -m` first since the compile-time target cannot tell an
/// i586 host from an i686 one.
pub fn host_machine() -> String {
    if let Ok(result) = Cmd::new("uname").arg("-m").allow_fail().run() {
        let machine = result.stdout.trim();
        if result.success() && !machine.is_empty() {
            return machine.to_string();
        }
    }

    match std::env::consts::ARCH {
        "x86" => "i686".to_string(),
        other => other.to_string(),
    }
}
