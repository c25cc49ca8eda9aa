//! Desktop stand-ins for the platform collaborators.

use crate::gesture::SoundCue;
use crate::orchestrator::{HomeLauncher, Notifier};
use crate::storage::MediaIndex;
use std::io::Write;
use std::path::Path;

/// Prints report text to stdout.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        println!("{}", message);
    }
}

/// Desktop file browsers pick new files up on their own.
pub struct LogMediaIndex;

impl MediaIndex for LogMediaIndex {
    fn notify_written(&self, path: &Path) {
        log::debug!("[STORE] Indexed {}", path.display());
    }
}

/// There is no secondary launcher to return to on a desktop.
pub struct UnsupportedHomeLauncher;

impl HomeLauncher for UnsupportedHomeLauncher {
    fn go_home(&self, display_id: u32) -> Result<(), String> {
        Err(format!(
            "no home launcher available for display {} on this platform",
            display_id
        ))
    }
}

/// Rings the terminal bell.
pub struct TerminalBell;

impl SoundCue for TerminalBell {
    fn play(&self) {
        let mut out = std::io::stdout();
        if out.write_all(b"\x07").and_then(|_| out.flush()).is_err() {
            log::debug!("[GESTURE] Could not ring terminal bell");
        }
    }
}
