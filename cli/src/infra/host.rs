//! Facts about the machine we are running on.

use crate::application::ports::HostProbe;

/// Production `HostProbe`.
pub struct SystemHost;

impl HostProbe for SystemHost {
    fn has_executable(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn is_linux(&self) -> bool {
        cfg!(target_os = "linux")
    }

    #[cfg(unix)]
    fn is_elevated(&self) -> bool {
        nix::unistd::geteuid().is_root()
    }

    #[cfg(not(unix))]
    fn is_elevated(&self) -> bool {
        false
    }
}
