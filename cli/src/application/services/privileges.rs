//! Root check for commands that mutate system service state.

use crate::application::ports::HostProbe;
use crate::domain::ServiceError;

/// # Errors
///
/// Returns [`ServiceError::PermissionDenied`] unless running as root.
pub fn require_root(host: &impl HostProbe, op: &'static str) -> Result<(), ServiceError> {
    if host.is_elevated() {
        Ok(())
    } else {
        Err(ServiceError::PermissionDenied { op })
    }
}
