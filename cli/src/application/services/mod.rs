//! Application services — use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports` — never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod connect;
pub mod host_trust;
pub mod init_system;
pub mod installer;
pub mod ownership;
pub mod privileges;
pub mod uninstaller;
