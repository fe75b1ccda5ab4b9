//! Command implementations

pub mod connect;
pub mod install;
pub mod service;
pub mod version;
