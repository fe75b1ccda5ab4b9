//! Unit tests for the REX-Ray CLI
//!
//! These tests use hand-written port mocks and run fast without touching the
//! real system.

mod connect_command;
mod helpers;
