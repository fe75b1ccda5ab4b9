//! Integration tests for the REX-Ray CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior.

mod cli_tests;
