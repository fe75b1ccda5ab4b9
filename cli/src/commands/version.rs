//! Version command

use crate::domain::InstallLayout;

/// Run the version command.
pub fn run(layout: &InstallLayout) {
    let version = env!("CARGO_PKG_VERSION");
    println!("rexray {version}");
    println!("  binary: {}", layout.bin_file_path().display());
}
