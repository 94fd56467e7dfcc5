//! Command: print version information.

/// Version embedded by `build.rs`, falling back to the crate version.
pub const VERSION: &str = match option_env!("BBX_PROVISION_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

/// Print the version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("bbx-provision {VERSION}");
}
