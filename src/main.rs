//! refgate binary entry point.
//!
//! All logic lives in the library; this shim exists so the exit code the
//! CLI layer computes is the exit code git sees.

fn main() {
    std::process::exit(refgate::cli::run());
}
