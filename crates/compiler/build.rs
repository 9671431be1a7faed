//! Build script for compyc.
//!
//! Locates the compy-runtime static library so it can be embedded into
//! the compiler binary and extracted at link time.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    verify_runtime_version();
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // OUT_DIR = target/<profile>/build/<pkg>-<hash>/out
    // libcompy_runtime.a lives at target/<profile>/ or target/<profile>/deps/
    let target_dir = out_dir
        .parent()
        .and_then(|p| p.parent())
        .and_then(|p| p.parent())
        .expect("Could not find target directory");

    let direct_lib = target_dir.join("libcompy_runtime.a");

    let runtime_lib = if direct_lib.exists() {
        direct_lib
    } else {
        let deps_dir = target_dir.join("deps");
        find_runtime_in_deps(&deps_dir).unwrap_or_else(|| {
            panic!(
                "Runtime library not found.\n\
                 Looked in: {}\n\
                 And deps: {}\n\
                 OUT_DIR was: {}",
                direct_lib.display(),
                deps_dir.display(),
                out_dir.display()
            )
        })
    };

    println!(
        "cargo:rustc-env=COMPY_RUNTIME_LIB_PATH={}",
        runtime_lib.display()
    );
    println!("cargo:rerun-if-changed={}", runtime_lib.display());
}

fn find_runtime_in_deps(deps_dir: &PathBuf) -> Option<PathBuf> {
    if !deps_dir.exists() {
        return None;
    }

    fs::read_dir(deps_dir).ok()?.find_map(|entry| {
        let entry = entry.ok()?;
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        if name_str.starts_with("libcompy_runtime") && name_str.ends_with(".a") {
            Some(entry.path())
        } else {
            None
        }
    })
}

/// Verify that compy-runtime's pinned version matches compyc's own
/// version, by parsing Cargo.toml text (no toml parser dependency
/// needed at this stage of the build).
fn verify_runtime_version() {
    let compiler_version = env!("CARGO_PKG_VERSION");

    let cargo_toml = fs::read_to_string("Cargo.toml").expect("Failed to read compiler/Cargo.toml");

    let runtime_version = cargo_toml
        .lines()
        .find(|line| line.contains("compy-runtime") && line.contains("version"))
        .and_then(|line| line.split("version = \"").nth(1))
        .and_then(|s| s.split('"').next())
        .expect("Could not find compy-runtime version in Cargo.toml");

    let runtime_version = runtime_version.trim_start_matches('=');

    if compiler_version != runtime_version {
        panic!(
            "\n\n\
            ╔══════════════════════════════════════════════════════════════╗\n\
            ║ VERSION MISMATCH ERROR                                       ║\n\
            ╠══════════════════════════════════════════════════════════════╣\n\
            ║ compyc version:        {:<39}║\n\
            ║ compy-runtime version: {:<39}║\n\
            ║                                                              ║\n\
            ║ The embedded runtime MUST match the compiler version.       ║\n\
            ║                                                              ║\n\
            ║ Update compiler/Cargo.toml to pin compy-runtime to:         ║\n\
            ║ version = \"={:<46}║\n\
            ╚══════════════════════════════════════════════════════════════╝\n",
            compiler_version, runtime_version, compiler_version
        );
    }

    println!(
        "cargo:warning=✓ Version verified: compyc {} with compy-runtime {}",
        compiler_version, runtime_version
    );
}
