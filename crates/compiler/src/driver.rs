//! Assembler/linker invocation: turns generated NASM text into a
//! native executable by shelling out to `nasm` and `gcc`, linking
//! against the embedded runtime archive.

use crate::config::CompilerConfig;
use crate::error::OperationalError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// The runtime's static archive, built by `build.rs` and baked into
/// this binary so a Compy install needs nothing beyond `nasm`/`gcc` on
/// the `PATH`.
static RUNTIME_LIB: &[u8] = include_bytes!(env!("COMPY_RUNTIME_LIB_PATH"));

/// Assembles and links `asm` into `output_path`, honoring the
/// debug-artifact flags that keep the intermediate `.nasm`/`.o` files
/// next to the source instead of a scratch temp directory.
pub fn assemble_and_link(
    asm: &str,
    source_path: &Path,
    output_path: &Path,
    config: &CompilerConfig,
) -> Result<(), OperationalError> {
    let tmpdir = tempfile::tempdir()?;
    let src_prefix = source_path.with_extension("");

    let nasm_path = if config.debug_asm { src_prefix.with_extension("nasm") } else { tmpdir.path().join("compy.nasm") };
    let obj_path = if config.debug_obj { src_prefix.with_extension("o") } else { tmpdir.path().join("compy.o") };

    std::fs::write(&nasm_path, asm)?;

    run(Command::new("nasm").args(["-f", "elf64", "-o"]).arg(&obj_path).arg(&nasm_path), |stderr| {
        OperationalError::Assembler(stderr)
    })?;

    let runtime_path = write_embedded_runtime(tmpdir.path())?;

    run(Command::new("gcc").arg("-o").arg(output_path).arg(&obj_path).arg(&runtime_path), |stderr| {
        OperationalError::Linker(stderr)
    })?;

    Ok(())
}

fn write_embedded_runtime(dir: &Path) -> Result<PathBuf, OperationalError> {
    let path = dir.join("libcompy_runtime.a");
    let mut file = std::fs::File::create(&path)?;
    file.write_all(RUNTIME_LIB)?;
    Ok(path)
}

fn run(cmd: &mut Command, to_error: impl FnOnce(String) -> OperationalError) -> Result<(), OperationalError> {
    tracing::debug!(?cmd, "running build command");
    let output = cmd.output().map_err(|e| to_error(e.to_string()))?;
    if !output.status.success() {
        return Err(to_error(String::from_utf8_lossy(&output.stderr).into_owned()));
    }
    Ok(())
}
