//! Compy Compiler Library
//!
//! Ahead-of-time compilation from `.compy` source to a native x86-64
//! executable: parse, check, tag, lower to ANF, assign frame offsets,
//! generate NASM, then assemble and link.

pub mod anf;
pub mod ast;
pub mod checker;
pub mod codegen;
pub mod config;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod stack_alloc;
pub mod state;
pub mod tagger;

pub use config::CompilerConfig;
pub use error::{CompileError, OperationalError};

use ast::{CompiledFunction, MAIN_FUNC_ID, MAIN_SYMBOL};
use state::CompilerState;
use std::path::{Path, PathBuf};
use tracing::info_span;

/// Compiles `source_path` to a native executable at `config.output`
/// (or the source's stem, if unset), reporting the pipeline's user
/// errors on stderr and returning [`OperationalError::CompileFailed`]
/// if any were raised.
pub fn compile_file(source_path: &Path, config: &CompilerConfig) -> Result<PathBuf, OperationalError> {
    if source_path.extension().and_then(|e| e.to_str()) != Some("compy") {
        return Err(OperationalError::BadSourceSuffix(source_path.to_path_buf()));
    }

    let source =
        std::fs::read_to_string(source_path).map_err(|e| OperationalError::ReadSource { path: source_path.to_path_buf(), source: e })?;

    let output_path = config.output.clone().unwrap_or_else(|| source_path.with_extension("out"));

    let mut st = CompilerState::new();

    let mut scope = {
        let _span = info_span!("parse").entered();
        parser::parse(&source).map_err(|e| report_parse_error(&e, source_path, &source))?
    };

    {
        let _span = info_span!("check_and_tag").entered();
        checker::check(&scope, &mut st);
        tagger::tag(&mut scope, &mut st);
    }

    if st.has_errors() {
        report_errors(&st, source_path, &source);
        return Err(OperationalError::CompileFailed);
    }

    let scope = {
        let _span = info_span!("anf").entered();
        anf::lower(scope, &mut st)
    };

    let mut func = CompiledFunction { id: MAIN_FUNC_ID, symbol: MAIN_SYMBOL.to_string(), body: scope, stack_usage: 0 };

    {
        let _span = info_span!("stack_alloc").entered();
        stack_alloc::allocate(&mut func, &mut st);
    }

    let asm = {
        let _span = info_span!("codegen").entered();
        codegen::generate(&func, &mut st)?
    };

    if config.debug_pipeline {
        eprintln!("{asm}");
    }

    {
        let _span = info_span!("assemble_and_link").entered();
        driver::assemble_and_link(&asm, source_path, &output_path, config)?;
    }

    Ok(output_path)
}

fn report_parse_error(e: &CompileError, source_path: &Path, source: &str) -> OperationalError {
    eprint!("{}", e.render(&source_path.display().to_string(), source));
    OperationalError::CompileFailed
}

fn report_errors(st: &CompilerState, source_path: &Path, source: &str) {
    for err in &st.errors {
        eprint!("{}", err.render(&source_path.display().to_string(), source));
    }
}
