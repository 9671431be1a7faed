//! Diagnostics: user-facing compile errors and the operational errors
//! surfaced by the CLI driver.

use compy_core::Span;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The kinds of user error the checker/tagger accumulate, plus the
/// parser's catch-all (raised immediately instead of batched).
#[derive(Clone, Debug, Error)]
pub enum CompileErrorKind {
    #[error("integer literal {0} is out of signed 64-bit range")]
    IntegerOOB(i64),
    #[error("name '{0}' is not bound")]
    UnboundVar(String),
    #[error("cannot assign to immutable variable '{0}'")]
    ImmutableVar(String),
    #[error("'{name}' expects {expected} argument(s), got {actual}")]
    FuncArgs { name: String, expected: usize, actual: usize },
    #[error("'{0}' is mutable in an outer scope and cannot be captured by an inner function")]
    MutableClosureVar(String),
    #[error("{0}")]
    Syntax(String),
}

/// A single user-facing compile error, carrying the span needed to
/// render a `path:line:col: message` diagnostic with a source excerpt.
#[derive(Clone, Debug)]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub span: Span,
}

impl CompileError {
    pub fn new(kind: CompileErrorKind, span: Span) -> Self {
        CompileError { kind, span }
    }

    pub fn syntax(msg: impl Into<String>, span: Span) -> Self {
        CompileError { kind: CompileErrorKind::Syntax(msg.into()), span }
    }

    /// Renders `path:line:col: message` followed by the offending
    /// source line and a caret span underneath it, matching the
    /// original implementation's `report_error` presentation.
    pub fn render(&self, path: &str, source: &str) -> String {
        let mut out = format!(
            "{path}:{}:{}: {}\n",
            self.span.start_line,
            self.span.start_col + 1,
            self.kind
        );
        if self.span.is_multiline() {
            out.push_str("<Multiline error>\n");
            return out;
        }
        if let Some(line) = source.lines().nth(self.span.start_line.saturating_sub(1) as usize) {
            out.push_str(line);
            out.push('\n');
            let end_col = if self.span.end_col > self.span.start_col {
                self.span.end_col
            } else {
                self.span.start_col + 1
            };
            out.push_str(&" ".repeat(self.span.start_col as usize));
            out.push_str(&"^".repeat((end_col - self.span.start_col).max(1) as usize));
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.span, self.kind)
    }
}

/// Errors from outside the pipeline proper: bad CLI usage, a missing
/// source file, or an assembler/linker failure.
#[derive(Debug, Error)]
pub enum OperationalError {
    #[error("source file must have a .compy extension: {0}")]
    BadSourceSuffix(PathBuf),
    #[error("could not read source file {path}: {source}")]
    ReadSource { path: PathBuf, source: std::io::Error },
    #[error("Aborted due to compile error")]
    CompileFailed,
    #[error("code generation failed: {0}")]
    CodeGen(#[from] crate::codegen::CodeGenError),
    #[error("nasm failed: {0}")]
    Assembler(String),
    #[error("gcc failed: {0}")]
    Linker(String),
    #[error("failed to run produced binary: {0}")]
    Run(std::io::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
