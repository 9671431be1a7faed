//! Code generation error type.
//!
//! Codegen itself is assumed infallible against a well-formed,
//! ANF-lowered, stack-allocated AST — the only failure mode modeled
//! here is the formatting machinery used to build the output buffer.

#[derive(Debug)]
pub enum CodeGenError {
    Format(std::fmt::Error),
}

impl std::fmt::Display for CodeGenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodeGenError::Format(e) => write!(f, "assembly generation error: {e}"),
        }
    }
}

impl std::error::Error for CodeGenError {}

impl From<std::fmt::Error> for CodeGenError {
    fn from(e: std::fmt::Error) -> Self {
        CodeGenError::Format(e)
    }
}
