//! Compy Core: ABI primitives shared by the compiler and the runtime.
//!
//! Key design principle: this crate holds only the contract both sides
//! must agree on bit-for-bit — the tagged-value layout, the type-code
//! numbering, source spans, and the panic-reason token set. Everything
//! else (parsing, codegen, arithmetic semantics) lives downstream in
//! `compyc` or `compy-runtime`.
//!
//! # Modules
//!
//! - `value`: the two-word `TaggedValue` ABI and its type codes.
//! - `span`: source spans, reused as the runtime-call `lineno` source.
//! - `panic_reason`: the fixed panic-reason token set for the dump-file protocol.

pub mod panic_reason;
pub mod span;
pub mod value;

pub use panic_reason::PanicReason;
pub use span::Span;
pub use value::{TYPE_BOOL, TYPE_INT, TYPE_NONE, TYPE_STRING, TYPE_TYPE, TaggedValue, TypeCode, type_name};
