//! Compy Runtime: the native C-ABI library linked into every compiled
//! Compy program.
//!
//! Key design principle: codegen never inlines arithmetic, comparison,
//! or I/O semantics into the emitted assembly — every operator and
//! built-in call is a call to a symbol exported from this crate. This
//! keeps the tagged-value semantics (overflow checks, type errors, the
//! panic-dump protocol) in one auditable place instead of duplicated
//! across every code-generation site.

pub mod arithmetic;
pub mod comparison;
pub mod error;
pub mod io;
pub mod misc;
pub mod time_ops;

pub use arithmetic::{add, add1, div, mul, negate, r#mod, sub, sub1};
pub use comparison::{boolean_not, extract_bool, is_eq, is_ge, is_gt, is_identical, is_le, is_lt};
pub use io::{eval_input, print_variadic};
pub use misc::{compy_exit, compy_sleep};
pub use time_ops::compy_time_int;
