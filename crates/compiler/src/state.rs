//! The compiler-state object: owns the diagnostic list and the
//! constant/string pools for the duration of one compilation, and the
//! `VarInfo` side table the arena+index design note calls for.

use crate::ast::{VarId, VarInfo};
use crate::error::CompileError;
use std::collections::HashMap;

/// Interns `(type_code, payload)` pairs to read-only-data symbols.
/// Pooling the same pair twice returns the same symbol (testable
/// property 4).
#[derive(Default)]
pub struct ConstPool {
    symbols: HashMap<(i64, i64), String>,
    next: usize,
}

impl ConstPool {
    pub fn pool(&mut self, type_code: i64, payload: i64) -> String {
        if let Some(sym) = self.symbols.get(&(type_code, payload)) {
            return sym.clone();
        }
        let sym = format!("_compy_const_{}", self.next);
        self.next += 1;
        self.symbols.insert((type_code, payload), sym.clone());
        sym
    }

    /// Emits `label: dq payload, dq type_code` for every pooled entry,
    /// in the order they were first interned.
    pub fn to_asm(&self) -> Vec<(String, i64, i64)> {
        let mut entries: Vec<(&(i64, i64), &String)> = self.symbols.iter().collect();
        entries.sort_by_key(|(_, sym)| sym.trim_start_matches("_compy_const_").parse::<usize>().unwrap_or(0));
        entries
            .into_iter()
            .map(|((ty, payload), sym)| (sym.clone(), *payload, *ty))
            .collect()
    }
}

/// Interns string content to read-only-data symbols. Idempotent on
/// content equality (testable property 5).
#[derive(Default)]
pub struct StringPool {
    symbols: HashMap<String, String>,
    next: usize,
}

impl StringPool {
    pub fn pool(&mut self, content: &str) -> String {
        if let Some(sym) = self.symbols.get(content) {
            return sym.clone();
        }
        let sym = format!("_compy_str_{}", self.next);
        self.next += 1;
        self.symbols.insert(content.to_string(), sym.clone());
        sym
    }

    pub fn to_asm(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(&String, &String)> = self.symbols.iter().collect();
        entries.sort_by_key(|(_, sym)| sym.trim_start_matches("_compy_str_").parse::<usize>().unwrap_or(0));
        entries.into_iter().map(|(content, sym)| (sym.clone(), content.clone())).collect()
    }
}

/// Owns everything shared mutably across pipeline stages: accumulated
/// diagnostics, the `VarInfo` arena, and the constant/string pools.
#[derive(Default)]
pub struct CompilerState {
    pub errors: Vec<CompileError>,
    pub vars: Vec<VarInfo>,
    pub const_pool: ConstPool,
    pub string_pool: StringPool,
    anf_counter: u32,
    label_counter: u32,
}

impl CompilerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn err(&mut self, e: CompileError) {
        self.errors.push(e);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn new_var(&mut self, info: VarInfo) -> VarId {
        let id = VarId(self.vars.len());
        self.vars.push(info);
        id
    }

    pub fn var(&self, id: VarId) -> &VarInfo {
        &self.vars[id.0]
    }

    pub fn var_mut(&mut self, id: VarId) -> &mut VarInfo {
        &mut self.vars[id.0]
    }

    /// Monotonic per-compilation `$anf<n>` temporary name.
    pub fn fresh_anf_name(&mut self) -> String {
        let n = self.anf_counter;
        self.anf_counter += 1;
        format!("$anf{n}")
    }

    /// Monotonic label counter for codegen's `if`/`while` branches.
    pub fn fresh_label(&mut self, prefix: &str) -> String {
        let n = self.label_counter;
        self.label_counter += 1;
        format!(".L{prefix}{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_pool_interning_is_idempotent() {
        let mut pool = ConstPool::default();
        let a = pool.pool(compy_core::TYPE_INT, 42);
        let b = pool.pool(compy_core::TYPE_INT, 42);
        assert_eq!(a, b);
        let c = pool.pool(compy_core::TYPE_INT, 43);
        assert_ne!(a, c);
    }

    #[test]
    fn string_pool_interning_is_idempotent_on_content() {
        let mut pool = StringPool::default();
        let a = pool.pool("hello");
        let b = pool.pool("hello");
        assert_eq!(a, b);
        let c = pool.pool("world");
        assert_ne!(a, c);
    }

    #[test]
    fn anf_names_are_monotonic() {
        let mut st = CompilerState::new();
        assert_eq!(st.fresh_anf_name(), "$anf0");
        assert_eq!(st.fresh_anf_name(), "$anf1");
    }
}
