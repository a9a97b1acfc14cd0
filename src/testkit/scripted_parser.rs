//! A parser that returns prepared trees.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::syntax::resolve::fold_constant;
use crate::syntax::{
    Annotation, BindingResolver, CompilationUnit, ConstantValue, Expression, ResolvedUnit,
    SourceParser,
};

/// How often a [`ScriptedParser`] was asked for each kind of work.
#[derive(Debug, Clone, Default)]
pub struct ParseCounters {
    syntax_only: Arc<AtomicUsize>,
    bindings: Arc<AtomicUsize>,
    type_resolutions: Arc<AtomicUsize>,
}

impl ParseCounters {
    pub fn syntax_only_parses(&self) -> usize {
        self.syntax_only.load(Ordering::SeqCst)
    }

    pub fn binding_parses(&self) -> usize {
        self.bindings.load(Ordering::SeqCst)
    }

    /// Annotation type resolutions across all resolved units.
    pub fn type_resolutions(&self) -> usize {
        self.type_resolutions.load(Ordering::SeqCst)
    }
}

/// Returns a prepared [`CompilationUnit`] per unit name, ignoring the
/// source text. Unit names without a script fail to parse.
///
/// Annotation types resolve through a table keyed by the written name;
/// names missing from it resolve to themselves when qualified and fail
/// otherwise. Constants fold like the real resolver.
#[derive(Debug, Clone, Default)]
pub struct ScriptedParser {
    units: HashMap<String, CompilationUnit>,
    types: Arc<HashMap<String, String>>,
    counters: ParseCounters,
}

impl ScriptedParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, unit_name: impl Into<String>, unit: CompilationUnit) -> Self {
        self.units.insert(unit_name.into(), unit);
        self
    }

    /// Make annotations written as `written` resolve to `qualified`.
    pub fn with_type(mut self, written: impl Into<String>, qualified: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.types).insert(written.into(), qualified.into());
        self
    }

    /// Shared handle to the counters; stays valid after the parser moves.
    pub fn counters(&self) -> ParseCounters {
        self.counters.clone()
    }
}

impl SourceParser for ScriptedParser {
    fn parse_syntax_only(&self, unit_name: &str, _source: &str) -> Option<CompilationUnit> {
        self.counters.syntax_only.fetch_add(1, Ordering::SeqCst);
        self.units.get(unit_name).cloned()
    }

    fn parse_with_bindings(&self, unit_name: &str, _source: &str) -> Option<ResolvedUnit> {
        self.counters.bindings.fetch_add(1, Ordering::SeqCst);
        let unit = self.units.get(unit_name)?.clone();
        let resolver = ScriptedResolver {
            types: Arc::clone(&self.types),
            resolutions: Arc::clone(&self.counters.type_resolutions),
        };
        Some(ResolvedUnit::new(unit, resolver))
    }
}

struct ScriptedResolver {
    types: Arc<HashMap<String, String>>,
    resolutions: Arc<AtomicUsize>,
}

impl BindingResolver for ScriptedResolver {
    fn resolve_annotation_type(&self, annotation: &Annotation) -> Option<String> {
        self.resolutions.fetch_add(1, Ordering::SeqCst);
        match self.types.get(&annotation.type_name) {
            Some(qualified) => Some(qualified.clone()),
            None if annotation.type_name.contains('.') => Some(annotation.type_name.clone()),
            None => None,
        }
    }

    fn resolve_constant(&self, expression: &Expression) -> Option<ConstantValue> {
        fold_constant(expression)
    }
}
