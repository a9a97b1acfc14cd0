//! Import-based binding resolution.
//!
//! Without a full classpath the resolver knows only the imports of the
//! unit and an optional set of known type names. Type names resolve with
//! Java's precedence: single-type imports, then the unit's own package,
//! then on-demand imports (including `java.lang`).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::{
    Annotation, BindingResolver, ConstantValue, Expression, FloatValue, UnaryOperator,
};

const IMPLICIT_PACKAGE: &str = "java.lang";

/// Import table of one compilation unit.
#[derive(Debug, Clone, Default)]
pub struct ImportScope {
    package: Option<String>,
    single_type: HashMap<String, String>,
    on_demand: Vec<String>,
    known_types: Arc<HashSet<String>>,
}

impl ImportScope {
    pub fn new(package: Option<String>, known_types: Arc<HashSet<String>>) -> Self {
        Self {
            package,
            single_type: HashMap::new(),
            on_demand: Vec::new(),
            known_types,
        }
    }

    /// Register `import a.b.C;`.
    pub fn add_single_type_import(&mut self, qualified: impl Into<String>) {
        let qualified = qualified.into();
        let simple = simple_name(&qualified).to_string();
        self.single_type.insert(simple, qualified);
    }

    /// Register `import a.b.*;` given `a.b`.
    pub fn add_on_demand_import(&mut self, package: impl Into<String>) {
        self.on_demand.push(package.into());
    }

    /// Resolve a type name as written to a fully-qualified name.
    ///
    /// Returns `None` only when several on-demand imports supply a known
    /// type with this name.
    pub fn resolve_type_name(&self, written: &str) -> Option<String> {
        if written.contains('.') {
            return Some(written.to_string());
        }
        if let Some(qualified) = self.single_type.get(written) {
            return Some(qualified.clone());
        }

        let same_package = self.qualify_in_package(written);
        if self.known_types.contains(&same_package) {
            return Some(same_package);
        }

        let mut candidates = self
            .on_demand
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(IMPLICIT_PACKAGE))
            .map(|package| format!("{}.{}", package, written))
            .filter(|candidate| self.known_types.contains(candidate))
            .collect::<Vec<_>>();
        candidates.dedup();

        match candidates.len() {
            0 => Some(same_package),
            1 => candidates.pop(),
            _ => {
                log::debug!("Ambiguous type name {}: {:?}", written, candidates);
                None
            }
        }
    }

    fn qualify_in_package(&self, simple: &str) -> String {
        match &self.package {
            Some(package) => format!("{}.{}", package, simple),
            None => simple.to_string(),
        }
    }
}

impl BindingResolver for ImportScope {
    fn resolve_annotation_type(&self, annotation: &Annotation) -> Option<String> {
        self.resolve_type_name(&annotation.type_name)
    }

    fn resolve_constant(&self, expression: &Expression) -> Option<ConstantValue> {
        fold_constant(expression)
    }
}

fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Fold an expression to a compile-time constant.
///
/// Handles literals, unary operators and `+` with Java's string
/// conversion and numeric promotion rules. Names never fold, since their
/// declarations are not visible here.
pub fn fold_constant(expression: &Expression) -> Option<ConstantValue> {
    match expression {
        Expression::String(value) => Some(ConstantValue::String(value.clone())),
        Expression::Integer(value) => Some(ConstantValue::Integer(*value)),
        Expression::Float(value) => Some(ConstantValue::Float(*value)),
        Expression::Char(value) => Some(ConstantValue::Char(*value)),
        Expression::Boolean(value) => Some(ConstantValue::Boolean(*value)),
        Expression::Unary(operator, operand) => apply_unary(*operator, fold_constant(operand)?),
        Expression::Concat(left, right) => {
            let left = fold_constant(left)?;
            let right = fold_constant(right)?;
            add_constants(left, right)
        }
        Expression::Name(_) | Expression::Other(_) => None,
    }
}

fn apply_unary(operator: UnaryOperator, value: ConstantValue) -> Option<ConstantValue> {
    match (operator, value) {
        (UnaryOperator::Not, ConstantValue::Boolean(value)) => Some(ConstantValue::Boolean(!value)),
        (UnaryOperator::Plus, ConstantValue::Float(value)) => Some(ConstantValue::Float(value)),
        (UnaryOperator::Minus, ConstantValue::Float(value)) => {
            Some(ConstantValue::Float(value.negate()))
        }
        (UnaryOperator::Not, _) | (_, ConstantValue::Boolean(_)) => None,
        (operator, value) => {
            // Chars promote to integers.
            let value = integral(&value)?;
            match operator {
                UnaryOperator::Minus => value.checked_neg().map(ConstantValue::Integer),
                UnaryOperator::BitNot => Some(ConstantValue::Integer(!value)),
                _ => Some(ConstantValue::Integer(value)),
            }
        }
    }
}

fn add_constants(left: ConstantValue, right: ConstantValue) -> Option<ConstantValue> {
    match (left, right) {
        (ConstantValue::String(left), right) => {
            Some(ConstantValue::String(format!("{}{}", left, right)))
        }
        (left, ConstantValue::String(right)) => {
            Some(ConstantValue::String(format!("{}{}", left, right)))
        }
        (ConstantValue::Float(left), right) => add_floats(left, &right),
        (left, ConstantValue::Float(right)) => add_floats(right, &left),
        (left, right) => {
            let sum = integral(&left)?.checked_add(integral(&right)?)?;
            Some(ConstantValue::Integer(sum))
        }
    }
}

/// `float + double` widens to `double`; integers widen to the float type.
fn add_floats(float: FloatValue, other: &ConstantValue) -> Option<ConstantValue> {
    let sum = match (float, other) {
        (FloatValue::Double(value), other) => FloatValue::Double(value + as_f64(other)?),
        (value, ConstantValue::Float(FloatValue::Double(other))) => {
            FloatValue::Double(value.to_f64() + other)
        }
        (FloatValue::Float(value), ConstantValue::Float(FloatValue::Float(other))) => {
            FloatValue::Float(value + other)
        }
        (FloatValue::Float(value), other) => FloatValue::Float(value + integral(other)? as f32),
    };
    Some(ConstantValue::Float(sum))
}

fn as_f64(value: &ConstantValue) -> Option<f64> {
    match value {
        ConstantValue::Float(value) => Some(value.to_f64()),
        other => integral(other).map(|value| value as f64),
    }
}

fn integral(value: &ConstantValue) -> Option<i64> {
    match value {
        ConstantValue::Integer(value) => Some(*value),
        ConstantValue::Char(value) => Some(i64::from(u32::from(*value))),
        _ => None,
    }
}
