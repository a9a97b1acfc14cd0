//! Parser capability consumed by the preprocessor.
//!
//! Parsing comes in two explicitly separate flavours with different
//! costs:
//!
//! - [`SourceParser::parse_syntax_only`] produces a [`CompilationUnit`]:
//!   the package declaration and its annotations exactly as written.
//! - [`SourceParser::parse_with_bindings`] produces a [`ResolvedUnit`]:
//!   the same tree plus a [`BindingResolver`] that can answer which type
//!   an annotation refers to and what constant an expression folds to.
//!
//! Both return `None` when the text cannot be parsed. Callers skip such
//! files; the parser is expected to have reported its own syntax errors.

pub mod java;
pub mod resolve;

pub use java::TreeSitterJavaParser;
pub use resolve::ImportScope;

use std::fmt;

/// Qualified name of the annotation that declares a package prefix.
pub const OBJECTIVE_C_NAME_ANNOTATION: &str = "com.google.j2objc.annotations.ObjectiveCName";

/// Simple name of [`OBJECTIVE_C_NAME_ANNOTATION`].
pub const OBJECTIVE_C_NAME_SIMPLE: &str = "ObjectiveCName";

/// Syntax-only view of one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationUnit {
    pub package: Option<PackageDeclaration>,
}

impl CompilationUnit {
    pub fn new(package: Option<PackageDeclaration>) -> Self {
        Self { package }
    }

    /// The declared package name, if any.
    pub fn package_name(&self) -> Option<&str> {
        self.package.as_ref().map(|package| package.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDeclaration {
    /// Dotted package name with whitespace removed.
    pub name: String,
    pub annotations: Vec<Annotation>,
}

impl PackageDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// An annotation as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// The type name exactly as written, possibly qualified.
    pub type_name: String,
    pub arguments: AnnotationArguments,
}

impl Annotation {
    pub fn new(type_name: impl Into<String>, arguments: AnnotationArguments) -> Self {
        Self {
            type_name: type_name.into(),
            arguments,
        }
    }

    /// `@Name("value")`
    pub fn single(type_name: impl Into<String>, value: Expression) -> Self {
        Self::new(type_name, AnnotationArguments::Single(value))
    }

    /// Last segment of the written type name.
    ///
    /// This is a purely syntactic guess at the annotation's identity and
    /// must be confirmed through a [`BindingResolver`].
    pub fn simple_name(&self) -> &str {
        self.type_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.type_name)
    }

    /// The sole argument of a single-member annotation.
    ///
    /// `@A(x)` and `@A(value = x)` are equivalent in Java, so both
    /// forms are accepted. Marker annotations and annotations with other
    /// or additional members have no single value.
    pub fn single_value(&self) -> Option<&Expression> {
        match &self.arguments {
            AnnotationArguments::Single(value) => Some(value),
            AnnotationArguments::Named(pairs) => match pairs.as_slice() {
                [(name, value)] if name == "value" => Some(value),
                _ => None,
            },
            AnnotationArguments::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationArguments {
    /// Marker annotation, or empty parentheses
    None,
    /// `@A(expr)`
    Single(Expression),
    /// `@A(key = expr, ...)` in source order
    Named(Vec<(String, Expression)>),
}

/// Annotation argument expressions, lowered just far enough for constant
/// folding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// String literal, escapes already decoded
    String(String),
    Integer(i64),
    Float(FloatValue),
    Char(char),
    Boolean(bool),
    Unary(UnaryOperator, Box<Expression>),
    /// Binary `+`
    Concat(Box<Expression>, Box<Expression>),
    /// A simple or qualified name; never a constant without a symbol table
    Name(String),
    /// Anything else, kept as source text
    Other(String),
}

impl Expression {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn concat(left: Expression, right: Expression) -> Self {
        Self::Concat(Box::new(left), Box::new(right))
    }

    pub fn unary(operator: UnaryOperator, operand: Expression) -> Self {
        Self::Unary(operator, Box::new(operand))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `~`
    BitNot,
    /// `!`
    Not,
}

/// A `float` or `double` value.
///
/// Equality is bitwise, so a value always equals itself.
#[derive(Debug, Clone, Copy)]
pub enum FloatValue {
    Float(f32),
    Double(f64),
}

impl FloatValue {
    pub fn to_f64(self) -> f64 {
        match self {
            Self::Float(value) => f64::from(value),
            Self::Double(value) => value,
        }
    }

    pub fn negate(self) -> Self {
        match self {
            Self::Float(value) => Self::Float(-value),
            Self::Double(value) => Self::Double(-value),
        }
    }
}

impl PartialEq for FloatValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(left), Self::Float(right)) => left.to_bits() == right.to_bits(),
            (Self::Double(left), Self::Double(right)) => left.to_bits() == right.to_bits(),
            _ => false,
        }
    }
}

impl Eq for FloatValue {}

/// Formats the way Java converts a floating-point value to a string:
/// the shortest digits that round-trip, in plain notation between
/// 10^-3 and 10^7 and as `d.dddE<n>` outside it.
impl fmt::Display for FloatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (negative, scientific) = match *self {
            Self::Float(value) if value.is_nan() => return f.write_str("NaN"),
            Self::Double(value) if value.is_nan() => return f.write_str("NaN"),
            Self::Float(value) => (value.is_sign_negative(), format!("{:e}", value.abs())),
            Self::Double(value) => (value.is_sign_negative(), format!("{:e}", value.abs())),
        };
        if negative {
            f.write_str("-")?;
        }
        f.write_str(&java_decimal(&scientific))
    }
}

/// Rewrite Rust's `{:e}` output (`1.5e0`, `1e10`) in Java's notation.
fn java_decimal(scientific: &str) -> String {
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return "Infinity".to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-3..7).contains(&exponent) {
        let (first, rest) = digits.split_at(1);
        let rest = if rest.is_empty() { "0" } else { rest };
        return format!("{}.{}E{}", first, rest, exponent);
    }

    if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        return format!("0.{}{}", zeros, digits);
    }

    let split = exponent as usize + 1;
    if digits.len() > split {
        format!("{}.{}", &digits[..split], &digits[split..])
    } else {
        format!("{}{}.0", digits, "0".repeat(split - digits.len()))
    }
}

/// A compile-time constant value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstantValue {
    String(String),
    Integer(i64),
    Float(FloatValue),
    Char(char),
    Boolean(bool),
}

impl ConstantValue {
    pub fn into_string(self) -> Option<String> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::Char(value) => write!(f, "{}", value),
            Self::Boolean(value) => write!(f, "{}", value),
        }
    }
}

/// Semantic queries over a parsed unit.
///
/// Resolution may be expensive, so callers should only ask when the
/// syntax already suggests a match.
pub trait BindingResolver {
    /// Fully-qualified name of the annotation's type, if it resolves.
    fn resolve_annotation_type(&self, annotation: &Annotation) -> Option<String>;

    /// Compile-time constant value of an expression, if it has one.
    fn resolve_constant(&self, expression: &Expression) -> Option<ConstantValue>;
}

/// A compilation unit with bindings available.
pub struct ResolvedUnit {
    unit: CompilationUnit,
    resolver: Box<dyn BindingResolver>,
}

impl ResolvedUnit {
    pub fn new(unit: CompilationUnit, resolver: impl BindingResolver + 'static) -> Self {
        Self {
            unit,
            resolver: Box::new(resolver),
        }
    }

    pub fn unit(&self) -> &CompilationUnit {
        &self.unit
    }

    pub fn resolver(&self) -> &dyn BindingResolver {
        self.resolver.as_ref()
    }
}

impl fmt::Debug for ResolvedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedUnit")
            .field("unit", &self.unit)
            .finish_non_exhaustive()
    }
}

/// Parses compilation units on behalf of the preprocessor.
///
/// Implementations must be thread-safe: extraction may run on a rayon
/// pool.
pub trait SourceParser: Send + Sync {
    /// Cheap parse without semantic bindings.
    fn parse_syntax_only(&self, unit_name: &str, source: &str) -> Option<CompilationUnit>;

    /// Expensive parse with semantic bindings available.
    fn parse_with_bindings(&self, unit_name: &str, source: &str) -> Option<ResolvedUnit>;
}

impl<P: SourceParser + ?Sized> SourceParser for &P {
    fn parse_syntax_only(&self, unit_name: &str, source: &str) -> Option<CompilationUnit> {
        (**self).parse_syntax_only(unit_name, source)
    }

    fn parse_with_bindings(&self, unit_name: &str, source: &str) -> Option<ResolvedUnit> {
        (**self).parse_with_bindings(unit_name, source)
    }
}
