//! Tree-sitter parser integration for Java
//!
//! Lowers just the parts of a Java compilation unit the preprocessor
//! reads: the package declaration with its annotations and, when
//! bindings are requested, the import declarations.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use tree_sitter::{Language, Node, Parser, Tree};

use super::resolve::ImportScope;
use super::{
    Annotation, AnnotationArguments, CompilationUnit, Expression, FloatValue, PackageDeclaration,
    ResolvedUnit, SourceParser, UnaryOperator, OBJECTIVE_C_NAME_ANNOTATION,
};

/// [`SourceParser`] backed by the tree-sitter Java grammar.
///
/// Any tree containing an error or missing node counts as a parse
/// failure, matching a compiler front end that refuses to hand out
/// partial trees.
///
/// Bindings are approximated from the unit's imports plus a set of
/// known type names that stands in for a classpath. The prefix
/// annotation is always known.
#[derive(Clone)]
pub struct TreeSitterJavaParser {
    language: Language,
    known_types: Arc<HashSet<String>>,
}

impl fmt::Debug for TreeSitterJavaParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeSitterJavaParser")
            .field("known_types", &self.known_types.len())
            .finish_non_exhaustive()
    }
}

impl TreeSitterJavaParser {
    pub fn new() -> Result<Self> {
        Self::with_known_types(std::iter::empty::<String>())
    }

    /// Create a parser that treats `types` as resolvable through
    /// on-demand imports.
    pub fn with_known_types<I, S>(types: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let language: Language = tree_sitter_java::LANGUAGE.into();
        Parser::new()
            .set_language(&language)
            .context("Failed to set tree-sitter language")?;

        let mut known_types: HashSet<String> = types.into_iter().map(Into::into).collect();
        known_types.insert(OBJECTIVE_C_NAME_ANNOTATION.to_string());

        Ok(Self {
            language,
            known_types: Arc::new(known_types),
        })
    }

    fn parse_tree(&self, unit_name: &str, source: &str) -> Option<Tree> {
        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&self.language) {
            log::warn!("Cannot parse {}: {}", unit_name, e);
            return None;
        }

        let tree = parser.parse(source, None)?;
        if has_parse_errors(&tree) {
            log::debug!("Syntax errors in {}", unit_name);
            return None;
        }
        Some(tree)
    }
}

impl SourceParser for TreeSitterJavaParser {
    fn parse_syntax_only(&self, unit_name: &str, source: &str) -> Option<CompilationUnit> {
        let tree = self.parse_tree(unit_name, source)?;
        Some(lower_compilation_unit(tree.root_node(), source))
    }

    fn parse_with_bindings(&self, unit_name: &str, source: &str) -> Option<ResolvedUnit> {
        let tree = self.parse_tree(unit_name, source)?;
        let root = tree.root_node();
        let unit = lower_compilation_unit(root, source);

        let mut scope = ImportScope::new(
            unit.package_name().map(str::to_string),
            Arc::clone(&self.known_types),
        );
        for import in named_children(root)
            .into_iter()
            .filter(|node| node.kind() == "import_declaration")
        {
            add_import(&mut scope, import, source);
        }

        Some(ResolvedUnit::new(unit, scope))
    }
}

/// Check if a parse tree has errors
pub fn has_parse_errors(tree: &Tree) -> bool {
    tree.root_node().has_error()
}

fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Node text with whitespace and line breaks inside dotted names removed.
fn compact_text(node: &Node, source: &str) -> String {
    node_text(node, source)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

fn is_comment(node: &Node) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

fn is_name(node: &Node) -> bool {
    matches!(node.kind(), "identifier" | "scoped_identifier")
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !is_comment(child))
        .collect()
}

fn lower_compilation_unit(root: Node, source: &str) -> CompilationUnit {
    let package = named_children(root)
        .into_iter()
        .find(|node| node.kind() == "package_declaration")
        .and_then(|node| lower_package(node, source));
    CompilationUnit::new(package)
}

fn lower_package(node: Node, source: &str) -> Option<PackageDeclaration> {
    let mut name = None;
    let mut annotations = Vec::new();

    for child in named_children(node) {
        match child.kind() {
            "marker_annotation" | "annotation" => {
                if let Some(annotation) = lower_annotation(child, source) {
                    annotations.push(annotation);
                }
            }
            _ if is_name(&child) => name = Some(compact_text(&child, source)),
            _ => {}
        }
    }

    Some(PackageDeclaration {
        name: name?,
        annotations,
    })
}

fn lower_annotation(node: Node, source: &str) -> Option<Annotation> {
    let name = node.child_by_field_name("name")?;
    let arguments = match node.child_by_field_name("arguments") {
        Some(list) => lower_annotation_arguments(list, source),
        None => AnnotationArguments::None,
    };
    Some(Annotation::new(compact_text(&name, source), arguments))
}

fn lower_annotation_arguments(list: Node, source: &str) -> AnnotationArguments {
    let elements = named_children(list);

    if elements.is_empty() {
        return AnnotationArguments::None;
    }

    if elements.iter().all(|node| node.kind() == "element_value_pair") {
        let pairs = elements
            .iter()
            .filter_map(|pair| {
                let key = pair.child_by_field_name("key")?;
                let value = pair.child_by_field_name("value")?;
                Some((
                    node_text(&key, source).to_string(),
                    lower_expression(value, source),
                ))
            })
            .collect();
        return AnnotationArguments::Named(pairs);
    }

    match elements.as_slice() {
        [value] => AnnotationArguments::Single(lower_expression(*value, source)),
        _ => AnnotationArguments::Single(Expression::Other(node_text(&list, source).to_string())),
    }
}

fn lower_expression(node: Node, source: &str) -> Expression {
    let text = node_text(&node, source);
    let other = || Expression::Other(text.to_string());

    match node.kind() {
        "string_literal" => decode_string_literal(text)
            .map(Expression::String)
            .unwrap_or_else(other),
        "character_literal" => decode_char_literal(text)
            .map(Expression::Char)
            .unwrap_or_else(other),
        "decimal_integer_literal"
        | "hex_integer_literal"
        | "octal_integer_literal"
        | "binary_integer_literal" => parse_integer_literal(text)
            .map(Expression::Integer)
            .unwrap_or_else(other),
        "decimal_floating_point_literal" | "hex_floating_point_literal" => {
            parse_float_literal(text)
                .map(Expression::Float)
                .unwrap_or_else(other)
        }
        "true" => Expression::Boolean(true),
        "false" => Expression::Boolean(false),
        "parenthesized_expression" => named_children(node)
            .into_iter()
            .next()
            .map(|inner| lower_expression(inner, source))
            .unwrap_or_else(other),
        "unary_expression" => {
            let operator = node
                .child_by_field_name("operator")
                .and_then(|operator| unary_operator(operator.kind()));
            match (operator, node.child_by_field_name("operand")) {
                (Some(operator), Some(operand)) => {
                    Expression::unary(operator, lower_expression(operand, source))
                }
                _ => other(),
            }
        }
        "binary_expression" => {
            let operator = node.child_by_field_name("operator");
            let left = node.child_by_field_name("left");
            let right = node.child_by_field_name("right");
            match (operator, left, right) {
                (Some(operator), Some(left), Some(right)) if operator.kind() == "+" => {
                    Expression::concat(
                        lower_expression(left, source),
                        lower_expression(right, source),
                    )
                }
                _ => other(),
            }
        }
        "identifier" | "scoped_identifier" | "field_access" => {
            Expression::Name(compact_text(&node, source))
        }
        _ => other(),
    }
}

fn unary_operator(kind: &str) -> Option<UnaryOperator> {
    match kind {
        "+" => Some(UnaryOperator::Plus),
        "-" => Some(UnaryOperator::Minus),
        "~" => Some(UnaryOperator::BitNot),
        "!" => Some(UnaryOperator::Not),
        _ => None,
    }
}

fn add_import(scope: &mut ImportScope, node: Node, source: &str) {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();

    // Static imports bring in members, not types.
    if children.iter().any(|child| child.kind() == "static") {
        return;
    }
    let Some(name) = children.iter().find(|child| is_name(child)) else {
        return;
    };
    let name = compact_text(name, source);

    if children.iter().any(|child| child.kind() == "asterisk") {
        scope.add_on_demand_import(name);
    } else {
        scope.add_single_type_import(name);
    }
}

/// Decode a `"..."` literal. Text blocks are not treated as constants.
fn decode_string_literal(raw: &str) -> Option<String> {
    if raw.starts_with("\"\"\"") {
        return None;
    }
    let body = raw.strip_prefix('"')?.strip_suffix('"')?;
    unescape(body)
}

fn decode_char_literal(raw: &str) -> Option<char> {
    let body = raw.strip_prefix('\'')?.strip_suffix('\'')?;
    let decoded = unescape(body)?;
    let mut chars = decoded.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'r' => out.push('\r'),
            'f' => out.push('\u{c}'),
            's' => out.push(' '),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '\\' => out.push('\\'),
            'u' => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 {
                    return None;
                }
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code)?);
            }
            first @ '0'..='7' => {
                // Up to three octal digits, and only up to \377.
                let max_digits = if first <= '3' { 3 } else { 2 };
                let mut digits = String::from(first);
                while digits.len() < max_digits {
                    match chars.peek() {
                        Some(&d @ '0'..='7') => {
                            digits.push(d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                let code = u32::from_str_radix(&digits, 8).ok()?;
                out.push(char::from_u32(code)?);
            }
            _ => return None,
        }
    }
    Some(out)
}

fn parse_integer_literal(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .trim_end_matches(['l', 'L'])
        .chars()
        .filter(|c| *c != '_')
        .collect();
    let lower = cleaned.to_ascii_lowercase();

    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(binary) = lower.strip_prefix("0b") {
        i64::from_str_radix(binary, 2).ok()
    } else if lower.len() > 1 && lower.starts_with('0') {
        i64::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse().ok()
    }
}

/// `1.5`, `.5f`, `1e10`, `0x1.8p1d`; an `f` suffix makes a `float`.
fn parse_float_literal(raw: &str) -> Option<FloatValue> {
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    let (body, single) = match lower.strip_suffix('f') {
        Some(body) => (body, true),
        None => (lower.strip_suffix('d').unwrap_or(&lower), false),
    };

    if let Some(hex) = body.strip_prefix("0x") {
        let value = parse_hex_float(hex)?;
        return Some(if single {
            FloatValue::Float(value as f32)
        } else {
            FloatValue::Double(value)
        });
    }

    if single {
        body.parse().ok().map(FloatValue::Float)
    } else {
        body.parse().ok().map(FloatValue::Double)
    }
}

fn parse_hex_float(hex: &str) -> Option<f64> {
    let (mantissa, exponent) = hex.split_once('p')?;
    let exponent: i32 = exponent.parse().ok()?;
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let mut value = 0f64;
    for c in whole.chars().chain(fraction.chars()) {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let scale = exponent.checked_sub(4 * i32::try_from(fraction.len()).ok()?)?;
    Some(value * 2f64.powi(scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{BindingResolver, ConstantValue, OBJECTIVE_C_NAME_SIMPLE};
    use indoc::indoc;

    fn parser() -> TreeSitterJavaParser {
        TreeSitterJavaParser::new().unwrap()
    }

    #[test]
    fn test_parse_source_package() {
        let source = indoc! {r#"
            package com.acme.widgets;

            public class Foo {}
        "#};
        let unit = parser()
            .parse_syntax_only("com/acme/widgets/Foo.java", source)
            .unwrap();
        assert_eq!(unit.package_name(), Some("com.acme.widgets"));
    }

    #[test]
    fn test_parse_default_package() {
        let unit = parser()
            .parse_syntax_only("Foo.java", "class Foo {}\n")
            .unwrap();
        assert!(unit.package.is_none());
    }

    #[test]
    fn test_syntax_error_is_parse_failure() {
        let source = "package com.acme\nclass {{{";
        assert!(parser().parse_syntax_only("Broken.java", source).is_none());
        assert!(parser().parse_with_bindings("Broken.java", source).is_none());
    }

    #[test]
    fn test_parse_package_annotation() {
        let source = indoc! {r#"
            @ObjectiveCName("ACMEFoo")
            package com.acme;

            import com.google.j2objc.annotations.ObjectiveCName;
        "#};
        let resolved = parser()
            .parse_with_bindings("com/acme/package-info.java", source)
            .unwrap();
        let package = resolved.unit().package.as_ref().unwrap();

        assert_eq!(package.name, "com.acme");
        assert_eq!(package.annotations.len(), 1);

        let annotation = &package.annotations[0];
        assert_eq!(annotation.simple_name(), OBJECTIVE_C_NAME_SIMPLE);
        assert_eq!(
            resolved.resolver().resolve_annotation_type(annotation),
            Some(OBJECTIVE_C_NAME_ANNOTATION.to_string())
        );
        assert_eq!(
            annotation.single_value(),
            Some(&Expression::string("ACMEFoo"))
        );
    }

    #[test]
    fn test_on_demand_import_resolves_marker() {
        let source = indoc! {r#"
            @ObjectiveCName(value = "ACME" + "Foo")
            package com.acme;

            import com.google.j2objc.annotations.*;
        "#};
        let resolved = parser()
            .parse_with_bindings("com/acme/package-info.java", source)
            .unwrap();
        let annotation = &resolved.unit().package.as_ref().unwrap().annotations[0];

        assert_eq!(
            resolved.resolver().resolve_annotation_type(annotation),
            Some(OBJECTIVE_C_NAME_ANNOTATION.to_string())
        );
        let value = annotation.single_value().unwrap();
        assert_eq!(
            resolved.resolver().resolve_constant(value),
            Some(ConstantValue::String("ACMEFoo".to_string()))
        );
    }

    #[test]
    fn test_unimported_annotation_resolves_to_own_package() {
        let source = indoc! {r#"
            @ObjectiveCName("Nope")
            package com.acme;
        "#};
        let resolved = parser()
            .parse_with_bindings("com/acme/package-info.java", source)
            .unwrap();
        let annotation = &resolved.unit().package.as_ref().unwrap().annotations[0];
        assert_eq!(
            resolved.resolver().resolve_annotation_type(annotation),
            Some("com.acme.ObjectiveCName".to_string())
        );
    }

    #[test]
    fn test_marker_and_qualified_annotations() {
        let source = indoc! {r#"
            @Deprecated
            @com.google.j2objc.annotations.ObjectiveCName("Q")
            package com.acme;
        "#};
        let unit = parser()
            .parse_syntax_only("com/acme/package-info.java", source)
            .unwrap();
        let annotations = &unit.package.unwrap().annotations;

        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].type_name, "Deprecated");
        assert_eq!(annotations[0].arguments, AnnotationArguments::None);
        assert_eq!(annotations[1].type_name, OBJECTIVE_C_NAME_ANNOTATION);
    }

    #[test]
    fn test_static_imports_are_ignored() {
        let source = indoc! {r#"
            @ObjectiveCName("X")
            package com.acme;

            import static org.other.ObjectiveCName.VALUE;
        "#};
        let resolved = parser()
            .parse_with_bindings("com/acme/package-info.java", source)
            .unwrap();
        let annotation = &resolved.unit().package.as_ref().unwrap().annotations[0];
        assert_eq!(
            resolved.resolver().resolve_annotation_type(annotation),
            Some("com.acme.ObjectiveCName".to_string())
        );
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"A\tB").as_deref(), Some("A\tB"));
        assert_eq!(unescape(r"A\101").as_deref(), Some("AA"));
        assert_eq!(unescape(r#"\"q\""#).as_deref(), Some("\"q\""));
        assert_eq!(unescape(r"\q"), None);
    }

    #[test]
    fn test_parse_integer_literal() {
        assert_eq!(parse_integer_literal("42"), Some(42));
        assert_eq!(parse_integer_literal("0x1F"), Some(31));
        assert_eq!(parse_integer_literal("0b101"), Some(5));
        assert_eq!(parse_integer_literal("017"), Some(15));
        assert_eq!(parse_integer_literal("1_000L"), Some(1000));
        assert_eq!(parse_integer_literal("0"), Some(0));
    }

    #[test]
    fn test_parse_float_literal() {
        assert_eq!(parse_float_literal("1.5"), Some(FloatValue::Double(1.5)));
        assert_eq!(parse_float_literal(".5f"), Some(FloatValue::Float(0.5)));
        assert_eq!(parse_float_literal("1_0e1"), Some(FloatValue::Double(100.0)));
        assert_eq!(parse_float_literal("2D"), Some(FloatValue::Double(2.0)));
        assert_eq!(parse_float_literal("0x1.8p1"), Some(FloatValue::Double(3.0)));
        assert_eq!(parse_float_literal("0x1p-2f"), Some(FloatValue::Float(0.25)));
    }

    #[test]
    fn test_unary_and_float_operands_fold() {
        let cases = [
            (r#""B" + -1"#, "B-1"),
            (r#""C" + 1.5"#, "C1.5"),
            (r#""D" + ~1 + +2"#, "D-22"),
            (r#""E" + !false"#, "Etrue"),
            (r#""F" + (1 + 0.5f)"#, "F1.5"),
        ];

        for (argument, expected) in cases {
            let source = format!(
                "@com.google.j2objc.annotations.ObjectiveCName({})\npackage com.acme;\n",
                argument
            );
            let resolved = parser()
                .parse_with_bindings("com/acme/package-info.java", &source)
                .unwrap();
            let annotation = &resolved.unit().package.as_ref().unwrap().annotations[0];
            let value = annotation.single_value().unwrap();
            assert_eq!(
                resolved.resolver().resolve_constant(value),
                Some(ConstantValue::String(expected.to_string())),
                "{}",
                argument
            );
        }
    }
}
