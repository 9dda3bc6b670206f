use crate::schema::{is_primitive, Schema};
use log::debug;

/// Suffix segment marking a name as a reference to a model definition
const MODEL_SEGMENT: &str = "model";

/// A parsed `{...}` type expression from an annotation tag.
///
/// Built once by the tag parser so the rest of the compiler never has to guess
/// at the shape of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpression {
    /// A plain type name such as `string` or `Widget`
    Named(String),
    /// A `Widget.model` reference, holding the bare model name
    Qualified(String),
    /// A container applied to element types, e.g. `Array<string>` or `Widget[]`
    Generic {
        container: String,
        arguments: Vec<String>,
    },
    /// An expression with neither a name nor an application list (unions, `*`, ...)
    Any,
}

impl TypeExpression {
    /// Builds the variant for a dotted name: `X.model` is a reference to `X`,
    /// anything else is kept as a plain name.
    pub fn from_name(name: &str) -> Self {
        let mut segments = name.split('.');
        let head = segments.next().unwrap_or_default();
        match segments.next() {
            Some(MODEL_SEGMENT) => TypeExpression::Qualified(head.to_string()),
            _ => TypeExpression::Named(name.to_string()),
        }
    }

    /// Parses the text between the braces of a type annotation.
    pub fn parse(text: &str) -> Self {
        let text = text
            .trim()
            .trim_start_matches(['?', '!'])
            .trim_end_matches('=')
            .trim();

        if let Some(element) = text.strip_suffix("[]") {
            let element = element.trim();
            if is_simple_name(element) {
                return TypeExpression::Generic {
                    container: "Array".to_string(),
                    arguments: vec![argument_name(element)],
                };
            }
            return TypeExpression::Any;
        }

        if let (Some(open), true) = (text.find('<'), text.ends_with('>')) {
            let container = text[..open].trim_end_matches('.').trim();
            let inner = &text[open + 1..text.len() - 1];
            let arguments: Vec<String> = split_top_level(inner)
                .into_iter()
                .map(|arg| argument_name(arg.trim()))
                .filter(|arg| !arg.is_empty())
                .collect();
            if is_simple_name(container) && !arguments.is_empty() {
                return TypeExpression::Generic {
                    container: container.to_string(),
                    arguments,
                };
            }
            return TypeExpression::Any;
        }

        if is_simple_name(text) {
            TypeExpression::from_name(text)
        } else {
            debug!("Unrecognised type expression: {{{}}}", text);
            TypeExpression::Any
        }
    }
}

fn is_simple_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | '-'))
}

/// Element names keep only their leading name; `X.model` collapses to `X`
/// and nested containers collapse to their container name.
fn argument_name(text: &str) -> String {
    match TypeExpression::parse(text) {
        TypeExpression::Named(name) | TypeExpression::Qualified(name) => name,
        TypeExpression::Generic { container, .. } => container,
        TypeExpression::Any => String::new(),
    }
}

fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '{' | '[' => depth += 1,
            '>' | ')' | '}' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Resolves the type name used when no schema applies.
///
/// Qualified names lose their `.model` segment, containers report their
/// lowercased container name and `Any` defaults to `string`.
pub fn resolve_type(expr: Option<&TypeExpression>) -> Option<String> {
    let resolved = match expr? {
        TypeExpression::Named(name) | TypeExpression::Qualified(name) => name.clone(),
        TypeExpression::Generic { container, .. } => container.to_lowercase(),
        TypeExpression::Any => "string".to_string(),
    };
    Some(resolved)
}

/// Resolves a type expression into a schema, or `None` when the expression is
/// a plain type that should be emitted as `type` instead.
pub fn resolve_schema(expr: Option<&TypeExpression>) -> Option<Schema> {
    match expr? {
        TypeExpression::Qualified(name) => Some(Schema::reference(name)),
        TypeExpression::Generic {
            container,
            arguments,
        } => {
            let container = container.to_lowercase();
            match arguments.as_slice() {
                [] => None,
                [single] => Some(Schema::container(&container, Schema::for_element(single))),
                many => {
                    let one_of = many.iter().map(|arg| Schema::for_element(arg)).collect();
                    Some(Schema::container(&container, Schema::one_of(one_of)))
                }
            }
        }
        TypeExpression::Named(_) | TypeExpression::Any => None,
    }
}

/// Items shape for the first element of a container expression.
pub fn resolve_items(expr: Option<&TypeExpression>) -> Option<Schema> {
    match expr? {
        TypeExpression::Generic { arguments, .. } => {
            arguments.first().map(|arg| Schema::for_element(arg))
        }
        _ => None,
    }
}
