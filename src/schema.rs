use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prefix used for every reference into the document's `definitions` map
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Fields not modelled by a struct, kept as read so base definitions pass
/// through unchanged (`format`, `x-*` extensions, ...)
pub type Extensions = IndexMap<String, serde_json::Value>;

/// Type names that are emitted inline instead of as a definition reference
pub const PRIMITIVE_TYPES: [&str; 4] = ["object", "string", "integer", "boolean"];

/// Returns true when `name` is one of the inline primitive type names.
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&name)
}

/// Swagger schema object
///
/// Only the shapes the annotation compiler produces are modelled: a definition
/// reference, a primitive type, a container with `items`, a `oneOf` list and an
/// enumeration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to a named definition
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// The type of the schema (string, integer, array, ...)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Items schema for container types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Alternatives for multi-argument containers
    #[serde(rename = "oneOf", skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Schema>>,
    /// Enum values for enum types
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Any other schema keyword
    #[serde(flatten)]
    pub extra: Extensions,
}

impl Schema {
    /// `{"$ref": "#/definitions/<name>"}`
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", DEFINITIONS_PREFIX, name)),
            ..Self::default()
        }
    }

    /// `{"type": "<name>"}`
    pub fn primitive(name: &str) -> Self {
        Self {
            schema_type: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Inline type for primitives, definition reference for everything else.
    pub fn for_element(name: &str) -> Self {
        if is_primitive(name) {
            Self::primitive(name)
        } else {
            Self::reference(name)
        }
    }

    /// `{"type": "<container>", "items": <items>}`
    pub fn container(container: &str, items: Schema) -> Self {
        Self {
            schema_type: Some(container.to_string()),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    /// `{"oneOf": [...]}`
    pub fn one_of(schemas: Vec<Schema>) -> Self {
        Self {
            one_of: Some(schemas),
            ..Self::default()
        }
    }

    /// `{"type": "<base>", "enum": [...]}`
    pub fn enumeration(base_type: &str, values: Vec<String>) -> Self {
        Self {
            schema_type: Some(base_type.to_string()),
            enum_values: Some(values),
            ..Self::default()
        }
    }

    /// Name of the referenced definition, if this schema is a `$ref`
    pub fn referenced_definition(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|r| r.strip_prefix(DEFINITIONS_PREFIX))
    }

    /// Collects every definition name referenced by this schema, depth first.
    pub fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(name) = self.referenced_definition() {
            out.push(name);
        }
        if let Some(items) = &self.items {
            items.collect_references(out);
        }
        if let Some(one_of) = &self.one_of {
            for schema in one_of {
                schema.collect_references(out);
            }
        }
    }
}
