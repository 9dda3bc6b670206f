use crate::assembler::DocumentFragment;
use crate::schema::{Extensions, Schema};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// Operations of one path, keyed by lowercase HTTP method
pub type PathItem = IndexMap<String, Operation>;

/// Swagger document builder - merges per-block fragments into one document
pub struct SwaggerBuilder {
    document: SwaggerDocument,
}

/// Swagger Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// contact, license, termsOfService, extensions
    #[serde(flatten)]
    pub extra: Extensions,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            title: "Generated API".to_string(),
            version: "1.0.0".to_string(),
            description: None,
            extra: Extensions::new(),
        }
    }
}

/// Swagger Tag object - an operation grouping label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagObject {
    /// Group name
    pub name: String,
    /// Group description
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Extensions,
}

/// Swagger Operation object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Tag group names
    #[serde(default)]
    pub tags: Vec<String>,
    /// Leading free text of the comment block
    #[serde(default)]
    pub description: String,
    /// Operation summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation ID
    #[serde(rename = "operationId", default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Response media types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    /// Request media types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    /// Security requirements, as written in the annotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<serde_json::Value>,
    /// Whether the operation is deprecated
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Parameters in declaration order
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Responses keyed by status code
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    #[serde(flatten)]
    pub extra: Extensions,
}

/// Swagger Parameter object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (query, path, body, ...)
    #[serde(rename = "in")]
    pub location: String,
    /// Parameter description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the parameter is required
    #[serde(default)]
    pub required: bool,
    /// Inline type, set when no schema applies
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    /// Allowed values for enum parameters
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Schema for model and container types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(flatten)]
    pub extra: Extensions,
}

/// Swagger Response object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    #[serde(default)]
    pub description: String,
    /// Response body schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// Response headers keyed by header name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, Header>>,
    #[serde(flatten)]
    pub extra: Extensions,
}

/// Swagger Header object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Header value type
    #[serde(rename = "type")]
    pub header_type: String,
    /// Header description
    #[serde(default)]
    pub description: String,
}

/// A model property: a schema plus documentation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(flatten)]
    pub schema: Schema,
    /// Property description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Example value, typed after the declared property type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

/// A named model in the `definitions` map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Inherited models
    #[serde(rename = "allOf", default, skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<Schema>>,
    /// Names of required properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Properties in declaration order
    #[serde(default)]
    pub properties: IndexMap<String, Property>,
    /// `type`, `description` and other keywords of base definitions
    #[serde(flatten)]
    pub extra: Extensions,
}

/// Complete Swagger 2.0 document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerDocument {
    /// Swagger version
    #[serde(default = "default_swagger_version")]
    pub swagger: String,
    /// API info
    #[serde(default)]
    pub info: Info,
    /// API host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Base path prepended to every path
    #[serde(rename = "basePath", default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Transfer protocols
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemes: Option<Vec<String>>,
    /// Default request media types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    /// Default response media types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    /// Security scheme definitions, passed through from the base definition
    #[serde(rename = "securityDefinitions", default, skip_serializing_if = "Option::is_none")]
    pub security_definitions: Option<serde_json::Value>,
    /// Operation groups
    #[serde(default)]
    pub tags: Vec<TagObject>,
    /// API paths
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Model definitions
    #[serde(default)]
    pub definitions: IndexMap<String, ModelDefinition>,
    /// Top-level `security`, `externalDocs`, `parameters`, `responses` and
    /// vendor extensions of the base definition
    #[serde(flatten)]
    pub extra: Extensions,
}

fn default_swagger_version() -> String {
    "2.0".to_string()
}

impl Default for SwaggerDocument {
    fn default() -> Self {
        Self {
            swagger: default_swagger_version(),
            info: Info::default(),
            host: None,
            base_path: None,
            schemes: None,
            consumes: None,
            produces: None,
            security_definitions: None,
            tags: Vec::new(),
            paths: IndexMap::new(),
            definitions: IndexMap::new(),
            extra: Extensions::new(),
        }
    }
}

impl SwaggerBuilder {
    /// Create a new SwaggerBuilder with default info
    pub fn new() -> Self {
        debug!("Initializing SwaggerBuilder");
        Self {
            document: SwaggerDocument::default(),
        }
    }

    /// Start from a base definition (info, host, securityDefinitions, ...)
    pub fn from_definition(document: SwaggerDocument) -> Self {
        debug!("Initializing SwaggerBuilder from base definition '{}'", document.info.title);
        Self { document }
    }

    /// Override the title and/or version of the info block, keeping the rest
    pub fn with_info_overrides(mut self, title: Option<String>, version: Option<String>) -> Self {
        if let Some(title) = title {
            debug!("Overriding API title: {}", title);
            self.document.info.title = title;
        }
        if let Some(version) = version {
            debug!("Overriding API version: {}", version);
            self.document.info.version = version;
        }
        self
    }

    /// Merge one block's fragment into the document.
    ///
    /// Operations replace earlier ones with the same path and method,
    /// definitions replace earlier ones with the same name, and tags are only
    /// added when no tag with that name exists yet.
    pub fn add_fragment(&mut self, fragment: DocumentFragment) {
        for (uri, operations) in fragment.paths {
            let path_item = self.document.paths.entry(uri.clone()).or_default();
            for (method, operation) in operations {
                debug!("Adding operation: {} {}", method, uri);
                path_item.insert(method, operation);
            }
        }

        for (name, definition) in fragment.definitions {
            debug!("Adding definition: {}", name);
            self.document.definitions.insert(name, definition);
        }

        for tag in fragment.tags {
            if !self.document.tags.iter().any(|t| t.name == tag.name) {
                self.document.tags.push(tag);
            }
        }
    }

    /// Merge a list of fragments in order
    pub fn add_fragments(&mut self, fragments: impl IntoIterator<Item = DocumentFragment>) {
        for fragment in fragments {
            self.add_fragment(fragment);
        }
    }

    /// Build the final Swagger document
    pub fn build(self) -> SwaggerDocument {
        debug!(
            "Building final Swagger document: {} paths, {} definitions",
            self.document.paths.len(),
            self.document.definitions.len()
        );
        self.document
    }
}

impl Default for SwaggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn operation(summary: &str) -> Operation {
        Operation {
            summary: Some(summary.to_string()),
            ..Operation::default()
        }
    }

    fn fragment_with(uri: &str, method: &str, op: Operation) -> DocumentFragment {
        let mut fragment = DocumentFragment::default();
        fragment
            .paths
            .entry(uri.to_string())
            .or_default()
            .insert(method.to_string(), op);
        fragment
    }

    #[test]
    fn test_new_builder() {
        let document = SwaggerBuilder::new().build();

        assert_eq!(document.swagger, "2.0");
        assert_eq!(document.info.title, "Generated API");
        assert_eq!(document.info.version, "1.0.0");
        assert!(document.paths.is_empty());
        assert!(document.definitions.is_empty());
    }

    #[test]
    fn test_with_info_overrides() {
        let document = SwaggerBuilder::new()
            .with_info_overrides(Some("My API".to_string()), None)
            .build();

        assert_eq!(document.info.title, "My API");
        assert_eq!(document.info.version, "1.0.0");

        let base: SwaggerDocument = serde_json::from_str(
            r#"{"info": {"title": "Pets", "version": "1.0.0", "description": "All pets",
                "contact": {"name": "Pet team"}}}"#,
        )
        .unwrap();
        let document = SwaggerBuilder::from_definition(base)
            .with_info_overrides(None, Some("2.0.0".to_string()))
            .build();

        assert_eq!(document.info.title, "Pets");
        assert_eq!(document.info.version, "2.0.0");
        assert_eq!(document.info.description.as_deref(), Some("All pets"));
        assert_eq!(document.info.extra["contact"]["name"], "Pet team");
    }

    #[test]
    fn test_methods_on_same_path_are_merged() {
        let mut builder = SwaggerBuilder::new();
        builder.add_fragment(fragment_with("/users", "get", operation("list")));
        builder.add_fragment(fragment_with("/users", "post", operation("create")));

        let document = builder.build();
        assert_eq!(document.paths.len(), 1);
        let path_item = &document.paths["/users"];
        assert_eq!(path_item.keys().collect::<Vec<_>>(), vec!["get", "post"]);
    }

    #[test]
    fn test_later_operation_replaces_same_method() {
        let mut builder = SwaggerBuilder::new();
        builder.add_fragment(fragment_with("/users", "get", operation("first")));
        builder.add_fragment(fragment_with("/users", "get", operation("second")));

        let document = builder.build();
        assert_eq!(
            document.paths["/users"]["get"].summary,
            Some("second".to_string())
        );
    }

    #[test]
    fn test_tags_are_unique_by_name() {
        let mut builder = SwaggerBuilder::new();
        let mut first = DocumentFragment::default();
        first.tags.push(TagObject {
            name: "users".to_string(),
            description: "User operations".to_string(),
            ..TagObject::default()
        });
        let mut second = DocumentFragment::default();
        second.tags.push(TagObject {
            name: "users".to_string(),
            description: "".to_string(),
            ..TagObject::default()
        });
        builder.add_fragments(vec![first, second]);

        let document = builder.build();
        assert_eq!(document.tags.len(), 1);
        assert_eq!(document.tags[0].description, "User operations");
    }

    #[test]
    fn test_definitions_are_merged() {
        let mut builder = SwaggerBuilder::new();
        let mut fragment = DocumentFragment::default();
        fragment
            .definitions
            .insert("Widget".to_string(), ModelDefinition::default());
        builder.add_fragment(fragment);

        let document = builder.build();
        assert!(document.definitions.contains_key("Widget"));
    }

    #[test]
    fn test_from_definition_keeps_base_fields() {
        let base: SwaggerDocument = serde_yaml::from_str(
            "info:\n  title: Pets\n  version: 3.1.0\nhost: api.example.com\nbasePath: /v1\n",
        )
        .unwrap();
        let document = SwaggerBuilder::from_definition(base).build();

        assert_eq!(document.swagger, "2.0");
        assert_eq!(document.info.title, "Pets");
        assert_eq!(document.host.as_deref(), Some("api.example.com"));
        assert_eq!(document.base_path.as_deref(), Some("/v1"));
    }

    #[test]
    fn test_operation_serialization_skips_empty_fields() {
        let op = Operation {
            tags: vec!["default".to_string()],
            ..Operation::default()
        };
        let value = serde_json::to_value(&op).unwrap();

        assert!(value.get("deprecated").is_none());
        assert!(value.get("summary").is_none());
        assert_eq!(value["tags"][0], "default");
        assert!(value["responses"].is_object());
    }
}
