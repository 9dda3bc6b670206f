//! Decoders for the text of individual annotation tags.
//!
//! Every decoder is total: malformed input yields `None`, an empty collection,
//! or a documented default, never an error.

use crate::openapi_builder::{
    Header, ModelDefinition, Parameter, Property, Response, TagObject,
};
use crate::schema::{is_primitive, Schema};
use crate::tag_parser::Tag;
use crate::type_resolver::{resolve_items, resolve_schema, resolve_type, TypeExpression};
use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

static RE_EXAMPLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\s*eg:\s*").unwrap());

static RE_HEADER_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+-\s+").unwrap());

static RE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// Method used when a route line names none
pub const DEFAULT_METHOD: &str = "get";

/// Location used when a field path names none.
///
/// This is the same token as [`DEFAULT_METHOD`]; annotations are expected to
/// spell out `query`, `path`, `body`, ... explicitly.
pub const DEFAULT_LOCATION: &str = "get";

/// Tag group used when a block has no `group` tag
pub const DEFAULT_GROUP: &str = "default";

/// Type name that switches a parameter or property to enum decoding
pub const ENUM_TYPE: &str = "enum";

/// `METHOD /uri` from a `route` tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteDescriptor {
    /// Lowercase HTTP method
    pub method: String,
    /// Path template
    pub uri: String,
}

/// `name.location[.required]` from a `param` or `property` tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub location: String,
    pub required: bool,
}

/// Base type and values decoded from `- eg: [type:]a,b,c`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub base_type: String,
    pub values: Vec<String>,
}

/// Headers grouped by status code, then by header name
pub type HeaderMap = IndexMap<String, IndexMap<String, Header>>;

/// Decodes `METHOD /uri`; the method defaults to `get`, the uri to empty.
pub fn parse_route(text: &str) -> RouteDescriptor {
    let mut tokens = text.split_whitespace();
    let method = tokens
        .next()
        .map(str::to_lowercase)
        .unwrap_or_else(|| DEFAULT_METHOD.to_string());
    let uri = tokens.next().unwrap_or_default().to_string();
    RouteDescriptor { method, uri }
}

/// Decodes a `name.location[.required]` field path.
pub fn parse_field(path: &str) -> FieldDescriptor {
    let segments: Vec<&str> = path.split('.').collect();
    FieldDescriptor {
        name: segments[0].to_string(),
        location: segments
            .get(1)
            .filter(|s| !s.is_empty())
            .unwrap_or(&DEFAULT_LOCATION)
            .to_string(),
        required: segments.get(2) == Some(&"required"),
    }
}

/// Decodes the value list following `- eg:` in a description.
pub fn parse_enum(description: &str) -> Option<EnumDescriptor> {
    let parts: Vec<&str> = RE_EXAMPLE_SEPARATOR.splitn(description, 2).collect();
    let literal = parts.get(1)?;

    let (base_type, values) = match literal.split_once(':') {
        Some((base_type, values)) => (base_type.trim(), values),
        None => ("string", *literal),
    };

    let values: Vec<String> = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    if values.is_empty() {
        return None;
    }

    Some(EnumDescriptor {
        base_type: base_type.to_string(),
        values,
    })
}

/// Groups every `header`/`headers` tag of a block by status code and name.
///
/// Lines must read `code.Name - type description`; anything else is skipped.
pub fn parse_headers(tags: &[Tag]) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for tag in tags.iter().filter(|t| t.title == "header" || t.title == "headers") {
        match parse_header_line(tag.description_or_empty()) {
            Some((code, name, header)) => {
                headers.entry(code).or_default().insert(name, header);
            }
            None => debug!("Skipping malformed header line: {:?}", tag.description),
        }
    }

    headers
}

fn parse_header_line(line: &str) -> Option<(String, String, Header)> {
    let parts: Vec<&str> = RE_HEADER_SEPARATOR.splitn(line, 2).collect();
    let (target, detail) = match parts.as_slice() {
        [target, detail] => (*target, *detail),
        [target] => (*target, ""),
        _ => return None,
    };

    let (code_part, name) = target.trim().split_once('.')?;
    let code = RE_DIGITS.find(code_part)?.as_str();
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let type_match = RE_WORD.find(detail)?;
    let description = detail[type_match.end()..].trim();

    Some((
        code.to_string(),
        name.to_string(),
        Header {
            header_type: type_match.as_str().to_string(),
            description: description.to_string(),
        },
    ))
}

/// Parses a JSON security requirement list, or wraps a bare scheme name as
/// `[{ "<name>": [] }]`.
pub fn parse_security(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(list @ Value::Array(_)) => list,
        Ok(requirement @ Value::Object(_)) => Value::Array(vec![requirement]),
        _ => json!([{ (text.trim()): [] }]),
    }
}

/// Splits a `produces`/`consumes` description into media types.
pub fn parse_media_types(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Decodes `code - description` from a `returns` tag.
pub fn parse_response(tag: &Tag, headers: &HeaderMap) -> (String, Response) {
    let text = tag.description_or_empty();
    let (code, description) = text.split_once('-').unwrap_or((text, ""));
    let code = code.trim().to_string();

    let schema = tag.type_expr.as_ref().and_then(|expr| {
        resolve_schema(Some(expr)).or_else(|| resolve_type(Some(expr)).map(|t| Schema::primitive(&t)))
    });

    let response = Response {
        description: description.trim().to_string(),
        schema,
        headers: headers.get(&code).cloned(),
        ..Response::default()
    };
    (code, response)
}

/// `name - description` from the first `group` tag, or the default group.
pub fn parse_group(tags: &[Tag]) -> TagObject {
    let (name, description) = tags
        .iter()
        .find(|t| t.title == "group")
        .map(|t| {
            let text = t.description_or_empty();
            text.split_once('-').unwrap_or((text, ""))
        })
        .unwrap_or((DEFAULT_GROUP, ""));

    TagObject {
        name: name.trim().to_string(),
        description: description.trim().to_string(),
        ..TagObject::default()
    }
}

/// Coerces an example value after the declared type.
pub fn parse_example(declared_type: Option<&str>, raw: &str) -> Option<Value> {
    let raw = raw.trim();
    match declared_type {
        Some("boolean") => Some(Value::Bool(raw == "true")),
        Some("integer") => match raw.parse::<i64>() {
            Ok(n) => Some(json!(n)),
            Err(_) => match raw.parse::<f64>() {
                Ok(f) => serde_json::Number::from_f64(f).map(Value::Number),
                Err(_) => {
                    debug!("Dropping non-numeric integer example: {}", raw);
                    None
                }
            },
        },
        Some(ENUM_TYPE) => None,
        _ => Some(Value::String(raw.to_string())),
    }
}

/// Builds a parameter from a `param` tag.
pub fn parse_param(tag: &Tag) -> Parameter {
    let field = parse_field(tag.name.as_deref().unwrap_or_default());
    let mut parameter = Parameter {
        name: field.name,
        location: field.location,
        description: tag.description.clone(),
        required: field.required,
        ..Parameter::default()
    };

    let type_expr = tag.type_expr.as_ref();
    match resolve_schema(type_expr) {
        Some(schema) => parameter.schema = Some(schema),
        None => {
            let declared = resolve_type(type_expr);
            if declared.as_deref() == Some(ENUM_TYPE) {
                let (base_type, values) = enum_or_string(tag.description_or_empty());
                parameter.param_type = Some(base_type);
                parameter.enum_values = values;
            } else {
                parameter.param_type = declared;
            }
        }
    }

    parameter
}

fn enum_or_string(description: &str) -> (String, Option<Vec<String>>) {
    match parse_enum(description) {
        Some(decoded) => (decoded.base_type, Some(decoded.values)),
        None => {
            debug!("Enum without values, falling back to string: {}", description);
            ("string".to_string(), None)
        }
    }
}

/// Builds a model property from a `property` tag; returns the property name
/// and whether it is marked required.
pub fn parse_property(tag: &Tag) -> (String, bool, Property) {
    let path = tag.name.as_deref().unwrap_or_default();
    let mut segments = path.split('.');
    let name = segments.next().unwrap_or_default().to_string();
    let required = segments.next() == Some("required");

    let type_expr = tag.type_expr.as_ref();
    if let Some(schema) = resolve_schema(type_expr) {
        return (
            name,
            required,
            Property {
                schema,
                ..Property::default()
            },
        );
    }

    let declared = resolve_type(type_expr);
    let text = tag.description_or_empty();
    let mut parts = RE_EXAMPLE_SEPARATOR.splitn(text, 2);
    let description = parts.next().unwrap_or_default().trim();
    let example = parts.next();

    let mut property = Property {
        schema: Schema {
            schema_type: declared.clone(),
            items: resolve_items(type_expr).map(Box::new),
            ..Schema::default()
        },
        description: Some(description.to_string()),
        example: None,
    };

    if declared.as_deref() == Some(ENUM_TYPE) {
        let literal = format!("- eg:{}", example.unwrap_or_default());
        let (base_type, values) = enum_or_string(&literal);
        property.schema.schema_type = Some(base_type);
        property.schema.enum_values = values;
    }

    if let Some(example) = example {
        property.example = parse_example(declared.as_deref(), example);
    }

    (name, required, property)
}

/// Builds a model from a block whose first tag is `typedef`.
pub fn parse_typedef(tags: &[Tag]) -> Option<(String, ModelDefinition)> {
    let (head, rest) = tags.split_first()?;
    let type_name = head.name.clone().unwrap_or_default();

    let mut model = ModelDefinition::default();
    if let Some(parent) = inherited_model(head.type_expr.as_ref()) {
        model.all_of = Some(vec![Schema::reference(&parent)]);
    }

    for tag in rest.iter().filter(|t| t.title == "property") {
        let (name, required, property) = parse_property(tag);
        if required {
            model.required.get_or_insert_with(Vec::new).push(name.clone());
        }
        model.properties.insert(name, property);
    }

    Some((type_name, model))
}

/// Models only inherit from other models, never from inline primitives.
fn inherited_model(expr: Option<&TypeExpression>) -> Option<String> {
    match expr? {
        TypeExpression::Qualified(name) => Some(name.clone()),
        TypeExpression::Named(name) if !is_primitive(name) => Some(name.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tag(title: &str, description: &str) -> Tag {
        Tag::new(title, description)
    }

    #[test]
    fn test_parse_route() {
        assert_eq!(
            parse_route("GET /items"),
            RouteDescriptor {
                method: "get".to_string(),
                uri: "/items".to_string()
            }
        );
        assert_eq!(parse_route("POST   /items/{id}").uri, "/items/{id}");
        assert_eq!(
            parse_route(""),
            RouteDescriptor {
                method: "get".to_string(),
                uri: String::new()
            }
        );
        assert_eq!(parse_route("PUT").uri, "");
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("id.path.required"),
            FieldDescriptor {
                name: "id".to_string(),
                location: "path".to_string(),
                required: true
            }
        );
        let field = parse_field("q.query.optional");
        assert_eq!(field.location, "query");
        assert!(!field.required);
    }

    #[test]
    fn test_parse_field_default_location() {
        let field = parse_field("token");
        assert_eq!(field.name, "token");
        assert_eq!(field.location, DEFAULT_LOCATION);
        assert!(!field.required);
    }

    #[test]
    fn test_parse_enum_with_base_type() {
        assert_eq!(
            parse_enum("- eg: string:red,green,blue"),
            Some(EnumDescriptor {
                base_type: "string".to_string(),
                values: vec!["red".into(), "green".into(), "blue".into()]
            })
        );
        assert_eq!(parse_enum("Role - eg: role:admin,user").unwrap().base_type, "role");
    }

    #[test]
    fn test_parse_enum_defaults_to_string() {
        assert_eq!(
            parse_enum("- eg: red,green"),
            Some(EnumDescriptor {
                base_type: "string".to_string(),
                values: vec!["red".into(), "green".into()]
            })
        );
    }

    #[test]
    fn test_parse_enum_without_marker() {
        assert_eq!(parse_enum("just a colour"), None);
        assert_eq!(parse_enum("colour - eg: "), None);
    }

    #[test]
    fn test_parse_headers_groups_by_code_then_name() {
        let tags = vec![
            tag("headers", "200.X-Rate-Limit - integer requests remaining"),
            tag("header", "200.X-Expires - string when the limit resets"),
            tag("header", "429.Retry-After - integer"),
        ];
        let headers = parse_headers(&tags);

        assert_eq!(headers.len(), 2);
        assert_eq!(
            headers["200"]["X-Rate-Limit"],
            Header {
                header_type: "integer".to_string(),
                description: "requests remaining".to_string()
            }
        );
        assert_eq!(headers["200"]["X-Expires"].header_type, "string");
        assert_eq!(headers["429"]["Retry-After"].description, "");
    }

    #[test]
    fn test_parse_headers_skips_malformed_lines() {
        let tags = vec![
            tag("header", "OK.X-Missing-Code - integer"),
            tag("header", "200 - integer no field name"),
            tag("header", "200.X-No-Type - "),
            tag("header", ""),
            tag("header", "201.Location - string created resource"),
        ];
        let headers = parse_headers(&tags);

        assert_eq!(headers.len(), 1);
        assert_eq!(headers["201"].len(), 1);
        assert!(headers["201"].contains_key("Location"));
    }

    #[test]
    fn test_parse_security_bare_name() {
        assert_eq!(parse_security("apiKey"), json!([{ "apiKey": [] }]));
    }

    #[test]
    fn test_parse_security_json_literal() {
        assert_eq!(
            parse_security(r#"[{"oauth2":["read"]}]"#),
            json!([{ "oauth2": ["read"] }])
        );
    }

    #[test]
    fn test_parse_security_json_object_is_wrapped() {
        assert_eq!(
            parse_security(r#"{"oauth2":["read"]}"#),
            json!([{ "oauth2": ["read"] }])
        );
    }

    #[test]
    fn test_parse_security_scalar_json_is_a_scheme_name() {
        assert_eq!(parse_security("42"), json!([{ "42": [] }]));
    }

    #[test]
    fn test_parse_media_types() {
        assert_eq!(
            parse_media_types("application/json   text/xml"),
            vec!["application/json".to_string(), "text/xml".to_string()]
        );
    }

    #[test]
    fn test_parse_response_with_model_and_headers() {
        let headers = parse_headers(&[tag("headers", "200.X-Rate-Limit - integer remaining")]);
        let returns = tag("returns", "200 - the widget").with_type(TypeExpression::Qualified("Widget".into()));
        let (code, response) = parse_response(&returns, &headers);

        assert_eq!(code, "200");
        assert_eq!(response.description, "the widget");
        assert_eq!(response.schema, Some(Schema::reference("Widget")));
        assert!(response.headers.unwrap().contains_key("X-Rate-Limit"));
    }

    #[test]
    fn test_parse_response_without_description_or_type() {
        let (code, response) = parse_response(&tag("returns", "204"), &HeaderMap::new());

        assert_eq!(code, "204");
        assert_eq!(response.description, "");
        assert_eq!(response.schema, None);
        assert_eq!(response.headers, None);
    }

    #[test]
    fn test_parse_response_primitive_type() {
        let returns = tag("returns", "200 - count").with_type(TypeExpression::Named("integer".into()));
        let (_, response) = parse_response(&returns, &HeaderMap::new());
        assert_eq!(response.schema, Some(Schema::primitive("integer")));
    }

    #[test]
    fn test_parse_group() {
        let group = parse_group(&[tag("route", "GET /x"), tag("group", "widgets - Widget operations")]);
        assert_eq!(group.name, "widgets");
        assert_eq!(group.description, "Widget operations");

        let group = parse_group(&[tag("route", "GET /x")]);
        assert_eq!(group.name, "default");
        assert_eq!(group.description, "");
    }

    #[test]
    fn test_parse_example_coercion() {
        assert_eq!(parse_example(Some("boolean"), "true"), Some(json!(true)));
        assert_eq!(parse_example(Some("boolean"), "yes"), Some(json!(false)));
        assert_eq!(parse_example(Some("integer"), " 42 "), Some(json!(42)));
        assert_eq!(parse_example(Some("integer"), "4.5"), Some(json!(4.5)));
        assert_eq!(parse_example(Some("integer"), "many"), None);
        assert_eq!(parse_example(Some("enum"), "a,b"), None);
        assert_eq!(parse_example(Some("string"), " hello "), Some(json!("hello")));
    }

    #[test]
    fn test_parse_param_with_type() {
        let param = parse_param(
            &tag("param", "page size")
                .with_name("limit.query.required")
                .with_type(TypeExpression::Named("integer".into())),
        );

        assert_eq!(param.name, "limit");
        assert_eq!(param.location, "query");
        assert!(param.required);
        assert_eq!(param.param_type.as_deref(), Some("integer"));
        assert_eq!(param.schema, None);
    }

    #[test]
    fn test_parse_param_with_model_uses_schema() {
        let param = parse_param(
            &tag("param", "the widget")
                .with_name("body.body.required")
                .with_type(TypeExpression::Qualified("Widget".into())),
        );

        assert_eq!(param.param_type, None);
        assert_eq!(param.schema, Some(Schema::reference("Widget")));
    }

    #[test]
    fn test_parse_param_enum() {
        let param = parse_param(
            &tag("param", "sort order - eg: asc,desc")
                .with_name("order.query")
                .with_type(TypeExpression::Named("enum".into())),
        );

        assert_eq!(param.param_type.as_deref(), Some("string"));
        assert_eq!(param.enum_values, Some(vec!["asc".to_string(), "desc".to_string()]));
        assert_eq!(param.description.as_deref(), Some("sort order - eg: asc,desc"));
    }

    #[test]
    fn test_parse_property_with_example() {
        let (name, required, property) = parse_property(
            &tag("property", "how many - eg: 3")
                .with_name("count.required")
                .with_type(TypeExpression::Named("integer".into())),
        );

        assert_eq!(name, "count");
        assert!(required);
        assert_eq!(property.schema.schema_type.as_deref(), Some("integer"));
        assert_eq!(property.description.as_deref(), Some("how many"));
        assert_eq!(property.example, Some(json!(3)));
    }

    #[test]
    fn test_parse_property_enum() {
        let (_, _, property) = parse_property(
            &tag("property", "Colour - eg: string:red,green")
                .with_name("colour")
                .with_type(TypeExpression::Named("enum".into())),
        );

        assert_eq!(property.schema.schema_type.as_deref(), Some("string"));
        assert_eq!(
            property.schema.enum_values,
            Some(vec!["red".to_string(), "green".to_string()])
        );
        assert_eq!(property.example, None);
    }

    #[test]
    fn test_parse_property_container_is_bare_schema() {
        let (_, _, property) = parse_property(
            &tag("property", "labels")
                .with_name("labels")
                .with_type(TypeExpression::Generic {
                    container: "Array".into(),
                    arguments: vec!["string".into()],
                }),
        );

        assert_eq!(
            serde_json::to_value(&property).unwrap(),
            json!({"type": "array", "items": {"type": "string"}})
        );
    }

    #[test]
    fn test_parse_typedef() {
        let tags = vec![
            tag("typedef", "")
                .with_name("Widget")
                .with_type(TypeExpression::Qualified("Base".into())),
            tag("property", "identifier")
                .with_name("id.required")
                .with_type(TypeExpression::Named("integer".into())),
            tag("property", "display name")
                .with_name("name")
                .with_type(TypeExpression::Named("string".into())),
            tag("route", "GET /ignored"),
        ];
        let (name, model) = parse_typedef(&tags).unwrap();

        assert_eq!(name, "Widget");
        assert_eq!(model.all_of, Some(vec![Schema::reference("Base")]));
        assert_eq!(model.required, Some(vec!["id".to_string()]));
        assert_eq!(model.properties.keys().collect::<Vec<_>>(), vec!["id", "name"]);
    }

    #[test]
    fn test_parse_typedef_object_has_no_parent() {
        let tags = vec![tag("typedef", "")
            .with_name("Plain")
            .with_type(TypeExpression::Named("object".into()))];
        let (_, model) = parse_typedef(&tags).unwrap();

        assert_eq!(model.all_of, None);
        assert_eq!(model.required, None);
        assert!(model.properties.is_empty());
    }
}
