//! Folds the tags of one comment block into a document fragment.
//!
//! A block either declares a model (its first tag is `@typedef`) or documents
//! one or more operations (each `@route` tag opens a new operation). Tags that
//! modify an operation apply to the most recent route; `@param` and `@returns`
//! tags written before the first route are held back and attached to it.

use crate::decoders::{
    parse_group, parse_headers, parse_media_types, parse_param, parse_response, parse_route,
    parse_security, parse_typedef, HeaderMap, RouteDescriptor,
};
use crate::openapi_builder::{ModelDefinition, Operation, Parameter, PathItem, Response, TagObject};
use crate::tag_parser::{ParsedComment, Tag};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// The part of a Swagger document produced by one comment block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentFragment {
    /// Operations keyed by path, then by lowercase method
    pub paths: IndexMap<String, PathItem>,
    /// Tag groups referenced by the operations
    pub tags: Vec<TagObject>,
    /// Model definitions keyed by name
    pub definitions: IndexMap<String, ModelDefinition>,
}

impl DocumentFragment {
    /// Returns true when the fragment carries no paths, tags or definitions
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.tags.is_empty() && self.definitions.is_empty()
    }
}

/// The annotation vocabulary, keyed by tag title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationKind {
    Route,
    Param,
    OperationId,
    Summary,
    Produces,
    Consumes,
    Security,
    Deprecated,
    Returns,
    Headers,
    Group,
    Typedef,
    Property,
    Unknown(String),
}

impl From<&str> for AnnotationKind {
    fn from(title: &str) -> Self {
        match title {
            "route" => Self::Route,
            "param" => Self::Param,
            "operationId" => Self::OperationId,
            "summary" => Self::Summary,
            "produces" => Self::Produces,
            "consumes" => Self::Consumes,
            "security" => Self::Security,
            "deprecated" => Self::Deprecated,
            "returns" | "return" => Self::Returns,
            "headers" | "header" => Self::Headers,
            "group" => Self::Group,
            "typedef" => Self::Typedef,
            "property" => Self::Property,
            _ => Self::Unknown(title.to_string()),
        }
    }
}

/// Accumulator threaded through the tag fold
#[derive(Default)]
struct AssemblyState {
    fragment: DocumentFragment,
    current: Option<RouteDescriptor>,
    pending_parameters: Vec<Parameter>,
    pending_responses: Vec<(String, Response)>,
}

impl AssemblyState {
    fn open_route(&mut self, route: RouteDescriptor, description: &str, group: &TagObject) {
        debug!("Opening operation: {} {}", route.method, route.uri);

        let operation = Operation {
            tags: vec![group.name.clone()],
            description: description.to_string(),
            parameters: std::mem::take(&mut self.pending_parameters),
            responses: self.pending_responses.drain(..).collect(),
            ..Operation::default()
        };

        self.fragment
            .paths
            .entry(route.uri.clone())
            .or_default()
            .insert(route.method.clone(), operation);

        if !self.fragment.tags.iter().any(|t| t.name == group.name) {
            self.fragment.tags.push(group.clone());
        }
        self.current = Some(route);
    }

    fn current_operation(&mut self) -> Option<&mut Operation> {
        let route = self.current.as_ref()?;
        self.fragment.paths.get_mut(&route.uri)?.get_mut(&route.method)
    }

    fn add_parameter(&mut self, parameter: Parameter) {
        match self.current_operation() {
            Some(operation) => operation.parameters.push(parameter),
            None => self.pending_parameters.push(parameter),
        }
    }

    fn add_response(&mut self, code: String, response: Response) {
        match self.current_operation() {
            Some(operation) => {
                operation.responses.insert(code, response);
            }
            None => self.pending_responses.push((code, response)),
        }
    }

    /// Applies `update` to the current operation; inert before the first route.
    fn update(&mut self, tag: &Tag, update: impl FnOnce(&mut Operation)) {
        match self.current_operation() {
            Some(operation) => update(operation),
            None => debug!("Ignoring @{} before any @route", tag.title),
        }
    }

    fn finish(self) -> DocumentFragment {
        if self.current.is_none() && !self.pending_parameters.is_empty() {
            debug!(
                "Discarding {} parameters from a block without @route",
                self.pending_parameters.len()
            );
        }
        self.fragment
    }
}

/// Folds one comment's tags into a [`DocumentFragment`].
pub fn assemble(comment: &ParsedComment) -> DocumentFragment {
    let tags = comment.tags.as_slice();

    if let Some(first) = tags.first() {
        if AnnotationKind::from(first.title.as_str()) == AnnotationKind::Typedef {
            return assemble_model(tags);
        }
    }

    let headers: HeaderMap = parse_headers(tags);
    let group = parse_group(tags);
    let mut state = AssemblyState::default();

    for tag in tags {
        let text = tag.description_or_empty();
        match AnnotationKind::from(tag.title.as_str()) {
            AnnotationKind::Route => state.open_route(parse_route(text), &comment.description, &group),
            AnnotationKind::Param => state.add_parameter(parse_param(tag)),
            AnnotationKind::Returns => {
                let (code, response) = parse_response(tag, &headers);
                state.add_response(code, response);
            }
            AnnotationKind::OperationId => {
                state.update(tag, |op| op.operation_id = tag.description.clone())
            }
            AnnotationKind::Summary => state.update(tag, |op| op.summary = tag.description.clone()),
            AnnotationKind::Produces => {
                state.update(tag, |op| op.produces = Some(parse_media_types(text)))
            }
            AnnotationKind::Consumes => {
                state.update(tag, |op| op.consumes = Some(parse_media_types(text)))
            }
            AnnotationKind::Security => {
                state.update(tag, |op| op.security = Some(parse_security(text)))
            }
            AnnotationKind::Deprecated => state.update(tag, |op| op.deprecated = true),
            // Collected for the whole block before the fold
            AnnotationKind::Headers | AnnotationKind::Group => {}
            AnnotationKind::Typedef | AnnotationKind::Property => {
                debug!("Ignoring @{} outside a leading @typedef", tag.title)
            }
            AnnotationKind::Unknown(title) => debug!("Ignoring unknown tag @{}", title),
        }
    }

    state.finish()
}

fn assemble_model(tags: &[Tag]) -> DocumentFragment {
    let mut fragment = DocumentFragment::default();
    match parse_typedef(tags) {
        Some((name, model)) if !name.is_empty() => {
            debug!("Adding model definition: {}", name);
            fragment.definitions.insert(name, model);
        }
        _ => debug!("Skipping @typedef without a name"),
    }
    fragment
}
