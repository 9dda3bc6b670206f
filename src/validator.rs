//! Reference checks over the merged document.
//!
//! This is not a meta-schema validation: it only reports references to
//! definitions that were never declared and operations the Swagger tooling
//! would reject outright.

use crate::openapi_builder::SwaggerDocument;
use log::{debug, warn};
use std::fmt;

/// A problem found in the merged document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// A `$ref` names a definition that does not exist
    DanglingReference { location: String, definition: String },
    /// An operation declares no responses
    MissingResponses { method: String, uri: String },
    /// A route line produced an empty path
    EmptyPath { method: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidationIssue::DanglingReference {
                location,
                definition,
            } => write!(f, "{} references undefined model '{}'", location, definition),
            ValidationIssue::MissingResponses { method, uri } => {
                write!(f, "{} {} declares no responses", method.to_uppercase(), uri)
            }
            ValidationIssue::EmptyPath { method } => {
                write!(f, "{} operation has an empty path", method.to_uppercase())
            }
        }
    }
}

/// Checks a merged document and reports what it finds.
pub struct DocumentValidator;

impl DocumentValidator {
    /// Returns every issue found, in document order.
    pub fn validate(document: &SwaggerDocument) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for (uri, path_item) in &document.paths {
            for (method, operation) in path_item {
                let location = format!("{} {}", method.to_uppercase(), uri);

                if uri.is_empty() {
                    issues.push(ValidationIssue::EmptyPath {
                        method: method.clone(),
                    });
                }
                if operation.responses.is_empty() {
                    issues.push(ValidationIssue::MissingResponses {
                        method: method.clone(),
                        uri: uri.clone(),
                    });
                }

                let mut references = Vec::new();
                for parameter in &operation.parameters {
                    if let Some(schema) = &parameter.schema {
                        schema.collect_references(&mut references);
                    }
                }
                for response in operation.responses.values() {
                    if let Some(schema) = &response.schema {
                        schema.collect_references(&mut references);
                    }
                }
                check_references(document, &location, &references, &mut issues);
            }
        }

        for (name, model) in &document.definitions {
            let location = format!("definition {}", name);
            let mut references = Vec::new();
            for schema in model.all_of.iter().flatten() {
                schema.collect_references(&mut references);
            }
            for property in model.properties.values() {
                property.schema.collect_references(&mut references);
            }
            check_references(document, &location, &references, &mut issues);
        }

        debug!("Validation found {} issues", issues.len());
        issues
    }

    /// Validates and logs each issue as a warning; the document is returned
    /// unchanged.
    pub fn validate_and_report(document: SwaggerDocument) -> SwaggerDocument {
        for issue in Self::validate(&document) {
            warn!("{}", issue);
        }
        document
    }
}

fn check_references(
    document: &SwaggerDocument,
    location: &str,
    references: &[&str],
    issues: &mut Vec<ValidationIssue>,
) {
    for definition in references {
        if !document.definitions.contains_key(*definition) {
            issues.push(ValidationIssue::DanglingReference {
                location: location.to_string(),
                definition: definition.to_string(),
            });
        }
    }
}
