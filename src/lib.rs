//! openapi-from-comments - Swagger 2.0 documents from annotated source comments.
//!
//! Route handlers and models are documented with `/** ... */` blocks carrying
//! JSDoc-style tags (`@route`, `@group`, `@param`, `@returns`, `@headers`,
//! `@security`, `@typedef`, `@property`, ...). This library finds those blocks,
//! decodes the tags and merges everything into one Swagger document.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Resolves file patterns and directories to source files
//! 2. [`block_scanner`] - Finds `/** ... */` blocks in a file's lines
//! 3. [`tag_parser`] - Splits a block into a description and tags
//! 4. [`parser`] - Reads files and runs the two steps above
//! 5. [`type_resolver`] - Interprets tag type expressions as schemas
//! 6. [`decoders`] - Decodes the free text of individual tags
//! 7. [`assembler`] - Turns one parsed comment into a document fragment
//! 8. [`openapi_builder`] - Merges fragments into the final document
//! 9. [`validator`] - Reports dangling model references
//! 10. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_comments::{
//!     assembler::assemble,
//!     openapi_builder::SwaggerBuilder,
//!     parser::CommentParser,
//!     scanner::FileScanner,
//!     serializer::serialize_yaml,
//! };
//! use std::path::PathBuf;
//!
//! let scanner = FileScanner::new(PathBuf::from("./server"), vec!["routes".to_string()]);
//! let scan_result = scanner.scan().unwrap();
//!
//! let mut builder = SwaggerBuilder::new();
//! for parsed in CommentParser::parse_files(&scan_result.source_files)
//!     .into_iter()
//!     .filter_map(Result::ok)
//! {
//!     builder.add_fragments(parsed.comments.iter().map(assemble));
//! }
//!
//! let yaml = serialize_yaml(&builder.build()).unwrap();
//! println!("{}", yaml);
//! ```
//!
//! For command-line usage, see the [`cli`] module.

pub mod assembler;
pub mod block_scanner;
pub mod cli;
pub mod decoders;
pub mod definition;
pub mod error;
pub mod openapi_builder;
pub mod parser;
pub mod scanner;
pub mod schema;
pub mod serializer;
pub mod tag_parser;
pub mod type_resolver;
pub mod validator;
