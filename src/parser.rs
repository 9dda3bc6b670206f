use crate::block_scanner::{scan_blocks, split_lines};
use crate::tag_parser::{parse_block, ParsedComment};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Extracts annotated documentation comments from source files.
///
/// The `CommentParser` reads a file, locates its `/** ... */` blocks and parses
/// each block into a description and tag list. Blocks without any tag carry no
/// annotations and are dropped.
///
/// # Example
///
/// ```no_run
/// use openapi_from_comments::parser::CommentParser;
/// use std::path::Path;
///
/// let parsed = CommentParser::parse_file(Path::new("routes/widgets.js")).unwrap();
/// println!("Found {} annotated comments", parsed.comments.len());
/// ```
pub struct CommentParser;

/// The annotated comments of one source file.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Comments carrying at least one tag, in file order
    pub comments: Vec<ParsedComment>,
}

impl CommentParser {
    /// Parses the annotated comments of in-memory source text.
    pub fn parse_source(source: &str) -> Vec<ParsedComment> {
        let lines = split_lines(source);
        let blocks = scan_blocks(&lines);
        debug!("Found {} comment blocks", blocks.len());

        blocks
            .iter()
            .map(parse_block)
            .filter(|comment| !comment.tags.is_empty())
            .collect()
    }

    /// Parses a single source file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read as UTF-8 text.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let comments = Self::parse_source(&content);
        debug!(
            "Found {} annotated comments in {}",
            comments.len(),
            path.display()
        );

        Ok(ParsedFile {
            path: path.to_path_buf(),
            comments,
        })
    }

    /// Parses multiple source files, continuing even if some fail.
    ///
    /// Returns one result per input path, in input order.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).inspect_err(|e| {
                    warn!("Failed to parse {}: {}", path.display(), e);
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}
