//! Turns the raw text of one `/** ... */` block into a description and an
//! ordered list of `@tag` records.

use crate::block_scanner::SourceCommentBlock;
use crate::type_resolver::TypeExpression;
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

static RE_LEADING_DASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-\s+").unwrap());

/// Tag titles whose text is `{type} name description`
const NAMED_TAGS: [&str; 6] = ["param", "arg", "argument", "property", "prop", "typedef"];

/// Tag titles whose text is `{type} description`
const TYPED_TAGS: [&str; 2] = ["returns", "return"];

/// One `@title ...` annotation inside a comment block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    /// Tag title without the `@`
    pub title: String,
    /// Name token for `param`/`property`/`typedef` tags
    pub name: Option<String>,
    /// Free text following the type and name
    pub description: Option<String>,
    /// Parsed `{...}` type expression
    pub type_expr: Option<TypeExpression>,
}

impl Tag {
    /// Creates a tag carrying only a description.
    pub fn new(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: non_empty(description),
            ..Self::default()
        }
    }

    /// Sets the name token.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Sets the type expression.
    pub fn with_type(mut self, type_expr: TypeExpression) -> Self {
        self.type_expr = Some(type_expr);
        self
    }

    /// Description text, or the empty string when absent
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// A comment block after tag parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedComment {
    /// Free text preceding the first tag
    pub description: String,
    /// Tags in source order
    pub tags: Vec<Tag>,
}

/// Parses a scanned block.
pub fn parse_block(block: &SourceCommentBlock) -> ParsedComment {
    parse_comment(&block.raw_lines.join("\n"))
}

/// Parses the text of a comment, with or without its `/**` and `*/` markers.
pub fn parse_comment(text: &str) -> ParsedComment {
    let mut description_lines: Vec<&str> = Vec::new();
    let mut chunks: Vec<Vec<&str>> = Vec::new();

    for line in text.lines().map(unwrap_line) {
        if line.trim_start().starts_with('@') {
            chunks.push(vec![line.trim_start()]);
        } else if let Some(chunk) = chunks.last_mut() {
            chunk.push(line);
        } else {
            description_lines.push(line);
        }
    }

    let tags = chunks
        .iter()
        .filter_map(|chunk| parse_tag(&chunk.join("\n")))
        .collect();

    ParsedComment {
        description: description_lines.join("\n").trim().to_string(),
        tags,
    }
}

/// Strips the comment markers and the leading `*` gutter from one line.
fn unwrap_line(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_prefix("/**").unwrap_or(line);
    let line = line.strip_suffix("*/").unwrap_or(line);
    let line = line.trim_start();
    match line.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => line,
    }
    .trim_end()
}

fn parse_tag(text: &str) -> Option<Tag> {
    let body = text.strip_prefix('@')?;
    let title_end = body
        .find(|c: char| c.is_whitespace() || c == '{')
        .unwrap_or(body.len());
    let title = &body[..title_end];
    if title.is_empty() {
        debug!("Skipping tag without a title: {}", text);
        return None;
    }
    let mut rest = body[title_end..].trim_start();

    let mut tag = Tag {
        title: title.to_string(),
        ..Tag::default()
    };

    let takes_type = NAMED_TAGS.contains(&title) || TYPED_TAGS.contains(&title);
    if takes_type && rest.starts_with('{') {
        if let Some((inner, remainder)) = split_braced(rest) {
            tag.type_expr = Some(TypeExpression::parse(inner));
            rest = remainder.trim_start();
        }
    }

    if NAMED_TAGS.contains(&title) {
        let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let name = strip_optional_brackets(&rest[..name_end]);
        if !name.is_empty() {
            tag.name = Some(name.to_string());
        }
        rest = rest[name_end..].trim_start();
    }

    let description = RE_LEADING_DASH.replace(rest.trim(), "");
    tag.description = non_empty(&description);
    Some(tag)
}

/// Splits `{...} rest` at the brace matching the opening one.
fn split_braced(text: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&text[1..i], &text[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// `[name]` and `[name=default]` mark optional names; only the name is kept.
fn strip_optional_brackets(token: &str) -> &str {
    match token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        Some(inner) => inner.split('=').next().unwrap_or(inner).trim(),
        None => token,
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
