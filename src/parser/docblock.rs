//! Docblock parsing shared by component and prop descriptions.
//!
//! Accepts either a raw `/** ... */` comment or text that already had its
//! delimiters removed, and splits it into a free-text description and the
//! `@tag content` entries that follow it.

use crate::types::{DocBlock, DocTag};
use once_cell::sync::Lazy;
use regex::Regex;

/// Leading whitespace plus the `*` gutter of a block comment line
static GUTTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\*(?: |$)?").unwrap());

/// `@title rest` at the start of a line
static TAG_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@([A-Za-z][\w.-]*)\s*(.*)$").unwrap());

/// Remove comment delimiters and the per-line `*` gutter
pub fn clean_comment(comment: &str) -> String {
    let trimmed = comment.trim();
    let inner = trimmed
        .strip_prefix("/**")
        .or_else(|| trimmed.strip_prefix("/*"))
        .unwrap_or(trimmed);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);

    inner
        .lines()
        .map(|line| GUTTER.replace(line, "").trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a docblock into its description and tags.
pub fn parse_doc_block(text: &str) -> DocBlock {
    let cleaned = clean_comment(text);

    let mut description: Vec<&str> = Vec::new();
    let mut tags: Vec<(String, Vec<String>)> = Vec::new();

    for line in cleaned.lines() {
        let trimmed = line.trim();
        if let Some(caps) = TAG_LINE.captures(trimmed) {
            let title = caps[1].to_string();
            let first = caps[2].trim().to_string();
            let content = if first.is_empty() {
                Vec::new()
            } else {
                vec![first]
            };
            tags.push((title, content));
            continue;
        }

        match tags.last_mut() {
            Some((_, content)) => content.push(line.to_string()),
            None => description.push(line),
        }
    }

    DocBlock {
        description: description.join("\n").trim().to_string(),
        tags: tags
            .into_iter()
            .map(|(title, content)| DocTag {
                title,
                content: content.join("\n").trim().to_string(),
            })
            .collect(),
    }
}
