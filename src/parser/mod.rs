//! @dose
//! purpose: This module is the hub for all source-level analysis. It owns the tree-sitter
//!     setup for TypeScript/TSX, the ParsedFile wrapper that keeps a syntax tree together
//!     with its source text, and the small node helpers every analysis pass shares.
//!
//! when-editing:
//!     - !Every file is parsed with the TSX grammar unless its extension is plain .ts/.d.ts
//!     - !Node text is always sliced from the ParsedFile's own source, never from a copy
//!     - Submodules (declarations, components, docblock, types, defaults) only read trees
//!
//! invariants:
//!     - A ParsedFile is immutable; its Tree and source never change after parsing
//!     - ParsedFile is Send + Sync so a Program can be shared across rayon workers
//!
//! do-not:
//!     - Never panic on malformed input; tree-sitter recovers and we read what it gives
//!     - Never use regex where a syntax node is available
//!
//! gotchas:
//!     - Plain .ts must use the TYPESCRIPT grammar: `<T>expr` casts are not JSX there
//!     - Doc comments are sibling `comment` nodes, so for exported declarations the
//!       comment sits before the export_statement, not the declaration itself

pub mod components;
pub mod declarations;
pub mod defaults;
pub mod docblock;
pub mod types;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tree_sitter::{Node, Parser, Tree};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse source: {0}")]
    ParseError(String),
    #[error("Unsupported file extension: {0}")]
    UnsupportedLanguage(String),
}

/// Parser for TypeScript, TSX and JavaScript component files
#[derive(Clone, Default)]
pub struct TypeScriptParser {
    // Tree-sitter parser is not Clone, so we create it on demand
}

impl TypeScriptParser {
    pub fn new() -> Self {
        Self {}
    }

    /// File extensions this parser handles
    pub fn file_extensions(&self) -> &[&'static str] {
        &["tsx", "ts", "jsx", "js"]
    }

    /// Check if a file extension is supported
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.file_extensions().contains(&ext))
            .unwrap_or(false)
    }

    fn create_parser(&self, is_tsx: bool) -> Result<Parser, ParseError> {
        let mut parser = Parser::new();
        let language = if is_tsx {
            tree_sitter_typescript::LANGUAGE_TSX.into()
        } else {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        };
        parser
            .set_language(&language)
            .map_err(|e| ParseError::ParseError(e.to_string()))?;
        Ok(parser)
    }

    fn is_tsx(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| ext != "ts")
            .unwrap_or(true)
    }

    /// Read and parse a file from disk
    pub fn parse_file(&self, path: &Path) -> Result<ParsedFile, ParseError> {
        if !self.is_supported(path) {
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();
            return Err(ParseError::UnsupportedLanguage(ext));
        }
        let source = fs::read_to_string(path).map_err(|source| ParseError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_source(source, path)
    }

    /// Parse source text that belongs to `path`
    pub fn parse_source(
        &self,
        source: impl Into<String>,
        path: &Path,
    ) -> Result<ParsedFile, ParseError> {
        let source = source.into();
        let mut parser = self.create_parser(Self::is_tsx(path))?;
        let tree = parser.parse(&source, None).ok_or_else(|| {
            ParseError::ParseError(format!("Failed to parse {}", path.display()))
        })?;

        Ok(ParsedFile {
            path: path.to_path_buf(),
            source,
            tree,
        })
    }
}

/// A syntax tree together with the text it was parsed from
pub struct ParsedFile {
    path: PathBuf,
    source: String,
    tree: Tree,
}

impl std::fmt::Debug for ParsedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedFile")
            .field("path", &self.path)
            .field("len", &self.source.len())
            .finish()
    }
}

impl ParsedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by a node of this file's tree
    pub fn text(&self, node: Node) -> &str {
        node_text(node, &self.source)
    }

    /// Top-level statements of the program node
    pub fn top_level(&self) -> Vec<Node<'_>> {
        let root = self.root_node();
        let mut cursor = root.walk();
        root.named_children(&mut cursor).collect()
    }
}

pub(crate) fn node_text<'s>(node: Node, source: &'s str) -> &'s str {
    &source[node.start_byte()..node.end_byte()]
}

/// First direct child with the given kind
pub(crate) fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}

/// The `/** ... */` comment directly preceding a node, if any
pub(crate) fn leading_doc_comment<'s>(node: Node, source: &'s str) -> Option<&'s str> {
    let mut prev = node.prev_sibling()?;
    // Member separators sit between the previous member and this one's comment
    while !prev.is_named() && matches!(prev.kind(), ";" | ",") {
        prev = prev.prev_sibling()?;
    }
    if prev.kind() != "comment" {
        return None;
    }
    let text = node_text(prev, source);
    text.starts_with("/**").then_some(text)
}

/// Doc comment for a declaration, looking through an enclosing export statement
pub(crate) fn declaration_doc_comment<'s>(node: Node, source: &'s str) -> Option<&'s str> {
    leading_doc_comment(node, source).or_else(|| {
        let parent = node.parent()?;
        if parent.kind() == "export_statement" {
            leading_doc_comment(parent, source)
        } else {
            None
        }
    })
}

/// Strip the quotes of a string literal node's text
pub(crate) fn unquote(text: &str) -> &str {
    let text = text.trim();
    if text.len() >= 2 {
        let first = text.as_bytes()[0];
        let last = text.as_bytes()[text.len() - 1];
        if (first == b'"' || first == b'\'' || first == b'`') && first == last {
            return &text[1..text.len() - 1];
        }
    }
    text
}
