//! Variable declarations collected from a serialized syntax tree.
//!
//! The tree is a JSON document `{"Root": node}` where every node carries a
//! `Type`, optional `Children` and an optional `ValueText`. Each
//! `VariableDeclaration` node contributes one `(type, name)` pair:
//!
//! ```text
//! VariableDeclaration
//! ├── <type holder>  └── { ValueText: "int" }
//! ├── <name holder>  └── { ValueText: "count" }
//! └── ... (initializers, searched for nested declarations)
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::{DiffcallsError, DiffcallsResult, IoResultExt};

const VARIABLE_DECLARATION: &str = "VariableDeclaration";

/// One node of the serialized tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SyntaxNode {
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(rename = "Children", default)]
    pub children: Vec<SyntaxNode>,
    #[serde(rename = "ValueText", default)]
    pub value_text: Option<String>,
}

impl SyntaxNode {
    /// `ValueText` of the first child of child `index`.
    fn grandchild_text(&self, index: usize) -> Option<&str> {
        self.children
            .get(index)?
            .children
            .first()?
            .value_text
            .as_deref()
    }
}

/// Top-level document wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyntaxDocument {
    #[serde(rename = "Root")]
    pub root: SyntaxNode,
}

/// A declared variable, rendered as `{type}{name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDecl {
    pub type_name: String,
    pub name: String,
}

impl fmt::Display for VariableDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{{{}}}", self.type_name, self.name)
    }
}

/// Collect every well-formed declaration below `root`, in document order.
///
/// A declaration missing its type or name holder is skipped with a warning;
/// its remaining children are still searched.
pub fn collect_variable_declarations(root: &SyntaxNode) -> Vec<VariableDecl> {
    let mut found = Vec::new();
    visit(root, &mut found);
    found
}

fn visit(node: &SyntaxNode, found: &mut Vec<VariableDecl>) {
    if node.kind != VARIABLE_DECLARATION {
        for child in &node.children {
            visit(child, found);
        }
        return;
    }

    match (node.grandchild_text(0), node.grandchild_text(1)) {
        (Some(type_name), Some(name)) => found.push(VariableDecl {
            type_name: type_name.to_string(),
            name: name.to_string(),
        }),
        _ => warn!(
            children = node.children.len(),
            "skipping malformed variable declaration"
        ),
    }
    for child in node.children.iter().skip(2) {
        visit(child, found);
    }
}

/// Decode a syntax tree document from JSON text.
pub fn parse_syntax_tree(json: &str, origin: &Path) -> DiffcallsResult<SyntaxDocument> {
    serde_json::from_str(json).map_err(|e| DiffcallsError::syntax_tree(origin, e.to_string()))
}

/// Read and decode a syntax tree file.
pub fn load_syntax_tree(path: &Path) -> DiffcallsResult<SyntaxDocument> {
    let content = fs::read_to_string(path).with_path(path)?;
    parse_syntax_tree(&content, path)
}

/// One declaration per line.
pub fn render_declarations(decls: &[VariableDecl]) -> String {
    decls.iter().map(|d| format!("{}\n", d)).collect()
}
