//! Rich document shapes stored in `content_json`.
//!
//! Notes written by different editor generations use different JSON trees.
//! Decoding is structural and lenient: anything unexpected inside a tree
//! simply contributes no text.

use serde_json::Value;

/// Node types that end a block of text.
const LEGACY_BLOCK_TYPES: &[&str] = &["paragraph", "heading"];

const BLOCK_TYPES: &[&str] = &[
    "paragraph",
    "heading",
    "blockquote",
    "codeBlock",
    "listItem",
    "taskItem",
];

/// How block-level nodes are separated when rendering plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextLayout {
    /// Single line for list previews. Legacy trees put a space after each
    /// paragraph or heading; block trees concatenate their text as is.
    Inline,
    /// Blocks are separated by a blank line.
    Paragraphs,
}

/// A decoded rich document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    /// `{"root": {"children": [...]}}` trees.
    LegacyTree(LegacyNode),
    /// `{"type": "doc", "content": [...]}` trees.
    Block(BlockNode),
    /// Any other JSON value, coerced to text.
    PlainText(String),
}

/// Node of a legacy `root`/`children` tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyNode {
    pub kind: Option<String>,
    pub text: Option<String>,
    pub children: Vec<LegacyNode>,
}

/// Node of a `type`/`content` block tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockNode {
    pub kind: Option<String>,
    pub text: Option<String>,
    pub content: Vec<BlockNode>,
}

impl Document {
    /// Parse serialized content. Returns `None` when it is not valid JSON.
    #[must_use]
    pub fn parse(content: &str) -> Option<Self> {
        serde_json::from_str::<Value>(content)
            .ok()
            .map(|value| Self::from_value(&value))
    }

    /// Pick the document shape by looking at the top-level structure.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        if let Some(root) = value.get("root") {
            if root.get("children").is_some_and(|children| !children.is_null()) {
                return Self::LegacyTree(LegacyNode::from_value(root));
            }
        }

        let has_type = value.get("type").is_some_and(|kind| !kind.is_null());
        let has_content = value.get("content").is_some_and(|content| !content.is_null());
        if has_type && has_content {
            return Self::Block(BlockNode::from_value(value));
        }

        Self::PlainText(coerce_to_text(value))
    }

    /// Render the whole document as plain text.
    #[must_use]
    pub fn plain_text(&self, layout: TextLayout) -> String {
        let mut out = String::new();
        match self {
            Self::LegacyTree(root) => root.write_text(layout, &mut out),
            Self::Block(root) => root.write_text(layout, &mut out),
            Self::PlainText(text) => out.push_str(text),
        }
        out
    }
}

impl LegacyNode {
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        Self {
            kind: string_field(value, "type"),
            text: string_field(value, "text"),
            children: array_field(value, "children")
                .iter()
                .map(Self::from_value)
                .collect(),
        }
    }

    fn is_text(&self) -> bool {
        self.kind.as_deref() == Some("text")
    }

    fn is_block(&self) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|kind| LEGACY_BLOCK_TYPES.contains(&kind))
    }

    fn write_text(&self, layout: TextLayout, out: &mut String) {
        if self.is_text() {
            out.push_str(self.text.as_deref().unwrap_or_default());
            return;
        }

        let mut seen_block = false;
        for child in &self.children {
            if layout == TextLayout::Paragraphs && child.is_block() {
                if seen_block {
                    out.push_str("\n\n");
                }
                seen_block = true;
            }
            child.write_text(layout, out);
        }

        if layout == TextLayout::Inline && self.is_block() {
            out.push(' ');
        }
    }
}

impl BlockNode {
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        Self {
            kind: string_field(value, "type"),
            text: string_field(value, "text"),
            content: array_field(value, "content")
                .iter()
                .map(Self::from_value)
                .collect(),
        }
    }

    fn is_text(&self) -> bool {
        self.kind.as_deref() == Some("text")
    }

    fn is_block(&self) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|kind| BLOCK_TYPES.contains(&kind))
    }

    fn write_text(&self, layout: TextLayout, out: &mut String) {
        if self.is_text() {
            out.push_str(self.text.as_deref().unwrap_or_default());
            return;
        }

        let mut seen_block = false;
        for child in &self.content {
            if layout == TextLayout::Paragraphs && child.is_block() {
                if seen_block {
                    out.push_str("\n\n");
                }
                seen_block = true;
            }
            child.write_text(layout, out);
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn array_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Scalars render as themselves and arrays as comma-separated elements.
/// Objects carry no readable text.
fn coerce_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(coerce_array_item)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => String::new(),
    }
}

/// Null inside an array renders as nothing.
fn coerce_array_item(value: &Value) -> String {
    if value.is_null() {
        String::new()
    } else {
        coerce_to_text(value)
    }
}
