//! Plain-text previews of stored note content.

mod document;

pub use document::{BlockNode, Document, LegacyNode, TextLayout};

use crate::util::truncate_trimmed;

/// Shown when a note has no readable text.
pub const UNTITLED_NOTE: &str = "Untitled Note";

/// Maximum preview length in characters.
pub const PREVIEW_MAX_CHARS: usize = 100;

/// Derive the list preview for serialized note content.
///
/// Never fails: invalid JSON, unknown shapes and empty documents all map to
/// [`UNTITLED_NOTE`].
#[must_use]
pub fn extract_preview(content: &str) -> String {
    let Some(document) = Document::parse(content) else {
        return UNTITLED_NOTE.to_string();
    };

    let preview = truncate_trimmed(&document.plain_text(TextLayout::Inline), PREVIEW_MAX_CHARS);
    if preview.is_empty() {
        UNTITLED_NOTE.to_string()
    } else {
        preview
    }
}

/// Full plain text of serialized note content, one block per paragraph.
///
/// Returns `None` when the content is not valid JSON.
#[must_use]
pub fn extract_plain_text(content: &str) -> Option<String> {
    Document::parse(content).map(|document| {
        document
            .plain_text(TextLayout::Paragraphs)
            .trim()
            .to_string()
    })
}
