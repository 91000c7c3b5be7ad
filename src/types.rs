//! Core data types shared by the extractor, detector and renderers.

use serde::Serialize;

/// Literal marker that splits a blog post into independently rendered sections.
pub const AD_PLACEHOLDER: &str = "<!-- ADSENSE -->";

/// A heading found in the markdown source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Heading text as written, without the `#` markers.
    pub text: String,
    /// Heading level (1-6).
    pub level: u8,
    /// Anchor slug, unique within the document.
    pub slug: String,
}

impl Heading {
    pub fn new(text: impl Into<String>, level: u8, slug: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level,
            slug: slug.into(),
        }
    }
}

/// A fenced or indented code block as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Info string or class annotation, if any (`"py"`, `"rust ignore"`).
    pub language_hint: Option<String>,
    /// Code text without the surrounding fences.
    pub raw_content: String,
}

impl CodeBlock {
    pub fn new(language_hint: Option<String>, raw_content: impl Into<String>) -> Self {
        Self {
            language_hint: language_hint.filter(|h| !h.trim().is_empty()),
            raw_content: raw_content.into(),
        }
    }
}

/// One slice of a post between two ad placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Zero-based position in the document.
    pub index: usize,
    /// Trimmed markdown of this section.
    pub markdown: String,
}

/// Raw markdown split on [`AD_PLACEHOLDER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownDocument {
    pub source: String,
    pub sections: Vec<Section>,
}

impl MarkdownDocument {
    /// Split `source` into sections. A document without placeholders is one section.
    pub fn parse(source: &str) -> Self {
        let sections = source
            .split(AD_PLACEHOLDER)
            .enumerate()
            .map(|(index, part)| Section {
                index,
                markdown: part.trim().to_string(),
            })
            .collect();

        Self {
            source: source.to_string(),
            sections,
        }
    }

    /// Number of ad slots interleaved between sections.
    pub fn ad_slot_count(&self) -> usize {
        self.sections.len().saturating_sub(1)
    }
}
