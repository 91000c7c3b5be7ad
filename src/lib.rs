//! `blogmark`: markdown pipeline for a blogging platform.
//!
//! Turns blog posts into styled HTML with a table of contents, anchors,
//! highlighted code blocks and interleaved ad slots, and exports cheat sheets
//! to PDF through headless Chromium.
//!
//! # Quick start
//!
//! ```
//! use blogmark::{RenderOptions, extract_headings, render_document};
//!
//! let md = "# Title\n\nSome **bold** text.\n\n<!-- ADSENSE -->\n\n## Section 2\n";
//!
//! let headings = extract_headings(md);
//! assert_eq!(headings[1].slug, "section-2");
//!
//! let doc = render_document(md, &RenderOptions::default());
//! assert_eq!(doc.sections().count(), 2);
//! assert_eq!(doc.ad_slot_count(), 1);
//! ```

pub mod config;
pub mod content;
pub mod copy;
pub mod error;
pub mod headings;
pub mod highlight;
pub mod language;
pub mod print;
pub mod render;
#[cfg(feature = "pdf")]
pub mod render_pdf;
#[cfg(feature = "axum")]
pub mod serve;
pub mod style;
pub mod toc;
pub mod types;

pub use config::Settings;
pub use content::ContentStore;
pub use copy::{CopyFeedback, CopyState};
pub use error::*;
pub use headings::{SlugRegistry, extract_headings, slugify};
pub use highlight::highlight;
pub use language::{Detection, DetectionMethod, Language, detect_language};
pub use print::{Branding, PrintOptions, to_print_html};
pub use render::{Fragment, RenderOptions, RenderedDocument, RenderedPage, render_document, render_page, render_section};
pub use style::StyleMap;
pub use toc::{NumberedHeading, TocOptions, number_headings, render_toc};
pub use types::*;

#[cfg(feature = "pdf")]
pub use render_pdf::{PdfConfig, PdfError, export_markdown, html_to_pdf};

/// Stylesheet for code blocks, copy buttons, responsive tables and the TOC.
pub const BLOGMARK_CSS: &str = include_str!("../assets/blogmark.css");
