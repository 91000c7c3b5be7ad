//! Table of contents built from extracted headings.

use serde::{Deserialize, Serialize};

use crate::highlight::escape_html;
use crate::types::Heading;

/// A heading with its hierarchical section number (`"2.1"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberedHeading {
    #[serde(flatten)]
    pub heading: Heading,
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TocOptions {
    /// Prefix each entry with its section number.
    pub show_numbers: bool,
    /// CSS `max-height` of the scrollable list.
    pub max_height: String,
    /// Extra classes on the `<nav>`.
    pub class: String,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            show_numbers: true,
            max_height: "400px".into(),
            class: String::new(),
        }
    }
}

/// Assign section numbers in document order.
///
/// A heading resets the counters of every deeper level. Levels that were
/// skipped (an `h3` directly under an `h1`) contribute no component, so the
/// number stays dense: `1`, `1.1`.
pub fn number_headings(headings: &[Heading]) -> Vec<NumberedHeading> {
    let mut counters = [0u32; 6];
    headings
        .iter()
        .map(|heading| {
            let level = usize::from(heading.level.clamp(1, 6));
            for counter in &mut counters[level..] {
                *counter = 0;
            }
            counters[level - 1] += 1;

            let number = counters[..level]
                .iter()
                .filter(|&&c| c > 0)
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(".");
            NumberedHeading {
                heading: heading.clone(),
                number,
            }
        })
        .collect()
}

/// Render a `<nav>` with one link per heading, indented by level.
pub fn render_toc(headings: &[Heading], options: &TocOptions) -> String {
    let mut html = String::new();
    let nav_class = if options.class.is_empty() {
        "toc-nav".to_string()
    } else {
        format!("toc-nav {}", escape_html(&options.class))
    };
    html.push_str(&format!("<nav class=\"{nav_class}\" aria-label=\"Table of contents\">\n"));
    html.push_str(&format!(
        "<div class=\"overflow-y-auto\" style=\"max-height: {}\">\n<ul class=\"space-y-1 text-sm pr-2\">\n",
        escape_html(&options.max_height)
    ));

    for entry in number_headings(headings) {
        let heading = &entry.heading;
        let indent = f32::from(heading.level.saturating_sub(1)) * 0.75;
        html.push_str(&format!(
            "<li style=\"padding-left: {indent}rem\"><a href=\"#{}\" class=\"block py-1 px-2\">",
            escape_html(&heading.slug)
        ));
        if options.show_numbers {
            html.push_str(&format!(
                "<span class=\"toc-number\">{}.</span> ",
                entry.number
            ));
        }
        html.push_str(&format!("<span>{}</span></a></li>\n", escape_html(&heading.text)));
    }

    html.push_str("</ul>\n</div>\n</nav>\n");
    html
}
