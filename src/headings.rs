//! Heading extraction and slug generation.
//!
//! The extractor works on raw lines rather than the pulldown-cmark event
//! stream so it can run cheaply on every page request before rendering.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::Heading;

lazy_static! {
    static ref ATX_HEADING: Regex = Regex::new(r"^(#{1,6})\s+(.+)$").unwrap();
    static ref SETEXT_H1: Regex = Regex::new(r"^=+$").unwrap();
    static ref SETEXT_H2: Regex = Regex::new(r"^-+$").unwrap();
    static ref THEMATIC_BREAK: Regex = Regex::new(r"^(?:(?:\*[ \t]*){3,}|(?:-[ \t]*){3,}|(?:_[ \t]*){3,})$").unwrap();
    static ref LIST_ITEM: Regex = Regex::new(r"^(?:[-*+]|(\d{1,9})[.)])(?:[ \t]|$)").unwrap();
}

/// Generate an anchor slug from heading text.
///
/// Lowercases, drops everything that is not a word character, whitespace or
/// `-`, then turns each whitespace run into a single hyphen.
///
/// ```
/// use blogmark::slugify;
///
/// assert_eq!(slugify("Section 2"), "section-2");
/// assert_eq!(slugify("What's new in v1.2?"), "whats-new-in-v12");
/// assert_eq!(slugify("snake_case  and-kebab"), "snake_case-and-kebab");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            pending_space = true;
        } else if c.is_alphanumeric() || c == '_' || c == '-' {
            if pending_space {
                slug.push('-');
                pending_space = false;
            }
            slug.push(c);
        }
    }
    if pending_space {
        slug.push('-');
    }

    slug
}

/// Hands out document-unique slugs.
///
/// The first occurrence of a slug is returned unchanged; later occurrences get
/// `-1`, `-2`, ... appended, skipping any candidate already taken.
#[derive(Debug, Clone, Default)]
pub struct SlugRegistry {
    counts: HashMap<String, usize>,
    used: HashSet<String>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a unique slug derived from `base`.
    pub fn claim(&mut self, base: &str) -> String {
        let base = if base.is_empty() { "heading" } else { base };
        let mut n = self.counts.get(base).copied().unwrap_or(0);
        loop {
            let candidate = if n == 0 {
                base.to_string()
            } else {
                format!("{base}-{n}")
            };
            n += 1;
            if self.used.insert(candidate.clone()) {
                self.counts.insert(base.to_string(), n);
                return candidate;
            }
        }
    }
}

/// Extract ATX and setext headings in document order.
///
/// Lines inside ```` ``` ```` fences and indented code lines are skipped, and
/// whole-line HTML comments are blanked before scanning. Headings nested in
/// block quotes or list items are not collected, and a setext underline only
/// turns the paragraph directly above it into a heading. Never fails:
/// malformed input just yields fewer headings.
pub fn extract_headings(markdown: &str) -> Vec<Heading> {
    let mut registry = SlugRegistry::new();
    extract_headings_with(markdown, &mut registry)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Quote,
    List,
}

/// [`extract_headings`] with a caller-supplied slug registry.
pub fn extract_headings_with(markdown: &str, registry: &mut SlugRegistry) -> Vec<Heading> {
    let lines = markdown
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(|line| if is_comment_line(line) { "" } else { line });

    let mut headings = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut container: Option<Container> = None;
    let mut in_fence = false;
    let mut after_blank = false;

    for line in lines {
        let trimmed = line.trim();

        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            paragraph.clear();
            continue;
        }
        if in_fence {
            continue;
        }
        if trimmed.is_empty() {
            paragraph.clear();
            if container == Some(Container::Quote) {
                container = None;
            }
            after_blank = true;
            continue;
        }
        let blank_before = std::mem::replace(&mut after_blank, false);

        if container == Some(Container::List) && line.starts_with([' ', '\t']) {
            continue;
        }
        let Some(body) = strip_indent(line) else {
            // Indented code, unless it continues a paragraph.
            if !paragraph.is_empty() {
                paragraph.push(trimmed);
            }
            continue;
        };

        if let Some(caps) = ATX_HEADING.captures(body) {
            let text = caps[2].trim();
            if !text.is_empty() {
                let level = caps[1].len() as u8;
                headings.push(Heading::new(text, level, registry.claim(&slugify(text))));
            }
            paragraph.clear();
            container = None;
            continue;
        }

        let underlines_paragraph = container.is_none() && !paragraph.is_empty();
        if let Some(level) = setext_level(body).filter(|_| underlines_paragraph) {
            let text = paragraph.join(" ");
            let slug = registry.claim(&slugify(&text));
            headings.push(Heading::new(text, level, slug));
            paragraph.clear();
            continue;
        }

        if THEMATIC_BREAK.is_match(body) {
            paragraph.clear();
            container = None;
            continue;
        }
        if body.starts_with('>') {
            paragraph.clear();
            container = Some(Container::Quote);
            continue;
        }
        if starts_list_item(body, !paragraph.is_empty()) {
            paragraph.clear();
            container = Some(Container::List);
            continue;
        }
        if container.is_some() {
            if !blank_before {
                continue;
            }
            container = None;
        }
        paragraph.push(trimmed);
    }

    headings
}

/// Heading text as the extractor would see it, given the source slice
/// pulldown-cmark reports for a heading.
pub(crate) fn source_heading_text(source: &str) -> String {
    let lines: Vec<&str> = source.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let Some(first) = lines.first() else {
        return String::new();
    };
    if let Some(caps) = ATX_HEADING.captures(first) {
        return caps[2].trim().to_string();
    }
    if lines.len() == 1 && first.starts_with('#') {
        return String::new();
    }
    match lines.split_last() {
        Some((last, text)) if !text.is_empty() && setext_level(last).is_some() => text.join(" "),
        _ => lines.join(" "),
    }
}

/// Drop up to three spaces of indentation; `None` for indented code.
fn strip_indent(line: &str) -> Option<&str> {
    let body = line.trim_start_matches(' ');
    (line.len() - body.len() < 4 && !body.starts_with('\t')).then_some(body)
}

fn setext_level(line: &str) -> Option<u8> {
    let underline = line.trim_end();
    if SETEXT_H1.is_match(underline) {
        Some(1)
    } else if SETEXT_H2.is_match(underline) {
        Some(2)
    } else {
        None
    }
}

/// Whether `body` opens a list item. Only a non-empty bullet item or an
/// ordered item numbered 1 may interrupt a paragraph.
fn starts_list_item(body: &str, interrupting: bool) -> bool {
    let Some(caps) = LIST_ITEM.captures(body) else {
        return false;
    };
    if !interrupting {
        return true;
    }
    let has_content = !body[caps[0].len()..].trim().is_empty();
    has_content && caps.get(1).is_none_or(|n| n.as_str().parse::<u32>() == Ok(1))
}

fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("<!--") && trimmed.ends_with("-->")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn atx_headings_in_order() {
        let md = "# Title\n\nSome **bold** text.\n\n<!-- ADSENSE -->\n\n## Section 2\n";
        assert_eq!(
            extract_headings(md),
            vec![Heading::new("Title", 1, "title"), Heading::new("Section 2", 2, "section-2")]
        );
    }

    #[test]
    fn all_six_levels() {
        let md = "# a\n## b\n### c\n#### d\n##### e\n###### f\n####### g\n";
        let levels: Vec<u8> = extract_headings(md).iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn hash_without_space_is_not_a_heading() {
        assert!(extract_headings("#hashtag\n").is_empty());
    }

    #[test]
    fn fenced_code_is_skipped() {
        let md = "# Real\n\n```bash\n# not a heading\n## nor this\n```\n\n## After\n";
        let texts: Vec<_> = extract_headings(md).into_iter().map(|h| h.text).collect();
        assert_eq!(texts, vec!["Real", "After"]);
    }

    #[test]
    fn indented_code_is_skipped() {
        let md = "    # indented\n\t# tabbed\n# Top\n";
        let texts: Vec<_> = extract_headings(md).into_iter().map(|h| h.text).collect();
        assert_eq!(texts, vec!["Top"]);
    }

    #[test]
    fn setext_headings() {
        let md = "Main Title\n==========\n\nSub Title\n---------\n\nbody\n";
        assert_eq!(
            extract_headings(md),
            vec![Heading::new("Main Title", 1, "main-title"), Heading::new("Sub Title", 2, "sub-title")]
        );
    }

    #[test]
    fn thematic_break_after_blank_line_is_not_a_heading() {
        assert!(extract_headings("para\n\n---\n\nmore\n").is_empty());
    }

    #[test]
    fn comment_lines_are_ignored() {
        let md = "<!-- # hidden -->\n# Shown\n";
        let texts: Vec<_> = extract_headings(md).into_iter().map(|h| h.text).collect();
        assert_eq!(texts, vec!["Shown"]);
    }

    #[test]
    fn crlf_line_endings() {
        let headings = extract_headings("# One\r\n\r\nTwo\r\n===\r\n");
        assert_eq!(headings[0].text, "One");
        assert_eq!(headings[1], Heading::new("Two", 1, "two"));
    }

    #[test]
    fn duplicate_headings_get_suffixes() {
        let md = "## Setup\n## Setup\n## Setup-1\n## Setup\n";
        let slugs: Vec<_> = extract_headings(md).into_iter().map(|h| h.slug).collect();
        assert_eq!(slugs, vec!["setup", "setup-1", "setup-1-1", "setup-2"]);
    }

    #[test]
    fn punctuation_only_heading_gets_fallback_slug() {
        let headings = extract_headings("# !!!\n");
        assert_eq!(headings[0].slug, "heading");
    }

    #[test]
    fn slugify_examples() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("C++ & Rust: a comparison"), "c-rust-a-comparison");
        assert_eq!(slugify("Multiple   spaces"), "multiple-spaces");
        assert_eq!(slugify("Ünïcode Wörds"), "ünïcode-wörds");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn source_text_matches_extractor() {
        assert_eq!(source_heading_text("## Install **now**\n"), "Install **now**");
        assert_eq!(source_heading_text("Title\n=====\n"), "Title");
        assert_eq!(source_heading_text("   ### Indented\n"), "Indented");
        assert_eq!(source_heading_text("Two\n  lines\n---\n"), "Two lines");
        assert_eq!(source_heading_text("#\n"), "");
    }

    #[test]
    fn setext_heading_takes_the_whole_paragraph() {
        let headings = extract_headings("Intro line one\nintro line two\n---\n");
        assert_eq!(
            headings,
            vec![Heading::new("Intro line one intro line two", 2, "intro-line-one-intro-line-two")]
        );
    }

    #[test]
    fn underline_after_list_item_is_a_rule() {
        assert!(extract_headings("- item\n---\n").is_empty());
        assert!(extract_headings("1. item\ncontinued\n---\n").is_empty());
    }

    #[test]
    fn underline_after_a_closed_block_is_a_rule() {
        assert_eq!(extract_headings("# Title\n---\n").len(), 1);
        assert!(extract_headings("```\ncode\n```\n---\n").is_empty());
    }

    #[test]
    fn quoted_headings_are_not_collected() {
        let slugs: Vec<_> = extract_headings("> ## Setup\n\n## Setup\n").into_iter().map(|h| h.slug).collect();
        assert_eq!(slugs, vec!["setup"]);
        assert!(extract_headings("> quoted\n---\n").is_empty());
    }

    #[test]
    fn list_ends_at_unindented_paragraph() {
        let md = "- item\n\n  nested\n  ---\n\nTop level\n---\n";
        let texts: Vec<_> = extract_headings(md).into_iter().map(|h| h.text).collect();
        assert_eq!(texts, vec!["Top level"]);
    }

    #[test]
    fn ordered_item_past_one_does_not_interrupt_paragraph() {
        let texts: Vec<_> = extract_headings("Step\n2. more\n---\n").into_iter().map(|h| h.text).collect();
        assert_eq!(texts, vec!["Step 2. more"]);
    }

    proptest! {
        #[test]
        fn counts_every_atx_heading(
            items in proptest::collection::vec((1usize..=6, "[A-Za-z][A-Za-z0-9 ]{0,20}"), 0..20)
        ) {
            let md: String = items
                .iter()
                .map(|(level, text)| format!("{} {}\n\nparagraph\n\n", "#".repeat(*level), text))
                .collect();
            let headings = extract_headings(&md);
            prop_assert_eq!(headings.len(), items.len());
            for (heading, (level, text)) in headings.iter().zip(&items) {
                prop_assert_eq!(heading.level as usize, *level);
                prop_assert_eq!(&heading.text, text.trim());
            }
        }

        #[test]
        fn fenced_lines_never_become_headings(body in proptest::collection::vec("#{1,6} [a-z]{1,10}", 1..10)) {
            let md = format!("```\n{}\n```\n", body.join("\n"));
            prop_assert!(extract_headings(&md).is_empty());
        }

        #[test]
        fn slugify_is_deterministic(text in ".{0,40}") {
            prop_assert_eq!(slugify(&text), slugify(&text));
        }
    }
}
