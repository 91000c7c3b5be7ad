//! Integration tests that run complete fixture files end-to-end.

use blogmark::{
    ContentStore, Fragment, Heading, Language, PrintOptions, RenderOptions, TocOptions,
    detect_language, extract_headings, render_page, to_print_html,
};
use pretty_assertions::assert_eq;

fn fixtures_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(id: &str) -> String {
    ContentStore::new(fixtures_dir())
        .read(id)
        .unwrap_or_else(|e| panic!("Failed to read fixture '{id}': {e}"))
}

#[test]
fn post_headings_in_document_order() {
    let headings = extract_headings(&read_fixture("post"));
    assert_eq!(
        headings,
        vec![
            Heading::new("Getting Started with Git", 1, "getting-started-with-git"),
            Heading::new("Installing", 2, "installing"),
            Heading::new("Configuring", 2, "configuring"),
            Heading::new("Setup", 2, "setup"),
            Heading::new("Configuring", 2, "configuring-1"),
        ]
    );
}

#[test]
fn post_renders_sections_with_ad_slots_between() {
    let page = render_page(&read_fixture("post"), &RenderOptions::default());
    let kinds: Vec<&str> = page
        .document
        .fragments
        .iter()
        .map(|f| match f {
            Fragment::Section(_) => "section",
            Fragment::AdSlot(_) => "ad",
        })
        .collect();
    assert_eq!(kinds, vec!["section", "ad", "section", "ad", "section"]);
}

#[test]
fn every_toc_link_has_an_anchor() {
    let page = render_page(&read_fixture("post"), &RenderOptions::default());
    let html = page.to_html();
    let toc = page.toc_html(&TocOptions::default());
    for heading in &page.headings {
        assert!(toc.contains(&format!("href=\"#{}\"", heading.slug)));
        assert_eq!(
            html.matches(&format!("id=\"{}\"", heading.slug)).count(),
            1,
            "anchor for {} should appear exactly once",
            heading.slug
        );
    }
}

#[test]
fn post_code_blocks_resolve_languages() {
    let html = render_page(&read_fixture("post"), &RenderOptions::default()).to_html();
    for lang in ["bash", "plaintext", "python", "json"] {
        assert!(
            html.contains(&format!("data-language=\"{lang}\"")),
            "expected a {lang} code block"
        );
    }
    assert!(!html.contains("id=\"not-a-heading\""));
}

#[test]
fn post_links_images_and_tables() {
    let html = render_page(&read_fixture("post"), &RenderOptions::default()).to_html();
    assert!(html.contains("href=\"https://git-scm.com/doc\""));
    assert!(html.contains("rel=\"noopener noreferrer\""));
    assert!(html.contains("alt=\"Image\""));
    assert!(html.contains("class=\"table-stacked md:hidden\""));
    assert!(html.contains("<span class=\"table-label\">Purpose:</span>"));
}

#[test]
fn cheatsheet_print_document() {
    let options = PrintOptions { year: Some(2025), ..PrintOptions::default() };
    let html = to_print_html("cheatsheet", &read_fixture("cheatsheet"), &options);
    assert!(html.contains("<title>Cheatsheet - CHEATSHEET</title>"));
    assert!(html.contains("<pre><code class=\"hljs rust\">"));
    assert!(html.contains("<table>"));
    assert!(html.contains("Generated from cheatsheet.md | DevBlogger &copy; 2025"));
}

#[test]
fn detector_scenarios() {
    assert_eq!(detect_language(Some("python"), "print(\"hi\")"), Language::Python);
    assert_eq!(
        detect_language(None, "import os\nclass Bar:\n    pass\ndef foo():\n    return 1\n"),
        Language::Python
    );
    assert_eq!(detect_language(None, "[1, 2, 3]"), Language::Json);
    assert_eq!(detect_language(None, "just some words"), Language::PlainText);
}

#[test]
fn missing_fixture_is_not_found() {
    let err = ContentStore::new(fixtures_dir()).read("absent").unwrap_err();
    assert!(matches!(err, blogmark::ContentError::NotFound(_)));
}
