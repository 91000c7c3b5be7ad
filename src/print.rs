//! Standalone print document for PDF export.
//!
//! The export path does not use the styled web renderer. It converts the
//! markdown with pulldown-cmark's stock HTML writer, swapping code blocks for
//! highlighted `<pre><code class="hljs LANG">` blocks, and wraps the result
//! in a full HTML page carrying its own print stylesheet, branded header and
//! footer bands and a page counter.

use chrono::Datelike;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde::Deserialize;

use crate::highlight::{escape_html, highlight};
use crate::language::{self, hint_from_info};
use crate::types::CodeBlock;

/// Site identity shown on every printed page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub name: String,
    pub site: String,
    /// Accent color used for the logo, titles and table headers.
    pub accent: String,
    /// Letter drawn inside the round logo.
    pub logo_letter: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            name: "DevBlogger".into(),
            site: "devblogger.in".into(),
            accent: "#3498db".into(),
            logo_letter: "D".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PrintOptions {
    pub branding: Branding,
    /// Kind of document, used in the title and footer ("Cheatsheet").
    pub label: String,
    /// Copyright year; the current year when unset.
    pub year: Option<i32>,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            branding: Branding::default(),
            label: "Cheatsheet".into(),
            year: None,
        }
    }
}

impl PrintOptions {
    fn year(&self) -> i32 {
        self.year.unwrap_or_else(|| chrono::Local::now().year())
    }
}

/// Markdown to an HTML fragment, with code blocks highlighted for print.
pub fn markdown_to_print_fragment(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut events = Vec::new();
    let mut code: Option<(Option<String>, String)> = None;

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let hint = match kind {
                    CodeBlockKind::Fenced(info) => hint_from_info(&info),
                    CodeBlockKind::Indented => None,
                };
                code = Some((hint, String::new()));
            }
            Event::Text(text) if code.is_some() => {
                if let Some((_, buf)) = code.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((hint, raw)) = code.take() {
                    events.push(Event::Html(print_code_block(hint, &raw).into()));
                }
            }
            other => events.push(other),
        }
    }

    let mut html = String::with_capacity(markdown.len() * 2);
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    html
}

fn print_code_block(hint: Option<String>, raw: &str) -> String {
    let block = CodeBlock::new(hint, raw.trim_end_matches('\n'));
    let lang = language::detect(&block).language;
    format!(
        "<pre><code class=\"hljs {}\">{}</code></pre>\n",
        lang.as_str(),
        highlight(&block.raw_content, lang)
    )
}

/// Full print document for the markdown source `name`.
pub fn to_print_html(name: &str, markdown: &str, options: &PrintOptions) -> String {
    let body = markdown_to_print_fragment(markdown);
    let brand = &options.branding;
    let year = options.year();
    let name = escape_html(name);
    let label = escape_html(&options.label);
    let brand_name = escape_html(&brand.name);
    let site = escape_html(&brand.site);
    let logo = logo_svg(brand);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{label} - {title}</title>
<style>
{css}
</style>
</head>
<body>
<div class="page-header">
<div class="page-header-left">{logo}<span class="brand">{brand_name}</span></div>
<div class="page-header-right"><span>{site}</span></div>
</div>
<div class="page-footer">
<div>{brand_name} &copy; {year} | {label} - {name}</div>
<div class="page-number"></div>
</div>
<div class="container">
<div class="header">{logo}<div class="title">{brand_name}</div></div>
{body}
<div class="footer">Generated from {name}.md | {brand_name} &copy; {year}</div>
</div>
</body>
</html>
"#,
        title = name.to_uppercase(),
        css = print_css(&brand.accent),
    )
}

fn logo_svg(brand: &Branding) -> String {
    format!(
        r#"<svg class="logo" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100" width="30" height="30"><circle cx="50" cy="50" r="45" fill="{}"/><text x="50" y="65" text-anchor="middle" fill="white" font-size="50">{}</text></svg>"#,
        escape_html(&brand.accent),
        escape_html(&brand.logo_letter)
    )
}

fn print_css(accent: &str) -> String {
    let accent = escape_html(accent);
    format!(
        r#"@media print {{ @page {{ size: A4; margin: 20mm 15mm 20mm 15mm; }} }}
body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 0; background-color: #fff; counter-reset: page; }}
.page-header {{ position: fixed; top: -10mm; left: 0; right: 0; height: 15mm; display: flex; align-items: center; justify-content: space-between; border-bottom: 1px solid #ddd; padding-bottom: 5mm; }}
.page-header-left {{ display: flex; align-items: center; }}
.page-header-right {{ font-size: 9pt; }}
.brand {{ margin-left: 10px; font-weight: bold; color: {accent}; }}
.page-footer {{ position: fixed; bottom: -15mm; left: 0; right: 0; height: 10mm; display: flex; align-items: center; justify-content: space-between; font-size: 9pt; color: #666; border-top: 1px solid #ddd; padding-top: 3mm; }}
.page-number::after {{ counter-increment: page; content: "Page " counter(page); }}
.container {{ margin: 5mm 0 10mm 0; background-color: white; }}
.header {{ display: flex; align-items: center; border-bottom: 2px solid {accent}; padding-bottom: 10px; margin-bottom: 20px; }}
.logo {{ width: 40px; height: 40px; }}
.title {{ margin-left: 15px; color: {accent}; font-size: 24px; font-weight: bold; }}
h1, h2, h3, h4, h5, h6 {{ color: #2c3e50; }}
h1 {{ font-size: 28px; border-bottom: 1px solid #eee; padding-bottom: 10px; }}
h2 {{ font-size: 24px; margin-top: 30px; color: {accent}; }}
h3 {{ font-size: 20px; color: #2980b9; }}
code {{ font-family: 'Courier New', Courier, monospace; background-color: #f7f9fb; padding: 2px 5px; border-radius: 3px; border: 1px solid #e1e4e8; color: #e74c3c; }}
pre {{ background-color: #282c34; padding: 15px; border-radius: 5px; overflow-x: auto; margin: 15px 0; border: 1px solid #ddd; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
pre code {{ color: #f8f8f2; background-color: transparent; padding: 0; border: none; font-size: 14px; line-height: 1.5; display: block; white-space: pre-wrap; }}
.hljs-keyword, .hljs-storage {{ color: #ff79c6; }}
.hljs-string {{ color: #f1fa8c; }}
.hljs-comment {{ color: #6272a4; }}
.hljs-function, .hljs-entity {{ color: #50fa7b; }}
.hljs-numeric, .hljs-number, .hljs-constant {{ color: #bd93f9; }}
.hljs-operator {{ color: #ff79c6; }}
.hljs-class, .hljs-support {{ color: #8be9fd; }}
a {{ color: {accent}; text-decoration: none; }}
blockquote {{ border-left: 4px solid {accent}; margin-left: 0; color: #666; background-color: #f9f9f9; padding: 10px 15px; }}
img {{ max-width: 100%; border-radius: 5px; box-shadow: 0 2px 5px rgba(0,0,0,0.1); }}
table {{ border-collapse: collapse; width: 100%; margin: 20px 0; box-shadow: 0 2px 3px rgba(0,0,0,0.1); }}
table, th, td {{ border: 1px solid #ddd; }}
th, td {{ padding: 12px; text-align: left; }}
th {{ background-color: {accent}; color: white; font-weight: bold; }}
tr:nth-child(even) {{ background-color: #f9f9f9; }}
.footer {{ margin-top: 40px; text-align: center; color: #777; font-size: 14px; border-top: 1px solid #eee; padding-top: 20px; }}"#
    )
}
