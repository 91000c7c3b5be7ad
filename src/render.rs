//! Styled HTML renderer for blog posts.
//!
//! Markdown is parsed with pulldown-cmark and rewritten event by event:
//! headings get an empty anchor span in front of their text, code blocks go
//! through language detection and highlighting, tables are emitted twice
//! (a regular table for wide viewports, label/value cards for narrow ones),
//! and everything else gets the class configured in the [`StyleMap`].
//! Events the renderer has no opinion about are handed to pulldown-cmark's
//! own HTML writer.

use std::ops::Range;

use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use serde::Deserialize;
use tracing::debug;

use crate::copy::{COPY_RESET_DELAY, COPY_SCRIPT, CopyState};
use crate::headings::{SlugRegistry, extract_headings, slugify, source_heading_text};
use crate::highlight::{escape_html, highlight};
use crate::language::{self, hint_from_info};
use crate::style::StyleMap;
use crate::toc::{TocOptions, render_toc};
use crate::types::{CodeBlock, Heading, MarkdownDocument};

/// Renderer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub styles: StyleMap,
    /// Markup placed inside each ad slot wrapper.
    pub ad_markup: String,
    /// Run code through the syntax highlighter (otherwise escape only).
    pub highlight: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            styles: StyleMap::default(),
            ad_markup: r#"<ins class="adsbygoogle" style="display:block" data-ad-format="auto" data-full-width-responsive="true"></ins>"#.to_string(),
            highlight: true,
        }
    }
}

/// One piece of rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// A rendered markdown section.
    Section(String),
    /// An advertisement slot between two sections.
    AdSlot(String),
}

/// Sections and ad slots in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedDocument {
    pub fragments: Vec<Fragment>,
}

impl RenderedDocument {
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Section(html) => Some(html.as_str()),
            Fragment::AdSlot(_) => None,
        })
    }

    pub fn ad_slot_count(&self) -> usize {
        self.fragments
            .iter()
            .filter(|f| matches!(f, Fragment::AdSlot(_)))
            .count()
    }

    pub fn to_html(&self) -> String {
        self.fragments
            .iter()
            .map(|f| match f {
                Fragment::Section(html) | Fragment::AdSlot(html) => html.as_str(),
            })
            .collect()
    }
}

/// A fully rendered post: headings for the table of contents plus the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub headings: Vec<Heading>,
    pub document: RenderedDocument,
}

impl RenderedPage {
    /// Body wrapped in an `<article>`.
    pub fn to_html(&self) -> String {
        format!("<article class=\"blogmark\">\n{}</article>\n", self.document.to_html())
    }

    /// [`RenderedPage::to_html`] followed by an inline copy-button script,
    /// for pages that do not load it from the static route.
    pub fn to_html_with_script(&self) -> String {
        format!("{}<script>\n{COPY_SCRIPT}</script>\n", self.to_html())
    }

    /// Table of contents navigation for this page.
    pub fn toc_html(&self, options: &TocOptions) -> String {
        render_toc(&self.headings, options)
    }
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Extract headings and render the body of a post.
pub fn render_page(markdown: &str, options: &RenderOptions) -> RenderedPage {
    RenderedPage {
        headings: extract_headings(markdown),
        document: render_document(markdown, options),
    }
}

/// Render a post, splitting on the ad placeholder and interleaving ad slots.
pub fn render_document(markdown: &str, options: &RenderOptions) -> RenderedDocument {
    let doc = MarkdownDocument::parse(markdown);
    let mut slugs = SlugRegistry::new();
    let mut fragments = Vec::with_capacity(doc.sections.len() * 2);

    for (n, section) in doc.sections.iter().enumerate() {
        if n > 0 {
            fragments.push(Fragment::AdSlot(ad_slot_html(n - 1, options)));
        }
        fragments.push(Fragment::Section(render_section(&section.markdown, options, &mut slugs)));
    }

    debug!(
        sections = doc.sections.len(),
        ad_slots = doc.ad_slot_count(),
        "rendered markdown document"
    );
    RenderedDocument { fragments }
}

fn ad_slot_html(index: usize, options: &RenderOptions) -> String {
    format!(
        "<div{} data-ad-slot=\"{index}\">{}</div>\n",
        class_attr(&options.styles.ad_slot),
        options.ad_markup
    )
}

/// Render one section. `slugs` is shared across the sections of a document
/// so anchors stay unique.
pub fn render_section(markdown: &str, options: &RenderOptions, slugs: &mut SlugRegistry) -> String {
    let events: Vec<Spanned<'_>> = Parser::new_ext(markdown, markdown_options())
        .into_offset_iter()
        .collect();

    let mut writer = HtmlWriter {
        source: markdown,
        options,
        slugs,
        out: String::with_capacity(markdown.len() * 2),
        closers: Vec::new(),
        containers: 0,
    };
    writer.write(&events);
    writer.out
}

type Spanned<'a> = (Event<'a>, Range<usize>);

/// What to emit when the matching `End` event arrives.
enum Closer {
    Static(&'static str),
    /// Closes a block quote or list.
    Container(&'static str),
    Delegate,
}

struct Cell {
    html: String,
    text: String,
}

struct HtmlWriter<'r> {
    source: &'r str,
    options: &'r RenderOptions,
    slugs: &'r mut SlugRegistry,
    out: String,
    closers: Vec<Closer>,
    /// Open block quotes and lists. Headings inside them get no anchor.
    containers: usize,
}

impl HtmlWriter<'_> {
    fn styles(&self) -> &StyleMap {
        &self.options.styles
    }

    fn write(&mut self, events: &[Spanned<'_>]) {
        let mut i = 0;
        while i < events.len() {
            let (event, range) = &events[i];
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    let end = matching_end(events, i);
                    self.heading(*level as u8, range.clone(), &events[i + 1..end]);
                    i = end;
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    let end = matching_end(events, i);
                    self.code_block(kind, &events[i + 1..end]);
                    i = end;
                }
                Event::Start(Tag::Table(alignments)) => {
                    let end = matching_end(events, i);
                    self.table(alignments, &events[i + 1..end]);
                    i = end;
                }
                Event::Start(Tag::Image { dest_url, title, .. }) => {
                    let end = matching_end(events, i);
                    self.image(dest_url, title, &events[i + 1..end]);
                    i = end;
                }
                Event::Start(tag) => self.start(tag),
                Event::End(_) => self.end(event),
                Event::Code(code) => {
                    let class = class_attr(&self.options.styles.inline_code);
                    self.out.push_str(&format!("<code{class}>{}</code>", escape_html(code)));
                }
                Event::Rule => {
                    let class = class_attr(&self.options.styles.hr);
                    self.out.push_str(&format!("<hr{class}>\n"));
                }
                other => delegate(&mut self.out, other),
            }
            i += 1;
        }
    }

    fn open(&mut self, html: String, closer: &'static str) {
        self.out.push_str(&html);
        self.closers.push(Closer::Static(closer));
    }

    fn open_container(&mut self, html: String, closer: &'static str) {
        self.out.push_str(&html);
        self.closers.push(Closer::Container(closer));
        self.containers += 1;
    }

    fn start(&mut self, tag: &Tag<'_>) {
        let styles = self.styles();
        match tag {
            Tag::Paragraph => {
                let html = format!("<p{}>", class_attr(&styles.p));
                self.open(html, "</p>\n");
            }
            Tag::List(None) => {
                let html = format!("<ul{}>\n", class_attr(&styles.ul));
                self.open_container(html, "</ul>\n");
            }
            Tag::List(Some(1)) => {
                let html = format!("<ol{}>\n", class_attr(&styles.ol));
                self.open_container(html, "</ol>\n");
            }
            Tag::List(Some(start)) => {
                let html = format!("<ol start=\"{start}\"{}>\n", class_attr(&styles.ol));
                self.open_container(html, "</ol>\n");
            }
            Tag::Item => {
                let html = format!("<li{}>", class_attr(&styles.li));
                self.open(html, "</li>\n");
            }
            Tag::BlockQuote(_) => {
                let html = format!("<blockquote{}>\n", class_attr(&styles.blockquote));
                self.open_container(html, "</blockquote>\n");
            }
            Tag::Strong => {
                let html = format!("<strong{}>", class_attr(&styles.strong));
                self.open(html, "</strong>");
            }
            Tag::Emphasis => {
                let html = format!("<em{}>", class_attr(&styles.em));
                self.open(html, "</em>");
            }
            Tag::Link { dest_url, title, .. } => {
                let html = link_open(dest_url, title, &styles.a);
                self.open(html, "</a>");
            }
            other => {
                delegate(&mut self.out, &Event::Start(other.clone()));
                self.closers.push(Closer::Delegate);
            }
        }
    }

    fn end(&mut self, event: &Event<'_>) {
        match self.closers.pop() {
            Some(Closer::Static(html)) => self.out.push_str(html),
            Some(Closer::Container(html)) => {
                self.containers = self.containers.saturating_sub(1);
                self.out.push_str(html);
            }
            Some(Closer::Delegate) | None => delegate(&mut self.out, event),
        }
    }

    /// Render `events` into a detached buffer.
    fn render_fragment(&mut self, events: &[Spanned<'_>]) -> String {
        let saved_out = std::mem::take(&mut self.out);
        let saved_closers = std::mem::take(&mut self.closers);
        self.write(events);
        self.closers = saved_closers;
        std::mem::replace(&mut self.out, saved_out)
    }

    /// Top-level headings claim a slug and get an anchor span. Headings in
    /// block quotes or list items, and empty ones, are never in the table of
    /// contents and render bare.
    fn heading(&mut self, level: u8, range: Range<usize>, inner: &[Spanned<'_>]) {
        let text = self
            .source
            .get(range)
            .map(source_heading_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| plain_text(inner));
        let anchor = if self.containers == 0 && !text.trim().is_empty() {
            let slug = self.slugs.claim(&slugify(&text));
            format!("<span id=\"{}\"{}></span>", escape_html(&slug), class_attr(&self.styles().anchor))
        } else {
            String::new()
        };
        let body = self.render_fragment(inner);

        let html = format!(
            "<h{level}{}>{anchor}{body}</h{level}>\n",
            class_attr(self.styles().heading(level)),
        );
        self.out.push_str(&html);
    }

    fn code_block(&mut self, kind: &CodeBlockKind<'_>, inner: &[Spanned<'_>]) {
        let hint = match kind {
            CodeBlockKind::Fenced(info) => hint_from_info(info),
            CodeBlockKind::Indented => None,
        };
        let mut raw = String::new();
        for (event, _) in inner {
            if let Event::Text(text) = event {
                raw.push_str(text);
            }
        }
        let block = CodeBlock::new(hint, raw.trim_end_matches('\n'));
        let detection = language::detect(&block);
        let lang = detection.language;
        debug!(language = %lang, method = ?detection.method, "resolved code block language");

        let body = if self.options.highlight {
            highlight(&block.raw_content, lang)
        } else {
            escape_html(&block.raw_content)
        };
        let label = if lang.is_plain_text() { "" } else { lang.display_name() };
        let idle = CopyState::Idle;

        let html = format!(
            concat!(
                "<div class=\"code-block-wrapper\" data-language=\"{lang}\">\n",
                "<div class=\"code-header\"><span class=\"code-language\">{label}</span>",
                "<button type=\"button\" class=\"copy-button\" data-copy-state=\"{state}\" ",
                "data-copy-reset-ms=\"{reset}\" aria-label=\"Copy code to clipboard\">{button}</button></div>\n",
                "<pre{pre}><code class=\"language-{lang}\">{body}</code></pre>\n",
                "</div>\n",
            ),
            lang = lang.as_str(),
            label = label,
            state = idle.as_str(),
            reset = COPY_RESET_DELAY.as_millis(),
            button = idle.label(),
            pre = class_attr(&self.styles().pre),
            body = body,
        );
        self.out.push_str(&html);
    }

    fn table(&mut self, alignments: &[Alignment], inner: &[Spanned<'_>]) {
        let mut header: Vec<Cell> = Vec::new();
        let mut rows: Vec<Vec<Cell>> = Vec::new();
        let mut in_head = false;

        let mut i = 0;
        while i < inner.len() {
            match &inner[i].0 {
                Event::Start(Tag::TableHead) => in_head = true,
                Event::End(TagEnd::TableHead) => in_head = false,
                Event::Start(Tag::TableRow) => rows.push(Vec::new()),
                Event::Start(Tag::TableCell) => {
                    let end = matching_end(inner, i);
                    let cell_events = &inner[i + 1..end];
                    let cell = Cell {
                        html: self.render_fragment(cell_events),
                        text: plain_text(cell_events),
                    };
                    if in_head {
                        header.push(cell);
                    } else if let Some(row) = rows.last_mut() {
                        row.push(cell);
                    }
                    i = end;
                }
                _ => {}
            }
            i += 1;
        }

        let styles = self.styles();
        let mut html = String::from("<div class=\"table-responsive\">\n");

        html.push_str("<div class=\"table-wide hidden md:block overflow-x-auto\">");
        html.push_str(&format!("<table{}>", class_attr(&styles.table)));
        if !header.is_empty() {
            html.push_str("<thead><tr>");
            for (col, cell) in header.iter().enumerate() {
                html.push_str(&format!(
                    "<th{}{} scope=\"col\">{}</th>",
                    class_attr(&styles.th),
                    align_attr(alignments.get(col)),
                    cell.html
                ));
            }
            html.push_str("</tr></thead>");
        }
        html.push_str("<tbody>");
        for row in &rows {
            html.push_str("<tr>");
            for (col, cell) in row.iter().enumerate() {
                html.push_str(&format!(
                    "<td{}{}>{}</td>",
                    class_attr(&styles.td),
                    align_attr(alignments.get(col)),
                    cell.html
                ));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table></div>\n");

        html.push_str("<div class=\"table-stacked md:hidden\">\n");
        for row in &rows {
            html.push_str("<div class=\"table-card\">");
            for (col, cell) in row.iter().enumerate() {
                html.push_str("<div class=\"table-field\">");
                if let Some(label) = header.get(col).map(|h| h.text.trim()).filter(|t| !t.is_empty()) {
                    html.push_str(&format!("<span class=\"table-label\">{}:</span>", escape_html(label)));
                }
                html.push_str(&format!("<span class=\"table-value\">{}</span></div>", cell.html));
            }
            html.push_str("</div>\n");
        }
        html.push_str("</div>\n</div>\n");

        self.out.push_str(&html);
    }

    fn image(&mut self, dest_url: &CowStr<'_>, title: &CowStr<'_>, inner: &[Spanned<'_>]) {
        let alt = plain_text(inner);
        let alt = if alt.trim().is_empty() { "Image" } else { alt.trim() };
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(" title=\"{}\"", escape_html(title))
        };
        let html = format!(
            "<img src=\"{}\" alt=\"{}\"{title_attr}{} loading=\"lazy\">",
            escape_html(dest_url),
            escape_html(alt),
            class_attr(&self.styles().img),
        );
        self.out.push_str(&html);
    }
}

fn link_open(dest_url: &str, title: &str, class: &str) -> String {
    let mut html = format!("<a href=\"{}\"{}", escape_html(dest_url), class_attr(class));
    if !title.is_empty() {
        html.push_str(&format!(" title=\"{}\"", escape_html(title)));
    }
    if is_external(dest_url) {
        html.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
    }
    html.push('>');
    html
}

fn is_external(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn class_attr(class: &str) -> String {
    if class.is_empty() {
        String::new()
    } else {
        format!(" class=\"{}\"", escape_html(class))
    }
}

fn align_attr(alignment: Option<&Alignment>) -> &'static str {
    match alignment {
        Some(Alignment::Left) => " style=\"text-align: left\"",
        Some(Alignment::Center) => " style=\"text-align: center\"",
        Some(Alignment::Right) => " style=\"text-align: right\"",
        Some(Alignment::None) | None => "",
    }
}

fn delegate(out: &mut String, event: &Event<'_>) {
    pulldown_cmark::html::push_html(out, std::iter::once(event.clone()));
}

/// Index of the `End` matching the `Start` at `start`, or `events.len()`.
fn matching_end(events: &[Spanned<'_>], start: usize) -> usize {
    let mut depth = 0usize;
    for (j, (event, _)) in events.iter().enumerate().skip(start) {
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return j;
                }
            }
            _ => {}
        }
    }
    events.len()
}

fn plain_text(events: &[Spanned<'_>]) -> String {
    let mut text = String::new();
    for (event, _) in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}
