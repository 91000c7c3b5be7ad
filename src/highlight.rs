//! Syntax highlighting into class-annotated HTML.
//!
//! Scopes are emitted as space-separated `hljs-*` classes (`keyword.control`
//! becomes `hljs-keyword hljs-control`), so the same stylesheet colors both
//! the web renderer and the print document.

use lazy_static::lazy_static;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::warn;

use crate::language::Language;

lazy_static! {
    /// syntect defaults plus the bat grammars (TypeScript, TOML, Dockerfile, ...).
    static ref SYNTAX_SET: SyntaxSet = two_face::syntax::extra_newlines();
}

/// Prefix of every scope class in highlighted output.
pub const CLASS_PREFIX: &str = "hljs-";

fn class_style() -> ClassStyle {
    ClassStyle::SpacedPrefixed { prefix: CLASS_PREFIX }
}

fn find_syntax(language: Language) -> Option<&'static SyntaxReference> {
    let set: &'static SyntaxSet = &SYNTAX_SET;
    set.find_syntax_by_token(language.syntax_token())
        .or_else(|| set.find_syntax_by_token(language.as_str()))
}

/// Highlight `code` as `language`, returning the inner HTML of a `<code>` element.
///
/// Plain text, unknown grammars and grammar failures all degrade to escaped
/// text; highlighting never fails.
pub fn highlight(code: &str, language: Language) -> String {
    if language.is_plain_text() {
        return escape_html(code);
    }
    let Some(syntax) = find_syntax(language) else {
        warn!(language = %language, "no grammar for language, emitting plain text");
        return escape_html(code);
    };

    match highlight_with(code, syntax) {
        Ok(html) => html,
        Err(err) => {
            warn!(language = %language, error = %err, "highlighting failed, emitting plain text");
            escape_html(code)
        }
    }
}

fn highlight_with(code: &str, syntax: &SyntaxReference) -> Result<String, syntect::Error> {
    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, class_style());
    for line in LinesWithEndings::from(code) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    Ok(generator.finalize())
}

/// Whether a grammar is available for `language`.
pub fn has_grammar(language: Language) -> bool {
    !language.is_plain_text() && find_syntax(language).is_some()
}

/// Escape HTML special characters.
pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
