//! Code block language detection.
//!
//! Resolution order: explicit hint (info string or `language-*` class), then
//! interpreter shebang, then regex scoring over a fixed table of pattern sets,
//! then a strict JSON parse. Anything left over is plain text.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::types::CodeBlock;

/// Languages the highlighter knows how to color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
    Python,
    Ruby,
    Java,
    Php,
    Go,
    Rust,
    C,
    Cpp,
    CSharp,
    Html,
    Css,
    Scss,
    Json,
    Yaml,
    Markdown,
    Bash,
    Sql,
    Xml,
    Swift,
    Kotlin,
    Dart,
    Perl,
    R,
    Shell,
    PowerShell,
    Diff,
    PlainText,
}

impl Language {
    pub const ALL: [Language; 31] = [
        Language::JavaScript,
        Language::Jsx,
        Language::TypeScript,
        Language::Tsx,
        Language::Python,
        Language::Ruby,
        Language::Java,
        Language::Php,
        Language::Go,
        Language::Rust,
        Language::C,
        Language::Cpp,
        Language::CSharp,
        Language::Html,
        Language::Css,
        Language::Scss,
        Language::Json,
        Language::Yaml,
        Language::Markdown,
        Language::Bash,
        Language::Sql,
        Language::Xml,
        Language::Swift,
        Language::Kotlin,
        Language::Dart,
        Language::Perl,
        Language::R,
        Language::Shell,
        Language::PowerShell,
        Language::Diff,
        Language::PlainText,
    ];

    /// Canonical identifier, as used in `language-*` classes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::Jsx => "jsx",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
            Self::Python => "python",
            Self::Ruby => "ruby",
            Self::Java => "java",
            Self::Php => "php",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::CSharp => "csharp",
            Self::Html => "html",
            Self::Css => "css",
            Self::Scss => "scss",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Markdown => "markdown",
            Self::Bash => "bash",
            Self::Sql => "sql",
            Self::Xml => "xml",
            Self::Swift => "swift",
            Self::Kotlin => "kotlin",
            Self::Dart => "dart",
            Self::Perl => "perl",
            Self::R => "r",
            Self::Shell => "shell",
            Self::PowerShell => "powershell",
            Self::Diff => "diff",
            Self::PlainText => "plaintext",
        }
    }

    /// Human-readable label for code block headers.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::JavaScript => "JavaScript",
            Self::Jsx => "React JSX",
            Self::TypeScript => "TypeScript",
            Self::Tsx => "React TSX",
            Self::Python => "Python",
            Self::Ruby => "Ruby",
            Self::Java => "Java",
            Self::Php => "PHP",
            Self::Go => "Go",
            Self::Rust => "Rust",
            Self::C => "C",
            Self::Cpp => "C++",
            Self::CSharp => "C#",
            Self::Html => "HTML",
            Self::Css => "CSS",
            Self::Scss => "SCSS",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Markdown => "Markdown",
            Self::Bash => "Bash",
            Self::Sql => "SQL",
            Self::Xml => "XML",
            Self::Swift => "Swift",
            Self::Kotlin => "Kotlin",
            Self::Dart => "Dart",
            Self::Perl => "Perl",
            Self::R => "R",
            Self::Shell => "Shell",
            Self::PowerShell => "PowerShell",
            Self::Diff => "Diff",
            Self::PlainText => "Plain Text",
        }
    }

    /// Token used to look the grammar up in a syntect `SyntaxSet`.
    pub(crate) fn syntax_token(self) -> &'static str {
        match self {
            Self::JavaScript => "js",
            Self::Jsx => "jsx",
            Self::TypeScript => "ts",
            Self::Tsx => "tsx",
            Self::Python => "py",
            Self::Ruby => "rb",
            Self::Java => "java",
            Self::Php => "php",
            Self::Go => "go",
            Self::Rust => "rs",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::CSharp => "cs",
            Self::Html => "html",
            Self::Css => "css",
            Self::Scss => "scss",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Markdown => "md",
            Self::Bash | Self::Shell => "sh",
            Self::Sql => "sql",
            Self::Xml => "xml",
            Self::Swift => "swift",
            Self::Kotlin => "kt",
            Self::Dart => "dart",
            Self::Perl => "pl",
            Self::R => "r",
            Self::PowerShell => "ps1",
            Self::Diff => "diff",
            Self::PlainText => "txt",
        }
    }

    /// Look up a canonical identifier (case-insensitive). Aliases are not accepted here.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|lang| lang.as_str() == name)
    }

    pub fn is_plain_text(self) -> bool {
        self == Self::PlainText
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File-extension style aliases accepted as hints.
const EXTENSION_ALIASES: &[(&str, Language)] = &[
    ("js", Language::JavaScript),
    ("mjs", Language::JavaScript),
    ("jsx", Language::Jsx),
    ("ts", Language::TypeScript),
    ("tsx", Language::Tsx),
    ("py", Language::Python),
    ("rb", Language::Ruby),
    ("java", Language::Java),
    ("php", Language::Php),
    ("go", Language::Go),
    ("golang", Language::Go),
    ("rs", Language::Rust),
    ("c", Language::C),
    ("cpp", Language::Cpp),
    ("cs", Language::CSharp),
    ("html", Language::Html),
    ("htm", Language::Html),
    ("css", Language::Css),
    ("scss", Language::Scss),
    ("json", Language::Json),
    ("yaml", Language::Yaml),
    ("yml", Language::Yaml),
    ("md", Language::Markdown),
    ("sh", Language::Bash),
    ("bash", Language::Bash),
    ("zsh", Language::Bash),
    ("sql", Language::Sql),
    ("kt", Language::Kotlin),
    ("ps1", Language::PowerShell),
    ("txt", Language::PlainText),
    ("text", Language::PlainText),
];

/// Interpreter lines recognised at the very start of a block.
const SHEBANGS: &[(&str, Language)] = &[
    ("#!/bin/bash", Language::Bash),
    ("#!/usr/bin/env bash", Language::Bash),
    ("#!/bin/sh", Language::Shell),
    ("#!/usr/bin/env sh", Language::Shell),
    ("#!/usr/bin/env python", Language::Python),
    ("#!/usr/bin/python", Language::Python),
    ("#!/usr/bin/env node", Language::JavaScript),
    ("#!/usr/bin/env ruby", Language::Ruby),
    ("#!/usr/bin/env perl", Language::Perl),
    ("#!/usr/bin/perl", Language::Perl),
];

/// Python wins outright once this many of its patterns match.
pub const PYTHON_CONFIDENCE_THRESHOLD: usize = 3;

fn patterns(sources: &[&str]) -> Vec<Regex> {
    sources.iter().map(|p| Regex::new(p).unwrap()).collect()
}

lazy_static! {
    /// Scored languages, in tie-break precedence order after Python.
    static ref PATTERN_SETS: Vec<(Language, Vec<Regex>)> = vec![
        (
            Language::Python,
            patterns(&[
                r"def\s+\w+\s*\([^)]*\)\s*:",
                r"class\s+\w+(\(.*\))?\s*:",
                r"import\s+(\w+\.)*\w+",
                r"from\s+(\w+\.)*\w+\s+import",
                r"(?m)if\s+.*:\s*$",
                r"for\s+\w+\s+in\s+.*:",
                r"while\s+.*:",
                r"(?m)^\s*#.*$",
                r"print\s*\(",
                r"\s{4}",
            ]),
        ),
        (
            Language::JavaScript,
            patterns(&[
                r"const\s+\w+\s*=",
                r"let\s+\w+\s*=",
                r"var\s+\w+\s*=",
                r"function\s+\w+\s*\(",
                r"=>\s*\{",
                r"export\s+(default\s+)?",
                r"import\s+.*\s+from\s+",
                r"(?m)//.*$",
                r"console\.(log|warn|error)\(",
            ]),
        ),
        (
            Language::Html,
            patterns(&[
                r"<\w+>",
                r"</\w+>",
                r"<\w+\s+.*?>",
                r"(?i)<!DOCTYPE\s+html>",
                r"<html[^>]*>",
            ]),
        ),
        (
            Language::Css,
            patterns(&[
                r"\w+\s*\{\s*\w+-?\w*:\s*[^;{}]+(;|\s*\})",
                r"\.[a-zA-Z][\w-]*\s*\{",
                r"#[a-zA-Z][\w-]*\s*\{",
                r"@media\s+",
                r"@keyframes\s+",
                r"@import\s+",
            ]),
        ),
    ];

    static ref CLASS_HINT: Regex = Regex::new(r"language-(\w+)").unwrap();
    static ref WRAPPED_FENCE: Regex = Regex::new(r"^```(\w+)\s").unwrap();
}

/// How a language was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Hint,
    Shebang,
    Heuristic,
    Json,
    Fallback,
}

/// Result of language resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub language: Language,
    pub method: DetectionMethod,
}

impl Detection {
    fn new(language: Language, method: DetectionMethod) -> Self {
        Self { language, method }
    }
}

/// Pattern hit counts for the scored languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scores {
    pub python: usize,
    pub javascript: usize,
    pub html: usize,
    pub css: usize,
}

impl Scores {
    /// Count matching patterns per language.
    pub fn of(code: &str) -> Self {
        let mut scores = Self::default();
        for (language, set) in PATTERN_SETS.iter() {
            let hits = set.iter().filter(|re| re.is_match(code)).count();
            match language {
                Language::Python => scores.python = hits,
                Language::JavaScript => scores.javascript = hits,
                Language::Html => scores.html = hits,
                Language::Css => scores.css = hits,
                _ => {}
            }
        }
        scores
    }

    fn is_zero(&self) -> bool {
        self.python == 0 && self.javascript == 0 && self.html == 0 && self.css == 0
    }

    /// Highest scoring of JavaScript, HTML and CSS; earlier wins ties.
    fn best_non_python(&self) -> (Language, usize) {
        let mut best = (Language::JavaScript, self.javascript);
        for candidate in [(Language::Html, self.html), (Language::Css, self.css)] {
            if candidate.1 > best.1 {
                best = candidate;
            }
        }
        best
    }
}

/// Extract a hint from an info string: first token, lowercased, with any
/// `language-` prefix or `{}` decoration removed.
pub fn hint_from_info(info: &str) -> Option<String> {
    let token = info
        .trim()
        .split(|c: char| c.is_whitespace() || c == ',')
        .next()?
        .trim_matches(|c| c == '{' || c == '}' || c == '.');
    let token = token.strip_prefix("language-").unwrap_or(token);
    if token.is_empty() {
        None
    } else {
        Some(token.to_ascii_lowercase())
    }
}

/// Extract a hint from a CSS class list such as `"hljs language-py"`.
pub fn hint_from_class(class: &str) -> Option<String> {
    CLASS_HINT
        .captures(class)
        .map(|caps| caps[1].to_ascii_lowercase())
}

/// Map a hint (alias or canonical name) to a supported language.
pub fn language_from_hint(hint: &str) -> Option<Language> {
    let hint = hint.trim().to_ascii_lowercase();
    EXTENSION_ALIASES
        .iter()
        .find(|(alias, _)| *alias == hint)
        .map(|(_, lang)| *lang)
        .or_else(|| Language::from_name(&hint))
}

/// Resolve the language of a code block.
pub fn detect(block: &CodeBlock) -> Detection {
    resolve(block.language_hint.as_deref(), &block.raw_content)
}

/// Resolve a language from an optional hint and the code text.
pub fn detect_language(hint: Option<&str>, code: &str) -> Language {
    resolve(hint, code).language
}

/// Full resolution, reporting which rule decided.
pub fn resolve(hint: Option<&str>, code: &str) -> Detection {
    let (wrapped_hint, code) = strip_wrapping_fence(code.trim());

    for candidate in [hint.and_then(hint_from_info), wrapped_hint].into_iter().flatten() {
        if let Some(language) = language_from_hint(&candidate) {
            return Detection::new(language, DetectionMethod::Hint);
        }
    }

    if let Some((_, language)) = SHEBANGS.iter().find(|(prefix, _)| code.starts_with(prefix)) {
        return Detection::new(*language, DetectionMethod::Shebang);
    }

    let scores = Scores::of(code);
    if scores.python >= PYTHON_CONFIDENCE_THRESHOLD {
        return Detection::new(Language::Python, DetectionMethod::Heuristic);
    }

    let (best, best_score) = scores.best_non_python();
    if scores.python > best_score {
        return Detection::new(Language::Python, DetectionMethod::Heuristic);
    }
    if best_score > 0 {
        return Detection::new(best, DetectionMethod::Heuristic);
    }

    if scores.is_zero() && looks_like_json(code) {
        return Detection::new(Language::Json, DetectionMethod::Json);
    }

    Detection::new(Language::PlainText, DetectionMethod::Fallback)
}

fn looks_like_json(code: &str) -> bool {
    let trimmed = code.trim();
    !trimmed.is_empty() && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
}

/// Some authors paste the whole fenced block, fences included, into a code
/// element. Peel those fences off and report their info string.
fn strip_wrapping_fence(code: &str) -> (Option<String>, &str) {
    if !(code.starts_with("```") && code.ends_with("```") && code.len() >= 6) {
        return (None, code);
    }
    let hint = WRAPPED_FENCE
        .captures(code)
        .map(|caps| caps[1].to_ascii_lowercase());

    let body = match code.find('\n') {
        Some(first_newline) => &code[first_newline + 1..],
        None => return (hint, ""),
    };
    let body = body.strip_suffix("```").unwrap_or(body);
    (hint, body.trim_end_matches('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn python_hint_wins_regardless_of_content() {
        let d = resolve(Some("py"), "<html><body>not python</body></html>");
        assert_eq!(d, Detection::new(Language::Python, DetectionMethod::Hint));
    }

    #[test]
    fn canonical_hint_bypasses_heuristics() {
        let block = CodeBlock::new(Some("python".into()), "print(\"hi\")");
        assert_eq!(detect(&block), Detection::new(Language::Python, DetectionMethod::Hint));
    }

    #[test]
    fn extension_aliases() {
        assert_eq!(detect_language(Some("js"), ""), Language::JavaScript);
        assert_eq!(detect_language(Some("rb"), ""), Language::Ruby);
        assert_eq!(detect_language(Some("ts"), ""), Language::TypeScript);
        assert_eq!(detect_language(Some("yml"), ""), Language::Yaml);
        assert_eq!(detect_language(Some("sh"), ""), Language::Bash);
        assert_eq!(detect_language(Some("RS"), ""), Language::Rust);
    }

    #[test]
    fn info_string_uses_first_token() {
        assert_eq!(detect_language(Some("rust ignore"), ""), Language::Rust);
        assert_eq!(detect_language(Some("{.python}"), ""), Language::Python);
        assert_eq!(detect_language(Some("language-go"), ""), Language::Go);
    }

    #[test]
    fn unknown_hint_falls_through_to_heuristics() {
        let d = resolve(Some("brainfuck"), "const x = 1;\nconsole.log(x);");
        assert_eq!(d, Detection::new(Language::JavaScript, DetectionMethod::Heuristic));
    }

    #[test]
    fn class_hint() {
        assert_eq!(hint_from_class("hljs language-py").as_deref(), Some("py"));
        assert_eq!(hint_from_class("plain"), None);
    }

    #[test]
    fn shebangs() {
        assert_eq!(
            resolve(None, "#!/bin/bash\necho hi"),
            Detection::new(Language::Bash, DetectionMethod::Shebang)
        );
        assert_eq!(detect_language(None, "#!/usr/bin/env python3\nx = 1"), Language::Python);
        assert_eq!(detect_language(None, "#!/usr/bin/env node\nx = 1"), Language::JavaScript);
    }

    #[test]
    fn confident_python() {
        let code = "import os\n\nclass Bar:\n    pass\n\ndef foo():\n    return os.getcwd()\n";
        assert!(Scores::of(code).python >= PYTHON_CONFIDENCE_THRESHOLD);
        assert_eq!(detect_language(None, code), Language::Python);
    }

    #[test]
    fn javascript_heuristic() {
        let code = "const add = (a, b) => {\n  return a + b;\n};\nconsole.log(add(1, 2));";
        assert_eq!(detect_language(None, code), Language::JavaScript);
    }

    #[test]
    fn html_heuristic() {
        let code = "<!DOCTYPE html>\n<html lang=\"en\">\n<body><p>Hello</p></body>\n</html>";
        assert_eq!(detect_language(None, code), Language::Html);
    }

    #[test]
    fn css_heuristic() {
        let code = ".card {\n  color: red;\n}\n@media screen {\n  .card { display: none; }\n}";
        assert_eq!(detect_language(None, code), Language::Css);
    }

    #[test]
    fn ties_prefer_javascript_then_html() {
        let scores = Scores { python: 0, javascript: 1, html: 1, css: 1 };
        assert_eq!(scores.best_non_python(), (Language::JavaScript, 1));
        let scores = Scores { python: 0, javascript: 0, html: 2, css: 2 };
        assert_eq!(scores.best_non_python(), (Language::Html, 2));
    }

    #[test]
    fn json_when_nothing_matches() {
        assert_eq!(
            resolve(None, "{\"name\": \"blog\", \"tags\": [1, 2]}"),
            Detection::new(Language::Json, DetectionMethod::Json)
        );
        assert_eq!(detect_language(None, "[1, 2, 3]"), Language::Json);
    }

    #[test]
    fn any_python_score_beats_json() {
        let code = "{\n    \"a\": 1\n}";
        assert_eq!(resolve(None, code), Detection::new(Language::Python, DetectionMethod::Heuristic));
        assert_eq!(
            resolve(None, "{\"a\": 1}"),
            Detection::new(Language::Json, DetectionMethod::Json)
        );
    }

    #[test]
    fn plain_text_fallback() {
        assert_eq!(
            resolve(None, "just some words"),
            Detection::new(Language::PlainText, DetectionMethod::Fallback)
        );
        assert_eq!(detect_language(None, ""), Language::PlainText);
    }

    #[test]
    fn weak_python_signal_beats_plain_text() {
        assert_eq!(detect_language(None, "print('hello')"), Language::Python);
    }

    #[test]
    fn wrapped_fence_is_peeled() {
        let code = "```rb\nputs 'hi'\n```";
        assert_eq!(resolve(None, code), Detection::new(Language::Ruby, DetectionMethod::Hint));
    }

    #[test]
    fn display_names() {
        assert_eq!(Language::Cpp.display_name(), "C++");
        assert_eq!(Language::PlainText.display_name(), "Plain Text");
        assert_eq!(Language::JavaScript.to_string(), "javascript");
    }

    #[test]
    fn every_language_round_trips_through_its_name() {
        for lang in Language::ALL {
            assert_eq!(Language::from_name(lang.as_str()), Some(lang));
            assert_eq!(language_from_hint(lang.as_str()), Some(lang));
        }
    }

    proptest! {
        #[test]
        fn py_hint_always_python(code in ".{0,200}") {
            prop_assert_eq!(detect_language(Some("py"), &code), Language::Python);
        }

        #[test]
        fn words_only_is_plain_text(words in proptest::collection::vec("[a-z]{1,8}", 1..8)) {
            // Lowercase words joined by single spaces can't hit any pattern
            // unless they spell a keyword, so avoid those.
            let keywords = ["def", "class", "import", "from", "if", "for", "while", "print",
                "const", "let", "var", "function", "export", "true", "false", "null"];
            prop_assume!(words.iter().all(|w| !keywords.contains(&w.as_str())));
            prop_assume!(words.iter().all(|w| !w.contains("import") && !w.contains("export")));
            prop_assert_eq!(detect_language(None, &words.join(" ")), Language::PlainText);
        }
    }
}
