//! Settings file.
//!
//! ```toml
//! content_dir = "content"
//! export_dir = "cheatsheets"
//! listen = "0.0.0.0:3000"
//!
//! [render.styles]
//! h1 = "title"
//!
//! [pdf]
//! timeout_secs = 20
//!
//! [pdf.print.branding]
//! name = "Acme"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::render::RenderOptions;
#[cfg(feature = "pdf")]
use crate::render_pdf::PdfConfig;
use crate::toc::TocOptions;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root directory of markdown sources.
    pub content_dir: PathBuf,
    /// Sub-directory of `content_dir` used when an export request names none.
    pub export_dir: Option<String>,
    /// Listen address for `blogmark serve`.
    pub listen: String,
    pub render: RenderOptions,
    pub toc: TocOptions,
    #[cfg(feature = "pdf")]
    pub pdf: PdfConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            export_dir: Some("cheatsheets".into()),
            listen: "127.0.0.1:3000".into(),
            render: RenderOptions::default(),
            toc: TocOptions::default(),
            #[cfg(feature = "pdf")]
            pdf: PdfConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleMap;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn nested_overrides() {
        let settings = Settings::from_toml_str(
            r#"
content_dir = "posts"
listen = "0.0.0.0:8080"

[render]
highlight = false

[render.styles]
h1 = "title"

[toc]
show_numbers = false
"#,
        )
        .unwrap();
        assert_eq!(settings.content_dir, PathBuf::from("posts"));
        assert_eq!(settings.listen, "0.0.0.0:8080");
        assert!(!settings.render.highlight);
        assert_eq!(settings.render.styles.h1, "title");
        assert_eq!(settings.render.styles.h2, StyleMap::default().h2);
        assert!(!settings.toc.show_numbers);
        assert_eq!(settings.export_dir.as_deref(), Some("cheatsheets"));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_branding_override() {
        let settings = Settings::from_toml_str("[pdf]\nsettle_delay_ms = 0\n[pdf.print.branding]\nname = \"Acme\"\n").unwrap();
        assert_eq!(settings.pdf.settle_delay_ms, 0);
        assert_eq!(settings.pdf.print.branding.name, "Acme");
        assert_eq!(settings.pdf.print.branding.site, "devblogger.in");
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Settings::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn parse_errors_surface() {
        assert!(matches!(Settings::from_toml_str("listen = 3"), Err(ConfigError::Parse(_))));
    }
}
