//! PDF export via headless Chromium.
//!
//! Markdown is turned into the standalone print document from
//! [`crate::print`] and piped through headless Chrome's built-in PDF printer
//! using the Chrome DevTools Protocol. Each export launches its own browser
//! and closes it again on every exit path, including timeouts.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use futures::StreamExt;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::content::ContentStore;
use crate::error::ExportError;
use crate::print::{PrintOptions, to_print_html};

const MM_PER_INCH: f64 = 25.4;

/// Paper sizes for PDF output.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    /// 8.5 x 11 inches
    Letter,
    /// 210 x 297 mm
    A4,
    /// 8.5 x 14 inches
    Legal,
    /// Custom width x height in inches
    Custom { width: f64, height: f64 },
}

impl PaperSize {
    /// Width in inches.
    fn width(&self) -> f64 {
        match self {
            Self::Letter => 8.5,
            Self::A4 => 8.27,
            Self::Legal => 8.5,
            Self::Custom { width, .. } => *width,
        }
    }

    /// Height in inches.
    fn height(&self) -> f64 {
        match self {
            Self::Letter => 11.0,
            Self::A4 => 11.69,
            Self::Legal => 14.0,
            Self::Custom { height, .. } => *height,
        }
    }
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 25.0,
            right: 15.0,
            bottom: 25.0,
            left: 15.0,
        }
    }
}

fn inches(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// Configuration for PDF rendering.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Paper size (default: A4).
    pub paper_size: PaperSize,
    pub margins: Margins,
    pub landscape: bool,
    /// Print background graphics (default: true).
    pub print_background: bool,
    /// Pause after fonts are ready, before printing.
    pub settle_delay_ms: u64,
    /// Upper bound for the whole browser session.
    pub timeout_secs: u64,
    /// Branding and labels of the print document.
    pub print: PrintOptions,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            margins: Margins::default(),
            landscape: false,
            print_background: true,
            settle_delay_ms: 500,
            timeout_secs: 30,
            print: PrintOptions::default(),
        }
    }
}

impl PdfConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Errors that can occur during PDF generation.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// Failed to launch headless Chrome.
    #[error("Chrome launch failed: {0}")]
    ChromeLaunch(String),

    /// Failed to load page content.
    #[error("Page load failed: {0}")]
    PageLoad(String),

    /// Failed to generate PDF from page.
    #[error("PDF generation failed: {0}")]
    PdfGeneration(String),

    /// The browser session did not finish in time.
    #[error("PDF rendering timed out after {0:?}")]
    Timeout(Duration),
}

/// Read `<filename>.md` from `directory` under `store` and render it to PDF.
///
/// The source is read and validated before any browser is launched, so a
/// bad name or missing file never costs a Chrome process.
#[instrument(skip(store, config), fields(root = %store.root().display()))]
pub async fn export_markdown(
    store: &ContentStore,
    filename: &str,
    directory: Option<&str>,
    config: &PdfConfig,
) -> Result<Vec<u8>, ExportError> {
    if filename.trim().is_empty() {
        return Err(ExportError::InvalidInput("filename missing".into()));
    }
    let store = match directory {
        Some(dir) => store.subdirectory(dir)?,
        None => store.clone(),
    };
    let markdown = store.read_async(filename).await?;
    let html = to_print_html(filename, &markdown, &config.print);
    let pdf = html_to_pdf(&html, config).await?;
    debug!(bytes = pdf.len(), "exported pdf");
    Ok(pdf)
}

/// Render a complete HTML document to PDF bytes using headless Chromium.
///
/// # Errors
///
/// Returns [`PdfError`] if Chrome cannot be launched, the page fails to load,
/// PDF generation fails, or the session exceeds [`PdfConfig::timeout`].
#[instrument(skip(html, config), fields(html_bytes = html.len()))]
pub async fn html_to_pdf(html: &str, config: &PdfConfig) -> Result<Vec<u8>, PdfError> {
    let html = inject_print_css(html, config);

    let browser_config = BrowserConfig::builder()
        .no_sandbox()
        .build()
        .map_err(PdfError::ChromeLaunch)?;

    let (mut browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| PdfError::ChromeLaunch(e.to_string()))?;

    // Drive the handler on a background task
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    let result = match tokio::time::timeout(config.timeout(), print_page(&browser, &html, config)).await {
        Ok(result) => result,
        Err(_) => Err(PdfError::Timeout(config.timeout())),
    };

    match browser.close().await {
        Ok(_) => {
            let _ = handler_task.await;
        }
        Err(e) => {
            warn!(error = %e, "failed to close browser cleanly");
            handler_task.abort();
        }
    }

    result
}

async fn print_page(browser: &Browser, html: &str, config: &PdfConfig) -> Result<Vec<u8>, PdfError> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| PdfError::PageLoad(e.to_string()))?;

    page.set_content(html)
        .await
        .map_err(|e| PdfError::PageLoad(e.to_string()))?;

    page.evaluate_expression("document.fonts.ready.then(() => true)")
        .await
        .map_err(|e| PdfError::PageLoad(e.to_string()))?;
    tokio::time::sleep(config.settle_delay()).await;

    let pdf_params = PrintToPdfParams::builder()
        .paper_width(config.paper_size.width())
        .paper_height(config.paper_size.height())
        .margin_top(inches(config.margins.top))
        .margin_right(inches(config.margins.right))
        .margin_bottom(inches(config.margins.bottom))
        .margin_left(inches(config.margins.left))
        .landscape(config.landscape)
        .print_background(config.print_background)
        .display_header_footer(false);

    let pdf_bytes = page
        .pdf(pdf_params.build())
        .await
        .map_err(|e| PdfError::PdfGeneration(e.to_string()))?;

    if !pdf_bytes.starts_with(b"%PDF-") {
        return Err(PdfError::PdfGeneration(format!(
            "browser returned {} bytes without a PDF header",
            pdf_bytes.len()
        )));
    }
    Ok(pdf_bytes)
}

/// Inject print-specific CSS into an HTML page before the closing `</head>` tag.
///
/// Adds an `@page` rule for the configured paper size and margins, plus
/// `@media print` overrides to keep backgrounds in the output.
pub fn inject_print_css(html: &str, config: &PdfConfig) -> String {
    let width = config.paper_size.width();
    let height = config.paper_size.height();
    let Margins { top, right, bottom, left } = config.margins;

    let print_css = format!(
        r#"<style>
    @page {{
        size: {width}in {height}in;
        margin: {top}mm {right}mm {bottom}mm {left}mm;
    }}
    @media print {{
        body {{
            -webkit-print-color-adjust: exact;
            print-color-adjust: exact;
        }}
    }}
    </style>"#
    );

    if let Some(pos) = html.find("</head>") {
        let mut result = String::with_capacity(html.len() + print_css.len() + 1);
        result.push_str(&html[..pos]);
        result.push('\n');
        result.push_str(&print_css);
        result.push('\n');
        result.push_str(&html[pos..]);
        result
    } else {
        format!("{print_css}\n{html}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_config_defaults() {
        let config = PdfConfig::default();
        assert_eq!(config.paper_size, PaperSize::A4);
        assert_eq!(config.margins, Margins { top: 25.0, right: 15.0, bottom: 25.0, left: 15.0 });
        assert!(!config.landscape);
        assert!(config.print_background);
        assert_eq!(config.settle_delay(), Duration::from_millis(500));
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn paper_size_dimensions() {
        assert!((PaperSize::Letter.width() - 8.5).abs() < f64::EPSILON);
        assert!((PaperSize::Letter.height() - 11.0).abs() < f64::EPSILON);

        assert!((PaperSize::A4.width() - 8.27).abs() < f64::EPSILON);
        assert!((PaperSize::A4.height() - 11.69).abs() < f64::EPSILON);

        assert!((PaperSize::Legal.height() - 14.0).abs() < f64::EPSILON);

        let custom = PaperSize::Custom {
            width: 5.0,
            height: 7.0,
        };
        assert!((custom.width() - 5.0).abs() < f64::EPSILON);
        assert!((custom.height() - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn margins_convert_to_inches() {
        assert!((inches(25.4) - 1.0).abs() < 1e-9);
        assert!((inches(15.0) - 0.590_551).abs() < 1e-6);
    }

    #[test]
    fn config_from_toml() {
        let config: PdfConfig = toml::from_str(
            "paper_size = \"letter\"\ntimeout_secs = 5\n[margins]\ntop = 10.0\nright = 10.0\nbottom = 10.0\nleft = 10.0\n",
        )
        .unwrap();
        assert_eq!(config.paper_size, PaperSize::Letter);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.settle_delay_ms, 500);
        assert!((config.margins.left - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn inject_print_css_inserts_before_head_close() {
        let html = "<html>\n<head>\n<title>Test</title>\n</head>\n<body>Hello</body>\n</html>";
        let result = inject_print_css(html, &PdfConfig::default());

        let head_close_pos = result.find("</head>").expect("should have </head>");
        let page_rule_pos = result.find("@page").expect("should have @page rule");
        assert!(page_rule_pos < head_close_pos);
        assert!(result.contains("8.27in 11.69in"));
        assert!(result.contains("margin: 25mm 15mm 25mm 15mm"));
        assert!(result.contains("print-color-adjust: exact"));
        assert!(result.contains("<title>Test</title>"));
    }

    #[test]
    fn inject_print_css_no_head_tag() {
        let result = inject_print_css("<html><body>Hello</body></html>", &PdfConfig::default());
        assert!(result.starts_with("<style>"));
        assert!(result.contains("@page"));
    }

    #[test]
    fn pdf_error_display() {
        let err = PdfError::ChromeLaunch("no chrome found".to_string());
        assert_eq!(err.to_string(), "Chrome launch failed: no chrome found");

        let err = PdfError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "PDF rendering timed out after 30s");
    }

    #[tokio::test]
    async fn missing_source_fails_before_launching_chrome() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let err = export_markdown(&store, "absent", None, &PdfConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn blank_filename_is_invalid_input() {
        let store = ContentStore::new(".");
        let err = export_markdown(&store, "  ", None, &PdfConfig::default()).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn escaping_directory_is_invalid_input() {
        let store = ContentStore::new(".");
        let err = export_markdown(&store, "x", Some("../.."), &PdfConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    /// Requires a working Chrome installation.
    /// Run with: cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn export_produces_valid_pdf_bytes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.md"), "# Hello\n\n```py\nprint('hi')\n```\n").unwrap();
        let store = ContentStore::new(dir.path());

        let pdf = export_markdown(&store, "hello", None, &PdfConfig::default())
            .await
            .expect("PDF generation should succeed");
        assert_eq!(&pdf[..5], b"%PDF-");
    }

    #[tokio::test]
    #[ignore]
    async fn landscape_letter() {
        let config = PdfConfig {
            paper_size: PaperSize::Letter,
            landscape: true,
            ..PdfConfig::default()
        };
        let pdf = html_to_pdf("<html><head></head><body>Wide</body></html>", &config)
            .await
            .expect("PDF should generate");
        assert!(pdf.starts_with(b"%PDF-"));
    }
}
