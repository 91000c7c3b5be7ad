use std::path::{Path, PathBuf};

use blogmark::serve::{ExportState, router};
use blogmark::{
    ContentStore, ExportError, Settings, config::ConfigError, export_markdown, extract_headings,
    language, number_headings, render_page,
};
use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Render blog markdown to HTML and export cheat sheets to PDF.
#[derive(Debug, Parser)]
#[command(name = "blogmark", version, about, long_about = None)]
struct Cli {
    /// Settings file (TOML).
    #[arg(long, env = "BLOGMARK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Root directory of markdown sources; overrides the settings file.
    #[arg(long, env = "BLOGMARK_CONTENT_DIR", global = true)]
    content_dir: Option<PathBuf>,

    /// Enable debug logging (otherwise RUST_LOG or `blogmark=info`).
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the numbered table of contents of a markdown file.
    Toc {
        file: PathBuf,
        /// Emit JSON instead of an outline.
        #[arg(long)]
        json: bool,
    },
    /// Detect the language of a code snippet.
    Detect {
        file: PathBuf,
        /// Explicit language hint, as in a fence info string.
        #[arg(long)]
        hint: Option<String>,
    },
    /// Render a markdown file to HTML on stdout.
    Render {
        file: PathBuf,
        /// Prepend the table of contents.
        #[arg(long)]
        toc: bool,
        /// Inline the copy-button script after the article.
        #[arg(long)]
        script: bool,
    },
    /// Export `<id>.md` from the content directory to PDF.
    Pdf {
        id: String,
        /// Sub-directory of the content directory.
        #[arg(long)]
        dir: Option<String>,
        /// Output path (default: `<id>.pdf`).
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Serve the export endpoint, stylesheet and copy script over HTTP.
    Serve {
        #[arg(long, env = "BLOGMARK_LISTEN")]
        listen: Option<String>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    run(cli).await
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("blogmark=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blogmark=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(dir) = cli.content_dir {
        settings.content_dir = dir;
    }

    match cli.command {
        Command::Toc { file, json } => {
            let headings = extract_headings(&read_file(&file)?);
            let numbered = number_headings(&headings);
            if json {
                println!("{}", serde_json::to_string_pretty(&numbered)?);
            } else {
                for entry in numbered {
                    let indent = "  ".repeat(usize::from(entry.heading.level.saturating_sub(1)));
                    println!("{indent}{}. {} (#{})", entry.number, entry.heading.text, entry.heading.slug);
                }
            }
        }
        Command::Detect { file, hint } => {
            let code = read_file(&file)?;
            let detection = language::resolve(hint.as_deref(), &code);
            println!("{} ({:?})", detection.language, detection.method);
        }
        Command::Render { file, toc, script } => {
            let page = render_page(&read_file(&file)?, &settings.render);
            if toc {
                print!("{}", page.toc_html(&settings.toc));
            }
            if script {
                print!("{}", page.to_html_with_script());
            } else {
                print!("{}", page.to_html());
            }
        }
        Command::Pdf { id, dir, out } => {
            let store = ContentStore::new(&settings.content_dir);
            let dir = dir.or(settings.export_dir.clone());
            let pdf = export_markdown(&store, &id, dir.as_deref(), &settings.pdf).await?;
            let out = out.unwrap_or_else(|| PathBuf::from(format!("{id}.pdf")));
            tokio::fs::write(&out, &pdf).await.map_err(|source| CliError::Io {
                path: out.clone(),
                source,
            })?;
            info!(path = %out.display(), bytes = pdf.len(), "wrote pdf");
        }
        Command::Serve { listen } => {
            let listen = listen.unwrap_or(settings.listen);
            let state = ExportState::new(ContentStore::new(&settings.content_dir), settings.pdf)
                .with_default_dir(settings.export_dir);
            let listener = tokio::net::TcpListener::bind(&listen).await.map_err(CliError::Serve)?;
            info!(listen = %listen, "serving blogmark");
            axum::serve(listener, router(state)).await.map_err(CliError::Serve)?;
        }
    }
    Ok(())
}
