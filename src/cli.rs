use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Content origin: an http(s) base URL or a local directory
    /// (default: `DOCPORTAL_CONTENT`, then `http://localhost:3000`).
    #[arg(long, global = true)]
    pub content: Option<String>,

    /// Request timeout for the HTTP origin (default: `DOCPORTAL_TIMEOUT_SECS`, then 10).
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render one doc from the content origin.
    Doc(DocArgs),
    /// Print the table of contents built from the manifest.
    Toc(TocArgs),
    /// Render a local Markdown file.
    Render(RenderArgs),
    /// Write every doc plus the TOC to a directory.
    Export(ExportArgs),
    /// Serve the JSON API.
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct DocArgs {
    /// Doc slug, e.g. `guides/deploy/quickstart`.
    #[arg(long)]
    pub slug: String,

    /// Print the whole document as JSON instead of HTML.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TocFormat {
    Json,
    Yaml,
}

#[derive(Debug, Args)]
pub struct TocArgs {
    #[arg(long, value_enum, default_value_t = TocFormat::Json)]
    pub format: TocFormat,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Markdown file (frontmatter optional).
    #[arg(long)]
    pub input: String,

    /// Print frontmatter and HTML as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output directory.
    #[arg(long)]
    pub out: String,

    /// Overwrite an existing output directory.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address.
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub addr: String,

    /// YAML file with blog, news and doc listing records.
    #[arg(long)]
    pub catalog: Option<String>,
}
