use anyhow::Context as _;

const DEFAULT_FILTER: &str = "info";

/// Logs go to stderr so command output on stdout stays machine readable.
pub fn init() -> anyhow::Result<()> {
    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}

fn build_filter(directives: Option<&str>) -> anyhow::Result<tracing_subscriber::EnvFilter> {
    match directives.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) => tracing_subscriber::EnvFilter::try_new(directives)
            .or_else(|_| tracing_subscriber::EnvFilter::try_new(DEFAULT_FILTER))
            .context("build log filter"),
        None => tracing_subscriber::EnvFilter::try_new(DEFAULT_FILTER).context("build log filter"),
    }
}
