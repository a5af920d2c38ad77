use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::fetch::{ContentSource, FsContentSource, HttpContentSource};

pub const DEFAULT_CONTENT: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("docportal/", env!("CARGO_PKG_VERSION"));

/// Where raw Markdown and the manifest are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentOrigin {
    Http(Url),
    Dir(PathBuf),
}

impl ContentOrigin {
    /// `http(s)://…` is an HTTP origin, `file://…` or a plain path is a
    /// directory. Other URL schemes are rejected.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            anyhow::bail!("content origin is empty");
        }

        if !raw.contains("://") {
            return Ok(Self::Dir(PathBuf::from(raw)));
        }

        let url = Url::parse(raw).with_context(|| format!("parse content origin url: {raw}"))?;
        match url.scheme() {
            "http" | "https" => {
                if url.host_str().is_none() {
                    anyhow::bail!("content origin url must have a host: {url}");
                }
                Ok(Self::Http(url))
            }
            "file" => url
                .to_file_path()
                .map(Self::Dir)
                .map_err(|()| anyhow::anyhow!("content origin is not a local path: {url}")),
            other => anyhow::bail!("unsupported content origin scheme: {other}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentConfig {
    pub origin: ContentOrigin,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ContentConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads `DOCPORTAL_CONTENT`, `DOCPORTAL_TIMEOUT_SECS` and
    /// `DOCPORTAL_USER_AGENT` through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let origin_raw = non_empty("DOCPORTAL_CONTENT").unwrap_or_else(|| DEFAULT_CONTENT.to_owned());
        let origin = ContentOrigin::parse(&origin_raw)
            .with_context(|| format!("invalid DOCPORTAL_CONTENT={origin_raw:?}"))?;

        let timeout_secs = match non_empty("DOCPORTAL_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("invalid DOCPORTAL_TIMEOUT_SECS={raw:?}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let user_agent =
            non_empty("DOCPORTAL_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

        let config = Self {
            origin,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent,
        };
        config.with_timeout_secs(timeout_secs)
    }

    /// Applies command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        content: Option<&str>,
        timeout_secs: Option<u64>,
    ) -> anyhow::Result<Self> {
        if let Some(content) = content {
            self.origin = ContentOrigin::parse(content).context("parse --content")?;
        }
        match timeout_secs {
            Some(secs) => self.with_timeout_secs(secs),
            None => Ok(self),
        }
    }

    fn with_timeout_secs(mut self, secs: u64) -> anyhow::Result<Self> {
        if secs == 0 {
            anyhow::bail!("timeout must be > 0 seconds");
        }
        self.timeout = Duration::from_secs(secs);
        Ok(self)
    }

    pub fn build_source(&self) -> anyhow::Result<Arc<dyn ContentSource>> {
        match &self.origin {
            ContentOrigin::Http(base) => {
                tracing::debug!(base = %base, "using http content origin");
                let source = HttpContentSource::new(base.clone(), self.timeout, &self.user_agent)
                    .context("build http content source")?;
                Ok(Arc::new(source))
            }
            ContentOrigin::Dir(root) => {
                tracing::debug!(root = %root.display(), "using directory content origin");
                Ok(Arc::new(FsContentSource::new(root.clone())))
            }
        }
    }
}
