use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, USER_AGENT};
use url::Url;

use crate::formats::Manifest;

const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;
const MANIFEST_PATH: &str = "docs/manifest.json";
const MARKDOWN_ACCEPT: &str = "text/markdown, text/plain, */*";
const JSON_ACCEPT: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Doc,
    Blog,
}

impl ContentKind {
    pub fn dir(self) -> &'static str {
        match self {
            Self::Doc => "docs",
            Self::Blog => "blogs",
        }
    }

    fn relative_path(self, slug: &str) -> String {
        format!("{}/{slug}.md", self.dir())
    }
}

/// Read access to raw content.
///
/// `Ok(None)` means the resource does not exist; `Err` means the origin could
/// not be reached or answered with something unusable.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_markdown(&self, kind: ContentKind, slug: &str)
    -> anyhow::Result<Option<String>>;

    async fn fetch_manifest(&self) -> anyhow::Result<Option<Manifest>>;

    async fn fetch_doc(&self, slug: &str) -> anyhow::Result<Option<String>> {
        self.fetch_markdown(ContentKind::Doc, slug).await
    }

    async fn fetch_blog(&self, slug: &str) -> anyhow::Result<Option<String>> {
        self.fetch_markdown(ContentKind::Blog, slug).await
    }
}

/// Trims surrounding slashes and rejects slugs that could escape the
/// content root. `%` is refused outright so an encoded `..` never reaches
/// a URL parser.
pub fn normalize_slug(slug: &str) -> Option<&str> {
    let slug = slug.trim().trim_matches('/');
    if slug.is_empty() {
        return None;
    }
    let safe = slug.split('/').all(|segment| {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && !segment.contains(['\\', '?', '#', '%', '\0'])
    });
    safe.then_some(slug)
}

#[derive(Debug, Clone)]
pub struct HttpContentSource {
    client: reqwest::Client,
    base: Url,
}

impl HttpContentSource {
    pub fn new(base: Url, timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
        if base.scheme() != "http" && base.scheme() != "https" {
            anyhow::bail!("content base must be http/https: {base}");
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    USER_AGENT,
                    user_agent.parse().context("parse user agent header")?,
                );
                headers
            })
            .build()
            .context("build content http client")?;
        Ok(Self { client, base })
    }

    /// Appends `relative` to the base path segment by segment, so each
    /// segment is percent-encoded rather than reinterpreted.
    fn url_for(&self, relative: &str) -> anyhow::Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("content base cannot carry a path: {}", self.base))?
            .pop_if_empty()
            .extend(relative.split('/'));
        Ok(url)
    }

    async fn get_text(&self, url: Url, accept: &str) -> anyhow::Result<Option<String>> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, accept)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            tracing::debug!(url = %url, %status, "content not found");
            return Ok(None);
        }
        if !status.is_success() {
            anyhow::bail!("GET {url}: unexpected status {status}");
        }

        let text = read_text_limited(response, MAX_BODY_BYTES)
            .await
            .with_context(|| format!("read body of {url}"))?;
        Ok(Some(text))
    }
}

async fn read_text_limited(mut resp: reqwest::Response, limit: usize) -> anyhow::Result<String> {
    let mut out: Vec<u8> = Vec::new();
    while let Some(chunk) = resp.chunk().await.context("read response chunk")? {
        if out.len() + chunk.len() > limit {
            anyhow::bail!("response body exceeds {limit} bytes");
        }
        out.extend_from_slice(&chunk);
    }
    String::from_utf8(out).context("response body is not valid UTF-8")
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch_markdown(
        &self,
        kind: ContentKind,
        slug: &str,
    ) -> anyhow::Result<Option<String>> {
        let Some(slug) = normalize_slug(slug) else {
            tracing::debug!(slug, "rejecting unsafe slug");
            return Ok(None);
        };
        let url = self.url_for(&kind.relative_path(slug))?;
        self.get_text(url, MARKDOWN_ACCEPT).await
    }

    async fn fetch_manifest(&self) -> anyhow::Result<Option<Manifest>> {
        let url = self.url_for(MANIFEST_PATH)?;
        let Some(raw) = self.get_text(url.clone(), JSON_ACCEPT).await? else {
            return Ok(None);
        };
        let manifest = serde_json::from_str(&raw).with_context(|| format!("parse manifest {url}"))?;
        Ok(Some(manifest))
    }
}

/// Serves the same layout as the HTTP origin from a local directory.
#[derive(Debug, Clone)]
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn read_optional(&self, relative: &str) -> anyhow::Result<Option<String>> {
        let path = self.root.join(relative);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "content not found");
                Ok(None)
            }
            Err(err) => {
                Err(err).with_context(|| format!("read content file: {}", path.display()))
            }
        }
    }
}

#[async_trait]
impl ContentSource for FsContentSource {
    async fn fetch_markdown(
        &self,
        kind: ContentKind,
        slug: &str,
    ) -> anyhow::Result<Option<String>> {
        let Some(slug) = normalize_slug(slug) else {
            tracing::debug!(slug, "rejecting unsafe slug");
            return Ok(None);
        };
        self.read_optional(&kind.relative_path(slug)).await
    }

    async fn fetch_manifest(&self) -> anyhow::Result<Option<Manifest>> {
        let Some(raw) = self.read_optional(MANIFEST_PATH).await? else {
            return Ok(None);
        };
        let manifest = serde_json::from_str(&raw).with_context(|| {
            format!("parse manifest: {}", self.root.join(MANIFEST_PATH).display())
        })?;
        Ok(Some(manifest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_and_rejects_slugs() {
        assert_eq!(normalize_slug("guides/intro"), Some("guides/intro"));
        assert_eq!(normalize_slug("/guides/intro/"), Some("guides/intro"));
        for bad in [
            "",
            "/",
            "../secret",
            "a/../../b",
            "a//b",
            "a\\b",
            "./a",
            "a?x=1",
            "%2e%2e/%2e%2e/admin/secret",
            "a/%2E/b",
            "100%",
        ] {
            assert_eq!(normalize_slug(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn http_urls_follow_content_layout() -> anyhow::Result<()> {
        let source = HttpContentSource::new(
            Url::parse("https://example.com/site/")?,
            Duration::from_secs(1),
            "tests",
        )?;
        assert_eq!(
            source.url_for(&ContentKind::Doc.relative_path("guides/intro"))?.as_str(),
            "https://example.com/site/docs/guides/intro.md"
        );
        assert_eq!(
            source.url_for(&ContentKind::Blog.relative_path("launch"))?.as_str(),
            "https://example.com/site/blogs/launch.md"
        );
        assert_eq!(
            source.url_for(MANIFEST_PATH)?.as_str(),
            "https://example.com/site/docs/manifest.json"
        );
        assert_eq!(
            source.url_for("docs/%2e%2e/%2e%2e/admin.md")?.as_str(),
            "https://example.com/site/docs/%252e%252e/%252e%252e/admin.md"
        );

        let bare = HttpContentSource::new(
            Url::parse("http://127.0.0.1:8080")?,
            Duration::from_secs(1),
            "tests",
        )?;
        assert_eq!(
            bare.url_for(MANIFEST_PATH)?.as_str(),
            "http://127.0.0.1:8080/docs/manifest.json"
        );
        Ok(())
    }

    #[tokio::test]
    async fn fs_source_distinguishes_missing_files() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::create_dir_all(temp.path().join("docs/guides"))?;
        std::fs::write(temp.path().join("docs/guides/intro.md"), "# Intro\n")?;

        let source = FsContentSource::new(temp.path());
        assert_eq!(
            source.fetch_doc("guides/intro").await?.as_deref(),
            Some("# Intro\n")
        );
        assert_eq!(source.fetch_doc("guides/missing").await?, None);
        assert_eq!(source.fetch_blog("guides/intro").await?, None);
        assert_eq!(source.fetch_manifest().await?, None);
        assert_eq!(source.fetch_doc("../docs/guides/intro").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn fs_source_reports_broken_manifest() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::create_dir_all(temp.path().join("docs"))?;
        std::fs::write(temp.path().join("docs/manifest.json"), "{not json")?;

        let source = FsContentSource::new(temp.path());
        assert!(source.fetch_manifest().await.is_err());
        Ok(())
    }
}
