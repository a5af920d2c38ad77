use std::sync::Arc;

use anyhow::Context as _;
use serde::Serialize;

use crate::cli::DocArgs;
use crate::config::ContentConfig;
use crate::fetch::{ContentKind, ContentSource, normalize_slug};
use crate::formats::{Document, ManifestEntry, StaticDocPath, TocLink, TocTree};
use crate::render::MarkdownRenderer;
use crate::toc::build_table_of_contents;

const PAGE_ERROR_MESSAGE: &str = "This page could not be loaded. Please try again later.";

/// What a documentation page resolves to. Every failure ends up in one of
/// these states; error details never leave the process log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DocPage {
    Ready {
        doc: Document,
        toc: TocTree,
        previous: Option<TocLink>,
        next: Option<TocLink>,
    },
    NotFound {
        slug: String,
    },
    Error {
        message: String,
    },
}

/// Fetch → frontmatter → render, recomputed on every call.
#[derive(Clone)]
pub struct DocsService {
    source: Arc<dyn ContentSource>,
    renderer: MarkdownRenderer,
}

impl std::fmt::Debug for DocsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocsService").finish_non_exhaustive()
    }
}

impl DocsService {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            renderer: MarkdownRenderer::new(),
        }
    }

    pub async fn get_doc_by_slug(&self, slug: &str) -> anyhow::Result<Option<Document>> {
        self.load_document(ContentKind::Doc, slug).await
    }

    pub async fn get_blog_post_by_slug(&self, slug: &str) -> anyhow::Result<Option<Document>> {
        self.load_document(ContentKind::Blog, slug).await
    }

    async fn load_document(
        &self,
        kind: ContentKind,
        slug: &str,
    ) -> anyhow::Result<Option<Document>> {
        let Some(slug) = normalize_slug(slug) else {
            tracing::debug!(slug, "invalid slug treated as not found");
            return Ok(None);
        };

        let Some(raw) = self
            .source
            .fetch_markdown(kind, slug)
            .await
            .with_context(|| format!("fetch {} {slug}", kind.dir()))?
        else {
            return Ok(None);
        };

        let parsed = crate::frontmatter::parse(&raw);
        let content = self.renderer.render(parsed.body);
        if content.trim().is_empty() {
            tracing::debug!(slug, "document has no content");
            return Ok(None);
        }

        Ok(Some(Document {
            slug: slug.to_owned(),
            frontmatter: parsed.frontmatter.resolve(slug),
            content,
        }))
    }

    pub async fn get_all_docs(&self) -> anyhow::Result<Vec<ManifestEntry>> {
        let manifest = self
            .source
            .fetch_manifest()
            .await
            .context("fetch docs/manifest.json")?
            .ok_or_else(|| anyhow::anyhow!("docs/manifest.json not found"))?;
        Ok(manifest.docs)
    }

    pub async fn table_of_contents(&self) -> anyhow::Result<TocTree> {
        let docs = self.get_all_docs().await?;
        build_table_of_contents(&docs)
    }

    /// One path per manifest document, split into its URL segments.
    pub async fn static_doc_paths(&self) -> anyhow::Result<Vec<StaticDocPath>> {
        let docs = self.get_all_docs().await?;
        docs.iter()
            .map(|entry| -> anyhow::Result<StaticDocPath> {
                let slug = normalize_slug(&entry.slug)
                    .ok_or_else(|| anyhow::anyhow!("invalid doc slug in manifest: {:?}", entry.slug))?;
                Ok(StaticDocPath {
                    segments: slug.split('/').map(str::to_owned).collect(),
                    document: slug.to_owned(),
                })
            })
            .collect()
    }

    pub async fn load_page(&self, slug: &str) -> DocPage {
        let doc = match self.get_doc_by_slug(slug).await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                tracing::info!(slug, "doc not found");
                return DocPage::NotFound {
                    slug: slug.trim_matches('/').to_owned(),
                };
            }
            Err(err) => {
                tracing::error!(slug, ?err, "load doc");
                return page_error();
            }
        };

        let toc = match self.table_of_contents().await {
            Ok(toc) => toc,
            Err(err) => {
                tracing::error!(slug, ?err, "build table of contents");
                return page_error();
            }
        };

        let (previous, next) = toc.neighbours(&doc.slug);
        DocPage::Ready {
            doc,
            toc,
            previous,
            next,
        }
    }
}

fn page_error() -> DocPage {
    DocPage::Error {
        message: PAGE_ERROR_MESSAGE.to_owned(),
    }
}

pub async fn run_doc(config: &ContentConfig, args: DocArgs) -> anyhow::Result<()> {
    let service = DocsService::new(config.build_source().context("build content source")?);
    let Some(doc) = service.get_doc_by_slug(&args.slug).await? else {
        anyhow::bail!("not found: {}", args.slug);
    };

    if args.json {
        let json = serde_json::to_string_pretty(&doc).context("serialize document")?;
        println!("{json}");
    } else {
        print!("{}", doc.content);
    }
    Ok(())
}
