//! Blog, news and doc listing records, loaded once and read-only afterwards.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

use crate::formats::{BlogPost, DocListing, NewsItem};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    #[serde(default)]
    blog: Vec<BlogPost>,
    #[serde(default)]
    news: Vec<NewsItem>,
    #[serde(default)]
    docs: Vec<DocListing>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read catalog: {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("load catalog: {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        let mut catalog: Self = if raw.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(raw).context("parse catalog yaml")?
        };

        ensure_unique("blog", catalog.blog.iter().map(|p| p.slug.as_str()))?;
        ensure_unique("news", catalog.news.iter().map(|n| n.slug.as_str()))?;
        ensure_unique("news id", catalog.news.iter().map(|n| n.id.as_str()))?;
        ensure_unique("docs", catalog.docs.iter().map(|d| d.slug.as_str()))?;

        catalog.blog.sort_by(|a, b| b.date.cmp(&a.date));
        catalog.news.sort_by(|a, b| b.date.cmp(&a.date));

        tracing::debug!(
            blog = catalog.blog.len(),
            news = catalog.news.len(),
            docs = catalog.docs.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    /// Newest first.
    pub fn blog_posts(&self) -> &[BlogPost] {
        &self.blog
    }

    pub fn blog_post(&self, slug: &str) -> Option<&BlogPost> {
        self.blog.iter().find(|p| p.slug == slug)
    }

    pub fn featured_blog_posts(&self) -> impl Iterator<Item = &BlogPost> {
        self.blog.iter().filter(|p| p.is_featured)
    }

    /// Newest first.
    pub fn news_items(&self) -> &[NewsItem] {
        &self.news
    }

    pub fn news_item(&self, slug: &str) -> Option<&NewsItem> {
        self.news.iter().find(|n| n.slug == slug)
    }

    pub fn doc_listings(&self) -> &[DocListing] {
        &self.docs
    }

    pub fn doc_listing(&self, slug: &str) -> Option<&DocListing> {
        self.docs.iter().find(|d| d.slug == slug)
    }
}

fn ensure_unique<'a>(
    collection: &str,
    slugs: impl Iterator<Item = &'a str>,
) -> anyhow::Result<()> {
    let mut seen = HashSet::new();
    for slug in slugs {
        if !seen.insert(slug) {
            anyhow::bail!("duplicate {collection} slug in catalog: {slug}");
        }
    }
    Ok(())
}
