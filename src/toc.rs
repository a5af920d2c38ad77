use anyhow::Context as _;

use crate::cli::{TocArgs, TocFormat};
use crate::config::ContentConfig;
use crate::docs::DocsService;
use crate::formats::{ManifestEntry, TocLink, TocNode, TocTree};

/// Builds the navigation tree from the flat manifest.
///
/// Every `/`-separated prefix of a slug becomes a section; the last segment
/// becomes a page. Children are stably sorted by `order`, so rebuilding from
/// the same manifest always yields the same tree.
///
/// A slug that is both a page and a section prefix, a duplicated slug, or a
/// slug with empty segments is rejected.
pub fn build_table_of_contents(docs: &[ManifestEntry]) -> anyhow::Result<TocTree> {
    let mut tree = TocTree::new();

    for entry in docs {
        let segments = split_slug(&entry.slug)?;
        let Some((last, parents)) = segments.split_last() else {
            anyhow::bail!("manifest slug is empty");
        };

        let mut level = &mut tree;
        for (depth, segment) in parents.iter().enumerate() {
            let prefix = segments[..=depth].join("/");
            level = section_items(level, segment, &prefix, &entry.slug)?;
        }

        match level.get(last) {
            Some(TocNode::Page { .. }) => {
                anyhow::bail!("duplicate slug in manifest: {}", entry.slug);
            }
            Some(TocNode::Section { .. }) => {
                anyhow::bail!(
                    "slug {} names both a document and a section of other documents",
                    entry.slug
                );
            }
            None => {}
        }

        let front = &entry.frontmatter;
        level.insert(
            (*last).to_owned(),
            TocNode::Page {
                title: front
                    .title
                    .clone()
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| segment_title(last)),
                description: front.description.clone().unwrap_or_default(),
                slug: entry.slug.clone(),
                order: front.order_or_default(),
            },
        );
    }

    sort_tree(&mut tree);
    Ok(tree)
}

fn split_slug(slug: &str) -> anyhow::Result<Vec<&str>> {
    let segments = slug.split('/').collect::<Vec<_>>();
    if segments.iter().any(|s| s.trim().is_empty()) {
        anyhow::bail!("manifest slug has an empty path segment: {slug:?}");
    }
    Ok(segments)
}

fn section_items<'t>(
    level: &'t mut TocTree,
    segment: &str,
    prefix: &str,
    slug: &str,
) -> anyhow::Result<&'t mut TocTree> {
    if level.get(segment).is_none() {
        level.insert(
            segment.to_owned(),
            TocNode::Section {
                title: segment_title(segment),
                items: TocTree::new(),
            },
        );
    }

    match level.get_mut(segment) {
        Some(TocNode::Section { items, .. }) => Ok(items),
        Some(TocNode::Page { .. }) => anyhow::bail!(
            "slug {prefix} names both a document and a section (needed by {slug})"
        ),
        None => anyhow::bail!("toc section vanished while inserting {slug}"),
    }
}

fn sort_tree(tree: &mut TocTree) {
    let entries = tree.entries_mut();
    entries.sort_by_key(|(_, node)| node.order());
    for (_, node) in entries.iter_mut() {
        if let TocNode::Section { items, .. } = node {
            sort_tree(items);
        }
    }
}

/// `getting-started` → `Getting Started`.
pub fn segment_title(segment: &str) -> String {
    segment
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl TocTree {
    /// Pages in display order, depth first.
    pub fn pages(&self) -> Vec<TocLink> {
        let mut out = Vec::new();
        collect_pages(self, &mut out);
        out
    }

    /// The pages shown before and after `slug` in reading order.
    pub fn neighbours(&self, slug: &str) -> (Option<TocLink>, Option<TocLink>) {
        let pages = self.pages();
        let Some(idx) = pages.iter().position(|p| p.slug == slug) else {
            return (None, None);
        };
        let previous = idx.checked_sub(1).and_then(|i| pages.get(i)).cloned();
        let next = pages.get(idx + 1).cloned();
        (previous, next)
    }
}

fn collect_pages(tree: &TocTree, out: &mut Vec<TocLink>) {
    for (_, node) in tree.iter() {
        match node {
            TocNode::Page { slug, title, .. } => out.push(TocLink {
                slug: slug.clone(),
                title: title.clone(),
            }),
            TocNode::Section { items, .. } => collect_pages(items, out),
        }
    }
}

pub async fn run(config: &ContentConfig, args: TocArgs) -> anyhow::Result<()> {
    let service = DocsService::new(config.build_source().context("build content source")?);
    let toc = service
        .table_of_contents()
        .await
        .context("build table of contents")?;

    let rendered = match args.format {
        TocFormat::Json => serde_json::to_string_pretty(&toc).context("serialize toc json")?,
        TocFormat::Yaml => serde_yaml::to_string(&toc).context("serialize toc yaml")?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
