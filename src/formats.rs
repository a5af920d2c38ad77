use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Metadata header of a Markdown document.
///
/// The recognised keys are typed; everything else lands in `extra` so no key
/// from the source document is lost. Scalars inside a sequence value are
/// read as strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFrontmatter")]
pub struct Frontmatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Wire shape of [`Frontmatter`]. A mistyped known key degrades to absent
/// instead of failing the whole header.
#[derive(Deserialize)]
struct RawFrontmatter {
    #[serde(default, deserialize_with = "lenient_text")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient_order")]
    order: Option<i64>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl From<RawFrontmatter> for Frontmatter {
    fn from(raw: RawFrontmatter) -> Self {
        let extra = raw
            .extra
            .into_iter()
            .map(|(key, value)| (key, sequence_of_strings(value)))
            .collect();
        Self {
            title: raw.title,
            description: raw.description,
            order: raw.order,
            extra,
        }
    }
}

impl Frontmatter {
    pub fn order_or_default(&self) -> i64 {
        self.order.unwrap_or(0)
    }

    /// Fills in the defaults a rendered document carries: the slug as title,
    /// an empty description and order 0.
    pub fn resolve(&self, slug: &str) -> ResolvedFrontmatter {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(slug)
            .to_owned();
        ResolvedFrontmatter {
            title,
            description: self.description.clone().unwrap_or_default(),
            order: self.order_or_default(),
            extra: self.extra.clone(),
        }
    }
}

/// Accepts integers, floats (truncated) and numeric strings; anything else
/// is treated as "no order" instead of failing the whole header.
fn lenient_order<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }))
}

/// Any scalar is kept as its text form; maps, sequences and null are absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(scalar_text))
}

fn scalar_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `[1, true, a]` becomes `["1", "true", "a"]`. Nested maps and sequences
/// are left alone.
fn sequence_of_strings(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Array(items) => serde_json::Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::Number(n) => serde_json::Value::String(n.to_string()),
                    serde_json::Value::Bool(b) => serde_json::Value::String(b.to_string()),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFrontmatter {
    pub title: String,
    pub description: String,
    pub order: i64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A rendered document. `content` is sanitized HTML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub slug: String,
    pub frontmatter: ResolvedFrontmatter,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub slug: String,
    #[serde(default)]
    pub frontmatter: Frontmatter,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub docs: Vec<ManifestEntry>,
}

/// Route parameters for one statically generated doc page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticDocPath {
    pub segments: Vec<String>,
    pub document: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TocNode {
    Section {
        title: String,
        items: TocTree,
    },
    Page {
        title: String,
        description: String,
        slug: String,
        order: i64,
    },
}

impl TocNode {
    pub fn title(&self) -> &str {
        match self {
            Self::Section { title, .. } | Self::Page { title, .. } => title,
        }
    }

    /// Sort key among siblings. Sections carry no order of their own.
    pub fn order(&self) -> i64 {
        match self {
            Self::Section { .. } => 0,
            Self::Page { order, .. } => *order,
        }
    }

    pub fn slug(&self) -> Option<&str> {
        match self {
            Self::Section { .. } => None,
            Self::Page { slug, .. } => Some(slug),
        }
    }

    pub fn items(&self) -> Option<&TocTree> {
        match self {
            Self::Section { items, .. } => Some(items),
            Self::Page { .. } => None,
        }
    }
}

/// Children keyed by path segment, kept in display order.
///
/// Serializes as a map whose key order is the display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TocTree {
    entries: Vec<(String, TocNode)>,
}

impl TocTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, segment: &str) -> Option<&TocNode> {
        self.entries
            .iter()
            .find(|(key, _)| key == segment)
            .map(|(_, node)| node)
    }

    pub fn get_mut(&mut self, segment: &str) -> Option<&mut TocNode> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == segment)
            .map(|(_, node)| node)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TocNode)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub(crate) fn insert(&mut self, segment: String, node: TocNode) {
        self.entries.push((segment, node));
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<(String, TocNode)> {
        &mut self.entries
    }
}

impl Serialize for TocTree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TocTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TocTreeVisitor;

        impl<'de> Visitor<'de> for TocTreeVisitor {
            type Value = TocTree;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of path segments to toc nodes")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut tree = TocTree::new();
                while let Some((key, node)) = access.next_entry::<String, TocNode>()? {
                    tree.insert(key, node);
                }
                Ok(tree)
            }
        }

        deserializer.deserialize_map(TocTreeVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocLink {
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub slug: String,
    pub title: String,
    pub author: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub excerpt: String,
    pub reading_time: u32,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsCategory {
    Release,
    Update,
    Announcement,
    Security,
    Community,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Major,
    Moderate,
    Minor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub date: NaiveDate,
    pub category: NewsCategory,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    pub impact_level: ImpactLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stability {
    Stable,
    InDev,
    Experimental,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocListing {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub stability: Stability,
}
