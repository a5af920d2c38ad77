//! Splitting and parsing the `---` fenced YAML header of Markdown documents.
//!
//! Parsing is lenient: a document without a header, or with a header that is
//! not valid YAML, still yields a body and a default [`Frontmatter`].

use anyhow::Context as _;

use crate::formats::Frontmatter;

const FENCE: &str = "---";

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument<'a> {
    pub frontmatter: Frontmatter,
    pub body: &'a str,
}

/// Splits `contents` into `(header, body)` when it starts with a fenced block.
///
/// Returns `None` when the first line is not a fence or the block is never
/// closed.
pub fn split(contents: &str) -> Option<(&str, &str)> {
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);

    let first_end = contents.find('\n')?;
    if contents[..first_end].trim_end() != FENCE {
        return None;
    }

    let header_start = first_end + 1;
    let mut cursor = header_start;
    while cursor <= contents.len() {
        let line_end = contents[cursor..]
            .find('\n')
            .map_or(contents.len(), |rel| cursor + rel);
        if contents[cursor..line_end].trim_end() == FENCE {
            let header = &contents[header_start..cursor];
            let body_start = (line_end + 1).min(contents.len());
            return Some((header, &contents[body_start..]));
        }
        if line_end == contents.len() {
            break;
        }
        cursor = line_end + 1;
    }

    None
}

pub fn parse(contents: &str) -> ParsedDocument<'_> {
    let Some((header, body)) = split(contents) else {
        return ParsedDocument {
            frontmatter: Frontmatter::default(),
            body: contents.strip_prefix('\u{feff}').unwrap_or(contents),
        };
    };

    let frontmatter = match parse_header(header) {
        Ok(frontmatter) => frontmatter,
        Err(err) => {
            tracing::warn!(err = %format!("{err:#}"), "unparsable frontmatter; using defaults");
            Frontmatter::default()
        }
    };

    ParsedDocument { frontmatter, body }
}

fn parse_header(header: &str) -> anyhow::Result<Frontmatter> {
    if header.trim().is_empty() {
        return Ok(Frontmatter::default());
    }
    serde_yaml::from_str(header).context("deserialize frontmatter yaml")
}

/// Renders `frontmatter` as a fenced block, ready to prepend to a body.
pub fn to_block(frontmatter: &Frontmatter) -> anyhow::Result<String> {
    let yaml = serde_yaml::to_string(frontmatter).context("serialize frontmatter yaml")?;
    let yaml = if yaml.trim() == "{}" { "" } else { &yaml };
    Ok(format!("{FENCE}\n{yaml}{FENCE}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_body() {
        let doc = "---\ntitle: Quick Start\ndescription: First steps\norder: 2\ntags: [cli, basics]\n---\n# Hello\n";
        let parsed = parse(doc);
        assert_eq!(parsed.frontmatter.title.as_deref(), Some("Quick Start"));
        assert_eq!(parsed.frontmatter.description.as_deref(), Some("First steps"));
        assert_eq!(parsed.frontmatter.order, Some(2));
        assert_eq!(
            parsed.frontmatter.extra["tags"],
            serde_json::json!(["cli", "basics"])
        );
        assert_eq!(parsed.body, "# Hello\n");
    }

    #[test]
    fn missing_header_keeps_whole_body() {
        let doc = "# No header\n\ntext\n";
        let parsed = parse(doc);
        assert_eq!(parsed.frontmatter, Frontmatter::default());
        assert_eq!(parsed.body, doc);
    }

    #[test]
    fn unclosed_header_is_treated_as_body() {
        let doc = "---\ntitle: Broken\n# Body\n";
        assert!(split(doc).is_none());
        assert_eq!(parse(doc).body, doc);
    }

    #[test]
    fn invalid_yaml_falls_back_to_defaults() {
        let doc = "---\ntitle: [unterminated\n---\nbody\n";
        let parsed = parse(doc);
        assert_eq!(parsed.frontmatter, Frontmatter::default());
        assert_eq!(parsed.body, "body\n");
    }

    #[test]
    fn numeric_scalars_do_not_discard_the_header() {
        let doc = "---\ntitle: 2024\ndescription: 1.0\norder: 3\ntags: [1, beta]\n---\nbody\n";
        let parsed = parse(doc);
        assert_eq!(parsed.frontmatter.title.as_deref(), Some("2024"));
        assert_eq!(parsed.frontmatter.description.as_deref(), Some("1.0"));
        assert_eq!(parsed.frontmatter.order, Some(3));
        assert_eq!(
            parsed.frontmatter.extra["tags"],
            serde_json::json!(["1", "beta"])
        );
        assert_eq!(parsed.body, "body\n");
    }

    #[test]
    fn accepts_crlf_and_bom() {
        let doc = "\u{feff}---\r\ntitle: Windows\r\n---\r\nbody\r\n";
        let parsed = parse(doc);
        assert_eq!(parsed.frontmatter.title.as_deref(), Some("Windows"));
        assert_eq!(parsed.body, "body\r\n");
    }

    #[test]
    fn closing_fence_at_end_of_input() {
        let (header, body) = split("---\norder: 1\n---").unwrap_or_default();
        assert_eq!(header, "order: 1\n");
        assert_eq!(body, "");
    }

    #[test]
    fn empty_header_is_default() {
        let parsed = parse("---\n---\nbody");
        assert_eq!(parsed.frontmatter, Frontmatter::default());
        assert_eq!(parsed.body, "body");
    }

    #[test]
    fn block_round_trips_core_fields() -> anyhow::Result<()> {
        let front = Frontmatter {
            title: Some("Deploy: the basics".to_owned()),
            description: Some("How to ship".to_owned()),
            order: Some(-3),
            ..Frontmatter::default()
        };
        let doc = format!("{}body\n", to_block(&front)?);
        let parsed = parse(&doc);
        assert_eq!(parsed.frontmatter, front);
        assert_eq!(parsed.body, "body\n");
        Ok(())
    }

    #[test]
    fn block_of_default_is_an_empty_fence() -> anyhow::Result<()> {
        assert_eq!(to_block(&Frontmatter::default())?, "---\n---\n");
        Ok(())
    }
}
