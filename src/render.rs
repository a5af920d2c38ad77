use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Context as _;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

use crate::cli::RenderArgs;
use crate::formats::ResolvedFrontmatter;
use crate::highlight::{code_block_html, escape_html};
use crate::sanitize::sanitize_html;

/// Markdown body → sanitized HTML.
///
/// Stages run in a fixed order: parse (GFM + math), heading ids, heading
/// anchors, code highlighting, math, sanitize. Sanitizing is always last.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn parser_options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_MATH);
        options
    }

    pub fn render(&self, markdown: &str) -> String {
        let events: Vec<Event<'_>> = Parser::new_ext(markdown, Self::parser_options()).collect();

        let events = assign_heading_ids(events);
        let events = append_heading_anchors(events);
        let events = highlight_code_blocks(events);
        let events = render_math(events);

        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html, events.into_iter());
        sanitize_html(&html)
    }
}

/// Gives every heading a unique, slugified `id`.
fn assign_heading_ids(mut events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut used = HashSet::new();
    let mut idx = 0;
    while idx < events.len() {
        if !matches!(events[idx], Event::Start(Tag::Heading { .. })) {
            idx += 1;
            continue;
        }

        let mut text = String::new();
        let mut end = idx + 1;
        while end < events.len() {
            match &events[end] {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) | Event::InlineMath(t) => text.push_str(t),
                _ => {}
            }
            end += 1;
        }

        let id = unique_id(&text, &mut used);
        if let Event::Start(Tag::Heading { id: slot, .. }) = &mut events[idx] {
            *slot = Some(CowStr::from(id));
        }
        idx = end;
    }
    events
}

fn unique_id(text: &str, used: &mut HashSet<String>) -> String {
    let mut base = slug::slugify(text);
    if base.is_empty() {
        base = "section".to_owned();
    }

    let mut candidate = base.clone();
    let mut suffix = 0_usize;
    while used.contains(&candidate) {
        suffix += 1;
        candidate = format!("{base}-{suffix}");
    }
    used.insert(candidate.clone());
    candidate
}

/// Appends a self-link to the end of every heading that has an id.
fn append_heading_anchors(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut current_id: Option<String> = None;
    for event in events {
        match &event {
            Event::Start(Tag::Heading { id, .. }) => {
                current_id = id.as_ref().map(|id| id.to_string());
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(id) = current_id.take() {
                    out.push(Event::InlineHtml(CowStr::from(anchor_html(&id))));
                }
            }
            _ => {}
        }
        out.push(event);
    }
    out
}

fn anchor_html(id: &str) -> String {
    format!(
        "<a class=\"anchor-link\" href=\"#{id}\" aria-hidden=\"true\" tabindex=\"-1\"><span class=\"anchor-icon\">#</span></a>",
        id = escape_html(id)
    )
}

/// Collapses each code block into one pre-rendered HTML event.
fn highlight_code_blocks(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut block: Option<(Option<String>, String)> = None;
    for event in events {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) if !info.trim().is_empty() => {
                        Some(info.to_string())
                    }
                    _ => None,
                };
                block = Some((info, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((info, code)) = block.take() {
                    out.push(Event::Html(CowStr::from(code_block_html(
                        &code,
                        info.as_deref(),
                    ))));
                }
            }
            Event::Text(text) if block.is_some() => {
                if let Some((_, code)) = block.as_mut() {
                    code.push_str(&text);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn render_math(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    events
        .into_iter()
        .map(|event| match event {
            Event::InlineMath(tex) => Event::InlineHtml(CowStr::from(format!(
                "<span class=\"math math-inline\">{}</span>",
                math_html(&tex, latex2mathml::DisplayStyle::Inline)
            ))),
            Event::DisplayMath(tex) => Event::InlineHtml(CowStr::from(format!(
                "<span class=\"math math-display\">{}</span>",
                math_html(&tex, latex2mathml::DisplayStyle::Block)
            ))),
            other => other,
        })
        .collect()
}

fn math_html(tex: &str, style: latex2mathml::DisplayStyle) -> String {
    match latex2mathml::latex_to_mathml(tex, style) {
        Ok(mathml) => mathml,
        Err(err) => {
            tracing::debug!(tex, err = %err, "math conversion failed; keeping source");
            format!("<code class=\"math-error\">{}</code>", escape_html(tex))
        }
    }
}

#[derive(Debug, Serialize)]
struct RenderedFile {
    frontmatter: ResolvedFrontmatter,
    content: String,
}

/// Renders a local Markdown file without touching any content origin.
pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let input = PathBuf::from(&args.input);
    let raw = std::fs::read_to_string(&input)
        .with_context(|| format!("read markdown: {}", input.display()))?;

    let parsed = crate::frontmatter::parse(&raw);
    let content = MarkdownRenderer::new().render(parsed.body);

    if args.json {
        let slug = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let rendered = RenderedFile {
            frontmatter: parsed.frontmatter.resolve(&slug),
            content,
        };
        let json = serde_json::to_string_pretty(&rendered).context("serialize rendered file")?;
        println!("{json}");
    } else {
        print!("{content}");
    }
    Ok(())
}
