use std::sync::LazyLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Prefix of every class syntect emits, so stylesheets can target them.
pub const CLASS_PREFIX: &str = "hl-";

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Renders a fenced code block as `<pre><code>` HTML.
///
/// `info` is the raw fence info string (`rust`, `js {1,3}`, `toml,ignore`).
/// Unknown languages and highlighter failures fall back to escaped plain code.
pub fn code_block_html(code: &str, info: Option<&str>) -> String {
    let lang = info.and_then(fence_language);

    let inner = lang
        .and_then(|lang| match highlight(code, lang) {
            Ok(html) => html,
            Err(err) => {
                tracing::debug!(lang, %err, "syntax highlighting failed; rendering plain code");
                None
            }
        })
        .unwrap_or_else(|| escape_html(code));

    match lang {
        Some(lang) => format!(
            "<pre class=\"code-block\"><code class=\"language-{}\">{inner}</code></pre>\n",
            escape_html(lang)
        ),
        None => format!("<pre class=\"code-block\"><code>{inner}</code></pre>\n"),
    }
}

/// First token of a fence info string.
fn fence_language(info: &str) -> Option<&str> {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .map(str::trim)
        .find(|token| !token.is_empty())
}

/// `Ok(None)` when no grammar is known for `lang`.
fn highlight(code: &str, lang: &str) -> Result<Option<String>, syntect::Error> {
    let Some(syntax) = SYNTAXES
        .find_syntax_by_token(lang)
        .or_else(|| SYNTAXES.find_syntax_by_token(&lang.to_ascii_lowercase()))
    else {
        return Ok(None);
    };

    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        &SYNTAXES,
        ClassStyle::SpacedPrefixed {
            prefix: CLASS_PREFIX,
        },
    );
    for line in LinesWithEndings::from(code) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    Ok(Some(generator.finalize()))
}

/// Escapes text for both element bodies and quoted attribute values.
pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    // Writing into a String cannot fail.
    let _ = pulldown_cmark_escape::escape_html(&mut out, input);
    out
}
