//! Final allow-list pass over rendered HTML.

/// MathML elements produced by the math stage.
const MATHML_TAGS: &[&str] = &[
    "math",
    "semantics",
    "annotation",
    "mrow",
    "mi",
    "mn",
    "mo",
    "ms",
    "mtext",
    "mspace",
    "msup",
    "msub",
    "msubsup",
    "mfrac",
    "msqrt",
    "mroot",
    "mover",
    "munder",
    "munderover",
    "mtable",
    "mtr",
    "mtd",
    "mstyle",
    "mpadded",
    "mphantom",
    "menclose",
];

const MATHML_ATTRIBUTES: &[&str] = &[
    "mathvariant",
    "stretchy",
    "fence",
    "separator",
    "accent",
    "accentunder",
    "lspace",
    "rspace",
    "width",
    "displaystyle",
    "scriptlevel",
    "columnalign",
    "notation",
    "linethickness",
];

/// Removes scripts, event handlers, unsafe URL schemes and anything else not
/// on the allow-list.
///
/// The allow-list is ammonia's default plus the ids, classes and elements the
/// earlier render stages emit.
pub fn sanitize_html(html: &str) -> String {
    let mut builder = ammonia::Builder::default();
    builder
        .add_tags(&["input"])
        .add_tags(MATHML_TAGS)
        .add_tag_attributes("input", &["type", "checked", "disabled"])
        .add_tag_attributes("a", &["class", "aria-hidden", "tabindex", "id"])
        .add_tag_attributes("span", &["class"])
        .add_tag_attributes("div", &["class", "id"])
        .add_tag_attributes("sup", &["class", "id"])
        .add_tag_attributes("code", &["class"])
        .add_tag_attributes("pre", &["class"])
        .add_tag_attributes("li", &["id"])
        .add_tag_attributes("math", &["display", "xmlns"])
        .add_tag_attributes("annotation", &["encoding"]);
    for heading in ["h1", "h2", "h3", "h4", "h5", "h6"] {
        builder.add_tag_attributes(heading, &["id"]);
    }
    for tag in MATHML_TAGS {
        builder.add_tag_attributes(tag, MATHML_ATTRIBUTES);
    }
    builder.clean(html).to_string()
}
