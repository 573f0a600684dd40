//! Plain-text extraction for HTML-encoded catalog strings

use scraper::{ElementRef, Html, Node};

/// Glyph the catalog API leaves behind for characters it failed to encode
const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

/// Elements whose content starts and ends on its own line
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table",
    "blockquote", "pre", "section", "article", "header", "footer",
];

/// Convert an HTML-encoded string into display text
///
/// Removes every U+FFFD glyph, parses the remainder as an HTML fragment and
/// returns its text content, so markup is dropped and entities are resolved.
/// Block elements and `<br>` become line breaks; blank lines are dropped.
/// Markup without any text yields an empty string.
pub fn decode_html_text(raw: &str) -> String {
    let cleaned = raw.replace(REPLACEMENT_CHARACTER, "");
    let fragment = Html::parse_fragment(&cleaned);

    let mut text = String::new();
    collect_text(fragment.root_element(), &mut text);

    if !text.contains('\n') {
        return text;
    }

    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            Node::Element(el) => {
                let block = BLOCK_ELEMENTS.contains(&el.name());
                if block {
                    out.push('\n');
                }
                if let Some(nested) = ElementRef::wrap(child) {
                    collect_text(nested, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}
