//! Markup serialization
//!
//! Recursive tree-to-markup rendering driven by each type's schema
//! render rule. Text escapes its content and then wraps once per mark,
//! iterating the stored list in reverse so the first (outermost
//! accumulated) mark renders outermost; re-parsing the output
//! regenerates the identical mark order.

use crate::models::node::{AttrValue, Attrs, Mark, Node};
use crate::schema::{MarkRule, MediaKind, RenderRule, Schema};

/// Serialize a node subtree to markup
pub fn render_html(schema: &Schema, node: &Node) -> String {
    match node {
        Node::Text { text, marks } => {
            let mut out = escape_text(text);
            for mark in marks.iter().rev() {
                out = render_mark(schema, mark, out);
            }
            out
        }
        // Opaque captures replay byte-for-byte
        Node::Opaque { markup, .. } => markup.clone(),
        Node::Element {
            name,
            attrs,
            children,
        } => {
            let spec = match schema.node_spec(name) {
                Some(spec) => spec,
                None => {
                    log::warn!("serializing node of unregistered type {:?}", name);
                    return render_children(schema, children);
                }
            };
            match &spec.render {
                RenderRule::Children => render_children(schema, children),
                RenderRule::Wrap(tag) => {
                    format!("<{}>{}</{}>", tag, render_children(schema, children), tag)
                }
                RenderRule::Heading => {
                    let level = attrs
                        .get("level")
                        .and_then(AttrValue::as_int)
                        .unwrap_or(1)
                        .clamp(1, 6);
                    format!(
                        "<h{}>{}</h{}>",
                        level,
                        render_children(schema, children),
                        level
                    )
                }
                RenderRule::CodeBlock => {
                    // The stock code_block forbids marks, so its text
                    // renders as raw content
                    let inner = if spec.marks_allowed {
                        render_children(schema, children)
                    } else {
                        let text: String = children.iter().map(Node::text_content).collect();
                        escape_text(&text)
                    };
                    format!("<pre><code>{}</code></pre>", inner)
                }
                RenderRule::Void(tag) => format!("<{}/>", tag),
                RenderRule::Media(kind) => render_media(*kind, attrs),
                RenderRule::List(tag) => {
                    let mut open = format!("<{}", tag);
                    if let Some(start) = attrs.get("start").and_then(AttrValue::as_int) {
                        push_attr(&mut open, "start", &start.to_string());
                    }
                    open.push('>');
                    format!("{}{}</{}>", open, render_children(schema, children), tag)
                }
                RenderRule::ListItem => {
                    // A sole paragraph child renders tight: <li>A</li>,
                    // not <li><p>A</p></li>
                    let inner = match children.as_slice() {
                        [only] if only.name() == "paragraph" => {
                            render_children(schema, only.children())
                        }
                        _ => render_children(schema, children),
                    };
                    format!("<li>{}</li>", inner)
                }
                // Opaque types never construct as elements
                RenderRule::Opaque => render_children(schema, children),
            }
        }
    }
}

fn render_children(schema: &Schema, children: &[Node]) -> String {
    children
        .iter()
        .map(|child| render_html(schema, child))
        .collect()
}

fn render_mark(schema: &Schema, mark: &Mark, inner: String) -> String {
    let spec = match schema.mark_spec(&mark.name) {
        Some(spec) => spec,
        None => {
            log::warn!("serializing mark of unregistered type {:?}", mark.name);
            return inner;
        }
    };
    match &spec.render {
        MarkRule::Wrap(tag) => format!("<{}>{}</{}>", tag, inner, tag),
        MarkRule::Link => {
            let mut open = String::from("<a");
            if let Some(href) = mark.attrs.get("href").and_then(AttrValue::as_str) {
                push_attr(&mut open, "href", href);
            }
            if let Some(title) = mark.attrs.get("title").and_then(AttrValue::as_str) {
                push_attr(&mut open, "title", title);
            }
            open.push('>');
            format!("{}{}</a>", open, inner)
        }
    }
}

fn render_media(kind: MediaKind, attrs: &Attrs) -> String {
    let tag = match kind {
        MediaKind::Image => "img",
        MediaKind::Video => "video",
        MediaKind::Audio => "audio",
    };
    let mut out = format!("<{}", tag);
    if let Some(src) = attrs.get("src").and_then(AttrValue::as_str) {
        push_attr(&mut out, "src", src);
    }
    match kind {
        MediaKind::Image => {
            if let Some(alt) = attrs.get("alt").and_then(AttrValue::as_str) {
                push_attr(&mut out, "alt", alt);
            }
            if let Some(title) = attrs.get("title").and_then(AttrValue::as_str) {
                push_attr(&mut out, "title", title);
            }
        }
        MediaKind::Video | MediaKind::Audio => {
            if let Some(t) = attrs.get("type").and_then(AttrValue::as_str) {
                push_attr(&mut out, "type", t);
            }
            if attrs.get("controls").and_then(AttrValue::as_bool) == Some(true) {
                push_attr(&mut out, "controls", "controls");
            }
        }
    }
    out.push_str("/>");
    out
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attr(value));
    out.push('"');
}

/// Escape text content for markup output
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value (text escaping plus quotes)
pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
