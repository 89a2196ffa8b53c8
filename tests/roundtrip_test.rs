// Test markup round-tripping across the default schema vocabulary

use std::sync::Arc;

use editor_core::{Attrs, Document, Node, Schema, XmlParser};

fn schema() -> Arc<Schema> {
    Arc::new(Schema::default())
}

fn parse(markup: &str) -> Document {
    Document::from_markup(schema(), &XmlParser::new(), markup)
        .expect("markup should parse")
}

/// Serializing the re-parsed serialization must be a no-op
fn assert_fixed_point(markup: &str) {
    let once = parse(markup).to_html();
    let twice = parse(&once).to_html();
    assert_eq!(once, twice, "second pass diverged for input {:?}", markup);
}

#[test]
fn test_canonical_markup_is_reproduced_exactly() {
    // Canonical forms serialize back byte-for-byte
    for markup in [
        "<p>Hello</p>",
        "<p></p>",
        "<h1>Title</h1>",
        "<h4>Deep</h4>",
        "<blockquote><p>quoted</p></blockquote>",
        "<pre><code>let x = 1;</code></pre>",
        "<hr/>",
        "<ul><li>A</li><li>B</li></ul>",
        r#"<ol start="3"><li>third</li></ol>"#,
        r#"<img src="a.png" alt="pic"/>"#,
        r#"<video src="clip.mp4" type="video/mp4" controls="controls"/>"#,
        r#"<audio src="song.ogg" controls="controls"/>"#,
        "<p><strong>b</strong><em>i</em><u>u</u><s>s</s><code>c</code></p>",
        r#"<p><a href="https://example.com" title="Example">go</a></p>"#,
    ] {
        assert_eq!(parse(markup).to_html(), markup);
        assert_fixed_point(markup);
    }
}

#[test]
fn test_non_canonical_input_reaches_fixed_point() {
    // Degraded or aliased forms settle after one serialization
    for markup in [
        "<div><b>x</b></div>",
        "<p><i>alias</i></p>",
        "<section>stray text</section>",
        "<ul>\n  <li>A</li>\n  <li>B</li>\n</ul>",
        "<li>loose item</li>",
        "<pre>bare pre</pre>",
    ] {
        assert_fixed_point(markup);
    }
}

#[test]
fn test_unrecognized_tag_degrades_to_paragraph() {
    let doc = parse("<div><b>x</b></div>");
    assert_eq!(doc.to_html(), "<p><strong>x</strong></p>");
}

#[test]
fn test_bullet_list_structure_and_exact_reproduction() {
    let markup = "<ul><li>A</li><li>B</li></ul>";
    let doc = parse(markup);

    let list = &doc.root().children()[0];
    assert_eq!(list.name(), "bullet_list");
    assert_eq!(list.children().len(), 2);
    for (item, expected) in list.children().iter().zip(["A", "B"]) {
        assert_eq!(item.name(), "list_item");
        let block = &item.children()[0];
        assert_eq!(block.name(), "paragraph");
        assert_eq!(block.children(), &[Node::text(expected, vec![])]);
    }

    assert_eq!(doc.to_html(), markup);
}

#[test]
fn test_nested_marks_keep_accumulation_order() {
    let markup = "<p><strong><em>x</em></strong></p>";
    let doc = parse(markup);

    let para = &doc.root().children()[0];
    match &para.children()[0] {
        Node::Text { text, marks } => {
            assert_eq!(text, "x");
            let names: Vec<&str> = marks.iter().map(|m| m.name.as_str()).collect();
            assert_eq!(names, ["bold", "italic"]);
        }
        other => panic!("expected text node, got {:?}", other),
    }

    // Wrap order must be the exact inverse of accumulation order
    assert_eq!(doc.to_html(), markup);
}

#[test]
fn test_table_round_trips_byte_for_byte() {
    let markup = r#"<table><thead><tr><th>h</th></tr></thead><tbody><tr><td colspan="2">1 &amp; 2</td></tr></tbody></table>"#;
    let doc = parse(markup);
    match &doc.root().children()[0] {
        Node::Opaque { name, markup: captured } => {
            assert_eq!(name, "table");
            assert_eq!(captured, markup);
        }
        other => panic!("expected opaque node, got {:?}", other),
    }
    assert_eq!(doc.to_html(), markup);
}

#[test]
fn test_escaped_text_round_trips() {
    let markup = "<p>a &amp; b &lt; c</p>";
    let doc = parse(markup);
    assert_eq!(doc.root().children()[0].text_content(), "a & b < c");
    assert_eq!(doc.to_html(), markup);
}

#[test]
fn test_portable_tree_is_lossless() {
    let markup = concat!(
        "<h2>Title</h2>",
        "<p><strong><em>rich</em></strong> and plain</p>",
        "<blockquote><p>quote</p></blockquote>",
        "<ul><li>A</li><li>B</li></ul>",
        "<pre><code>code()</code></pre>",
        "<hr/>",
        r#"<img src="a.png" alt="pic"/>"#,
        "<table><tr><td>1</td></tr></table>",
    );
    let doc = parse(markup);
    let value = doc.to_value();
    let rebuilt = Document::from_value(schema(), &value).expect("value should decode");
    assert_eq!(rebuilt.to_value(), value);
    assert_eq!(rebuilt.to_html(), doc.to_html());
}

#[test]
fn test_size_law_on_parsed_document() {
    let doc = parse("<p>Hello</p><p>hi</p>");
    // doc(2) + p(2+5) + p(2+2)
    assert_eq!(doc.size(), 13);
    let total: usize = doc.root().children().iter().map(Node::size).sum();
    assert_eq!(doc.size(), 2 + total);
}

#[test]
fn test_multibyte_text_sizes_by_character() {
    let doc = parse("<p>héllo</p>");
    assert_eq!(doc.size(), 2 + 2 + 5);
}

#[test]
fn test_schema_constructed_tree_serializes_like_parsed_markup() {
    let s = schema();
    let text = s.text("x", vec![s.mark("bold", Attrs::new()).unwrap()]);
    let para = s.node("paragraph", Attrs::new(), vec![text]).unwrap();
    let doc = Document::from_root(s, para);
    assert_eq!(doc.to_html(), "<p><strong>x</strong></p>");
    assert_fixed_point(&doc.to_html());
}
