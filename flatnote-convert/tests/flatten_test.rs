//! End-to-end conversion tests over an in-memory store.

#![allow(clippy::unwrap_used)]

use flatnote_convert::{CancelToken, Error, Flattener, Options};
use flatnote_store::{Block, BlockKind, ListStyle, SnapshotStore};
use pretty_assertions::assert_eq;

fn block(id: &str, kind: BlockKind, parent: &str) -> Block {
    Block {
        id: id.to_string(),
        kind,
        parent_id: parent.to_string(),
        document_id: "d1".to_string(),
        updated: "1".to_string(),
        tag_source: format!("{{: id=\"{id}\" updated=\"1\"}}"),
        ..Block::default()
    }
}

/// One header, one body paragraph below it, a trailing document tag: the
/// anchors land inline, every tag disappears.
#[test]
#[tracing_test::traced_test]
fn header_and_paragraph_document() {
    let mut doc = block("d1", BlockKind::Document, "");
    doc.tag_source = "{: id=\"d1\" updated=\"100\"}".to_string();
    doc.title = "T".to_string();
    doc.path = "/T".to_string();
    let mut header = block("h1", BlockKind::Header, "d1");
    header.tag_source = "{: id=\"h1\" updated=\"100\"}".to_string();
    header.markup = "## Intro".to_string();
    let mut body = block("p1", BlockKind::Paragraph, "h1");
    body.tag_source = "{: id=\"p1\" updated=\"100\"}".to_string();
    body.markup = "Body".to_string();

    let store = SnapshotStore::new(
        vec![doc.clone(), header, body],
        [
            (
                "d1".to_string(),
                concat!(
                    "## Intro\n",
                    "{: id=\"h1\" updated=\"100\"}\n",
                    "Body\n",
                    "{: id=\"p1\" updated=\"100\"}\n",
                    "{: id=\"d1\" updated=\"100\"}",
                )
                .to_string(),
            ),
            (
                "h1".to_string(),
                "## Intro\n{: id=\"h1\" updated=\"100\"}".to_string(),
            ),
            (
                "p1".to_string(),
                "Body\n{: id=\"p1\" updated=\"100\"}".to_string(),
            ),
        ],
    );

    let flattener = Flattener::new(&store, Options::default());
    let output = flattener.flatten_document(&doc).unwrap();
    assert_eq!(
        output,
        concat!(
            "## Intro<span id=\"h1-100\" data-attr=\"\"></span>\n",
            "<span id=\"p1-100\" data-attr=\"\"></span>Body",
        )
    );
}

/// A nested list: the container anchors above the list, rows anchor inline,
/// the sub-list anchors on its own indented line, row markers become
/// just-replace anchors, and an empty trailing paragraph gets a placeholder
/// line.
#[test]
#[tracing_test::traced_test]
fn nested_list_document() {
    let seed = concat!(
        "* {: id=\"iA\" updated=\"1\"}AA\n",
        "  {: id=\"pA\" updated=\"1\"}\n",
        "\n",
        "  * {: id=\"iA1\" updated=\"1\"}AA-1\n",
        "    {: id=\"pA1\" updated=\"1\"}\n",
        "  {: id=\"subL\" updated=\"1\"}\n",
        "{: id=\"L\" updated=\"1\"}\n",
        "\n",
        "{: id=\"pEnd\" updated=\"1\"}\n",
        "\n",
        "{: id=\"d1\" updated=\"1\"}",
    );

    let doc = block("d1", BlockKind::Document, "");
    let mut list = block("L", BlockKind::List, "d1");
    list.subtype = Some(ListStyle::Unordered);
    list.markup = "* AA\n  * AA-1".to_string();
    let item_a = block("iA", BlockKind::ListItem, "L");
    let mut row_a = block("pA", BlockKind::Paragraph, "iA");
    row_a.markup = "AA".to_string();
    let mut sub_list = block("subL", BlockKind::List, "iA");
    sub_list.subtype = Some(ListStyle::Unordered);
    sub_list.markup = "* AA-1".to_string();
    let item_a1 = block("iA1", BlockKind::ListItem, "subL");
    let mut row_a1 = block("pA1", BlockKind::Paragraph, "iA1");
    row_a1.markup = "AA-1".to_string();
    let tail = block("pEnd", BlockKind::Paragraph, "d1");

    let store = SnapshotStore::new(
        vec![
            doc.clone(),
            list,
            item_a,
            row_a,
            sub_list,
            item_a1,
            row_a1,
            tail,
        ],
        [
            ("d1".to_string(), seed.to_string()),
            (
                "L".to_string(),
                concat!(
                    "* {: id=\"iA\" updated=\"1\"}AA\n",
                    "  {: id=\"pA\" updated=\"1\"}\n",
                    "\n",
                    "  * {: id=\"iA1\" updated=\"1\"}AA-1\n",
                    "    {: id=\"pA1\" updated=\"1\"}\n",
                    "  {: id=\"subL\" updated=\"1\"}\n",
                    "{: id=\"L\" updated=\"1\"}",
                )
                .to_string(),
            ),
            (
                "pA".to_string(),
                "AA\n{: id=\"pA\" updated=\"1\"}".to_string(),
            ),
            (
                "subL".to_string(),
                concat!(
                    "* {: id=\"iA1\" updated=\"1\"}AA-1\n",
                    "  {: id=\"pA1\" updated=\"1\"}\n",
                    "{: id=\"subL\" updated=\"1\"}",
                )
                .to_string(),
            ),
            (
                "pA1".to_string(),
                "AA-1\n{: id=\"pA1\" updated=\"1\"}".to_string(),
            ),
            ("pEnd".to_string(), "{: id=\"pEnd\" updated=\"1\"}".to_string()),
        ],
    );

    let flattener = Flattener::new(&store, Options::default());
    let output = flattener.flatten_document(&doc).unwrap();
    assert_eq!(
        output,
        concat!(
            "<span id=\"L-1\" data-attr=\"list\"></span>\n",
            "\n",
            "* <span id=\"iA-1\" data-attr=\"just-replace\"></span>",
            "<span id=\"pA-1\" data-attr=\"list-content\"></span>AA\n",
            "  <span id=\"subL-1\" data-attr=\"list\"></span>\n",
            "  * <span id=\"iA1-1\" data-attr=\"just-replace\"></span>",
            "<span id=\"pA1-1\" data-attr=\"list-content\"></span>AA-1\n",
            "\n",
            "<span id=\"pEnd-1\" data-attr=\"\"></span>&nbsp;\n",
        )
    );
}

/// Cross-document links and references rewrite into relative Markdown
/// links; the image size tag collapses to the corrected percentage.
#[test]
fn links_references_and_image_widths() {
    let mut doc = block("dA", BlockKind::Document, "");
    doc.document_id = "dA".to_string();
    doc.path = "/Site/A".to_string();
    doc.title = "A".to_string();
    let mut target_doc = block("dB", BlockKind::Document, "");
    target_doc.document_id = "dB".to_string();
    target_doc.path = "/Site/B".to_string();
    target_doc.title = "B".to_string();
    let mut target_para = block("pB", BlockKind::Paragraph, "dB");
    target_para.document_id = "dB".to_string();
    target_para.path = "/Site/B".to_string();
    target_para.updated = "9".to_string();
    let mut para = block("pA", BlockKind::Paragraph, "dA");
    para.document_id = "dA".to_string();
    para.markup =
        "go [there](note://blocks/dB) or ((pB 'that line')) ![i](assets/i.png)".to_string();

    let seed = concat!(
        "go [there](note://blocks/dB) or ((pB 'that line')) ",
        "![i](assets/i.png){: style=\"width: 10000px;\" parent-style=\"width: 21%;\"}\n",
        "{: id=\"pA\" updated=\"1\"}\n",
        "{: id=\"dA\" updated=\"1\"}",
    );
    let store = SnapshotStore::new(
        vec![doc.clone(), target_doc, target_para, para],
        [
            ("dA".to_string(), seed.to_string()),
            (
                "pA".to_string(),
                concat!(
                    "go [there](note://blocks/dB) or ((pB 'that line')) ",
                    "![i](assets/i.png){: style=\"width: 10000px;\" parent-style=\"width: 21%;\"}\n",
                    "{: id=\"pA\" updated=\"1\"}",
                )
                .to_string(),
            ),
        ],
    );

    let options = Options::builder()
        .image_width_adjust(20.0)
        .root_document("Site")
        .build();
    let flattener = Flattener::new(&store, options);
    let output = flattener.flatten_document(&doc).unwrap();
    assert_eq!(
        output,
        concat!(
            "<span id=\"pA-1\" data-attr=\"\"></span>",
            "go [there](B.md) or [that line](B.md#pB-9) ",
            "![i](assets/i.png){: style=\"width: 41%;\"}",
        )
    );
}

#[test]
fn cancelled_conversion_unwinds_immediately() {
    let doc = block("d1", BlockKind::Document, "");
    let store = SnapshotStore::new(vec![doc.clone()], []);
    let cancel = CancelToken::new();
    cancel.cancel();
    let flattener = Flattener::new(&store, Options::default()).with_cancel_token(cancel);
    assert!(matches!(
        flattener.flatten_document(&doc),
        Err(Error::Interrupted)
    ));
}

#[test]
fn non_document_blocks_produce_no_output() {
    let para = block("p1", BlockKind::Paragraph, "d1");
    let store = SnapshotStore::new(vec![para.clone()], []);
    let flattener = Flattener::new(&store, Options::default());
    assert_eq!(flattener.flatten_document(&para).unwrap(), "");
}

/// A block the store lost between enumeration and processing is skipped;
/// the rest of the document still converts.
#[test]
fn missing_markup_skips_the_block_only() {
    let doc = block("d1", BlockKind::Document, "");
    let mut body = block("p1", BlockKind::Paragraph, "d1");
    body.markup = "Body".to_string();
    let seed = "Body\n{: id=\"p1\" updated=\"1\"}\n{: id=\"d1\" updated=\"1\"}";
    // No markup entry for p1: its insertion point cannot resolve.
    let store = SnapshotStore::new(
        vec![doc.clone(), body],
        [("d1".to_string(), seed.to_string())],
    );
    let flattener = Flattener::new(&store, Options::default());
    let output = flattener.flatten_document(&doc).unwrap();
    // The anchor is missing but the tag is still swept up by the leftover
    // pass, so the text itself survives.
    assert_eq!(
        output,
        "Body\n<span id=\"p1-1\" data-attr=\"just-replace\"></span>"
    );
}
