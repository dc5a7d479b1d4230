//! HTML/XHTML parsing into a generic DOM tree, and text flattening.
//!
//! Content documents are parsed leniently with html5ever, so malformed
//! markup still yields a tree. Accessors here are typed: callers get an
//! `Option` back and decide how a missing node is reported.

use std::default::Default;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::encoding::decode_document;

/// Elements whose text is never part of the readable content.
const NON_TEXT_ELEMENTS: &[&str] = &["script", "style", "template"];

/// Parse already-decoded HTML content into a DOM tree.
pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .one(html.as_bytes())
}

/// Flatten every text node of `bytes` into newline-separated lines.
///
/// Each text node is trimmed and dropped if empty; the joined result carries
/// no surrounding whitespace.
pub fn extract_text(bytes: &[u8]) -> Result<String, String> {
    let html = decode_document(bytes)?;
    let dom = parse_html(&html);
    let mut lines = Vec::new();
    collect_text_nodes(&dom.document, &mut lines);
    Ok(lines.join("\n").trim().to_string())
}

fn collect_text_nodes(handle: &Handle, lines: &mut Vec<String>) {
    match handle.data {
        NodeData::Text { ref contents } => {
            let text = contents.borrow();
            let text = text.trim();
            if !text.is_empty() {
                lines.push(text.to_string());
            }
        }
        NodeData::Element { ref name, .. } if NON_TEXT_ELEMENTS.contains(&&*name.local) => {}
        _ => {
            for child in handle.children.borrow().iter() {
                collect_text_nodes(child, lines);
            }
        }
    }
}

/// Local name of an element node.
pub fn element_name(handle: &Handle) -> Option<String> {
    match handle.data {
        NodeData::Element { ref name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

/// Attribute value by name. Prefixed names such as `epub:type` match either
/// the literal name or prefix + local name.
pub fn get_attr(handle: &Handle, attr_name: &str) -> Option<String> {
    let NodeData::Element { ref attrs, .. } = handle.data else {
        return None;
    };
    attrs
        .borrow()
        .iter()
        .find(|a| {
            let local: &str = &a.name.local;
            match &a.name.prefix {
                Some(prefix) => format!("{}:{local}", &**prefix) == attr_name,
                None => local == attr_name,
            }
        })
        .map(|a| a.value.to_string())
}

/// Find elements by local name, in document order.
pub fn find_elements_by_name(handle: &Handle, name: &str) -> Vec<Handle> {
    let mut results = Vec::new();
    find_elements_recursive(handle, name, &mut results);
    results
}

fn find_elements_recursive(handle: &Handle, name: &str, results: &mut Vec<Handle>) {
    for child in handle.children.borrow().iter() {
        if let NodeData::Element { name: ref qname, .. } = child.data
            && qname.local.as_ref() == name
        {
            results.push(child.clone());
        }
        find_elements_recursive(child, name, results);
    }
}

/// Concatenated text of all descendant text nodes, unmodified.
pub fn text_content(handle: &Handle) -> String {
    let mut out = String::new();
    append_text(handle, &mut out);
    out
}

fn append_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { ref contents } = handle.data {
        out.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        append_text(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_flattens_markup() {
        let html = br#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Chapter 1</title><style>p { color: red; }</style></head>
<body>
  <h1>Chapter 1</h1>
  <p>It was a <em>dark</em> night.</p>
  <!-- a comment -->
  <script>var x = 1;</script>
  <p>   </p>
</body>
</html>"#;

        let text = extract_text(html).unwrap();
        assert_eq!(text, "Chapter 1\nChapter 1\nIt was a\ndark\nnight.");
    }

    #[test]
    fn test_extract_text_resolves_entities() {
        let text = extract_text(b"<p>Fish &amp; chips &#8212; caf&eacute;</p>").unwrap();
        assert_eq!(text, "Fish & chips \u{2014} caf\u{e9}");
    }

    #[test]
    fn test_extract_text_empty_document() {
        assert_eq!(extract_text(b"").unwrap(), "");
        assert_eq!(extract_text(b"<html><body>  </body></html>").unwrap(), "");
    }

    #[test]
    fn test_extract_text_windows_1252_chapter() {
        let html = b"<?xml version=\"1.0\" encoding=\"windows-1252\"?>\n<html><body><p>Caf\xE9 \x93quoted\x94</p></body></html>";
        assert_eq!(extract_text(html).unwrap(), "Caf\u{e9} \u{201c}quoted\u{201d}");
    }

    #[test]
    fn test_extract_text_utf16_chapter() {
        let mut html = vec![0xFF, 0xFE];
        for unit in "<p>\u{e9}t\u{e9}</p>".encode_utf16() {
            html.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(extract_text(&html).unwrap(), "\u{e9}t\u{e9}");
    }

    #[test]
    fn test_extract_text_rejects_bytes_invalid_for_declared_encoding() {
        let html = b"<?xml version=\"1.0\" encoding=\"utf-8\"?><p>\xC3\x28</p>";
        assert!(extract_text(html).is_err());
        assert!(extract_text(&[0xFF, 0xFE, 0x00, 0xD8]).is_err());
    }

    #[test]
    fn test_find_elements_and_attrs() {
        let dom = parse_html(
            r#"<nav epub:type="toc"><ol><li><a href="a.xhtml">A <b>bold</b></a></li></ol></nav>"#,
        );
        let navs = find_elements_by_name(&dom.document, "nav");
        assert_eq!(navs.len(), 1);
        assert_eq!(get_attr(&navs[0], "epub:type").as_deref(), Some("toc"));

        let links = find_elements_by_name(&navs[0], "a");
        assert_eq!(links.len(), 1);
        assert_eq!(element_name(&links[0]).as_deref(), Some("a"));
        assert_eq!(get_attr(&links[0], "href").as_deref(), Some("a.xhtml"));
        assert_eq!(get_attr(&links[0], "title"), None);
        assert_eq!(text_content(&links[0]), "A bold");
    }
}
