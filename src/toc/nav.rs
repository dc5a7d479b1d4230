//! EPUB 3 navigation document (`nav.xhtml`).

use markup5ever_rcdom::Handle;

use crate::encoding::decode_document;
use crate::error::{Error, Result};
use crate::html::{element_name, find_elements_by_name, get_attr, parse_html, text_content};

use super::NavigationEntry;

/// Parse a nav document into navigation entries.
///
/// Entries are the `a` elements inside an `li` of an `ol` of a `nav`, in
/// document order. When a `nav` is marked `epub:type="toc"` only that one is
/// read, so landmarks and page lists do not leak into the chapter list.
pub fn parse_nav(bytes: &[u8]) -> Result<Vec<NavigationEntry>> {
    let html = decode_document(bytes).map_err(|e| Error::Format(format!("nav document: {e}")))?;
    let dom = parse_html(&html);

    let navs = find_elements_by_name(&dom.document, "nav");
    if navs.is_empty() {
        return Err(Error::MalformedNavigation(
            "nav document has no <nav> element".into(),
        ));
    }

    let toc_navs: Vec<&Handle> = navs.iter().filter(|nav| is_toc_nav(nav)).collect();
    let scope: Vec<&Handle> = if toc_navs.is_empty() {
        navs.iter().collect()
    } else {
        toc_navs
    };

    let mut links = Vec::new();
    for nav in scope {
        collect_list_links(nav, false, false, &mut links);
    }

    links
        .iter()
        .map(|link| {
            let href = get_attr(link, "href").ok_or_else(|| {
                Error::MalformedNavigation(format!(
                    "nav link '{}' has no href",
                    text_content(link).trim()
                ))
            })?;
            Ok(NavigationEntry::new(text_content(link), href))
        })
        .collect()
}

fn is_toc_nav(nav: &Handle) -> bool {
    get_attr(nav, "epub:type")
        .is_some_and(|types| types.split_ascii_whitespace().any(|t| t == "toc"))
}

/// Collect `ol li a` descendants in document order.
fn collect_list_links(handle: &Handle, in_ol: bool, in_li: bool, links: &mut Vec<Handle>) {
    for child in handle.children.borrow().iter() {
        let Some(name) = element_name(child) else {
            continue;
        };
        let (mut child_in_ol, mut child_in_li) = (in_ol, in_li);
        match name.as_str() {
            "ol" => child_in_ol = true,
            "li" if in_ol => child_in_li = true,
            "a" if in_li => links.push(child.clone()),
            _ => {}
        }
        collect_list_links(child, child_in_ol, child_in_li, links);
    }
}
