//! Package document parsing (container.xml, OPF manifest).

use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};

use crate::encoding::decode_document;
use crate::error::{Error, Result};

/// Parsed OPF package data.
#[derive(Debug, Default)]
pub struct OpfData {
    pub title: Option<String>,
    /// Manifest entries in document order.
    pub manifest: Vec<ManifestEntry>,
    /// Id referenced by `<spine toc="...">` (EPUB 2 NCX).
    pub toc_id: Option<String>,
    /// Cover item id, EPUB 3 `cover-image` property taking priority over
    /// the EPUB 2 `<meta name="cover">`.
    pub cover_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub properties: Option<String>,
}

impl ManifestEntry {
    pub fn has_property(&self, name: &str) -> bool {
        self.properties
            .as_deref()
            .is_some_and(|props| props.split_ascii_whitespace().any(|p| p == name))
    }
}

/// Parse META-INF/container.xml to find the OPF path.
pub fn parse_container_xml(bytes: &[u8]) -> Result<String> {
    let content = decode_document(bytes).map_err(|e| Error::Format(format!("container.xml: {e}")))?;

    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if local_name(e.name().as_ref()) == b"rootfile" => {
                if let Some(path) = attribute(&e, b"full-path")? {
                    return Ok(path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Err(Error::Format("No rootfile found in container.xml".into()))
}

/// Parse the OPF package document.
pub fn parse_opf(content: &str) -> Result<OpfData> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut opf = OpfData::default();
    let mut epub2_cover_id: Option<String> = None;

    let mut in_metadata = false;
    let mut in_title = false;
    let mut buf_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"metadata" => in_metadata = true,
                b"title" if in_metadata && opf.title.is_none() => {
                    in_title = true;
                    buf_text.clear();
                }
                _ => read_package_element(&e, &mut opf, &mut epub2_cover_id)?,
            },
            Ok(Event::Empty(e)) => read_package_element(&e, &mut opf, &mut epub2_cover_id)?,
            Ok(Event::Text(e)) => {
                if in_title {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_title && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref())) {
                    buf_text.push_str(&resolved);
                }
            }
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"metadata" => in_metadata = false,
                b"title" if in_title => {
                    opf.title = Some(buf_text.trim().to_string());
                    in_title = false;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    opf.cover_id = opf
        .manifest
        .iter()
        .find(|item| item.has_property("cover-image"))
        .map(|item| item.id.clone())
        .or(epub2_cover_id);

    Ok(opf)
}

/// Manifest items, cover meta and the spine may be written either
/// self-closing or with an explicit end tag.
fn read_package_element(
    e: &BytesStart<'_>,
    opf: &mut OpfData,
    epub2_cover_id: &mut Option<String>,
) -> Result<()> {
    match local_name(e.name().as_ref()) {
        b"item" => {
            let id = attribute(e, b"id")?.unwrap_or_default();
            if !id.is_empty() {
                opf.manifest.push(ManifestEntry {
                    id,
                    href: attribute(e, b"href")?.unwrap_or_default(),
                    media_type: attribute(e, b"media-type")?.unwrap_or_default(),
                    properties: attribute(e, b"properties")?,
                });
            }
        }
        b"meta" => {
            if attribute(e, b"name")?.as_deref() == Some("cover")
                && let Some(content) = attribute(e, b"content")?
                && !content.is_empty()
            {
                *epub2_cover_id = Some(content);
            }
        }
        b"spine" => opf.toc_id = attribute(e, b"toc")?,
        _ => {}
    }
    Ok(())
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

/// Read an attribute value by (unprefixed) key, with entities resolved.
///
/// A value that does not unescape cleanly (a bare `&`) is returned as written.
pub(crate) fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if local_name(attr.key.as_ref()) == key {
            let raw = String::from_utf8(attr.value.to_vec())?;
            let unescaped = unescape_with(&raw, resolve_named_entity).ok().map(|v| v.into_owned());
            return Ok(Some(unescaped.unwrap_or(raw)));
        }
    }
    Ok(None)
}

/// Extract local name from namespaced XML name (e.g., "dc:title" -> "title").
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// The XML predefined entities plus `nbsp`, which XHTML content often uses.
fn resolve_named_entity(name: &str) -> Option<&'static str> {
    match name {
        "nbsp" => Some("\u{a0}"),
        _ => resolve_predefined_entity(name),
    }
}

/// Resolve XML entity references.
pub(crate) fn resolve_entity(entity: &str) -> Option<String> {
    if let Some(resolved) = resolve_named_entity(entity) {
        return Some(resolved.to_string());
    }

    if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .map(|c| c.to_string())
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(|c| c.to_string())
    } else {
        None
    }
}
