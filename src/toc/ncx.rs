//! EPUB 2 NCX table of contents.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::encoding::decode_document;
use crate::error::{Error, Result};
use crate::package::{attribute, local_name, resolve_entity};

use super::NavigationEntry;

struct NavPointState {
    /// Output position reserved when the navPoint opened.
    slot: usize,
    id: String,
    label: Option<String>,
    src: Option<String>,
}

/// Parse an NCX document into navigation entries.
///
/// Nested navPoints are flattened in document order: a parent precedes its
/// children. Every navPoint must carry a `navLabel` and a `content src`.
pub fn parse_ncx(bytes: &[u8]) -> Result<Vec<NavigationEntry>> {
    let content = decode_document(bytes).map_err(|e| Error::Format(format!("NCX document: {e}")))?;
    let mut reader = Reader::from_str(&content);

    let mut slots: Vec<Option<NavigationEntry>> = Vec::new();
    let mut stack: Vec<NavPointState> = Vec::new();
    let mut label_depth = 0usize;
    // Only the first navLabel of a navPoint is its title.
    let mut collecting = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"navPoint" => {
                    stack.push(NavPointState {
                        slot: slots.len(),
                        id: attribute(&e, b"id")?.unwrap_or_default(),
                        label: None,
                        src: None,
                    });
                    slots.push(None);
                }
                b"navLabel" => {
                    label_depth += 1;
                    if let Some(state) = stack.last_mut()
                        && state.label.is_none()
                    {
                        state.label = Some(String::new());
                        collecting = true;
                    }
                }
                b"content" => set_src(&mut stack, &e)?,
                _ => {}
            },
            Ok(Event::Empty(e)) => match local_name(e.name().as_ref()) {
                b"content" => set_src(&mut stack, &e)?,
                b"navLabel" => {
                    if let Some(state) = stack.last_mut()
                        && state.label.is_none()
                    {
                        state.label = Some(String::new());
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if collecting {
                    push_label(&mut stack, &String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::CData(e)) => {
                if collecting {
                    push_label(&mut stack, &String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if collecting
                    && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref()))
                {
                    push_label(&mut stack, &resolved);
                }
            }
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"navLabel" => {
                    label_depth = label_depth.saturating_sub(1);
                    if label_depth == 0 {
                        collecting = false;
                    }
                }
                b"navPoint" => {
                    let Some(state) = stack.pop() else {
                        continue;
                    };
                    let title = state.label.ok_or_else(|| {
                        Error::MalformedNavigation(format!("navPoint '{}' has no navLabel", state.id))
                    })?;
                    let href = state.src.ok_or_else(|| {
                        Error::MalformedNavigation(format!(
                            "navPoint '{}' has no content src",
                            state.id
                        ))
                    })?;
                    slots[state.slot] = Some(NavigationEntry::new(title, href));
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::MalformedNavigation(format!(
            "navPoint '{}' is never closed",
            open.id
        )));
    }

    Ok(slots.into_iter().flatten().collect())
}

/// Record the first `content src` seen directly under the current navPoint.
fn set_src(stack: &mut [NavPointState], e: &BytesStart<'_>) -> Result<()> {
    if let Some(state) = stack.last_mut()
        && state.src.is_none()
        && let Some(src) = attribute(e, b"src")?
    {
        state.src = Some(src);
    }
    Ok(())
}

fn push_label(stack: &mut [NavPointState], text: &str) {
    if let Some(label) = stack.last_mut().and_then(|s| s.label.as_mut()) {
        label.push_str(text);
    }
}
