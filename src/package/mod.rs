//! The opened EPUB package: an ordered collection of manifest items.
//!
//! Opening resolves `META-INF/container.xml` to the OPF package document and
//! loads every manifest item's bytes from the ZIP container. The package is
//! read-only once loaded.

mod parser;

use std::io::{Read, Seek};
use std::path::Path;

use log::{debug, warn};
use zip::ZipArchive;

use crate::encoding::decode_document;
use crate::error::{Error, Result};

pub(crate) use parser::{attribute, local_name, resolve_entity};
pub use parser::{ManifestEntry, OpfData, parse_container_xml, parse_opf};

/// A named, typed resource inside the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    /// Manifest href, relative to the OPF document. Used as the lookup key
    /// for navigation targets.
    pub href: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        href: impl Into<String>,
        media_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            data,
        }
    }

    /// Last path segment of the href.
    pub fn file_name(&self) -> &str {
        self.href.rsplit('/').next().unwrap_or(&self.href)
    }
}

/// An opened EPUB package.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub title: Option<String>,
    items: Vec<Item>,
    toc_id: Option<String>,
    cover_id: Option<String>,
}

impl Package {
    /// Build a package directly from items (package order = `items` order).
    pub fn from_items(items: Vec<Item>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    /// Open an EPUB file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        debug!("opening package {}", path.display());
        Self::from_reader(file)
    }

    /// Open an EPUB from any [`Read`] + [`Seek`] source.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::Format(format!("cannot open archive: {e}")))?;

        let container = read_archive_file_bytes(&mut archive, "META-INF/container.xml")
            .map_err(|_| Error::Format("missing META-INF/container.xml".into()))?;
        let opf_path = parse_container_xml(&container)?;
        let opf_base = Path::new(&opf_path)
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        let opf_bytes = read_archive_file_bytes(&mut archive, &opf_path)
            .map_err(|_| Error::Format(format!("missing package document {opf_path}")))?;
        let opf_text =
            decode_document(&opf_bytes).map_err(|e| Error::Format(format!("{opf_path}: {e}")))?;
        let opf = parse_opf(&opf_text)?;

        let mut items = Vec::with_capacity(opf.manifest.len());
        for entry in opf.manifest {
            let full_path = resolve_path(&opf_base, &entry.href);
            match read_archive_file_bytes(&mut archive, &full_path) {
                Ok(data) => items.push(Item {
                    id: entry.id,
                    href: entry.href,
                    media_type: entry.media_type,
                    data,
                }),
                Err(e) => warn!("skipping manifest item {} ({full_path}): {e}", entry.id),
            }
        }
        debug!("loaded {} items from {opf_path}", items.len());

        Ok(Self {
            title: opf.title,
            items,
            toc_id: opf.toc_id,
            cover_id: opf.cover_id,
        })
    }

    /// All items in package (manifest) order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item_by_id(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Exact href match; no normalization of relative paths, fragments or
    /// percent-encoding.
    pub fn item_by_href(&self, href: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.href == href)
    }

    /// First item whose href is `name` or ends in `/name`.
    pub fn item_by_file_name(&self, name: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|item| item.href == name || item.file_name() == name)
    }

    /// First item (package order) whose media type contains `needle`.
    pub fn first_with_media_type(&self, needle: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.media_type.contains(needle))
    }

    /// Id referenced by the spine `toc` attribute.
    pub fn toc_id(&self) -> Option<&str> {
        self.toc_id.as_deref()
    }

    /// Cover item id declared by the package document.
    pub fn cover_id(&self) -> Option<&str> {
        self.cover_id.as_deref()
    }

    pub fn with_toc_id(mut self, id: impl Into<String>) -> Self {
        self.toc_id = Some(id.into());
        self
    }

    pub fn with_cover_id(mut self, id: impl Into<String>) -> Self {
        self.cover_id = Some(id.into());
        self
    }
}

fn read_archive_file_bytes<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Vec<u8>> {
    // Try direct lookup first
    match archive.by_name(path) {
        Ok(mut file) => {
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            return Ok(contents);
        }
        Err(zip::result::ZipError::FileNotFound) => {}
        Err(e) => return Err(e.into()),
    }

    // Fallback: manifest hrefs are URLs, archive names are not
    let decoded = percent_encoding::percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| Error::Format(format!("Invalid UTF-8 in path: {path}")))?;

    let mut file = archive.by_name(&decoded)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

fn resolve_path(base: &str, href: &str) -> String {
    if base.is_empty() {
        href.to_string()
    } else {
        format!("{base}/{href}")
    }
}
