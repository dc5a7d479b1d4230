//! Table-of-contents detection and parsing.
//!
//! Two on-disk encodings are understood:
//!
//! - [`TocEncoding::Legacy`]: an EPUB 2 NCX document (`toc.ncx`).
//! - [`TocEncoding::Modern`]: an EPUB 3 navigation document (`nav.xhtml`).

mod nav;
mod ncx;

use log::debug;

use crate::error::{Error, Result};
use crate::package::{Item, Package};

pub use nav::parse_nav;
pub use ncx::parse_ncx;

pub const NCX_FILE_NAME: &str = "toc.ncx";
pub const NCX_ID: &str = "ncx";
pub const NAV_FILE_NAME: &str = "nav.xhtml";

/// A table-of-contents entry: a title and the href it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEntry {
    /// Title as written in the TOC, whitespace untouched.
    pub title: String,
    pub href: String,
}

impl NavigationEntry {
    pub fn new(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
        }
    }
}

/// The on-disk encoding of the table of contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocEncoding {
    /// EPUB 2 NCX.
    Legacy,
    /// EPUB 3 nav document.
    Modern,
}

/// Which encodings a package may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TocPolicy {
    /// Prefer the NCX, fall back to the nav document.
    #[default]
    Auto,
    /// Only the NCX is accepted.
    LegacyOnly,
}

/// A detected table of contents: its encoding and the item holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocSource {
    pub encoding: TocEncoding,
    /// Href of the TOC item within the package.
    pub href: String,
}

impl TocSource {
    /// Detect the table of contents of `package` under `policy`.
    pub fn detect(package: &Package, policy: TocPolicy) -> Result<Self> {
        if let Some(item) = legacy_toc_item(package) {
            debug!("using NCX table of contents {}", item.href);
            return Ok(Self {
                encoding: TocEncoding::Legacy,
                href: item.href.clone(),
            });
        }

        match policy {
            TocPolicy::LegacyOnly => Err(Error::NotFound(format!(
                "{NCX_FILE_NAME} (legacy table of contents)"
            ))),
            TocPolicy::Auto => match package.item_by_file_name(NAV_FILE_NAME) {
                Some(item) => {
                    debug!("using nav document {}", item.href);
                    Ok(Self {
                        encoding: TocEncoding::Modern,
                        href: item.href.clone(),
                    })
                }
                None => Err(Error::UnsupportedFormat(format!(
                    "neither {NCX_FILE_NAME} nor {NAV_FILE_NAME} present"
                ))),
            },
        }
    }

    /// Read the navigation entries from the package.
    pub fn entries(&self, package: &Package) -> Result<Vec<NavigationEntry>> {
        let item = package
            .item_by_href(&self.href)
            .ok_or_else(|| Error::NotFound(self.href.clone()))?;
        match self.encoding {
            TocEncoding::Legacy => parse_ncx(&item.data),
            TocEncoding::Modern => parse_nav(&item.data),
        }
    }
}

/// The NCX item: by file name, then id `ncx`, then the spine `toc` reference.
fn legacy_toc_item(package: &Package) -> Option<&Item> {
    package
        .item_by_file_name(NCX_FILE_NAME)
        .or_else(|| package.item_by_id(NCX_ID))
        .or_else(|| package.toc_id().and_then(|id| package.item_by_id(id)))
}
