//! # epubjson
//!
//! Extracts the chapters of an EPUB as plain text: an ordered map from
//! chapter title to text, serialisable as JSON, plus optional export of the
//! cover image.
//!
//! The table of contents is read from either an EPUB 2 NCX (`toc.ncx`) or an
//! EPUB 3 navigation document (`nav.xhtml`). Each entry's target is looked up
//! in the package and its markup flattened to text. A chapter that cannot be
//! found or read does not abort the conversion; its text becomes a sentinel
//! (see [`ChapterOutcome`]).
//!
//! ## Quick Start
//!
//! ```no_run
//! use epubjson::{EpubExtractor, ExtractorConfig, TocPolicy};
//!
//! let extractor = EpubExtractor::open("book.epub")?;
//! extractor.write_to_json("book.json")?;
//! let cover = extractor.get_cover_image("cover")?;
//! println!("cover written to {}", cover.display());
//!
//! // EPUB 2 only
//! let config = ExtractorConfig::new().with_toc_policy(TocPolicy::LegacyOnly);
//! let chapters = EpubExtractor::open_with_config("book.epub", config)?.get_chapters()?;
//! # Ok::<(), epubjson::Error>(())
//! ```

pub mod chapters;
pub mod cover;
pub mod encoding;
pub mod error;
pub mod extractor;
pub mod html;
pub mod package;
pub mod toc;

pub use chapters::{CONTENT_NOT_FOUND, ChapterMap, ChapterOutcome, ChapterResult};
pub use error::{Error, Result};
pub use extractor::{EpubExtractor, ExtractorConfig};
pub use package::{Item, Package};
pub use toc::{NavigationEntry, TocEncoding, TocPolicy, TocSource};
