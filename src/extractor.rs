//! The EPUB → chapter text extractor.

use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::chapters::{ChapterMap, ChapterOutcome, ChapterResult};
use crate::cover;
use crate::error::{Error, Result};
use crate::html::extract_text;
use crate::package::Package;
use crate::toc::{NavigationEntry, TocEncoding, TocPolicy, TocSource};

/// Extractor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub toc_policy: TocPolicy,
    /// Whether [`EpubExtractor::get_cover_image`] is available.
    pub extract_cover: bool,
    /// Try the cover named by the package document before the conventional
    /// ids and the first-image fallback.
    pub declared_cover: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            toc_policy: TocPolicy::Auto,
            extract_cover: true,
            declared_cover: false,
        }
    }
}

impl ExtractorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_toc_policy(mut self, policy: TocPolicy) -> Self {
        self.toc_policy = policy;
        self
    }

    pub fn with_cover_extraction(mut self, enabled: bool) -> Self {
        self.extract_cover = enabled;
        self
    }

    pub fn with_declared_cover(mut self, enabled: bool) -> Self {
        self.declared_cover = enabled;
        self
    }
}

/// Converts an opened EPUB package into chapter text.
///
/// The table of contents is detected when the extractor is built; chapter
/// extraction is repeated from scratch on every call.
///
/// # Example
///
/// ```no_run
/// use epubjson::EpubExtractor;
///
/// let extractor = EpubExtractor::open("book.epub")?;
/// for (title, text) in extractor.get_chapters()?.iter() {
///     println!("{title}: {} chars", text.len());
/// }
/// extractor.write_to_json("book.json")?;
/// # Ok::<(), epubjson::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct EpubExtractor {
    package: Package,
    config: ExtractorConfig,
    toc: TocSource,
}

impl EpubExtractor {
    /// Open an EPUB file with the default configuration.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, ExtractorConfig::default())
    }

    pub fn open_with_config<P: AsRef<Path>>(path: P, config: ExtractorConfig) -> Result<Self> {
        Self::from_package(Package::open(path)?, config)
    }

    /// Open an EPUB from any [`Read`] + [`Seek`] source.
    pub fn from_reader<R: Read + Seek>(reader: R, config: ExtractorConfig) -> Result<Self> {
        Self::from_package(Package::from_reader(reader)?, config)
    }

    /// Wrap an already-loaded package.
    pub fn from_package(package: Package, config: ExtractorConfig) -> Result<Self> {
        let toc = TocSource::detect(&package, config.toc_policy)?;
        Ok(Self {
            package,
            config,
            toc,
        })
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The detected table-of-contents encoding.
    pub fn encoding(&self) -> TocEncoding {
        self.toc.encoding
    }

    /// Navigation entries in table-of-contents order.
    pub fn nav_points(&self) -> Result<Vec<NavigationEntry>> {
        self.toc.entries(&self.package)
    }

    /// Extract one chapter, reporting what went wrong instead of a sentinel.
    pub fn chapter_outcome(&self, href: &str) -> ChapterOutcome {
        let Some(item) = self.package.item_by_href(href) else {
            return ChapterOutcome::NotFound;
        };
        match extract_text(&item.data) {
            Ok(text) => ChapterOutcome::Extracted(text),
            Err(reason) => ChapterOutcome::Failed(reason),
        }
    }

    /// Plain text of the item at `href`, or a sentinel string:
    /// `"Content not found"` when no item matches, or
    /// `"Error extracting content: ..."` when the item cannot be read.
    pub fn extract_chapter_content(&self, href: &str) -> String {
        self.chapter_outcome(href).into_text()
    }

    /// One result per navigation entry, in order, titles trimmed.
    pub fn chapter_outcomes(&self) -> Result<Vec<ChapterResult>> {
        let entries = self.nav_points()?;
        debug!("{} navigation entries", entries.len());

        Ok(entries
            .into_iter()
            .map(|entry| {
                let outcome = self.chapter_outcome(&entry.href);
                match &outcome {
                    ChapterOutcome::NotFound => {
                        warn!("no item for '{}' ({})", entry.title.trim(), entry.href)
                    }
                    ChapterOutcome::Failed(reason) => {
                        warn!("cannot extract '{}' ({}): {reason}", entry.title.trim(), entry.href)
                    }
                    ChapterOutcome::Extracted(_) => {}
                }
                ChapterResult {
                    title: entry.title.trim().to_string(),
                    href: entry.href,
                    outcome,
                }
            })
            .collect())
    }

    /// Chapter title → text. Later entries with a duplicate title replace
    /// earlier ones.
    pub fn get_chapters(&self) -> Result<ChapterMap> {
        let chapters: ChapterMap = self
            .chapter_outcomes()?
            .into_iter()
            .map(|result| (result.title, result.outcome.into_text()))
            .collect();
        info!("extracted {} chapters", chapters.len());
        Ok(chapters)
    }

    /// Write the chapter map as pretty JSON. Nothing is written if the
    /// table of contents cannot be read.
    pub fn write_to_json<P: AsRef<Path>>(&self, output: P) -> Result<()> {
        let output = output.as_ref();
        let json = self.get_chapters()?.to_json_string()?;
        std::fs::write(output, json)?;
        info!("wrote {}", output.display());
        Ok(())
    }

    /// Export the cover image next to `output`, with an extension derived
    /// from the cover's media type. Returns the path actually written.
    pub fn get_cover_image<P: AsRef<Path>>(&self, output: P) -> Result<PathBuf> {
        if !self.config.extract_cover {
            return Err(Error::CoverDisabled);
        }
        cover::write_cover(&self.package, output.as_ref(), self.config.declared_cover)
    }
}
