//! Cover image lookup and export.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::package::{Item, Package};

/// Conventional cover item ids, tried in order.
const COVER_IDS: &[&str] = &["cover", "cover-image"];

/// Find the cover image item.
///
/// Search order: id `cover`, id `cover-image`, then the first item whose
/// media type mentions `image`. With `use_declared`, the cover named by the
/// package document (`cover-image` property or `<meta name="cover">`) is
/// tried before all of these.
pub fn find_cover(package: &Package, use_declared: bool) -> Result<&Item> {
    let declared = if use_declared {
        package.cover_id().and_then(|id| package.item_by_id(id))
    } else {
        None
    };

    declared
        .or_else(|| COVER_IDS.iter().find_map(|id| package.item_by_id(id)))
        .or_else(|| package.first_with_media_type("image"))
        .ok_or_else(|| Error::NotFound("cover image".into()))
}

/// File extension (with leading dot) for a media type.
pub fn extension_for_media_type(media_type: &str) -> String {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or(media_type)
        .trim()
        .to_ascii_lowercase();

    let known = match essence.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/svg+xml" => Some("svg"),
        "image/webp" => Some("webp"),
        "image/bmp" => Some("bmp"),
        "image/tiff" => Some("tiff"),
        _ => None,
    };

    let ext = known
        .or_else(|| {
            mime_guess::get_mime_extensions_str(&essence).and_then(|exts| exts.first().copied())
        })
        .unwrap_or("bin");
    format!(".{ext}")
}

/// `output` with its extension replaced by one derived from `media_type`.
pub fn cover_output_path(output: &Path, media_type: &str) -> PathBuf {
    let mut name = output.file_stem().map(|s| s.to_os_string()).unwrap_or_default();
    name.push(extension_for_media_type(media_type));
    output.with_file_name(name)
}

/// Write the cover's bytes next to `output`, returning the path written.
pub fn write_cover(package: &Package, output: &Path, use_declared: bool) -> Result<PathBuf> {
    let item = find_cover(package, use_declared)?;
    debug!("cover item {} ({})", item.id, item.media_type);

    let path = cover_output_path(output, &item.media_type);
    std::fs::write(&path, &item.data)?;
    info!("wrote cover image to {}", path.display());
    Ok(path)
}
