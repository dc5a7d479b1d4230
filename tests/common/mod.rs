//! Builds small EPUB archives on disk for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub struct TestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub properties: Option<String>,
    pub data: Vec<u8>,
}

/// An EPUB under construction. Items are stored under `OEBPS/`.
#[derive(Default)]
pub struct EpubBuilder {
    items: Vec<TestItem>,
    cover_meta: Option<String>,
    spine_toc: Option<String>,
    explicit_end_tags: bool,
}

impl EpubBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(mut self, id: &str, href: &str, media_type: &str, data: impl Into<Vec<u8>>) -> Self {
        self.items.push(TestItem {
            id: id.to_string(),
            href: href.to_string(),
            media_type: media_type.to_string(),
            properties: None,
            data: data.into(),
        });
        self
    }

    pub fn chapter(self, id: &str, href: &str, body: &str) -> Self {
        let doc = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>{id}</title></head>
<body>
{body}
</body>
</html>"#
        );
        self.item(id, href, "application/xhtml+xml", doc)
    }

    pub fn ncx(self, points: &[(&str, &str)]) -> Self {
        self.item("ncx", "toc.ncx", "application/x-dtbncx+xml", ncx_document(points))
            .spine_toc("ncx")
    }

    pub fn nav(self, links: &[(&str, &str)]) -> Self {
        let items: String = links
            .iter()
            .map(|(title, href)| format!("      <li><a href=\"{href}\">{title}</a></li>\n"))
            .collect();
        let doc = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>Contents</title></head>
<body>
  <nav epub:type="toc">
    <ol>
{items}    </ol>
  </nav>
</body>
</html>"#
        );
        let mut builder = self.item("nav", "nav.xhtml", "application/xhtml+xml", doc);
        if let Some(last) = builder.items.last_mut() {
            last.properties = Some("nav".to_string());
        }
        builder
    }

    pub fn cover_meta(mut self, id: &str) -> Self {
        self.cover_meta = Some(id.to_string());
        self
    }

    pub fn spine_toc(mut self, id: &str) -> Self {
        self.spine_toc = Some(id.to_string());
        self
    }

    /// Write manifest items and metas as `<item ...></item>` instead of
    /// self-closing tags.
    pub fn explicit_end_tags(mut self) -> Self {
        self.explicit_end_tags = true;
        self
    }

    fn opf(&self) -> String {
        let close = |tag: &str| {
            if self.explicit_end_tags {
                format!("></{tag}>")
            } else {
                "/>".to_string()
            }
        };
        let mut opf = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Test Book</dc:title>
    <dc:identifier id="id">urn:uuid:test</dc:identifier>
"#,
        );
        if let Some(cover) = &self.cover_meta {
            opf.push_str(&format!("    <meta name=\"cover\" content=\"{cover}\"{}\n", close("meta")));
        }
        opf.push_str("  </metadata>\n  <manifest>\n");
        for item in &self.items {
            let props = item
                .properties
                .as_ref()
                .map(|p| format!(" properties=\"{p}\""))
                .unwrap_or_default();
            opf.push_str(&format!(
                "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"{props}{}\n",
                item.id,
                item.href,
                item.media_type,
                close("item")
            ));
        }
        opf.push_str("  </manifest>\n");
        match &self.spine_toc {
            Some(toc) => opf.push_str(&format!("  <spine toc=\"{toc}\">\n")),
            None => opf.push_str("  <spine>\n"),
        }
        for item in self.items.iter().filter(|i| i.media_type == "application/xhtml+xml") {
            opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", item.id));
        }
        opf.push_str("  </spine>\n</package>\n");
        opf
    }

    /// Write the archive to `dir/name`.
    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let file = std::fs::File::create(&path).expect("create epub");
        let mut zip = ZipWriter::new(file);

        let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        let deflated =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();

        zip.start_file("META-INF/container.xml", deflated).unwrap();
        zip.write_all(CONTAINER_XML.as_bytes()).unwrap();

        zip.start_file("OEBPS/content.opf", deflated).unwrap();
        zip.write_all(self.opf().as_bytes()).unwrap();

        for item in &self.items {
            let entry = format!("OEBPS/{}", item.href);
            zip.start_file(entry.as_str(), deflated).unwrap();
            zip.write_all(&item.data).unwrap();
        }

        zip.finish().unwrap();
        path
    }
}

pub fn ncx_document(points: &[(&str, &str)]) -> String {
    let nav_points: String = points
        .iter()
        .enumerate()
        .map(|(i, (title, src))| {
            format!(
                "    <navPoint id=\"np{n}\" playOrder=\"{n}\">\n      <navLabel><text>{title}</text></navLabel>\n      <content src=\"{src}\"/>\n    </navPoint>\n",
                n = i + 1
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head><meta name="dtb:uid" content="urn:uuid:test"/></head>
  <docTitle><text>Test Book</text></docTitle>
  <navMap>
{nav_points}  </navMap>
</ncx>"#
    )
}

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;
