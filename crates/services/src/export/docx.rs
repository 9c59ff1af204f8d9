//! Minimal WordprocessingML package: content types, package relationships
//! and a single document part.

use super::ExportError;
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

pub(super) fn render(title: &str, text: &str) -> Result<Vec<u8>, ExportError> {
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", RELS_XML.to_string()),
        ("word/document.xml", document_xml(title, text)),
    ];

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, contents) in parts {
        writer
            .start_file(name, options)
            .map_err(|e| ExportError::Render(format!("Failed to add {name}: {e}")))?;
        writer
            .write_all(contents.as_bytes())
            .map_err(|e| ExportError::Render(format!("Failed to write {name}: {e}")))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| ExportError::Render(format!("Failed to finish DOCX archive: {e}")))?;
    Ok(cursor.into_inner())
}

fn document_xml(title: &str, text: &str) -> String {
    let mut body = paragraph(title, true);
    body.push_str("<w:p/>");
    for line in text.lines() {
        body.push_str(&paragraph(line, false));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    )
}

fn paragraph(text: &str, bold: bool) -> String {
    // XML 1.0 forbids most control characters
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\t')
        .collect();
    if cleaned.is_empty() {
        return "<w:p/>".to_string();
    }

    let run_props = if bold { "<w:rPr><w:b/></w:rPr>" } else { "" };
    format!(
        r#"<w:p><w:r>{run_props}<w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape(cleaned.as_str())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut contents = String::new();
        part.read_to_string(&mut contents).unwrap();
        contents
    }

    /// Text of every `<w:t>` run, unescaped
    fn run_texts(xml: &str) -> Vec<String> {
        xml.split("<w:t xml:space=\"preserve\">")
            .skip(1)
            .filter_map(|rest| rest.split("</w:t>").next())
            .map(|raw| quick_xml::escape::unescape(raw).unwrap().into_owned())
            .collect()
    }

    #[test]
    fn test_package_contains_required_parts() {
        let bytes = render("AI Rewritten Text", "Sample").unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();

        let mut names: Vec<_> = archive.file_names().collect();
        names.sort();
        assert_eq!(
            names,
            vec!["[Content_Types].xml", "_rels/.rels", "word/document.xml"]
        );
    }

    #[test]
    fn test_document_text_round_trips_through_escaping() {
        let text = "Tom & Jerry <b>\n\n\"quoted\" 改写";
        let bytes = render("AI Rewritten Text", text).unwrap();
        let xml = read_part(&bytes, "word/document.xml");

        assert!(xml.contains("Tom &amp; Jerry &lt;b&gt;"));
        assert_eq!(
            run_texts(&xml),
            vec!["AI Rewritten Text", "Tom & Jerry <b>", "\"quoted\" 改写"]
        );
    }

    #[test]
    fn test_title_is_bold() {
        let xml = document_xml("Title", "body");
        assert!(xml.contains("<w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">Title</w:t>"));
    }

    #[test]
    fn test_control_characters_are_dropped() {
        let xml = document_xml("T", "a\u{0}b\u{7}c");
        assert_eq!(run_texts(&xml), vec!["T", "abc"]);
    }
}
