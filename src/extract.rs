//! Per-format text extraction.
//!
//! Each supported [`DocumentKind`] maps to one extractor turning owned
//! bytes into plain UTF-8 text. Extraction never repositions caller file
//! handles (input is an owned buffer) and has no side effects beyond
//! reading it.

use std::io::Read;

use pulldown_cmark::{html, Parser};

use crate::error::ExtractError;
use crate::models::{DocumentKind, UploadedDocument};
use crate::ocr::OcrProvider;

/// Maximum decompressed bytes read from a single ZIP entry (zip-bomb guard).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Extract plain text from a document.
///
/// - PDF: per-page text in page order; pages without extractable text
///   contribute nothing.
/// - DOCX: paragraph runs concatenated in document order, no separator.
/// - TXT: strict UTF-8 decode.
/// - Markdown: UTF-8 decode, then rendered to HTML. Markup tags survive
///   into the corpus as noise; documented limitation of the pipeline.
/// - Image: delegated to the OCR provider; empty text is valid.
pub async fn extract_text(
    doc: &UploadedDocument,
    kind: DocumentKind,
    ocr: &dyn OcrProvider,
) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::Pdf => extract_pdf(&doc.bytes),
        DocumentKind::Docx => extract_docx(&doc.bytes),
        DocumentKind::Txt => decode_utf8(&doc.bytes),
        DocumentKind::Markdown => extract_markdown(&doc.bytes),
        DocumentKind::Image => ocr.recognize(&doc.bytes).await,
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

fn decode_utf8(bytes: &[u8]) -> Result<String, ExtractError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| ExtractError::Encoding(e.to_string()))
}

fn extract_markdown(bytes: &[u8]) -> Result<String, ExtractError> {
    let source = decode_utf8(bytes)?;
    let mut rendered = String::with_capacity(source.len());
    html::push_html(&mut rendered, Parser::new(&source));
    Ok(rendered)
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut doc_xml = Vec::new();
    {
        let entry = archive
            .by_name("word/document.xml")
            .map_err(|_| ExtractError::Docx("word/document.xml not found".to_string()))?;
        entry
            .take(MAX_XML_ENTRY_BYTES)
            .read_to_end(&mut doc_xml)
            .map_err(|e| ExtractError::Docx(e.to_string()))?;
        if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
            return Err(ExtractError::Docx(
                "word/document.xml exceeds size limit".to_string(),
            ));
        }
    }

    extract_w_t_runs(&doc_xml)
}

/// Concatenates every `<w:t>` text run in document order.
///
/// Paragraph boundaries do not survive; downstream stages must not assume
/// sentence breaks between paragraphs.
fn extract_w_t_runs(xml: &[u8]) -> Result<String, ExtractError> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut in_text_run = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Ok(quick_xml::events::Event::Text(te)) if in_text_run => {
                out.push_str(te.unescape().unwrap_or_default().as_ref());
            }
            Ok(quick_xml::events::Event::End(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = false;
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::DisabledOcr;
    use std::io::Write;

    fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            let body: String = paragraphs
                .iter()
                .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
                .collect();
            let xml = format!(
                "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{}</w:body></w:document>",
                body
            );
            zip.write_all(xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buf
    }

    fn doc(name: &str, bytes: Vec<u8>) -> UploadedDocument {
        UploadedDocument::new(name, "", bytes)
    }

    #[tokio::test]
    async fn txt_decodes_verbatim() {
        let d = doc("a.txt", b"plain text body".to_vec());
        let text = extract_text(&d, DocumentKind::Txt, &DisabledOcr).await.unwrap();
        assert_eq!(text, "plain text body");
    }

    #[tokio::test]
    async fn txt_invalid_utf8_is_an_encoding_error() {
        let d = doc("a.txt", vec![0xff, 0xfe, 0xfd]);
        let err = extract_text(&d, DocumentKind::Txt, &DisabledOcr)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Encoding(_)));
    }

    #[tokio::test]
    async fn markdown_renders_to_html() {
        let d = doc("a.md", b"# Title\n\nSome *body* text.".to_vec());
        let text = extract_text(&d, DocumentKind::Markdown, &DisabledOcr)
            .await
            .unwrap();
        assert!(text.contains("<h1>"));
        assert!(text.contains("Some <em>body</em> text."));
    }

    #[tokio::test]
    async fn docx_concatenates_paragraphs_without_separator() {
        let d = doc("a.docx", docx_with_paragraphs(&["First paragraph.", "Second"]));
        let text = extract_text(&d, DocumentKind::Docx, &DisabledOcr)
            .await
            .unwrap();
        assert_eq!(text, "First paragraph.Second");
    }

    #[tokio::test]
    async fn invalid_zip_is_a_docx_error() {
        let d = doc("a.docx", b"not a zip".to_vec());
        let err = extract_text(&d, DocumentKind::Docx, &DisabledOcr)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Docx(_)));
    }

    #[tokio::test]
    async fn invalid_pdf_is_a_pdf_error() {
        let d = doc("a.pdf", b"not a pdf".to_vec());
        let err = extract_text(&d, DocumentKind::Pdf, &DisabledOcr)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[tokio::test]
    async fn image_without_ocr_provider_fails() {
        let d = doc("a.png", vec![0x89, 0x50, 0x4e, 0x47]);
        let err = extract_text(&d, DocumentKind::Image, &DisabledOcr)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Ocr(_)));
    }
}
