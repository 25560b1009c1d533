//! Upload validation against the extension/MIME allow-list.
//!
//! A document is accepted when its extension OR declared MIME type is
//! recognized. Validation is all-or-nothing: a single rejected document
//! aborts the whole batch, reporting every offending filename.

use crate::error::IngestError;
use crate::models::{DocumentKind, UploadedDocument};

pub const ALLOWED_EXTENSIONS: [&str; 7] =
    [".pdf", ".docx", ".txt", ".md", ".jpeg", ".jpg", ".png"];

pub const ALLOWED_MIME_TYPES: [&str; 6] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "text/markdown",
    "image/jpeg",
    "image/png",
];

/// Accept the batch iff every document passes the allow-list check.
pub fn validate_batch(docs: &[UploadedDocument]) -> Result<(), IngestError> {
    let rejected: Vec<String> = docs
        .iter()
        .filter(|doc| !is_allowed(doc))
        .map(|doc| doc.name.clone())
        .collect();

    if rejected.is_empty() {
        Ok(())
    } else {
        Err(IngestError::UnsupportedFiles(rejected))
    }
}

fn is_allowed(doc: &UploadedDocument) -> bool {
    let ext = extension_of(&doc.name);
    ALLOWED_EXTENSIONS
        .iter()
        .any(|e| Some(*e) == ext.as_deref())
        || ALLOWED_MIME_TYPES.iter().any(|m| *m == doc.mime_type)
}

/// Resolve the extractor for a document: extension first, MIME fallback.
pub fn document_kind(doc: &UploadedDocument) -> Option<DocumentKind> {
    if let Some(ext) = extension_of(&doc.name) {
        let kind = match ext.as_str() {
            ".pdf" => Some(DocumentKind::Pdf),
            ".docx" => Some(DocumentKind::Docx),
            ".txt" => Some(DocumentKind::Txt),
            ".md" => Some(DocumentKind::Markdown),
            ".jpeg" | ".jpg" | ".png" => Some(DocumentKind::Image),
            _ => None,
        };
        if kind.is_some() {
            return kind;
        }
    }
    match doc.mime_type.as_str() {
        "application/pdf" => Some(DocumentKind::Pdf),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
            Some(DocumentKind::Docx)
        }
        "text/plain" => Some(DocumentKind::Txt),
        "text/markdown" => Some(DocumentKind::Markdown),
        "image/jpeg" | "image/png" => Some(DocumentKind::Image),
        _ => None,
    }
}

/// Lowercased extension including the leading dot, if the name has one.
fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_lowercase()))
}

/// Guess the MIME type for a local file path from its extension.
///
/// Used by the CLI when loading documents from disk, where no declared
/// MIME type exists.
pub fn mime_for_name(name: &str) -> String {
    match extension_of(name).as_deref() {
        Some(".pdf") => "application/pdf",
        Some(".docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some(".txt") => "text/plain",
        Some(".md") => "text/markdown",
        Some(".jpeg") | Some(".jpg") => "image/jpeg",
        Some(".png") => "image/png",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, mime: &str) -> UploadedDocument {
        UploadedDocument::new(name, mime, Vec::new())
    }

    #[test]
    fn accepts_by_extension() {
        assert!(validate_batch(&[doc("Report.PDF", "")]).is_ok());
        assert!(validate_batch(&[doc("notes.md", "")]).is_ok());
    }

    #[test]
    fn accepts_by_mime_when_extension_unknown() {
        assert!(validate_batch(&[doc("export.data", "application/pdf")]).is_ok());
    }

    #[test]
    fn rejects_whole_batch_listing_offenders() {
        let batch = [
            doc("good.txt", "text/plain"),
            doc("bad.exe", "application/octet-stream"),
            doc("worse.tar", ""),
        ];
        let err = validate_batch(&batch).unwrap_err();
        match err {
            IngestError::UnsupportedFiles(names) => {
                assert_eq!(names, vec!["bad.exe", "worse.tar"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn kind_prefers_extension_over_mime() {
        let d = doc("photo.png", "text/plain");
        assert_eq!(document_kind(&d), Some(DocumentKind::Image));
    }

    #[test]
    fn kind_falls_back_to_mime() {
        let d = doc("export.data", "text/markdown");
        assert_eq!(document_kind(&d), Some(DocumentKind::Markdown));
    }

    #[test]
    fn no_extension_no_mime_is_unknown() {
        assert_eq!(document_kind(&doc("README", "")), None);
        assert!(validate_batch(&[doc("README", "")]).is_err());
    }
}
