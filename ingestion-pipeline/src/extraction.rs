use common::error::AppError;
use docx_rs::{read_docx, DocumentChild, Paragraph, ParagraphChild, Run, RunChild};

/// Declared document type, derived from the uploaded file name. Drives which
/// extraction collaborator runs; unrecognized types fall through to
/// permissive text coercion rather than rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Word,
    Pdf,
    Unknown,
}

impl DocumentKind {
    pub fn from_file_name(file_name: &str) -> Self {
        let mime = mime_guess::from_path(file_name).first_or(mime::APPLICATION_OCTET_STREAM);

        match mime.essence_str() {
            "text/plain" | "text/markdown" | "text/x-rust" => Self::PlainText,
            "application/pdf" => Self::Pdf,
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Self::Word
            }
            _ => Self::Unknown,
        }
    }
}

/// Extracts plain text from document bytes according to the declared kind.
pub fn extract_text(bytes: &[u8], kind: DocumentKind) -> Result<String, AppError> {
    match kind {
        // Invalid UTF-8 is dropped rather than rejected; unknown types are
        // coerced to text the same way.
        DocumentKind::PlainText | DocumentKind::Unknown => {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map(|text| text.trim().to_string())
            .map_err(|err| AppError::Extraction(format!("reading PDF text layer: {err}"))),
        DocumentKind::Word => extract_docx_paragraphs(bytes),
    }
}

/// Joins the Word document's paragraph texts with newlines.
fn extract_docx_paragraphs(bytes: &[u8]) -> Result<String, AppError> {
    let docx = read_docx(bytes)
        .map_err(|err| AppError::Extraction(format!("reading Word document: {err}")))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    paragraph
        .children
        .iter()
        .filter_map(|child| match child {
            ParagraphChild::Run(run) => Some(run_text(run)),
            _ => None,
        })
        .collect()
}

fn run_text(run: &Run) -> String {
    run.children
        .iter()
        .filter_map(|child| match child {
            RunChild::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
        .collect()
}
