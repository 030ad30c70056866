//! Uploaded-file processing.
//!
//! Files are dispatched by extension to a per-kind extractor; extracted
//! text (or the image itself) is combined with the guiding prompt and sent
//! to the model. A failing file is reported inline and does not stop the
//! rest of the batch.

use std::io::Read;

use regex::Regex;

use crate::core::errors::ApiError;
use crate::llm::GeminiClient;

pub const DEFAULT_PROMPT: &str = "Describe this file.";

/// Supported upload kinds. Anything outside this enum gets an
/// "unsupported file type" marker instead of a model call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image { mime_type: &'static str },
    Pdf,
    Docx,
}

impl FileKind {
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        let extension = lower.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        match extension {
            "jpeg" | "jpg" => Some(FileKind::Image {
                mime_type: "image/jpeg",
            }),
            "png" => Some(FileKind::Image {
                mime_type: "image/png",
            }),
            "pdf" => Some(FileKind::Pdf),
            "docx" => Some(FileKind::Docx),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Process a batch of uploads in submission order. Per-file results are
/// joined with blank lines; failures become inline markers.
pub async fn process_files(
    gemini: &GeminiClient,
    files: Vec<UploadedFile>,
    prompt: &str,
) -> String {
    let mut responses = Vec::with_capacity(files.len());

    for file in files {
        let entry = match FileKind::from_name(&file.name) {
            Some(kind) => match process_one(gemini, kind, &file, prompt).await {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!("Failed to process {}: {}", file.name, err);
                    format!("{}: Error processing file - {}", file.name, err)
                }
            },
            None => format!("⚠️ {}: Unsupported file type.", file.name),
        };
        responses.push(entry);
    }

    responses.join("\n\n")
}

async fn process_one(
    gemini: &GeminiClient,
    kind: FileKind,
    file: &UploadedFile,
    prompt: &str,
) -> Result<String, ApiError> {
    match kind {
        FileKind::Image { mime_type } => {
            let reply = gemini
                .generate_with_image(prompt, &file.bytes, mime_type)
                .await?;
            Ok(format!("🖼️ {}:\n{}", file.name, reply))
        }
        FileKind::Pdf => {
            let text = extract_pdf_text(&file.bytes)?;
            let reply = gemini.generate(&format!("{}\n\n{}", prompt, text)).await?;
            Ok(format!("📄 {}:\n{}", file.name, reply))
        }
        FileKind::Docx => {
            let text = extract_docx_text(&file.bytes)?;
            let reply = gemini.generate(&format!("{}\n\n{}", prompt, text)).await?;
            Ok(format!("📝 {}:\n{}", file.name, reply))
        }
    }
}

/// Concatenated text of all pages; a page with no extractable text
/// contributes nothing.
fn extract_pdf_text(bytes: &[u8]) -> Result<String, ApiError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ApiError::Internal(format!("PDF extraction failed: {}", e)))
}

/// Paragraph texts of `word/document.xml`, joined with newlines.
fn extract_docx_text(bytes: &[u8]) -> Result<String, ApiError> {
    let reader = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(reader)
        .map_err(|e| ApiError::Internal(format!("DOCX archive unreadable: {}", e)))?;

    let mut document = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ApiError::Internal(format!("DOCX missing document.xml: {}", e)))?
        .read_to_string(&mut document)
        .map_err(ApiError::internal)?;

    let runs = Regex::new(r"<w:t[^>]*>([^<]*)</w:t>").map_err(ApiError::internal)?;

    let paragraphs: Vec<String> = document
        .split("</w:p>")
        .map(|paragraph| {
            runs.captures_iter(paragraph)
                .map(|cap| cap[1].to_string())
                .collect::<String>()
        })
        .filter(|text| !text.is_empty())
        .collect();

    Ok(paragraphs.join("\n"))
}
