use serde::Serialize;

/// File types the intake accepts.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "txt", "docx", "pptx", "doc", "ppt"];

/// An uploaded document as received at request ingress. Immutable once
/// built; consumed by the extraction coordinator and discarded afterwards.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Vec<u8>,
    pub size: usize,
    pub extension: String,
    pub declared_mime: Option<String>,
}

/// Why a file was refused before extraction.
#[derive(Debug, Clone, Serialize)]
pub struct AdmissionError {
    pub code: &'static str,
    pub message: String,
}

impl UploadedFile {
    pub fn new(filename: String, content: Vec<u8>) -> Self {
        let size = content.len();
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        Self {
            filename,
            content,
            size,
            extension,
            declared_mime: None,
        }
    }

    pub fn with_declared_mime(mut self, mime: String) -> Self {
        self.declared_mime = Some(mime);
        self
    }

    /// MIME type forwarded to the OCR provider, derived from the extension.
    pub fn mime_type(&self) -> &'static str {
        match self.extension.as_str() {
            "pdf" => "application/pdf",
            "txt" => "text/plain",
            "docx" => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            "pptx" => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            "doc" => "application/msword",
            "ppt" => "application/vnd.ms-powerpoint",
            _ => "application/octet-stream",
        }
    }

    /// Admission check run before any extraction work: presence, size and
    /// extension. A declared MIME type outside the allowed set is logged
    /// but not refused when the extension is valid.
    pub fn admit(&self, max_size_bytes: usize) -> Result<(), AdmissionError> {
        if self.filename.is_empty() {
            return Err(AdmissionError {
                code: "FILE_NOT_PROVIDED",
                message: "No file selected".to_string(),
            });
        }

        if self.size > max_size_bytes {
            let size_mb = self.size as f64 / (1024.0 * 1024.0);
            let limit_mb = max_size_bytes / (1024 * 1024);
            return Err(AdmissionError {
                code: "FILE_TOO_LARGE",
                message: format!("File is {:.1}MB. Maximum {}MB allowed", size_mb, limit_mb),
            });
        }

        if self.size == 0 {
            return Err(AdmissionError {
                code: "EMPTY_FILE",
                message: "File is empty".to_string(),
            });
        }

        if self.extension.is_empty() || !ALLOWED_EXTENSIONS.contains(&self.extension.as_str()) {
            return Err(AdmissionError {
                code: "INVALID_FILE_TYPE",
                message: format!(
                    "File type '.{}' not supported. Allowed: {}",
                    self.extension,
                    ALLOWED_EXTENSIONS.join(", ")
                ),
            });
        }

        if let Some(mime) = &self.declared_mime {
            if mime != self.mime_type() {
                tracing::warn!(
                    filename = %self.filename,
                    declared = %mime,
                    "Declared MIME type does not match extension, admitting on extension"
                );
            }
        }

        Ok(())
    }
}
