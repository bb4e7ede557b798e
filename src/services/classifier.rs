//! Document role classification and file-set decisions.
//!
//! Classification is independent of the content validator's accept/reject
//! outcome: a file can be perfectly valid business prose and still be a
//! resume for set-level purposes.

use serde::Serialize;
use tracing::debug;

use crate::services::keywords::{
    BUSINESS_PLAN_VOCAB, FINANCIAL_MODEL_VOCAB, MARKET_RESEARCH_VOCAB, PITCH_DECK_VOCAB,
    RESUME_VOCAB,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    PitchDeck,
    FinancialModel,
    BusinessPlan,
    MarketResearch,
    Resume,
    Unknown,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::PitchDeck => "PITCH_DECK",
            DocumentKind::FinancialModel => "FINANCIAL_MODEL",
            DocumentKind::BusinessPlan => "BUSINESS_PLAN",
            DocumentKind::MarketResearch => "MARKET_RESEARCH",
            DocumentKind::Resume => "RESUME",
            DocumentKind::Unknown => "UNKNOWN",
        }
    }
}

/// A primary document can be analyzed standalone; a supplementary one only
/// adds context alongside a primary document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentClassification {
    pub kind: DocumentKind,
    pub is_primary: bool,
}

impl DocumentClassification {
    fn primary(kind: DocumentKind) -> Self {
        Self {
            kind,
            is_primary: true,
        }
    }

    fn supplementary(kind: DocumentKind) -> Self {
        Self {
            kind,
            is_primary: false,
        }
    }

    fn unknown() -> Self {
        Self {
            kind: DocumentKind::Unknown,
            is_primary: false,
        }
    }

    /// Supplementary means a recognized kind that cannot stand alone;
    /// Unknown is neither primary nor supplementary.
    pub fn is_supplementary(&self) -> bool {
        !self.is_primary && self.kind != DocumentKind::Unknown
    }
}

pub struct DocumentClassifier;

impl DocumentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, text: &str, filename: &str) -> DocumentClassification {
        self.classify_tagged(text, filename, false)
    }

    /// Classification with the validator's resume tag. Rules are checked
    /// in priority order and the first match wins; resumes outrank the
    /// primary kinds so a founder bio attached to a deck is never promoted.
    pub fn classify_tagged(
        &self,
        text: &str,
        filename: &str,
        resume_tagged: bool,
    ) -> DocumentClassification {
        // The filename participates as additional evidence ("q3-pitch-deck.pdf").
        let haystack = format!("{}\n{}", filename.to_lowercase(), text.to_lowercase());

        let classification = if resume_tagged || presence_hits(&haystack, RESUME_VOCAB) >= 2 {
            DocumentClassification::supplementary(DocumentKind::Resume)
        } else if presence_hits(&haystack, PITCH_DECK_VOCAB) >= 2 {
            DocumentClassification::primary(DocumentKind::PitchDeck)
        } else if presence_hits(&haystack, FINANCIAL_MODEL_VOCAB) >= 3 {
            DocumentClassification::primary(DocumentKind::FinancialModel)
        } else if presence_hits(&haystack, BUSINESS_PLAN_VOCAB) >= 2 {
            DocumentClassification::primary(DocumentKind::BusinessPlan)
        } else if presence_hits(&haystack, MARKET_RESEARCH_VOCAB) >= 2 {
            DocumentClassification::primary(DocumentKind::MarketResearch)
        } else {
            DocumentClassification::unknown()
        };

        debug!(
            filename,
            kind = classification.kind.as_str(),
            is_primary = classification.is_primary,
            "Document classified"
        );

        classification
    }
}

impl Default for DocumentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn presence_hits(text: &str, vocab: &[&str]) -> usize {
    vocab.iter().filter(|kw| text.contains(*kw)).count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileSetCode {
    Accepted,
    NoFiles,
    SupplementaryOnly,
    UnknownDocuments,
}

impl FileSetCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileSetCode::Accepted => "ACCEPTED",
            FileSetCode::NoFiles => "NO_FILES",
            FileSetCode::SupplementaryOnly => "SUPPLEMENTARY_ONLY",
            FileSetCode::UnknownDocuments => "UNKNOWN_DOCUMENTS",
        }
    }
}

/// One decision covering the entire batch of files in a request.
#[derive(Debug, Clone, Serialize)]
pub struct FileSetDecision {
    pub is_valid: bool,
    pub code: FileSetCode,
    pub message: String,
}

/// One primary document makes the set analyzable, no matter how many
/// supplementary or unrecognized files accompany it.
pub fn validate_set(classifications: &[DocumentClassification]) -> FileSetDecision {
    if classifications.is_empty() {
        return FileSetDecision {
            is_valid: false,
            code: FileSetCode::NoFiles,
            message: "No files to evaluate".to_string(),
        };
    }

    if classifications.iter().any(|c| c.is_primary) {
        return FileSetDecision {
            is_valid: true,
            code: FileSetCode::Accepted,
            message: "File set contains at least one primary business document".to_string(),
        };
    }

    if classifications.iter().any(|c| c.is_supplementary()) {
        return FileSetDecision {
            is_valid: false,
            code: FileSetCode::SupplementaryOnly,
            message: "Only supplementary documents were submitted. \
                      Include a pitch deck, financial model, business plan or market research"
                .to_string(),
        };
    }

    FileSetDecision {
        is_valid: false,
        code: FileSetCode::UnknownDocuments,
        message: "Submitted documents could not be recognized as business material".to_string(),
    }
}
