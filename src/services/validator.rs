//! Multi-layer content validation for extracted document text.
//!
//! Layers run in a fixed order and the first failing layer returns its
//! verdict. Everything downstream of sanitization (scoring, the secondary
//! check, and the analysis that eventually consumes the text) operates on
//! the sanitized form.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::services::extractor::ExtractionResult;
use crate::services::keywords::{
    KeywordCategory, BUSINESS_CATEGORIES, BUSINESS_CONTEXT, BUSINESS_CONTEXT_MIN_HITS,
    NON_BUSINESS_CATEGORIES, PERSONAL_CATEGORIES, PERSONAL_MEDICAL, RESUME_HEURISTIC,
};
use crate::services::secondary::SecondaryClassifier;

/// Minimum sanitized length for an extraction to be considered readable.
pub const MIN_EXTRACTED_TEXT: usize = 50;

const PERSONAL_SCORE_LIMIT: f64 = 8.0;
const NON_BUSINESS_SCORE_LIMIT: f64 = 10.0;
const MIN_BUSINESS_SCORE: f64 = 2.0;
const MIXED_RATIO_LIMIT: f64 = 1.5;
const MIXED_PERSONAL_FLOOR: f64 = 5.0;
const MIN_WORD_COUNT: usize = 30;
const SHORT_LINE_LEN: usize = 20;
const SHORT_LINE_RATIO_LIMIT: f64 = 0.85;
const RESUME_TAG_THRESHOLD: u32 = 4;
// Low-confidence band for the secondary check. Deliberately overlaps the
// MIN_BUSINESS_SCORE cutoff: scores in [2, 3) pass layer 3 but still get a
// second opinion.
const SECONDARY_CHECK_BAND: f64 = 3.0;
const SECONDARY_EXCERPT_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    Valid,
    NoTextExtracted,
    NoPagesDetected,
    PersonalDocument,
    NotBusinessContent,
    InsufficientBusinessContent,
    MixedPersonalBusiness,
    InsufficientContent,
    LikelyStructuredDocument,
    SecondaryValidationFailed,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::Valid => "VALID",
            ValidationCode::NoTextExtracted => "NO_TEXT_EXTRACTED",
            ValidationCode::NoPagesDetected => "NO_PAGES_DETECTED",
            ValidationCode::PersonalDocument => "PERSONAL_DOCUMENT",
            ValidationCode::NotBusinessContent => "NOT_BUSINESS_CONTENT",
            ValidationCode::InsufficientBusinessContent => "INSUFFICIENT_BUSINESS_CONTENT",
            ValidationCode::MixedPersonalBusiness => "MIXED_PERSONAL_BUSINESS",
            ValidationCode::InsufficientContent => "INSUFFICIENT_CONTENT",
            ValidationCode::LikelyStructuredDocument => "LIKELY_STRUCTURED_DOCUMENT",
            ValidationCode::SecondaryValidationFailed => "SECONDARY_VALIDATION_FAILED",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationVerdict {
    pub is_valid: bool,
    pub code: ValidationCode,
    pub message: String,
}

impl ValidationVerdict {
    fn valid() -> Self {
        Self {
            is_valid: true,
            code: ValidationCode::Valid,
            message: "Content validation passed".to_string(),
        }
    }

    fn reject(code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            code,
            message: message.into(),
        }
    }
}

/// Scores computed fresh per file; not persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationScores {
    pub personal_score: f64,
    pub non_business_score: f64,
    pub business_score: f64,
    pub word_count: usize,
    pub short_line_ratio: f64,
    /// Non-rejecting resume tag consumed by the role classifier.
    pub resume_signal: bool,
}

/// Everything the rest of the pipeline needs from validation: the verdict,
/// the scores, and the sanitized text downstream analysis consumes.
#[derive(Debug)]
pub struct ValidationOutcome {
    pub verdict: ValidationVerdict,
    pub scores: ValidationScores,
    pub sanitized_text: String,
}

pub struct ContentValidator {
    secondary: Arc<dyn SecondaryClassifier>,
}

impl ContentValidator {
    pub fn new(secondary: Arc<dyn SecondaryClassifier>) -> Self {
        Self { secondary }
    }

    pub async fn validate(&self, extraction: &ExtractionResult) -> ValidationOutcome {
        let sanitized_text = sanitize(&extraction.full_text);

        if sanitized_text.len() < MIN_EXTRACTED_TEXT {
            return ValidationOutcome {
                verdict: ValidationVerdict::reject(
                    ValidationCode::NoTextExtracted,
                    "No readable text could be extracted from file. \
                     File may be corrupted, image-only, or encrypted",
                ),
                scores: ValidationScores::default(),
                sanitized_text,
            };
        }

        if extraction.page_count == 0 {
            return ValidationOutcome {
                verdict: ValidationVerdict::reject(
                    ValidationCode::NoPagesDetected,
                    "No pages detected in document",
                ),
                scores: ValidationScores::default(),
                sanitized_text,
            };
        }

        let lower = sanitized_text.to_lowercase();

        // Layer 0: business-context pre-check. Strong business signal
        // suppresses the personal_medical category so health-tech decks
        // are not punished for mentioning patients and clinics.
        let context_hits: usize = BUSINESS_CONTEXT
            .iter()
            .map(|kw| lower.matches(kw).count())
            .sum();
        let skip_category =
            (context_hits >= BUSINESS_CONTEXT_MIN_HITS).then_some(PERSONAL_MEDICAL);
        if skip_category.is_some() {
            debug!(context_hits, "Business context detected, skipping personal_medical");
        }

        // Layer 1: personal-document detection.
        let personal_score = weighted_score(&lower, PERSONAL_CATEGORIES, skip_category);
        let resume_points: u32 = RESUME_HEURISTIC
            .iter()
            .filter(|(kw, _)| lower.contains(kw))
            .map(|(_, points)| points)
            .sum();
        let resume_signal = resume_points >= RESUME_TAG_THRESHOLD;

        // Layer 2: non-business content detection.
        let non_business_score = weighted_score(&lower, NON_BUSINESS_CATEGORIES, None);

        // Layer 3: business content verification.
        let business_score = weighted_score(&lower, BUSINESS_CATEGORIES, None);

        // Layer 5 inputs, computed up front so they can be reported.
        let word_count = sanitized_text.split_whitespace().count();
        let short_line_ratio = short_line_ratio(&sanitized_text);

        let scores = ValidationScores {
            personal_score,
            non_business_score,
            business_score,
            word_count,
            short_line_ratio,
            resume_signal,
        };

        debug!(
            personal_score,
            non_business_score, business_score, word_count, short_line_ratio, resume_signal,
            "Validation scores computed"
        );

        if personal_score > PERSONAL_SCORE_LIMIT {
            return self.rejected(
                scores,
                sanitized_text,
                ValidationCode::PersonalDocument,
                "Document appears to be a personal document, not business material",
            );
        }

        if non_business_score > NON_BUSINESS_SCORE_LIMIT {
            return self.rejected(
                scores,
                sanitized_text,
                ValidationCode::NotBusinessContent,
                "Document content is not business-related",
            );
        }

        if business_score < MIN_BUSINESS_SCORE {
            return self.rejected(
                scores,
                sanitized_text,
                ValidationCode::InsufficientBusinessContent,
                "Document doesn't appear to be a business document. \
                 Missing key business-related content",
            );
        }

        // Layer 4: personal/business ratio check.
        if business_score > 0.0 {
            let ratio = personal_score / business_score;
            if ratio > MIXED_RATIO_LIMIT && personal_score > MIXED_PERSONAL_FLOOR {
                return self.rejected(
                    scores,
                    sanitized_text,
                    ValidationCode::MixedPersonalBusiness,
                    "Document mixes substantial personal content with business material",
                );
            }
        }

        // Layer 5: structural analysis.
        if word_count < MIN_WORD_COUNT {
            return self.rejected(
                scores,
                sanitized_text,
                ValidationCode::InsufficientContent,
                "Document contains too little content to analyze",
            );
        }

        if short_line_ratio > SHORT_LINE_RATIO_LIMIT {
            return self.rejected(
                scores,
                sanitized_text,
                ValidationCode::LikelyStructuredDocument,
                "Document looks like a scanned form or structured record rather than prose",
            );
        }

        // Layer 6: second opinion in the low-confidence band [2, 3).
        if business_score < SECONDARY_CHECK_BAND {
            let excerpt: String = sanitized_text.chars().take(SECONDARY_EXCERPT_CHARS).collect();
            match self.secondary.is_business_document(&excerpt).await {
                Ok(true) => {
                    debug!(business_score, "Secondary classifier confirmed business content");
                }
                Ok(false) => {
                    return self.rejected(
                        scores,
                        sanitized_text,
                        ValidationCode::SecondaryValidationFailed,
                        "Secondary review did not recognize this as a business document",
                    );
                }
                Err(e) => {
                    // Fail open: an unavailable classifier must not block
                    // the request.
                    warn!(
                        business_score,
                        error = %e,
                        "Secondary classifier unavailable, failing open"
                    );
                }
            }
        }

        info!(
            business_score,
            personal_score, word_count, "Content validation passed"
        );

        ValidationOutcome {
            verdict: ValidationVerdict::valid(),
            scores,
            sanitized_text,
        }
    }

    fn rejected(
        &self,
        scores: ValidationScores,
        sanitized_text: String,
        code: ValidationCode,
        message: &str,
    ) -> ValidationOutcome {
        info!(code = code.as_str(), "Content validation rejected document");
        ValidationOutcome {
            verdict: ValidationVerdict::reject(code, message),
            scores,
            sanitized_text,
        }
    }
}

/// Strips NUL and other control characters (keeping tab, newline and
/// carriage return) and collapses runs of horizontal whitespace. Line
/// structure is preserved for the structural layer.
pub fn sanitize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();

    let lines: Vec<String> = cleaned
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    lines.join("\n")
}

fn category_hits(text: &str, category: &KeywordCategory) -> usize {
    category
        .keywords
        .iter()
        .map(|kw| text.matches(kw).count())
        .sum()
}

/// Generic scorer over a category table: a category contributes
/// `hits * weight` once it reaches its qualifying hit count.
fn weighted_score(text: &str, categories: &[KeywordCategory], skip: Option<&str>) -> f64 {
    categories
        .iter()
        .filter(|c| skip != Some(c.name))
        .map(|c| {
            let hits = category_hits(text, c);
            if hits >= c.min_hits {
                hits as f64 * c.weight
            } else {
                0.0
            }
        })
        .sum()
}

/// Share of non-trivial lines shorter than [`SHORT_LINE_LEN`] characters.
/// Scanned forms and ID cards come through as a pile of short fragments.
fn short_line_ratio(text: &str) -> f64 {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return 0.0;
    }
    let short = lines.iter().filter(|l| l.len() < SHORT_LINE_LEN).count();
    short as f64 / lines.len() as f64
}
