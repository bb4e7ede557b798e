//! Keyword tables for content validation and role classification.
//!
//! Categories are plain data consumed by the generic scorer in the
//! validator: a new category or weight is a table change, not a code
//! change. Hits are substring occurrences over lower-cased text.

/// A scored vocabulary. The category contributes `hits * weight` to its
/// aggregate only once `hits >= min_hits`.
pub struct KeywordCategory {
    pub name: &'static str,
    pub weight: f64,
    pub min_hits: usize,
    pub keywords: &'static [&'static str],
}

/// Broad business-signal vocabulary for the pre-check. Enough hits here
/// suppress the personal_medical category, so a health-tech deck that
/// legitimately discusses patients and clinics is not refused.
pub const BUSINESS_CONTEXT: &[&str] = &[
    "startup",
    "founder",
    "funding",
    "revenue",
    "traction",
    "investor",
    "investment",
    "venture",
    "valuation",
    "business model",
    "go-to-market",
    "market share",
    "series a",
    "seed round",
    "burn rate",
    "saas",
];

/// How many business-context hits it takes to suppress personal_medical.
pub const BUSINESS_CONTEXT_MIN_HITS: usize = 3;

pub const PERSONAL_MEDICAL: &str = "personal_medical";

pub const PERSONAL_CATEGORIES: &[KeywordCategory] = &[
    KeywordCategory {
        name: "identity_docs",
        weight: 3.0,
        min_hits: 3,
        keywords: &[
            "passport",
            "driver's license",
            "national id",
            "identity card",
            "social security number",
            "date of birth",
            "place of birth",
            "id number",
        ],
    },
    KeywordCategory {
        name: PERSONAL_MEDICAL,
        weight: 2.5,
        min_hits: 3,
        keywords: &[
            "diagnosis",
            "prescription",
            "medical record",
            "patient name",
            "blood type",
            "allergies",
            "physician",
            "immunization",
        ],
    },
    KeywordCategory {
        name: "personal_financial",
        weight: 2.8,
        min_hits: 3,
        keywords: &[
            "bank statement",
            "account number",
            "credit card statement",
            "payslip",
            "salary slip",
            "tax return",
            "iban",
            "routing number",
        ],
    },
    KeywordCategory {
        name: "personal_legal",
        weight: 2.5,
        min_hits: 3,
        keywords: &[
            "birth certificate",
            "marriage certificate",
            "divorce",
            "custody",
            "last will",
            "power of attorney",
            "notarized",
            "affidavit",
        ],
    },
    KeywordCategory {
        name: "resume_cv",
        weight: 3.5,
        min_hits: 3,
        keywords: &[
            "curriculum vitae",
            "resume",
            "cv",
            "work experience",
            "career objective",
            "references available",
            "employment history",
            "education:",
        ],
    },
    KeywordCategory {
        name: "personal_photos",
        weight: 1.5,
        min_hits: 3,
        keywords: &[
            "photo album",
            "selfie",
            "family photo",
            "vacation",
            "wedding photo",
            "birthday party",
        ],
    },
];

pub const NON_BUSINESS_CATEGORIES: &[KeywordCategory] = &[
    KeywordCategory {
        name: "recipe",
        weight: 2.5,
        min_hits: 3,
        keywords: &[
            "ingredients",
            "preheat",
            "tablespoon",
            "teaspoon",
            "bake for",
            "simmer",
            "servings",
            "whisk",
        ],
    },
    KeywordCategory {
        name: "news_article",
        weight: 2.0,
        min_hits: 3,
        keywords: &[
            "breaking news",
            "reported by",
            "correspondent",
            "press association",
            "editor's note",
            "newsroom",
        ],
    },
    KeywordCategory {
        name: "tutorial",
        weight: 2.0,
        min_hits: 3,
        keywords: &[
            "step-by-step",
            "tutorial",
            "how to install",
            "prerequisites",
            "in this guide",
            "walkthrough",
        ],
    },
    KeywordCategory {
        name: "entertainment",
        weight: 2.0,
        min_hits: 3,
        keywords: &[
            "movie review",
            "box office",
            "celebrity",
            "episode",
            "soundtrack",
            "season finale",
        ],
    },
    KeywordCategory {
        name: "meme_cartoon",
        weight: 2.5,
        min_hits: 3,
        keywords: &["meme", "cartoon", "comic strip", "punchline", "caption contest"],
    },
];

pub const BUSINESS_CATEGORIES: &[KeywordCategory] = &[
    KeywordCategory {
        name: "pitch_deck",
        weight: 1.5,
        min_hits: 1,
        keywords: &[
            "pitch deck",
            "problem",
            "solution",
            "market opportunity",
            "competitive advantage",
            "use of funds",
            "the ask",
        ],
    },
    KeywordCategory {
        name: "financial",
        weight: 1.3,
        min_hits: 1,
        keywords: &[
            "revenue",
            "recurring revenue",
            "gross margin",
            "cash flow",
            "ebitda",
            "financial projections",
            "runway",
            "unit economics",
        ],
    },
    KeywordCategory {
        name: "market_analysis",
        weight: 1.2,
        min_hits: 1,
        keywords: &[
            "market size",
            "addressable market",
            "industry analysis",
            "competitive landscape",
            "market trends",
            "segmentation",
        ],
    },
    KeywordCategory {
        name: "product",
        weight: 1.0,
        min_hits: 1,
        keywords: &["product", "platform", "roadmap", "mvp", "integration", "user experience"],
    },
    KeywordCategory {
        name: "team",
        weight: 1.1,
        min_hits: 1,
        keywords: &["team", "founder", "ceo", "cto", "advisor", "leadership"],
    },
    KeywordCategory {
        name: "traction",
        weight: 1.0,
        min_hits: 1,
        keywords: &["traction", "customers", "retention", "churn", "active users", "partnership"],
    },
];

/// Light resume heuristic evaluated alongside layer 1. Presence-based,
/// summing to a 0-6 scale; it tags a file for the role classifier without
/// rejecting it.
pub const RESUME_HEURISTIC: &[(&str, u32)] = &[
    ("objective:", 2),
    ("work experience", 2),
    ("skills", 1),
    ("education", 1),
];

// Role-classifier vocabularies, matched by keyword presence.

pub const RESUME_VOCAB: &[&str] = &[
    "objective",
    "work experience",
    "skills",
    "education",
    "cv",
    "resume",
    "curriculum vitae",
    "employment history",
];

pub const PITCH_DECK_VOCAB: &[&str] = &[
    "pitch deck",
    "problem",
    "solution",
    "market size",
    "business model",
    "traction",
    "funding",
    "investors",
    "valuation",
    "competition",
];

pub const FINANCIAL_MODEL_VOCAB: &[&str] = &[
    "income statement",
    "balance sheet",
    "cash flow",
    "revenue projection",
    "ebitda",
    "gross margin",
    "assumptions",
    "forecast",
    "depreciation",
];

pub const BUSINESS_PLAN_VOCAB: &[&str] = &[
    "business plan",
    "executive summary",
    "mission statement",
    "operations plan",
    "marketing strategy",
    "swot",
    "milestones",
];

pub const MARKET_RESEARCH_VOCAB: &[&str] = &[
    "market research",
    "survey",
    "respondents",
    "industry analysis",
    "competitive analysis",
    "market trends",
    "focus group",
];
