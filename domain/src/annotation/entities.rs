//! Annotation entities

use serde::{Deserialize, Serialize};

/// Whether a flagged phrase was wrong or merely phrased differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionKind {
    /// An error fix
    Correction,
    /// A valid but stylistically different phrasing
    Alternative,
}

impl CorrectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectionKind::Correction => "correction",
            CorrectionKind::Alternative => "alternative",
        }
    }
}

impl std::fmt::Display for CorrectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single discrepancy between what the learner wrote and a suggested form.
///
/// Fields are taken verbatim from the model output. `original` is usually a
/// substring of the learner's message but nothing guarantees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub original: String,
    pub corrected: String,
    pub explanation: String,
    #[serde(rename = "type")]
    pub kind: CorrectionKind,
}

impl Correction {
    pub fn correction(
        original: impl Into<String>,
        corrected: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            original: original.into(),
            corrected: corrected.into(),
            explanation: explanation.into(),
            kind: CorrectionKind::Correction,
        }
    }

    pub fn alternative(
        original: impl Into<String>,
        corrected: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            original: original.into(),
            corrected: corrected.into(),
            explanation: explanation.into(),
            kind: CorrectionKind::Alternative,
        }
    }

    pub fn is_alternative(&self) -> bool {
        self.kind == CorrectionKind::Alternative
    }
}

/// Structured result of parsing one assistant reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedReply {
    /// Reply text with all recognised marker spans removed, trimmed
    pub display_text: String,
    /// `[CORRECTION]` matches in document order, then `[ALTERNATIVE]` matches
    pub corrections: Vec<Correction>,
    /// Inner text of the first `[ENCOURAGEMENT]` span, trimmed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encouragement: Option<String>,
}

impl ParsedReply {
    pub fn has_annotations(&self) -> bool {
        !self.corrections.is_empty() || self.encouragement.is_some()
    }
}
