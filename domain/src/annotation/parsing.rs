//! Marker extraction from assistant replies.
//!
//! Pure text processing over untrusted model output: nothing here fails.
//! Anything that does not match a complete marker is left in the display
//! text as ordinary prose.
//!
//! # Rules
//!
//! | Marker | Matches | Fields |
//! |--------|---------|--------|
//! | `[ENCOURAGEMENT]` | first only, may span lines | inner text, trimmed |
//! | `[CORRECTION]` | all, single line | verbatim, split on the first two `\|` |
//! | `[ALTERNATIVE]` | all, single line | verbatim, split on the first two `\|` |
//!
//! Corrections are returned before alternatives regardless of where they
//! appear in the reply.

use super::entities::{Correction, CorrectionKind, ParsedReply};
use regex::Regex;
use std::sync::LazyLock;

static ENCOURAGEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\[ENCOURAGEMENT\](.*?)\[/ENCOURAGEMENT\]").expect("valid marker pattern")
});

static CORRECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[CORRECTION\](.*?)\|(.*?)\|(.*?)\[/CORRECTION\]").expect("valid marker pattern")
});

static ALTERNATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[ALTERNATIVE\](.*?)\|(.*?)\|(.*?)\[/ALTERNATIVE\]")
        .expect("valid marker pattern")
});

static CORRECTION_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[CORRECTION\].*?\[/CORRECTION\]").expect("valid marker pattern")
});

static ALTERNATIVE_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[ALTERNATIVE\].*?\[/ALTERNATIVE\]").expect("valid marker pattern")
});

static ENCOURAGEMENT_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\[ENCOURAGEMENT\].*?\[/ENCOURAGEMENT\]").expect("valid marker pattern")
});

/// Parse a completed assistant reply into display text and annotations.
///
/// # Examples
///
/// ```
/// use parley_domain::annotation::parsing::parse_annotations;
///
/// let reply = parse_annotations(
///     "Très bien ! [CORRECTION]Je manges|Je mange|verb agreement[/CORRECTION] \
///      [ENCOURAGEMENT] Keep going! [/ENCOURAGEMENT]",
/// );
/// assert_eq!(reply.display_text, "Très bien !");
/// assert_eq!(reply.corrections[0].corrected, "Je mange");
/// assert_eq!(reply.encouragement.as_deref(), Some("Keep going!"));
/// ```
pub fn parse_annotations(raw: &str) -> ParsedReply {
    let encouragement = ENCOURAGEMENT
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string());

    let mut corrections = collect(&CORRECTION, raw, CorrectionKind::Correction);
    corrections.extend(collect(&ALTERNATIVE, raw, CorrectionKind::Alternative));

    ParsedReply {
        display_text: strip_annotations(raw),
        corrections,
        encouragement,
    }
}

/// Remove every marker span and trim, e.g. before handing text to speech.
pub fn strip_annotations(raw: &str) -> String {
    let text = CORRECTION_SPAN.replace_all(raw, "");
    let text = ALTERNATIVE_SPAN.replace_all(&text, "");
    let text = ENCOURAGEMENT_SPAN.replace_all(&text, "");
    text.trim().to_string()
}

fn collect(pattern: &Regex, raw: &str, kind: CorrectionKind) -> Vec<Correction> {
    pattern
        .captures_iter(raw)
        .map(|caps| Correction {
            original: caps[1].to_string(),
            corrected: caps[2].to_string(),
            explanation: caps[3].to_string(),
            kind,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::markers::contains_marker_tags;

    // ==================== Encouragement ====================

    #[test]
    fn test_encouragement_is_trimmed() {
        let reply = parse_annotations("Bien ! [ENCOURAGEMENT]  Great job!  [/ENCOURAGEMENT]");
        assert_eq!(reply.encouragement.as_deref(), Some("Great job!"));
        assert_eq!(reply.display_text, "Bien !");
    }

    #[test]
    fn test_encouragement_spans_lines() {
        let reply = parse_annotations("Hola\n[ENCOURAGEMENT]Muy bien,\nsigue así[/ENCOURAGEMENT]");
        assert_eq!(reply.encouragement.as_deref(), Some("Muy bien,\nsigue así"));
        assert_eq!(reply.display_text, "Hola");
    }

    #[test]
    fn test_only_first_encouragement_is_kept() {
        let reply = parse_annotations(
            "[ENCOURAGEMENT]first[/ENCOURAGEMENT] ok [ENCOURAGEMENT]second[/ENCOURAGEMENT]",
        );
        assert_eq!(reply.encouragement.as_deref(), Some("first"));
        assert_eq!(reply.display_text, "ok");
    }

    // ==================== Corrections ====================

    #[test]
    fn test_single_correction_fields_verbatim() {
        let reply =
            parse_annotations("[CORRECTION] Je manges | Je mange |verb agreement[/CORRECTION]");
        assert_eq!(
            reply.corrections,
            vec![Correction::correction(
                " Je manges ",
                " Je mange ",
                "verb agreement"
            )]
        );
        assert_eq!(reply.display_text, "");
    }

    #[test]
    fn test_corrections_before_alternatives() {
        let reply = parse_annotations(
            "[ALTERNATIVE]Salut|Bonjour|more formal[/ALTERNATIVE] \
             text \
             [CORRECTION]je suis allé|je suis allée|agreement[/CORRECTION]",
        );
        assert_eq!(reply.corrections.len(), 2);
        assert_eq!(reply.corrections[0].kind, CorrectionKind::Correction);
        assert_eq!(reply.corrections[1].kind, CorrectionKind::Alternative);
        assert_eq!(reply.display_text, "text");
    }

    #[test]
    fn test_multiple_corrections_in_document_order() {
        let reply = parse_annotations(
            "[CORRECTION]a|b|c[/CORRECTION] [CORRECTION]d|e|f[/CORRECTION]",
        );
        let originals: Vec<_> = reply.corrections.iter().map(|c| c.original.as_str()).collect();
        assert_eq!(originals, vec!["a", "d"]);
    }

    #[test]
    fn test_extra_pipe_lands_in_explanation() {
        let reply = parse_annotations("[CORRECTION]a|b|c|d[/CORRECTION]");
        assert_eq!(reply.corrections[0].explanation, "c|d");
    }

    #[test]
    fn test_correction_without_enough_fields_is_not_extracted_but_stripped() {
        let reply = parse_annotations("Hi [CORRECTION]only-one-field[/CORRECTION] there");
        assert!(reply.corrections.is_empty());
        assert_eq!(reply.display_text, "Hi  there");
    }

    // ==================== Malformed input ====================

    #[test]
    fn test_unterminated_marker_passes_through() {
        let raw = "Bonjour [CORRECTION]a|b|c";
        let reply = parse_annotations(raw);
        assert!(reply.corrections.is_empty());
        assert_eq!(reply.display_text, raw);
    }

    #[test]
    fn test_lowercase_tags_are_plain_text() {
        let raw = "[correction]a|b|c[/correction]";
        let reply = parse_annotations(raw);
        assert!(reply.corrections.is_empty());
        assert_eq!(reply.display_text, raw);
    }

    // ==================== Properties ====================

    #[test]
    fn test_plain_text_is_trimmed_only() {
        let reply = parse_annotations("  Qu'est-ce que vous aimez manger ?\n");
        assert_eq!(reply.display_text, "Qu'est-ce que vous aimez manger ?");
        assert!(reply.corrections.is_empty());
        assert!(reply.encouragement.is_none());
    }

    #[test]
    fn test_display_text_has_no_marker_tags() {
        let raw = "Très bien ! [CORRECTION]Je mange du pain|Je mange du pain|correct![/CORRECTION] \
                   [ALTERNATIVE]J'aime|J'adore|stronger[/ALTERNATIVE] \
                   [ENCOURAGEMENT]Great job mixing French naturally![/ENCOURAGEMENT] \
                   Qu'est-ce que vous aimez manger d'autre ?";
        let reply = parse_annotations(raw);
        assert!(!contains_marker_tags(&reply.display_text));
        assert_eq!(
            reply.display_text,
            "Très bien !    Qu'est-ce que vous aimez manger d'autre ?"
        );
        assert_eq!(reply.corrections.len(), 2);
    }

    #[test]
    fn test_reparsing_display_text_is_stable() {
        let first = parse_annotations(
            "[ENCOURAGEMENT]Bravo[/ENCOURAGEMENT] Ciao! [CORRECTION]io sono|sono|subject drop[/CORRECTION]",
        );
        let second = parse_annotations(&first.display_text);
        assert_eq!(second.display_text, first.display_text);
        assert!(second.corrections.is_empty());
        assert!(second.encouragement.is_none());
    }

    #[test]
    fn test_strip_annotations_matches_display_text() {
        let raw = "A [CORRECTION]x|y|z[/CORRECTION] B";
        assert_eq!(strip_annotations(raw), parse_annotations(raw).display_text);
    }
}
