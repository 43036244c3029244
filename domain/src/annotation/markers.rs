//! Marker grammar shared by the prompt builder and the parser.
//!
//! Tags are case-sensitive. Fields are separated by a literal `|` and
//! there is no escape sequence: a `|`, `[` or `]` inside a field is
//! indistinguishable from a delimiter.

/// The three marker kinds the model may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Correction,
    Alternative,
    Encouragement,
}

impl MarkerKind {
    pub const ALL: [MarkerKind; 3] = [
        MarkerKind::Correction,
        MarkerKind::Alternative,
        MarkerKind::Encouragement,
    ];

    /// Tag name without brackets
    pub fn tag(&self) -> &'static str {
        match self {
            MarkerKind::Correction => "CORRECTION",
            MarkerKind::Alternative => "ALTERNATIVE",
            MarkerKind::Encouragement => "ENCOURAGEMENT",
        }
    }

    pub fn open(&self) -> &'static str {
        match self {
            MarkerKind::Correction => "[CORRECTION]",
            MarkerKind::Alternative => "[ALTERNATIVE]",
            MarkerKind::Encouragement => "[ENCOURAGEMENT]",
        }
    }

    pub fn close(&self) -> &'static str {
        match self {
            MarkerKind::Correction => "[/CORRECTION]",
            MarkerKind::Alternative => "[/ALTERNATIVE]",
            MarkerKind::Encouragement => "[/ENCOURAGEMENT]",
        }
    }

    /// Syntax line exactly as the model is told to write it.
    pub fn syntax(&self) -> String {
        let body = match self {
            MarkerKind::Correction | MarkerKind::Alternative => "original|corrected|explanation",
            MarkerKind::Encouragement => "message",
        };
        format!("{}{}{}", self.open(), body, self.close())
    }

    /// Wrap `body` in this marker's tags.
    pub fn wrap(&self, body: &str) -> String {
        format!("{}{}{}", self.open(), body, self.close())
    }
}

/// True if `text` still contains any opening or closing tag.
pub fn contains_marker_tags(text: &str) -> bool {
    MarkerKind::ALL
        .iter()
        .any(|kind| text.contains(kind.open()) || text.contains(kind.close()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_lines_are_verbatim() {
        assert_eq!(
            MarkerKind::Correction.syntax(),
            "[CORRECTION]original|corrected|explanation[/CORRECTION]"
        );
        assert_eq!(
            MarkerKind::Alternative.syntax(),
            "[ALTERNATIVE]original|corrected|explanation[/ALTERNATIVE]"
        );
        assert_eq!(
            MarkerKind::Encouragement.syntax(),
            "[ENCOURAGEMENT]message[/ENCOURAGEMENT]"
        );
    }

    #[test]
    fn detects_stray_tags() {
        assert!(contains_marker_tags("oops [/CORRECTION]"));
        assert!(!contains_marker_tags("[correction] is lowercase"));
        assert!(!contains_marker_tags("plain text"));
    }
}
