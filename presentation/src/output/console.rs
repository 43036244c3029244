//! Console output formatter for tutor replies and catalog listings

use colored::Colorize;
use parley_domain::{
    Character, Conversation, Correction, CorrectionKind, LanguageTable, Message, ParsedReply,
    parse_annotations,
};
use regex::RegexBuilder;
use std::ops::Range;

/// Formats chat output for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Tutor reply: speaker line, cleaned text, then encouragement.
    pub fn format_reply(speaker: &str, reply: &ParsedReply) -> String {
        let mut output = format!("{}\n", speaker.yellow().bold());

        if !reply.display_text.is_empty() {
            output.push_str(&reply.display_text);
            output.push('\n');
        }

        if let Some(encouragement) = &reply.encouragement {
            output.push_str(&format!("{} {}\n", "★".green(), encouragement.green()));
        }

        output
    }

    /// Feedback block attached to the learner's message.
    pub fn format_corrections(corrections: &[Correction]) -> String {
        if corrections.is_empty() {
            return String::new();
        }

        let mut output = format!("{}\n", "Feedback on your message:".cyan().bold());
        for correction in corrections {
            output.push_str(&Self::format_correction(correction));
        }
        output
    }

    fn format_correction(correction: &Correction) -> String {
        let label = match correction.kind {
            CorrectionKind::Correction => "correction".red().bold(),
            CorrectionKind::Alternative => "more natural".blue().bold(),
        };
        let mut line = format!(
            "  {} {} {} {}\n",
            label,
            correction.original.strikethrough(),
            "→".dimmed(),
            correction.corrected.green()
        );
        if !correction.explanation.trim().is_empty() {
            line.push_str(&format!("    {}\n", correction.explanation.dimmed()));
        }
        line
    }

    /// Whole conversation, corrections shown under the learner messages.
    pub fn format_transcript(conversation: &Conversation, tutor: &str) -> String {
        if conversation.is_empty() {
            return format!("{}\n", "(no messages yet)".dimmed());
        }

        let mut output = String::new();
        for message in conversation.messages() {
            output.push_str(&Self::format_message(message, tutor));
            output.push('\n');
        }
        output
    }

    fn format_message(message: &Message, tutor: &str) -> String {
        if message.is_user() {
            let content = Self::highlight_corrections(&message.content, message.corrections());
            let mut output = format!("{} {}\n", "You:".bold(), content);
            output.push_str(&Self::format_corrections(message.corrections()));
            output
        } else {
            Self::format_reply(tutor, &parse_annotations(&message.content))
        }
    }

    /// Learner text with each corrected phrase underlined in its kind's colour.
    fn highlight_corrections(content: &str, corrections: &[Correction]) -> String {
        let mut output = String::new();
        let mut cursor = 0;
        for (span, kind) in correction_spans(content, corrections) {
            output.push_str(&content[cursor..span.start]);
            let phrase = &content[span.clone()];
            let styled = match kind {
                CorrectionKind::Correction => phrase.red().underline(),
                CorrectionKind::Alternative => phrase.blue().underline(),
            };
            output.push_str(&styled.to_string());
            cursor = span.end;
        }
        output.push_str(&content[cursor..]);
        output
    }

    /// One-line-per-persona catalog listing.
    pub fn format_characters(characters: &[Character]) -> String {
        if characters.is_empty() {
            return format!("{}\n", "No characters match.".dimmed());
        }

        let mut output = String::new();
        for character in characters {
            let tag = if character.is_user_authored() {
                " (yours)".magenta().to_string()
            } else {
                String::new()
            };
            output.push_str(&format!(
                "  {:>7}  {} {}{}\n           {}\n",
                character.id.cyan(),
                character.name.bold(),
                format!("[{}]", character.language).yellow(),
                tag,
                character.personality.dimmed()
            ));
        }
        output
    }

    /// Supported languages with their speech locale.
    pub fn format_languages(languages: &LanguageTable) -> String {
        let mut output = String::new();
        for profile in languages.profiles() {
            output.push_str(&format!(
                "  {:<10} {}\n",
                profile.name.bold(),
                profile.locale.dimmed()
            ));
        }
        output
    }

    pub fn format_error(message: &str) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }

    pub fn header(title: &str) -> String {
        let line = "─".repeat(title.chars().count() + 4);
        format!(
            "╭{}╮\n│  {}  │\n╰{}╯\n",
            line,
            title.cyan().bold(),
            line
        )
    }
}

/// Byte ranges of `content` quoted by corrections, sorted and non-overlapping.
///
/// Matching ignores case and prefers whole words. Scripts without word
/// breaks fall back to a plain substring match.
fn correction_spans(
    content: &str,
    corrections: &[Correction],
) -> Vec<(Range<usize>, CorrectionKind)> {
    let mut spans: Vec<(Range<usize>, CorrectionKind)> = Vec::new();
    for correction in corrections {
        let original = correction.original.trim();
        if original.is_empty() {
            continue;
        }
        let escaped = regex::escape(original);
        let found = [format!(r"\b{}\b", escaped), escaped]
            .iter()
            .filter_map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .ok()
            })
            .find_map(|re| re.find(content).map(|m| m.range()));

        if let Some(range) = found {
            let overlaps = spans
                .iter()
                .any(|(taken, _)| range.start < taken.end && taken.start < range.end);
            if !overlaps {
                spans.push((range, correction.kind));
            }
        }
    }
    spans.sort_by_key(|(range, _)| range.start);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_domain::CharacterCatalog;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_format_reply_shows_clean_text_and_encouragement() {
        plain();
        let reply = parse_annotations(
            "Très bien ! [CORRECTION]a|b|c[/CORRECTION] [ENCOURAGEMENT]Bravo ![/ENCOURAGEMENT]",
        );
        let output = ConsoleFormatter::format_reply("Marie Dubois", &reply);
        assert_eq!(output, "Marie Dubois\nTrès bien !\n★ Bravo !\n");
    }

    #[test]
    fn test_format_corrections() {
        plain();
        let output = ConsoleFormatter::format_corrections(&[
            Correction::correction("Je manges", "Je mange", "verb agreement"),
            Correction::alternative("Salut", "Bonjour", ""),
        ]);
        assert!(output.starts_with("Feedback on your message:\n"));
        assert!(output.contains("correction Je manges → Je mange\n    verb agreement\n"));
        assert!(output.contains("more natural Salut → Bonjour\n"));
        assert!(ConsoleFormatter::format_corrections(&[]).is_empty());
    }

    #[test]
    fn test_transcript_places_feedback_under_learner_message() {
        plain();
        let mut conversation = Conversation::new("French", "English");
        conversation.reset(None, "French", "English", "Bonjour !");
        conversation.push_user("Je manges").unwrap();
        conversation
            .complete_assistant_reply("Oui ! [CORRECTION]Je manges|Je mange|agreement[/CORRECTION]");

        let output = ConsoleFormatter::format_transcript(&conversation, "Tutor");
        let you = output.find("You: Je manges").unwrap();
        let feedback = output.find("Feedback on your message:").unwrap();
        let reply = output.find("Oui !").unwrap();
        assert!(you < feedback && feedback < reply);
        assert!(!output.contains("[CORRECTION]"));
    }

    #[test]
    fn test_correction_spans_locate_quoted_phrases() {
        let content = "hier je suis allé au marché, salut";
        let spans = correction_spans(
            content,
            &[
                Correction::alternative("Salut", "Bonjour", ""),
                Correction::correction("Je suis allé", "Je suis allée", "agreement"),
                Correction::correction("absent", "ailleurs", ""),
                Correction::correction("suis", "étais", "overlaps the first match"),
            ],
        );

        assert_eq!(spans.len(), 2);
        assert_eq!(&content[spans[0].0.clone()], "je suis allé");
        assert_eq!(spans[0].1, CorrectionKind::Correction);
        assert_eq!(&content[spans[1].0.clone()], "salut");
        assert_eq!(spans[1].1, CorrectionKind::Alternative);
    }

    #[test]
    fn test_correction_spans_prefer_whole_words() {
        let content = "une pomme et un pain";
        let spans = correction_spans(content, &[Correction::correction("un", "une", "")]);
        assert_eq!(spans[0].0, 13..15);

        let content = "私は学生です";
        let spans = correction_spans(content, &[Correction::correction("学生", "先生", "")]);
        assert_eq!(&content[spans[0].0.clone()], "学生");
    }

    #[test]
    fn test_format_characters_lists_ids() {
        plain();
        let catalog = CharacterCatalog::builtin();
        let output = ConsoleFormatter::format_characters(catalog.all());
        assert!(output.contains("Marie Dubois [French]"));
        assert!(output.contains("Li Wei [Chinese]"));
        assert_eq!(
            ConsoleFormatter::format_characters(&[]),
            "No characters match.\n"
        );
    }

    #[test]
    fn test_format_languages() {
        plain();
        let output = ConsoleFormatter::format_languages(&LanguageTable::builtin());
        assert!(output.contains("Japanese"));
        assert!(output.contains("ja-JP"));
    }
}
