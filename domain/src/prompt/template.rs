//! Tutor system prompt

use crate::annotation::markers::MarkerKind;
use crate::language::table::LanguageTable;

/// Builds the system instruction that encodes the tutoring contract.
///
/// The marker syntax lines come from [`MarkerKind::syntax`], the same
/// source the parser is written against.
pub struct TutorPromptBuilder<'a> {
    languages: &'a LanguageTable,
}

impl<'a> TutorPromptBuilder<'a> {
    pub fn new(languages: &'a LanguageTable) -> Self {
        Self { languages }
    }

    /// System prompt for a learner practicing `target` whose first language
    /// is `native`. Unsupported targets get generic wording naming the
    /// language.
    pub fn build_system_prompt(
        &self,
        target: &str,
        native: &str,
        persona_fragment: Option<&str>,
    ) -> String {
        let mut prompt = format!(
            "You are a friendly {target} language learning assistant. {instruction}\n",
            target = target,
            instruction = self.languages.tutor_instruction(target, native),
        );

        prompt.push_str(&format!(
            r#"
Key behaviors:
1. Always respond primarily in {target}, but use {native} explanations when needed
2. IMPORTANT: When users make mistakes, gently correct them using this format: {correction}
3. When the user's phrasing is correct but could sound more natural, suggest it using this format: {alternative}
4. Provide encouragement using this format: {encouragement}
5. Allow users to mix {target} and {native} - this is normal for learners
6. Ask follow-up questions to keep the conversation going
7. Praise good usage and effort
8. Provide cultural context when relevant
9. Keep responses conversational and not too long
10. For Asian languages, be patient with character recognition and provide romanization/pinyin when helpful
11. Adapt to the user's level - start simple and gradually increase complexity
12. ALWAYS analyze the user's previous message for potential improvements and provide at least one correction or encouragement when warranted

Example response format:
"Très bien ! {example_correction} {example_encouragement} Qu'est-ce que vous aimez manger d'autre ?"
"#,
            target = target,
            native = native,
            correction = MarkerKind::Correction.syntax(),
            alternative = MarkerKind::Alternative.syntax(),
            encouragement = MarkerKind::Encouragement.syntax(),
            example_correction = MarkerKind::Correction.wrap(
                "Je mange du pain|Je mange du pain|This is actually correct - \"du pain\" works well here!"
            ),
            example_encouragement =
                MarkerKind::Encouragement.wrap("Great job mixing French naturally!"),
        ));

        if let Some(fragment) = persona_fragment.map(str::trim).filter(|f| !f.is_empty()) {
            prompt.push_str("\nCharacter:\n");
            prompt.push_str(fragment);
            prompt.push('\n');
        }

        prompt.push_str(
            "\nRemember: Be patient, encouraging, and focus on communication over perfection. \
             Always provide helpful corrections to help users improve.",
        );

        prompt
    }
}
