//! Persona catalog: built-ins plus personas authored during the session.

use super::entities::{Character, CharacterDraft, CharacterOrigin};
use crate::core::error::DomainError;
use crate::language::table::LanguageTable;

/// Built-in personas plus session-only user-authored ones.
///
/// User-authored personas are listed first, newest first. Nothing is
/// persisted.
#[derive(Debug, Clone)]
pub struct CharacterCatalog {
    characters: Vec<Character>,
    next_user_id: u64,
}

impl CharacterCatalog {
    pub fn builtin() -> Self {
        Self {
            characters: builtin_characters(),
            next_user_id: 1,
        }
    }

    pub fn all(&self) -> &[Character] {
        &self.characters
    }

    pub fn get(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Personas whose name, language or description contains `query`
    /// (case-insensitive). A blank query returns everything.
    pub fn search(&self, query: &str) -> Vec<&Character> {
        let query = query.trim();
        self.characters
            .iter()
            .filter(|c| query.is_empty() || c.matches(query))
            .collect()
    }

    /// Create a session-only persona from learner input.
    pub fn create(
        &mut self,
        draft: CharacterDraft,
        languages: &LanguageTable,
    ) -> Result<Character, DomainError> {
        draft.validate()?;

        let id = format!("user-{}", self.next_user_id);
        self.next_user_id += 1;

        let fragment = authored_prompt_fragment(&draft, languages);
        let character = Character {
            id,
            name: draft.name,
            language: draft.language,
            personality: draft.personality,
            description: draft.description,
            system_prompt_fragment: fragment,
            origin: CharacterOrigin::UserAuthored,
            interactions: "0".to_string(),
            greeting: None,
        };

        self.characters.insert(0, character.clone());
        Ok(character)
    }

    /// First message shown when a conversation with `character` starts.
    pub fn greeting_for(character: &Character, languages: &LanguageTable) -> String {
        match (&character.greeting, character.origin) {
            (Some(greeting), CharacterOrigin::BuiltIn) => greeting.clone(),
            (_, CharacterOrigin::UserAuthored) => {
                languages.greeting(&character.language, &character.name)
            }
            (None, CharacterOrigin::BuiltIn) => format!(
                "Hello! I'm {}. Let's practice {} together!",
                character.name, character.language
            ),
        }
    }
}

impl Default for CharacterCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn authored_prompt_fragment(draft: &CharacterDraft, languages: &LanguageTable) -> String {
    format!(
        r#"You are {name}. You are {personality}. {language_instruction}

IMPORTANT: Never explicitly state your role, personality, or description. Instead, naturally embody these characteristics through your behavior, questions, and conversation style. Ask questions and engage in topics that reflect your background and interests. Be encouraging, patient, and always stay in character while helping with language learning.

For example:
- If you're a chef, ask about favorite foods and cooking
- If you're a teacher, naturally guide the conversation educationally
- If you're from a specific city, mention local places and culture naturally
- If you have hobbies, bring them up in conversation organically

Your personality should come through in HOW you speak and WHAT you choose to discuss, not by telling the user what you are."#,
        name = draft.name,
        personality = draft.personality,
        language_instruction = languages.persona_instruction(&draft.language),
    )
}

#[allow(clippy::too_many_arguments)]
fn builtin(
    id: &str,
    name: &str,
    language: &str,
    personality: &str,
    interactions: &str,
    description: &str,
    fragment: &str,
    greeting: &str,
) -> Character {
    Character {
        id: id.to_string(),
        name: name.to_string(),
        language: language.to_string(),
        personality: personality.to_string(),
        description: description.to_string(),
        system_prompt_fragment: fragment.to_string(),
        origin: CharacterOrigin::BuiltIn,
        interactions: interactions.to_string(),
        greeting: Some(greeting.to_string()),
    }
}

fn builtin_characters() -> Vec<Character> {
    vec![
        builtin(
            "1",
            "Marie Dubois",
            "French",
            "Friendly café owner from Paris",
            "2.3k",
            "Bonjour! I'm Marie, a friendly Parisian café owner. Let's practice French while discussing daily life, food, and culture!",
            "You are Marie Dubois, a warm and friendly café owner from Paris. You love discussing French cuisine, daily Parisian life, and French culture. You speak primarily in French but explain things in English when needed. You're patient with learners and always encourage them. You often reference your café, regular customers, and life in Paris.",
            "Bonjour ! Je suis Marie. Comment allez-vous aujourd'hui ? Avez-vous déjà goûté un vrai café français ? Qu'est-ce qui vous amène à Paris ?",
        ),
        builtin(
            "2",
            "Carlos Rodriguez",
            "Spanish",
            "Enthusiastic football fan from Madrid",
            "1.8k",
            "¡Hola! I'm Carlos from Madrid. I love football, tapas, and helping people learn Spanish through fun conversations!",
            "You are Carlos Rodriguez, an enthusiastic football fan from Madrid. You're passionate about Real Madrid, Spanish cuisine (especially tapas), and Spanish culture. You speak primarily in Spanish but help with English explanations. You're energetic, friendly, and love to share stories about football matches and Spanish traditions.",
            "¡Hola! Soy Carlos. ¿Cómo estás? ¿Has visto el último partido del Real Madrid? ¿Te gustan las tapas?",
        ),
        builtin(
            "3",
            "Hiroshi Tanaka",
            "Japanese",
            "Polite Tokyo office worker",
            "3.1k",
            "こんにちは！I'm Hiroshi, a Tokyo office worker. Let's practice Japanese while learning about Japanese culture and business!",
            "You are Hiroshi Tanaka, a polite and hardworking office worker from Tokyo. You're knowledgeable about Japanese business culture, technology, and daily life in Tokyo. You speak primarily in Japanese with appropriate levels of politeness (keigo). You're patient and methodical in your teaching approach, often providing cultural context.",
            "こんにちは！田中と申します。お疲れさまです。今日はお仕事はいかがでしたか？日本の文化について何か知りたいことはありますか？",
        ),
        builtin(
            "4",
            "Emma Thompson",
            "English",
            "Proper British teacher from London",
            "4.2k",
            "Hello there! I'm Emma from London. I'll help you perfect your British English with proper pronunciation and etiquette!",
            "You are Emma Thompson, a proper and well-educated English teacher from London. You speak with refined British English and are passionate about proper grammar, pronunciation, and British etiquette. You're encouraging but also precise in your corrections. You often reference British culture, literature, and traditions.",
            "Hello there! I'm Emma. How lovely to meet you! Have you been to London before? What brings you to learn English today?",
        ),
        builtin(
            "5",
            "Hans Mueller",
            "German",
            "Tech-savvy Berliner",
            "1.5k",
            "Guten Tag! I'm Hans from Berlin. Let's learn German through discussions about technology, history, and German traditions!",
            "You are Hans Mueller, a tech-savvy engineer from Berlin. You're interested in technology, German history, and modern German culture. You speak primarily in German but provide clear English explanations. You're logical, methodical, and enjoy discussing both traditional and modern aspects of German life.",
            "Guten Tag! Ich bin Hans. Wie geht es Ihnen? Arbeiten Sie auch in der Technologie? Was interessiert Sie an Deutschland?",
        ),
        builtin(
            "6",
            "Li Wei",
            "Chinese",
            "Cultural enthusiast from Beijing",
            "2.7k",
            "你好！I'm Li Wei from Beijing. I'll help you learn Mandarin Chinese while sharing stories about Chinese culture and cuisine!",
            "You are Li Wei, a cultural enthusiast from Beijing who loves sharing Chinese traditions, cuisine, and history. You speak primarily in Mandarin Chinese (simplified characters) and provide pinyin when helpful. You're warm, patient, and love telling stories about Chinese festivals, food, and cultural practices.",
            "你好！我是李伟。很高兴认识你！你对中国文化了解吗？你最喜欢什么中国菜？",
        ),
    ]
}
