//! Immutable per-language configuration.
//!
//! A [`LanguageTable`] is built once at startup and handed to whoever needs
//! language-specific wording: the prompt builder, the persona catalog and
//! the speech locale resolver. Nothing here is global state.

use serde::Serialize;

/// Locale used when a language has no entry in the table.
pub const FALLBACK_LOCALE: &str = "en-US";

/// Speaking rate handed to text-to-speech engines.
pub const DEFAULT_SPEAKING_RATE: f32 = 0.8;

/// Placeholder replaced with the learner's native language.
const NATIVE: &str = "{native}";

/// Placeholder replaced with a persona's name.
const NAME: &str = "{name}";

/// Everything language-specific the tutor needs for one target language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageProfile {
    /// Language name as users type it (e.g. "French")
    pub name: String,
    /// Register/script guidance for the tutor prompt; may contain `{native}`
    pub tutor_instruction: String,
    /// Guidance merged into user-authored persona prompts
    pub persona_instruction: String,
    /// BCP-47 locale for speech recognition and synthesis
    pub locale: String,
    /// Opening line for user-authored personas; contains `{name}`
    pub greeting: String,
}

impl LanguageProfile {
    fn new(
        name: &str,
        tutor_instruction: &str,
        persona_instruction: &str,
        locale: &str,
        greeting: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            tutor_instruction: tutor_instruction.to_string(),
            persona_instruction: persona_instruction.to_string(),
            locale: locale.to_string(),
            greeting: greeting.to_string(),
        }
    }
}

/// Speech capability settings for one conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechSettings {
    pub locale: String,
    pub rate: f32,
}

/// Lookup table of supported languages.
///
/// Lookups are by exact language name. Unknown languages never fail; they
/// get generic wording that names the language.
#[derive(Debug, Clone)]
pub struct LanguageTable {
    profiles: Vec<LanguageProfile>,
    speaking_rate: f32,
}

impl LanguageTable {
    /// Table with the built-in languages.
    pub fn builtin() -> Self {
        Self {
            profiles: builtin_profiles(),
            speaking_rate: DEFAULT_SPEAKING_RATE,
        }
    }

    /// Override the text-to-speech rate.
    pub fn with_speaking_rate(mut self, rate: f32) -> Self {
        self.speaking_rate = rate;
        self
    }

    /// Supported languages in display order.
    pub fn profiles(&self) -> &[LanguageProfile] {
        &self.profiles
    }

    pub fn get(&self, language: &str) -> Option<&LanguageProfile> {
        self.profiles.iter().find(|p| p.name == language)
    }

    pub fn is_supported(&self, language: &str) -> bool {
        self.get(language).is_some()
    }

    /// Tutor guidance for `language`, rendered for a learner whose first
    /// language is `native`.
    pub fn tutor_instruction(&self, language: &str, native: &str) -> String {
        match self.get(language) {
            Some(profile) => profile.tutor_instruction.replace(NATIVE, native),
            None => format!("You are helping users learn {}.", language),
        }
    }

    /// Guidance merged into a user-authored persona prompt.
    pub fn persona_instruction(&self, language: &str) -> String {
        match self.get(language) {
            Some(profile) => profile.persona_instruction.clone(),
            None => format!("You help people learn {}.", language),
        }
    }

    /// Speech locale for `language`, `en-US` when unknown.
    pub fn locale(&self, language: &str) -> &str {
        self.get(language)
            .map(|p| p.locale.as_str())
            .unwrap_or(FALLBACK_LOCALE)
    }

    pub fn speech_settings(&self, language: &str) -> SpeechSettings {
        SpeechSettings {
            locale: self.locale(language).to_string(),
            rate: self.speaking_rate,
        }
    }

    /// Opening line for a user-authored persona called `name`.
    pub fn greeting(&self, language: &str, name: &str) -> String {
        match self.get(language) {
            Some(profile) => profile.greeting.replace(NAME, name),
            None => format!("Hello! I'm {}. Let's practice {} together!", name, language),
        }
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_profiles() -> Vec<LanguageProfile> {
    vec![
        LanguageProfile::new(
            "French",
            "You are helping users learn French. Respond primarily in French with {native} explanations when needed.",
            "You respond primarily in French with English explanations when needed for corrections.",
            "fr-FR",
            "Bonjour ! Je suis {name}. Comment allez-vous aujourd'hui ? Qu'est-ce qui vous amène ici ?",
        ),
        LanguageProfile::new(
            "Spanish",
            "You are helping users learn Spanish. Respond primarily in Spanish with {native} explanations when needed.",
            "You respond primarily in Spanish with English explanations when needed for corrections.",
            "es-ES",
            "¡Hola! Soy {name}. ¿Cómo estás hoy? ¿De qué te gustaría hablar?",
        ),
        LanguageProfile::new(
            "German",
            "You are helping users learn German. Respond primarily in German with {native} explanations when needed.",
            "You respond primarily in German with English explanations when needed for corrections.",
            "de-DE",
            "Guten Tag! Ich bin {name}. Wie geht es Ihnen heute? Worüber möchten Sie sprechen?",
        ),
        LanguageProfile::new(
            "Italian",
            "You are helping users learn Italian. Respond primarily in Italian with {native} explanations when needed.",
            "You respond primarily in Italian with English explanations when needed for corrections.",
            "it-IT",
            "Ciao! Sono {name}. Come stai oggi? Di cosa ti piacerebbe parlare?",
        ),
        LanguageProfile::new(
            "Chinese",
            "You are helping users learn Chinese (Mandarin). Respond primarily in simplified Chinese with {native} explanations when needed. Include pinyin for pronunciation help when useful.",
            "You respond primarily in simplified Chinese with English explanations when needed for corrections. Include pinyin for pronunciation help when useful.",
            "zh-CN",
            "你好！我是{name}。你今天怎么样？你想聊什么？",
        ),
        LanguageProfile::new(
            "Japanese",
            "You are helping users learn Japanese. Respond primarily in Japanese with {native} explanations when needed. Use appropriate levels of politeness (keigo) and include furigana for difficult kanji when helpful.",
            "You respond primarily in Japanese with English explanations when needed for corrections. Include furigana for difficult kanji when helpful.",
            "ja-JP",
            "こんにちは！{name}です。今日はいかがですか？何について話したいですか？",
        ),
        LanguageProfile::new(
            "Korean",
            "You are helping users learn Korean. Respond primarily in Korean with {native} explanations when needed. Use appropriate levels of politeness and include romanization when helpful.",
            "You respond primarily in Korean with English explanations when needed for corrections. Use appropriate levels of politeness.",
            "ko-KR",
            "안녕하세요! 저는 {name}입니다. 오늘 어떠세요? 무엇에 대해 이야기하고 싶으세요?",
        ),
        LanguageProfile::new(
            "English",
            "You are helping users learn English. Respond in clear, natural English and use {native} only when an explanation would otherwise be lost.",
            "You respond in English and help learners improve their English skills.",
            "en-GB",
            "Hello! I'm {name}. How are you today? What would you like to talk about?",
        ),
    ]
}
