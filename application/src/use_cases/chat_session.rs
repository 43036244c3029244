//! Chat Session use case
//!
//! Owns one learner conversation and runs each reply from prompt to
//! reconciled corrections.
//!
//! # Stale replies
//!
//! Switching persona or language replaces the conversation. A reply that
//! was requested before the switch must not land in the new one, so:
//!
//! - the switch cancels the in-flight [`CancellationToken`], which stops
//!   the stream and drops the upstream request;
//! - a reply that finishes anyway is only applied if the conversation
//!   generation captured at send time is still current.
//!
//! Session state sits behind a `Mutex` that is never held across an
//! `.await`.

use crate::config::ChatConfig;
use crate::ports::llm_gateway::{CompletionRequest, GatewayError, LlmGateway};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use parley_domain::{
    Character, CharacterCatalog, CharacterDraft, CompletedReply, Conversation, DomainError,
    LanguageTable, SpeechSettings, StreamEvent, TutorPromptBuilder,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur during a chat session
#[derive(Error, Debug)]
pub enum ChatSessionError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),
}

/// What happened to a sent message's reply
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The reply was appended and reconciled.
    Delivered(CompletedReply),
    /// The conversation changed or the request was cancelled first.
    Discarded,
}

impl SendOutcome {
    pub fn is_discarded(&self) -> bool {
        matches!(self, SendOutcome::Discarded)
    }
}

struct SessionState {
    catalog: CharacterCatalog,
    conversation: Conversation,
    in_flight: CancellationToken,
}

impl SessionState {
    fn current_character(&self) -> Option<&Character> {
        self.conversation
            .character_id()
            .and_then(|id| self.catalog.get(id))
    }

    /// Cancel whatever is streaming and arm a fresh token.
    fn rearm(&mut self) {
        self.in_flight.cancel();
        self.in_flight = CancellationToken::new();
    }
}

/// Use case for an interactive tutoring conversation
pub struct ChatSessionUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    languages: Arc<LanguageTable>,
    config: ChatConfig,
    state: Mutex<SessionState>,
}

impl<G: LlmGateway + 'static> ChatSessionUseCase<G> {
    pub fn new(gateway: Arc<G>, languages: Arc<LanguageTable>, config: ChatConfig) -> Self {
        let conversation = Conversation::new(&config.target_language, &config.native_language);
        Self {
            gateway,
            languages,
            config,
            state: Mutex::new(SessionState {
                catalog: CharacterCatalog::builtin(),
                conversation,
                in_flight: CancellationToken::new(),
            }),
        }
    }

    pub fn with_catalog(self, catalog: CharacterCatalog) -> Self {
        self.state().catalog = catalog;
        self
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current conversation.
    pub fn conversation(&self) -> Conversation {
        self.state().conversation.clone()
    }

    pub fn current_character(&self) -> Option<Character> {
        self.state().current_character().cloned()
    }

    /// Personas matching `query`, all of them for a blank query.
    pub fn characters(&self, query: &str) -> Vec<Character> {
        self.state()
            .catalog
            .search(query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Voice settings for reading replies in the current target language.
    pub fn speech_settings(&self) -> SpeechSettings {
        let state = self.state();
        self.languages
            .speech_settings(state.conversation.target_language())
    }

    /// Start a fresh conversation with persona `id`.
    pub fn select_character(&self, id: &str) -> Result<Character, ChatSessionError> {
        let mut state = self.state();
        let character = state
            .catalog
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::CharacterNotFound(id.to_string()))?;

        let native = state.conversation.native_language().to_string();
        let greeting = CharacterCatalog::greeting_for(&character, &self.languages);

        state.rearm();
        state.conversation.reset(
            Some(character.id.clone()),
            &character.language,
            native,
            greeting,
        );

        info!(character = %character.name, language = %character.language, "Character selected");
        Ok(character)
    }

    /// Start a fresh conversation in another language pair.
    ///
    /// The current persona is kept only if it speaks `target`.
    pub fn set_languages(&self, target: &str, native: &str) {
        let mut state = self.state();
        let character = state
            .current_character()
            .filter(|c| c.language == target)
            .cloned();

        let greeting = match &character {
            Some(c) => CharacterCatalog::greeting_for(c, &self.languages),
            None => self.languages.greeting(target, "Parley"),
        };

        state.rearm();
        state
            .conversation
            .reset(character.map(|c| c.id), target, native, greeting);

        info!(target, native, "Languages changed");
    }

    /// Author a session-only persona. It is not selected automatically.
    pub fn create_character(&self, draft: CharacterDraft) -> Result<Character, ChatSessionError> {
        let character = self.state().catalog.create(draft, &self.languages)?;
        info!(id = %character.id, name = %character.name, "Character created");
        Ok(character)
    }

    /// Abandon the reply currently streaming, if any.
    pub fn cancel(&self) {
        self.state().rearm();
        debug!("In-flight reply cancelled");
    }

    /// Send a learner message with no progress reporting
    pub async fn send(&self, text: &str) -> Result<SendOutcome, ChatSessionError> {
        self.send_with_progress(text, &NoProgress).await
    }

    /// Send a learner message and stream the tutor's reply through `progress`.
    pub async fn send_with_progress(
        &self,
        text: &str,
        progress: &dyn ProgressNotifier,
    ) -> Result<SendOutcome, ChatSessionError> {
        let (request, generation, token, character_name) = {
            let mut state = self.state();
            state.conversation.push_user(text)?;

            let character = state.current_character();
            let character_name = character.map(|c| c.name.clone());
            let fragment = character.map(|c| c.system_prompt_fragment.clone());

            let conversation = &state.conversation;
            let system_prompt = TutorPromptBuilder::new(&self.languages).build_system_prompt(
                conversation.target_language(),
                conversation.native_language(),
                fragment.as_deref(),
            );
            let request = CompletionRequest::new(
                self.config.model.clone(),
                system_prompt,
                conversation.history(),
            );

            (
                request,
                conversation.generation(),
                state.in_flight.clone(),
                character_name,
            )
        };

        debug!(generation, turns = request.messages.len(), "Requesting reply");
        progress.on_reply_start(character_name.as_deref());

        let mut stream = match self.gateway.stream_completion(request).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Reply request failed: {}", e);
                progress.on_reply_end(None);
                return Err(e.into());
            }
        };

        let mut raw = String::new();
        loop {
            let event = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(generation, "Reply cancelled while streaming");
                    progress.on_reply_end(None);
                    return Ok(SendOutcome::Discarded);
                }
                event = stream.recv() => event,
            };

            match event {
                Some(StreamEvent::Delta(chunk)) => {
                    progress.on_reply_chunk(&chunk);
                    raw.push_str(&chunk);
                }
                Some(StreamEvent::Completed(text)) => {
                    if raw.is_empty() {
                        raw = text;
                    }
                    break;
                }
                Some(StreamEvent::Error(e)) => {
                    warn!("Reply stream failed: {}", e);
                    progress.on_reply_end(None);
                    return Err(GatewayError::RequestFailed(e).into());
                }
                // Producer gone without Completed, keep what arrived
                None => break,
            }
        }

        let mut state = self.state();
        if token.is_cancelled() || state.conversation.generation() != generation {
            debug!(
                generation,
                current = state.conversation.generation(),
                "Discarding stale reply"
            );
            drop(state);
            progress.on_reply_end(None);
            return Ok(SendOutcome::Discarded);
        }

        let completed = state.conversation.complete_assistant_reply(raw);
        drop(state);

        info!(
            corrections = completed.reply.corrections.len(),
            encouragement = completed.reply.encouragement.is_some(),
            "Reply received"
        );
        progress.on_reply_end(Some(&completed.reply));
        Ok(SendOutcome::Delivered(completed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::StreamHandle;
    use async_trait::async_trait;
    use parley_domain::{CorrectionKind, ParsedReply, Role};
    use std::collections::VecDeque;
    use tokio::sync::{Notify, mpsc};

    enum Scripted {
        Events(Vec<StreamEvent>),
        Fail(String),
        /// Keep the stream open until the test drops the gateway
        Hang,
    }

    /// Mock gateway that replays scripted replies in order
    struct ScriptedGateway {
        replies: Mutex<VecDeque<Scripted>>,
        requests: Mutex<Vec<CompletionRequest>>,
        open_senders: Mutex<Vec<mpsc::Sender<StreamEvent>>>,
        started: Notify,
    }

    impl ScriptedGateway {
        fn new(replies: Vec<Scripted>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
                open_senders: Mutex::new(Vec::new()),
                started: Notify::new(),
            })
        }

        fn text(reply: &str) -> Scripted {
            Scripted::Events(vec![StreamEvent::Completed(reply.to_string())])
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn stream_completion(
            &self,
            request: CompletionRequest,
        ) -> Result<StreamHandle, GatewayError> {
            self.requests.lock().unwrap().push(request);
            let next = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Self::text("(default reply)"));
            self.started.notify_one();

            match next {
                Scripted::Events(events) => {
                    let (tx, rx) = mpsc::channel(events.len().max(1));
                    for event in events {
                        tx.send(event).await.unwrap();
                    }
                    Ok(StreamHandle::new(rx))
                }
                Scripted::Fail(msg) => Err(GatewayError::ConnectionError(msg)),
                Scripted::Hang => {
                    let (tx, rx) = mpsc::channel(1);
                    self.open_senders.lock().unwrap().push(tx);
                    Ok(StreamHandle::new(rx))
                }
            }
        }
    }

    /// Records every callback for assertions
    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl ProgressNotifier for RecordingProgress {
        fn on_reply_start(&self, character: Option<&str>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start:{}", character.unwrap_or("-")));
        }

        fn on_reply_chunk(&self, chunk: &str) {
            self.events.lock().unwrap().push(format!("chunk:{}", chunk));
        }

        fn on_reply_end(&self, reply: Option<&ParsedReply>) {
            let label = match reply {
                Some(r) => format!("end:{}", r.display_text),
                None => "end:none".to_string(),
            };
            self.events.lock().unwrap().push(label);
        }
    }

    fn session(gateway: Arc<ScriptedGateway>) -> ChatSessionUseCase<ScriptedGateway> {
        ChatSessionUseCase::new(
            gateway,
            Arc::new(LanguageTable::builtin()),
            ChatConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_reply_corrections_land_on_user_message() {
        let gateway = ScriptedGateway::new(vec![ScriptedGateway::text(
            "Super ! [CORRECTION]Je manges|Je mange|verb agreement[/CORRECTION] \
             [ENCOURAGEMENT]Continuez ![/ENCOURAGEMENT]",
        )]);
        let chat = session(gateway);
        chat.select_character("1").unwrap();

        let outcome = chat.send("Je manges du pain").await.unwrap();

        let SendOutcome::Delivered(completed) = outcome else {
            panic!("reply should be delivered");
        };
        assert_eq!(completed.reply.display_text, "Super !");

        let conversation = chat.conversation();
        let messages = conversation.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(Some(messages[1].id), completed.corrected);
        assert_eq!(messages[1].corrections()[0].kind, CorrectionKind::Correction);
        assert_eq!(messages[2].encouragement.as_deref(), Some("Continuez !"));
    }

    #[tokio::test]
    async fn test_request_carries_persona_and_history() {
        let gateway = ScriptedGateway::new(vec![ScriptedGateway::text("はい")]);
        let chat = session(gateway.clone());
        chat.select_character("3").unwrap();

        chat.send("こんにちは").await.unwrap();

        let request = &gateway.requests()[0];
        assert!(request.system_prompt.contains("Japanese language learning assistant"));
        assert!(request.system_prompt.contains("You are Hiroshi Tanaka"));
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::Assistant);
        assert_eq!(request.messages[1].content, "こんにちは");
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected_without_request() {
        let gateway = ScriptedGateway::new(vec![]);
        let chat = session(gateway.clone());

        let err = chat.send("   ").await.unwrap_err();

        assert!(matches!(err, ChatSessionError::Domain(DomainError::EmptyMessage)));
        assert!(gateway.requests().is_empty());
        assert!(chat.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_progress_receives_chunks_in_order() {
        let gateway = ScriptedGateway::new(vec![Scripted::Events(vec![
            StreamEvent::Delta("Hola ".into()),
            StreamEvent::Delta("amigo".into()),
            StreamEvent::Completed("Hola amigo".into()),
        ])]);
        let chat = session(gateway);
        chat.select_character("2").unwrap();
        let progress = RecordingProgress::default();

        chat.send_with_progress("hola", &progress).await.unwrap();

        assert_eq!(
            *progress.events.lock().unwrap(),
            vec![
                "start:Carlos Rodriguez",
                "chunk:Hola ",
                "chunk:amigo",
                "end:Hola amigo",
            ]
        );
        assert_eq!(chat.conversation().messages()[2].content, "Hola amigo");
    }

    #[tokio::test]
    async fn test_gateway_failure_leaves_no_assistant_turn() {
        let gateway = ScriptedGateway::new(vec![Scripted::Fail("refused".into())]);
        let chat = session(gateway);
        let progress = RecordingProgress::default();

        let err = chat.send_with_progress("bonjour", &progress).await.unwrap_err();

        assert!(matches!(err, ChatSessionError::GatewayError(_)));
        let conversation = chat.conversation();
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages()[0].role, Role::User);
        assert_eq!(progress.events.lock().unwrap().last().unwrap(), "end:none");
    }

    #[tokio::test]
    async fn test_stream_error_surfaces_as_gateway_error() {
        let gateway = ScriptedGateway::new(vec![Scripted::Events(vec![
            StreamEvent::Delta("Bon".into()),
            StreamEvent::Error("connection reset".into()),
        ])]);
        let chat = session(gateway);

        let err = chat.send("salut").await.unwrap_err();

        assert!(err.to_string().contains("connection reset"));
        assert_eq!(chat.conversation().len(), 1);
    }

    #[tokio::test]
    async fn test_partial_text_before_stream_error_is_not_resent() {
        let gateway = ScriptedGateway::new(vec![
            Scripted::Events(vec![
                StreamEvent::Delta("Bonjour, je".into()),
                StreamEvent::Error("overloaded".into()),
            ]),
            ScriptedGateway::text("Bonjour !"),
        ]);
        let chat = session(gateway.clone());

        chat.send("salut").await.unwrap_err();
        chat.send("encore").await.unwrap();

        let second = &gateway.requests()[1];
        assert!(second.messages.iter().all(|m| m.role == Role::User));
        assert!(second.messages.iter().all(|m| !m.content.contains("Bonjour, je")));

        let conversation = chat.conversation();
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.messages()[2].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_switching_character_discards_in_flight_reply() {
        let gateway = ScriptedGateway::new(vec![Scripted::Hang]);
        let chat = Arc::new(session(gateway.clone()));
        chat.select_character("1").unwrap();

        let pending = {
            let chat = Arc::clone(&chat);
            tokio::spawn(async move { chat.send("Bonjour").await })
        };
        gateway.started.notified().await;

        chat.select_character("2").unwrap();

        let outcome = pending.await.unwrap().unwrap();
        assert!(outcome.is_discarded());
        let conversation = chat.conversation();
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.character_id(), Some("2"));
        assert!(conversation.messages()[0].content.starts_with("¡Hola! Soy Carlos."));
    }

    #[tokio::test]
    async fn test_cancel_keeps_conversation_and_discards_reply() {
        let gateway = ScriptedGateway::new(vec![Scripted::Hang, ScriptedGateway::text("Oui")]);
        let chat = Arc::new(session(gateway.clone()));

        let pending = {
            let chat = Arc::clone(&chat);
            tokio::spawn(async move { chat.send("Allô ?").await })
        };
        gateway.started.notified().await;
        chat.cancel();

        assert!(pending.await.unwrap().unwrap().is_discarded());
        assert_eq!(chat.conversation().len(), 1);

        let outcome = chat.send("Vous êtes là ?").await.unwrap();
        assert!(!outcome.is_discarded());
        assert_eq!(chat.conversation().len(), 3);
    }

    #[tokio::test]
    async fn test_select_unknown_character_fails() {
        let chat = session(ScriptedGateway::new(vec![]));
        let err = chat.select_character("42").unwrap_err();
        assert!(matches!(
            err,
            ChatSessionError::Domain(DomainError::CharacterNotFound(id)) if id == "42"
        ));
    }

    #[test]
    fn test_set_languages_resets_and_keeps_matching_persona() {
        let chat = session(ScriptedGateway::new(vec![]));
        chat.select_character("5").unwrap();
        let before = chat.conversation().generation();

        chat.set_languages("German", "Spanish");
        let conversation = chat.conversation();
        assert_eq!(conversation.generation(), before + 1);
        assert_eq!(conversation.character_id(), Some("5"));
        assert_eq!(conversation.native_language(), "Spanish");

        chat.set_languages("Korean", "English");
        let conversation = chat.conversation();
        assert_eq!(conversation.character_id(), None);
        assert_eq!(conversation.target_language(), "Korean");
        assert_eq!(conversation.len(), 1);
        assert_eq!(chat.speech_settings().locale, "ko-KR");
    }

    #[tokio::test]
    async fn test_created_character_can_be_selected() {
        let gateway = ScriptedGateway::new(vec![ScriptedGateway::text("Ciao!")]);
        let chat = session(gateway.clone());

        let giulia = chat
            .create_character(CharacterDraft::new(
                "Giulia",
                "Loves opera",
                "Italian",
                "a singer from Milan",
            ))
            .unwrap();
        assert_eq!(chat.characters("giulia").len(), 1);

        chat.select_character(&giulia.id).unwrap();
        chat.send("Ciao").await.unwrap();

        let request = &gateway.requests()[0];
        assert!(request.system_prompt.contains("You are Giulia. You are a singer from Milan."));
        assert_eq!(chat.current_character().unwrap().id, giulia.id);
    }
}
