//! Progress reporting while a tutor reply streams

use indicatif::{ProgressBar, ProgressStyle};
use parley_application::ProgressNotifier;
use parley_domain::ParsedReply;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Shows a "… is typing" spinner with a running character count
pub struct ProgressReporter {
    spinner: Mutex<Option<TypingState>>,
}

struct TypingState {
    bar: ProgressBar,
    speaker: String,
    received: usize,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn typing_message(speaker: &str, received: usize) -> String {
        if received == 0 {
            format!("{} is typing...", speaker)
        } else {
            format!("{} is typing... ({} chars)", speaker, received)
        }
    }

    fn with_state(&self, f: impl FnOnce(&mut Option<TypingState>)) {
        let mut state = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_reply_start(&self, character: Option<&str>) {
        let speaker = character.unwrap_or("Tutor").to_string();
        let bar = ProgressBar::new_spinner();
        bar.set_style(Self::spinner_style());
        bar.set_message(Self::typing_message(&speaker, 0));
        bar.enable_steady_tick(Duration::from_millis(100));

        self.with_state(|state| {
            if let Some(previous) = state.take() {
                previous.bar.finish_and_clear();
            }
            *state = Some(TypingState {
                bar,
                speaker,
                received: 0,
            });
        });
    }

    fn on_reply_chunk(&self, chunk: &str) {
        self.with_state(|state| {
            if let Some(typing) = state.as_mut() {
                typing.received += chunk.chars().count();
                typing
                    .bar
                    .set_message(Self::typing_message(&typing.speaker, typing.received));
            }
        });
    }

    fn on_reply_end(&self, _reply: Option<&ParsedReply>) {
        self.with_state(|state| {
            if let Some(typing) = state.take() {
                typing.bar.finish_and_clear();
            }
        });
    }
}
