use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::host::{DialogChoice, DialogPrompt, UserDialog};

/// Answers prompts from a script, then cancels once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedDialog {
    answers: Mutex<VecDeque<DialogChoice>>,
    prompts: Mutex<Vec<DialogPrompt>>,
    settings_opened: AtomicUsize,
}

impl ScriptedDialog {
    pub fn new(answers: impl IntoIterator<Item = DialogChoice>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Default::default()
        })
    }

    pub fn push_answer(&self, choice: DialogChoice) {
        self.answers.lock().unwrap().push_back(choice);
    }

    pub fn prompts(&self) -> Vec<DialogPrompt> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn settings_opened(&self) -> usize {
        self.settings_opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserDialog for ScriptedDialog {
    async fn confirm(&self, prompt: &DialogPrompt) -> DialogChoice {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(DialogChoice::Cancel)
    }

    fn open_settings(&self) {
        self.settings_opened.fetch_add(1, Ordering::SeqCst);
    }
}
