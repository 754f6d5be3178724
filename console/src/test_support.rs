//! Recording doubles for the presentation ports, shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::dialog::{ButtonType, Dialog, ModalChrome, UiService};
use crate::domain::ports::{DialogHost, FormAction, FormDriver, FormSnapshot, Notifier};

/// Dialog host answering from a script and remembering what it showed.
#[derive(Debug, Default)]
pub struct RecordingHost {
    answers: Mutex<VecDeque<ButtonType>>,
    dialogs: Mutex<Vec<Dialog>>,
    frames: Mutex<Vec<String>>,
}

impl RecordingHost {
    /// Host answering `answers` in order, then `Ok`.
    pub fn answering(answers: impl IntoIterator<Item = ButtonType>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Dialogs presented so far.
    pub fn dialogs(&self) -> Vec<Dialog> {
        self.dialogs.lock().expect("dialogs lock").clone()
    }

    /// Contents of every presented dialog.
    pub fn contents(&self) -> Vec<String> {
        self.dialogs()
            .into_iter()
            .map(|dialog| dialog.content)
            .collect()
    }

    /// `open:<title>` / `close:<title>` for every frame event.
    pub fn frames(&self) -> Vec<String> {
        self.frames.lock().expect("frames lock").clone()
    }
}

#[async_trait]
impl DialogHost for RecordingHost {
    async fn present(&self, dialog: &Dialog) -> ButtonType {
        self.dialogs.lock().expect("dialogs lock").push(dialog.clone());
        self.answers
            .lock()
            .expect("answers lock")
            .pop_front()
            .unwrap_or(ButtonType::Ok)
    }

    async fn open_chrome(&self, chrome: &ModalChrome) {
        let event = format!("open:{}", chrome.title);
        self.frames.lock().expect("frames lock").push(event);
    }

    async fn close_chrome(&self, chrome: &ModalChrome) {
        let event = format!("close:{}", chrome.title);
        self.frames.lock().expect("frames lock").push(event);
    }
}

/// Notifier remembering every message.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, Duration)>>,
}

impl RecordingNotifier {
    /// Messages shown so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .expect("messages lock")
            .iter()
            .map(|(message, _)| message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, duration: Duration) {
        self.messages
            .lock()
            .expect("messages lock")
            .push((message.to_owned(), duration));
    }
}

/// Form driver replaying a fixed list of actions, then cancelling.
#[derive(Debug, Default)]
pub struct ScriptedDriver {
    actions: Mutex<VecDeque<FormAction>>,
    seen: Mutex<Vec<FormSnapshot>>,
}

impl ScriptedDriver {
    /// Driver replaying `actions`.
    pub fn new(actions: impl IntoIterator<Item = FormAction>) -> Self {
        Self {
            actions: Mutex::new(actions.into_iter().collect()),
            seen: Mutex::default(),
        }
    }

    /// Snapshots handed to the driver so far.
    pub fn seen(&self) -> Vec<FormSnapshot> {
        self.seen.lock().expect("seen lock").clone()
    }
}

#[async_trait]
impl FormDriver for ScriptedDriver {
    async fn next_action(&self, snapshot: &FormSnapshot) -> FormAction {
        self.seen.lock().expect("seen lock").push(snapshot.clone());
        self.actions
            .lock()
            .expect("actions lock")
            .pop_front()
            .unwrap_or(FormAction::Cancel)
    }
}

/// Presentation doubles bundled with the service built over them.
pub struct Presentation {
    /// Dialog double.
    pub host: Arc<RecordingHost>,
    /// Notification double.
    pub notifier: Arc<RecordingNotifier>,
    /// Service wired to both doubles.
    pub ui: UiService,
}

impl Presentation {
    /// Wire a service over `host` and a fresh notifier.
    pub fn new(host: RecordingHost) -> Self {
        let host = Arc::new(host);
        let notifier = Arc::new(RecordingNotifier::default());
        let ui = UiService::new(host.clone(), notifier.clone());
        Self { host, notifier, ui }
    }
}
