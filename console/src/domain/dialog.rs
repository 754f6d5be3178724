//! Modal dialogs, embedded dialog components, and transient notifications.
//!
//! [`UiService`] is the only way the domain talks to the operator. It owns
//! the rules (fixed button sets, non-dismissible dialogs) and delegates the
//! actual drawing to a [`DialogHost`] and a [`Notifier`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::ports::{DialogHost, Notifier};

/// How long a notification stays up unless configured otherwise.
pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(2000);

/// Title used for backend failure alerts.
pub const ERROR_TITLE: &str = "Error";

/// Button shown on a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonType {
    /// Acknowledge.
    Ok,
    /// Back out.
    Cancel,
    /// Confirm.
    Yes,
    /// Decline.
    No,
}

impl ButtonType {
    /// Caption drawn on the button.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ok => "Ok",
            Self::Cancel => "Cancel",
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

impl fmt::Display for ButtonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dialog flavours, each with a fixed button set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    /// Ok.
    Alert,
    /// Ok, Cancel.
    Prompt,
    /// Yes, No.
    YesNo,
    /// Yes, No, Cancel.
    YesNoCancel,
}

impl DialogKind {
    /// Buttons offered, in display order.
    pub const fn buttons(self) -> &'static [ButtonType] {
        match self {
            Self::Alert => &[ButtonType::Ok],
            Self::Prompt => &[ButtonType::Ok, ButtonType::Cancel],
            Self::YesNo => &[ButtonType::Yes, ButtonType::No],
            Self::YesNoCancel => &[ButtonType::Yes, ButtonType::No, ButtonType::Cancel],
        }
    }
}

/// A message dialog ready to be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    /// Flavour, which fixes the buttons.
    pub kind: DialogKind,
    /// Title line.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Optional width hint such as `50%`.
    pub width: Option<String>,
}

impl Dialog {
    /// Whether `button` is one this dialog shows.
    pub fn offers(&self, button: ButtonType) -> bool {
        self.kind.buttons().contains(&button)
    }
}

/// Frame around an embedded dialog component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalChrome {
    /// Title line.
    pub title: String,
    /// Optional width hint.
    pub width: Option<String>,
}

/// Something that can run inside a modal frame until it closes itself.
#[async_trait]
pub trait DialogComponent: Send {
    /// Seed data handed in when the dialog opens.
    type Data: Send;
    /// Value the component closes with.
    type Output: Send;

    /// Run until the component closes, returning its close result.
    ///
    /// `None` means the component was closed without a result.
    async fn run(&mut self, chrome: &ModalChrome, data: Option<Self::Data>) -> Option<Self::Output>;
}

/// Opens dialogs and shows notifications through the configured ports.
#[derive(Clone)]
pub struct UiService {
    host: Arc<dyn DialogHost>,
    notifier: Arc<dyn Notifier>,
    notification_duration: Duration,
}

impl fmt::Debug for UiService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiService")
            .field("notification_duration", &self.notification_duration)
            .finish_non_exhaustive()
    }
}

impl UiService {
    /// Service with the default notification duration.
    pub fn new(host: Arc<dyn DialogHost>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            host,
            notifier,
            notification_duration: DEFAULT_NOTIFICATION_DURATION,
        }
    }

    /// Override how long notifications stay up.
    #[must_use]
    pub fn with_notification_duration(mut self, duration: Duration) -> Self {
        self.notification_duration = duration;
        self
    }

    /// Configured notification duration.
    pub fn notification_duration(&self) -> Duration {
        self.notification_duration
    }

    /// Show a dialog and wait for one of its buttons.
    ///
    /// The dialog cannot be dismissed: an answer outside the offered set is
    /// ignored and the dialog is shown again.
    pub async fn open_dialog(
        &self,
        kind: DialogKind,
        title: &str,
        content: &str,
        width: Option<&str>,
    ) -> ButtonType {
        let dialog = Dialog {
            kind,
            title: title.to_owned(),
            content: content.to_owned(),
            width: width.map(str::to_owned),
        };
        loop {
            let pressed = self.host.present(&dialog).await;
            if dialog.offers(pressed) {
                debug!(title, button = pressed.name(), "dialog closed");
                return pressed;
            }
            warn!(title, button = pressed.name(), "ignoring button not offered by dialog");
        }
    }

    /// Show an error alert with the standard title.
    pub async fn alert(&self, content: &str) {
        self.open_dialog(DialogKind::Alert, ERROR_TITLE, content, None)
            .await;
    }

    /// Run `component` inside modal chrome and return its close result.
    pub async fn open_component_in_dialog<C: DialogComponent>(
        &self,
        component: &mut C,
        title: &str,
        data: Option<C::Data>,
        width: Option<&str>,
    ) -> Option<C::Output> {
        let chrome = ModalChrome {
            title: title.to_owned(),
            width: width.map(str::to_owned),
        };
        self.host.open_chrome(&chrome).await;
        let result = component.run(&chrome, data).await;
        self.host.close_chrome(&chrome).await;
        result
    }

    /// Show a transient notification.
    pub fn notify(&self, message: &str) {
        self.notifier.notify(message, self.notification_duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockDialogHost, MockNotifier};
    use rstest::rstest;

    fn service(host: MockDialogHost) -> UiService {
        UiService::new(Arc::new(host), Arc::new(MockNotifier::new()))
    }

    #[rstest]
    #[case::alert(DialogKind::Alert, &[ButtonType::Ok])]
    #[case::prompt(DialogKind::Prompt, &[ButtonType::Ok, ButtonType::Cancel])]
    #[case::yes_no(DialogKind::YesNo, &[ButtonType::Yes, ButtonType::No])]
    #[case::yes_no_cancel(
        DialogKind::YesNoCancel,
        &[ButtonType::Yes, ButtonType::No, ButtonType::Cancel]
    )]
    fn dialog_kinds_have_fixed_buttons(#[case] kind: DialogKind, #[case] expected: &[ButtonType]) {
        assert_eq!(kind.buttons(), expected);
    }

    #[rstest]
    fn button_names_match_captions() {
        let names: Vec<_> = [ButtonType::Ok, ButtonType::Cancel, ButtonType::Yes, ButtonType::No]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(names, ["Ok", "Cancel", "Yes", "No"]);
    }

    #[rstest]
    #[tokio::test]
    async fn open_dialog_returns_the_pressed_button() {
        let mut host = MockDialogHost::new();
        host.expect_present()
            .withf(|dialog| {
                dialog.kind == DialogKind::YesNoCancel
                    && dialog.title == "Warning"
                    && dialog.width.as_deref() == Some("30%")
            })
            .times(1)
            .return_const(ButtonType::No);

        let pressed = service(host)
            .open_dialog(DialogKind::YesNoCancel, "Warning", "Sure?", Some("30%"))
            .await;
        assert_eq!(pressed, ButtonType::No);
    }

    #[rstest]
    #[tokio::test]
    async fn unoffered_answers_present_the_dialog_again() {
        let mut host = MockDialogHost::new();
        let mut answers = vec![ButtonType::Yes, ButtonType::Cancel, ButtonType::Ok].into_iter();
        host.expect_present()
            .times(3)
            .returning(move |_| answers.next().unwrap_or(ButtonType::Ok));

        let pressed = service(host)
            .open_dialog(DialogKind::Alert, ERROR_TITLE, "boom", None)
            .await;
        assert_eq!(pressed, ButtonType::Ok);
    }

    struct Echo {
        runs: usize,
    }

    #[async_trait]
    impl DialogComponent for Echo {
        type Data = String;
        type Output = String;

        async fn run(&mut self, chrome: &ModalChrome, data: Option<String>) -> Option<String> {
            self.runs += 1;
            data.map(|data| format!("{}: {data}", chrome.title))
        }
    }

    #[rstest]
    #[tokio::test]
    async fn components_run_inside_chrome() {
        let mut host = MockDialogHost::new();
        let mut seq = mockall::Sequence::new();
        host.expect_open_chrome()
            .withf(|chrome| chrome.title == "Add User Form" && chrome.width.as_deref() == Some("50%"))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        host.expect_close_chrome()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let mut echo = Echo { runs: 0 };
        let result = service(host)
            .open_component_in_dialog(&mut echo, "Add User Form", Some("hi".to_owned()), Some("50%"))
            .await;

        assert_eq!(result.as_deref(), Some("Add User Form: hi"));
        assert_eq!(echo.runs, 1);
    }

    #[rstest]
    fn notify_uses_the_configured_duration() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|message, duration| {
                message == "Invalid data" && *duration == Duration::from_millis(500)
            })
            .times(1)
            .return_const(());
        let ui = UiService::new(Arc::new(MockDialogHost::new()), Arc::new(notifier))
            .with_notification_duration(Duration::from_millis(500));

        ui.notify("Invalid data");
    }
}
