//! Port for whatever surface actually shows dialogs to the operator.
use async_trait::async_trait;

use crate::domain::dialog::{ButtonType, Dialog, ModalChrome};

/// Presents dialogs and modal chrome.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DialogHost: Send + Sync {
    /// Show `dialog` and wait for the operator to press a button.
    ///
    /// Hosts may answer with any button; the caller filters out buttons the
    /// dialog did not offer.
    async fn present(&self, dialog: &Dialog) -> ButtonType;

    /// Open the frame hosting an embedded component.
    async fn open_chrome(&self, chrome: &ModalChrome);

    /// Close a frame opened by [`DialogHost::open_chrome`].
    async fn close_chrome(&self, chrome: &ModalChrome);
}
