//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod dialog_host;
mod form_driver;
mod notifier;
mod resource_api;

pub use dialog_host::DialogHost;
#[cfg(test)]
pub use dialog_host::MockDialogHost;
pub use form_driver::{FieldSnapshot, FormAction, FormDriver, FormSnapshot};
#[cfg(test)]
pub use form_driver::MockFormDriver;
pub use notifier::Notifier;
#[cfg(test)]
pub use notifier::MockNotifier;
#[cfg(test)]
pub use resource_api::MockResourceApi;
pub use resource_api::{Resource, ResourceApi, ResourceApiError};
