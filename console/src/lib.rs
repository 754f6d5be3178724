//! Administration console for user records held by a REST backend.
//!
//! The [`domain`] owns the users table, the add/edit form with its
//! validation and group chips, and the dialog service. Records travel
//! through the [`domain::ports::ResourceApi`] port, implemented over HTTP in
//! [`outbound::rest`] and in memory in [`outbound::memory`]. The
//! [`inbound::terminal`] adapter presents everything on a terminal.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

#[cfg(test)]
mod test_support;
