//! Inbound adapters that turn operator input into domain calls.
//!
//! The only transport today is the line-oriented [`terminal`].

pub mod terminal;
