//! # User Interface
//!
//! - [`chat`] - the conversation screen
//! - [`theme`] - color palette

pub mod chat;
pub mod theme;
