//! Mycelial is a terminal chat client for OpenRouter-style completion APIs.
//!
//! Conversations are grouped into workspaces and threads. Each workspace can
//! choose a model and a persona, and can pull linked knowledge items into the
//! system prompt.
//!
//! - [`core`] owns settings, the workspace store, persona resolution, the
//!   completion client and the chat session state machine.
//! - [`ui`] renders the full-screen chat view and runs its event loop.
//! - [`cli`] parses arguments and implements the non-interactive commands.
//! - [`api`] defines the request and response payloads sent over the wire.
//! - [`utils`] holds logging setup, URL helpers and syntax highlighting.
//!
//! The binary in `src/main.rs` routes straight into [`cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
