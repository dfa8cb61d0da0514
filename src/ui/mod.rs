//! Terminal UI for interactive chat sessions.
//!
//! - [`chat_loop`]: terminal lifecycle, key handling and the event loop that
//!   hands completions to spawned tasks.
//! - [`view`] and [`renderer`]: view state and frame composition.
//! - [`markdown`]: message rendering with syntax highlighting.
//! - [`theme`] and [`picker`]: styling and the persona picker overlay.
//!
//! Domain state lives in [`crate::core`]; this layer only presents it.

pub mod chat_loop;
pub mod markdown;
pub mod picker;
pub mod renderer;
pub mod theme;
pub mod view;
