//! Domain state and services: settings, workspaces, personas and the
//! completion client. Nothing here touches the terminal.

pub mod chat;
pub mod completion;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod message;
pub mod persona;
pub mod workspace;
