//! Handlers behind `mycelial set` and `mycelial unset`.
//!
//! Each key is a [`SettingHandler`]; the [`SettingRegistry`] maps keys to
//! handlers and keeps them in display order. Handlers edit a
//! [`GlobalSettings`] value in place and the caller persists it.

pub mod error;
pub mod handlers;
pub mod registry;


pub use error::SettingError;
pub use registry::SettingRegistry;

use crate::core::config::GlobalSettings;

pub trait SettingHandler: Send + Sync {
    fn key(&self) -> &'static str;

    /// Apply `args` and return the confirmation line.
    fn set(&self, args: &[String], settings: &mut GlobalSettings) -> Result<String, SettingError>;

    /// Clear the value so the built-in default applies again.
    fn unset(&self, settings: &mut GlobalSettings) -> String;

    /// One indented line for the `mycelial set` listing.
    fn format(&self, settings: &GlobalSettings) -> String;
}
