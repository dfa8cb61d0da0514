pub mod data;
pub mod defaults;
pub mod io;


pub use data::{GlobalSettings, SystemPersona};
pub use io::ConfigError;
