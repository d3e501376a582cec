pub mod config;
pub mod whitelist;

pub use config::*;
pub use whitelist::*;
