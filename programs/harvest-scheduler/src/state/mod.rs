pub mod config;
pub mod job;
pub mod oracle;

pub use config::*;
pub use job::*;
pub use oracle::*;
