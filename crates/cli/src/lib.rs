#![forbid(unsafe_code)]

pub mod cli;
mod commands;
mod error;
mod summary;

pub use commands::run;
pub use error::Error;
pub use summary::Summary;
