pub use crate::diagnostics::{Result, VerityError};

pub mod channel;
pub mod cli;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod messages;
pub mod report;
pub mod results;
pub mod scope;
pub mod session;
pub mod stats;
pub mod suite;
pub mod value;
