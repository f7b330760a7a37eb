pub mod catalog;
pub mod config;
pub mod error;
pub mod inference;
pub mod logging;
pub mod model;
pub mod preprocess;
pub mod server;
pub mod training;

pub use error::{Error, Result};
