pub mod config;
pub mod error;
pub mod feed;
pub mod filter;
pub mod mail;
pub mod render;
pub mod run;
pub mod seen;

pub use error::{Result, WatchError};
