pub mod clean;
pub mod config;
pub mod types;

pub use clean::{clean_body, clean_link};
pub use config::{env_or, Config};
pub use types::*;
