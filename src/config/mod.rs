//! Configuration files, their application onto CLI arguments, and dotenv files.
mod apply;
mod dotenv;
mod loader;
pub mod types;


pub use apply::apply_config;
pub(crate) use apply::is_cli;
pub use dotenv::{load_dotenv, parse_dotenv};
pub use loader::load_config;
