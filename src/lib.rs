pub mod cli;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use cli::{Cli, Commands};
pub use models::Config;
pub use services::ChatService;
