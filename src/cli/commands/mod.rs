mod app;
mod ask;
mod config;
mod index;
mod serve;

pub use ask::AskArgs;
pub use config::ConfigCommand;
pub use index::IndexArgs;
pub use serve::ServeArgs;

pub use ask::handle_ask;
pub use config::handle_config;
pub use index::handle_index;
pub use serve::handle_serve;
