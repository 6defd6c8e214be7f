pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod schema;
pub mod ui;
pub mod writer;

pub use cli::{Cli, Commands};
pub use ui::{LogUi, SilentUi, Ui};
