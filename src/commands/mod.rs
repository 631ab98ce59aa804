use clap::ValueEnum;

mod check;
mod config_cmd;
mod hash;
mod verify;

pub use check::CheckCommand;
pub use config_cmd::ConfigCommand;
pub use hash::HashCommand;
pub use verify::VerifyCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
