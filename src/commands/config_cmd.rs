use clap::{Args, Subcommand};

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("input_path: {}", config.input_path.value.display());
                        println!("  source: {}", config.input_path.source);
                        println!("output_path: {}", config.output_path.value.display());
                        println!("  source: {}", config.output_path.source);
                        println!("cost: {}", config.cost.value);
                        println!("  source: {}", config.cost.source);
                        println!("policy: {}", config.policy.value);
                        println!("  source: {}", config.policy.source);
                        println!("indent: {}", config.indent.value);
                        println!("  source: {}", config.indent.source);
                    }
                }
                Ok(())
            }
        }
    }
}
