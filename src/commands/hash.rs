use clap::Args;
use std::path::PathBuf;

use reflights_creds::{BcryptHasher, FileStore, Pipeline, Policy};

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct HashCommand {
    /// Credentials file to read
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Where to write the hashed document
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// bcrypt cost factor
    #[arg(long)]
    pub cost: Option<u32>,

    /// Reject malformed secondary admins, users and superuser instead of skipping them
    #[arg(long)]
    pub strict: bool,

    /// Hash in memory and report, without writing the output file
    #[arg(long)]
    pub dry_run: bool,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl HashCommand {
    /// Applies command-line arguments on top of the loaded configuration.
    fn effective_config(&self, config: &Config) -> Config {
        let mut config = config.clone();
        config.input_path.override_with(self.input.clone());
        config.output_path.override_with(self.output.clone());
        config.cost.override_with(self.cost);
        config.policy.override_with(self.strict.then_some(Policy::Strict));
        config
    }

    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let config = self.effective_config(config);

        let hasher = BcryptHasher::new(config.cost.value)?;
        let store = FileStore::new();
        let report = Pipeline::new(&store, &hasher)
            .policy(config.policy.value)
            .indent(config.indent.value)
            .run(
                &config.input_path.value,
                &config.output_path.value,
                self.dry_run,
            )?;

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => {
                println!("Hashed:         {}", report.hashed);
                println!("Already hashed: {}", report.already_hashed);
                println!("Skipped:        {}", report.skipped);
                if self.dry_run {
                    println!("\nDry run: {} not written", config.output_path.value.display());
                } else {
                    println!("\nWrote {}", config.output_path.value.display());
                }
            }
        }

        Ok(())
    }
}
