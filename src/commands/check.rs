use clap::Args;
use std::path::PathBuf;

use reflights_creds::{audit, BcryptHasher, CredentialPath, FileStore, Pipeline, Policy};

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct CheckCommand {
    /// Credentials file to check (defaults to the configured output file)
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Reject malformed secondary admins, users and superuser
    #[arg(long)]
    pub strict: bool,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl CheckCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let path = self
            .input
            .clone()
            .unwrap_or_else(|| config.output_path.value.clone());
        let policy = if self.strict {
            Policy::Strict
        } else {
            config.policy.value
        };

        let hasher = BcryptHasher::default();
        let store = FileStore::new();
        let doc = Pipeline::new(&store, &hasher).policy(policy).load(&path)?;
        let plaintext = audit(&doc, &hasher);

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&plaintext)?);
            }
            OutputFormat::Text => {
                if plaintext.is_empty() {
                    println!("All passwords in {} are hashed", path.display());
                } else {
                    println!("Plaintext passwords in {}:", path.display());
                    for credential in &plaintext {
                        println!("  {}", credential);
                    }
                }
            }
        }

        ensure_all_hashed(&plaintext)?;
        Ok(())
    }
}

/// Fails when any credential still holds a plaintext password.
fn ensure_all_hashed(plaintext: &[CredentialPath]) -> Result<(), String> {
    if plaintext.is_empty() {
        Ok(())
    } else {
        Err(format!("{} plaintext password(s) found", plaintext.len()))
    }
}
