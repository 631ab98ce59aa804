use clap::Args;
use std::io::{self, BufRead};
use std::path::PathBuf;

use reflights_creds::{verify_login, verify_superuser, BcryptHasher, FileStore, Pipeline};

use crate::config::Config;

#[derive(Args)]
pub struct VerifyCommand {
    /// Meet the login belongs to
    #[arg(long, short, required_unless_present = "superuser", conflicts_with = "superuser")]
    pub meet: Option<String>,

    /// Check the top-level superuser instead of a meet login
    #[arg(long)]
    pub superuser: bool,

    /// Username to check
    #[arg(long, short)]
    pub username: String,

    /// Password to check (read from stdin if omitted)
    #[arg(long, short)]
    pub password: Option<String>,

    /// Credentials file (defaults to the configured output file)
    #[arg(long, short)]
    pub input: Option<PathBuf>,
}

impl VerifyCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let path = self
            .input
            .clone()
            .unwrap_or_else(|| config.output_path.value.clone());

        let password = match &self.password {
            Some(p) => p.clone(),
            None => read_password()?,
        };

        let hasher = BcryptHasher::default();
        let store = FileStore::new();
        let doc = Pipeline::new(&store, &hasher)
            .policy(config.policy.value)
            .load(&path)?;

        let outcome = match &self.meet {
            Some(meet) => verify_login(&doc, meet, &self.username, &password, &hasher)?,
            None => verify_superuser(&doc, &self.username, &password, &hasher)?,
        };

        tracing::info!("Login check for {}: {}", self.username, outcome);
        if !outcome.is_valid() {
            return Err(format!("Login rejected: {}", outcome).into());
        }

        println!("Login accepted: {}", outcome);
        Ok(())
    }
}

/// Reads one line from stdin, without the trailing newline.
fn read_password() -> io::Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
