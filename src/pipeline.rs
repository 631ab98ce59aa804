//! Load → normalize → write.

use std::path::Path;

use crate::document::{MeetCreds, Policy};
use crate::error::Result;
use crate::hasher::PasswordHasher;
use crate::normalizer::{normalize, NormalizeReport};
use crate::store::DocumentStore;

/// Default indent width of the written document.
pub const DEFAULT_INDENT: usize = 4;

/// One-shot credentials transform.
///
/// Holds the store and hashing policy so the same run can be pointed at the
/// filesystem or at an in-memory store.
pub struct Pipeline<'a> {
    store: &'a dyn DocumentStore,
    hasher: &'a dyn PasswordHasher,
    policy: Policy,
    indent: usize,
}

impl<'a> Pipeline<'a> {
    pub fn new(store: &'a dyn DocumentStore, hasher: &'a dyn PasswordHasher) -> Self {
        Self {
            store,
            hasher,
            policy: Policy::default(),
            indent: DEFAULT_INDENT,
        }
    }

    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Reads and validates the document at `input`.
    pub fn load(&self, input: &Path) -> Result<MeetCreds> {
        let text = self.store.read(input)?;
        let doc = MeetCreds::from_json(&text, self.policy)?;
        tracing::info!(
            "Loaded {} meet(s) from {}",
            doc.meets.len(),
            input.display()
        );
        Ok(doc)
    }

    /// Hashes every plaintext password in `input` and writes the result to
    /// `output`. With `dry_run` nothing is written.
    ///
    /// Nothing is written unless loading and hashing both succeed.
    pub fn run(&self, input: &Path, output: &Path, dry_run: bool) -> Result<NormalizeReport> {
        let mut doc = self.load(input)?;

        let report = normalize(&mut doc, self.hasher)?;
        tracing::info!(
            "Hashed {} password(s), {} already hashed, {} skipped",
            report.hashed,
            report.already_hashed,
            report.skipped
        );

        if dry_run {
            tracing::info!("Dry run, not writing {}", output.display());
            return Ok(report);
        }

        let contents = doc.to_json_pretty(self.indent)?;
        self.store.write(output, &contents)?;
        tracing::info!("Wrote {}", output.display());

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CredsError;
    use crate::hasher::{BcryptHasher, MIN_COST};
    use crate::store::{FileStore, MemoryStore};
    use serde_json::Value;
    use tempfile::TempDir;

    const INPUT: &str = "config/meet_creds_2.json";
    const OUTPUT: &str = "config/meet_creds.json";

    fn hasher() -> BcryptHasher {
        BcryptHasher::new(MIN_COST).unwrap()
    }

    #[test]
    fn test_run_writes_hashed_document() {
        let store = MemoryStore::new();
        store.insert(
            INPUT,
            r#"{"meets":[{"name":"M1","admin":{"username":"dir","password":"abc123"}}]}"#,
        );
        let hasher = hasher();

        let report = Pipeline::new(&store, &hasher)
            .run(Path::new(INPUT), Path::new(OUTPUT), false)
            .unwrap();

        assert_eq!(report.hashed, 1);
        let written: Value = serde_json::from_str(&store.get(Path::new(OUTPUT)).unwrap()).unwrap();
        let hash = written["meets"][0]["admin"]["password"].as_str().unwrap();
        assert!(hasher.verify("abc123", hash).unwrap());
        assert_eq!(written["meets"][0]["admin"]["username"], "dir");

        // Input is left alone.
        assert!(store.get(Path::new(INPUT)).unwrap().contains("abc123"));
    }

    #[test]
    fn test_rerun_on_output_is_noop() {
        let store = MemoryStore::new();
        store.insert(INPUT, r#"{"meets":[{"name":"M1","admin":{"password":"abc123"}}]}"#);
        let hasher = hasher();
        let pipeline = Pipeline::new(&store, &hasher);

        pipeline.run(Path::new(INPUT), Path::new(OUTPUT), false).unwrap();
        let first = store.get(Path::new(OUTPUT)).unwrap();
        let report = pipeline.run(Path::new(OUTPUT), Path::new(OUTPUT), false).unwrap();

        assert_eq!(report.hashed, 0);
        assert_eq!(store.get(Path::new(OUTPUT)).unwrap(), first);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let store = MemoryStore::new();
        store.insert(INPUT, r#"{"meets":[{"name":"M1","admin":{"password":"abc123"}}]}"#);
        let hasher = hasher();

        let report = Pipeline::new(&store, &hasher)
            .run(Path::new(INPUT), Path::new(OUTPUT), true)
            .unwrap();

        assert_eq!(report.hashed, 1);
        assert!(store.get(Path::new(OUTPUT)).is_none());
    }

    #[test]
    fn test_malformed_aborts_before_write() {
        let store = MemoryStore::new();
        store.insert(INPUT, r#"{"meets":[{"name":"M1","admin":"plain"}]}"#);
        let hasher = hasher();

        let err = Pipeline::new(&store, &hasher)
            .run(Path::new(INPUT), Path::new(OUTPUT), false)
            .unwrap_err();

        assert!(matches!(err, CredsError::MalformedConfiguration { .. }));
        assert!(store.get(Path::new(OUTPUT)).is_none());
    }

    #[test]
    fn test_strict_policy_applies() {
        let store = MemoryStore::new();
        store.insert(INPUT, r#"{"meets":[{"name":"M1","users":["bad"]}]}"#);
        let hasher = hasher();

        let lenient = Pipeline::new(&store, &hasher).run(Path::new(INPUT), Path::new(OUTPUT), true);
        let strict = Pipeline::new(&store, &hasher)
            .policy(Policy::Strict)
            .run(Path::new(INPUT), Path::new(OUTPUT), true);

        assert_eq!(lenient.unwrap().skipped, 1);
        assert!(matches!(strict, Err(CredsError::MalformedConfiguration { .. })));
    }

    #[test]
    fn test_missing_input() {
        let store = MemoryStore::new();
        let hasher = hasher();

        let err = Pipeline::new(&store, &hasher)
            .run(Path::new(INPUT), Path::new(OUTPUT), false)
            .unwrap_err();

        assert!(matches!(err, CredsError::Io { .. }));
    }

    #[test]
    fn test_run_against_filesystem() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("meet_creds_2.json");
        let output = temp_dir.path().join("out").join("meet_creds.json");
        std::fs::write(
            &input,
            r#"{"meets":[{"name":"M1","users":[{"username":"left","password":"l"}]}],"superuser":{"username":"root","password":"r"}}"#,
        )
        .unwrap();
        let hasher = hasher();

        let report = Pipeline::new(&FileStore::new(), &hasher)
            .indent(2)
            .run(&input, &output, false)
            .unwrap();

        assert_eq!(report.hashed, 2);
        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("{\n  \"meets\""));
        assert!(!text.contains("\"l\""));
        assert!(!text.contains("\"r\""));
    }
}
