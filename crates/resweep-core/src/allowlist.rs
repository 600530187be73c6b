//! Allow-list gate: which account names may be remediated.
//!
//! The permitted set is injected configuration (a newline-delimited
//! file), not a compiled-in constant, so authorizing a new tenant does
//! not require a release. Authorization happens before any store is
//! touched.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Errors from allow-list loading and authorization.
#[derive(Debug, thiserror::Error)]
pub enum AllowlistError {
    #[error("failed to read allow-list {0}: {1}")]
    Read(String, String),

    #[error("allow-list {0} names no accounts")]
    Empty(String),

    #[error("account name must be provided")]
    MissingAccountName,

    #[error("account {0} is not a permitted remediation target")]
    UnknownAccount(String),
}

/// The set of account names permitted as remediation targets.
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    names: BTreeSet<String>,
}

impl Allowlist {
    /// Build from in-memory names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Load from a newline-delimited file.
    ///
    /// Blank lines and `#` comments are skipped. An empty result is a
    /// configuration error, not an allow-nothing gate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AllowlistError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| AllowlistError::Read(path.display().to_string(), e.to_string()))?;

        let names: BTreeSet<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            return Err(AllowlistError::Empty(path.display().to_string()));
        }

        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Gate a candidate account name.
    ///
    /// Rejects an absent or empty name, and any name outside the
    /// permitted set. No side effects.
    pub fn authorize<'a>(&self, candidate: Option<&'a str>) -> Result<&'a str, AllowlistError> {
        let name = match candidate {
            Some(name) if !name.is_empty() => name,
            _ => return Err(AllowlistError::MissingAccountName),
        };
        if !self.names.contains(name) {
            return Err(AllowlistError::UnknownAccount(name.to_string()));
        }
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "resweep-allowlist-{prefix}-{}-{unique}.txt",
            std::process::id()
        ))
    }

    #[test]
    fn authorize_accepts_member() {
        let allowlist = Allowlist::from_names(["monday", "gymshark"]);
        let name = allowlist
            .authorize(Some("monday"))
            .expect("member should authorize");
        assert_eq!(name, "monday");
    }

    #[test]
    fn authorize_rejects_absent_name() {
        let allowlist = Allowlist::from_names(["monday"]);
        let err = allowlist
            .authorize(None)
            .expect_err("absent name must be rejected");
        assert!(matches!(err, AllowlistError::MissingAccountName));

        let err = allowlist
            .authorize(Some(""))
            .expect_err("empty name must be rejected");
        assert!(matches!(err, AllowlistError::MissingAccountName));
    }

    #[test]
    fn authorize_rejects_non_member() {
        let allowlist = Allowlist::from_names(["monday"]);
        let err = allowlist
            .authorize(Some("intruder"))
            .expect_err("non-member must be rejected");
        assert!(matches!(err, AllowlistError::UnknownAccount(name) if name == "intruder"));
    }

    #[test]
    fn load_skips_blank_lines_and_comments() {
        let path = temp_path("load");
        fs::write(&path, "# permitted tenants\nmonday\n\n  gymshark  \n")
            .expect("fixture should write");

        let allowlist = Allowlist::load(&path).expect("file should load");
        assert_eq!(allowlist.len(), 2);
        assert!(allowlist.contains("monday"));
        assert!(allowlist.contains("gymshark"));
        assert!(!allowlist.contains("# permitted tenants"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_rejects_empty_file() {
        let path = temp_path("empty");
        fs::write(&path, "# nothing but comments\n\n").expect("fixture should write");

        let err = Allowlist::load(&path).expect_err("empty allow-list must be rejected");
        assert!(matches!(err, AllowlistError::Empty(_)));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Allowlist::load("/nonexistent/allowlist.txt")
            .expect_err("missing file must be an error");
        assert!(matches!(err, AllowlistError::Read(path, _) if path.contains("allowlist.txt")));
    }
}
