//! The on-disk migration ledger.
//!
//! The ledger is a directory committed to version control, with one
//! subdirectory per schema change. Each subdirectory is named
//! `YYYYMMDDHHMMSS_label` (a sortable timestamp prefix plus a lowercase
//! label) and contains a single `migration.sql` script of DDL statements.
//! Entries are immutable once committed; the runner verifies this with a
//! content checksum before touching the database.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the SQL script inside each ledger entry directory.
pub const SCRIPT_FILE: &str = "migration.sql";

/// Length of the timestamp prefix in an entry name.
const TIMESTAMP_LEN: usize = 14;

/// One entry of the migration ledger, loaded from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Entry identifier: the directory name, e.g. `20250114090000_create_posts`.
    pub name: String,
    /// Contents of the entry's `migration.sql`.
    pub sql: String,
    /// Lowercase hex SHA-256 of the SQL bytes.
    pub checksum: String,
}

/// Errors that can occur while loading the ledger from disk.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger directory does not exist.
    #[error("migration ledger directory not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The ledger directory exists but contains no entries.
    #[error("migration ledger is empty: {}", .0.display())]
    Empty(PathBuf),

    /// An entry directory name is not `YYYYMMDDHHMMSS_label`.
    #[error("invalid ledger entry name: '{0}'")]
    InvalidName(String),

    /// An entry directory has no `migration.sql` inside.
    #[error("ledger entry '{0}' has no migration.sql")]
    MissingScript(String),

    /// Filesystem error while scanning or reading.
    #[error("failed to read migration ledger: {0}")]
    Io(#[from] std::io::Error),
}

/// Computes the content checksum of a migration script.
pub fn checksum(sql: &str) -> String {
    hex::encode(Sha256::digest(sql.as_bytes()))
}

/// Checks that an entry name is a 14-digit timestamp, an underscore, and a
/// non-empty lowercase label.
fn is_valid_entry_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.len() < TIMESTAMP_LEN + 2 {
        return false;
    }
    if !bytes[..TIMESTAMP_LEN].iter().all(u8::is_ascii_digit) {
        return false;
    }
    if bytes[TIMESTAMP_LEN] != b'_' {
        return false;
    }
    bytes[TIMESTAMP_LEN + 1..]
        .iter()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'_')
}

/// Loads the migration ledger from `dir`, sorted ascending by entry name.
///
/// Plain files in the ledger directory (lock files, notes) are ignored, but a
/// subdirectory with a malformed name is an error: a misnamed entry would
/// silently change apply order, which is exactly what the naming scheme
/// exists to prevent.
///
/// # Errors
///
/// Returns [`LedgerError`] if the directory is missing or empty, an entry is
/// malformed, or a script cannot be read.
pub fn load_ledger(dir: &Path) -> Result<Vec<LedgerEntry>, LedgerError> {
    if !dir.is_dir() {
        return Err(LedgerError::NotFound(dir.to_path_buf()));
    }

    let mut entries = Vec::new();

    for dirent in std::fs::read_dir(dir)? {
        let dirent = dirent?;
        if !dirent.file_type()?.is_dir() {
            continue;
        }

        let name = dirent.file_name().to_string_lossy().into_owned();
        if !is_valid_entry_name(&name) {
            return Err(LedgerError::InvalidName(name));
        }

        let script_path = dirent.path().join(SCRIPT_FILE);
        if !script_path.is_file() {
            return Err(LedgerError::MissingScript(name));
        }
        let sql = std::fs::read_to_string(&script_path)?;
        let checksum = checksum(&sql);

        entries.push(LedgerEntry { name, sql, checksum });
    }

    if entries.is_empty() {
        return Err(LedgerError::Empty(dir.to_path_buf()));
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_entry(dir: &Path, name: &str, sql: &str) {
        let entry_dir = dir.join(name);
        std::fs::create_dir(&entry_dir).expect("should create entry dir");
        std::fs::write(entry_dir.join(SCRIPT_FILE), sql).expect("should write script");
    }

    #[test]
    fn loads_entries_sorted_by_name() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        write_entry(dir.path(), "20250102000000_second", "CREATE TABLE b (id INT);");
        write_entry(dir.path(), "20250101000000_first", "CREATE TABLE a (id INT);");

        let ledger = load_ledger(dir.path()).expect("should load ledger");
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].name, "20250101000000_first");
        assert_eq!(ledger[1].name, "20250102000000_second");
        assert_eq!(ledger[0].sql, "CREATE TABLE a (id INT);");
    }

    #[test]
    fn checksum_is_stable_and_content_sensitive() {
        assert_eq!(checksum("CREATE TABLE a;"), checksum("CREATE TABLE a;"));
        assert_ne!(checksum("CREATE TABLE a;"), checksum("CREATE TABLE b;"));
        // 32 bytes of SHA-256 as lowercase hex.
        assert_eq!(checksum("").len(), 64);
    }

    #[test]
    fn ignores_plain_files_in_ledger_dir() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        write_entry(dir.path(), "20250101000000_init", "SELECT 1;");
        std::fs::write(dir.path().join("README"), "notes").expect("should write file");

        let ledger = load_ledger(dir.path()).expect("should load ledger");
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn rejects_malformed_entry_names() {
        for bad in [
            "create_posts",            // no timestamp
            "2025_create_posts",       // short timestamp
            "20250101000000",          // no label
            "20250101000000_",         // empty label
            "20250101000000-init",     // wrong separator
            "20250101000000_Init",     // uppercase label
        ] {
            assert!(!is_valid_entry_name(bad), "accepted: {bad}");
        }
        assert!(is_valid_entry_name("20250114090000_create_posts"));
        assert!(is_valid_entry_name("20250114090500_add_index_2"));
    }

    #[test]
    fn malformed_entry_dir_is_an_error() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        write_entry(dir.path(), "20250101000000_init", "SELECT 1;");
        std::fs::create_dir(dir.path().join("not-a-migration")).expect("should create dir");

        let err = load_ledger(dir.path()).expect_err("should reject malformed name");
        assert!(matches!(err, LedgerError::InvalidName(name) if name == "not-a-migration"));
    }

    #[test]
    fn entry_without_script_is_an_error() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        std::fs::create_dir(dir.path().join("20250101000000_init")).expect("should create dir");

        let err = load_ledger(dir.path()).expect_err("should reject missing script");
        assert!(matches!(err, LedgerError::MissingScript(name) if name == "20250101000000_init"));
    }

    #[test]
    fn missing_and_empty_directories_are_distinct_errors() {
        let dir = tempfile::tempdir().expect("should create tempdir");

        let missing = dir.path().join("nonexistent");
        assert!(matches!(
            load_ledger(&missing),
            Err(LedgerError::NotFound(_))
        ));

        assert!(matches!(
            load_ledger(dir.path()),
            Err(LedgerError::Empty(_))
        ));
    }
}
