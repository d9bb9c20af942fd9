//! Wallet file loading
//!
//! One mnemonic per line; surrounding whitespace is trimmed and blank lines
//! are ignored.

use crate::{Error, Result};
use secrecy::SecretString;
use std::path::Path;

pub fn load_mnemonics(path: &Path) -> Result<Vec<SecretString>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Wallet(format!("Failed to read {}: {}", path.display(), e)))?;
    Ok(parse_mnemonics(&content))
}

pub fn parse_mnemonics(content: &str) -> Vec<SecretString> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| SecretString::from(line.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;

    #[test]
    fn test_skips_blank_lines_and_trims() {
        let secrets = parse_mnemonics("  first phrase  \n\n\r\nsecond phrase\r\n   \n");
        let exposed: Vec<&str> = secrets.iter().map(|s| s.expose_secret()).collect();
        assert_eq!(exposed, vec!["first phrase", "second phrase"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha beta").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "gamma delta").unwrap();

        let secrets = load_mnemonics(file.path()).unwrap();
        assert_eq!(secrets.len(), 2);
        assert_eq!(secrets[1].expose_secret(), "gamma delta");
    }

    #[test]
    fn test_missing_file_is_wallet_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_mnemonics(&dir.path().join("wallet.txt"));
        assert!(matches!(result, Err(Error::Wallet(_))));
    }
}
