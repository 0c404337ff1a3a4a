use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use crate::errors::ScanError;

/// Built-in traversal payloads used when no payload file is supplied, so the
/// scanner works out of the box.
pub const DEFAULT_PAYLOADS: &[&str] = &[
    "../../../../etc/passwd",
    "../../../../../../../../etc/passwd",
    "../../../../etc/passwd%00",
    "....//....//....//etc/passwd",
    "/etc/passwd",
    "../../../../etc/hosts",
    "/proc/self/environ",
    "..\\..\\..\\..\\boot.ini",
    "C:\\boot.ini",
    "php://filter/convert.base64-encode/resource=index.php",
    "/var/log/apache2/access.log",
];

pub fn default_payloads() -> Vec<String> {
    DEFAULT_PAYLOADS.iter().map(|s| s.to_string()).collect()
}

/// Loads newline-delimited payloads from a file, skipping blank lines and
/// `#` comments. An unreadable file is fatal: the scan must not start
/// half-configured.
pub fn load_payloads(path: &str) -> Result<Vec<String>, ScanError> {
    read_list(path).map_err(|source| ScanError::PayloadLoad {
        path: path.to_string(),
        source,
    })
}

/// Loads an indicator override list with the same filtering rules as
/// payload files.
pub fn load_indicators(path: &str) -> Result<Vec<String>, ScanError> {
    read_list(path).map_err(|source| ScanError::IndicatorLoad {
        path: path.to_string(),
        source,
    })
}

fn read_list(path: &str) -> io::Result<Vec<String>> {
    let file = fs::File::open(Path::new(path))?;
    let reader = io::BufReader::new(file);

    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        lines.push(trimmed.to_string());
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_skips_blanks_and_comments() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# traversal basics").unwrap();
        writeln!(file, "../../etc/passwd").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  /etc/hosts  ").unwrap();
        writeln!(file, "   ").unwrap();

        let payloads = load_payloads(file.path().to_str().unwrap()).unwrap();
        assert_eq!(payloads, vec!["../../etc/passwd", "/etc/hosts"]);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = load_payloads("no/such/payloads.txt").unwrap_err();
        assert!(matches!(err, ScanError::PayloadLoad { .. }));
    }

    #[test]
    fn test_default_payloads_nonempty() {
        assert!(!default_payloads().is_empty());
    }
}
