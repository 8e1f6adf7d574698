use std::fs;
use std::path::Path;

use crate::IoError;

/// Read a degree distribution: whitespace-separated weights up to end of file.
///
/// The weight at position `i` is the relative likelihood of a degree-`i`
/// packet, and the number of weights is the number of hops.
pub fn read_distribution(path: &Path) -> Result<Vec<f64>, IoError> {
    let text = fs::read_to_string(path).map_err(|source| IoError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_weights(&text, path)
}

pub fn parse_weights(text: &str, path: &Path) -> Result<Vec<f64>, IoError> {
    let weights = text
        .split_whitespace()
        .enumerate()
        .map(|(position, token)| {
            token.parse::<f64>().map_err(|_| IoError::Parse {
                path: path.to_path_buf(),
                position,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if weights.is_empty() {
        return Err(IoError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(text: &str) -> Result<Vec<f64>, IoError> {
        parse_weights(text, Path::new("dist.txt"))
    }

    #[test]
    fn test_any_whitespace_separates() {
        let weights = parse("0.1 0.4\n0.3\t0.2\n\n").unwrap();
        assert_eq!(weights, vec![0.1, 0.4, 0.3, 0.2]);
    }

    #[test]
    fn test_bad_token_is_reported_with_position() {
        match parse("0.5 0.5 abc 0.1") {
            Err(IoError::Parse { position, token, .. }) => {
                assert_eq!(position, 2);
                assert_eq!(token, "abc");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse("  \n "), Err(IoError::Empty { .. })));
    }

    #[test]
    fn test_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0 1").unwrap();
        let weights = read_distribution(file.path()).unwrap();
        assert_eq!(weights, vec![0.0, 1.0]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        assert!(matches!(
            read_distribution(&missing),
            Err(IoError::Open { .. })
        ));
    }
}
