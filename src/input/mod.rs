pub mod csv;

pub use csv::load_csv;

use crate::core::VesselEvent;
use std::path::Path;
use thiserror::Error;

/// Errors produced while loading a vessel log
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CSV")]
    Csv(#[from] ::csv::Error),

    #[error("missing required column (expected one of {expected:?})")]
    MissingColumn { expected: &'static [&'static str] },

    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("{path} does not look like a CSV vessel log")]
    UnrecognizedFormat { path: String },
}

/// Load vessel events from a file, rejecting inputs that are clearly not
/// CSV before handing them to the parser
pub fn load_file(path: &Path) -> Result<Vec<VesselEvent>, LoadError> {
    let data = std::fs::read(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    if !looks_like_csv(&data) {
        return Err(LoadError::UnrecognizedFormat {
            path: path.display().to_string(),
        });
    }

    load_csv(path)
}

fn looks_like_csv(data: &[u8]) -> bool {
    if data.len() < 10 {
        return false;
    }

    // Text with comma-separated lines near the top
    let sample = std::str::from_utf8(&data[..data.len().min(500)]);
    match sample {
        Ok(text) => text
            .lines()
            .take(5)
            .any(|line| line.chars().filter(|&c| c == ',').count() >= 2),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_csv() {
        assert!(looks_like_csv(b"Name,Type,Direction,Date,Tonnage\n"));
        assert!(!looks_like_csv(b"\x7fELF\x02\x01\x01\x00\x00\x00\x00\x00"));
        assert!(!looks_like_csv(b"short"));
    }
}
