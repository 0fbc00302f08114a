//! Shared I/O helpers for the frisct commands.
//!
//! Every subcommand follows the same convention: input comes from a file
//! when a path was given and from stdin otherwise, and primary output goes
//! to a file when a path was given and to stdout otherwise.

use std::io::{Read, Write};
use std::path::Path;

use crate::error::Result;

/// Reads the whole input: the file at `path`, or stdin when absent.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Like [`read_input`], but without assuming UTF-8 (lexer source text is a
/// byte sequence as far as the pipeline cares).
pub fn read_input_bytes(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => Ok(std::fs::read(path)?),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Writes `content` to the file at `path`, or to stdout when absent.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
            Ok(())
        }
        None => {
            std::io::stdout().write_all(content.as_bytes())?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_input_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.txt");
        std::fs::write(&path, "sadrzaj").unwrap();
        assert_eq!(read_input(Some(&path)).unwrap(), "sadrzaj");
        assert_eq!(read_input_bytes(Some(&path)).unwrap(), b"sadrzaj");
    }

    #[test]
    fn write_output_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out.txt");
        write_output(Some(&path), "x").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x");
    }
}
