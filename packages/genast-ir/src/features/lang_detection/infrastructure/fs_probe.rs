//! Filesystem reads behind the classifier tests
//!
//! Each call opens and reads again; nothing is cached. A missing file is not
//! an error (it simply has no content and no permissions), any other I/O
//! failure is.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use crate::errors::ClassifyError;

/// Longest first line considered for a shebang
const MAX_FIRST_LINE: u64 = 4096;

fn io_error(path: &Path, source: io::Error) -> ClassifyError {
    ClassifyError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn open(path: &Path) -> Result<Option<File>, ClassifyError> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error(path, e)),
    }
}

/// File name ends with one of the configured extensions, or the path is
/// a regular file with an execute bit for anyone
pub fn is_executable(path: &Path, executable_extensions: &[String]) -> Result<bool, ClassifyError> {
    let name = path.to_string_lossy();
    if executable_extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
        return Ok(true);
    }
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(io_error(path, e)),
    };
    Ok(metadata.is_file() && has_execute_bit(&metadata))
}

#[cfg(unix)]
fn has_execute_bit(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_execute_bit(_metadata: &std::fs::Metadata) -> bool {
    false
}

/// First line without its terminator; `None` for a missing file
pub fn first_line(path: &Path) -> Result<Option<String>, ClassifyError> {
    let Some(file) = open(path)? else {
        return Ok(None);
    };
    let mut reader = BufReader::new(file.take(MAX_FIRST_LINE));
    let mut buf = Vec::new();
    reader
        .read_until(b'\n', &mut buf)
        .map_err(|e| io_error(path, e))?;
    let line = String::from_utf8_lossy(&buf);
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// At most `size` bytes from the start of the file; `None` for a missing file
pub fn first_block(path: &Path, size: usize) -> Result<Option<String>, ClassifyError> {
    let Some(file) = open(path)? else {
        return Ok(None);
    };
    let mut buf = Vec::with_capacity(size.min(64 * 1024));
    file.take(size as u64)
        .read_to_end(&mut buf)
        .map_err(|e| io_error(path, e))?;
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_first_line_and_block() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"#!/bin/sh\r\necho hi\n").unwrap();
        assert_eq!(
            first_line(file.path()).unwrap().as_deref(),
            Some("#!/bin/sh")
        );
        assert_eq!(first_block(file.path(), 5).unwrap().as_deref(), Some("#!/bi"));
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(first_line(&missing).unwrap(), None);
        assert_eq!(first_block(&missing, 10).unwrap(), None);
        assert!(!is_executable(&missing, &[]).unwrap());
    }

    #[test]
    fn test_configured_extension_short_circuits() {
        let exts = vec![".exe".to_string()];
        assert!(is_executable(Path::new("does/not/exist.exe"), &exts).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_bit() {
        use std::os::unix::fs::PermissionsExt;

        let file = NamedTempFile::new().unwrap();
        let mut perms = std::fs::metadata(file.path()).unwrap().permissions();
        perms.set_mode(0o644);
        std::fs::set_permissions(file.path(), perms.clone()).unwrap();
        assert!(!is_executable(file.path(), &[]).unwrap());

        perms.set_mode(0o755);
        std::fs::set_permissions(file.path(), perms).unwrap();
        assert!(is_executable(file.path(), &[]).unwrap());
    }

    #[test]
    fn test_directory_is_not_executable() {
        let dir = TempDir::new().unwrap();
        assert!(!is_executable(dir.path(), &[]).unwrap());
    }
}
