//! The seam between the collaborators and wherever their payloads live.
//!
//! Both the producer and the poller consume "a document from somewhere".
//! [`FileSource`] serves bundled offline documents; a live HTTP endpoint
//! would be another implementation behind the same trait.

use std::io;
use std::path::PathBuf;

/// A payload origin the collaborators can fetch from.
pub trait RemoteSource: Send + Sync {
    /// Fetches the current payload.
    fn fetch(&self) -> io::Result<String>;

    /// Human-readable description for logs and errors.
    fn describe(&self) -> String;
}

/// Reads the payload from a local file on every fetch.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RemoteSource for FileSource {
    fn fetch(&self) -> io::Result<String> {
        std::fs::read_to_string(&self.path)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Serves a fixed payload. Useful for tests and demos.
#[derive(Debug, Clone)]
pub struct StaticSource {
    body: String,
}

impl StaticSource {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl RemoteSource for StaticSource {
    fn fetch(&self) -> io::Result<String> {
        Ok(self.body.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn file_source_reads_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"payload").unwrap();
        let source = FileSource::new(file.path());
        assert_eq!(source.fetch().unwrap(), "payload");
        assert!(source.describe().starts_with("file:"));
    }

    #[test]
    fn file_source_surfaces_io_errors() {
        let source = FileSource::new("/nonexistent/feed.json");
        assert!(source.fetch().is_err());
    }

    #[test]
    fn static_source_repeats_its_body() {
        let source = StaticSource::new("x");
        assert_eq!(source.fetch().unwrap(), "x");
        assert_eq!(source.fetch().unwrap(), "x");
    }
}
