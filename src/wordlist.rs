// src/wordlist.rs
use crate::error::Result;
use crate::types::{Candidate, RustBruterError};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

/// Streams candidates from a wordlist file, one per non-blank line, without
/// loading the file into memory. A fresh stream always starts from the top
/// of the file.
pub struct WordlistSource {
    path: PathBuf,
    domain: String,
}

impl WordlistSource {
    pub fn new(path: impl AsRef<Path>, domain: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            domain: domain.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open(&self) -> Result<BufReader<File>> {
        let file = File::open(&self.path).await.map_err(|e| self.unreadable(e))?;
        Ok(BufReader::new(file))
    }

    /// Count candidates with a dedicated streaming pass. Also serves as the
    /// readability check before any output file is touched.
    pub async fn count_candidates(&self) -> Result<u64> {
        let mut lines = self.open().await?.lines();
        let mut count = 0u64;
        while let Some(line) = lines.next_line().await.map_err(|e| self.unreadable(e))? {
            if !line.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }

    pub async fn stream(&self) -> Result<CandidateStream> {
        Ok(CandidateStream {
            lines: self.open().await?.lines(),
            domain: self.domain.clone(),
            path: self.path.clone(),
        })
    }

    fn unreadable(&self, e: std::io::Error) -> RustBruterError {
        RustBruterError::WordlistError {
            path: self.path.display().to_string(),
            message: e.to_string(),
        }
    }
}

pub struct CandidateStream {
    lines: Lines<BufReader<File>>,
    domain: String,
    path: PathBuf,
}

impl CandidateStream {
    /// Next candidate in file order, skipping blank lines. `None` at EOF.
    pub async fn next_candidate(&mut self) -> Result<Option<Candidate>> {
        loop {
            let line = self.lines.next_line().await.map_err(|e| {
                RustBruterError::WordlistError {
                    path: self.path.display().to_string(),
                    message: e.to_string(),
                }
            })?;

            match line {
                Some(line) => {
                    let word = line.trim();
                    if word.is_empty() {
                        continue;
                    }
                    return Ok(Some(Candidate::new(word, self.domain.clone())));
                }
                None => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn wordlist_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_count_skips_blank_lines() {
        let file = wordlist_file("www\n\nmail\n   \nftp\n");
        let source = WordlistSource::new(file.path(), "example.com");
        assert_eq!(source.count_candidates().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_stream_yields_candidates_in_file_order() {
        let file = wordlist_file("www\n  mail  \n\nftp");
        let source = WordlistSource::new(file.path(), "example.com");
        let mut stream = source.stream().await.unwrap();

        let mut fqdns = Vec::new();
        while let Some(candidate) = stream.next_candidate().await.unwrap() {
            fqdns.push(candidate.fqdn());
        }

        assert_eq!(
            fqdns,
            vec!["www.example.com", "mail.example.com", "ftp.example.com"]
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_wordlist_error() {
        let source = WordlistSource::new("/nonexistent/words.txt", "example.com");
        let err = source.count_candidates().await.unwrap_err();
        assert!(matches!(err, RustBruterError::WordlistError { .. }));
    }
}
