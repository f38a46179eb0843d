use std::{
    fmt,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader},
};
use tracing::{debug, warn};
use tryhard::{RetryFutureConfig, retry_fn};

const OPEN_RETRIES: u32 = 3;
/// Longer lines are cut here; the rest up to the next newline is dropped.
const MAX_LINE_BYTES: u64 = 64 * 1024;
const STDIN_MARKER: &str = "-";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot open {source_name}: {source}")]
    Open { source_name: Source, source: io::Error },
    #[error("cannot list directory {}: {source}", path.display())]
    List { path: PathBuf, source: io::Error },
    #[error("read from {source_name} failed: {source}")]
    Read { source_name: Source, source: io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Turns command line arguments into concrete inputs.
///
/// Directories contribute their regular files in name order, skipping names
/// starting with `.` or `_` (bookkeeping files left by other tools).
pub async fn expand(arguments: &[PathBuf]) -> Result<Vec<Source>, IngestError> {
    let mut sources = Vec::new();
    for argument in arguments {
        if argument.as_os_str() == STDIN_MARKER {
            sources.push(Source::Stdin);
        } else if fs::metadata(argument)
            .await
            .is_ok_and(|meta| meta.is_dir())
        {
            let files = list_directory(argument).await?;
            if files.is_empty() {
                warn!(directory = %argument.display(), "input directory holds no log files");
            }
            sources.extend(files.into_iter().map(Source::File));
        } else {
            sources.push(Source::File(argument.clone()));
        }
    }
    Ok(sources)
}

async fn list_directory(path: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let list_error = |source| IngestError::List {
        path: path.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(path).await.map_err(list_error)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(list_error)? {
        let hidden = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || name.starts_with('_'));
        let is_file = entry
            .file_type()
            .await
            .map_err(list_error)?
            .is_file();
        if is_file && !hidden {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

pub struct LineReader {
    source: Source,
    reader: Box<dyn AsyncBufRead + Unpin + Send>,
    buf: Vec<u8>,
}

impl LineReader {
    /// Opens a source, retrying with exponential backoff before giving up.
    pub async fn open(source: &Source) -> Result<Self, IngestError> {
        let reader: Box<dyn AsyncBufRead + Unpin + Send> = match source {
            Source::Stdin => Box::new(BufReader::new(tokio::io::stdin())),
            Source::File(path) => {
                let config = RetryFutureConfig::new(OPEN_RETRIES)
                    .exponential_backoff(Duration::from_millis(50))
                    .max_delay(Duration::from_secs(2));
                let file = retry_fn(|| async {
                    debug!(path = %path.display(), "opening input");
                    File::open(path).await
                })
                .with_config(config)
                .await
                .map_err(|source_error| IngestError::Open {
                    source_name: source.clone(),
                    source: source_error,
                })?;
                Box::new(BufReader::new(file))
            }
        };
        Ok(Self {
            source: source.clone(),
            reader,
            buf: Vec::new(),
        })
    }

    /// Next line without its terminator, at most [`MAX_LINE_BYTES`] long.
    /// Bytes that are not UTF-8 are replaced.
    pub async fn next_line(&mut self) -> Result<Option<String>, IngestError> {
        self.buf.clear();
        let mut limited = (&mut self.reader).take(MAX_LINE_BYTES);
        let result = limited.read_until(b'\n', &mut self.buf).await;
        let read = result.map_err(|source| self.read_error(source))?;
        if read == 0 {
            return Ok(None);
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        } else if read as u64 == MAX_LINE_BYTES {
            debug!(source = %self.source, "truncated an overlong line");
            self.skip_rest_of_line().await?;
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }

    async fn skip_rest_of_line(&mut self) -> Result<(), IngestError> {
        loop {
            let available = self
                .reader
                .fill_buf()
                .await
                .map_err(|source| IngestError::Read {
                    source_name: self.source.clone(),
                    source,
                })?;
            let (used, done) = match available.iter().position(|b| *b == b'\n') {
                Some(newline) => (newline + 1, true),
                None => (available.len(), available.is_empty()),
            };
            self.reader.consume(used);
            if done {
                return Ok(());
            }
        }
    }

    fn read_error(&self, source: io::Error) -> IngestError {
        IngestError::Read {
            source_name: self.source.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asserting::prelude::*;
    use std::fs as std_fs;

    #[tokio::test]
    async fn directories_expand_to_sorted_visible_files() {
        let dir = tempfile::tempdir().unwrap();
        std_fs::write(dir.path().join("b.log"), "").unwrap();
        std_fs::write(dir.path().join("a.log"), "").unwrap();
        std_fs::write(dir.path().join("_SUCCESS"), "").unwrap();
        std_fs::write(dir.path().join(".a.log.crc"), "").unwrap();
        std_fs::create_dir(dir.path().join("nested")).unwrap();

        let sources = expand(&[dir.path().to_path_buf()]).await.unwrap();
        assert_that!(sources).is_equal_to(vec![
            Source::File(dir.path().join("a.log")),
            Source::File(dir.path().join("b.log")),
        ]);
    }

    #[tokio::test]
    async fn dash_means_stdin() {
        let sources = expand(&[PathBuf::from("-")]).await.unwrap();
        assert_that!(sources).is_equal_to(vec![Source::Stdin]);
    }

    #[tokio::test]
    async fn reads_lines_without_terminators() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        std_fs::write(&path, b"first\r\nsecond\n\n\xffthird").unwrap();

        let mut reader = LineReader::open(&Source::File(path)).await.unwrap();
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().await.unwrap() {
            lines.push(line);
        }
        assert_that!(lines).is_equal_to(vec![
            "first".to_string(),
            "second".to_string(),
            String::new(),
            "\u{fffd}third".to_string(),
        ]);
    }

    #[tokio::test]
    async fn overlong_lines_are_cut_without_losing_the_next_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.log");
        let mut contents = vec![b'a'; 3 * MAX_LINE_BYTES as usize];
        contents.extend_from_slice(b"\nnext\n");
        contents.extend(vec![b'b'; MAX_LINE_BYTES as usize + 10]);
        std_fs::write(&path, contents).unwrap();

        let mut reader = LineReader::open(&Source::File(path)).await.unwrap();
        let first = reader.next_line().await.unwrap().unwrap();
        assert_that!(first.len()).is_equal_to(MAX_LINE_BYTES as usize);
        assert_that!(reader.next_line().await.unwrap()).is_equal_to(Some("next".to_string()));
        let last = reader.next_line().await.unwrap().unwrap();
        assert_that!(last.len()).is_equal_to(MAX_LINE_BYTES as usize);
        assert_that!(reader.next_line().await.unwrap()).is_none();
    }

    #[tokio::test]
    async fn missing_files_fail_after_retrying() {
        let dir = tempfile::tempdir().unwrap();
        let source = Source::File(dir.path().join("absent.log"));
        let error = LineReader::open(&source).await.err().unwrap();
        assert_that!(error.to_string()).contains("absent.log");
    }
}
