//! Upload sources

use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncReadExt};

/// A file given to the files API
pub enum FileSource {
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Filesystem path
    Path(PathBuf),
    /// Blocking stream handle
    Reader(Box<dyn Read + Send>),
    /// Stream handle whose reads suspend
    AsyncReader(Box<dyn AsyncRead + Send + Unpin>),
}

impl FileSource {
    /// Read the source to completion
    pub async fn read_all(self) -> std::io::Result<Vec<u8>> {
        match self {
            FileSource::Bytes(bytes) => Ok(bytes),
            FileSource::Path(path) => tokio::fs::read(&path).await,
            FileSource::Reader(mut reader) => tokio::task::spawn_blocking(move || {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                Ok::<_, std::io::Error>(buf)
            })
            .await
            .map_err(std::io::Error::other)?,
            FileSource::AsyncReader(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).await?;
                Ok(buf)
            }
        }
    }

    /// File name hint, if the source has one
    pub fn file_name(&self) -> Option<String> {
        match self {
            FileSource::Path(path) => path.file_name().map(|n| n.to_string_lossy().into_owned()),
            _ => None,
        }
    }
}

impl From<Vec<u8>> for FileSource {
    fn from(bytes: Vec<u8>) -> Self {
        FileSource::Bytes(bytes)
    }
}

impl From<&[u8]> for FileSource {
    fn from(bytes: &[u8]) -> Self {
        FileSource::Bytes(bytes.to_vec())
    }
}

impl From<PathBuf> for FileSource {
    fn from(path: PathBuf) -> Self {
        FileSource::Path(path)
    }
}

impl From<&std::path::Path> for FileSource {
    fn from(path: &std::path::Path) -> Self {
        FileSource::Path(path.to_path_buf())
    }
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSource::Bytes(b) => write!(f, "FileSource::Bytes({} bytes)", b.len()),
            FileSource::Path(p) => write!(f, "FileSource::Path({:?})", p),
            FileSource::Reader(_) => write!(f, "FileSource::Reader"),
            FileSource::AsyncReader(_) => write!(f, "FileSource::AsyncReader"),
        }
    }
}
