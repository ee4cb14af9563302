//! Local file access used as the upload source.

use std::future::Future;
use std::io;
use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt};

/// Sequential read access to local files.
pub trait LocalFiles {
    /// Reader returned by [`open`](Self::open).
    type Reader: AsyncRead + Unpin + Send;

    /// Returns the byte length of `path`.
    fn size(&self, path: &Path) -> impl Future<Output = io::Result<u64>> + Send;

    /// Opens `path` for sequential binary reading.
    fn open(&self, path: &Path) -> impl Future<Output = io::Result<Self::Reader>> + Send;
}

/// [`LocalFiles`] backed by `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

impl LocalFiles for TokioFs {
    type Reader = tokio::fs::File;

    async fn size(&self, path: &Path) -> io::Result<u64> {
        Ok(tokio::fs::metadata(path).await?.len())
    }

    async fn open(&self, path: &Path) -> io::Result<tokio::fs::File> {
        tokio::fs::File::open(path).await
    }
}

/// Fills `buf` from `r`, stopping early only at end of data.
///
/// Returns the number of bytes read; `0` means the source is exhausted.
pub(crate) async fn read_chunk<R>(r: &mut R, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
