//! Streaming uploads to disk before anything touches a project.

use std::io;
use std::path::Path;

use tempfile::TempPath;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Read size for [`write_stream`].
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Copy `reader` into `target` in [`CHUNK_SIZE`] chunks until EOF, then flush.
///
/// Returns the number of bytes written. The first I/O error aborts the copy;
/// whatever was already written stays in `target`.
pub async fn write_stream<R, W>(reader: &mut R, target: &mut W) -> io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut written = 0u64;

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        target.write_all(&chunk[..n]).await?;
        written += n as u64;
    }

    target.flush().await?;
    Ok(written)
}

/// A fully received upload in the staging directory.
///
/// The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct StagingFile {
    path: TempPath,
    size: u64,
}

impl StagingFile {
    /// Stream `reader` into a fresh file under `dir`.
    ///
    /// On failure the partial file is removed before the error is returned.
    pub async fn receive<R>(dir: &Path, reader: &mut R) -> io::Result<Self>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        tokio::fs::create_dir_all(dir).await?;
        let (file, path) = tempfile::Builder::new()
            .prefix(".upload-")
            .tempfile_in(dir)?
            .into_parts();

        let mut file = tokio::fs::File::from_std(file);
        let size = write_stream(reader, &mut file).await?;
        drop(file);

        debug!(path = %path.display(), size, "upload staged");
        Ok(Self { path, size })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use tokio::io::ReadBuf;

    use super::*;

    /// Yields `good` bytes, then fails.
    struct Failing {
        good: Vec<u8>,
    }

    impl AsyncRead for Failing {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.good.is_empty() {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "client went away",
                )));
            }
            let n = self.good.len().min(buf.remaining());
            buf.put_slice(&self.good[..n]);
            self.good.drain(..n);
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn copies_across_chunk_boundaries() {
        let data: Vec<u8> = (0..CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        let mut reader = data.as_slice();
        let mut out = Vec::new();

        let written = write_stream(&mut reader, &mut out).await.unwrap();

        assert_eq!(written, data.len() as u64);
        assert_eq!(out, data);
    }

    #[tokio::test]
    async fn empty_stream_writes_nothing() {
        let mut reader: &[u8] = &[];
        let mut out = Vec::new();
        assert_eq!(write_stream(&mut reader, &mut out).await.unwrap(), 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn read_error_aborts() {
        let mut reader = Failing { good: vec![1; 100] };
        let mut out = Vec::new();

        let err = write_stream(&mut reader, &mut out).await.unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(out.len(), 100);
    }

    #[tokio::test]
    async fn staging_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader: &[u8] = b"payload";

        let staged = StagingFile::receive(dir.path(), &mut reader).await.unwrap();
        let path = staged.path().to_path_buf();
        assert_eq!(staged.size(), 7);
        assert_eq!(std::fs::read(&path).unwrap(), b"payload");

        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn failed_receive_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = Failing { good: vec![0; 10] };

        assert!(StagingFile::receive(dir.path(), &mut reader).await.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
