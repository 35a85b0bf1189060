//! Module `file_ops`
//!
//! The transfer engine: copies bytes from a source to a sink in bounded
//! chunks. It does not care which end is the file, the listing output or the
//! data channel, so RETR, STOR and LIST all go through [`stream`].

use log::{debug, error};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::TransferError;

/// Default chunk size for transfers.
pub const DEFAULT_CHUNK_SIZE: usize = 65536;

/// Streams `source` into `sink` until `source` reports end-of-stream.
///
/// Each read of up to `chunk_size` bytes is written out completely and in
/// order before the next read. Returns the number of bytes moved. Neither
/// endpoint is closed here; on error the caller still owns and closes both.
pub async fn stream<R, W>(
    source: &mut R,
    sink: &mut W,
    chunk_size: usize,
) -> Result<u64, TransferError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;

    loop {
        let n = match source.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                error!("Read error after {} bytes: {}", total, e);
                return Err(TransferError::TransferFailed(e));
            }
        };

        if let Err(e) = sink.write_all(&buffer[..n]).await {
            error!("Write error after {} bytes: {}", total, e);
            return Err(TransferError::TransferFailed(e));
        }

        total += n as u64;
        debug!("Moved {} bytes ({} total)", n, total);
    }

    sink.flush().await.map_err(TransferError::TransferFailed)?;
    Ok(total)
}
