//! FTP control line framing
//!
//! Reads command lines terminated by CR, LF or CRLF. Bytes past the
//! configured maximum length are dropped up to the terminator.

use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub struct LineReader<R> {
    reader: R,
    max_len: usize,
    skip_lf: bool,
}

impl<R> LineReader<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(reader: R, max_len: usize) -> Self {
        Self {
            reader,
            max_len,
            skip_lf: false,
        }
    }

    /// Reads the next line without its terminator.
    ///
    /// Returns `Ok(None)` once the peer has closed the connection and no
    /// partial line is pending.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = Vec::new();
        let mut pending = false;

        loop {
            let buf = self.reader.fill_buf().await?;
            if buf.is_empty() {
                return Ok(pending.then(|| String::from_utf8_lossy(&line).into_owned()));
            }

            let mut consumed = 0;
            let mut complete = false;
            for &byte in buf {
                consumed += 1;
                if self.skip_lf {
                    self.skip_lf = false;
                    if byte == b'\n' {
                        continue;
                    }
                }
                match byte {
                    b'\r' => {
                        self.skip_lf = true;
                        complete = true;
                        break;
                    }
                    b'\n' => {
                        complete = true;
                        break;
                    }
                    _ => {
                        pending = true;
                        if line.len() < self.max_len {
                            line.push(byte);
                        }
                    }
                }
            }
            self.reader.consume(consumed);

            if complete {
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }
        }
    }
}
