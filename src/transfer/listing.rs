//! Module `listing`
//!
//! Produces the byte stream LIST sends over the data channel. The default
//! backend runs an external listing program and hands back its standard
//! output; the native backend formats directory entries itself.

use log::{debug, info, warn};
use std::fs::Metadata;
use std::io::{self, Cursor};
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncRead;
use tokio::process::{Child, ChildStdout, Command};

use crate::config::{ListBackend, ServerConfig};

/// Knows how to start a listing of a directory under the server root.
#[derive(Debug, Clone)]
pub enum Lister {
    /// Runs `program -l [path]` with the server root as working directory.
    Process { program: String },
    Native,
}

/// A running listing whose bytes are ready to be streamed.
pub enum Listing {
    Process { child: Child, stdout: ChildStdout },
    Native(Cursor<Vec<u8>>),
}

impl Lister {
    pub fn from_config(config: &ServerConfig) -> Self {
        match config.list_backend {
            ListBackend::Process => Lister::Process {
                program: config.list_program.clone(),
            },
            ListBackend::Native => Lister::Native,
        }
    }

    /// Starts listing `path` (already stripped of its leading separator),
    /// or the server root itself when `path` is `None`.
    ///
    /// A missing path fails here for the native backend. The process backend
    /// starts anyway; the program exits non-zero with nothing on stdout, so
    /// the listing just comes out empty.
    pub async fn start(&self, server_root: &Path, path: Option<&str>) -> io::Result<Listing> {
        match self {
            Lister::Process { program } => spawn_listing(program, server_root, path),
            Lister::Native => {
                let target = match path {
                    Some(p) => server_root.join(p),
                    None => server_root.to_path_buf(),
                };
                let bytes = native_listing(&target).await?;
                Ok(Listing::Native(Cursor::new(bytes)))
            }
        }
    }
}

impl Listing {
    /// The listing bytes as a readable stream.
    pub fn reader(&mut self) -> &mut (dyn AsyncRead + Unpin + Send) {
        match self {
            Listing::Process { stdout, .. } => stdout,
            Listing::Native(cursor) => cursor,
        }
    }

    /// Reaps the listing process once its output has been drained.
    pub async fn finish(self) {
        if let Listing::Process { mut child, stdout } = self {
            drop(stdout);
            match child.wait().await {
                Ok(status) if status.success() => debug!("Listing process exited: {}", status),
                Ok(status) => warn!("Listing process exited with {}", status),
                Err(e) => warn!("Failed to wait for listing process: {}", e),
            }
        }
    }

    /// Stops a listing whose output will never be read.
    pub async fn abort(self) {
        if let Listing::Process { mut child, stdout } = self {
            drop(stdout);
            if let Err(e) = child.kill().await {
                warn!("Failed to kill listing process: {}", e);
            }
        }
    }
}

fn spawn_listing(program: &str, server_root: &Path, path: Option<&str>) -> io::Result<Listing> {
    let mut command = Command::new(program);
    command
        .arg("-l")
        .args(path)
        .current_dir(server_root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let mut child = command.spawn()?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "listing stdout not captured"))?;

    info!(
        "Spawned {} -l {} in {}",
        program,
        path.unwrap_or(""),
        server_root.display()
    );
    Ok(Listing::Process { child, stdout })
}

/// Formats `target` one entry per line: type and permission bits, size, name.
///
/// A plain file lists itself, like `ls -l file` does.
async fn native_listing(target: &Path) -> io::Result<Vec<u8>> {
    let metadata = tokio::fs::metadata(target).await?;

    let mut entries: Vec<(String, Metadata)> = Vec::new();
    if metadata.is_dir() {
        let mut dir = tokio::fs::read_dir(target).await?;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            match entry.metadata().await {
                Ok(meta) => entries.push((name, meta)),
                Err(e) => warn!("Skipping {} in listing: {}", name, e),
            }
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
    } else {
        entries.push((display_name(target), metadata));
    }

    let mut out = String::new();
    for (name, meta) in &entries {
        out.push_str(&format_entry(name, meta));
    }
    Ok(out.into_bytes())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn format_entry(name: &str, meta: &Metadata) -> String {
    let kind = if meta.is_dir() {
        'd'
    } else if meta.file_type().is_symlink() {
        'l'
    } else {
        '-'
    };
    format!("{}{} {:>12} {}\r\n", kind, permission_string(meta), meta.len(), name)
}

#[cfg(unix)]
fn permission_string(meta: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;

    let mode = meta.permissions().mode();
    let flags = ['r', 'w', 'x'];
    (0..9)
        .map(|bit| {
            if mode & (0o400 >> bit) != 0 {
                flags[bit % 3]
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(not(unix))]
fn permission_string(meta: &Metadata) -> String {
    if meta.permissions().readonly() {
        "r--r--r--".to_string()
    } else {
        "rw-rw-rw-".to_string()
    }
}
