use std::{
    fmt,
    fs::OpenOptions,
    io::Write as _,
    path::{Path, PathBuf},
};

use axum::body::Bytes;
use http::Request;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Request => f.write_str("REQUEST"),
            Direction::Response => f.write_str("RESPONSE"),
        }
    }
}

/// Append-only trace of Messages traffic.
///
/// Each entry is a `<timestamp> <DIRECTION> <summary>` line followed by the
/// body. Headers are never written, so credentials stay out of the file.
/// Write failures are ignored.
#[derive(Debug, Clone)]
pub struct DebugLog {
    path: PathBuf,
}

impl DebugLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn request(&self, request: &Request<Bytes>) {
        let summary = format!("{} {}", request.method(), request.uri());
        self.write(Direction::Request, &summary, request.body());
    }

    pub fn response(&self, summary: &str, body: &[u8]) {
        self.write(Direction::Response, summary, body);
    }

    pub fn write(&self, direction: Direction, summary: &str, body: &[u8]) {
        let mut entry = format!("{} {direction} {summary}\n", jiff::Timestamp::now()).into_bytes();
        entry.extend_from_slice(body);
        entry.extend_from_slice(b"\n\n");

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(&entry));

        if let Err(err) = result {
            log::trace!("Failed to write debug log {}: {err}", self.path.display());
        }
    }
}
