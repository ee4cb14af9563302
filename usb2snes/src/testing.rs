//! Scripted fakes for unit tests.

use std::collections::{HashMap, VecDeque};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::json;

use crate::files::LocalFiles;
use crate::transport::{Frame, Transport};

/// Transport that replays queued replies and records what was sent.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    /// Frames handed out by `recv`, front first.
    pub inbox: VecDeque<Frame>,
    /// Every frame sent, in order.
    pub sent: Vec<Frame>,
    /// Reported by `is_open`.
    pub closed: bool,
    /// Number of further sends that succeed before the transport drops.
    pub sends_before_drop: Option<usize>,
    /// Number of further sends that succeed before sends start failing
    /// while the transport stays open.
    pub sends_before_error: Option<usize>,
    /// Delay applied to every `recv`.
    pub recv_delay: Option<Duration>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues a `{"Results": [...]}` reply.
    pub(crate) fn reply(mut self, results: &[&str]) -> Self {
        self.inbox
            .push_back(Frame::Text(json!({ "Results": results }).to_string()));
        self
    }

    /// Queues an arbitrary frame.
    pub(crate) fn frame(mut self, frame: Frame) -> Self {
        self.inbox.push_back(frame);
        self
    }

    /// Decoded JSON of every text frame sent.
    pub(crate) fn commands(&self) -> Vec<serde_json::Value> {
        self.sent
            .iter()
            .filter_map(|f| match f {
                Frame::Text(t) => Some(serde_json::from_str(t).unwrap()),
                Frame::Binary(_) => None,
            })
            .collect()
    }

    /// Lengths of every binary frame sent.
    pub(crate) fn binary_sizes(&self) -> Vec<usize> {
        self.sent
            .iter()
            .filter_map(|f| match f {
                Frame::Binary(b) => Some(b.len()),
                Frame::Text(_) => None,
            })
            .collect()
    }

    fn push(&mut self, frame: Frame) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        }
        if let Some(n) = self.sends_before_drop.as_mut() {
            if *n == 0 {
                self.closed = true;
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "dropped"));
            }
            *n -= 1;
        }
        if let Some(n) = self.sends_before_error.as_mut() {
            if *n == 0 {
                return Err(io::Error::new(io::ErrorKind::WouldBlock, "send refused"));
            }
            *n -= 1;
        }
        self.sent.push(frame);
        Ok(())
    }
}

impl Transport for ScriptedTransport {
    async fn send_text(&mut self, text: String) -> io::Result<()> {
        self.push(Frame::Text(text))
    }

    async fn send_binary(&mut self, data: Vec<u8>) -> io::Result<()> {
        self.push(Frame::Binary(data))
    }

    async fn recv(&mut self) -> io::Result<Option<Frame>> {
        if let Some(delay) = self.recv_delay {
            tokio::time::sleep(delay).await;
        }
        let frame = self.inbox.pop_front();
        if frame.is_none() {
            // Mirrors the daemon hanging up when it has nothing to say.
            self.closed = true;
        }
        Ok(frame)
    }

    fn is_open(&self) -> bool {
        !self.closed
    }
}

/// In-memory files whose reported size may disagree with their contents.
#[derive(Debug, Default)]
pub(crate) struct MemoryFiles {
    files: HashMap<PathBuf, (u64, Vec<u8>)>,
}

impl MemoryFiles {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, path: &str, data: Vec<u8>) -> Self {
        let len = data.len() as u64;
        self.files.insert(PathBuf::from(path), (len, data));
        self
    }

    /// A file that claims `declared` bytes but holds `data`.
    pub(crate) fn with_truncated(mut self, path: &str, declared: u64, data: Vec<u8>) -> Self {
        self.files.insert(PathBuf::from(path), (declared, data));
        self
    }

    fn get(&self, path: &Path) -> io::Result<&(u64, Vec<u8>)> {
        self.files
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }
}

impl LocalFiles for MemoryFiles {
    type Reader = Cursor<Vec<u8>>;

    async fn size(&self, path: &Path) -> io::Result<u64> {
        Ok(self.get(path)?.0)
    }

    async fn open(&self, path: &Path) -> io::Result<Cursor<Vec<u8>>> {
        Ok(Cursor::new(self.get(path)?.1.clone()))
    }
}
