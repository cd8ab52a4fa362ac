//! Background writer for session files
//!
//! A dedicated thread drains an unbounded channel. Everything queued since
//! the last pass is coalesced so only the newest bytes per file hit the disk.
//! Failures are logged and dropped; the next save of that file tries again.

use crate::json_file;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

enum Command {
    Write { file: &'static str, bytes: Vec<u8> },
    Flush(oneshot::Sender<()>),
}

#[derive(Debug)]
pub(super) struct SessionWriter {
    tx: Option<mpsc::UnboundedSender<Command>>,
    handle: Option<JoinHandle<()>>,
}

impl SessionWriter {
    pub(super) fn spawn(dir: PathBuf) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = std::thread::Builder::new()
            .name("session-writer".to_string())
            .spawn(move || run(&dir, rx))?;

        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    pub(super) fn submit(&self, file: &'static str, bytes: Vec<u8>) {
        self.send(Command::Write { file, bytes });
    }

    pub(super) fn flush(&self) {
        let (ack, done) = oneshot::channel();
        self.send(Command::Flush(ack));
        // Sender dropped means the thread is gone; nothing left to wait for
        let _ = done.blocking_recv();
    }

    fn send(&self, command: Command) {
        let sent = self.tx.as_ref().is_some_and(|tx| tx.send(command).is_ok());
        if !sent {
            warn!("Session writer has stopped; save dropped");
        }
    }
}

impl Drop for SessionWriter {
    fn drop(&mut self) {
        // Closing the channel lets the thread finish its backlog and exit
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Session writer thread panicked");
            }
        }
    }
}

fn run(dir: &Path, mut rx: mpsc::UnboundedReceiver<Command>) {
    while let Some(first) = rx.blocking_recv() {
        let mut pending: Vec<(&'static str, Vec<u8>)> = Vec::new();
        let mut acks = Vec::new();

        let mut next = Some(first);
        while let Some(command) = next {
            match command {
                Command::Write { file, bytes } => {
                    match pending.iter_mut().find(|(name, _)| *name == file) {
                        Some(slot) => slot.1 = bytes,
                        None => pending.push((file, bytes)),
                    }
                }
                Command::Flush(ack) => acks.push(ack),
            }
            next = rx.try_recv().ok();
        }

        for (file, bytes) in pending {
            match json_file::write_bytes_sync(&dir.join(file), &bytes) {
                Ok(()) => debug!("Saved {}", file),
                Err(e) => warn!("Failed to save {}: {}", file, e),
            }
        }

        for ack in acks {
            let _ = ack.send(());
        }
    }
    debug!("Session writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SessionWriter::spawn(dir.path().to_path_buf()).unwrap();

        for level in ["0.1", "0.2", "0.3"] {
            writer.submit("volume.json", level.as_bytes().to_vec());
        }
        writer.flush();

        let raw = std::fs::read_to_string(dir.path().join("volume.json")).unwrap();
        assert_eq!(raw, "0.3");
    }

    #[test]
    fn submit_returns_before_the_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = SessionWriter {
            tx: Some(tx),
            handle: None,
        };

        writer.submit("state.json", b"{}".to_vec());
        assert!(!dir.path().join("state.json").exists());

        let path = dir.path().to_path_buf();
        let worker = std::thread::spawn(move || run(&path, rx));
        drop(writer);
        worker.join().unwrap();

        assert!(dir.path().join("state.json").exists());
    }

    #[test]
    fn flush_after_close_does_not_hang() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = SessionWriter::spawn(dir.path().to_path_buf()).unwrap();
        writer.tx.take();
        writer.flush();
    }
}
