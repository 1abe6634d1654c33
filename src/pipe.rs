//! Feeding in-memory text to stream consumers through a bounded channel
//!
//! A producer thread writes the text in fixed-size chunks while the caller
//! reads it back through [`ChunkReader`]. The channel is bounded, so the
//! producer never runs further ahead than [`CHANNEL_DEPTH`] chunks.

use crate::{Error, Result};
use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;
use tracing::debug;

/// Bytes per chunk
pub const CHUNK_SIZE: usize = 1024;

/// Chunks buffered between producer and consumer
pub const CHANNEL_DEPTH: usize = 8;

/// Reading end of the pipe; EOF once the producer has sent everything
#[derive(Debug)]
pub struct ChunkReader {
    rx: Receiver<Vec<u8>>,
    current: Vec<u8>,
    pos: usize,
}

impl ChunkReader {
    const fn new(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            current: Vec::new(),
            pos: 0,
        }
    }
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.pos >= self.current.len() {
            match self.rx.recv() {
                Ok(chunk) => {
                    self.current = chunk;
                    self.pos = 0;
                }
                // Sender dropped: end of input
                Err(_) => return Ok(0),
            }
        }

        let n = buf.len().min(self.current.len() - self.pos);
        buf[..n].copy_from_slice(&self.current[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

fn produce(text: &[u8], tx: &SyncSender<Vec<u8>>, ready: &SyncSender<()>) {
    if text.is_empty() {
        let _ = ready.send(());
        return;
    }

    for (i, chunk) in text.chunks(CHUNK_SIZE).enumerate() {
        if tx.send(chunk.to_vec()).is_err() {
            // Consumer went away early
            debug!(chunk = i, "pipe consumer closed before end of input");
            break;
        }
        if i == 0 {
            let _ = ready.send(());
        }
    }
}

/// Stream `text` to `consumer` from a background producer thread
///
/// The producer is joined before this returns, whatever the consumer did.
pub fn read_through_pipe<T, F>(text: String, consumer: F) -> Result<T>
where
    F: FnOnce(&mut ChunkReader) -> Result<T>,
{
    let (tx, rx) = mpsc::sync_channel::<Vec<u8>>(CHANNEL_DEPTH);
    let (ready_tx, ready_rx) = mpsc::sync_channel::<()>(1);

    let producer = thread::Builder::new()
        .name("bibnorm-pipe".to_string())
        .spawn(move || produce(text.as_bytes(), &tx, &ready_tx))
        .map_err(Error::Pipe)?;

    // Disconnected means the producer finished or died without signalling;
    // either way the join below reports it
    let _ = ready_rx.recv();

    let mut reader = ChunkReader::new(rx);
    let result = consumer(&mut reader);
    drop(reader);

    producer
        .join()
        .map_err(|_| Error::Pipe(io::Error::new(io::ErrorKind::BrokenPipe, "pipe producer panicked")))?;

    result
}

/// Read all of `text` back through the pipe as a `String`
pub fn pipe_to_string(text: String) -> Result<String> {
    read_through_pipe(text, |reader| {
        let mut out = String::new();
        reader.read_to_string(&mut out)?;
        Ok(out)
    })
}
