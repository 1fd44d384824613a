//! In-memory transport for tests and offline replay

use super::Transport;
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::sync::Arc;

/// Mock transport shared between the test and the driver under test
///
/// Clones share state, so a test keeps one handle to inject bytes while the
/// driver owns the other.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Default)]
struct MockTransportInner {
    read_buffer: VecDeque<u8>,
    write_buffer: Vec<u8>,
    replies: Vec<(Vec<u8>, Vec<u8>)>,
    pending_error: Option<ErrorKind>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject data to be read
    pub fn inject_read(&self, data: &[u8]) {
        self.inner.lock().read_buffer.extend(data);
    }

    /// Queue `reply` for reading every time `command` is written
    pub fn reply_to(&self, command: &[u8], reply: &[u8]) {
        self.inner
            .lock()
            .replies
            .push((command.to_vec(), reply.to_vec()));
    }

    /// Make the next read fail with an I/O error of the given kind
    pub fn fail_next_read(&self, kind: ErrorKind) {
        self.inner.lock().pending_error = Some(kind);
    }

    /// Get all written data
    pub fn written(&self) -> Vec<u8> {
        self.inner.lock().write_buffer.clone()
    }

    /// Clear written data
    pub fn clear_written(&self) {
        self.inner.lock().write_buffer.clear();
    }

    /// Bytes injected but not yet read
    pub fn pending_read(&self) -> usize {
        self.inner.lock().read_buffer.len()
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.inner.lock();
        if let Some(kind) = inner.pending_error.take() {
            return Err(std::io::Error::from(kind).into());
        }

        let count = inner.read_buffer.len().min(buffer.len());
        for (slot, byte) in buffer.iter_mut().zip(inner.read_buffer.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let mut inner = self.inner.lock();
        inner.write_buffer.extend_from_slice(data);

        let reply = inner
            .replies
            .iter()
            .find(|(command, _)| command.as_slice() == data)
            .map(|(_, reply)| reply.clone());
        if let Some(reply) = reply {
            inner.read_buffer.extend(reply);
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn available(&mut self) -> Result<usize> {
        Ok(self.inner.lock().read_buffer.len())
    }
}
