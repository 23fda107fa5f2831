// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::collections::VecDeque;

// Outbound bytes waiting to be written to the client. Responses are appended
// as commands are processed; the session drains the buffer from the front in
// bounded slices, the way a serial line delivers a long reply over several
// reads on the client side.
#[derive(Default, Debug)]
pub struct ResponseBuffer {
    pending: VecDeque<u8>,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        ResponseBuffer::default()
    }

    pub fn append(&mut self, data: &[u8]) {
        self.pending.extend(data);
    }

    /// Removes and returns up to `max_len` bytes from the front. Whatever is
    /// not returned stays at the front for the next pop().
    pub fn pop(&mut self, max_len: usize) -> Vec<u8> {
        let n = max_len.min(self.pending.len());
        self.pending.drain(..n).collect()
    }

    pub fn has_data(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

// mod tests.
