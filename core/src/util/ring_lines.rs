use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// Bounded buffer keeping the most recent `cap` lines.
#[derive(Clone, Debug)]
pub struct RingLines {
    inner: Arc<Mutex<VecDeque<String>>>,
    cap: usize,
}

impl RingLines {
    pub fn new(cap: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(cap.min(1024)))),
            cap: cap.max(1),
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        let mut g = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if g.len() == self.cap {
            g.pop_front();
        }
        g.push_back(line.into());
    }

    pub fn to_vec(&self) -> Vec<String> {
        let g = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        g.iter().cloned().collect()
    }
}
