// SampleRig - S32K Analog Peripheral Simulation Bench
// Copyright (C) 2026 SampleRig contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Per-channel sample sources holding harness-fed conversion values.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SampleFileError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path:?}:{line}: expected an unsigned decimal sample, got {text:?}")]
    Malformed {
        path: PathBuf,
        line: usize,
        text: String,
    },
}

/// FIFO of pending samples with a sticky last value.
///
/// `take` never fails and never blocks: an exhausted queue keeps returning
/// the most recently dequeued value, and zero before anything was ever
/// dequeued.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SampleQueue {
    pending: VecDeque<u32>,
    last: u32,
}

impl SampleQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `repeat` copies of `value`.
    pub fn feed(&mut self, value: u32, repeat: u32) {
        for _ in 0..repeat {
            self.pending.push_back(value);
        }
    }

    /// Append `values` in order, the whole sequence repeated `repeat` times.
    pub fn feed_sequence(&mut self, values: &[u32], repeat: u32) {
        for _ in 0..repeat {
            self.pending.extend(values.iter().copied());
        }
    }

    /// Dequeue the next sample, or repeat the last one once exhausted.
    pub fn take(&mut self) -> u32 {
        if let Some(value) = self.pending.pop_front() {
            self.last = value;
        }
        self.last
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.last = 0;
    }
}

/// Parse a line-oriented sample file: one unsigned decimal integer per line,
/// surrounding whitespace tolerated. A blank or non-numeric line fails the
/// whole file, naming its 1-based line number; nothing is partially applied.
pub fn parse_sample_file(path: &Path) -> Result<Vec<u32>, SampleFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| SampleFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut samples = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let text = raw.trim();
        let value = text.parse::<u32>().map_err(|_| SampleFileError::Malformed {
            path: path.to_path_buf(),
            line: idx + 1,
            text: text.to_string(),
        })?;
        samples.push(value);
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn write_temp_file(prefix: &str, contents: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push("samplerig-core-tests");
        let _ = std::fs::create_dir_all(&dir);

        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = dir.join(format!("{}-{}.txt", prefix, nonce));
        std::fs::write(&path, contents).expect("Failed to write temp file");
        path
    }

    #[test]
    fn take_before_any_feed_returns_zero() {
        let mut q = SampleQueue::new();
        assert_eq!(q.take(), 0);
        assert_eq!(q.take(), 0);
    }

    #[test]
    fn fifo_order_then_sticky_last() {
        let mut q = SampleQueue::new();
        q.feed(10, 1);
        q.feed(20, 1);
        q.feed(30, 1);
        assert_eq!(q.take(), 10);
        assert_eq!(q.take(), 20);
        assert_eq!(q.take(), 30);
        assert_eq!(q.take(), 30);
        assert_eq!(q.take(), 30);
    }

    #[test]
    fn feed_appends_repeat_copies() {
        let mut q = SampleQueue::new();
        q.feed(7, 3);
        assert_eq!(q.pending_len(), 3);
        q.feed(9, 1);
        assert_eq!(q.take(), 7);
        assert_eq!(q.take(), 7);
        assert_eq!(q.take(), 7);
        assert_eq!(q.take(), 9);
    }

    #[test]
    fn feed_sequence_repeats_the_whole_sequence() {
        let mut q = SampleQueue::new();
        q.feed_sequence(&[1, 2], 2);
        assert_eq!(q.take(), 1);
        assert_eq!(q.take(), 2);
        assert_eq!(q.take(), 1);
        assert_eq!(q.take(), 2);
    }

    #[test]
    fn clear_drops_pending_and_sticky_state() {
        let mut q = SampleQueue::new();
        q.feed(42, 2);
        assert_eq!(q.take(), 42);
        q.clear();
        assert_eq!(q.pending_len(), 0);
        assert_eq!(q.take(), 0);
    }

    #[test]
    fn parse_accepts_decimal_lines_with_whitespace() {
        let path = write_temp_file("ok", "10\n20\n  30  \n");
        assert_eq!(parse_sample_file(&path).unwrap(), vec![10, 20, 30]);
    }

    #[test]
    fn parse_names_the_offending_line() {
        let path = write_temp_file("garbage", "10\nabc\n30\n");
        match parse_sample_file(&path) {
            Err(SampleFileError::Malformed { line, text, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(text, "abc");
            }
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn parse_rejects_blank_interior_lines() {
        let path = write_temp_file("blank", "10\n\n30\n");
        match parse_sample_file(&path) {
            Err(SampleFileError::Malformed { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn parse_rejects_negative_values() {
        let path = write_temp_file("negative", "-4\n");
        assert!(matches!(
            parse_sample_file(&path),
            Err(SampleFileError::Malformed { line: 1, .. })
        ));
    }

    #[test]
    fn parse_missing_file_is_an_io_error() {
        let path = PathBuf::from("/nonexistent/samplerig/ramp.txt");
        assert!(matches!(
            parse_sample_file(&path),
            Err(SampleFileError::Io { .. })
        ));
    }
}
