// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Output file names, the run log, and duration formatting.
//!
//! Thin contracts with the outside world: everything here is plain text
//! with a fixed shape, kept apart from the search so that the engine
//! never formats anything on the hot path.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// File name for one found sorting network.
///
/// Encodes width, depth, the 0-based layer-2 candidate index, the
/// number of non-redundant comparators, and the 1-based sequence number
/// within the task, e.g. `w8d5x99s12n20.txt`. Tasks own disjoint
/// layer-2 indices, so names never collide across threads.
pub fn sorter_file_name(
    width: usize,
    depth: usize,
    level2_index: usize,
    size: usize,
    sequence: u64,
) -> String {
    format!("w{width}d{depth}x{level2_index}s{size}n{sequence}.txt")
}

/// Render a duration as `h:mm:ss`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

/// The append-only run log.
///
/// Write failures are swallowed: losing a log line must never stop a
/// search that may have been running for weeks.
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record the start of a run.
    pub fn start(&self, width: usize, depth: usize) {
        self.append(&format!(
            "Searching for {width}-input sorting networks of depth {depth}"
        ));
    }

    /// Record the outcome of a run.
    pub fn finish(&self, count: u64, elapsed: Duration, cpu: Duration, threads: usize) {
        self.append(&format!(
            "{count} found in {} using {} CPU time over {threads} threads",
            format_duration(elapsed),
            format_duration(cpu),
        ));
    }

    fn append(&self, line: &str) {
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{line}"));

        if let Err(error) = result {
            debug!(path = %self.path.display(), %error, "log line dropped");
        }
    }
}
