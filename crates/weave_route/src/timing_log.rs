//! Per-net, per-iteration routing times.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Time spent routing one net in one iteration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLogEntry {
    /// Net name.
    pub net: String,
    /// Zero-based global iteration.
    pub iteration: u32,
    /// Wall time in microseconds, unroute included.
    pub elapsed_us: u64,
}

/// Routing times collected over a run.
#[derive(Clone, Debug, Default)]
pub struct RouteLog {
    entries: Vec<RouteLogEntry>,
}

impl RouteLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one net routing.
    pub fn record(&mut self, net: &str, iteration: u32, elapsed: Duration) {
        self.entries.push(RouteLogEntry {
            net: net.to_string(),
            iteration,
            elapsed_us: u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
        });
    }

    /// All entries in recording order.
    pub fn entries(&self) -> &[RouteLogEntry] {
        &self.entries
    }

    /// Writes one JSON object per line.
    pub fn write_to(&self, out: &mut impl Write) -> std::io::Result<()> {
        for entry in &self.entries {
            serde_json::to_writer(&mut *out, entry)?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Writes the log to a file, replacing it.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write_to(&mut file)?;
        file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lines() {
        let mut log = RouteLog::new();
        log.record("a", 0, Duration::from_micros(15));
        log.record("b", 0, Duration::from_millis(2));
        let mut buf = Vec::new();
        log.write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: RouteLogEntry = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.net, "b");
        assert_eq!(second.elapsed_us, 2000);
    }

    #[test]
    fn save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("times.jsonl");
        let mut log = RouteLog::new();
        log.record("n", 3, Duration::ZERO);
        log.save(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\"net\":\"n\",\"iteration\":3,\"elapsed_us\":0}\n");
    }
}
