//! Evaluation results: the persisted row shape, the append-only
//! log on disk, and a small in-memory ring of recent rows for the API.

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::classify::Label;
use crate::pipeline::RankingUnit;
use crate::report::Evaluation;
use crate::weights::WeightMethod;

/// One flat result row: item, score, label, timestamp (plus the method that
/// produced it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub item_name: String,
    pub method: WeightMethod,
    pub score: f64,
    pub label: Label,
    #[serde(with = "rfc3339")]
    pub timestamp: DateTime<Utc>,
}

impl ResultRecord {
    /// Rows for a finished evaluation. Expert-panel runs give one row per
    /// method (the aggregate); alternative runs give one row per alternative
    /// and method, named after the alternative.
    pub fn from_evaluation(ev: &Evaluation, at: DateTime<Utc>) -> Vec<Self> {
        let mut out = Vec::new();
        for outcome in &ev.comparison {
            match (ev.settings.ranking_unit, outcome.aggregate) {
                (RankingUnit::ExpertPanel, Some(agg)) => out.push(Self {
                    item_name: ev.item_name.clone(),
                    method: outcome.method,
                    score: agg.score,
                    label: agg.label,
                    timestamp: at,
                }),
                _ => out.extend(outcome.rows.iter().map(|r| Self {
                    item_name: r.identifier.clone(),
                    method: outcome.method,
                    score: r.closeness,
                    label: r.label,
                    timestamp: at,
                })),
            }
        }
        out
    }
}

/// Timestamps as RFC 3339 strings with second precision, always `Z`.
mod rfc3339 {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Append-only JSON Lines file of `ResultRecord`s.
#[derive(Debug)]
pub struct ResultLog {
    path: PathBuf,
    // Serialises appends from concurrent requests.
    write_lock: Mutex<()>,
}

impl ResultLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append rows, creating parent directories on first use.
    pub fn append(&self, records: &[ResultRecord]) -> io::Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut buf = Vec::new();
        for r in records {
            serde_json::to_writer(&mut buf, r)?;
            buf.push(b'\n');
        }

        let _guard = self.write_lock.lock();
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        f.write_all(&buf)?;
        f.flush()?;
        debug!(path = %self.path.display(), rows = records.len(), "result log appended");
        Ok(())
    }

    /// Every record in file order; a missing file is an empty log.
    /// Blank lines are skipped, malformed lines are an error.
    pub fn read_all(&self) -> io::Result<Vec<ResultRecord>> {
        let f = match fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut out = Vec::new();
        for (i, line) in BufReader::new(f).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let rec: ResultRecord = serde_json::from_str(&line).map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("line {}: {e}", i + 1),
                )
            })?;
            out.push(rec);
        }
        Ok(out)
    }
}

/// Bounded in-memory history of recent result rows.
#[derive(Debug)]
pub struct History {
    inner: Mutex<VecDeque<ResultRecord>>,
    cap: usize,
}

impl History {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 10_000);
        Self {
            inner: Mutex::new(VecDeque::with_capacity(cap)),
            cap,
        }
    }

    pub fn push(&self, records: &[ResultRecord]) {
        let mut v = self.inner.lock();
        v.extend(records.iter().cloned());
        while v.len() > self.cap {
            v.pop_front();
        }
    }

    /// Up to `n` most recent rows, oldest first.
    pub fn snapshot_last_n(&self, n: usize) -> Vec<ResultRecord> {
        let v = self.inner.lock();
        let start = v.len().saturating_sub(n);
        v.iter().skip(start).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
