//! Audit files
//!
//! After a shell task runs, each of its outputs gets a `<output>.au.json`
//! file recording the inputs, outputs, command and timing that produced it.

use crate::runner::Context;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Extension appended to an output path to get its audit file
pub const AUDIT_EXTENSION: &str = ".au.json";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Provenance of a set of outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditInfo {
    pub inputs: Vec<FileRef>,
    pub outputs: Vec<FileRef>,
    pub executors: Vec<Executor>,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Executor {
    pub image: Option<String>,
    pub command: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tags {
    pub start_time: String,
    pub end_time: String,
    /// `D-HH:MM:SS.micros`
    pub duration: String,
    pub duration_s: f64,
}

impl AuditInfo {
    pub fn new<'a>(
        command: &str,
        inputs: impl IntoIterator<Item = &'a String>,
        outputs: impl IntoIterator<Item = &'a String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        let micros = (end - start).num_microseconds().unwrap_or(0).max(0);

        AuditInfo {
            inputs: file_refs(inputs),
            outputs: file_refs(outputs),
            executors: vec![Executor {
                image: None,
                command: command.split(' ').map(str::to_string).collect(),
            }],
            tags: Tags {
                start_time: start.format(TIMESTAMP_FORMAT).to_string(),
                end_time: end.format(TIMESTAMP_FORMAT).to_string(),
                duration: format_duration(micros),
                duration_s: micros as f64 / 1_000_000.0,
            },
        }
    }

    /// Write this record next to every output, returning the files written
    pub fn write(&self, ctx: &Context) -> Result<Vec<PathBuf>> {
        let json = serde_json::to_string_pretty(self)?;
        let mut written = Vec::new();

        for output in &self.outputs {
            let path = ctx.locate(format!("{}{}", output.url, AUDIT_EXTENSION));
            fs::write(&path, &json)?;
            ctx.print_debug(&format!("Wrote audit file: {}", path.display()));
            written.push(path);
        }

        Ok(written)
    }
}

fn file_refs<'a>(paths: impl IntoIterator<Item = &'a String>) -> Vec<FileRef> {
    paths
        .into_iter()
        .map(|url| FileRef { url: url.clone() })
        .collect()
}

fn format_duration(micros: i64) -> String {
    let secs = micros / 1_000_000;
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;
    format!(
        "{}-{:02}:{:02}:{:02}.{:06}",
        days,
        hours,
        minutes,
        secs % 60,
        micros % 1_000_000
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::Verbosity;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0-00:00:00.000000");
        assert_eq!(format_duration(3_723_000_042), "0-01:02:03.000042");
        assert_eq!(format_duration(90_061_500_000), "1-01:01:01.500000");
    }

    #[test]
    fn test_audit_info_fields() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let end = start + Duration::milliseconds(1500);
        let inputs = vec!["in.gz".to_string()];
        let outputs = vec!["out.txt".to_string()];

        let info = AuditInfo::new("zcat in.gz > out.txt", &inputs, &outputs, start, end);

        assert_eq!(info.inputs, vec![FileRef { url: "in.gz".to_string() }]);
        assert_eq!(info.outputs, vec![FileRef { url: "out.txt".to_string() }]);
        assert_eq!(
            info.executors[0].command,
            vec!["zcat", "in.gz", ">", "out.txt"]
        );
        assert_eq!(info.tags.start_time, "2024-05-01T12:00:00.000000Z");
        assert_eq!(info.tags.end_time, "2024-05-01T12:00:01.500000Z");
        assert_eq!(info.tags.duration, "0-00:00:01.500000");
        assert_eq!(info.tags.duration_s, 1.5);
    }

    #[test]
    fn test_write_next_to_outputs() {
        let dir = TempDir::new().unwrap();
        let ctx = Context::new()
            .with_working_dir(dir.path().to_path_buf())
            .with_verbosity(Verbosity::Silent);

        let now = Utc::now();
        let outputs = vec!["a.txt".to_string()];
        let info = AuditInfo::new("touch a.txt", &Vec::new(), &outputs, now, now);

        let written = info.write(&ctx).unwrap();
        assert_eq!(written, vec![dir.path().join("a.txt.au.json")]);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(json["outputs"][0]["url"], "a.txt");
        assert!(json["executors"][0]["image"].is_null());
    }
}
