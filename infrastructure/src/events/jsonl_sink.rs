//! JSONL file writer for pipeline events.
//!
//! Each [`PipelineEvent`] is serialized as a single JSON line with its
//! `type` tag and a `timestamp`, appended to the file via a buffered writer.

use redraft_application::ports::event_sink::{EventSink, PipelineEvent};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL event sink that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlEventSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlEventSink {
    /// Create a new sink writing to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create event log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create event log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the event log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for JsonlEventSink {
    fn record(&self, event: PipelineEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let Ok(serde_json::Value::Object(mut map)) = serde_json::to_value(&event) else {
            return;
        };
        map.insert(
            "timestamp".to_string(),
            serde_json::Value::String(timestamp),
        );

        let Ok(line) = serde_json::to_string(&serde_json::Value::Object(map)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            // Flush per event — JSONL is append-only and runs are short
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlEventSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redraft_domain::Category;
    use std::io::Read;

    #[test]
    fn test_jsonl_sink_writes_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let sink = JsonlEventSink::new(&path).unwrap();

        sink.record(PipelineEvent::TaskClassified {
            category: Category::Math,
            from_hint: false,
        });
        sink.record(PipelineEvent::CritiqueCollected {
            persona: "clarity".to_string(),
            delivered: true,
        });

        drop(sink);

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();

        let lines: Vec<&str> = content.trim().lines().collect();
        assert_eq!(lines.len(), 2);

        for line in &lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.get("type").is_some());
            assert!(value.get("timestamp").is_some());
        }

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "task_classified");
        assert_eq!(first["category"], "math");
        assert_eq!(first["from_hint"], false);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["type"], "critique_collected");
        assert_eq!(second["persona"], "clarity");
    }

    #[test]
    fn test_jsonl_sink_returns_none_for_invalid_path() {
        let result = JsonlEventSink::new("/proc/no-such-dir/events.jsonl");
        // Just verify it doesn't panic; exact behavior depends on permissions
        let _ = result;
    }
}
