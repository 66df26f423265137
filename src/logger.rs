use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::warn;

use crate::diff::diff_fields;
use crate::protocol::StatusFields;

pub enum MessageLogMode {
    Full,
    Diffed,
}

/// NDJSON trace of wire traffic. Callers pass already-redacted queries.
pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
    previous_status: Option<StatusFields>,
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            mode,
            file,
            previous_status: None,
        })
    }

    pub fn log_request(&mut self, path: &str) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "req",
            "path": path,
        });
        self.write_line(&entry);
    }

    pub fn log_command(&mut self, action: &str, query: &str) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "cmd",
            "action": action,
            "params": query,
        });
        self.write_line(&entry);
    }

    pub fn log_status(&mut self, fields: &StatusFields) {
        let entry = match (&self.mode, &self.previous_status) {
            (MessageLogMode::Diffed, Some(prev)) => {
                let changes: Vec<Value> = diff_fields(prev, fields)
                    .into_iter()
                    .map(|(key, old, new)| json!({ "key": key, "old": old, "new": new }))
                    .collect();
                json!({
                    "ts": Utc::now().to_rfc3339(),
                    "dir": "status",
                    "changes": changes,
                })
            }
            (MessageLogMode::Diffed, None) => json!({
                "ts": Utc::now().to_rfc3339(),
                "dir": "status",
                "full": true,
                "body": fields,
            }),
            (MessageLogMode::Full, _) => json!({
                "ts": Utc::now().to_rfc3339(),
                "dir": "status",
                "body": fields,
            }),
        };
        self.write_line(&entry);

        if matches!(self.mode, MessageLogMode::Diffed) {
            self.previous_status = Some(fields.clone());
        }
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write log entry: {e}");
        }
    }
}
