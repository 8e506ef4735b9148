//! Wire-level data shared between the client and the job server.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Parameters for one bulk retrieval job.
///
/// Every field is passed to the server untouched; the server owns validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    #[serde(rename = "email_address")]
    pub account_email: String,
    #[serde(rename = "app_password")]
    pub credential: String,
    #[serde(rename = "sender_mail")]
    pub sender_filter: String,
    pub start_date: String,
    pub end_date: String,
}

/// Job state as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum JobStatus {
    Connecting,
    Running,
    Completed,
    Error,
    /// Any value the client does not know about, such as the server's
    /// `idle` placeholder before the first job.
    Unknown(String),
}

impl JobStatus {
    /// `completed` and `error` end a polling session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Connecting => "connecting",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
            JobStatus::Unknown(raw) => raw,
        }
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "connecting" => JobStatus::Connecting,
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "error" => JobStatus::Error,
            _ => JobStatus::Unknown(value),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time progress report returned by `GET /progress`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgressSnapshot {
    pub status: JobStatus,
    #[serde(default, deserialize_with = "nullable_string")]
    pub message: String,
    #[serde(default)]
    pub progress: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub files: Vec<FileRecord>,
}

/// One PDF the server saved while processing a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    // Raw mail headers; the server sends null when a header is missing.
    #[serde(default, deserialize_with = "nullable_string")]
    pub from: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub date: String,
}

/// Entry returned by `GET /files`, describing a file in the server's
/// download directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
    pub modified: String,
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_server_field_names() {
        let request = JobRequest {
            account_email: "me@example.com".to_string(),
            credential: "secret".to_string(),
            sender_filter: "billing@example.com".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-31".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["email_address"], "me@example.com");
        assert_eq!(value["app_password"], "secret");
        assert_eq!(value["sender_mail"], "billing@example.com");
        assert_eq!(value["start_date"], "2024-01-01");
        assert_eq!(value["end_date"], "2024-01-31");
    }

    #[test]
    fn unknown_status_keeps_raw_value() {
        let snapshot: ProgressSnapshot = serde_json::from_str(
            r#"{"status":"idle","message":"","progress":0,"total":0,"downloads":0,"files":[]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.status, JobStatus::Unknown("idle".to_string()));
        assert!(!snapshot.status.is_terminal());
        assert_eq!(snapshot.status.to_string(), "idle");
    }

    #[test]
    fn terminal_statuses() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Error.is_terminal());
        assert!(!JobStatus::Connecting.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    #[test]
    fn file_record_tolerates_missing_headers() {
        let snapshot: ProgressSnapshot = serde_json::from_str(
            r#"{
                "status": "completed",
                "message": "Complete! Downloaded 1 PDF(s).",
                "progress": 1,
                "total": 1,
                "downloads": 1,
                "files": [{"name": "a.pdf", "from": null, "subject": null, "date": null}]
            }"#,
        )
        .unwrap();

        let file = &snapshot.files[0];
        assert_eq!(file.name, "a.pdf");
        assert_eq!(file.from, "");
        assert_eq!(file.subject, None);
        assert_eq!(file.date, "");
    }

    #[test]
    fn negative_counts_are_rejected() {
        let result = serde_json::from_str::<ProgressSnapshot>(
            r#"{"status":"running","message":"","progress":-1,"total":3,"downloads":0,"files":[]}"#,
        );
        assert!(result.is_err());
    }
}
