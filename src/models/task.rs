use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use super::RecordId;
use crate::error::AppError;

/// Represents a task as stored and returned by the API.
///
/// All four content fields are populated at all times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub status: String,
}

/// A validated task that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub status: String,
}

impl TaskDraft {
    pub fn into_task(self, id: RecordId) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            status: self.status,
        }
    }
}

/// Input for creating a task, before validation.
#[derive(Debug, Clone, Default, Validate)]
pub struct NewTask {
    #[validate(length(min = 1, message = "task title can not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "task description can not be empty"))]
    pub description: String,
    #[validate(required(message = "task due date can not be empty"))]
    pub due_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, message = "task status can not be empty"))]
    pub status: String,
}

impl NewTask {
    /// Validates every required field and produces a storable draft.
    pub fn into_draft(self) -> Result<TaskDraft, AppError> {
        self.validate()?;
        let due_date = self
            .due_date
            .ok_or_else(|| AppError::Validation("task due date can not be empty".into()))?;

        Ok(TaskDraft {
            title: self.title,
            description: self.description,
            due_date,
            status: self.status,
        })
    }
}

/// A partial update. `None` means "leave the stored value alone"; empty
/// strings are normalised to `None` on construction and never written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

impl TaskPatch {
    pub fn new(
        title: Option<String>,
        description: Option<String>,
        due_date: Option<DateTime<Utc>>,
        status: Option<String>,
    ) -> Self {
        Self {
            title: non_empty(title),
            description: non_empty(description),
            due_date,
            status: non_empty(status),
        }
    }

    /// True when the patch supplies no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
    }

    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(status) = &self.status {
            task.status = status.clone();
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Task fields as they arrive over the wire, for both create and update.
///
/// The due date is captured as raw text so that an unparsable value can be
/// reported with the expected format rather than a generic JSON error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TaskPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "raw_due_date")]
    pub due_date: Option<String>,
    pub status: Option<String>,
}

impl TaskPayload {
    pub fn into_new_task(self) -> Result<NewTask, AppError> {
        let due_date = parse_due_date(self.due_date.as_deref())?;
        Ok(NewTask {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            due_date,
            status: self.status.unwrap_or_default(),
        })
    }

    pub fn into_patch(self) -> Result<TaskPatch, AppError> {
        let due_date = parse_due_date(self.due_date.as_deref())?;
        Ok(TaskPatch::new(self.title, self.description, due_date, self.status))
    }
}

/// Seconds since the epoch of `0001-01-01T00:00:00Z`, the zero timestamp.
const ZERO_DUE_DATE_SECS: i64 = -62_135_596_800;

/// Parses an ISO 8601 / RFC 3339 timestamp. Absent or empty input, and the
/// zero timestamp, mean "no due date supplied".
pub fn parse_due_date(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    let text = match raw {
        None | Some("") => return Ok(None),
        Some(text) => text,
    };
    let due = DateTime::parse_from_rfc3339(text)
        .map_err(|_| AppError::InvalidDueDate)?
        .with_timezone(&Utc);

    if due.timestamp() == ZERO_DUE_DATE_SECS && due.timestamp_subsec_nanos() == 0 {
        return Ok(None);
    }
    Ok(Some(due))
}

// Accepts any JSON scalar so that e.g. a numeric due date reaches
// `parse_due_date` and fails there with the format hint.
fn raw_due_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

/// Response body of a successful update.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskUpdatedResponse {
    pub message: String,
    #[serde(rename = "updated task")]
    pub task: Task,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn due() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_new_task_validation() {
        let valid = NewTask {
            title: "t".into(),
            description: "d".into(),
            due_date: Some(due()),
            status: "open".into(),
        };
        let draft = valid.into_draft().unwrap();
        assert_eq!(draft.title, "t");
        assert_eq!(draft.due_date, due());

        let missing_title = NewTask {
            title: "".into(),
            description: "d".into(),
            due_date: Some(due()),
            status: "open".into(),
        };
        match missing_title.into_draft() {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "task title can not be empty"),
            other => panic!("unexpected result {:?}", other),
        }

        let missing_due_date = NewTask {
            title: "t".into(),
            description: "d".into(),
            due_date: None,
            status: "open".into(),
        };
        match missing_due_date.into_draft() {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "task due date can not be empty"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_patch_ignores_empty_fields() {
        let patch = TaskPatch::new(Some("".into()), Some("new".into()), None, Some("".into()));
        assert_eq!(patch.title, None);
        assert_eq!(patch.description.as_deref(), Some("new"));
        assert!(!patch.is_empty());

        let mut task = TaskDraft {
            title: "t".into(),
            description: "d".into(),
            due_date: due(),
            status: "open".into(),
        }
        .into_task(RecordId::generate());
        let before = task.clone();
        patch.apply_to(&mut task);

        assert_eq!(task.title, before.title);
        assert_eq!(task.description, "new");
        assert_eq!(task.due_date, before.due_date);
        assert_eq!(task.status, before.status);

        assert!(TaskPatch::new(Some("".into()), None, None, None).is_empty());
    }

    #[test]
    fn test_payload_due_date_parsing() {
        let payload: TaskPayload = serde_json::from_value(json!({
            "title": "t",
            "due_date": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        let new_task = payload.into_new_task().unwrap();
        assert_eq!(new_task.due_date, Some(due()));
        assert_eq!(new_task.description, "");

        let numeric: TaskPayload = serde_json::from_value(json!({ "due_date": 20250101 })).unwrap();
        assert!(matches!(numeric.into_patch(), Err(AppError::InvalidDueDate)));

        let garbled: TaskPayload = serde_json::from_value(json!({ "due_date": "2025-7-16" })).unwrap();
        assert!(matches!(garbled.into_new_task(), Err(AppError::InvalidDueDate)));

        let empty: TaskPayload = serde_json::from_value(json!({ "due_date": "" })).unwrap();
        assert_eq!(empty.into_patch().unwrap(), TaskPatch::default());
    }

    #[test]
    fn test_zero_due_date_counts_as_absent() {
        assert_eq!(parse_due_date(Some("0001-01-01T00:00:00Z")).unwrap(), None);
        assert_eq!(parse_due_date(Some("0001-01-01T02:00:00+02:00")).unwrap(), None);
        assert!(parse_due_date(Some("0001-01-01T00:00:01Z")).unwrap().is_some());

        let payload: TaskPayload = serde_json::from_value(json!({
            "title": "t",
            "description": "d",
            "due_date": "0001-01-01T00:00:00Z",
            "status": "open"
        }))
        .unwrap();
        match payload.into_new_task().unwrap().into_draft() {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "task due date can not be empty"),
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_update_response_wire_shape() {
        let task = TaskDraft {
            title: "t".into(),
            description: "d".into(),
            due_date: due(),
            status: "open".into(),
        }
        .into_task(RecordId::generate());
        let body = serde_json::to_value(TaskUpdatedResponse {
            message: "task updated successfully".into(),
            task,
        })
        .unwrap();
        assert_eq!(body["updated task"]["title"], "t");
        assert_eq!(body["updated task"]["due_date"], "2025-01-01T00:00:00Z");
    }
}
