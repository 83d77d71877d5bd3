use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewEventId(pub String);

impl ViewEventId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Append-only "product viewed" record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewEvent {
    pub id: ViewEventId,
    pub slug: String,
    pub session_id: String,
    pub user_id: Option<String>,
    pub viewed_at: DateTime<Utc>,
}

impl ViewEvent {
    pub fn new(
        slug: impl Into<String>,
        session_id: impl Into<String>,
        user_id: Option<String>,
        viewed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ViewEventId::generate(),
            slug: slug.into(),
            session_id: session_id.into(),
            user_id: user_id.filter(|user| !user.trim().is_empty()),
            viewed_at,
        }
    }
}

/// Which identity two views must share to count as co-occurring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoOccurrenceGrouping {
    Session,
    Identity,
}

/// A view returned by the event store for decay weighting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoOccurringView {
    pub slug: String,
    pub viewed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::ViewEvent;

    #[test]
    fn blank_user_identity_is_dropped() {
        let event = ViewEvent::new("rtx-5070", "sess-1", Some("  ".to_owned()), Utc::now());
        assert!(event.user_id.is_none());
        assert!(!event.id.0.is_empty());
    }
}
