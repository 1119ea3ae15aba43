//! Audit event types.
//!
//! Audit recording is fire-and-forget: a failure to persist an event is
//! logged as a degraded-mode warning by the caller and never fails the
//! business operation that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The action an audit event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    /// Entity created.
    Create,
    /// Entity updated.
    Update,
    /// Entity deleted.
    Delete,
    /// Transaction posted to the ledger.
    Post,
    /// Posted transaction voided.
    Void,
    /// Report generated.
    Generate,
    /// Report cancelled.
    Cancel,
}

impl AuditAction {
    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Post => "post",
            Self::Void => "void",
            Self::Generate => "generate",
            Self::Cancel => "cancel",
        }
    }
}

/// A structured audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// The authenticated principal who performed the action.
    pub actor: Uuid,
    /// The action performed.
    pub action: AuditAction,
    /// The entity kind, e.g. "transaction".
    pub entity: String,
    /// The entity's ID.
    pub entity_id: Uuid,
    /// Extra structured details.
    pub details: serde_json::Value,
    /// When the event occurred.
    pub recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(actor: Uuid, action: AuditAction, entity: &str, entity_id: Uuid) -> Self {
        Self {
            actor,
            action,
            entity: entity.to_string(),
            entity_id,
            details: serde_json::Value::Null,
            recorded_at: Utc::now(),
        }
    }

    /// Attaches structured details to the event.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_construction() {
        let actor = Uuid::new_v4();
        let entity_id = Uuid::new_v4();
        let event = AuditEvent::new(actor, AuditAction::Post, "transaction", entity_id)
            .with_details(json!({"transaction_number": "TXN202608010001"}));

        assert_eq!(event.actor, actor);
        assert_eq!(event.action, AuditAction::Post);
        assert_eq!(event.entity, "transaction");
        assert_eq!(event.entity_id, entity_id);
        assert_eq!(
            event.details["transaction_number"],
            "TXN202608010001"
        );
    }

    #[test]
    fn test_action_codes() {
        assert_eq!(AuditAction::Post.as_str(), "post");
        assert_eq!(AuditAction::Void.as_str(), "void");
        assert_eq!(AuditAction::Generate.as_str(), "generate");
    }
}
