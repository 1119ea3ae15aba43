//! Audit log repository.
//!
//! The audit sink is fire-and-forget: callers log a warning on failure
//! and carry on. A lost audit row must never fail or roll back the
//! business operation that produced it.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use ledgerly_core::audit::AuditEvent;

use crate::entities::audit_log;

/// Audit log repository.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    db: DatabaseConnection,
}

impl AuditLogRepository {
    /// Creates a new audit log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Persists an audit event.
    ///
    /// # Errors
    ///
    /// Returns the database error; callers are expected to log and
    /// suppress it.
    pub async fn record(&self, event: &AuditEvent) -> Result<(), DbErr> {
        let row = audit_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            actor: Set(event.actor),
            action: Set(event.action.as_str().to_string()),
            entity: Set(event.entity.clone()),
            entity_id: Set(event.entity_id),
            details: Set(event.details.clone()),
            recorded_at: Set(event.recorded_at.into()),
        };

        row.insert(&self.db).await?;
        Ok(())
    }

    /// Lists the most recent events for one entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_entity(
        &self,
        entity: &str,
        entity_id: Uuid,
        limit: u64,
    ) -> Result<Vec<audit_log::Model>, DbErr> {
        audit_log::Entity::find()
            .filter(audit_log::Column::Entity.eq(entity))
            .filter(audit_log::Column::EntityId.eq(entity_id))
            .order_by_desc(audit_log::Column::RecordedAt)
            .limit(limit)
            .all(&self.db)
            .await
    }
}
