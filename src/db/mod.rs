//! Database layer - the narrow seam to the durable record store.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::{AchievementRecord, CheckpointRecord, Session, UserLocationLevel};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable record store operations required by the engine.
///
/// A production backend maps these onto its document/row primitives; the
/// only hard requirement is that [`create_session_if_absent`] is an
/// atomic check-then-act on (user_id, location_id, active), equivalent to
/// a unique constraint. Everything else is plain reads and writes.
///
/// [`create_session_if_absent`]: RecordStore::create_session_if_absent
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new session unless an active one already exists for the
    /// same (user, location). Returns `Conflict` when one does.
    async fn create_session_if_absent(&self, session: &Session) -> Result<Session>;

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>>;

    async fn find_active_session(
        &self,
        user_id: &str,
        location_id: &str,
    ) -> Result<Option<Session>>;

    async fn active_sessions_for_user(&self, user_id: &str) -> Result<Vec<Session>>;

    /// Persist a session's checkpoint high-water mark.
    async fn update_session_checkpoint(
        &self,
        session_id: &str,
        checkpointed_seconds: i64,
    ) -> Result<()>;

    /// Close a session. Idempotent: absent or already-ended sessions are
    /// a no-op, because duplicate exit events and retries are expected.
    async fn end_session(&self, session_id: &str, end_time: DateTime<Utc>) -> Result<()>;

    async fn get_level(
        &self,
        user_id: &str,
        location_id: &str,
    ) -> Result<Option<UserLocationLevel>>;

    async fn upsert_level(&self, level: &UserLocationLevel) -> Result<()>;

    async fn levels_for_user(&self, user_id: &str) -> Result<Vec<UserLocationLevel>>;

    /// Set every level row of the user back to level 1 with zero time.
    /// Returns the number of rows touched.
    async fn reset_levels(&self, user_id: &str) -> Result<usize>;

    async fn append_achievement(&self, user_id: &str, record: &AchievementRecord) -> Result<()>;

    async fn achievements_for_user(&self, user_id: &str) -> Result<Vec<AchievementRecord>>;

    /// Append a checkpoint audit row.
    async fn log_checkpoint(&self, record: &CheckpointRecord) -> Result<()>;
}
