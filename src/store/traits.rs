//! Backend-agnostic repository traits.
//!
//! The engine treats persistence as injected capabilities; any backend that
//! implements these three traits works. Lookup failures (`NotFound`) are
//! integrity failures and propagate out of the turn.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::model::{Chart, ConversationTurn, Role, UserProfile};

/// User records, keyed by id and unique channel address.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by channel address.
    async fn find_by_address(&self, address: &str)
    -> Result<Option<UserProfile>, RepositoryError>;

    /// Create a fresh user for a channel address (first contact).
    async fn create(&self, address: &str) -> Result<UserProfile, RepositoryError>;

    /// Persist updated profile fields. Fails with `NotFound` for unknown ids.
    async fn update(&self, user: &UserProfile) -> Result<UserProfile, RepositoryError>;

    /// Get a user by id. Fails with `NotFound` if absent.
    async fn get(&self, id: Uuid) -> Result<UserProfile, RepositoryError>;
}

/// Chart storage: one chart per user, overwritten on regeneration.
#[async_trait]
pub trait ChartRepository: Send + Sync {
    /// Save (or replace) the owning user's chart.
    async fn save(&self, chart: &Chart) -> Result<Chart, RepositoryError>;

    /// The user's current chart, if any.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Chart>, RepositoryError>;
}

/// Append-only message log.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Append one turn to the log.
    async fn append(
        &self,
        user_id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<ConversationTurn, RepositoryError>;

    /// The most recent `limit` turns for a user, newest first.
    async fn recent(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, RepositoryError>;
}
