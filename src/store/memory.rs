//! In-memory repository backend.
//!
//! Backs the CLI binary and the integration tests. Real deployments swap in
//! a database-backed implementation of the same traits.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::model::{Chart, ConversationTurn, Role, UserProfile};

use super::traits::{ChartRepository, MessageRepository, UserRepository};

/// All three repositories over tokio-guarded maps.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, UserProfile>>,
    ids_by_address: RwLock<HashMap<String, Uuid>>,
    charts: RwLock<HashMap<Uuid, Chart>>,
    turns: RwLock<Vec<ConversationTurn>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_address(
        &self,
        address: &str,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        let ids = self.ids_by_address.read().await;
        let Some(id) = ids.get(address) else {
            return Ok(None);
        };
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn create(&self, address: &str) -> Result<UserProfile, RepositoryError> {
        let user = UserProfile::new(address);
        self.ids_by_address
            .write()
            .await
            .insert(address.to_string(), user.id);
        self.users.write().await.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &UserProfile) -> Result<UserProfile, RepositoryError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(RepositoryError::NotFound {
                entity: "user".to_string(),
                id: user.id.to_string(),
            });
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn get(&self, id: Uuid) -> Result<UserProfile, RepositoryError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "user".to_string(),
                id: id.to_string(),
            })
    }
}

#[async_trait]
impl ChartRepository for MemoryStore {
    async fn save(&self, chart: &Chart) -> Result<Chart, RepositoryError> {
        self.charts
            .write()
            .await
            .insert(chart.user_id, chart.clone());
        Ok(chart.clone())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Chart>, RepositoryError> {
        Ok(self.charts.read().await.get(&user_id).cloned())
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn append(
        &self,
        user_id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<ConversationTurn, RepositoryError> {
        let turn = ConversationTurn {
            id: Uuid::new_v4(),
            user_id,
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        };
        self.turns.write().await.push(turn.clone());
        Ok(turn)
    }

    async fn recent(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, RepositoryError> {
        // The log is append-only, so reverse insertion order is
        // newest-first even when timestamps tie.
        Ok(self
            .turns
            .read()
            .await
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_and_find_by_address() {
        let store = MemoryStore::new();
        let user = store.create("tg:42").await.unwrap();
        let found = store.find_by_address("tg:42").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(store.find_by_address("tg:43").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_unknown_user_is_not_found() {
        let store = MemoryStore::new();
        let ghost = UserProfile::new("tg:99");
        let err = store.update(&ghost).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn get_unknown_user_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn recent_returns_newest_first_and_respects_limit() {
        let store = MemoryStore::new();
        let user = store.create("tg:42").await.unwrap();
        for i in 0..5 {
            store
                .append(user.id, Role::User, &format!("msg {i}"))
                .await
                .unwrap();
        }
        let recent = store.recent(user.id, 3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].content, "msg 4");
        assert_eq!(recent[2].content, "msg 2");
    }

    #[tokio::test]
    async fn chart_save_overwrites_per_user() {
        let store = MemoryStore::new();
        let user = store.create("tg:42").await.unwrap();
        let mut chart = crate::chart::fallback::fallback_chart(
            user.id,
            chrono::NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            "09:30",
        );
        store.save(&chart).await.unwrap();
        chart.sun_sign = "Leo".to_string();
        store.save(&chart).await.unwrap();
        let found = store.find_by_user(user.id).await.unwrap().unwrap();
        assert_eq!(found.sun_sign, "Leo");
    }
}
