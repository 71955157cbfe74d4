//! Per-user trip history.
//!
//! Planning itself never touches history; callers save a finished
//! [`TripPlan`] once the user decides to keep it.

use async_trait::async_trait;
use buswise_core::TripPlan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("user id must not be empty")]
    MissingUser,
}

pub type HistoryResult<T> = Result<T, HistoryError>;

/// A plan the user asked to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTripRecord {
    pub origin: String,
    pub destination: String,
    pub plan: TripPlan,
}

/// A stored trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripHistoryRecord {
    pub id: Uuid,
    pub user_id: String,
    pub origin: String,
    pub destination: String,
    /// When the record was saved
    pub date: DateTime<Utc>,
    pub plan: TripPlan,
}

/// Storage for saved trips, keyed by user.
#[async_trait]
pub trait TripHistoryStore: Send + Sync {
    /// Store a trip for `user_id`, stamping it with an id and the current time.
    async fn save(&self, user_id: &str, record: NewTripRecord) -> HistoryResult<TripHistoryRecord>;

    /// Up to `limit` trips of `user_id`, newest first.
    async fn recent(&self, user_id: &str, limit: usize) -> HistoryResult<Vec<TripHistoryRecord>>;

    /// Drop everything (useful for testing)
    async fn clear(&self) -> HistoryResult<()>;
}

/// In-memory history store.
///
/// Each user's trips are kept in save order. With a capacity set, the oldest
/// trip of a user is evicted once the capacity is reached.
#[derive(Clone, Debug, Default)]
pub struct InMemoryHistoryStore {
    data: Arc<RwLock<HashMap<String, Vec<TripHistoryRecord>>>>,
    per_user_capacity: Option<usize>,
}

impl InMemoryHistoryStore {
    pub fn new(per_user_capacity: Option<usize>) -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            per_user_capacity: per_user_capacity.filter(|&c| c > 0),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(Some(capacity))
    }
}

#[async_trait]
impl TripHistoryStore for InMemoryHistoryStore {
    async fn save(&self, user_id: &str, record: NewTripRecord) -> HistoryResult<TripHistoryRecord> {
        if user_id.is_empty() {
            return Err(HistoryError::MissingUser);
        }
        if record.origin.is_empty() || record.destination.is_empty() {
            return Err(HistoryError::MissingFields);
        }

        let stored = TripHistoryRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_owned(),
            origin: record.origin,
            destination: record.destination,
            date: Utc::now(),
            plan: record.plan,
        };

        let mut data = self.data.write().await;
        let trips = data.entry(user_id.to_owned()).or_default();
        if let Some(max) = self.per_user_capacity {
            let overflow = (trips.len() + 1).saturating_sub(max);
            trips.drain(..overflow);
        }
        trips.push(stored.clone());

        Ok(stored)
    }

    async fn recent(&self, user_id: &str, limit: usize) -> HistoryResult<Vec<TripHistoryRecord>> {
        let data = self.data.read().await;
        Ok(data
            .get(user_id)
            .map(|trips| trips.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn clear(&self) -> HistoryResult<()> {
        self.data.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(origin: &str, destination: &str) -> NewTripRecord {
        NewTripRecord {
            origin: origin.to_string(),
            destination: destination.to_string(),
            plan: TripPlan {
                summary: format!("{origin} to {destination}"),
                total_time: "30 minutes".to_string(),
                estimated_cost: "₹25".to_string(),
                maps_url: "https://maps.example.test".to_string(),
                debug_prompt: String::new(),
                steps: vec![],
            },
        }
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let store = InMemoryHistoryStore::unlimited();
        for i in 0..12 {
            store.save("u1", trip(&format!("Stop {i}"), "Hebbal")).await.unwrap();
        }

        let recent = store.recent("u1", 10).await.unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].origin, "Stop 11");
        assert_eq!(recent[9].origin, "Stop 2");
        assert!(recent.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let store = InMemoryHistoryStore::unlimited();
        store.save("u1", trip("Majestic", "Hebbal")).await.unwrap();
        store.save("u2", trip("Silk Board", "Whitefield")).await.unwrap();

        let recent = store.recent("u2", 10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].user_id, "u2");
        assert!(store.recent("nobody", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn capacity_evicts_oldest() {
        let store = InMemoryHistoryStore::with_capacity(2);
        store.save("u1", trip("First", "Hebbal")).await.unwrap();
        store.save("u1", trip("Second", "Hebbal")).await.unwrap();
        store.save("u1", trip("Third", "Hebbal")).await.unwrap();

        let origins: Vec<String> = store
            .recent("u1", 10)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.origin)
            .collect();
        assert_eq!(origins, vec!["Third", "Second"]);
    }

    #[tokio::test]
    async fn rejects_incomplete_records() {
        let store = InMemoryHistoryStore::unlimited();
        assert_eq!(
            store.save("u1", trip("", "Hebbal")).await.unwrap_err(),
            HistoryError::MissingFields
        );
        assert_eq!(
            store.save("", trip("Majestic", "Hebbal")).await.unwrap_err(),
            HistoryError::MissingUser
        );
        assert!(store.recent("u1", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = InMemoryHistoryStore::unlimited();
        store.save("u1", trip("Majestic", "Hebbal")).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.recent("u1", 10).await.unwrap().is_empty());
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = TripHistoryRecord {
            id: Uuid::nil(),
            user_id: "u1".to_string(),
            origin: "Majestic".to_string(),
            destination: "Hebbal".to_string(),
            date: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
            plan: trip("Majestic", "Hebbal").plan,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["plan"]["totalTime"], "30 minutes");
    }
}
