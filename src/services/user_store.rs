use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use crate::models::{MediaKind, Rating, WatchlistEntry};

/// Ratings and watchlist for one user
#[derive(Debug, Default, Clone)]
struct UserLists {
    ratings: Vec<Rating>,
    watchlist: Vec<WatchlistEntry>,
}

/// In-memory ratings and watchlist store keyed by user id
#[derive(Default)]
pub struct UserStore {
    users: RwLock<HashMap<String, UserLists>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rating, replacing any earlier score for the same item
    pub async fn upsert_rating(&self, user_id: &str, rating: Rating) {
        let mut users = self.users.write().await;
        let lists = users.entry(user_id.to_string()).or_default();

        if let Some(existing) = lists
            .ratings
            .iter_mut()
            .find(|r| r.media_type == rating.media_type && r.item_id == rating.item_id)
        {
            existing.score = rating.score;
        } else {
            lists.ratings.push(rating);
        }
    }

    pub async fn remove_rating(&self, user_id: &str, media_type: MediaKind, item_id: u64) {
        if let Some(lists) = self.users.write().await.get_mut(user_id) {
            lists
                .ratings
                .retain(|r| !(r.media_type == media_type && r.item_id == item_id));
        }
    }

    pub async fn ratings(&self, user_id: &str) -> Vec<Rating> {
        self.users
            .read()
            .await
            .get(user_id)
            .map(|lists| lists.ratings.clone())
            .unwrap_or_default()
    }

    pub async fn add_to_watchlist(&self, user_id: &str, entry: WatchlistEntry) {
        let mut users = self.users.write().await;
        let lists = users.entry(user_id.to_string()).or_default();

        if !lists.watchlist.contains(&entry) {
            lists.watchlist.push(entry);
        }
    }

    pub async fn remove_from_watchlist(&self, user_id: &str, entry: &WatchlistEntry) {
        if let Some(lists) = self.users.write().await.get_mut(user_id) {
            lists.watchlist.retain(|e| e != entry);
        }
    }

    pub async fn watchlist(&self, user_id: &str) -> Vec<WatchlistEntry> {
        self.users
            .read()
            .await
            .get(user_id)
            .map(|lists| lists.watchlist.clone())
            .unwrap_or_default()
    }

    /// Liked item ids of one kind, in rating order
    pub async fn liked_ids(&self, user_id: &str, media_type: MediaKind) -> Vec<u64> {
        self.ratings(user_id)
            .await
            .into_iter()
            .filter(|r| r.media_type == media_type && r.is_liked())
            .map(|r| r.item_id)
            .collect()
    }

    /// Watchlisted item ids of one kind
    pub async fn watchlist_ids(&self, user_id: &str, media_type: MediaKind) -> HashSet<u64> {
        self.watchlist(user_id)
            .await
            .into_iter()
            .filter(|e| e.media_type == media_type)
            .map(|e| e.item_id)
            .collect()
    }
}
