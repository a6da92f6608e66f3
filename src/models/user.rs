use serde::{Deserialize, Serialize};

use super::MediaKind;

/// A user's score for one catalog item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub media_type: MediaKind,
    pub item_id: u64,
    /// Score on the 1..=10 scale
    pub score: u8,
}

impl Rating {
    pub const MIN_SCORE: u8 = 1;
    pub const MAX_SCORE: u8 = 10;

    /// Ratings at or above this score count as "liked"
    pub const LIKE_THRESHOLD: u8 = 7;

    pub fn is_liked(&self) -> bool {
        self.score >= Self::LIKE_THRESHOLD
    }
}

/// An item saved to a user's watchlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WatchlistEntry {
    pub media_type: MediaKind,
    pub item_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_threshold() {
        let rating = |score| Rating {
            media_type: MediaKind::Movie,
            item_id: 1,
            score,
        };

        assert!(!rating(6).is_liked());
        assert!(rating(7).is_liked());
        assert!(rating(10).is_liked());
    }

    #[test]
    fn test_rating_serialization() {
        let rating = Rating {
            media_type: MediaKind::Tv,
            item_id: 1396,
            score: 9,
        };

        let json = serde_json::to_string(&rating).unwrap();
        assert_eq!(json, r#"{"media_type":"tv","item_id":1396,"score":9}"#);
    }
}
