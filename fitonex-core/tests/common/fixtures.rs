//! Row fixtures for pagination tests

use chrono::{DateTime, Duration, TimeZone, Utc};
use fitonex_core::domain::pagination::{DistanceAscCursor, ScoreDescCursor, TimeDescCursor};

/// A comment-like row ordered by creation time
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(id: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            created_at,
        }
    }

    pub fn cursor(&self) -> TimeDescCursor {
        TimeDescCursor::new(self.created_at, self.id.clone())
    }
}

/// A gym with its computed distance from the caller
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyGym {
    pub id: String,
    pub distance_m: f64,
}

impl NearbyGym {
    pub fn new(id: &str, distance_m: f64) -> Self {
        Self {
            id: id.to_string(),
            distance_m,
        }
    }

    pub fn cursor(&self) -> DistanceAscCursor {
        DistanceAscCursor::new(self.distance_m, self.id.clone())
    }
}

/// A search hit with its relevance score
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
}

impl SearchHit {
    pub fn new(id: &str, score: f64) -> Self {
        Self {
            id: id.to_string(),
            score,
        }
    }

    pub fn cursor(&self) -> ScoreDescCursor {
        ScoreDescCursor::new(self.score, self.id.clone())
    }
}

/// Base timestamp for fixtures
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

/// `count` comments one minute apart, newest first, ids "c0".."cN"
pub fn comments_newest_first(count: usize) -> Vec<Comment> {
    (0..count)
        .rev()
        .map(|i| Comment::new(&format!("c{}", i), base_time() + Duration::minutes(i as i64)))
        .collect()
}
