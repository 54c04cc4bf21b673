//! Opaque cursor values and their codec
//!
//! A cursor carries the sort key and identifier of the last row of a page.
//! On the wire it is base64 (standard alphabet, padded) over a JSON object,
//! so it can travel as a plain `?cursor=` query value.

use std::cmp::Ordering;
use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::errors::PaginationError;

/// The three sort orders a cursor can resume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorOrdering {
    /// `created_at DESC, id DESC`
    TimeDesc,
    /// `distance_m ASC, id ASC`
    DistanceAsc,
    /// `score DESC, id ASC`
    ScoreDesc,
}

impl CursorOrdering {
    /// Get the ordering name for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            CursorOrdering::TimeDesc => "time_desc",
            CursorOrdering::DistanceAsc => "distance_asc",
            CursorOrdering::ScoreDesc => "score_desc",
        }
    }
}

impl fmt::Display for CursorOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordering-specific behaviour of a cursor type
///
/// Every implementation orders rows by a primary sort key and breaks ties
/// with the row identifier, so the order is total even when many rows share
/// the same primary value.
pub trait PageCursor: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The ordering this cursor resumes
    const ORDERING: CursorOrdering;

    /// Unique identifier of the boundary row
    fn id(&self) -> &str;

    /// Check the value is well-formed before it is encoded
    fn validate(&self) -> Result<(), PaginationError>;

    /// Compare two positions in the canonical order of [`Self::ORDERING`]
    fn cmp_position(&self, other: &Self) -> Ordering;

    /// Whether `candidate` lies strictly after this cursor
    ///
    /// This is the in-memory equivalent of the keyset `WHERE` predicate a
    /// query applies when resuming from this cursor.
    fn precedes(&self, candidate: &Self) -> bool {
        self.cmp_position(candidate) == Ordering::Less
    }
}

fn invalid(ordering: CursorOrdering, reason: &'static str) -> PaginationError {
    PaginationError::InvalidCursorValue {
        ordering: ordering.as_str(),
        reason,
    }
}

/// Cursor for lists ordered by creation time, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeDescCursor {
    pub created_at: DateTime<Utc>,
    pub id: String,
}

/// Seconds from the Unix epoch back to 0001-01-01T00:00:00Z
const YEAR_ONE_UNIX_SECS: i64 = -62_135_596_800;

/// Whether `t` is one of the "unset" timestamps: the Unix epoch (zeroed
/// columns) or 0001-01-01T00:00:00Z (the zero time of clients that encode
/// an unset date as year one).
fn is_zero_time(t: &DateTime<Utc>) -> bool {
    t.timestamp_subsec_nanos() == 0 && matches!(t.timestamp(), 0 | YEAR_ONE_UNIX_SECS)
}

impl TimeDescCursor {
    pub fn new(created_at: DateTime<Utc>, id: impl Into<String>) -> Self {
        Self {
            created_at,
            id: id.into(),
        }
    }
}

impl PageCursor for TimeDescCursor {
    const ORDERING: CursorOrdering = CursorOrdering::TimeDesc;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), PaginationError> {
        if self.id.is_empty() {
            return Err(invalid(Self::ORDERING, "identifier is empty"));
        }
        if is_zero_time(&self.created_at) {
            return Err(invalid(Self::ORDERING, "timestamp is zero"));
        }
        Ok(())
    }

    fn cmp_position(&self, other: &Self) -> Ordering {
        other
            .created_at
            .cmp(&self.created_at)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Cursor for proximity lists, nearest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceAscCursor {
    pub distance_m: f64,
    pub id: String,
}

impl DistanceAscCursor {
    pub fn new(distance_m: f64, id: impl Into<String>) -> Self {
        Self {
            distance_m,
            id: id.into(),
        }
    }
}

impl PageCursor for DistanceAscCursor {
    const ORDERING: CursorOrdering = CursorOrdering::DistanceAsc;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), PaginationError> {
        if self.id.is_empty() {
            return Err(invalid(Self::ORDERING, "identifier is empty"));
        }
        if !self.distance_m.is_finite() {
            return Err(invalid(Self::ORDERING, "distance is not a finite number"));
        }
        Ok(())
    }

    fn cmp_position(&self, other: &Self) -> Ordering {
        self.distance_m
            .total_cmp(&other.distance_m)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Cursor for relevance-ranked search results, best match first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDescCursor {
    pub score: f64,
    pub id: String,
}

impl ScoreDescCursor {
    pub fn new(score: f64, id: impl Into<String>) -> Self {
        Self {
            score,
            id: id.into(),
        }
    }
}

impl PageCursor for ScoreDescCursor {
    const ORDERING: CursorOrdering = CursorOrdering::ScoreDesc;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), PaginationError> {
        if self.id.is_empty() {
            return Err(invalid(Self::ORDERING, "identifier is empty"));
        }
        if !self.score.is_finite() {
            return Err(invalid(Self::ORDERING, "score is not a finite number"));
        }
        Ok(())
    }

    fn cmp_position(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Any cursor, recognised by the fields its payload carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cursor {
    TimeDesc(TimeDescCursor),
    DistanceAsc(DistanceAscCursor),
    ScoreDesc(ScoreDescCursor),
}

impl Cursor {
    /// Decode a cursor without knowing its ordering up front
    pub fn decode(raw: &str) -> Result<Self, PaginationError> {
        decode_cursor(raw)
    }

    /// Encode the cursor into its opaque form
    pub fn encode(&self) -> Result<String, PaginationError> {
        encode_cursor(self)
    }

    pub fn ordering(&self) -> CursorOrdering {
        match self {
            Cursor::TimeDesc(_) => CursorOrdering::TimeDesc,
            Cursor::DistanceAsc(_) => CursorOrdering::DistanceAsc,
            Cursor::ScoreDesc(_) => CursorOrdering::ScoreDesc,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Cursor::TimeDesc(c) => c.id(),
            Cursor::DistanceAsc(c) => c.id(),
            Cursor::ScoreDesc(c) => c.id(),
        }
    }
}

impl From<TimeDescCursor> for Cursor {
    fn from(value: TimeDescCursor) -> Self {
        Cursor::TimeDesc(value)
    }
}

impl From<DistanceAscCursor> for Cursor {
    fn from(value: DistanceAscCursor) -> Self {
        Cursor::DistanceAsc(value)
    }
}

impl From<ScoreDescCursor> for Cursor {
    fn from(value: ScoreDescCursor) -> Self {
        Cursor::ScoreDesc(value)
    }
}

/// Serialize a cursor value to JSON and base64-encode it
pub fn encode_cursor<C: Serialize + ?Sized>(value: &C) -> Result<String, PaginationError> {
    let payload = serde_json::to_vec(value)?;
    Ok(STANDARD.encode(payload))
}

/// Decode an opaque cursor into `C`
///
/// Every failure collapses into [`PaginationError::InvalidCursor`]; callers
/// must not tell the client which step went wrong.
pub fn decode_cursor<C: DeserializeOwned>(raw: &str) -> Result<C, PaginationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PaginationError::InvalidCursor);
    }

    let payload = STANDARD
        .decode(trimmed)
        .map_err(|_| PaginationError::InvalidCursor)?;
    if payload.is_empty() {
        return Err(PaginationError::InvalidCursor);
    }

    serde_json::from_slice(&payload).map_err(|_| PaginationError::InvalidCursor)
}
