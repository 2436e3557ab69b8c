//! Persistence seam for materialized sessions.
//!
//! The core never talks to a database. Callers hand a [`SessionStore`] to
//! [`super::ExamScheduler::schedule_and_persist`], which issues exactly one
//! bulk write per run.

use chrono::NaiveDateTime;

use crate::models::{ExamSession, RoomId};

/// Bulk sink for exam sessions.
///
/// Implementations must be all-or-nothing: when `insert_all` returns `Err`,
/// none of the batch may remain committed.
pub trait SessionStore {
    /// Rejection reason, surfaced unchanged to the caller.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Commits every session or none.
    fn insert_all(&mut self, sessions: &[ExamSession]) -> Result<(), Self::Error>;
}

/// Rejection from [`InMemorySessionStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InMemoryStoreError {
    /// A room would hold two sessions with overlapping windows.
    #[error("room {room_id} is already booked around {start}")]
    RoomDoubleBooked {
        /// Room booked twice.
        room_id: RoomId,
        /// Start of the rejected session.
        start: NaiveDateTime,
    },
}

/// Vec-backed [`SessionStore`] that refuses overlapping bookings of a room.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Vec<ExamSession>,
    writes: usize,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed sessions.
    pub fn sessions(&self) -> &[ExamSession] {
        &self.sessions
    }

    /// Number of accepted bulk writes.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl SessionStore for InMemorySessionStore {
    type Error = InMemoryStoreError;

    fn insert_all(&mut self, sessions: &[ExamSession]) -> Result<(), Self::Error> {
        // Validate the whole batch against committed rows and itself first.
        for (i, session) in sessions.iter().enumerate() {
            let clash = self
                .sessions
                .iter()
                .chain(&sessions[..i])
                .any(|s| s.room_id == session.room_id && s.overlaps(session));
            if clash {
                return Err(InMemoryStoreError::RoomDoubleBooked {
                    room_id: session.room_id.clone(),
                    start: session.exam_start_time,
                });
            }
        }
        self.sessions.extend_from_slice(sessions);
        self.writes += 1;
        Ok(())
    }
}
