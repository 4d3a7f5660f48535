//! Participant and status transitions of a single game.
//!
//! Every function here mutates an in-memory [`GameRecord`] only. Stores load the record inside a
//! transaction, apply one transition and write back the difference, so a transition is either
//! fully persisted or not at all.

use std::collections::HashSet;

use thiserror::Error;
use time::OffsetDateTime;

use crate::dao::models::{GameRecord, GameStatus, ParticipantEntity};

/// Reasons a lifecycle transition is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// No game with this id.
    #[error("Game not found")]
    GameNotFound(i64),
    /// Participants already fill `max_players`.
    #[error("Game is already full")]
    GameFull,
    #[error("You are already a participant in this game")]
    AlreadyJoined,
    #[error("You are not a participant in this game")]
    NotAParticipant,
}

/// What happened to the game when a participant left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// Set when the leaving user was the creator and ownership moved on.
    pub new_creator: Option<i64>,
    /// Set when the game lost its last participant.
    pub cancelled: bool,
}

/// Participant rows that differ between two versions of the same record.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParticipantDiff {
    /// Rows present only after the transition.
    pub added: Vec<ParticipantEntity>,
    /// User ids present only before the transition.
    pub removed: Vec<i64>,
}

impl ParticipantDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl GameRecord {
    pub fn is_participant(&self, user_id: i64) -> bool {
        self.participants.iter().any(|p| p.user_id == user_id)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// True once the participant count reaches `max_players`.
    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.game.max_players.max(0) as usize
    }

    /// Add `user_id` to the game.
    ///
    /// Any game with room accepts a join, whatever its status. Capacity is checked before
    /// membership.
    pub fn join(&mut self, user_id: i64, joined_at: OffsetDateTime) -> Result<(), LifecycleError> {
        if self.is_full() {
            return Err(LifecycleError::GameFull);
        }
        if self.is_participant(user_id) {
            return Err(LifecycleError::AlreadyJoined);
        }

        self.participants.push(ParticipantEntity { user_id, joined_at });
        self.sort_participants();
        Ok(())
    }

    /// Remove `user_id` from the game.
    ///
    /// A leaving creator hands the game to the earliest remaining joiner (lowest `user_id` on
    /// ties). The game is cancelled only once nobody is left.
    pub fn leave(&mut self, user_id: i64) -> Result<LeaveOutcome, LifecycleError> {
        let position = self
            .participants
            .iter()
            .position(|p| p.user_id == user_id)
            .ok_or(LifecycleError::NotAParticipant)?;
        self.participants.remove(position);

        let mut outcome = LeaveOutcome {
            new_creator: None,
            cancelled: false,
        };

        if self.game.creator_id == user_id {
            if let Some(successor) = self.earliest_participant() {
                self.game.creator_id = successor;
                outcome.new_creator = Some(successor);
            }
        }

        if self.participants.is_empty() {
            self.game.status = GameStatus::Cancelled;
            outcome.cancelled = true;
        }

        Ok(outcome)
    }

    /// Rows to insert and delete to turn `self` into `after`.
    pub fn participant_diff(&self, after: &GameRecord) -> ParticipantDiff {
        let before_ids: HashSet<i64> = self.participants.iter().map(|p| p.user_id).collect();
        let after_ids: HashSet<i64> = after.participants.iter().map(|p| p.user_id).collect();

        ParticipantDiff {
            added: after
                .participants
                .iter()
                .filter(|p| !before_ids.contains(&p.user_id))
                .cloned()
                .collect(),
            removed: self
                .participants
                .iter()
                .map(|p| p.user_id)
                .filter(|id| !after_ids.contains(id))
                .collect(),
        }
    }

    /// True when the scalar game columns written by transitions differ.
    pub fn game_changed(&self, after: &GameRecord) -> bool {
        self.game.creator_id != after.game.creator_id || self.game.status != after.game.status
    }

    pub(crate) fn sort_participants(&mut self) {
        self.participants
            .sort_by(|a, b| (a.joined_at, a.user_id).cmp(&(b.joined_at, b.user_id)));
    }

    fn earliest_participant(&self) -> Option<i64> {
        self.participants
            .iter()
            .min_by_key(|p| (p.joined_at, p.user_id))
            .map(|p| p.user_id)
    }
}
