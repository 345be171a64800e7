use chrono::Utc;
use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::{
    error::ScoutError,
    event::{EventDraft, ScoutEvent},
    op::{Op, StoredOp},
    stats::score::Score,
    types::{EventId, OpSeq, Side},
};

/// Authoritative, append-ordered log of scouted events.
///
/// The running score lives next to the events and is adjusted in the same
/// call that appends or removes a scoring goal, so it always equals
/// [`Score::fold`] over the live events.
#[derive(Debug, Default)]
pub struct EventLog {
    records: HashMap<EventId, ScoutEvent>,
    order: Vec<EventId>,
    by_team: HashMap<Side, Vec<EventId>>,
    score: Score,
    redo: Vec<ScoutEvent>,
    pending_ops: Vec<StoredOp>,
    next_op_seq: OpSeq,
    next_event_id: EventId,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            next_op_seq: 1,
            next_event_id: 1,
            ..Self::default()
        }
    }

    /// Appends a new event at the head of the log.
    pub fn append(&mut self, draft: EventDraft) -> (EventId, StoredOp) {
        let id = self.next_event_id;
        self.next_event_id += 1;

        let event = draft.into_event(id);
        debug!(
            id,
            event_type = %event.event_type(),
            team = %event.team,
            game_time = event.game_time,
            "event appended"
        );

        let seq = self.take_next_op_seq();
        let stored = self.apply_append_with_seq(event, seq);
        self.redo.clear();
        self.pending_ops.push(stored.clone());
        (id, stored)
    }

    /// Removes the most recently appended event still in the log.
    ///
    /// Returns `None` and changes nothing when the log is empty.
    pub fn undo(&mut self) -> Option<(ScoutEvent, StoredOp)> {
        let id = *self.order.last()?;
        let (event, stored) = self.remove_and_reconcile(id).ok()?;
        self.redo.push(event.clone());
        debug!(id, "undo applied");
        Some((event, stored))
    }

    /// Re-appends the most recently undone event under its original id.
    pub fn redo(&mut self) -> Option<(EventId, StoredOp)> {
        let event = self.redo.pop()?;
        let id = event.id;
        let seq = self.take_next_op_seq();
        let stored = self.apply_append_with_seq(event, seq);
        self.pending_ops.push(stored.clone());
        debug!(id, "redo applied");
        Some((id, stored))
    }

    /// Removes an arbitrary event by id.
    pub fn delete(&mut self, id: EventId) -> Result<(ScoutEvent, StoredOp), ScoutError> {
        let out = self.remove_and_reconcile(id)?;
        debug!(id, "event deleted");
        Ok(out)
    }

    /// Discards every event and the redo history.
    ///
    /// Returns `None` when there was nothing to discard.
    pub fn clear(&mut self) -> Option<StoredOp> {
        self.redo.clear();
        if self.order.is_empty() {
            return None;
        }
        let seq = self.take_next_op_seq();
        let stored = self.apply_reset_with_seq(seq);
        self.pending_ops.push(stored.clone());
        Some(stored)
    }

    /// Applies one op read back from a journal.
    ///
    /// A remove whose event is not in the log is skipped, so a journal with a
    /// lost append still replays. Duplicate appends are rejected.
    pub fn apply_replayed_op(&mut self, stored: StoredOp) -> Result<(), ScoutError> {
        let seq = stored.seq;
        match stored.op {
            Op::Append { event } => {
                if self.records.contains_key(&event.id) {
                    return Err(ScoutError::DuplicateEvent(event.id));
                }
                self.apply_append_with_seq(event, seq);
            }
            Op::Remove { event } => {
                if self.records.contains_key(&event.id) {
                    self.apply_remove_with_seq(event.id, seq)?;
                } else {
                    warn!(seq, id = event.id, "replayed remove of unknown event skipped");
                    self.bump_next_seq_from(seq);
                }
            }
            Op::Reset { .. } => {
                self.apply_reset_with_seq(seq);
            }
        }
        self.redo.clear();
        Ok(())
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn get(&self, id: EventId) -> Option<&ScoutEvent> {
        self.records.get(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Most recently appended event.
    pub fn head(&self) -> Option<&ScoutEvent> {
        self.order.last().and_then(|id| self.records.get(id))
    }

    /// Up to `n` events, most recent first, as shown in the live list.
    pub fn recent(&self, n: usize) -> Vec<&ScoutEvent> {
        self.order
            .iter()
            .rev()
            .take(n)
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    pub fn recent_cloned(&self, n: usize) -> Vec<ScoutEvent> {
        self.recent(n).into_iter().cloned().collect()
    }

    /// Events in append order.
    pub fn appended(&self) -> Vec<&ScoutEvent> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// Events ordered by game time, ties broken by id.
    pub fn chronological(&self) -> Vec<&ScoutEvent> {
        let mut events = self.appended();
        events.sort_by_key(|e| (e.game_time, e.id));
        events
    }

    pub fn by_team(&self, side: Side) -> Vec<&ScoutEvent> {
        self.by_team
            .get(&side)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    pub fn ordered_ids(&self) -> &[EventId] {
        &self.order
    }

    pub fn drain_pending_ops(&mut self) -> Vec<StoredOp> {
        std::mem::take(&mut self.pending_ops)
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn latest_op_seq(&self) -> OpSeq {
        self.next_op_seq.saturating_sub(1)
    }

    /// Id the next recorded event will get.
    pub fn next_event_id(&self) -> EventId {
        self.next_event_id
    }

    /// Single removal path shared by undo and delete.
    fn remove_and_reconcile(&mut self, id: EventId) -> Result<(ScoutEvent, StoredOp), ScoutError> {
        if !self.records.contains_key(&id) {
            return Err(ScoutError::MissingEvent(id));
        }
        let seq = self.take_next_op_seq();
        let (event, stored) = self.apply_remove_with_seq(id, seq)?;
        self.pending_ops.push(stored.clone());
        Ok((event, stored))
    }

    fn apply_append_with_seq(&mut self, event: ScoutEvent, seq: OpSeq) -> StoredOp {
        self.next_event_id = self.next_event_id.max(event.id.saturating_add(1));
        self.insert_event(event.clone());
        self.bump_next_seq_from(seq);
        self.debug_check_score();
        StoredOp {
            seq,
            ts_ms: now_ms(),
            op: Op::Append { event },
        }
    }

    fn apply_remove_with_seq(
        &mut self,
        id: EventId,
        seq: OpSeq,
    ) -> Result<(ScoutEvent, StoredOp), ScoutError> {
        let position = self
            .order
            .iter()
            .position(|x| *x == id)
            .ok_or(ScoutError::MissingEvent(id))?;
        let event = self
            .records
            .remove(&id)
            .ok_or(ScoutError::MissingEvent(id))?;

        self.order.remove(position);
        if let Some(ids) = self.by_team.get_mut(&event.team) {
            Self::remove_from_vec_index(ids, id);
        }
        self.score.debit(&event);

        self.bump_next_seq_from(seq);
        self.debug_check_score();
        let stored = StoredOp {
            seq,
            ts_ms: now_ms(),
            op: Op::Remove {
                event: event.clone(),
            },
        };
        Ok((event, stored))
    }

    fn apply_reset_with_seq(&mut self, seq: OpSeq) -> StoredOp {
        let discarded = self.order.len();
        self.records.clear();
        self.order.clear();
        self.by_team.clear();
        self.score = Score::default();
        self.bump_next_seq_from(seq);
        StoredOp {
            seq,
            ts_ms: now_ms(),
            op: Op::Reset { discarded },
        }
    }

    fn insert_event(&mut self, event: ScoutEvent) {
        self.score.credit(&event);
        self.by_team.entry(event.team).or_default().push(event.id);
        self.order.push(event.id);
        self.records.insert(event.id, event);
    }

    fn remove_from_vec_index(v: &mut Vec<EventId>, id: EventId) {
        if let Some(pos) = v.iter().position(|x| *x == id) {
            v.remove(pos);
        }
    }

    fn debug_check_score(&self) {
        debug_assert_eq!(self.score, Score::fold(self.records.values()));
    }

    fn take_next_op_seq(&mut self) -> OpSeq {
        let seq = self.next_op_seq;
        self.next_op_seq += 1;
        seq
    }

    fn bump_next_seq_from(&mut self, seq: OpSeq) {
        self.next_op_seq = self.next_op_seq.max(seq.saturating_add(1));
    }
}

fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
