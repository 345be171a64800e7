use tokio::{
    sync::{broadcast, mpsc, oneshot},
    time::{Duration, Instant},
};
use tracing::{debug, info, instrument, warn};

use crate::{
    core::session::{GameState, RecordIntent, ScoutSession},
    error::ScoutError,
    event::ScoutEvent,
    export::ExportSnapshot,
    op::StoredOp,
    persist::{OpSink, PersistError, SavedGame},
    shortcuts::{Intent, Key, Outcome},
    stats::{projector::StatsProjector, tally::ScoutStats},
    types::{EventId, OpSeq, Period, Side, ZoneId},
};

use super::events::SessionEvent;

#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Scout(#[from] ScoutError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("scouting session runtime has stopped")]
    ChannelClosed,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Wall-clock length of one game-clock second.
    pub tick_interval_ms: u64,
    /// Capacity of the journal queue. A full queue makes commands wait.
    pub persist_queue_bound: usize,
    /// Saves the running clock every this many ticks; `0` saves only on
    /// toggle, period change, reset and shutdown.
    pub save_clock_every_ticks: u32,
    /// Capacity of the broadcast event channel.
    pub event_buffer: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            persist_queue_bound: 64,
            save_clock_every_ticks: 10,
            event_buffer: 1024,
        }
    }
}

/// Cloneable front end to a session running on its own task.
///
/// The task, and with it the clock ticker, stops once every handle is dropped
/// or [`ScoutHandle::shutdown`] is called.
#[derive(Clone)]
pub struct ScoutHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<SessionEvent>,
}

enum Command {
    Key {
        key: Key,
        resp: oneshot::Sender<Result<Outcome, RuntimeError>>,
    },
    Dispatch {
        intent: Intent,
        resp: oneshot::Sender<Result<Outcome, RuntimeError>>,
    },
    Record {
        intent: RecordIntent,
        zone: Option<ZoneId>,
        resp: oneshot::Sender<Result<EventId, RuntimeError>>,
    },
    SelectTeam {
        side: Side,
        resp: oneshot::Sender<()>,
    },
    SelectZone {
        zone: Option<ZoneId>,
        resp: oneshot::Sender<()>,
    },
    Undo {
        resp: oneshot::Sender<Option<EventId>>,
    },
    Redo {
        resp: oneshot::Sender<Option<EventId>>,
    },
    Delete {
        id: EventId,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    ToggleClock {
        resp: oneshot::Sender<bool>,
    },
    NextPeriod {
        resp: oneshot::Sender<Period>,
    },
    Reset {
        confirmed: bool,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    GameState {
        resp: oneshot::Sender<GameState>,
    },
    Stats {
        resp: oneshot::Sender<ScoutStats>,
    },
    Recent {
        n: usize,
        resp: oneshot::Sender<Vec<ScoutEvent>>,
    },
    Export {
        resp: oneshot::Sender<ExportSnapshot>,
    },
    Flush {
        resp: oneshot::Sender<Result<OpSeq, RuntimeError>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

enum JournalMsg {
    Ops(Vec<StoredOp>),
    Game(SavedGame),
    Flush { resp: oneshot::Sender<OpSeq> },
    Shutdown { resp: oneshot::Sender<()> },
}

/// Moves `session` onto a new task and returns a handle to it.
///
/// With a sink, every log op and every clock change is journaled in order.
/// Must be called from within a tokio runtime.
#[instrument(skip_all)]
pub fn spawn_session(
    session: ScoutSession,
    sink: Option<Box<dyn OpSink>>,
    config: RuntimeConfig,
) -> ScoutHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(256);
    let (events_tx, _) = broadcast::channel::<SessionEvent>(config.event_buffer.max(1));

    let (journal_tx, mut durable_rx) = match sink {
        Some(sink) => {
            let (journal_tx, journal_rx) = mpsc::channel(config.persist_queue_bound.max(1));
            let (durable_tx, durable_rx) = mpsc::unbounded_channel();
            tokio::spawn(run_journal(sink, journal_rx, durable_tx));
            (Some(journal_tx), Some(durable_rx))
        }
        None => (None, None),
    };

    let tick = Duration::from_millis(config.tick_interval_ms.max(1));
    let mut task = SessionTask {
        projector: StatsProjector::from_log(session.log()),
        session,
        events_tx: events_tx.clone(),
        journal_tx,
        config,
        ticks_since_save: 0,
    };

    tokio::spawn(async move {
        task.save_game().await;
        // Ops recorded before the session was handed over still need journaling.
        task.publish_ops().await;

        let mut next_tick = Instant::now() + tick;

        loop {
            let running = task.session.clock().is_running();
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break; };
                    let done = task.handle_command(cmd).await;
                    if !running && task.session.clock().is_running() {
                        next_tick = Instant::now() + tick;
                    }
                    if done {
                        break;
                    }
                }
                _ = tokio::time::sleep_until(next_tick), if running => {
                    task.on_tick().await;
                    next_tick += tick;
                }
                durable = next_durable(&mut durable_rx) => {
                    match durable {
                        Some(Ok(op_seq)) => {
                            let _ = task.events_tx.send(SessionEvent::DurableUpTo { op_seq });
                        }
                        Some(Err(message)) => task.notice(message),
                        None => durable_rx = None,
                    }
                }
            }
        }

        info!("scouting session task stopped");
    });

    ScoutHandle { cmd_tx, events_tx }
}

async fn next_durable(
    rx: &mut Option<mpsc::UnboundedReceiver<Result<OpSeq, String>>>,
) -> Option<Result<OpSeq, String>> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

impl ScoutHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    /// Feeds one key press through the shortcut dispatcher.
    pub async fn key(&self, key: Key) -> Result<Outcome, RuntimeError> {
        self.request(|resp| Command::Key { key, resp }).await?
    }

    pub async fn dispatch(&self, intent: Intent) -> Result<Outcome, RuntimeError> {
        self.request(|resp| Command::Dispatch { intent, resp }).await?
    }

    /// Records for the current selection.
    pub async fn record(&self, intent: RecordIntent) -> Result<EventId, RuntimeError> {
        self.request(|resp| Command::Record {
            intent,
            zone: None,
            resp,
        })
        .await?
    }

    /// Court-zone click: selects `zone` and records in one step.
    pub async fn record_in_zone(
        &self,
        zone: impl Into<ZoneId>,
        intent: RecordIntent,
    ) -> Result<EventId, RuntimeError> {
        let zone = Some(zone.into());
        self.request(|resp| Command::Record { intent, zone, resp })
            .await?
    }

    pub async fn select_team(&self, side: Side) -> Result<(), RuntimeError> {
        self.request(|resp| Command::SelectTeam { side, resp }).await
    }

    pub async fn select_zone(&self, zone: Option<ZoneId>) -> Result<(), RuntimeError> {
        self.request(|resp| Command::SelectZone { zone, resp }).await
    }

    /// Removes the most recent event; `Ok(None)` when the log was empty.
    pub async fn undo(&self) -> Result<Option<EventId>, RuntimeError> {
        self.request(|resp| Command::Undo { resp }).await
    }

    pub async fn redo(&self) -> Result<Option<EventId>, RuntimeError> {
        self.request(|resp| Command::Redo { resp }).await
    }

    pub async fn delete(&self, id: EventId) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Delete { id, resp }).await?
    }

    pub async fn toggle_clock(&self) -> Result<bool, RuntimeError> {
        self.request(|resp| Command::ToggleClock { resp }).await
    }

    pub async fn next_period(&self) -> Result<Period, RuntimeError> {
        self.request(|resp| Command::NextPeriod { resp }).await
    }

    pub async fn reset(&self, confirmed: bool) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Reset { confirmed, resp }).await?
    }

    pub async fn game_state(&self) -> Result<GameState, RuntimeError> {
        self.request(|resp| Command::GameState { resp }).await
    }

    pub async fn stats(&self) -> Result<ScoutStats, RuntimeError> {
        self.request(|resp| Command::Stats { resp }).await
    }

    /// Up to `n` events, most recent first.
    pub async fn recent(&self, n: usize) -> Result<Vec<ScoutEvent>, RuntimeError> {
        self.request(|resp| Command::Recent { n, resp }).await
    }

    pub async fn export(&self) -> Result<ExportSnapshot, RuntimeError> {
        self.request(|resp| Command::Export { resp }).await
    }

    /// Waits until everything queued so far is journaled; returns the highest
    /// durable sequence.
    pub async fn flush(&self) -> Result<OpSeq, RuntimeError> {
        self.request(|resp| Command::Flush { resp }).await?
    }

    /// Saves the clock, drains the journal and stops the session task.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Shutdown { resp }).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

struct SessionTask {
    session: ScoutSession,
    projector: StatsProjector,
    events_tx: broadcast::Sender<SessionEvent>,
    journal_tx: Option<mpsc::Sender<JournalMsg>>,
    config: RuntimeConfig,
    ticks_since_save: u32,
}

impl SessionTask {
    async fn handle_command(&mut self, cmd: Command) -> bool {
        let score_before = self.session.log().score();
        let clock_before = self.session.clock().clone();
        let mut done = false;

        match cmd {
            Command::Key { key, resp } => {
                let res = self.session.handle_key(key);
                let _ = resp.send(self.finish_dispatch(res).await);
            }
            Command::Dispatch { intent, resp } => {
                let res = self.session.dispatch(intent);
                let _ = resp.send(self.finish_dispatch(res).await);
            }
            Command::Record { intent, zone, resp } => {
                let res = match zone {
                    Some(zone) => self.session.record_in_zone(zone, intent),
                    None => self.session.record(intent),
                };
                let res = match res {
                    Ok((id, _)) => {
                        self.emit_recorded(id);
                        self.publish_ops().await;
                        Ok(id)
                    }
                    Err(err) => Err(self.reject(err)),
                };
                let _ = resp.send(res);
            }
            Command::SelectTeam { side, resp } => {
                self.session.select_team(side);
                let _ = resp.send(());
            }
            Command::SelectZone { zone, resp } => {
                self.session.select_zone(zone);
                let _ = resp.send(());
            }
            Command::Undo { resp } => {
                let undone = self.session.undo().map(|(event, _)| event.id);
                if let Some(id) = undone {
                    let _ = self.events_tx.send(SessionEvent::UndoApplied { id });
                }
                self.publish_ops().await;
                let _ = resp.send(undone);
            }
            Command::Redo { resp } => {
                let redone = self.session.redo().map(|(id, _)| id);
                if let Some(id) = redone {
                    let _ = self.events_tx.send(SessionEvent::RedoApplied { id });
                }
                self.publish_ops().await;
                let _ = resp.send(redone);
            }
            Command::Delete { id, resp } => {
                let res = match self.session.delete(id) {
                    Ok(_) => {
                        let _ = self.events_tx.send(SessionEvent::Deleted { id });
                        self.publish_ops().await;
                        Ok(())
                    }
                    Err(err) => Err(self.reject(err)),
                };
                let _ = resp.send(res);
            }
            Command::ToggleClock { resp } => {
                let running = self.session.toggle_clock();
                let _ = self.events_tx.send(SessionEvent::ClockToggled { running });
                let _ = resp.send(running);
            }
            Command::NextPeriod { resp } => {
                let period = self.session.next_period();
                let _ = self.events_tx.send(SessionEvent::PeriodAdvanced { period });
                let _ = resp.send(period);
            }
            Command::Reset { confirmed, resp } => {
                let res = match self.session.reset(confirmed) {
                    Ok(_) => {
                        let _ = self.events_tx.send(SessionEvent::Reset);
                        self.publish_ops().await;
                        Ok(())
                    }
                    Err(err) => Err(self.reject(err)),
                };
                let _ = resp.send(res);
            }
            Command::GameState { resp } => {
                let _ = resp.send(self.session.game_state());
            }
            Command::Stats { resp } => {
                let _ = resp.send(*self.projector.stats());
            }
            Command::Recent { n, resp } => {
                let _ = resp.send(self.session.log().recent_cloned(n));
            }
            Command::Export { resp } => {
                let snapshot = self.session.export();
                info!(events = snapshot.events.len(), "export captured");
                let _ = resp.send(snapshot);
            }
            Command::Flush { resp } => {
                let _ = resp.send(self.flush().await);
            }
            Command::Shutdown { resp } => {
                self.save_game().await;
                self.close_journal().await;
                let _ = resp.send(());
                done = true;
            }
        }

        let score_after = self.session.log().score();
        if score_after != score_before {
            let _ = self.events_tx.send(SessionEvent::ScoreChanged {
                home: score_after.home,
                away: score_after.away,
            });
        }

        if !done && *self.session.clock() != clock_before {
            self.save_game().await;
        }
        done
    }

    async fn on_tick(&mut self) {
        let Some(current_time) = self.session.tick() else {
            return;
        };
        let _ = self.events_tx.send(SessionEvent::Tick { current_time });

        self.ticks_since_save += 1;
        let every = self.config.save_clock_every_ticks;
        if every > 0 && self.ticks_since_save >= every {
            self.save_game().await;
        }
    }

    async fn finish_dispatch(
        &mut self,
        res: Result<Outcome, ScoutError>,
    ) -> Result<Outcome, RuntimeError> {
        let outcome = res.map_err(|err| self.reject(err))?;
        match outcome {
            Outcome::Recorded(id) => self.emit_recorded(id),
            Outcome::Undone(Some(id)) => {
                let _ = self.events_tx.send(SessionEvent::UndoApplied { id });
            }
            Outcome::ClockToggled(running) => {
                let _ = self.events_tx.send(SessionEvent::ClockToggled { running });
            }
            _ => {}
        }
        self.publish_ops().await;
        Ok(outcome)
    }

    fn emit_recorded(&self, id: EventId) {
        if let Some(event) = self.session.log().get(id) {
            let _ = self.events_tx.send(SessionEvent::Recorded {
                id,
                event_type: event.event_type(),
                team: event.team,
            });
        }
    }

    fn reject(&self, err: ScoutError) -> RuntimeError {
        if err.is_user_notice() {
            self.notice(err.to_string());
        }
        debug!(error = %err, "command rejected");
        RuntimeError::Scout(err)
    }

    fn notice(&self, message: String) {
        let _ = self.events_tx.send(SessionEvent::Notice { message });
    }

    /// Projects freshly produced ops and queues them for the journal.
    ///
    /// Waits for queue capacity instead of dropping ops, so the journal never
    /// has gaps. The change itself already happened; a dead journal only
    /// raises a notice.
    async fn publish_ops(&mut self) {
        let ops = self.session.drain_pending_ops();
        if ops.is_empty() {
            return;
        }

        for stored in &ops {
            self.projector.apply_stored_op(stored);
        }
        debug_assert_eq!(self.projector.score(), self.session.log().score());

        match &self.journal_tx {
            Some(tx) => {
                if tx.send(JournalMsg::Ops(ops)).await.is_err() {
                    warn!("journal stopped; ops not persisted");
                    self.notice("journal unavailable; changes are not being saved".to_string());
                }
            }
            None => {
                let _ = self.events_tx.send(SessionEvent::DurableUpTo {
                    op_seq: self.session.log().latest_op_seq(),
                });
            }
        }
    }

    async fn save_game(&mut self) {
        self.ticks_since_save = 0;
        let Some(tx) = &self.journal_tx else {
            return;
        };
        let game = SavedGame::capture(&self.session);
        if tx.send(JournalMsg::Game(game)).await.is_err() {
            warn!("journal stopped; clock not saved");
        }
    }

    async fn flush(&self) -> Result<OpSeq, RuntimeError> {
        let Some(tx) = &self.journal_tx else {
            return Ok(self.session.log().latest_op_seq());
        };
        let (resp, rx) = oneshot::channel();
        tx.send(JournalMsg::Flush { resp })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    async fn close_journal(&self) {
        let Some(tx) = &self.journal_tx else {
            return;
        };
        let (resp, rx) = oneshot::channel();
        if tx.send(JournalMsg::Shutdown { resp }).await.is_ok() {
            let _ = rx.await;
        }
    }
}

/// Drains the journal queue in order, running each write on the blocking pool.
///
/// Reports the highest durable sequence after each op batch, or an error
/// message when a write failed.
async fn run_journal(
    mut sink: Box<dyn OpSink>,
    mut rx: mpsc::Receiver<JournalMsg>,
    durable_tx: mpsc::UnboundedSender<Result<OpSeq, String>>,
) {
    let mut durable: OpSeq = 0;

    while let Some(msg) = rx.recv().await {
        match msg {
            JournalMsg::Ops(ops) => {
                let (back, result) = match blocking(sink, move |s| s.append_ops(&ops)).await {
                    Some(out) => out,
                    None => break,
                };
                sink = back;
                match result {
                    Ok(seq) => {
                        durable = durable.max(seq);
                        let _ = durable_tx.send(Ok(durable));
                    }
                    Err(err) => {
                        warn!(error = %err, "journal append failed");
                        let _ = durable_tx.send(Err(format!("saving events failed: {err}")));
                    }
                }
            }
            JournalMsg::Game(game) => {
                let (back, result) = match blocking(sink, move |s| s.save_game(&game)).await {
                    Some(out) => out,
                    None => break,
                };
                sink = back;
                if let Err(err) = result {
                    warn!(error = %err, "saving game state failed");
                }
            }
            JournalMsg::Flush { resp } => {
                let _ = resp.send(durable);
            }
            JournalMsg::Shutdown { resp } => {
                let _ = resp.send(());
                break;
            }
        }
    }
    debug!(durable, "journal task stopped");
}

/// Runs `f` against the sink on the blocking pool and hands the sink back.
/// `None` when the blocking task panicked and the sink is lost.
async fn blocking<T: Send + 'static>(
    mut sink: Box<dyn OpSink>,
    f: impl FnOnce(&mut dyn OpSink) -> Result<T, PersistError> + Send + 'static,
) -> Option<(Box<dyn OpSink>, Result<T, PersistError>)> {
    let joined = tokio::task::spawn_blocking(move || {
        let result = f(sink.as_mut());
        (sink, result)
    })
    .await;
    match joined {
        Ok(out) => Some(out),
        Err(err) => {
            warn!(error = %PersistError::Worker(err.to_string()), "journal task lost its sink");
            None
        }
    }
}
