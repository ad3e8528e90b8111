//! Background thinking and pondering for one side.
//!
//! A brain runs at most one search at a time on its own thread. The search
//! only ever sees a copy of the position; when a thinking search finishes on
//! its own it posts a [`BrainEvent`] and the owner of the contest decides
//! what to do with it. Forcing a move sets the task's stop flag and joins the
//! thread, so it returns as soon as the searcher notices the flag.

pub mod search;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chess::ChessMove;
use crossbeam_channel::Sender;
use log::{debug, warn};

use crate::error::{GameError, Result};
use crate::game::player::Side;
use search::{SearchRequest, Searcher};

/// Posted when a thinking search concluded without being forced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrainEvent {
    pub side: Side,
    pub session: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Thinking,
    Pondering,
}

struct Task {
    kind: TaskKind,
    session: u64,
    stopper: Arc<AtomicBool>,
    handle: JoinHandle<Option<ChessMove>>,
}

pub struct Brain {
    side: Side,
    searcher: Arc<dyn Searcher>,
    events: Sender<BrainEvent>,
    next_session: u64,
    task: Option<Task>,
}

impl Brain {
    pub fn new(side: Side, searcher: Arc<dyn Searcher>, events: Sender<BrainEvent>) -> Self {
        Self {
            side,
            searcher,
            events,
            next_session: 0,
            task: None,
        }
    }

    pub fn is_thinking(&self) -> bool {
        matches!(&self.task, Some(task) if task.kind == TaskKind::Thinking)
    }

    pub fn is_pondering(&self) -> bool {
        matches!(&self.task, Some(task) if task.kind == TaskKind::Pondering)
    }

    pub fn is_idle(&self) -> bool {
        self.task.is_none()
    }

    /// Search for this side's own next move. Returns false if the brain is
    /// already busy.
    pub fn start_thinking(&mut self, request: SearchRequest) -> Result<bool> {
        self.start(TaskKind::Thinking, request)
    }

    /// Search ahead while the opponent decides. Pondering never posts a
    /// completion event.
    pub fn start_pondering(&mut self, request: SearchRequest) -> Result<bool> {
        self.start(TaskKind::Pondering, request)
    }

    fn start(&mut self, kind: TaskKind, request: SearchRequest) -> Result<bool> {
        if self.task.is_some() {
            warn!("{} brain asked to start {:?} while busy", self.side, kind);
            return Ok(false);
        }

        self.next_session += 1;
        let session = self.next_session;
        let side = self.side;
        let stopper = Arc::new(AtomicBool::new(false));
        let searcher = Arc::clone(&self.searcher);
        let events = self.events.clone();
        let task_stopper = Arc::clone(&stopper);

        let runner = move || {
            let best = searcher.search(&request, &task_stopper);
            if kind == TaskKind::Thinking && !task_stopper.load(Ordering::Relaxed) {
                // The receiver going away only means the contest is shutting down.
                let _ = events.send(BrainEvent { side, session });
            }
            best
        };

        let handle = thread::Builder::new()
            .name(format!("{side} brain {session}"))
            .spawn(runner)?;

        debug!("{side} brain started {kind:?} session {session}");
        self.task = Some(Task {
            kind,
            session,
            stopper,
            handle,
        });
        Ok(true)
    }

    /// Ask the running search to conclude now and wait for its best move
    /// so far. Returns `None` if the brain was idle.
    pub fn force_immediate_move(&mut self) -> Result<Option<ChessMove>> {
        match self.task.take() {
            Some(task) => {
                task.stopper.store(true, Ordering::Relaxed);
                let session = task.session;
                let best = join(task)?;
                debug!("{} brain forced session {session} -> {best:?}", self.side);
                Ok(best)
            }
            None => Ok(None),
        }
    }

    /// Collects the result of a thinking session that reported completion.
    /// Returns `Ok(None)` when the event is stale: the session was already
    /// forced, aborted or replaced.
    pub fn take_ready_move(&mut self, event: BrainEvent) -> Result<Option<ChessMove>> {
        let current = matches!(
            &self.task,
            Some(task) if task.kind == TaskKind::Thinking && task.session == event.session
        );
        if !current {
            debug!("{} brain ignoring stale session {}", self.side, event.session);
            return Ok(None);
        }
        match self.task.take() {
            Some(task) => match join(task)? {
                Some(best) => Ok(Some(best)),
                None => Err(GameError::EngineInvariant(format!(
                    "{} brain is ready to move but has no candidate move",
                    self.side
                ))),
            },
            None => Ok(None),
        }
    }

    /// Stop any search and throw its result away.
    pub fn abort_thinking(&mut self) {
        if let Err(e) = self.force_immediate_move() {
            warn!("{} brain failed while aborting: {e}", self.side);
        }
    }
}

fn join(task: Task) -> Result<Option<ChessMove>> {
    task.handle
        .join()
        .map_err(|_| GameError::EngineInvariant("search thread panicked".to_string()))
}

impl Drop for Brain {
    fn drop(&mut self) {
        self.abort_thinking();
    }
}

impl fmt::Debug for Brain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Brain")
            .field("side", &self.side)
            .field("task", &self.task.as_ref().map(|t| (t.kind, t.session)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::time::Duration;

    use crate::brain::search::MaterialSearch;

    /// Searches until told to stop, then answers with the first legal move.
    struct UntilStopped;

    impl Searcher for UntilStopped {
        fn search(&self, request: &SearchRequest, stopper: &AtomicBool) -> Option<ChessMove> {
            while !stopper.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(1));
            }
            chess::MoveGen::new_legal(&request.board).next()
        }
    }

    fn request() -> SearchRequest {
        SearchRequest {
            board: chess::Board::default(),
            max_depth: 1,
            time_budget: None,
            random_opening: false,
            plies_played: 0,
        }
    }

    #[test]
    fn thinking_posts_completion_and_yields_move() {
        let (sender, receiver) = unbounded();
        let mut brain = Brain::new(Side::White, Arc::new(MaterialSearch), sender);

        assert!(brain.start_thinking(request()).unwrap());
        assert!(brain.is_thinking());

        let event = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event.side, Side::White);
        assert!(brain.take_ready_move(event).unwrap().is_some());
        assert!(brain.is_idle());
    }

    #[test]
    fn forcing_returns_best_so_far_without_event() {
        let (sender, receiver) = unbounded();
        let mut brain = Brain::new(Side::Black, Arc::new(UntilStopped), sender);

        brain.start_thinking(request()).unwrap();
        assert!(!brain.start_pondering(request()).unwrap());

        let forced = brain.force_immediate_move().unwrap();
        assert!(forced.is_some());
        assert!(brain.is_idle());
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn stale_events_are_ignored() {
        let (sender, _receiver) = unbounded();
        let mut brain = Brain::new(Side::White, Arc::new(UntilStopped), sender);

        brain.start_pondering(request()).unwrap();
        assert!(brain.is_pondering());
        let stale = BrainEvent {
            side: Side::White,
            session: 99,
        };
        assert_eq!(brain.take_ready_move(stale).unwrap(), None);
        assert!(brain.is_pondering());
        brain.abort_thinking();
        assert!(brain.is_idle());
    }
}
