//! The contest: board, both players, move logs and everything that keeps
//! them consistent while brains think in the background.
//!
//! Every public operation that changes the position follows the same cycle:
//! suspend any background search, mutate, write the automatic backup, tell
//! subscribers, then let the brains resume.

pub mod board;
pub mod clock;
pub mod events;
pub mod moves;
pub mod player;
pub mod protocol;
pub mod replay;
pub mod settings;
pub mod utils;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chess::{ChessMove, Piece, Square};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, info, warn};

use crate::brain::search::{MaterialSearch, SearchRequest, Searcher};
use crate::brain::{Brain, BrainEvent};
use crate::error::{GameError, Result};
use crate::persistence::preferences::{
    PreferenceStore, DEPRECATED_KEYS, FILE_NAME_KEY, SHOW_THINKING_KEY,
};
use crate::persistence::{save_file, MemoryPreferenceStore};
use board::{ChessBoard, START_FEN};
use events::{EventBus, GameEvent};
use moves::{MoveLog, MoveName};
use player::{Intelligence, Player, Side};
use protocol::{Detached, DrawReason, ProtocolAdapter};
use settings::GameSettings;

/// Shown in place of a file name before the contest was saved or loaded.
pub const UNTITLED: &str = "New Game";

/// Assembles a [`Game`]. Everything has a usable default: a human white, a
/// computer black, the built-in searcher, no protocol, in-memory
/// preferences and no automatic backup.
pub struct GameBuilder {
    settings: GameSettings,
    white: Intelligence,
    black: Intelligence,
    searcher: Arc<dyn Searcher>,
    protocol: Box<dyn ProtocolAdapter>,
    preferences: Box<dyn PreferenceStore>,
    backup_path: Option<PathBuf>,
}

impl Default for GameBuilder {
    fn default() -> Self {
        Self {
            settings: GameSettings::default(),
            white: Intelligence::Human,
            black: Intelligence::Computer,
            searcher: Arc::new(MaterialSearch),
            protocol: Box::new(Detached),
            preferences: Box::new(MemoryPreferenceStore::new()),
            backup_path: None,
        }
    }
}

impl GameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(mut self, settings: GameSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn players(mut self, white: Intelligence, black: Intelligence) -> Self {
        self.white = white;
        self.black = black;
        self
    }

    pub fn searcher<S: Searcher + 'static>(mut self, searcher: S) -> Self {
        self.searcher = Arc::new(searcher);
        self
    }

    pub fn protocol<P: ProtocolAdapter + 'static>(mut self, protocol: P) -> Self {
        self.protocol = Box::new(protocol);
        self
    }

    pub fn preferences<S: PreferenceStore + 'static>(mut self, preferences: S) -> Self {
        self.preferences = Box::new(preferences);
        self
    }

    pub fn backup_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.backup_path = Some(path.into());
        self
    }

    /// Reads the persisted preferences, drops keys older releases left
    /// behind and sets up a fresh contest from the standard start.
    pub fn build(self) -> Result<Game> {
        let mut preferences = self.preferences;
        let save_game_file_name = preferences.get(FILE_NAME_KEY).unwrap_or_default();
        let show_thinking = preferences
            .get(SHOW_THINKING_KEY)
            .map_or(true, |value| value == "1");
        for key in DEPRECATED_KEYS {
            if preferences.get(key).is_some() {
                debug!("dropping deprecated preference {key}");
                preferences.delete(key)?;
            }
        }

        let (brain_sender, brain_events): (Sender<BrainEvent>, Receiver<BrainEvent>) = unbounded();
        let white = Player::new(
            Side::White,
            self.white,
            Brain::new(Side::White, Arc::clone(&self.searcher), brain_sender.clone()),
        );
        let black = Player::new(
            Side::Black,
            self.black,
            Brain::new(Side::Black, Arc::clone(&self.searcher), brain_sender),
        );

        let mut game = Game {
            board: ChessBoard::default(),
            players: [white, black],
            to_play: Side::White,
            turn_no: 0,
            history: MoveLog::new(),
            redo: MoveLog::new(),
            analysis: MoveLog::new(),
            settings: self.settings,
            show_thinking,
            save_game_file_name: String::new(),
            backup_path: self.backup_path,
            protocol: self.protocol,
            preferences,
            events: EventBus::new(),
            brain_events,
        };
        game.install_board(ChessBoard::default());
        game.save_game_file_name = save_game_file_name;
        Ok(game)
    }
}

pub struct Game {
    board: ChessBoard,
    players: [Player; 2],
    to_play: Side,
    turn_no: u32,
    history: MoveLog,
    redo: MoveLog,
    analysis: MoveLog,
    settings: GameSettings,
    show_thinking: bool,
    save_game_file_name: String,
    backup_path: Option<PathBuf>,
    protocol: Box<dyn ProtocolAdapter>,
    preferences: Box<dyn PreferenceStore>,
    events: EventBus,
    brain_events: Receiver<BrainEvent>,
}

impl Game {
    pub fn builder() -> GameBuilder {
        GameBuilder::new()
    }

    pub fn board(&self) -> &ChessBoard {
        &self.board
    }

    pub fn fen(&self) -> String {
        self.board.fen()
    }

    /// Plies played since the contest started.
    pub fn turn_no(&self) -> u32 {
        self.turn_no
    }

    pub fn move_no(&self) -> u32 {
        self.turn_no / 2
    }

    pub fn history(&self) -> &MoveLog {
        &self.history
    }

    pub fn redo_list(&self) -> &MoveLog {
        &self.redo
    }

    /// Computer moves captured while move analysis capture is on.
    pub fn analysis(&self) -> &MoveLog {
        &self.analysis
    }

    pub fn clear_analysis(&mut self) {
        self.analysis.clear();
    }

    pub fn to_play(&self) -> Side {
        self.to_play
    }

    pub fn player(&self, side: Side) -> &Player {
        &self.players[side.index()]
    }

    pub fn player_to_play(&self) -> &Player {
        self.player(self.to_play)
    }

    /// Play is paused whenever the side to move has no running clock.
    pub fn is_paused(&self) -> bool {
        !self.player_to_play().clock.is_ticking()
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn show_thinking(&self) -> bool {
        self.show_thinking
    }

    pub fn set_show_thinking(&mut self, show: bool) {
        self.show_thinking = show;
    }

    /// Name of the file last saved to or loaded from.
    pub fn file_name(&self) -> &str {
        if self.save_game_file_name.is_empty() {
            UNTITLED
        } else {
            &self.save_game_file_name
        }
    }

    pub fn backup_path(&self) -> Option<&Path> {
        self.backup_path.as_deref()
    }

    pub fn subscribe(&mut self) -> Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Completion notices from both brains. Whoever owns the contest feeds
    /// them back through [`Game::handle_brain_event`].
    pub fn brain_events(&self) -> Receiver<BrainEvent> {
        self.brain_events.clone()
    }

    /// Legal destinations of the piece on `square` for the side to move.
    pub fn legal_destinations(&self, square: Square) -> Vec<Square> {
        self.board
            .legal_moves_from(square)
            .into_iter()
            .map(|m| m.get_dest())
            .collect()
    }

    /// Starts a new contest from `fen`, or from the standard start when no
    /// position is given. An invalid position changes nothing.
    pub fn new_game(&mut self, fen: Option<&str>) -> Result<()> {
        let fen = fen.filter(|f| !f.trim().is_empty()).unwrap_or(START_FEN);
        let board = ChessBoard::from_fen(fen)?;
        info!("new game from {fen}");

        self.suspend_pondering()?;
        self.install_board(board);
        self.save_backup();
        self.send_board_position_change_event();
        self.resume_pondering()
    }

    /// Plays a human move. The move is checked before anything is touched,
    /// so an illegal move leaves the contest as it was.
    pub fn make_move(&mut self, name: MoveName, from: Square, to: Square) -> Result<()> {
        let chess_move = self.board.resolve(name, from, to)?;
        self.play_resolved(chess_move)
    }

    /// Plays a human move given only its squares; the move name is worked
    /// out from the position.
    pub fn play(&mut self, from: Square, to: Square, promotion: Option<Piece>) -> Result<()> {
        let chess_move = ChessMove::new(from, to, promotion);
        if !self.board.position().legal(chess_move) {
            return Err(GameError::IllegalMove(chess_move.to_string()));
        }
        let name = self.board.move_name(chess_move);
        self.make_move(name, from, to)
    }

    fn play_resolved(&mut self, chess_move: ChessMove) -> Result<()> {
        self.suspend_pondering()?;
        self.make_move_internal(chess_move, true)?;
        self.save_backup();
        self.send_board_position_change_event();
        self.check_if_auto_next_move()
    }

    pub fn undo_move(&mut self) -> Result<()> {
        self.suspend_pondering()?;
        self.undo_move_internal()?;
        self.save_backup();
        self.send_board_position_change_event();
        self.resume_pondering()
    }

    pub fn redo_move(&mut self) -> Result<()> {
        self.suspend_pondering()?;
        self.redo_move_internal()?;
        self.save_backup();
        self.send_board_position_change_event();
        self.resume_pondering()
    }

    /// Takes back every ply in one step.
    pub fn undo_all_moves(&mut self) -> Result<()> {
        self.suspend_pondering()?;
        while self.undo_move_internal()? {}
        self.save_backup();
        self.send_board_position_change_event();
        self.resume_pondering()
    }

    /// Replays every taken-back ply in one step.
    pub fn redo_all_moves(&mut self) -> Result<()> {
        self.suspend_pondering()?;
        while self.redo_move_internal()? {}
        self.save_backup();
        self.send_board_position_change_event();
        self.resume_pondering()
    }

    /// Stops the clock of the side to move. A search in progress is forced
    /// to conclude; its move is played and immediately taken back, so it
    /// ends up on the redo list rather than on the board.
    pub fn pause_play(&mut self) -> Result<()> {
        self.suspend_pondering()?;
        self.players[self.to_play.index()].clock.stop();
        info!("play paused with {} to move", self.to_play);
        self.events.publish(GameEvent::GamePaused);
        Ok(())
    }

    pub fn resume_play(&mut self) -> Result<()> {
        self.players[self.to_play.index()].clock.start();
        info!("play resumed with {} to move", self.to_play);
        self.events.publish(GameEvent::GameResumed);
        if self.player_to_play().is_computer() {
            self.make_next_computer_move()
        } else {
            self.resume_pondering()
        }
    }

    /// Asks the side to move to search for a move, whoever controls it.
    pub fn think(&mut self) -> Result<()> {
        self.suspend_pondering()?;
        self.make_next_computer_move()
    }

    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.suspend_pondering()?;
        self.save_backup();
        save_file::write(path, &self.to_document())?;
        self.save_game_file_name = path.display().to_string();
        info!("game saved to {}", path.display());
        self.events.publish(GameEvent::GameSaved);
        self.resume_pondering()
    }

    /// Replaces the contest with the one saved at `path`. The loaded game
    /// starts paused. A file that cannot be read leaves the contest as it
    /// was; a file whose moves do not replay leaves a fresh contest.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.load_from(path.as_ref(), true)
    }

    /// Reloads the automatic backup.
    pub fn load_backup(&mut self) -> Result<()> {
        let path = self
            .backup_path
            .clone()
            .ok_or_else(|| GameError::Load("no backup file configured".to_string()))?;
        self.load_from(&path, false)
    }

    fn load_from(&mut self, path: &Path, remember_name: bool) -> Result<()> {
        let document = save_file::read(path)?;

        self.suspend_pondering()?;
        let previous_name = self.save_game_file_name.clone();
        let settings = self.settings.clone();
        let intelligence = [self.players[0].intelligence, self.players[1].intelligence];
        self.install_board(ChessBoard::default());

        if let Err(e) = self.restore(&document) {
            warn!("could not replay {}: {e}", path.display());
            self.settings = settings;
            self.players[0].intelligence = intelligence[0];
            self.players[1].intelligence = intelligence[1];
            self.install_board(ChessBoard::default());
            self.send_board_position_change_event();
            return Err(match e {
                GameError::Load(message) => GameError::Load(message),
                other => GameError::Load(format!("{}: {other}", path.display())),
            });
        }

        self.save_game_file_name = if remember_name {
            path.display().to_string()
        } else {
            previous_name
        };
        info!(
            "loaded {} plies from {}, {} to redo",
            self.history.len(),
            path.display(),
            self.redo.len()
        );
        self.save_backup();
        self.send_board_position_change_event();
        self.pause_play()
    }

    /// Changes configuration values through `change`.
    pub fn update_settings<F: FnOnce(&mut GameSettings)>(&mut self, change: F) -> Result<()> {
        self.suspend_pondering()?;
        change(&mut self.settings);
        self.save_backup();
        self.events.publish(GameEvent::SettingsUpdated);
        self.resume_pondering()
    }

    pub fn set_player_intelligence(
        &mut self,
        side: Side,
        intelligence: Intelligence,
    ) -> Result<()> {
        self.suspend_pondering()?;
        self.players[side.index()].intelligence = intelligence;
        info!("{side} is now played by {intelligence:?}");
        self.save_backup();
        self.events.publish(GameEvent::SettingsUpdated);
        self.resume_pondering()
    }

    /// Shuts the contest down: stops any protocol listener and both
    /// brains, then persists the user preferences.
    pub fn terminate(&mut self) -> Result<()> {
        self.protocol.stop_listener();
        self.suspend_pondering()?;
        for player in self.players.iter_mut() {
            player.brain.abort_thinking();
        }
        self.preferences.set(FILE_NAME_KEY, &self.save_game_file_name)?;
        let show_thinking = if self.show_thinking { "1" } else { "0" };
        self.preferences.set(SHOW_THINKING_KEY, show_thinking)?;
        info!("game terminated");
        Ok(())
    }

    /// Acts on a brain's completion notice. Returns whether a move was
    /// played; notices for sessions that were forced or replaced are
    /// ignored.
    pub fn handle_brain_event(&mut self, event: BrainEvent) -> Result<bool> {
        if event.side != self.to_play {
            debug!("ignoring {} completion, {} to move", event.side, self.to_play);
            return Ok(false);
        }
        match self.players[event.side.index()].brain.take_ready_move(event)? {
            Some(best) => {
                self.player_ready_to_make_move(best)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Handles every completion notice already queued.
    pub fn process_brain_events(&mut self) -> Result<usize> {
        let mut played = 0;
        while let Ok(event) = self.brain_events.try_recv() {
            if self.handle_brain_event(event)? {
                played += 1;
            }
        }
        Ok(played)
    }

    /// Blocks until a brain posts a completion notice or `timeout` passes,
    /// then handles it. Returns whether a move was played.
    pub fn wait_for_computer_move(&mut self, timeout: Duration) -> Result<bool> {
        match self.brain_events.recv_timeout(timeout) {
            Ok(event) => self.handle_brain_event(event),
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => Ok(false),
        }
    }

    fn player_ready_to_make_move(&mut self, best: ChessMove) -> Result<()> {
        info!("{} plays {best}", self.to_play);
        self.make_move_internal(best, true)?;
        self.save_backup();
        self.send_board_position_change_event();
        if self.player_to_play().is_computer() && !self.is_paused() {
            self.make_next_computer_move()
        } else {
            self.resume_pondering()
        }
    }

    /// Starts the automatic reply to a human move. Never chains from a
    /// human move when both sides are computers.
    fn check_if_auto_next_move(&mut self) -> Result<()> {
        if self.players.iter().all(Player::is_computer) {
            return Ok(());
        }
        if self.player_to_play().is_computer() {
            self.make_next_computer_move()?;
        }
        Ok(())
    }

    fn make_next_computer_move(&mut self) -> Result<()> {
        if !self.board.can_move() {
            return Ok(());
        }
        let request = self.search_request();
        let brain = &mut self.players[self.to_play.index()].brain;
        if brain.is_idle() {
            brain.start_thinking(request)?;
        }
        Ok(())
    }

    /// Lets the side to move ponder while a computer opponent waits.
    fn resume_pondering(&mut self) -> Result<()> {
        if self.is_paused() || !self.settings.enable_pondering || !self.board.can_move() {
            return Ok(());
        }
        if self.players.iter().all(Player::is_computer) {
            return Ok(());
        }
        if !self.player(self.to_play.opposing()).is_computer() {
            return Ok(());
        }
        if !self.player_to_play().brain.is_idle() {
            return Ok(());
        }
        let request = self.search_request();
        self.players[self.to_play.index()]
            .brain
            .start_pondering(request)?;
        Ok(())
    }

    /// Brings any background search to a stop before the position changes.
    /// A thinking search has its move played and taken back.
    fn suspend_pondering(&mut self) -> Result<()> {
        let side = self.to_play;
        let was_paused = self.is_paused();
        let brain = &mut self.players[side.index()].brain;
        if brain.is_pondering() {
            brain.force_immediate_move()?;
        } else if brain.is_thinking() {
            let best = brain.force_immediate_move()?.ok_or_else(|| {
                GameError::EngineInvariant(format!("{side} stopped thinking without a move"))
            })?;
            debug!("{side} interrupted, parking {best} on the redo list");
            self.make_move_internal(best, false)?;
            self.undo_move_internal()?;
            if was_paused {
                self.players[side.index()].clock.stop();
            }
        }
        Ok(())
    }

    fn search_request(&self) -> SearchRequest {
        SearchRequest {
            board: *self.board.position(),
            max_depth: self.settings.maximum_search_depth,
            time_budget: Some(self.settings.time_per_move()),
            random_opening: self.settings.use_random_opening_moves,
            plies_played: self.history.len(),
        }
    }

    /// Resets logs, counters and clocks around `board`. The side to move
    /// starts with a running clock.
    fn install_board(&mut self, board: ChessBoard) {
        self.history.clear();
        self.redo.clear();
        self.analysis.clear();
        self.turn_no = 0;
        self.save_game_file_name.clear();
        self.to_play = board.side_to_move();
        self.board = board;
        for player in self.players.iter_mut() {
            player.clock.reset();
        }
        self.players[self.to_play.index()].clock.start();
    }

    pub(crate) fn new_internal(&mut self, fen: &str) -> Result<()> {
        let board = ChessBoard::from_fen(fen)?;
        self.install_board(board);
        Ok(())
    }

    /// Plays `chess_move` for the side to move. A `live` move made for a
    /// computer side is announced to the protocol, whoever chose it.
    pub(crate) fn make_move_internal(&mut self, chess_move: ChessMove, live: bool) -> Result<()> {
        let mover = self.to_play;
        let mut record = self.board.apply(chess_move)?;
        self.redo.clear();
        record.set_move_no(self.turn_no);
        self.turn_no += 1;

        let player = &mut self.players[mover.index()];
        player.clock.stop();
        record.set_time_stamp(player.clock.time_elapsed());
        let computer = player.is_computer();

        if computer && live {
            self.announce(&record);
        }
        if computer && self.settings.capture_move_analysis_data {
            self.analysis.push(record.clone());
        }
        self.history.push(record);

        self.to_play = mover.opposing();
        self.players[self.to_play.index()].clock.start();
        Ok(())
    }

    /// Takes back the last ply. Returns false when there was none.
    pub(crate) fn undo_move_internal(&mut self) -> Result<bool> {
        let record = match self.history.pop() {
            Some(record) => record,
            None => return Ok(false),
        };
        if let Err(e) = self.board.undo(&record) {
            self.history.push(record);
            return Err(e);
        }

        let was_paused = self.is_paused();
        self.players[self.to_play.index()].clock.revert();
        self.turn_no = self.turn_no.saturating_sub(1);
        self.to_play = record.side();

        let elapsed = self
            .history
            .last_for_side(self.to_play)
            .map_or(Duration::ZERO, |r| r.time_stamp());
        let clock = &mut self.players[self.to_play.index()].clock;
        clock.set_time_elapsed(elapsed);
        if !was_paused {
            clock.start();
        }

        self.redo.push(record);
        Ok(true)
    }

    /// Replays the most recently taken-back ply. Returns false when there
    /// was none.
    fn redo_move_internal(&mut self) -> Result<bool> {
        let mut record = match self.redo.pop() {
            Some(record) => record,
            None => return Ok(false),
        };
        let chess_move = ChessMove::new(record.from(), record.to(), record.name().promotion());
        let replayed = match self.board.apply(chess_move) {
            Ok(replayed) => replayed,
            Err(e) => {
                self.redo.push(record);
                return Err(e);
            }
        };

        let was_paused = self.is_paused();
        let mover = record.side();
        record.set_enemy_status(replayed.enemy_status());
        record.set_move_no(self.turn_no);
        self.turn_no += 1;

        let clock = &mut self.players[mover.index()].clock;
        clock.revert();
        clock.set_time_elapsed(record.time_stamp());
        self.history.push(record);

        self.to_play = mover.opposing();
        if !was_paused {
            self.players[self.to_play.index()].clock.start();
        }
        Ok(true)
    }

    /// Tells the protocol about a computer move and whatever it ends.
    fn announce(&mut self, record: &moves::MoveRecord) {
        self.protocol.send_move(record);
        if !self.board.can_move() {
            if self.board.is_checkmate() {
                self.protocol.send_checkmate();
            } else if !self.board.is_in_check() {
                self.protocol.send_stalemate();
            }
        } else if self.board.can_claim_three_fold_repetition() {
            self.protocol.send_draw(DrawReason::Repetition);
        } else if self.board.can_claim_fifty_move_draw() {
            self.protocol.send_draw(DrawReason::FiftyMoveRule);
        } else if self.board.can_claim_insufficient_material_draw() {
            self.protocol.send_draw(DrawReason::InsufficientMaterial);
        }
    }

    fn save_backup(&mut self) {
        if self.protocol.is_active() {
            return;
        }
        let path = match &self.backup_path {
            Some(path) => path,
            None => return,
        };
        if let Err(e) = save_file::write(path, &self.to_document()) {
            warn!("could not write backup {}: {e}", path.display());
        }
    }

    fn send_board_position_change_event(&mut self) {
        self.events.publish(GameEvent::BoardPositionChanged);
    }
}
