mod common;

use std::fs;
use std::time::Duration;

use chess_contest::game::events::GameEvent;
use chess_contest::{Game, GameError, GameSettings, Intelligence, MoveName, Side, START_FEN};
use common::*;

#[test]
fn new_game_from_position_hands_the_move_to_black() {
    let mut game = humans();
    let fen = "4k3/8/8/8/8/8/4P3/4K3 b - - 0 40";
    game.new_game(Some(fen)).unwrap();

    assert_eq!(game.to_play(), Side::Black);
    assert_eq!(game.turn_no(), 0);
    assert_eq!(game.fen(), fen);
    assert!(game.history().is_empty());
}

#[test]
fn invalid_position_changes_nothing() {
    let mut game = humans();
    play(&mut game, &[("e2", "e4")]);
    let fen = game.fen();

    let err = game.new_game(Some("8/8/8/banana w - - 0 1")).unwrap_err();
    assert!(matches!(err, GameError::InvalidPosition(_)));
    assert_eq!(game.fen(), fen);
    assert_eq!(game.history().len(), 1);
}

#[test]
fn illegal_and_misnamed_moves_are_rejected() {
    let mut game = humans();
    assert!(matches!(
        game.play(sq("e2"), sq("e5"), None),
        Err(GameError::IllegalMove(_))
    ));
    assert!(matches!(
        game.make_move(MoveName::EnPassant, sq("e2"), sq("e4")),
        Err(GameError::IllegalMove(_))
    ));
    assert!(game.history().is_empty());
    assert_eq!(game.fen(), START_FEN);
}

#[test]
fn undo_then_redo_restores_the_ply() {
    let mut game = humans();
    play(&mut game, &[("d2", "d4"), ("g8", "f6")]);
    let fen = game.fen();
    let stamp = game.history().last().unwrap().time_stamp();

    game.undo_move().unwrap();
    assert_eq!(game.turn_no(), 1);
    assert_eq!(game.to_play(), Side::Black);
    assert_eq!(game.redo_list().len(), 1);

    game.redo_move().unwrap();
    assert_eq!(game.fen(), fen);
    assert_eq!(game.turn_no(), 2);
    assert_eq!(game.to_play(), Side::White);
    assert!(game.redo_list().is_empty());
    assert_eq!(game.history().last().unwrap().time_stamp(), stamp);
}

fn seconds(game: &Game, side: Side) -> u64 {
    game.player(side).clock.time_elapsed().as_secs()
}

fn ticking(game: &Game) -> [bool; 2] {
    [
        game.player(Side::White).clock.is_ticking(),
        game.player(Side::Black).clock.is_ticking(),
    ]
}

#[test]
fn clocks_follow_undo_and_redo() {
    let path = temp_path("clocks");
    fs::write(
        &path,
        r#"{
            "moves": [
                { "name": "Standard", "from": "e2", "to": "e4", "seconds_elapsed": 10 },
                { "name": "Standard", "from": "e7", "to": "e5", "seconds_elapsed": 20 },
                { "name": "Standard", "from": "g1", "to": "f3", "seconds_elapsed": 30 }
            ]
        }"#,
    )
    .unwrap();
    let mut game = humans();
    game.load(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!((seconds(&game, Side::White), seconds(&game, Side::Black)), (30, 20));
    assert_eq!(ticking(&game), [false, false]);

    game.undo_move().unwrap();
    assert_eq!((seconds(&game, Side::White), seconds(&game, Side::Black)), (10, 20));
    assert_eq!(ticking(&game), [false, false]);

    game.redo_move().unwrap();
    assert_eq!((seconds(&game, Side::White), seconds(&game, Side::Black)), (30, 20));
    assert_eq!(ticking(&game), [false, false]);

    game.resume_play().unwrap();
    assert_eq!(ticking(&game), [false, true]);

    game.undo_move().unwrap();
    assert_eq!((seconds(&game, Side::White), seconds(&game, Side::Black)), (10, 20));
    assert_eq!(ticking(&game), [true, false]);

    game.undo_move().unwrap();
    assert_eq!((seconds(&game, Side::White), seconds(&game, Side::Black)), (10, 0));
    assert_eq!(ticking(&game), [false, true]);

    game.undo_move().unwrap();
    assert_eq!((seconds(&game, Side::White), seconds(&game, Side::Black)), (0, 0));
    assert_eq!(ticking(&game), [true, false]);

    game.redo_move().unwrap();
    assert_eq!((seconds(&game, Side::White), seconds(&game, Side::Black)), (10, 0));
    assert_eq!(ticking(&game), [false, true]);
}

#[test]
fn a_new_move_discards_the_redo_list() {
    let mut game = humans();
    play(&mut game, &[("e2", "e4"), ("e7", "e5")]);
    game.undo_move().unwrap();
    assert_eq!(game.redo_list().len(), 1);

    play(&mut game, &[("c7", "c5")]);
    assert!(game.redo_list().is_empty());
    assert_eq!(game.history().len(), 2);
}

#[test]
fn undo_and_redo_on_empty_logs_do_nothing() {
    let mut game = humans();
    game.undo_move().unwrap();
    game.redo_move().unwrap();
    assert_eq!(game.turn_no(), 0);
    assert_eq!(game.fen(), START_FEN);
}

#[test]
fn undo_all_then_new_game() {
    let mut game = humans();
    play(&mut game, &TEN_PLIES);
    assert_eq!(game.turn_no(), 10);
    assert_eq!(game.move_no(), 5);

    game.undo_all_moves().unwrap();
    assert_eq!(game.turn_no(), 0);
    assert!(game.history().is_empty());
    assert_eq!(game.redo_list().len(), 10);
    assert_eq!(game.fen(), START_FEN);

    game.redo_all_moves().unwrap();
    assert_eq!(game.turn_no(), 10);
    game.undo_all_moves().unwrap();

    game.new_game(None).unwrap();
    assert!(game.redo_list().is_empty());
    assert_eq!(game.file_name(), "New Game");
}

#[test]
fn computer_replies_to_a_human_move() {
    let recording = Recording::default();
    let mut game = Game::builder()
        .players(Intelligence::Human, Intelligence::Computer)
        .searcher(FirstMove)
        .protocol(recording.clone())
        .build()
        .unwrap();

    play(&mut game, &[("e2", "e4")]);
    assert!(game.player(Side::Black).brain.is_thinking());
    assert!(game.wait_for_computer_move(WAIT).unwrap());

    assert_eq!(game.turn_no(), 2);
    assert_eq!(game.to_play(), Side::White);
    let sent = recording.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("move "));
}

#[test]
fn a_move_played_for_a_computer_side_is_announced() {
    let recording = Recording::default();
    let mut game = Game::builder()
        .players(Intelligence::Computer, Intelligence::Human)
        .searcher(FirstMove)
        .protocol(recording.clone())
        .build()
        .unwrap();

    play(&mut game, &[("e2", "e4"), ("e7", "e5")]);
    let sent = recording.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("move "));
}

#[test]
fn both_computers_never_chain_from_a_human_move() {
    let mut game = Game::builder()
        .players(Intelligence::Computer, Intelligence::Computer)
        .searcher(FirstMove)
        .build()
        .unwrap();

    play(&mut game, &[("e2", "e4")]);
    assert!(game.player(Side::Black).brain.is_idle());
    assert!(!game.wait_for_computer_move(Duration::from_millis(100)).unwrap());
    assert_eq!(game.turn_no(), 1);
}

#[test]
fn resumed_computers_play_each_other_until_paused() {
    let mut game = Game::builder()
        .players(Intelligence::Computer, Intelligence::Computer)
        .searcher(FirstMove)
        .build()
        .unwrap();

    game.resume_play().unwrap();
    assert!(game.wait_for_computer_move(WAIT).unwrap());
    assert!(game.wait_for_computer_move(WAIT).unwrap());
    assert!(game.turn_no() >= 2);

    game.pause_play().unwrap();
    assert!(game.is_paused());
    let turn_no = game.turn_no();
    game.process_brain_events().unwrap();
    assert_eq!(game.turn_no(), turn_no);
}

#[test]
fn pause_parks_the_interrupted_move_on_redo() {
    let mut game = Game::builder()
        .players(Intelligence::Human, Intelligence::Computer)
        .searcher(UntilStopped)
        .build()
        .unwrap();

    play(&mut game, &[("e2", "e4")]);
    let before = game.fen();
    assert!(game.player(Side::Black).brain.is_thinking());

    game.pause_play().unwrap();
    assert!(game.is_paused());
    assert_eq!(game.fen(), before);
    assert_eq!(game.to_play(), Side::Black);
    assert_eq!(game.history().len(), 1);
    assert_eq!(game.redo_list().len(), 1);
    assert_eq!(game.redo_list().last().unwrap().side(), Side::Black);
    assert!(game.player(Side::Black).brain.is_idle());

    game.redo_move().unwrap();
    assert_eq!(game.turn_no(), 2);
}

#[test]
fn think_plays_for_a_human_side() {
    let mut game = humans();
    game.think().unwrap();
    assert!(game.wait_for_computer_move(WAIT).unwrap());
    assert_eq!(game.turn_no(), 1);
    assert_eq!(game.to_play(), Side::Black);
}

#[test]
fn pondering_runs_while_the_human_decides() {
    let settings = GameSettings {
        enable_pondering: true,
        ..GameSettings::default()
    };
    let mut game = Game::builder()
        .settings(settings)
        .players(Intelligence::Human, Intelligence::Computer)
        .searcher(FirstMove)
        .build()
        .unwrap();

    play(&mut game, &[("d2", "d4")]);
    assert!(game.wait_for_computer_move(WAIT).unwrap());
    assert!(game.player(Side::White).brain.is_pondering());

    play(&mut game, &[("c2", "c4")]);
    assert!(!game.player(Side::White).brain.is_pondering());
    assert_eq!(game.turn_no(), 3);
    assert!(game.redo_list().is_empty());
}

#[test]
fn computer_moves_are_captured_for_analysis() {
    let settings = GameSettings {
        capture_move_analysis_data: true,
        ..GameSettings::default()
    };
    let mut game = Game::builder()
        .settings(settings)
        .players(Intelligence::Human, Intelligence::Computer)
        .searcher(FirstMove)
        .build()
        .unwrap();

    play(&mut game, &[("e2", "e4")]);
    assert!(game.wait_for_computer_move(WAIT).unwrap());
    assert_eq!(game.analysis().len(), 1);
    assert_eq!(game.analysis().last().unwrap().side(), Side::Black);

    game.clear_analysis();
    assert!(game.analysis().is_empty());
}

#[test]
fn subscribers_hear_about_changes() {
    let mut game = humans();
    let events = game.subscribe();

    play(&mut game, &[("e2", "e4")]);
    game.update_settings(|s| s.maximum_search_depth = 4).unwrap();
    game.pause_play().unwrap();
    game.resume_play().unwrap();

    let received: Vec<GameEvent> = events.try_iter().collect();
    assert_eq!(
        received,
        vec![
            GameEvent::BoardPositionChanged,
            GameEvent::SettingsUpdated,
            GameEvent::GamePaused,
            GameEvent::GameResumed,
        ]
    );
    assert_eq!(game.settings().maximum_search_depth, 4);
}

#[test]
fn changing_intelligence_is_a_settings_update() {
    let mut game = humans();
    let events = game.subscribe();
    game.set_player_intelligence(Side::Black, Intelligence::Computer)
        .unwrap();
    assert!(game.player(Side::Black).is_computer());
    assert_eq!(events.try_recv().unwrap(), GameEvent::SettingsUpdated);
}
