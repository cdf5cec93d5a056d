//! End-to-end runs: parse a level, drive it with scripted input and check
//! how it ends.

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use lavarun_core::snapshot::LevelSnapshot;
use lavarun_core::test_helpers::{TEST_SEED, count_kind, level_from_rows};
use lavarun_core::{ActorKind, LevelParser, Status};
use lavarun_session::config::GameConfig;
use lavarun_session::controller::PlayerInput;
use lavarun_session::levels::builtin_pack;
use lavarun_session::{GameEvent, Session};

const FRAME: f64 = 1.0 / 60.0;

/// Run whole frames until the level finishes or `max_secs` pass.
fn play(session: &mut Session, input: PlayerInput, max_secs: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    while !session.is_finished() && session.elapsed() < max_secs {
        events.extend(session.update(FRAME, &input));
    }
    events
}

fn builtin_session(index: usize) -> Session {
    let pack = builtin_pack();
    let level = LevelParser::default()
        .parse_with_rng(&pack[index], &mut StdRng::seed_from_u64(TEST_SEED));
    Session::new(level, &GameConfig::default())
}

#[test]
fn first_builtin_level_is_won_by_running_right() {
    let mut session = builtin_session(0);
    let coins = count_kind(session.level(), ActorKind::Coin);

    let events = play(&mut session, PlayerInput::RIGHT, 10.0);

    assert!(session.is_finished());
    assert_eq!(session.level().status(), Some(Status::Won));
    let collected = events
        .iter()
        .filter(|e| matches!(e, GameEvent::CoinCollected { .. }))
        .count();
    assert_eq!(collected, coins);
    assert_eq!(events.last(), Some(&GameEvent::Finished(Status::Won)));
}

#[test]
fn falling_into_lava_is_lost() {
    let mut session = Session::new(level_from_rows(&["  ", "@ ", "  ", "!!"]), &GameConfig::default());
    play(&mut session, PlayerInput::default(), 5.0);
    assert!(session.is_finished());
    assert_eq!(session.level().status(), Some(Status::Lost));
}

#[test]
fn fireball_collision_is_lost() {
    let mut session = Session::new(level_from_rows(&["     ", "@   =", "xxxxx"]), &GameConfig::default());
    play(&mut session, PlayerInput::default(), 5.0);
    assert_eq!(session.level().status(), Some(Status::Lost));
}

#[test]
fn finish_delay_holds_the_level_open() {
    let mut config = GameConfig::default();
    config.session.finish_delay = 0.5;
    let mut session = Session::new(level_from_rows(&["o ", "@ ", "xx"]), &config);

    session.update(FRAME, &PlayerInput::default());
    assert_eq!(session.level().status(), Some(Status::Won));
    assert!(!session.is_finished());

    play(&mut session, PlayerInput::default(), 5.0);
    assert!(session.is_finished());
    assert!(session.elapsed() >= 0.5 - 1e-9);
    assert!(session.elapsed() < 0.6);
}

#[test]
fn snapshot_resumes_mid_level() {
    let mut original = builtin_session(1);
    for _ in 0..10 {
        original.update(FRAME, &PlayerInput::RIGHT);
    }

    assert_eq!(original.level().status(), None);
    let bytes = LevelSnapshot::capture(original.level()).encode().unwrap();
    let restored = LevelSnapshot::decode(&bytes).unwrap().restore();
    let mut resumed = Session::new(restored, &GameConfig::default());
    assert_eq!(resumed.level(), original.level());

    for _ in 0..30 {
        original.update(FRAME, &PlayerInput::RIGHT);
        resumed.update(FRAME, &PlayerInput::RIGHT);
    }
    assert_eq!(resumed.level(), original.level());
}

fn input_strategy() -> impl Strategy<Value = PlayerInput> {
    (any::<bool>(), any::<bool>(), any::<bool>())
        .prop_map(|(left, right, jump)| PlayerInput { left, right, jump })
}

proptest! {
    #[test]
    fn status_never_changes_once_set(
        frames in prop::collection::vec((input_strategy(), 0.001f64..0.2), 1..200),
    ) {
        let mut session = builtin_session(1);
        let mut seen: Option<Status> = None;
        for (input, dt) in frames {
            session.update(dt, &input);
            if let Some(before) = seen {
                prop_assert_eq!(session.level().status(), Some(before));
            }
            seen = session.level().status();
        }
    }

    #[test]
    fn player_stays_inside_the_field(
        frames in prop::collection::vec((input_strategy(), 0.001f64..0.1), 1..200),
    ) {
        let mut session = builtin_session(0);
        let width = session.level().width() as f64;
        for (input, dt) in frames {
            session.update(dt, &input);
            if let Some(player) = session.level().player() {
                prop_assert!(player.left() >= 0.0);
                prop_assert!(player.right() <= width);
                prop_assert!(player.top() >= 0.0);
            }
        }
    }
}
