use headsup_table::{init_test_logging, IntoErrorResponse, TableSession, TableSettings};
use serial_test::serial;
use tracing::Level;

fn session() -> TableSession {
    TableSession::new(TableSettings {
        seed: Some(31),
        ..TableSettings::default()
    })
}

#[test]
#[serial]
fn hand_start_is_logged_with_the_hand_id() {
    let logs = init_test_logging();
    let mut session = session();
    session.start_new_hand("Alice").expect("deal");

    let started = logs.find("hand started");
    assert_eq!(started.len(), 1);
    let hand_id = session.hand_record().expect("record").hand_id.clone();
    assert_eq!(started[0].field("hand_id"), Some(hand_id.as_str()));
    assert_eq!(started[0].target, "headsup_engine::engine");
}

#[test]
#[serial]
fn rejections_are_logged_as_warnings() {
    let logs = init_test_logging();
    let mut session = session();
    session.start_new_hand("Alice").expect("deal");
    let err = session
        .apply_player_action("p2", "call", 0)
        .expect_err("opponent seat");

    let rejected = logs.find("action rejected");
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].level, Level::WARN);

    let response = err.report();
    assert_eq!(response.error, "invalid_action");
    assert_eq!(logs.find("client error").len(), 1);
}

#[test]
#[serial]
fn showdowns_are_logged() {
    let logs = init_test_logging();
    let mut session = session();
    session.start_new_hand("Alice").expect("deal");
    let mut guard = 0;
    while !session.state().is_hand_over() && guard < 50 {
        if session.state().current_turn == headsup_table::HUMAN_SEAT {
            session.apply_player_action("p1", "call", 0).expect("call");
        } else {
            session.run_opponent_turn().expect("opponent");
        }
        guard += 1;
    }

    let ended = logs.find("showdown").len() + logs.find("hand ended on fold").len();
    assert_eq!(ended, 1);
}
