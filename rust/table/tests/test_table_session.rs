use headsup_engine::game::Phase;
use headsup_engine::player::PlayerId;
use headsup_table::{SessionError, SessionManager, TableSession, TableSettings};

fn settings(seed: u64) -> TableSettings {
    TableSettings {
        seed: Some(seed),
        ..TableSettings::default()
    }
}

fn total_chips(snap: &headsup_table::TableSnapshot) -> u32 {
    snap.pot + snap.players.iter().map(|p| p.stack).sum::<u32>()
}

#[test]
fn limp_and_check_reaches_the_flop() {
    let mut session = TableSession::new(settings(11));
    session.start_new_hand("Alice").expect("deal");

    let snap = session.apply_player_action("p1", "call", 0).expect("call");
    assert_eq!(snap.phase, Phase::Preflop);
    assert_eq!(snap.current_turn, PlayerId::P2);

    // drive the opponent until the human is to act again or the hand ends
    let snap = session.run_opponent_turn().expect("opponent");
    assert_eq!(total_chips(&snap), 2000);
    if snap.phase == Phase::Flop {
        assert_eq!(snap.community_cards.len(), 3);
        assert_eq!(snap.pot, 40);
        assert_eq!(snap.current_turn, PlayerId::P2);
    }
}

#[test]
fn rejected_actions_leave_the_table_untouched() {
    let mut session = TableSession::new(settings(12));
    let before = session.start_new_hand("Alice").expect("deal");

    for (player, action) in [
        ("p2", "call"),
        ("p9", "call"),
        ("p1", "shove"),
        ("p1", "check"),
        ("p1", "bet"),
    ] {
        match session.apply_player_action(player, action, 0) {
            Err(SessionError::InvalidAction(_)) => {}
            other => panic!("expected rejection for {player}/{action}, got {:?}", other),
        }
    }
    assert_eq!(session.state(), before);
}

#[test]
fn out_of_turn_and_after_showdown_are_rejected() {
    let mut session = TableSession::new(settings(13));
    session.start_new_hand("Alice").expect("deal");
    session.apply_player_action("p1", "call", 0).expect("call");

    let err = session
        .apply_player_action("p1", "call", 0)
        .expect_err("not p1's turn");
    assert!(err.to_string().contains("turn"));

    let mut session = TableSession::new(settings(14));
    session.start_new_hand("Alice").expect("deal");
    let snap = session.apply_player_action("p1", "fold", 0).expect("fold");
    assert!(snap.is_hand_over());
    assert_eq!(snap.player(PlayerId::P2).expect("cpu").stack, 1010);
    let showdown = snap.showdown.expect("result");
    assert_eq!(showdown.winners, vec![PlayerId::P2]);

    assert!(matches!(
        session.apply_player_action("p1", "call", 0),
        Err(SessionError::InvalidAction(_))
    ));
    // opponent has nothing to do either
    assert_eq!(session.run_opponent_turn().expect("noop"), session.state());
}

#[test]
fn full_hands_against_the_opponent_conserve_chips() {
    let mut session = TableSession::new(settings(15));
    for hand in 0..10 {
        let snap = session.start_new_hand("Alice").expect("deal");
        if snap.is_hand_over() && snap.message.contains("Reset") {
            // someone is out of chips
            break;
        }
        let mut guard = 0;
        loop {
            let snap = session.state();
            if snap.is_hand_over() || guard > 50 {
                break;
            }
            if snap.current_turn == PlayerId::P1 {
                session.apply_player_action("p1", "call", 0).expect("call");
            } else {
                session.run_opponent_turn().expect("opponent");
            }
            guard += 1;
        }
        let snap = session.state();
        assert!(snap.is_hand_over());
        assert_eq!(snap.pot, 0);
        let chips = total_chips(&snap);
        assert!(chips <= 2000 && chips >= 2000 - hand - 1);
    }
}

#[test]
fn reset_restores_stacks_and_deals() {
    let mut session = TableSession::new(settings(16));
    session.start_new_hand("Alice").expect("deal");
    session.apply_player_action("p1", "raise", 100).expect("raise");

    let snap = session.reset_session("Alice").expect("reset");
    assert_eq!(snap.phase, Phase::Preflop);
    assert!(snap.message.starts_with("Stacks reset to 1000."));
    assert_eq!(total_chips(&snap), 2000);
}

#[test]
fn manager_keeps_tables_independent() {
    let manager = SessionManager::new(settings(21));
    let a = manager.create_session("Alice").expect("create");
    let b = manager.create_session("Bob").expect("create");
    assert_ne!(a, b);

    manager
        .apply_player_action(&a, "p1", "fold", 0)
        .expect("fold");

    let sa = manager.state(&a).expect("state a");
    let sb = manager.state(&b).expect("state b");
    assert!(sa.is_hand_over());
    assert_eq!(sb.phase, Phase::Preflop);
    assert_eq!(sb.player(PlayerId::P1).expect("bob").name, "Bob");
    assert_eq!(sb.pot, 30);

    manager.delete_session(&a).expect("delete");
    assert!(matches!(manager.state(&a), Err(SessionError::NotFound(_))));
    assert!(matches!(
        manager.delete_session(&a),
        Err(SessionError::NotFound(_))
    ));
    assert_eq!(manager.active_sessions(), vec![b]);
}

#[test]
fn zero_ttl_expires_immediately() {
    let manager = SessionManager::with_ttl(settings(22), std::time::Duration::ZERO);
    let id = manager.create_session("Alice").expect("create");
    assert!(matches!(manager.state(&id), Err(SessionError::Expired(_))));
    assert!(manager.active_sessions().is_empty());
}
