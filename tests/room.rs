//! Integration tests for the room driver: signals in, events and ledger submissions out.

use pong_tournament::{
    EndReason, Ledger, MemoryLedger, MemoryTransport, ParticipantId, RoomEvent, RoomSignal,
    Session, Side, Tournament, TournamentConfig, TournamentPhase, TournamentRoom,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const NAMESPACE: &str = "/tournament";

struct Setup {
    players: Vec<ParticipantId>,
    transport: MemoryTransport,
    ledger: Arc<MemoryLedger>,
    room: TournamentRoom<MemoryTransport>,
}

fn setup_with(ledger: MemoryLedger, breather: Duration) -> Setup {
    let players: Vec<ParticipantId> = (0..4).map(|_| Uuid::new_v4()).collect();
    let transport = MemoryTransport::new();
    for (i, &id) in players.iter().enumerate() {
        transport.register_session(NAMESPACE, Session::new(id, format!("P{}", i + 1)));
    }
    let ledger = Arc::new(ledger);
    let config = TournamentConfig::default()
        .with_end_score(3)
        .with_breather(breather)
        .with_namespace(NAMESPACE);
    let room = TournamentRoom::new(
        Tournament::new(players.clone()).unwrap(),
        transport.clone(),
        Arc::clone(&ledger) as Arc<dyn Ledger>,
        config,
    );
    Setup {
        players,
        transport,
        ledger,
        room,
    }
}

fn setup() -> Setup {
    setup_with(MemoryLedger::new(), Duration::ZERO)
}

fn points(scorer: ParticipantId, n: usize) -> Vec<RoomSignal> {
    vec![RoomSignal::PointScored(scorer); n]
}

fn end_games(events: &[RoomEvent]) -> Vec<(u32, EndReason, Option<Side>)> {
    events
        .iter()
        .filter_map(|e| match e {
            RoomEvent::EndGame {
                round,
                reason,
                winner_side,
            } => Some((*round, *reason, *winner_side)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn full_tournament_submits_sealed_log() {
    let Setup {
        players: p,
        transport,
        ledger,
        room,
    } = setup();
    let handle = room.spawn();

    let mut script = Vec::new();
    script.extend(points(p[0], 2));
    script.push(RoomSignal::PointScored(p[1]));
    script.extend(points(p[0], 1));
    script.extend(points(p[3], 3));
    script.extend(points(p[0], 1));
    script.extend(points(p[3], 3));
    for signal in script {
        handle.signals.send(signal).await.unwrap();
    }

    let report = handle.task.await.unwrap();
    report
        .submission
        .expect("ledger submission dispatched")
        .await
        .unwrap();

    let t = &report.tournament;
    assert_eq!(t.phase(), TournamentPhase::Complete);
    assert_eq!(t.round, 3);
    assert_eq!(t.winners, vec![p[0], p[3], p[3]]);
    assert!(t.log.is_sealed());

    let events = transport.events();
    assert_eq!(
        end_games(&events),
        vec![
            (1, EndReason::Normal, Some(Side::Left)),
            (2, EndReason::Normal, Some(Side::Right)),
            (3, EndReason::Normal, Some(Side::Right)),
        ]
    );
    // The deciding score update comes right before each end notice.
    let final_pos = events.len() - 1;
    assert_eq!(
        events[final_pos - 1],
        RoomEvent::UpdateGameScore {
            left_user_score: 1,
            right_user_score: 3
        }
    );
    assert!(transport.is_closed());
    assert_eq!(transport.disconnected(), p);

    let entries = ledger.entries();
    assert_eq!(entries.len(), 1);
    let items = entries[0].as_array().unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items[0]["winner"]["name"], "P1");
    assert_eq!(items[0]["loser"]["score"], 1);
    assert_eq!(items[2]["game_id"], 3);
    assert!(items[3].is_i64());
}

#[tokio::test]
async fn departure_in_second_round_aborts_without_submission() {
    let Setup {
        players: p,
        transport,
        ledger,
        room,
    } = setup();
    let handle = room.spawn();

    for signal in points(p[1], 3) {
        handle.signals.send(signal).await.unwrap();
    }
    handle.signals.send(RoomSignal::PointScored(p[2])).await.unwrap();
    handle.signals.send(RoomSignal::PlayerLeft(p[3])).await.unwrap();

    let report = handle.task.await.unwrap();
    assert!(report.submission.is_none());
    assert!(report.tournament.expired);
    assert_eq!(report.tournament.round, 2);
    assert_eq!(report.tournament.log.len(), 1);
    assert_eq!(
        end_games(&transport.events()),
        vec![
            (1, EndReason::Normal, Some(Side::Right)),
            (2, EndReason::OpponentLeft, Some(Side::Right)),
        ]
    );
    assert!(transport.is_closed());
    assert_eq!(transport.disconnected().len(), 4);
    assert!(ledger.entries().is_empty());
}

#[tokio::test]
async fn strangers_and_bystanders_do_not_disturb_the_match() {
    let Setup {
        players: p,
        transport,
        room,
        ..
    } = setup();
    let handle = room.spawn();

    handle.signals.send(RoomSignal::PlayerLeft(Uuid::new_v4())).await.unwrap();
    handle.signals.send(RoomSignal::PointScored(p[2])).await.unwrap();
    handle.signals.send(RoomSignal::PointScored(p[0])).await.unwrap();
    handle.signals.send(RoomSignal::PlayerLeft(p[1])).await.unwrap();

    let report = handle.task.await.unwrap();
    assert_eq!(report.tournament.round, 1);
    assert_eq!(report.tournament.score_pair(), (1, 0));
    let events = transport.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        end_games(&events),
        vec![(1, EndReason::OpponentLeft, None)]
    );
}

#[tokio::test]
async fn lost_session_at_decision_aborts_tournament() {
    let Setup {
        players: p,
        transport,
        ledger,
        room,
    } = setup();
    transport.drop_session(NAMESPACE, p[1]);
    let handle = room.spawn();

    for signal in points(p[0], 3) {
        handle.signals.send(signal).await.unwrap();
    }

    let report = handle.task.await.unwrap();
    assert!(report.tournament.expired);
    assert!(report.tournament.log.is_empty());
    assert!(report.tournament.winners.is_empty());
    assert_eq!(report.tournament.score_pair(), (2, 0));
    assert_eq!(
        end_games(&transport.events()),
        vec![(1, EndReason::OpponentLeft, None)]
    );
    assert!(ledger.entries().is_empty());
}

#[tokio::test]
async fn closed_signal_channel_ends_tournament() {
    let Setup { transport, room, .. } = setup();
    let handle = room.spawn();
    drop(handle.signals);

    let report = handle.task.await.unwrap();
    assert_eq!(report.tournament.phase(), TournamentPhase::Complete);
    assert!(transport.is_closed());
}

#[tokio::test]
async fn departure_during_breather_preempts_and_early_points_are_ignored() {
    let Setup {
        players: p,
        transport,
        room,
        ..
    } = setup_with(MemoryLedger::new(), Duration::from_millis(200));
    let handle = room.spawn();

    for signal in points(p[0], 3) {
        handle.signals.send(signal).await.unwrap();
    }
    handle.signals.send(RoomSignal::PlayerLeft(p[0])).await.unwrap();

    let report = handle.task.await.unwrap();
    assert!(report.tournament.expired);
    assert!(report.tournament.ball_frozen);
    assert_eq!(report.tournament.score_pair(), (0, 0));
    assert_eq!(
        transport.events(),
        vec![RoomEvent::EndGame {
            round: 1,
            reason: EndReason::OpponentLeft,
            winner_side: None
        }]
    );
}

#[tokio::test]
async fn rejected_submission_leaves_state_alone() {
    let Setup {
        players: p,
        ledger,
        room,
        ..
    } = setup_with(MemoryLedger::rejecting("chain unavailable"), Duration::ZERO);
    let handle = room.spawn();

    let mut script = points(p[0], 3);
    script.extend(points(p[2], 3));
    script.extend(points(p[2], 3));
    for signal in script {
        handle.signals.send(signal).await.unwrap();
    }

    let report = handle.task.await.unwrap();
    report.submission.unwrap().await.unwrap();
    assert!(report.tournament.log.is_sealed());
    assert_eq!(report.tournament.log.len(), 3);
    assert!(ledger.entries().is_empty());
}

#[tokio::test]
async fn hooks_drive_a_room_by_hand() {
    let Setup {
        players: p,
        transport,
        mut room,
        ..
    } = setup();
    let state = room.subscribe();

    assert_eq!(room.start_round().unwrap(), (p[0], p[1]));
    assert_eq!(state.borrow().phase(), TournamentPhase::Round(1));
    assert!(!room.on_point(p[1]).unwrap());
    assert!(!room.on_point(p[1]).unwrap());
    assert!(room.on_point(p[1]).unwrap());
    assert_eq!(state.borrow().log.len(), 1);

    assert!(room.on_match_end(EndReason::Normal));
    assert_eq!(state.borrow().phase(), TournamentPhase::RoundEnded(1));
    assert!(!transport.is_closed());

    room.start_round().unwrap();
    assert!(room.on_match_end(EndReason::OpponentLeft));
    let emitted = transport.events().len();
    assert!(!room.on_match_end(EndReason::OpponentLeft));
    assert!(!room.on_match_end(EndReason::Normal));
    assert_eq!(transport.events().len(), emitted);
    assert!(room.take_submission().is_none());
    assert!(room.tournament().expired);
    assert!(room.start_round().is_err());
}
