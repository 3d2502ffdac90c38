//! Tests for the SQLite match store.

use chrono::{Duration, Utc};
use skillfive::{
    Cell, Coord, Match, MatchId, MatchMode, MatchResult, MatchStatus, MatchStore, MatchType,
    Player, PlayerSlot, SkillId, SkillSlot, SqliteStore, Winner,
};
use tempfile::NamedTempFile;

fn test_store() -> (SqliteStore, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let store = SqliteStore::open(temp_file.path().to_str().unwrap()).unwrap();
    (store, temp_file)
}

fn online_match(id: &str, black: &str, white: &str) -> Match {
    Match::new(
        MatchId::new(id),
        MatchMode::Skill,
        MatchType::OnlinePvP,
        PlayerSlot::new(black, Player::Black, vec![SkillSlot::new(SkillId::Seal)]),
        Some(PlayerSlot::new(white, Player::White, vec![])),
        None,
        Utc::now(),
    )
}

#[tokio::test]
async fn test_snapshot_round_trip() {
    let (store, _temp) = test_store();
    let now = Utc::now();
    let mut game = online_match("m-1", "alice", "bob");
    game.submit_move(Player::Black, 7, 7, now).unwrap();
    game.submit_move(Player::White, 7, 8, now).unwrap();

    store.save(&game).await.unwrap();
    let loaded = store.load(&game.id).await.unwrap().unwrap();
    assert_eq!(loaded, game);
    assert_eq!(loaded.board.get(Coord::new(7, 8)), Cell::Stone(Player::White));

    game.submit_move(Player::Black, 0, 0, now).unwrap();
    store.save(&game).await.unwrap();
    let loaded = store.load(&game.id).await.unwrap().unwrap();
    assert_eq!(loaded.move_log.len(), 3);
}

#[tokio::test]
async fn test_unknown_match_loads_none() {
    let (store, _temp) = test_store();
    assert_eq!(store.load(&MatchId::new("nope")).await.unwrap(), None);
    assert_eq!(store.record(&MatchId::new("nope")).await.unwrap(), None);
}

#[tokio::test]
async fn test_unfinished_match_is_not_archived() {
    let (store, _temp) = test_store();
    let game = online_match("m-open", "alice", "bob");
    assert!(store.append_record(&game).await.is_err());
    assert_eq!(store.record(&game.id).await.unwrap(), None);
}

#[tokio::test]
async fn test_records_for_user_newest_first() {
    let (store, _temp) = test_store();
    let start = Utc::now();

    let mut first = online_match("m-a", "alice", "bob");
    first.surrender(Player::White, start).unwrap();
    let mut second = online_match("m-b", "carol", "alice");
    second.surrender(Player::Black, start + Duration::seconds(5)).unwrap();
    let mut unrelated = online_match("m-c", "bob", "carol");
    unrelated.surrender(Player::Black, start).unwrap();

    let record = store.append_record(&first).await.unwrap();
    assert_eq!(*record.result(), MatchResult::Surrender);
    assert_eq!(*record.winner(), Winner::Player(Player::Black));
    store.append_record(&second).await.unwrap();
    store.append_record(&unrelated).await.unwrap();

    let history = store.records_for_user("alice", 10).await.unwrap();
    let ids: Vec<_> = history.iter().map(|r| r.match_id().as_str()).collect();
    assert_eq!(ids, vec!["m-b", "m-a"]);

    let limited = store.records_for_user("alice", 1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].match_id().as_str(), "m-b");

    let stored = store.record(&first.id).await.unwrap().unwrap();
    assert_eq!(stored, record);
    assert_eq!(stored.player2(), "bob");
}

#[tokio::test]
async fn test_reopen_keeps_data() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_str().unwrap().to_string();
    let mut game = online_match("m-persist", "alice", "bob");
    game.surrender(Player::Black, Utc::now()).unwrap();

    {
        let store = SqliteStore::open(&path).unwrap();
        store.save(&game).await.unwrap();
        store.append_record(&game).await.unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let loaded = store.load(&game.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, MatchStatus::Finished);
    assert!(store.record(&game.id).await.unwrap().is_some());
}
