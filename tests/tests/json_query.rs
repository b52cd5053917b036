//! JSON queries over indexed attributes.

use std::time::Duration;

use bcdb_tests::prelude::*;
use pretty_assertions::assert_eq;

const PEOPLE: [(&str, &str); 10] = [
    ("id0", r#"{"name": "alice", "age": 20, "gender": true, "education": "high-school"}"#),
    ("id1", r#"{"name": "bob", "age": 30, "gender": false, "education": "bachelor"}"#),
    ("id2", r#"{"name": "charlie", "age": 40, "gender": false, "education": "master"}"#),
    ("id3", r#"{"name": "dan", "age": 20, "gender": false, "education": "doctorate"}"#),
    ("id4", r#"{"name": "eve", "age": 30, "gender": true, "education": "bachelor"}"#),
    ("id5", r#"{"name": "alice", "age": 30, "gender": true, "education": "bachelor"}"#),
    ("id6", r#"{"name": "bob", "age": 40, "gender": false, "education": "master"}"#),
    ("id7", r#"{"name": "charlie", "age": 20, "gender": true, "education": "high-school"}"#),
    ("id8", r#"{"name": "dan", "age": 30, "gender": false, "education": "master"}"#),
    ("id9", r#"{"name": "eve", "age": 40, "gender": true, "education": "doctorate"}"#),
];

fn people_index() -> DbIndex {
    DbIndex::from([
        ("name".to_string(), IndexAttributeType::String),
        ("age".to_string(), IndexAttributeType::Number),
        ("gender".to_string(), IndexAttributeType::Boolean),
    ])
}

/// Indexed database "db" holding `PEOPLE`, and a session for "alice".
fn env_with_people() -> (TestEnv, Session) {
    let env = TestEnv::new().unwrap();
    env.create_indexed_db("db", Some(people_index())).unwrap();
    env.add_user("alice", &[("db", DbAccess::ReadWrite)]).unwrap();
    let alice = env.open_user_session("alice").unwrap();

    let mut tx = alice.data_tx().unwrap();
    for (key, value) in PEOPLE {
        tx.put("db", key, value.as_bytes().to_vec(), None).unwrap();
    }
    let (_, receipt) = tx.commit(true).unwrap();
    assert!(receipt.unwrap().is_valid());
    (env, alice)
}

fn keys(kvs: &[bcdb_core::KvWithMetadata]) -> Vec<&str> {
    kvs.iter().map(|kv| kv.key.as_str()).collect()
}

#[test]
fn test_query_by_number_attribute() {
    // GIVEN
    let (_env, alice) = env_with_people();
    let query = alice.json_query().unwrap();

    // WHEN
    let kvs = query
        .execute(
            "db",
            r#"
            {
                "selector": {
                    "age": {
                        "$eq": 30
                    }
                }
            }
            "#,
        )
        .unwrap();

    // THEN
    assert_eq!(keys(&kvs), vec!["id1", "id4", "id5", "id8"]);
    assert!(kvs.iter().all(|kv| kv.metadata.version.block_num > 1));
}

#[test]
fn test_query_combines_conditions() {
    let (_env, alice) = env_with_people();

    let kvs = alice
        .json_query()
        .unwrap()
        .execute("db", r#"{"selector": {"name": {"$eq": "alice"}, "gender": {"$eq": true}}}"#)
        .unwrap();

    assert_eq!(keys(&kvs), vec!["id0", "id5"]);
}

#[test]
fn test_query_without_match_is_empty() {
    let (_env, alice) = env_with_people();

    let kvs = alice
        .json_query()
        .unwrap()
        .execute("db", r#"{"selector": {"age": {"$eq": 99}}}"#)
        .unwrap();

    assert!(kvs.is_empty());
}

#[test]
fn test_query_on_unindexed_attribute_is_rejected() {
    let (_env, alice) = env_with_people();

    let err = alice
        .json_query()
        .unwrap()
        .execute("db", r#"{"selector": {"education": {"$eq": "master"}}}"#)
        .unwrap_err();

    assert!(matches!(err, SessionError::Transaction(TransactionError::Remote(_))));
    assert!(err.to_string().contains("is not indexed"));
}

#[test]
fn test_query_sees_committed_state_only() {
    // GIVEN
    let (_env, alice) = env_with_people();
    let mut pending = alice.data_tx().unwrap();
    pending
        .put("db", "id10", br#"{"name": "frank", "age": 30, "gender": false}"#.to_vec(), None)
        .unwrap();

    // WHEN
    let before = alice
        .json_query()
        .unwrap()
        .execute("db", r#"{"selector": {"name": {"$eq": "frank"}}}"#)
        .unwrap();
    pending.commit(true).unwrap();
    let after = alice
        .json_query()
        .unwrap()
        .execute("db", r#"{"selector": {"name": {"$eq": "frank"}}}"#)
        .unwrap();

    // THEN
    assert!(before.is_empty());
    assert_eq!(keys(&after), vec!["id10"]);
}

#[test]
fn test_query_skips_keys_the_user_cannot_read() {
    // GIVEN
    let (env, alice) = env_with_people();
    env.add_user("bob", &[("db", DbAccess::ReadWrite)]).unwrap();
    let bob = env.open_user_session("bob").unwrap();
    let mut tx = bob.data_tx().unwrap();
    tx.put(
        "db",
        "secret",
        br#"{"name": "bob", "age": 30, "gender": false}"#.to_vec(),
        Some(AccessControl::owner("bob")),
    )
    .unwrap();
    tx.commit(true).unwrap();

    // WHEN
    let query = r#"{"selector": {"name": {"$eq": "bob"}, "age": {"$eq": 30}}}"#;
    let seen_by_alice = alice.json_query().unwrap().execute("db", query).unwrap();
    let seen_by_bob = bob.json_query().unwrap().execute("db", query).unwrap();

    // THEN
    assert_eq!(keys(&seen_by_alice), vec!["id1"]);
    assert_eq!(keys(&seen_by_bob), vec!["id1", "secret"]);
}

#[test]
fn test_query_without_db_permission_is_denied() {
    let (env, _alice) = env_with_people();
    env.add_user("carol", &[(DEFAULT_DB, DbAccess::ReadWrite)]).unwrap();
    let carol = env.open_user_session("carol").unwrap();

    let err = carol
        .json_query()
        .unwrap()
        .execute("db", r#"{"selector": {"age": {"$eq": 30}}}"#)
        .unwrap_err();

    let SessionError::Transaction(err) = err else {
        panic!("expected a transaction error, got {err}");
    };
    assert!(err.is_permission_denied());
}

#[test]
fn test_query_is_bounded_by_query_timeout() {
    // GIVEN
    let env = TestEnv::with_server(|server| server.with_read_latency(Duration::from_millis(50))).unwrap();
    env.create_indexed_db("db", Some(people_index())).unwrap();
    env.add_user("alice", &[("db", DbAccess::Read)]).unwrap();
    let alice = env
        .open_user_session_with_query_timeout("alice", Duration::from_millis(1))
        .unwrap();

    // WHEN
    let err = alice
        .json_query()
        .unwrap()
        .execute("db", r#"{"selector": {"age": {"$eq": 30}}}"#)
        .unwrap_err();

    // THEN
    let SessionError::Transaction(err) = err else {
        panic!("expected a transaction error, got {err}");
    };
    assert!(err.is_timeout());
}

#[test]
fn test_dropping_db_drops_its_index() {
    // GIVEN
    let (env, _alice) = env_with_people();
    let mut tx = env.admin.dbs_tx().unwrap();
    tx.delete_db("db").unwrap();
    assert!(tx.commit(true).unwrap().1.unwrap().is_valid());

    // WHEN
    env.create_db("db").unwrap();
    let err = env
        .admin
        .json_query()
        .unwrap()
        .execute("db", r#"{"selector": {"age": {"$eq": 30}}}"#)
        .unwrap_err();

    // THEN
    assert!(err.to_string().contains("is not indexed"));
}
