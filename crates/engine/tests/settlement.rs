use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Amount, Engine, EngineError, Item, MakeContractCmd, Relation, SettlementStrategy, Splitter,
    SubmitSettlementCmd,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_on(
    url: &str,
    users: &[&str],
    strategy: SettlementStrategy,
) -> (Engine, DatabaseConnection) {
    let db = Database::connect(url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for username in users {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![(*username).into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .strategy(strategy)
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_users(
    users: &[&str],
    strategy: SettlementStrategy,
) -> (Engine, DatabaseConnection) {
    engine_on("sqlite::memory:", users, strategy).await
}

/// File-backed database, so several pooled connections can race.
async fn engine_with_file_db(users: &[&str]) -> (Engine, DatabaseConnection, PathBuf) {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("settle_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());
    let (engine, db) = engine_on(&url, users, SettlementStrategy::Pairwise).await;
    (engine, db, path)
}

fn remove_db_files(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}

/// A hangout owned by the first user, joined by all the others.
async fn hangout(engine: &Engine, users: &[&str]) -> String {
    let code = engine
        .create_hangout("dinner", None, users[0])
        .await
        .unwrap();
    for user in &users[1..] {
        engine.join_hangout(&code, user).await.unwrap();
    }
    code
}

fn splitter(id: &str, prices: &[i64]) -> Splitter {
    let items = prices
        .iter()
        .map(|price| Item::new("dish", Amount::new(*price)).unwrap())
        .collect();
    Splitter::new(id, items).unwrap()
}

async fn make(engine: &Engine, code: &str, payer: &str, splitters: Vec<Splitter>) -> Uuid {
    let total = splitters
        .iter()
        .map(|s| s.total().unwrap())
        .fold(Amount::ZERO, |acc, x| acc + x);
    engine
        .make_contract(
            MakeContractCmd::new(code, payer, payer, splitters, total).name("bill"),
        )
        .await
        .unwrap()
}

fn rel(creditor: &str, debtor: &str, amount: i64) -> Relation {
    Relation::new(creditor, debtor, Amount::new(amount))
}

async fn count(db: &DatabaseConnection, table: &str) -> i64 {
    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

#[tokio::test]
async fn single_debt_is_settled() {
    let (engine, _db) = engine_with_users(&["U1", "U2"], SettlementStrategy::Pairwise).await;
    let code = hangout(&engine, &["U1", "U2"]).await;
    let id = make(&engine, &code, "U1", vec![splitter("U2", &[100])]).await;

    let relations = engine
        .calculate_settlement(&code, &[id], "U2")
        .await
        .unwrap();
    assert_eq!(relations, vec![rel("U1", "U2", 100)]);

    let record = engine
        .submit_settlement(SubmitSettlementCmd::new(&code, "U2", vec![id], relations))
        .await
        .unwrap();
    assert_eq!(record.contract_ids, vec![id]);
    assert_eq!(record.strategy, SettlementStrategy::Pairwise);

    let contract = engine.contract(&code, &id.to_string(), "U1").await.unwrap();
    assert!(contract.is_submitted());
    assert_eq!(contract.settlement_id, Some(record.id));
}

#[tokio::test]
async fn opposite_contracts_are_netted() {
    let (engine, _db) = engine_with_users(&["U1", "U2"], SettlementStrategy::Pairwise).await;
    let code = hangout(&engine, &["U1", "U2"]).await;
    let first = make(&engine, &code, "U1", vec![splitter("U2", &[100])]).await;
    let second = make(&engine, &code, "U2", vec![splitter("U1", &[40])]).await;

    let relations = engine
        .calculate_settlement(&code, &[first, second], "U1")
        .await
        .unwrap();
    assert_eq!(relations, vec![rel("U1", "U2", 60)]);
}

#[tokio::test]
async fn payer_as_splitter_yields_nothing() {
    let (engine, db) = engine_with_users(&["U1"], SettlementStrategy::Pairwise).await;
    let code = hangout(&engine, &["U1"]).await;
    let id = make(&engine, &code, "U1", vec![splitter("U1", &[50])]).await;

    let relations = engine
        .calculate_settlement(&code, &[id], "U1")
        .await
        .unwrap();
    assert!(relations.is_empty());

    // An empty settlement still consumes the contract.
    engine
        .submit_settlement(SubmitSettlementCmd::new(&code, "U1", vec![id], Vec::new()))
        .await
        .unwrap();
    assert_eq!(count(&db, "settlement_relations").await, 0);
    let contract = engine.contract(&code, &id.to_string(), "U1").await.unwrap();
    assert!(contract.is_submitted());
}

#[tokio::test]
async fn cycle_depends_on_strategy() {
    for (strategy, expected) in [
        (
            SettlementStrategy::Pairwise,
            vec![rel("U1", "U3", 30), rel("U2", "U1", 30), rel("U3", "U2", 30)],
        ),
        (SettlementStrategy::Minimized, Vec::new()),
    ] {
        let (engine, _db) = engine_with_users(&["U1", "U2", "U3"], strategy).await;
        let code = hangout(&engine, &["U1", "U2", "U3"]).await;
        let ids = vec![
            make(&engine, &code, "U2", vec![splitter("U1", &[30])]).await,
            make(&engine, &code, "U3", vec![splitter("U2", &[30])]).await,
            make(&engine, &code, "U1", vec![splitter("U3", &[30])]).await,
        ];

        let relations = engine
            .calculate_settlement(&code, &ids, "U1")
            .await
            .unwrap();
        assert_eq!(relations, expected, "strategy {}", strategy.as_str());
    }
}

#[tokio::test]
async fn double_submission_is_rejected() {
    let (engine, db) = engine_with_users(&["U1", "U2"], SettlementStrategy::Pairwise).await;
    let code = hangout(&engine, &["U1", "U2"]).await;
    let id = make(&engine, &code, "U1", vec![splitter("U2", &[100])]).await;
    let relations = vec![rel("U1", "U2", 100)];

    engine
        .submit_settlement(SubmitSettlementCmd::new(
            &code,
            "U1",
            vec![id],
            relations.clone(),
        ))
        .await
        .unwrap();
    let err = engine
        .submit_settlement(SubmitSettlementCmd::new(&code, "U1", vec![id], relations))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AlreadySubmitted(_)));

    assert_eq!(count(&db, "settlements").await, 1);
    assert_eq!(count(&db, "settlement_relations").await, 1);
    assert_eq!(
        engine.settlement_history(&code, "U2").await.unwrap().len(),
        1
    );

    let err = engine
        .calculate_settlement(&code, &[id], "U1")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AlreadySubmitted(_)));
}

#[tokio::test]
async fn mixed_set_is_rejected_atomically() {
    let (engine, db) = engine_with_users(&["U1", "U2"], SettlementStrategy::Pairwise).await;
    let code = hangout(&engine, &["U1", "U2"]).await;
    let settled = make(&engine, &code, "U1", vec![splitter("U2", &[100])]).await;
    let pending = make(&engine, &code, "U2", vec![splitter("U1", &[40])]).await;

    engine
        .submit_settlement(SubmitSettlementCmd::new(
            &code,
            "U1",
            vec![settled],
            vec![rel("U1", "U2", 100)],
        ))
        .await
        .unwrap();

    let err = engine
        .submit_settlement(SubmitSettlementCmd::new(
            &code,
            "U1",
            vec![settled, pending],
            vec![rel("U1", "U2", 60)],
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AlreadySubmitted(_)));

    let contract = engine
        .contract(&code, &pending.to_string(), "U1")
        .await
        .unwrap();
    assert!(!contract.is_submitted());
    assert_eq!(count(&db, "settlements").await, 1);
}

#[tokio::test]
async fn unknown_or_foreign_contracts_are_rejected() {
    let (engine, _db) = engine_with_users(&["U1", "U2"], SettlementStrategy::Pairwise).await;
    let code = hangout(&engine, &["U1", "U2"]).await;
    let other = hangout(&engine, &["U1", "U2"]).await;
    let foreign = make(&engine, &other, "U1", vec![splitter("U2", &[10])]).await;
    let local = make(&engine, &code, "U1", vec![splitter("U2", &[10])]).await;

    let err = engine
        .calculate_settlement(&code, &[local, foreign], "U1")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidContractSet(_)));

    let err = engine
        .calculate_settlement(&code, &[Uuid::new_v4()], "U1")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidContractSet(_)));

    let err = engine
        .calculate_settlement(&code, &[local, local], "U1")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidContractSet(_)));

    let err = engine
        .calculate_settlement(&code, &[], "U1")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn tampered_relations_are_rejected() {
    let (engine, db) = engine_with_users(&["U1", "U2"], SettlementStrategy::Pairwise).await;
    let code = hangout(&engine, &["U1", "U2"]).await;
    let id = make(&engine, &code, "U1", vec![splitter("U2", &[100])]).await;

    for relations in [
        vec![rel("U1", "U2", 10)],
        vec![rel("U2", "U1", 100)],
        Vec::new(),
    ] {
        let err = engine
            .submit_settlement(SubmitSettlementCmd::new(&code, "U2", vec![id], relations))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    assert_eq!(count(&db, "settlements").await, 0);
    let contract = engine.contract(&code, &id.to_string(), "U1").await.unwrap();
    assert!(!contract.is_submitted());
}

#[tokio::test]
async fn relation_order_does_not_matter_on_submit() {
    let (engine, _db) =
        engine_with_users(&["U1", "U2", "U3"], SettlementStrategy::Pairwise).await;
    let code = hangout(&engine, &["U1", "U2", "U3"]).await;
    let id = make(
        &engine,
        &code,
        "U1",
        vec![splitter("U2", &[10]), splitter("U3", &[20])],
    )
    .await;

    let mut relations = engine
        .calculate_settlement(&code, &[id], "U1")
        .await
        .unwrap();
    relations.reverse();
    engine
        .submit_settlement(SubmitSettlementCmd::new(&code, "U3", vec![id], relations))
        .await
        .unwrap();
}

#[tokio::test]
async fn outsiders_are_forbidden() {
    let (engine, _db) =
        engine_with_users(&["U1", "U2", "mallory"], SettlementStrategy::Pairwise).await;
    let code = hangout(&engine, &["U1", "U2"]).await;
    let id = make(&engine, &code, "U1", vec![splitter("U2", &[100])]).await;

    let err = engine
        .calculate_settlement(&code, &[id], "mallory")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .hangout_contracts(&code, "mallory")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .make_contract(
            MakeContractCmd::new(
                &code,
                "U1",
                "U1",
                vec![splitter("mallory", &[5])],
                Amount::new(5),
            )
            .name("sneaky"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn total_mismatch_is_not_stored() {
    let (engine, db) = engine_with_users(&["U1", "U2"], SettlementStrategy::Pairwise).await;
    let code = hangout(&engine, &["U1", "U2"]).await;

    let err = engine
        .make_contract(MakeContractCmd::new(
            &code,
            "U1",
            "U1",
            vec![splitter("U2", &[30, 20])],
            Amount::new(60),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(count(&db, "contracts").await, 0);
}

#[tokio::test]
async fn calculation_is_idempotent_and_read_only() {
    let (engine, db) = engine_with_users(&["U1", "U2", "U3"], SettlementStrategy::Pairwise).await;
    let code = hangout(&engine, &["U1", "U2", "U3"]).await;
    let ids = vec![
        make(
            &engine,
            &code,
            "U3",
            vec![splitter("U1", &[10]), splitter("U2", &[20])],
        )
        .await,
        make(&engine, &code, "U1", vec![splitter("U2", &[5])]).await,
    ];

    let first = engine
        .calculate_settlement(&code, &ids, "U1")
        .await
        .unwrap();
    let second = engine
        .calculate_settlement(&code, &ids, "U2")
        .await
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(count(&db, "settlements").await, 0);

    let contracts = engine.hangout_contracts(&code, "U3").await.unwrap();
    assert_eq!(contracts.len(), 2);
    assert!(contracts.iter().all(|c| !c.is_submitted()));
}

#[tokio::test]
async fn zero_item_splitter_round_trips() {
    let (engine, _db) = engine_with_users(&["U1", "U2", "U3"], SettlementStrategy::Pairwise).await;
    let code = hangout(&engine, &["U1", "U2", "U3"]).await;
    let id = make(
        &engine,
        &code,
        "U1",
        vec![splitter("U2", &[15, 5]), splitter("U3", &[])],
    )
    .await;

    let contract = engine.contract(&code, &id.to_string(), "U2").await.unwrap();
    assert_eq!(contract.splitters.len(), 2);
    assert_eq!(contract.splitters[0].items.len(), 2);
    assert!(contract.splitters[1].items.is_empty());
    assert_eq!(contract.total_cost, Amount::new(20));
    assert_eq!(contract.name, "bill");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_settle_once() {
    let (engine, db, path) = engine_with_file_db(&["U1", "U2"]).await;
    let engine = Arc::new(engine);
    let code = hangout(&engine, &["U1", "U2"]).await;

    for round in 0..10 {
        let id = make(&engine, &code, "U1", vec![splitter("U2", &[100])]).await;

        let handles: Vec<_> = ["U1", "U2"]
            .into_iter()
            .map(|user| {
                let engine = Arc::clone(&engine);
                let cmd = SubmitSettlementCmd::new(
                    code.as_str(),
                    user,
                    vec![id],
                    vec![rel("U1", "U2", 100)],
                );
                tokio::spawn(async move { engine.submit_settlement(cmd).await })
            })
            .collect();

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap());
        }
        assert_eq!(
            outcomes.iter().filter(|r| r.is_ok()).count(),
            1,
            "round {round}"
        );
        assert!(
            outcomes
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|err| matches!(err, EngineError::AlreadySubmitted(_))),
            "round {round}: {outcomes:?}"
        );
        assert_eq!(count(&db, "settlements").await, round + 1);
        assert_eq!(count(&db, "settlement_relations").await, round + 1);
    }

    drop(engine);
    db.close().await.unwrap();
    remove_db_files(&path);
}

#[tokio::test]
async fn history_is_newest_first() {
    let (engine, _db) = engine_with_users(&["U1", "U2"], SettlementStrategy::Minimized).await;
    let code = hangout(&engine, &["U1", "U2"]).await;
    let first = make(&engine, &code, "U1", vec![splitter("U2", &[100])]).await;
    let second = make(&engine, &code, "U2", vec![splitter("U1", &[30])]).await;

    let older = engine
        .submit_settlement(SubmitSettlementCmd::new(
            &code,
            "U1",
            vec![first],
            vec![rel("U1", "U2", 100)],
        ))
        .await
        .unwrap();
    let newer = engine
        .submit_settlement(SubmitSettlementCmd::new(
            &code,
            "U1",
            vec![second],
            vec![rel("U2", "U1", 30)],
        ))
        .await
        .unwrap();

    let history = engine.settlement_history(&code, "U2").await.unwrap();
    let ids: Vec<Uuid> = history.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
    assert_eq!(history[0].contract_ids, vec![second]);
    assert_eq!(history[0].relations, vec![rel("U2", "U1", 30)]);
    assert_eq!(history[1].strategy, SettlementStrategy::Minimized);
}

#[tokio::test]
async fn participants_and_join() {
    let (engine, _db) = engine_with_users(&["U1", "U2"], SettlementStrategy::Pairwise).await;
    let code = engine
        .create_hangout("  trip  ", Some("weekend"), "U1")
        .await
        .unwrap();
    assert_eq!(code.len(), 8);

    engine.join_hangout(&code, "U2").await.unwrap();
    engine.join_hangout(&code, "U2").await.unwrap();

    let participants = engine.hangout_participants(&code, "U2").await.unwrap();
    let ids: Vec<&str> = participants.iter().map(|p| p.user_id.as_str()).collect();
    assert_eq!(ids, vec!["U1", "U2"]);

    let hangout = engine.hangout(&code, "U1").await.unwrap();
    assert_eq!(hangout.name, "trip");
    assert_eq!(hangout.owner, "U1");

    let err = engine.join_hangout("MISSING1", "U2").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}
