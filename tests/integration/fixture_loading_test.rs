// Fixture loading tests
//
// Files load in declaration order, one commit per file, with rows written
// in foreign-key order regardless of how the file lists them.

#[path = "../helpers/mod.rs"]
mod helpers;

use fixture_harness::{load_fixtures, FixtureLoader, HarnessError, TeardownPolicy, TestHarness};
use helpers::*;

async fn prepared(db: &TempDatabase) -> anyhow::Result<TestHarness> {
    let mut harness = test_harness(db, TeardownPolicy::Keep)?;
    harness.reset_schema().await?;
    Ok(harness)
}

#[tokio::test]
async fn test_load_users_and_posts() -> anyhow::Result<()> {
    let db = TempDatabase::new("load");
    let mut harness = prepared(&db).await?;
    let mut session = harness.session().await?;

    let report = load_fixtures(
        &mut session,
        harness.registry(),
        &harness.config().app_root,
        &["fixtures/users.yaml", "fixtures/posts.yaml"],
    )
    .await?;

    assert_eq!(report.files, 2);
    assert_eq!(report.records, 5);
    assert!(!session.in_transaction());
    assert_eq!(session.pending(), 0);

    let pool = harness.pool().await?;
    assert_eq!(
        user_rows(&pool).await?,
        vec![
            (1, "John".to_string(), "john@example.com".to_string()),
            (2, "Neil".to_string(), "neil@example.com".to_string()),
        ]
    );
    assert_eq!(count_rows(&pool, "posts").await?, 3);
    Ok(())
}

#[tokio::test]
async fn test_no_references_is_a_no_op() -> anyhow::Result<()> {
    let db = TempDatabase::new("noop");
    let mut harness = prepared(&db).await?;
    let mut session = harness.session().await?;

    let report = load_fixtures::<&str>(
        &mut session,
        harness.registry(),
        &harness.config().app_root,
        &[],
    )
    .await?;
    assert_eq!(report.files, 0);
    assert_eq!(report.records, 0);

    let report = load_fixtures(
        &mut session,
        harness.registry(),
        &harness.config().app_root,
        &["fixtures/empty.yaml"],
    )
    .await?;
    assert_eq!(report.files, 1);
    assert_eq!(report.records, 0);
    Ok(())
}

#[tokio::test]
async fn test_loading_is_deterministic() -> anyhow::Result<()> {
    let db = TempDatabase::new("deterministic");
    let mut harness = prepared(&db).await?;
    let references = ["fixtures/users.yaml", "fixtures/posts.yaml"];

    let mut snapshots = Vec::new();
    for _ in 0..2 {
        harness.reset_schema().await?;
        let mut session = harness.session().await?;
        load_fixtures(
            &mut session,
            harness.registry(),
            &harness.config().app_root,
            &references,
        )
        .await?;
        drop(session);

        let pool = harness.pool().await?;
        snapshots.push((user_rows(&pool).await?, post_rows(&pool).await?));
    }

    assert_eq!(snapshots[0], snapshots[1]);
    Ok(())
}

#[tokio::test]
async fn test_referenced_rows_are_written_first() -> anyhow::Result<()> {
    let db = TempDatabase::new("fk_order");
    let mut harness = prepared(&db).await?;
    let mut session = harness.session().await?;

    let report = load_fixtures(
        &mut session,
        harness.registry(),
        &harness.config().app_root,
        &["fixtures/posts_before_users.yaml"],
    )
    .await?;
    assert_eq!(report.records, 2);

    let pool = harness.pool().await?;
    assert_eq!(
        post_rows(&pool).await?,
        vec![(10, 10, "Written before its author".to_string())]
    );
    Ok(())
}

#[tokio::test]
async fn test_unknown_model_aborts_the_file() -> anyhow::Result<()> {
    let db = TempDatabase::new("unknown");
    let mut harness = prepared(&db).await?;
    let mut session = harness.session().await?;

    let err = load_fixtures(
        &mut session,
        harness.registry(),
        &harness.config().app_root,
        &["fixtures/unknown_model.yaml"],
    )
    .await
    .unwrap_err();

    match err {
        HarnessError::FixtureModelNotFound { model, path } => {
            assert_eq!(model, "blog.models.Comment");
            assert!(path.ends_with("fixtures/unknown_model.yaml"));
        }
        other => panic!("expected FixtureModelNotFound, got {other}"),
    }

    // The valid group in the same file was never staged
    assert_eq!(session.pending(), 0);
    session.rollback().await?;
    assert_eq!(count_rows(&harness.pool().await?, "users").await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_constraint_violation_names_the_file() -> anyhow::Result<()> {
    let db = TempDatabase::new("constraint");
    let mut harness = prepared(&db).await?;
    let mut session = harness.session().await?;

    let err = load_fixtures(
        &mut session,
        harness.registry(),
        &harness.config().app_root,
        &["fixtures/users.yaml", "fixtures/duplicate_users.yaml"],
    )
    .await
    .unwrap_err();

    match &err {
        HarnessError::FixtureConstraintViolation { path, .. } => {
            assert!(path.ends_with("fixtures/duplicate_users.yaml"));
        }
        other => panic!("expected FixtureConstraintViolation, got {other}"),
    }
    assert!(err.as_database_error().is_some());

    session.rollback().await?;

    // The first file was already committed
    let pool = harness.pool().await?;
    assert_eq!(count_rows(&pool, "users").await?, 2);
    Ok(())
}

#[tokio::test]
async fn test_missing_file_is_an_io_error() -> anyhow::Result<()> {
    let db = TempDatabase::new("missing");
    let mut harness = prepared(&db).await?;
    let mut session = harness.session().await?;
    let loader = FixtureLoader::new(harness.registry(), &harness.config().app_root);

    let err = loader
        .load(&mut session, &["fixtures/does_not_exist.yaml"])
        .await
        .unwrap_err();

    assert!(matches!(err, HarnessError::Io { .. }));
    assert!(err.to_string().contains("does_not_exist.yaml"));
    Ok(())
}

#[tokio::test]
async fn test_self_referencing_rows_load_in_any_order() -> anyhow::Result<()> {
    let db = TempDatabase::new("self_ref");
    let mut harness = prepared(&db).await?;
    let mut session = harness.session().await?;

    let report = load_fixtures(
        &mut session,
        harness.registry(),
        &harness.config().app_root,
        &["fixtures/nodes.yaml"],
    )
    .await?;
    assert_eq!(report.records, 3);

    let pool = harness.pool().await?;
    assert_eq!(
        node_rows(&pool).await?,
        vec![(1, None), (2, Some(1)), (3, Some(2))]
    );
    Ok(())
}

#[tokio::test]
async fn test_connection_failure_is_not_a_constraint_violation() -> anyhow::Result<()> {
    let db = TempDatabase::new("closed_pool");
    let mut harness = prepared(&db).await?;
    let mut session = harness.session().await?;
    harness.pool().await?.close().await;

    let err = load_fixtures(
        &mut session,
        harness.registry(),
        &harness.config().app_root,
        &["fixtures/users.yaml"],
    )
    .await
    .unwrap_err();

    assert!(
        matches!(err, HarnessError::Database(sqlx::Error::PoolClosed)),
        "unexpected error: {err}"
    );
    Ok(())
}
