use super::*;

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn coin_balance_is_absent_until_saved() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(storage.load_coins().await.expect("load"), None);

    storage.save_coins(1400).await.expect("save");
    storage.save_coins(1450).await.expect("overwrite");
    assert_eq!(storage.load_coins().await.expect("load"), Some(1450));
}

#[tokio::test]
async fn coin_balance_survives_reopening_the_database() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("airguard_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("wallet.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    storage.save_coins(1400).await.expect("save");
    storage.pool().close().await;
    drop(storage);

    assert!(db_path.exists(), "database file should exist: {}", db_path.display());
    let reopened = Storage::new(&database_url).await.expect("reopen");
    assert_eq!(reopened.load_coins().await.expect("load"), Some(1400));
    reopened.pool().close().await;

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn profile_round_trip() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(storage.load_profile().await.expect("load"), None);

    let profile = UserProfile {
        name: "Asha".into(),
        is_asthmatic: true,
    };
    storage.save_profile(&profile).await.expect("save");
    assert_eq!(storage.load_profile().await.expect("load"), Some(profile));
}

#[tokio::test]
async fn redemption_updates_balance_and_log_together() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.save_coins(1350).await.expect("seed");

    let first = storage
        .record_redemption("AS-AB12-0042", 1000, 350, Utc::now())
        .await
        .expect("redeem");
    assert_eq!(storage.load_coins().await.expect("load"), Some(350));

    let second = storage
        .record_redemption("AS-ZZ99-1234", 1000, 0, Utc::now())
        .await
        .expect("redeem again");
    assert!(second.0 > first.0);

    let history = storage.list_redemptions(10).await.expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].token, "AS-ZZ99-1234");
    assert_eq!(history[1].balance_after, 350);
}

#[tokio::test]
async fn duplicate_token_rolls_back_balance_change() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .record_redemption("AS-DUPE-0001", 1000, 500, Utc::now())
        .await
        .expect("first");

    storage
        .record_redemption("AS-DUPE-0001", 1000, 0, Utc::now())
        .await
        .expect_err("token is unique");
    assert_eq!(storage.load_coins().await.expect("load"), Some(500));
}

#[test]
fn database_target_accepts_paths_and_sqlite_urls() {
    let file = |path: &str| DatabaseTarget::File(PathBuf::from(path));

    assert_eq!(DatabaseTarget::parse("./data/test.db").expect("path"), file("./data/test.db"));
    assert_eq!(DatabaseTarget::parse("sqlite:wallet.db").expect("short url"), file("wallet.db"));
    assert_eq!(
        DatabaseTarget::parse("sqlite://data/wallet.db?mode=rwc").expect("url"),
        file("data/wallet.db")
    );
    assert_eq!(
        DatabaseTarget::parse(r"C:\airguard\wallet.db").expect("windows path"),
        file("C:/airguard/wallet.db")
    );
    assert_eq!(DatabaseTarget::parse("sqlite::memory:").expect("memory"), DatabaseTarget::Memory);
    assert_eq!(DatabaseTarget::parse(":memory:").expect("memory"), DatabaseTarget::Memory);
}

#[test]
fn blank_database_url_selects_the_default_file() {
    let target = DatabaseTarget::parse("  ").expect("default");
    assert_eq!(target, DatabaseTarget::File(PathBuf::from("./data/airguard.db")));
    assert_eq!(target.url(), DEFAULT_DATABASE_URL);
}

#[test]
fn other_database_schemes_are_rejected() {
    let err = DatabaseTarget::parse("postgres://localhost/airguard").expect_err("scheme");
    assert!(err.to_string().contains("postgres"), "{err}");
    DatabaseTarget::parse("sqlite://").expect_err("no file");
}
