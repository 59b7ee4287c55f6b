use crate::common::{TestDatabase, TestUsers};
use user_token::{
    AuthConfig, Bypass, ConnectionPool, CoordinationError, CredentialStore, LoginRequest,
    LoginResponse, NewUser, SqliteUserStore, UserError, hash_password,
};

/// Seed → authenticate flows against a real database file
///
/// These tests cover:
/// - Every seeded user authenticating with their own id
/// - Rejection of unknown users and wrong passwords
/// - Reseeding and recovery from a failed load
/// - Read-only instances sharing a file with a writer
/// - The configured bypass user
#[tokio::test]
async fn test_seed_then_authenticate_every_user() -> Result<(), Box<dyn std::error::Error>> {
    let db = TestDatabase::new()?;
    let service = db.service(4).await?;

    let report = service.seed(500).await?;
    assert_eq!(report.inserted, 500);
    assert_eq!(service.count_users().await?, 500);
    println!("🌱 {report}");

    for i in 1..=500 {
        let response = service.authenticate(&TestUsers::login(i)).await;
        assert_eq!(
            response,
            LoginResponse::authenticated(TestUsers::fresh_id(i)),
            "user {i} should authenticate"
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_rejections() -> Result<(), Box<dyn std::error::Error>> {
    let db = TestDatabase::new()?;
    let service = db.service(2).await?;
    service.seed(10).await?;

    let unknown = service
        .authenticate(&LoginRequest::new(
            "user11@example.com",
            TestUsers::password_hash(11),
        ))
        .await;
    let wrong_password = service
        .authenticate(&TestUsers::login_with_wrong_password(3))
        .await;
    let blank = service
        .authenticate(&LoginRequest::new("user1@example.com", "  "))
        .await;

    assert!(!unknown.success);
    assert_eq!(unknown.user_id, None);
    assert_eq!(
        unknown.error_message.as_deref(),
        Some("Invalid username or password")
    );
    assert_eq!(wrong_password, unknown);
    assert_eq!(
        blank.error_message.as_deref(),
        Some("Username and hashed password are required")
    );

    Ok(())
}

#[tokio::test]
async fn test_reseed_replaces_previous_users() -> Result<(), Box<dyn std::error::Error>> {
    let db = TestDatabase::new()?;
    let service = db.service(2).await?;

    service.seed(300).await?;
    service.seed(120).await?;

    assert_eq!(service.count_users().await?, 120);
    assert!(service.authenticate(&TestUsers::login(120)).await.success);
    assert!(!service.authenticate(&TestUsers::login(121)).await.success);

    Ok(())
}

#[tokio::test]
async fn test_failed_load_then_retry() -> Result<(), Box<dyn std::error::Error>> {
    // Given a store that commits in batches of two
    let db = TestDatabase::new()?;
    let pool = ConnectionPool::connect(db.config(2).pool).await?;
    let store = SqliteUserStore::new(pool).with_batch_size(2);
    store.ensure_schema().await?;

    // When a load fails with a duplicate in its second batch
    let users: Vec<NewUser> = ["a", "b", "c", "a"]
        .iter()
        .map(|name| NewUser::new(format!("{name}@example.com"), hash_password(name)))
        .collect();
    let result = store.bulk_insert(&users).await;

    // Then the first batch stays committed and the error is an integrity failure
    assert!(matches!(result, Err(UserError::Integrity(_))));
    assert_eq!(store.count_users().await?, 2);

    // And a corrected retry leaves exactly the new rows
    let retry: Vec<NewUser> = ["a", "b", "c", "d"]
        .iter()
        .map(|name| NewUser::new(format!("{name}@example.com"), hash_password(name)))
        .collect();
    assert_eq!(store.bulk_insert(&retry).await?, 4);
    assert_eq!(store.count_users().await?, 4);
    assert!(
        store
            .find_by_credentials("d@example.com", &hash_password("d"))
            .await?
            .is_some()
    );

    Ok(())
}

#[tokio::test]
async fn test_read_only_instance_shares_the_file() -> Result<(), Box<dyn std::error::Error>> {
    let db = TestDatabase::new()?;
    let writer = db.service(2).await?;
    writer.seed(50).await?;

    let mut config = db.config(2);
    config.pool = config.pool.read_only(true);
    config.auth.read_only = true;
    let reader = user_token::init(config).await?;

    assert!(reader.is_read_only());
    assert!(reader.authenticate(&TestUsers::login(42)).await.success);
    assert!(matches!(
        reader.seed(10).await,
        Err(CoordinationError::ReadOnly)
    ));
    assert_eq!(writer.count_users().await?, 50);

    Ok(())
}

#[tokio::test]
async fn test_bypass_user_on_empty_database() -> Result<(), Box<dyn std::error::Error>> {
    let db = TestDatabase::new()?;
    let service = db
        .service_with(
            1,
            AuthConfig {
                bypass: Some(Bypass {
                    username: "no_db".to_string(),
                    user_id: 1,
                }),
                ..AuthConfig::default()
            },
        )
        .await?;

    let response = service
        .authenticate(&LoginRequest::new("no_db", "not-a-digest"))
        .await;

    assert_eq!(response, LoginResponse::authenticated(1));
    assert_eq!(service.count_users().await?, 0);

    Ok(())
}
