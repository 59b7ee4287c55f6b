use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::common::{TestDatabase, TestUsers};
use user_token::{ConnectionPool, Query, SaturationPolicy, StorageError};

/// Pool behaviour under concurrent load
///
/// These tests cover:
/// - Many concurrent authentications each seeing their own user id
/// - Exclusive handle ownership while checked out
/// - Permits returning to capacity once load subsides
/// - Both saturation policies
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_authentications_return_own_ids() -> Result<(), Box<dyn std::error::Error>>
{
    let db = TestDatabase::new()?;
    let service = db.service(8).await?;
    service.seed(100).await?;

    // 1000 requests, 10 for each of 100 users
    let mut tasks = Vec::with_capacity(1000);
    for n in 0..1000 {
        let service = service.clone();
        let i = n % 100 + 1;
        tasks.push(tokio::spawn(async move {
            let response = service.authenticate(&TestUsers::login(i)).await;
            (i, response)
        }));
    }

    for task in tasks {
        let (i, response) = task.await?;
        assert!(response.success, "user {i} failed: {response:?}");
        assert_eq!(response.user_id, Some(TestUsers::fresh_id(i)));
    }
    println!("✅ 1000 concurrent authentications returned their own ids");

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_handles_are_exclusive_under_load() -> Result<(), Box<dyn std::error::Error>> {
    let db = TestDatabase::new()?;
    let pool = ConnectionPool::connect(db.config(4).pool).await?;
    let in_use: Arc<Mutex<HashSet<u64>>> = Arc::new(Mutex::new(HashSet::new()));

    let mut tasks = Vec::new();
    for _ in 0..200 {
        let pool = pool.clone();
        let in_use = Arc::clone(&in_use);
        tasks.push(tokio::spawn(async move {
            let mut handle = pool.acquire().await?;
            let id = handle.id();
            assert!(
                in_use.lock().unwrap().insert(id),
                "connection {id} handed out twice"
            );

            let ping = handle.prepared(Query::Ping).await?;
            assert!(ping.is_cached());
            tokio::task::yield_now().await;

            in_use.lock().unwrap().remove(&id);
            drop(handle);
            Ok::<_, StorageError>(())
        }));
    }
    for task in tasks {
        task.await??;
    }

    assert_eq!(pool.available(), pool.capacity());
    assert_eq!(pool.idle_count(), pool.capacity());

    Ok(())
}

#[tokio::test]
async fn test_wait_policy_times_out() -> Result<(), Box<dyn std::error::Error>> {
    let db = TestDatabase::new()?;
    let options = db
        .config(1)
        .pool
        .acquire_timeout(Duration::from_millis(50))
        .saturation(SaturationPolicy::Wait);
    let pool = ConnectionPool::connect(options).await?;

    let held = pool.acquire().await?;
    let result = pool.acquire().await;

    assert!(matches!(result, Err(StorageError::Unavailable(_))));
    drop(held);
    assert!(pool.acquire().await.is_ok());

    Ok(())
}

#[tokio::test]
async fn test_overflow_policy_hands_out_temporary_connections()
-> Result<(), Box<dyn std::error::Error>> {
    let db = TestDatabase::new()?;
    let options = db.config(1).pool.saturation(SaturationPolicy::Overflow);
    let pool = ConnectionPool::connect(options).await?;

    let held = pool.acquire().await?;
    let mut extra = pool.acquire().await?;

    assert!(!held.is_temporary());
    assert!(extra.is_temporary());
    assert!(!extra.prepared(Query::Ping).await?.is_cached());

    drop(extra);
    drop(held);
    assert_eq!(pool.available(), 1);
    assert_eq!(pool.idle_count(), 1);

    Ok(())
}
