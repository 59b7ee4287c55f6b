use sqlx::{Connection, Executor, Row, Sqlite, Transaction};

use crate::storage::{PooledConnection, Prepared, Query, validate_sqlite_table_schema};
use crate::userdb::{
    errors::UserError,
    types::{NewUser, UserId},
};
use crate::utils::digests_match;

pub(super) async fn create_tables_sqlite(conn: &mut PooledConnection) -> Result<(), UserError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            mail TEXT NOT NULL UNIQUE,
            hashed_password TEXT NOT NULL
        )
        "#,
    )
    .execute(conn.connection())
    .await?;

    // Covers the lookup: mail seek plus the digest without touching the table
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_user_mail_hashed_password ON user(mail, hashed_password)",
    )
    .execute(conn.connection())
    .await?;

    Ok(())
}

/// Validates that the user table schema matches what we expect
pub(super) async fn validate_user_tables_sqlite(
    conn: &mut PooledConnection,
) -> Result<(), UserError> {
    let expected_columns = [
        ("id", "INTEGER"),
        ("mail", "TEXT"),
        ("hashed_password", "TEXT"),
    ];

    validate_sqlite_table_schema(
        conn.connection(),
        "user",
        &expected_columns,
        UserError::Storage,
    )
    .await
}

pub(super) async fn find_by_credentials_sqlite(
    conn: &mut PooledConnection,
    mail: &str,
    hashed_password: &str,
) -> Result<Option<UserId>, UserError> {
    let find = conn.prepared(Query::FindByMail).await?;

    let row = find
        .query()
        .bind(mail)
        .fetch_optional(conn.connection())
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let id: UserId = row.try_get("id")?;
    let stored: String = row.try_get("hashed_password")?;

    if digests_match(&stored, hashed_password) {
        Ok(Some(id))
    } else {
        Ok(None)
    }
}

pub(super) async fn count_users_sqlite(conn: &mut PooledConnection) -> Result<u64, UserError> {
    let count = conn.prepared(Query::CountUsers).await?;

    let row = count.query().fetch_one(conn.connection()).await?;
    let total: i64 = row.try_get(0)?;

    u64::try_from(total).map_err(|e| UserError::InvalidData(e.to_string()))
}

pub(super) async fn ping_sqlite(conn: &mut PooledConnection) -> Result<(), UserError> {
    let ping = conn.prepared(Query::Ping).await?;
    ping.query().fetch_one(conn.connection()).await?;
    Ok(())
}

/// Replace every user with `users`, committing one transaction per batch
///
/// The delete shares the first batch's transaction, so a failing first batch leaves
/// the previous rows in place. Later batches commit independently.
pub(super) async fn replace_users_sqlite(
    conn: &mut PooledConnection,
    users: &[NewUser],
    batch_size: usize,
) -> Result<u64, UserError> {
    let delete = conn.prepared(Query::DeleteAllUsers).await?;
    let insert = conn.prepared(Query::InsertUser).await?;

    run_maintenance(conn, "PRAGMA wal_checkpoint(TRUNCATE)").await;

    let mut inserted = 0;
    if users.is_empty() {
        insert_batch(conn, Some(&delete), &insert, &[]).await?;
    } else {
        for (index, batch) in users.chunks(batch_size.max(1)).enumerate() {
            let clear = (index == 0).then_some(&delete);
            inserted += insert_batch(conn, clear, &insert, batch).await?;
            tracing::trace!("Committed batch {} ({} rows total)", index, inserted);
        }
    }

    run_maintenance(conn, "ANALYZE").await;
    run_maintenance(conn, "PRAGMA optimize").await;

    Ok(inserted)
}

async fn insert_batch(
    conn: &mut PooledConnection,
    clear: Option<&Prepared>,
    insert: &Prepared,
    batch: &[NewUser],
) -> Result<u64, UserError> {
    let mut tx = conn.connection().begin().await?;

    if let Some(delete) = clear {
        if let Err(e) = delete.query().execute(&mut *tx).await {
            rollback(tx).await;
            return Err(e.into());
        }
    }

    for user in batch {
        let result = insert
            .query()
            .bind(&user.mail)
            .bind(&user.hashed_password)
            .execute(&mut *tx)
            .await;

        if let Err(e) = result {
            tracing::warn!("Insert of {} failed, rolling back batch: {}", user.mail, e);
            rollback(tx).await;
            return Err(e.into());
        }
    }

    tx.commit().await?;
    Ok(batch.len() as u64)
}

/// Roll back after a failed statement; the statement's error is what callers see
async fn rollback(tx: Transaction<'_, Sqlite>) {
    if let Err(e) = tx.rollback().await {
        tracing::error!("Rollback failed: {}", e);
    }
}

async fn run_maintenance(conn: &mut PooledConnection, sql: &str) {
    if let Err(e) = conn.connection().execute(sql).await {
        tracing::warn!("Maintenance statement '{}' failed: {}", sql, e);
    }
}
