use sqlx::Row;
use sqlx::sqlite::SqliteConnection;

/// Validates that a SQLite table has the columns we expect
///
/// Column types are compared case-insensitively since SQLite keeps whatever the
/// declaring statement used. Extra columns only produce a warning.
pub(crate) async fn validate_sqlite_table_schema<E>(
    conn: &mut SqliteConnection,
    table_name: &str,
    expected_columns: &[(&str, &str)],
    error_mapper: impl Fn(String) -> E,
) -> Result<(), E> {
    let rows = sqlx::query(&format!("PRAGMA table_info({table_name})"))
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| error_mapper(e.to_string()))?;

    if rows.is_empty() {
        return Err(error_mapper(format!(
            "Schema validation failed: Table '{table_name}' does not exist"
        )));
    }

    let mut actual_columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row.try_get("name").map_err(|e| error_mapper(e.to_string()))?;
        let type_: String = row.try_get("type").map_err(|e| error_mapper(e.to_string()))?;
        actual_columns.push((name, type_));
    }

    for (expected_name, expected_type) in expected_columns {
        let found = actual_columns
            .iter()
            .find(|(name, _)| name == expected_name);

        match found {
            Some((_, actual_type)) if actual_type.eq_ignore_ascii_case(expected_type) => {}
            Some((_, actual_type)) => {
                return Err(error_mapper(format!(
                    "Schema validation failed: Column '{expected_name}' has type '{actual_type}' but expected '{expected_type}'"
                )));
            }
            None => {
                return Err(error_mapper(format!(
                    "Schema validation failed: Missing column '{expected_name}'"
                )));
            }
        }
    }

    for (actual_name, _) in &actual_columns {
        if !expected_columns
            .iter()
            .any(|(name, _)| *name == actual_name)
        {
            tracing::warn!(
                "Extra column '{}' found in table '{}'",
                actual_name,
                table_name
            );
        }
    }

    Ok(())
}
