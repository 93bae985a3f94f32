use anyhow::Result;
use async_trait::async_trait;
use libsql::{Connection, params};

use super::{IncidentRecord, IncidentStore};

/// LibSQL-backed incident store. The table is created on connect so a
/// fresh database works without a migration step.
pub struct LibsqlStore {
    conn: Connection,
    table: String,
}

impl LibsqlStore {
    pub async fn connect(path: &str, table: &str) -> Result<Self> {
        let db = libsql::Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (url TEXT PRIMARY KEY, first_error_at INTEGER NOT NULL, expiring INTEGER NOT NULL)"
            ),
            (),
        )
        .await?;

        Ok(Self { conn, table: table.to_string() })
    }
}

#[async_trait]
impl IncidentStore for LibsqlStore {
    async fn get(&self, url: &str) -> Result<Option<IncidentRecord>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT url, first_error_at, expiring FROM {} WHERE url = ?", self.table),
                params![url],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(IncidentRecord {
                url: row.get(0)?,
                first_error_at: row.get(1)?,
                expiring: row.get::<i64>(2)? != 0,
            }))
        } else {
            Ok(None)
        }
    }

    async fn put(&self, record: &IncidentRecord) -> Result<()> {
        self.conn
            .execute(
                &format!(
                    "INSERT OR REPLACE INTO {} (url, first_error_at, expiring) VALUES (?, ?, ?)",
                    self.table
                ),
                params![
                    record.url.clone(),
                    record.first_error_at,
                    if record.expiring { 1_i64 } else { 0_i64 }
                ],
            )
            .await?;

        Ok(())
    }

    async fn delete(&self, url: &str) -> Result<()> {
        self.conn
            .execute(&format!("DELETE FROM {} WHERE url = ?", self.table), params![url])
            .await?;

        Ok(())
    }

    async fn scan_all(&self) -> Result<Vec<IncidentRecord>> {
        let mut rows = self
            .conn
            .query(&format!("SELECT url, first_error_at, expiring FROM {}", self.table), ())
            .await?;

        // Drain the row stream to completion before the cache is built
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(IncidentRecord {
                url: row.get(0)?,
                first_error_at: row.get(1)?,
                expiring: row.get::<i64>(2)? != 0,
            });
        }

        Ok(records)
    }
}
