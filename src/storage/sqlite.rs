//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::discovery::{DiscoveryReport, Termination};
use crate::product::Product;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{CategoryRecord, RunRecord, RunStatus};
use crate::HarvestError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
    })
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<CategoryRecord> {
    Ok(CategoryRecord {
        id: row.get(0)?,
        run_id: row.get(1)?,
        url: row.get(2)?,
        page_count: row.get(3)?,
        visible_max: row.get(4)?,
        probes_made: row.get(5)?,
        termination: Termination::from_db_string(&row.get::<_, String>(6)?)
            .unwrap_or(Termination::NoPagination),
        product_links: row.get(7)?,
        discovered_at: row.get(8)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, config_hash, status FROM runs WHERE id = ?1",
        )?;

        stmt.query_row(params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, config_hash, status FROM runs ORDER BY id DESC LIMIT 1",
        )?;

        Ok(stmt.query_row([], run_from_row).optional()?)
    }

    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1 WHERE id = ?2",
            params![status.to_db_string(), run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn complete_run(&mut self, run_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET finished_at = ?1, status = ?2 WHERE id = ?3",
            params![now, RunStatus::Completed.to_db_string(), run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Categories =====

    fn record_category(&mut self, run_id: i64, report: &DiscoveryReport) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO categories
                (run_id, url, page_count, visible_max, probes_made, termination, discovered_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(run_id, url) DO UPDATE SET
                page_count = excluded.page_count,
                visible_max = excluded.visible_max,
                probes_made = excluded.probes_made,
                termination = excluded.termination,
                discovered_at = excluded.discovered_at",
            params![
                run_id,
                report.url,
                report.page_count,
                report.visible_max,
                report.probes_made,
                report.termination.to_db_string(),
                now
            ],
        )?;

        let id = self.conn.query_row(
            "SELECT id FROM categories WHERE run_id = ?1 AND url = ?2",
            params![run_id, report.url],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn set_category_product_links(&mut self, category_id: i64, count: u32) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE categories SET product_links = ?1 WHERE id = ?2",
            params![count, category_id],
        )?;
        if updated == 0 {
            return Err(StorageError::CategoryNotFound(category_id));
        }
        Ok(())
    }

    fn get_categories(&self, run_id: i64) -> StorageResult<Vec<CategoryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, url, page_count, visible_max, probes_made, termination,
                    product_links, discovered_at
             FROM categories WHERE run_id = ?1 ORDER BY url",
        )?;

        let categories = stmt
            .query_map(params![run_id], category_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    fn get_termination_summary(&self, run_id: i64) -> StorageResult<HashMap<Termination, u64>> {
        let mut stmt = self.conn.prepare(
            "SELECT termination, COUNT(*) FROM categories WHERE run_id = ?1 GROUP BY termination",
        )?;

        let mut summary = HashMap::new();
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (name, count) = row?;
            if let Some(termination) = Termination::from_db_string(&name) {
                summary.insert(termination, count as u64);
            }
        }

        Ok(summary)
    }

    // ===== Products =====

    fn upsert_product(
        &mut self,
        run_id: i64,
        category_url: &str,
        url: &str,
        product: &Product,
    ) -> StorageResult<i64> {
        let payload = serde_json::to_string(product)?;
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO products
                (run_id, url, category_url, title, article, brand, price, payload, harvested_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(run_id, url) DO UPDATE SET
                category_url = excluded.category_url,
                title = excluded.title,
                article = excluded.article,
                brand = excluded.brand,
                price = excluded.price,
                payload = excluded.payload,
                harvested_at = excluded.harvested_at",
            params![
                run_id,
                url,
                category_url,
                product.title,
                product.article,
                product.brand,
                product.primary_price(),
                payload,
                now
            ],
        )?;

        let id = self.conn.query_row(
            "SELECT id FROM products WHERE run_id = ?1 AND url = ?2",
            params![run_id, url],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn get_product(&self, run_id: i64, url: &str) -> StorageResult<Option<Product>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM products WHERE run_id = ?1 AND url = ?2",
                params![run_id, url],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn count_products(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM products WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_products_by_category(&self, run_id: i64) -> StorageResult<HashMap<String, u64>> {
        let mut stmt = self.conn.prepare(
            "SELECT category_url, COUNT(*) FROM products WHERE run_id = ?1 GROUP BY category_url",
        )?;

        let counts = stmt
            .query_map(params![run_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(counts)
    }
}
