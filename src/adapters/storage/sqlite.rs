//! SQLite-backed record store.
//!
//! All statements run on the blocking pool behind one shared connection.
//! `dateOfSale` is stored as fixed-width UTC RFC 3339 text (nanosecond
//! precision, `Z` suffix) so range predicates can compare strings directly.
//! Search goes through `unicode_lower`, registered on every connection, since
//! SQLite's built-in `lower()` only folds ASCII.

use crate::domain::model::{CategoryCount, SaleRecord, SaleStatistics};
use crate::domain::ports::RecordStore;
use crate::domain::query::SaleFilter;
use crate::utils::error::{DashboardError, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS sale_records (
        row_id INTEGER PRIMARY KEY AUTOINCREMENT,
        external_id INTEGER,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        price REAL NOT NULL,
        category TEXT NOT NULL,
        image TEXT,
        sold INTEGER NOT NULL,
        date_of_sale TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_sale_records_date_of_sale ON sale_records (date_of_sale);
";

const SELECT_COLUMNS: &str =
    "external_id, title, description, price, category, image, sold, date_of_sale";

#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        register_functions(&conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| DashboardError::QueryError {
                message: "SQLite connection lock poisoned".to_string(),
            })?;
            op(&mut guard)
        })
        .await?
    }
}

/// 與 `str::to_lowercase` 相同的大小寫轉換
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

/// Rendered `WHERE` body plus its positional parameters.
#[derive(Debug)]
struct WhereClause {
    sql: String,
    params: Vec<Value>,
}

fn where_clause(filter: &SaleFilter) -> WhereClause {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    if let Some(month) = filter.month {
        clauses.push("CAST(strftime('%m', date_of_sale) AS INTEGER) = ?".to_string());
        params.push(Value::Integer(i64::from(month.number())));
    }

    clauses.push("date_of_sale >= ? AND date_of_sale <= ?".to_string());
    params.push(Value::Text(encode_date(&filter.date_range.start)));
    params.push(Value::Text(encode_date(&filter.date_range.end)));

    if let Some(search) = &filter.search {
        clauses.push(
            "(instr(unicode_lower(title), ?) > 0 OR instr(unicode_lower(description), ?) > 0 OR price = ?)"
                .to_string(),
        );
        params.push(Value::Text(search.needle.clone()));
        params.push(Value::Text(search.needle.clone()));
        params.push(Value::Real(search.price));
    }

    if let Some(band) = &filter.price {
        clauses.push("price >= ?".to_string());
        params.push(Value::Real(band.min));
        if let Some(max) = band.max {
            clauses.push("price < ?".to_string());
            params.push(Value::Real(max));
        }
    }

    WhereClause {
        sql: clauses.join(" AND "),
        params,
    }
}

fn encode_date(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_record(row: &Row<'_>) -> rusqlite::Result<SaleRecord> {
    let raw_date: String = row.get(7)?;
    let date_of_sale = DateTime::parse_from_rfc3339(&raw_date)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    Ok(SaleRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        category: row.get(4)?,
        image: row.get(5)?,
        sold: row.get(6)?,
        date_of_sale,
    })
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn count(&self, filter: &SaleFilter) -> Result<u64> {
        let clause = where_clause(filter);
        self.with_conn(move |conn| {
            let sql = format!("SELECT COUNT(*) FROM sale_records WHERE {}", clause.sql);
            let mut stmt = conn.prepare_cached(&sql)?;
            let count: i64 = stmt.query_row(params_from_iter(clause.params.iter()), |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    async fn find(&self, filter: &SaleFilter, skip: u64, limit: u64) -> Result<Vec<SaleRecord>> {
        let mut clause = where_clause(filter);
        clause.params.push(Value::Integer(to_sql_int(limit)));
        clause.params.push(Value::Integer(to_sql_int(skip)));

        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {} FROM sale_records WHERE {} ORDER BY row_id LIMIT ? OFFSET ?",
                SELECT_COLUMNS, clause.sql
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let records = stmt
                .query_map(params_from_iter(clause.params.iter()), decode_record)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
        .await
    }

    async fn statistics(&self, filter: &SaleFilter) -> Result<Option<SaleStatistics>> {
        let clause = where_clause(filter);
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN sold = 1 THEN price ELSE 0 END), 0.0),
                        COALESCE(SUM(CASE WHEN sold = 1 THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN sold = 0 THEN 1 ELSE 0 END), 0)
                 FROM sale_records WHERE {}",
                clause.sql
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let (matched, stats) = stmt.query_row(params_from_iter(clause.params.iter()), |row| {
                let matched: i64 = row.get(0)?;
                let sold: i64 = row.get(2)?;
                let not_sold: i64 = row.get(3)?;
                Ok((
                    matched,
                    SaleStatistics {
                        total_sale_amount: row.get(1)?,
                        total_sold_items: sold as u64,
                        total_not_sold_items: not_sold as u64,
                    },
                ))
            })?;

            Ok((matched > 0).then_some(stats))
        })
        .await
    }

    async fn count_by_category(&self, filter: &SaleFilter) -> Result<Vec<CategoryCount>> {
        let clause = where_clause(filter);
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT category, COUNT(*) FROM sale_records WHERE {} GROUP BY category",
                clause.sql
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let groups = stmt
                .query_map(params_from_iter(clause.params.iter()), |row| {
                    let count: i64 = row.get(1)?;
                    Ok(CategoryCount {
                        category: row.get(0)?,
                        count: count as u64,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(groups)
        })
        .await
    }

    async fn delete_all(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM sale_records", [])?;
            Ok(removed as u64)
        })
        .await
    }

    async fn insert_many(&self, records: Vec<SaleRecord>) -> Result<usize> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT INTO sale_records
                        (external_id, title, description, price, category, image, sold, date_of_sale)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )?;
                for record in &records {
                    stmt.execute(params![
                        record.id,
                        record.title,
                        record.description,
                        record.price,
                        record.category,
                        record.image,
                        record.sold,
                        encode_date(&record.date_of_sale),
                    ])?;
                }
            }
            tx.commit()?;
            Ok(records.len())
        })
        .await
    }
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
