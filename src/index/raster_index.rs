//! Raster index - SQLite-backed keyed store for raster file locations
//!
//! The schema mirrors the keyed layout the external tile server reads:
//! a `key_names` table declaring the ordered keys with their descriptions,
//! and a `datasets` table with one TEXT column per key plus the raster
//! file path, primary-keyed over the full key tuple.
//!
//! Each insertion runs in its own transaction so a failed ingestion run
//! leaves previously registered entries intact on disk while the run as a
//! whole is reported as failed.

use crate::index::error::{IndexError, IndexResult};
use crate::index::KeySpec;
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// SQLite-backed keyed raster index
#[derive(Debug)]
pub struct RasterIndex {
    conn: Connection,
    path: PathBuf,
    keys: Vec<KeySpec>,
}

fn valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl RasterIndex {
    /// Create a new index at `path`, declaring the keyed schema once.
    ///
    /// Key names must be valid identifiers and unique; each key carries a
    /// (possibly empty) description. Fails if an index already exists at
    /// the path.
    pub fn create(path: &Path, keys: &[KeySpec]) -> IndexResult<Self> {
        for spec in keys {
            if !valid_identifier(&spec.name) {
                return Err(IndexError::InvalidKeyName(spec.name.clone()));
            }
            if keys.iter().filter(|k| k.name == spec.name).count() > 1 {
                return Err(IndexError::DuplicateKeyName(spec.name.clone()));
            }
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Self::open_conn(path)?;

        conn.execute(
            "CREATE TABLE key_names (
                key_name TEXT PRIMARY KEY,
                description TEXT NOT NULL,
                key_order INTEGER NOT NULL
            )",
            [],
        )?;

        let key_columns: Vec<String> = keys
            .iter()
            .map(|k| format!("{} TEXT NOT NULL", k.name))
            .collect();
        let key_list: Vec<&str> = keys.iter().map(|k| k.name.as_str()).collect();

        conn.execute(
            &format!(
                "CREATE TABLE datasets (
                    {},
                    filepath TEXT NOT NULL,
                    PRIMARY KEY ({})
                )",
                key_columns.join(",\n                    "),
                key_list.join(", "),
            ),
            [],
        )?;

        for (order, spec) in keys.iter().enumerate() {
            conn.execute(
                "INSERT INTO key_names (key_name, description, key_order) VALUES (?1, ?2, ?3)",
                params![spec.name, spec.description, order as i64],
            )?;
        }

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            keys: keys.to_vec(),
        })
    }

    /// Open an existing index, reading the key schema back from disk
    pub fn open(path: &Path) -> IndexResult<Self> {
        let conn = Self::open_conn(path)?;

        let keys = {
            let mut stmt = conn.prepare(
                "SELECT key_name, description FROM key_names ORDER BY key_order",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(KeySpec {
                    name: row.get(0)?,
                    description: row.get(1)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            keys,
        })
    }

    fn open_conn(path: &Path) -> IndexResult<Connection> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(conn)
    }

    /// Register a raster file under its key tuple.
    ///
    /// Runs in its own transaction; the write lock is released on every
    /// exit path, including errors.
    pub fn insert(&mut self, key_values: &[&str], raster_path: &Path) -> IndexResult<()> {
        if key_values.len() != self.keys.len() {
            return Err(IndexError::KeyMismatch {
                expected: self.keys.len(),
                actual: key_values.len(),
            });
        }

        let key_list: Vec<&str> = self.keys.iter().map(|k| k.name.as_str()).collect();
        let placeholders: Vec<String> = (1..=key_values.len() + 1)
            .map(|i| format!("?{}", i))
            .collect();

        let sql = format!(
            "INSERT INTO datasets ({}, filepath) VALUES ({})",
            key_list.join(", "),
            placeholders.join(", "),
        );

        let path_str = raster_path.to_string_lossy().into_owned();

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(&sql)?;
            let mut values: Vec<&dyn rusqlite::ToSql> = key_values
                .iter()
                .map(|v| v as &dyn rusqlite::ToSql)
                .collect();
            values.push(&path_str);
            stmt.execute(values.as_slice())?;
        }
        tx.commit()?;

        Ok(())
    }

    /// Look up the raster path registered under a key tuple
    pub fn get(&self, key_values: &[&str]) -> IndexResult<Option<PathBuf>> {
        if key_values.len() != self.keys.len() {
            return Err(IndexError::KeyMismatch {
                expected: self.keys.len(),
                actual: key_values.len(),
            });
        }

        let conditions: Vec<String> = self
            .keys
            .iter()
            .enumerate()
            .map(|(i, k)| format!("{} = ?{}", k.name, i + 1))
            .collect();

        let sql = format!(
            "SELECT filepath FROM datasets WHERE {}",
            conditions.join(" AND "),
        );

        let params: Vec<&dyn rusqlite::ToSql> = key_values
            .iter()
            .map(|v| v as &dyn rusqlite::ToSql)
            .collect();

        let result: Option<String> = self
            .conn
            .query_row(&sql, params.as_slice(), |row| row.get(0))
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        Ok(result.map(PathBuf::from))
    }

    /// All registered entries as (key tuple, raster path), ordered by key
    pub fn entries(&self) -> IndexResult<Vec<(Vec<String>, PathBuf)>> {
        let key_list: Vec<&str> = self.keys.iter().map(|k| k.name.as_str()).collect();
        let sql = format!(
            "SELECT {}, filepath FROM datasets ORDER BY {}",
            key_list.join(", "),
            key_list.join(", "),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let key_count = self.keys.len();
        let rows = stmt.query_map([], |row| {
            let mut values = Vec::with_capacity(key_count);
            for i in 0..key_count {
                values.push(row.get::<_, String>(i)?);
            }
            let filepath: String = row.get(key_count)?;
            Ok((values, PathBuf::from(filepath)))
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Number of registered entries
    pub fn count(&self) -> u64 {
        let result: Result<i64, _> =
            self.conn
                .query_row("SELECT COUNT(*) FROM datasets", [], |row| row.get(0));

        result.unwrap_or(0) as u64
    }

    /// Declared key names, in schema order
    pub fn key_names(&self) -> Vec<&str> {
        self.keys.iter().map(|k| k.name.as_str()).collect()
    }

    /// Flush the WAL so the index file is complete before handoff
    pub fn checkpoint(&mut self) -> IndexResult<()> {
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }

    /// Path of the index database file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
