//! LMDB environment shared by the catalog store and the user library.
//!
//! One environment (`<name>.lmdb/`) holds four named databases, see [`Table`].
//! Every write runs in its own read-write transaction and is committed before
//! the call returns; LMDB serializes writers, so a check-then-write inside
//! [`AppDbState::write_txn`] cannot interleave with another writer.

use std::path::Path;

use lmdb::{
    Cursor, Database, DatabaseFlags, Environment, RoTransaction, RwTransaction, Transaction,
    WriteFlags,
};
use log::{debug, info, warn};

use crate::config::CoreConfig;
use crate::errors::{StoreError, StoreResult};
use crate::store_adapter::StoreAdapter;

/// Named databases inside the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// Generic key-value namespace behind [`StoreAdapter`].
    Kv,
    SavedDebates,
    PrivateNotes,
    Folders,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::Kv,
        Table::SavedDebates,
        Table::PrivateNotes,
        Table::Folders,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Kv => "kv",
            Table::SavedDebates => "saved_debates",
            Table::PrivateNotes => "private_notes",
            Table::Folders => "folders",
        }
    }
}

/// Database handles for every [`Table`]. Handles are `Copy` and stay valid for
/// the lifetime of the environment.
#[derive(Debug, Clone, Copy)]
pub struct Tables {
    kv: Database,
    saved_debates: Database,
    private_notes: Database,
    folders: Database,
}

impl Tables {
    pub fn get(&self, table: Table) -> Database {
        match table {
            Table::Kv => self.kv,
            Table::SavedDebates => self.saved_debates,
            Table::PrivateNotes => self.private_notes,
            Table::Folders => self.folders,
        }
    }
}

pub struct AppDbState {
    env: Option<Environment>,
    tables: Tables,
    config: CoreConfig,
}

impl AppDbState {
    /// Opens (or creates) the environment described by `config`.
    pub fn init(config: CoreConfig) -> StoreResult<Self> {
        let dir = config.lmdb_dir();
        std::fs::create_dir_all(&dir)?;

        let env = Environment::new()
            .set_max_dbs(Table::ALL.len() as u32)
            .set_map_size(config.map_size_bytes)
            .open(Path::new(&dir))?;

        let tables = Tables {
            kv: env.create_db(Some(Table::Kv.name()), DatabaseFlags::empty())?,
            saved_debates: env.create_db(Some(Table::SavedDebates.name()), DatabaseFlags::empty())?,
            private_notes: env.create_db(Some(Table::PrivateNotes.name()), DatabaseFlags::empty())?,
            folders: env.create_db(Some(Table::Folders.name()), DatabaseFlags::empty())?,
        };

        info!("LMDB environment opened at {dir}");
        Ok(Self {
            env: Some(env),
            tables,
            config,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    fn env(&self) -> StoreResult<&Environment> {
        self.env.as_ref().ok_or(StoreError::Closed)
    }

    /// Runs `f` inside a read-write transaction, committing when it returns
    /// `Ok`. An `Err` aborts the transaction and nothing is written.
    pub fn write_txn<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut RwTransaction<'_>, &Tables) -> Result<T, E>,
    {
        let env = self.env()?;
        let mut txn = env.begin_rw_txn().map_err(StoreError::from)?;
        let value = f(&mut txn, &self.tables)?;
        txn.commit().map_err(StoreError::from)?;
        Ok(value)
    }

    pub fn read_txn<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&RoTransaction<'_>, &Tables) -> Result<T, E>,
    {
        let env = self.env()?;
        let txn = env.begin_ro_txn().map_err(StoreError::from)?;
        f(&txn, &self.tables)
    }

    pub fn get_record(&self, table: Table, key: &str) -> StoreResult<Option<String>> {
        self.read_txn(|txn, tables| read_value(txn, tables.get(table), key))
    }

    pub fn put_record(&self, table: Table, key: &str, value: &str) -> StoreResult<()> {
        self.write_txn(|txn, tables| {
            txn.put(tables.get(table), &key, &value, WriteFlags::empty())?;
            Ok(())
        })
    }

    pub fn delete_record(&self, table: Table, key: &str) -> StoreResult<bool> {
        self.write_txn(|txn, tables| delete_value(txn, tables.get(table), key))
    }

    /// Every `(key, value)` pair of `table` in key order.
    pub fn records(&self, table: Table) -> StoreResult<Vec<(String, String)>> {
        self.read_txn(|txn, tables| collect_values(txn, tables.get(table)))
    }

    /// Empties every table; returns the number of entries removed.
    pub fn clear_all_records(&self) -> StoreResult<usize> {
        let removed = self.write_txn(|txn, tables| {
            let mut removed = 0;
            for table in Table::ALL {
                let db = tables.get(table);
                removed += collect_values(&*txn, db)?.len();
                txn.clear_db(db)?;
            }
            Ok::<usize, StoreError>(removed)
        })?;
        info!("Cleared {removed} records");
        Ok(removed)
    }

    /// Closes the environment, deletes its directory and opens a fresh one.
    pub fn reset_database(&mut self) -> StoreResult<()> {
        self.close_database()?;
        let dir = self.config.lmdb_dir();
        if Path::new(&dir).exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        *self = Self::init(self.config.clone())?;
        info!("Database '{}' reset", self.config.db_name);
        Ok(())
    }

    /// Flushes and releases the environment. Later calls fail with
    /// [`StoreError::Closed`].
    pub fn close_database(&mut self) -> StoreResult<()> {
        if let Some(env) = self.env.take() {
            if let Err(e) = env.sync(true) {
                warn!("Failed to sync LMDB environment before closing: {e}");
            }
            debug!("LMDB environment for '{}' closed", self.config.db_name);
        }
        Ok(())
    }
}

impl StoreAdapter for AppDbState {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        self.get_record(Table::Kv, key)
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        self.put_record(Table::Kv, key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        self.delete_record(Table::Kv, key)
    }

    fn clear(&self) -> StoreResult<usize> {
        self.write_txn(|txn, tables| {
            let count = collect_values(&*txn, tables.kv)?.len();
            txn.clear_db(tables.kv)?;
            Ok(count)
        })
    }
}

pub fn read_value<T: Transaction>(txn: &T, db: Database, key: &str) -> StoreResult<Option<String>> {
    match txn.get(db, &key) {
        Ok(bytes) => Ok(Some(decode(bytes)?)),
        Err(lmdb::Error::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_value(txn: &mut RwTransaction<'_>, db: Database, key: &str) -> StoreResult<bool> {
    match txn.del(db, &key, None) {
        Ok(()) => Ok(true),
        Err(lmdb::Error::NotFound) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub fn collect_values<T: Transaction>(txn: &T, db: Database) -> StoreResult<Vec<(String, String)>> {
    let mut cursor = txn.open_ro_cursor(db)?;
    let mut out = Vec::new();
    for (key, value) in cursor.iter_start() {
        out.push((decode(key)?, decode(value)?));
    }
    Ok(out)
}

fn decode(bytes: &[u8]) -> StoreResult<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| StoreError::InvalidUtf8)
}
