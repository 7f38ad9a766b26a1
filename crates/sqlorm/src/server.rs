//! Connection facade and driver registry.
//!
//! A [`Server`] is a logical database: a name, a dialect tag, and a
//! dialect-specific connection string. The first statement dispatched through
//! a server opens a connection via the [`Driver`] registered for its dialect
//! and caches it process-wide under the server's name; later statements reuse
//! the cached handle. There is no explicit close: connections live until
//! process exit.
//!
//! A cached connection that starts failing stays cached. Liveness
//! re-validation belongs to the driver's client library, not this layer.

use crate::dialect::{self, Dialect};
use crate::error::{OrmError, OrmResult};
use crate::query::Query;
use crate::scan::{self, ScanRow};
use crate::value::{RawValue, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

/// Outcome of an INSERT/UPDATE/DELETE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecResult {
    /// Generated primary-key value, where the backend reports one; `0`
    /// otherwise.
    pub last_insert_id: i64,
    /// Number of rows the statement touched.
    pub rows_affected: i64,
}

/// A forward-only row cursor.
///
/// Release happens on drop; dropping mid-iteration is always safe.
pub trait Rows {
    /// Ordered result column names.
    fn columns(&self) -> &[String];

    /// Advance and return the next row, or `None` at the end.
    fn next_row(&mut self) -> OrmResult<Option<Vec<RawValue>>>;
}

/// An open database connection in the target backend's native syntax.
///
/// Implementations receive SQL already translated for their dialect.
pub trait Connection: Send + Sync {
    /// Run a statement that returns no rows.
    fn exec(&self, sql: &str, args: &[Value]) -> OrmResult<ExecResult>;

    /// Run a statement that returns a row cursor.
    fn query(&self, sql: &str, args: &[Value]) -> OrmResult<Box<dyn Rows>>;
}

/// A factory for connections to one kind of backend.
pub trait Driver: Send + Sync {
    /// Open a connection for the given connection string.
    fn open(&self, dsn: &str) -> OrmResult<Box<dyn Connection>>;
}

fn drivers() -> &'static Mutex<HashMap<String, Arc<dyn Driver>>> {
    static DRIVERS: OnceLock<Mutex<HashMap<String, Arc<dyn Driver>>>> = OnceLock::new();
    DRIVERS.get_or_init(|| Mutex::new(HashMap::new()))
}

fn connections() -> &'static Mutex<HashMap<String, Arc<dyn Connection>>> {
    static CONNECTIONS: OnceLock<Mutex<HashMap<String, Arc<dyn Connection>>>> = OnceLock::new();
    CONNECTIONS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Register a driver under a dialect name (see [`Dialect::as_str`]).
///
/// Re-registering a name replaces the previous driver for connections opened
/// afterwards; already cached connections are unaffected.
pub fn register_driver(name: &str, driver: Arc<dyn Driver>) {
    let mut map = drivers().lock().unwrap();
    map.insert(name.to_string(), driver);
}

/// A logical database server.
#[derive(Debug, Clone)]
pub struct Server {
    /// Logical name; the connection-cache key.
    pub name: String,
    /// Backend dialect.
    pub dialect: Dialect,
    /// Dialect-specific connection string.
    pub dsn: String,
}

impl Server {
    pub fn new(name: impl Into<String>, dialect: Dialect, dsn: impl Into<String>) -> Self {
        Server {
            name: name.into(),
            dialect,
            dsn: dsn.into(),
        }
    }

    /// The cached connection for this server, opened on first use.
    pub fn connection(&self) -> OrmResult<Arc<dyn Connection>> {
        if let Some(conn) = connections().lock().unwrap().get(&self.name) {
            return Ok(Arc::clone(conn));
        }

        let driver = {
            let map = drivers().lock().unwrap();
            map.get(self.dialect.as_str()).cloned().ok_or_else(|| {
                OrmError::connection(format!(
                    "no driver registered for dialect {}",
                    self.dialect
                ))
            })?
        };

        // Opening happens outside the lock; when two callers race, the first
        // insert wins and the loser's handle is dropped.
        let opened: Arc<dyn Connection> = Arc::from(driver.open(&self.dsn)?);
        let mut cache = connections().lock().unwrap();
        let conn = cache
            .entry(self.name.clone())
            .or_insert_with(|| Arc::clone(&opened));
        Ok(Arc::clone(conn))
    }

    /// Translate canonical SQL for this server's dialect and execute it.
    pub fn exec(&self, sql: &str, args: &[Value]) -> OrmResult<ExecResult> {
        let (sql, args) = dialect::translate(self.dialect, sql, args)?;
        tracing::debug!(server = %self.name, dialect = %self.dialect, sql = %sql, "dispatch exec");
        self.connection()?.exec(&sql, &args)
    }

    /// Translate canonical SQL for this server's dialect and open a cursor.
    pub fn query(&self, sql: &str, args: &[Value]) -> OrmResult<Box<dyn Rows>> {
        let (sql, args) = dialect::translate(self.dialect, sql, args)?;
        tracing::debug!(server = %self.name, dialect = %self.dialect, sql = %sql, "dispatch query");
        self.connection()?.query(&sql, &args)
    }

    /// Fetch at most one row of a raw statement into `dest`.
    pub fn row<D: ScanRow>(&self, sql: &str, args: &[Value], dest: &mut D) -> OrmResult<()> {
        let mut rows = self.query(sql, args)?;
        scan::fetch_one(rows.as_mut(), dest)
    }

    /// Fetch all rows of a raw statement into `dest`.
    pub fn rows<D: ScanRow>(&self, sql: &str, args: &[Value], dest: &mut Vec<D>) -> OrmResult<()> {
        let mut rows = self.query(sql, args)?;
        scan::fetch_all(rows.as_mut(), dest)
    }

    /// Start a statement builder bound to this server.
    pub fn new_query(&self) -> Query<'_> {
        Query::with_server(self)
    }

    /// Start a SELECT bound to this server.
    pub fn select(&self, fields: &[&str]) -> Query<'_> {
        let mut q = self.new_query();
        q.select(fields);
        q
    }

    /// Start an INSERT bound to this server.
    pub fn insert_into(&self, table: &str) -> Query<'_> {
        let mut q = self.new_query();
        q.insert_into(table);
        q
    }

    /// Start an UPDATE bound to this server.
    pub fn update(&self, table: &str) -> Query<'_> {
        let mut q = self.new_query();
        q.update(table);
        q
    }

    /// Start a DELETE bound to this server.
    pub fn delete_from(&self, table: &str) -> Query<'_> {
        let mut q = self.new_query();
        q.delete_from(table);
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullRows;

    impl Rows for NullRows {
        fn columns(&self) -> &[String] {
            &[]
        }

        fn next_row(&mut self) -> OrmResult<Option<Vec<RawValue>>> {
            Ok(None)
        }
    }

    struct CountingDriver {
        opens: Arc<Mutex<usize>>,
    }

    struct NullConnection;

    impl Connection for NullConnection {
        fn exec(&self, _sql: &str, _args: &[Value]) -> OrmResult<ExecResult> {
            Ok(ExecResult::default())
        }

        fn query(&self, _sql: &str, _args: &[Value]) -> OrmResult<Box<dyn Rows>> {
            Ok(Box::new(NullRows))
        }
    }

    impl Driver for CountingDriver {
        fn open(&self, _dsn: &str) -> OrmResult<Box<dyn Connection>> {
            *self.opens.lock().unwrap() += 1;
            Ok(Box::new(NullConnection))
        }
    }

    #[test]
    fn connection_is_cached_per_server_name() {
        let opens = Arc::new(Mutex::new(0));
        register_driver(
            "postgres",
            Arc::new(CountingDriver {
                opens: Arc::clone(&opens),
            }),
        );
        let server = Server::new("cache-test", Dialect::Postgres, "host=localhost");
        let a = server.connection().unwrap();
        let b = server.connection().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*opens.lock().unwrap(), 1);
    }

    #[test]
    fn missing_driver_is_connection_error() {
        let server = Server::new("no-driver-test", Dialect::Mysql, "mysql://x");
        let err = server.connection().err().unwrap();
        assert!(err.to_string().contains("no driver registered"));
    }
}
