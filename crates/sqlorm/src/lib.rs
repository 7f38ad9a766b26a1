//! # sqlorm
//!
//! A lightweight multi-dialect SQL toolkit for Rust.
//!
//! ## Features
//!
//! - **Fluent builder**: assemble SELECT / INSERT / UPDATE / DELETE
//!   statements clause by clause, with bound placeholder arguments
//! - **Three dialects**: one canonical SQL form, translated per backend
//!   (PostgreSQL, MySQL, SQLite) right before dispatch
//! - **Type-safe mapping**: row → struct via the `Record` trait (derivable),
//!   plus open maps and positional lists
//! - **Minimal magic**: traits and one derive macro for boilerplate reduction
//! - **Pluggable drivers**: bring any client library by implementing the
//!   `Driver` / `Connection` / `Rows` traits
//!
//! ## Query builder
//!
//! ```ignore
//! use sqlorm::{config, Record};
//!
//! #[derive(Record, Default)]
//! #[orm(table = "passport_user")]
//! struct User {
//!     #[orm(primary_key)]
//!     user_id: i64,
//!     nickname: String,
//!     birth_year: i64,
//! }
//!
//! let server = config::server("main")?;
//!
//! // SELECT
//! let mut q = server.select(&["*"]);
//! let cond = q.gt("birth_year", 1980);
//! let mut users: Vec<User> = Vec::new();
//! q.from("passport_user")
//!     .filter([cond])
//!     .order_desc(&["user_id"])
//!     .limit(0, 10)
//!     .rows(&mut users)?;
//!
//! // INSERT
//! let user = User { nickname: "alice".into(), birth_year: 1990, ..Default::default() };
//! let result = server.insert_into("passport_user").values_record(&user).exec()?;
//! ```

pub mod condition;
pub mod config;
pub mod dialect;
pub mod error;
pub mod ident;
pub mod query;
pub mod scan;
pub mod server;
pub mod table;
pub mod value;

pub use dialect::{translate, Dialect};
pub use error::{OrmError, OrmResult};
pub use query::{Query, StatementKind};
pub use scan::{Item, ScanRow};
pub use server::{register_driver, Connection, Driver, ExecResult, Rows, Server};
pub use table::{Record, Table};
pub use value::{FromValue, RawValue, ToValue, Value};

#[cfg(feature = "derive")]
pub use sqlorm_derive::Record;
