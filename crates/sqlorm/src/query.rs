//! Fluent statement builder.
//!
//! A [`Query`] is created fresh per statement, mutated by chained calls, and
//! consumed by one terminal operation ([`exec`](Query::exec),
//! [`row`](Query::row), [`rows`](Query::rows)). It tracks one rendered
//! fragment per clause, the ordered bound-argument list, and the running
//! placeholder counter shared with the condition methods in
//! [`condition`](crate::condition).
//!
//! Rendering concatenates clause fragments in a fixed, statement-kind
//! specific order. The order is a constant of the design: callers control
//! clause *content*, never clause *position*.

use crate::error::{OrmError, OrmResult};
use crate::ident;
use crate::scan::{self, ScanRow};
use crate::server::{ExecResult, Server};
use crate::table::Record;
use crate::value::{ToValue, Value};

/// Statement kind under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// Clause slot identifiers.
///
/// `current` tracking uses these so the bare `and`/`or`/`not` combinators can
/// target whichever condition-bearing clause was touched last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Clause {
    Select,
    From,
    Join,
    Where,
    Group,
    Having,
    Order,
    Limit,
    ForUpdate,
    Insert,
    Fields,
    Values,
    Update,
    Set,
    Delete,
}

/// One named fragment per clause, each rendered with its keyword included.
#[derive(Debug, Default, Clone)]
struct Clauses {
    select: Option<String>,
    from: Option<String>,
    join: Option<String>,
    where_: Option<String>,
    group: Option<String>,
    having: Option<String>,
    order: Option<String>,
    limit: Option<String>,
    for_update: Option<String>,
    insert: Option<String>,
    fields: Option<String>,
    values: Option<String>,
    update: Option<String>,
    set: Option<String>,
    delete: Option<String>,
}

impl Clauses {
    fn slot(&mut self, clause: Clause) -> &mut Option<String> {
        match clause {
            Clause::Select => &mut self.select,
            Clause::From => &mut self.from,
            Clause::Join => &mut self.join,
            Clause::Where => &mut self.where_,
            Clause::Group => &mut self.group,
            Clause::Having => &mut self.having,
            Clause::Order => &mut self.order,
            Clause::Limit => &mut self.limit,
            Clause::ForUpdate => &mut self.for_update,
            Clause::Insert => &mut self.insert,
            Clause::Fields => &mut self.fields,
            Clause::Values => &mut self.values,
            Clause::Update => &mut self.update,
            Clause::Set => &mut self.set,
            Clause::Delete => &mut self.delete,
        }
    }

    fn get(&self, clause: Clause) -> Option<&str> {
        match clause {
            Clause::Select => self.select.as_deref(),
            Clause::From => self.from.as_deref(),
            Clause::Join => self.join.as_deref(),
            Clause::Where => self.where_.as_deref(),
            Clause::Group => self.group.as_deref(),
            Clause::Having => self.having.as_deref(),
            Clause::Order => self.order.as_deref(),
            Clause::Limit => self.limit.as_deref(),
            Clause::ForUpdate => self.for_update.as_deref(),
            Clause::Insert => self.insert.as_deref(),
            Clause::Fields => self.fields.as_deref(),
            Clause::Values => self.values.as_deref(),
            Clause::Update => self.update.as_deref(),
            Clause::Set => self.set.as_deref(),
            Clause::Delete => self.delete.as_deref(),
        }
    }
}

/// Render order per statement kind. Not caller-controlled.
const SELECT_ORDER: &[Clause] = &[
    Clause::Select,
    Clause::From,
    Clause::Join,
    Clause::Where,
    Clause::Group,
    Clause::Having,
    Clause::Order,
    Clause::Limit,
    Clause::ForUpdate,
];
const INSERT_ORDER: &[Clause] = &[Clause::Insert, Clause::Fields, Clause::Values];
const UPDATE_ORDER: &[Clause] = &[
    Clause::Update,
    Clause::Set,
    Clause::Where,
    Clause::Order,
    Clause::Limit,
];
const DELETE_ORDER: &[Clause] = &[Clause::Delete, Clause::Where];

/// Fluent, stateful SQL statement assembler.
///
/// Not internally synchronized: one instance belongs to one caller for one
/// statement. Build, execute, discard.
#[must_use]
#[derive(Debug, Clone)]
pub struct Query<'a> {
    kind: StatementKind,
    clauses: Clauses,
    pub(crate) args: Vec<Value>,
    pub(crate) placeholder: usize,
    pub(crate) current: Clause,
    server: Option<&'a Server>,
}

impl Default for Query<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Query<'a> {
    /// Create a detached builder (render-only until a server is attached).
    pub fn new() -> Self {
        Query {
            kind: StatementKind::Select,
            clauses: Clauses::default(),
            args: Vec::new(),
            placeholder: 0,
            current: Clause::Where,
            server: None,
        }
    }

    /// Create a builder bound to a server.
    pub fn with_server(server: &'a Server) -> Self {
        let mut q = Query::new();
        q.server = Some(server);
        q
    }

    /// Statement kind currently under construction.
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Bound arguments in placeholder order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    fn set_clause(&mut self, clause: Clause, fragment: String) -> &mut Self {
        *self.clauses.slot(clause) = Some(fragment);
        self.current = clause;
        self
    }

    fn append_clause(&mut self, clause: Clause, text: &str) -> &mut Self {
        match self.clauses.slot(clause) {
            Some(existing) => existing.push_str(text),
            slot @ None => *slot = Some(text.trim_start().to_string()),
        }
        self.current = clause;
        self
    }

    /// Append rendered text to whichever clause was touched last.
    ///
    /// Used by the bare `and`/`or`/`not` combinators in
    /// [`condition`](crate::condition).
    pub(crate) fn extend_current(&mut self, text: &str) {
        let clause = self.current;
        match self.clauses.slot(clause) {
            Some(existing) => existing.push_str(text),
            slot @ None => *slot = Some(text.trim_start().to_string()),
        }
    }

    // ==================== SELECT ====================

    /// Set the select list. An empty list selects `*`.
    pub fn select(&mut self, fields: &[&str]) -> &mut Self {
        self.kind = StatementKind::Select;
        let list = if fields.is_empty() {
            "*".to_string()
        } else {
            ident::quote_list(fields)
        };
        self.set_clause(Clause::Select, format!("SELECT {list}"))
    }

    /// Set the FROM table.
    pub fn from(&mut self, table: &str) -> &mut Self {
        let quoted = ident::quote(table);
        self.set_clause(Clause::From, format!("FROM {quoted}"))
    }

    /// Add an `INNER JOIN`.
    pub fn inner_join(&mut self, table: &str) -> &mut Self {
        self.join("INNER JOIN", table)
    }

    /// Add an `OUTER JOIN`.
    pub fn outer_join(&mut self, table: &str) -> &mut Self {
        self.join("OUTER JOIN", table)
    }

    /// Add a `LEFT JOIN`.
    pub fn left_join(&mut self, table: &str) -> &mut Self {
        self.join("LEFT JOIN", table)
    }

    /// Add a `RIGHT JOIN`.
    pub fn right_join(&mut self, table: &str) -> &mut Self {
        self.join("RIGHT JOIN", table)
    }

    fn join(&mut self, kind: &str, table: &str) -> &mut Self {
        let quoted = ident::quote(table);
        self.append_clause(Clause::Join, &format!(" {kind} {quoted}"))
    }

    /// Add the ON conditions for the most recent join.
    ///
    /// Fragments come from the condition methods; they are joined by single
    /// spaces exactly as passed, so all but the first should carry an
    /// `AND`/`OR` prefix.
    pub fn on<I>(&mut self, conditions: I) -> &mut Self
    where
        I: IntoIterator<Item = String>,
    {
        let joined = join_fragments(conditions);
        self.append_clause(Clause::Join, &format!(" ON {joined}"))
    }

    /// Set the WHERE conditions (overwrites any previous WHERE).
    ///
    /// Fragments come from the condition methods and are joined by single
    /// spaces; all but the first should carry an `AND`/`OR` prefix.
    pub fn filter<I>(&mut self, conditions: I) -> &mut Self
    where
        I: IntoIterator<Item = String>,
    {
        let joined = join_fragments(conditions);
        self.set_clause(Clause::Where, format!("WHERE {joined}"))
    }

    /// Set the GROUP BY field list.
    pub fn group_by(&mut self, fields: &[&str]) -> &mut Self {
        let list = ident::quote_list(fields);
        self.set_clause(Clause::Group, format!("GROUP BY {list}"))
    }

    /// Set the HAVING conditions.
    pub fn having<I>(&mut self, conditions: I) -> &mut Self
    where
        I: IntoIterator<Item = String>,
    {
        let joined = join_fragments(conditions);
        self.set_clause(Clause::Having, format!("HAVING {joined}"))
    }

    /// Append ascending ORDER BY fields.
    pub fn order_asc(&mut self, fields: &[&str]) -> &mut Self {
        self.order(fields, "ASC")
    }

    /// Append descending ORDER BY fields.
    pub fn order_desc(&mut self, fields: &[&str]) -> &mut Self {
        self.order(fields, "DESC")
    }

    fn order(&mut self, fields: &[&str], direction: &str) -> &mut Self {
        let list = ident::quote_list(fields);
        let segment = format!("{list} {direction}");
        match self.clauses.slot(Clause::Order) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(&segment);
            }
            slot @ None => *slot = Some(format!("ORDER BY {segment}")),
        }
        self.current = Clause::Order;
        self
    }

    /// Set `LIMIT offset, count` (canonical form; rendered literally).
    pub fn limit(&mut self, offset: u64, count: u64) -> &mut Self {
        self.set_clause(Clause::Limit, format!("LIMIT {offset}, {count}"))
    }

    /// Lock selected rows (`FOR UPDATE`).
    pub fn for_update(&mut self) -> &mut Self {
        self.set_clause(Clause::ForUpdate, "FOR UPDATE".to_string())
    }

    // ==================== INSERT ====================

    /// Start an INSERT statement.
    pub fn insert_into(&mut self, table: &str) -> &mut Self {
        self.kind = StatementKind::Insert;
        let quoted = ident::quote(table);
        self.set_clause(Clause::Insert, format!("INSERT INTO {quoted}"))
    }

    /// Set the INSERT column list.
    pub fn fields(&mut self, names: &[&str]) -> &mut Self {
        let list = ident::quote_list(names);
        self.set_clause(Clause::Fields, format!("({list})"))
    }

    /// Append one tuple of VALUES. Repeated calls build a multi-row insert.
    pub fn values<I>(&mut self, vals: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut tuple = String::from("(");
        let mut first = true;
        for val in vals {
            if !first {
                tuple.push_str(", ");
            }
            first = false;
            self.placeholder += 1;
            self.args.push(val.into());
            tuple.push('$');
            tuple.push_str(&self.placeholder.to_string());
        }
        tuple.push(')');
        if first {
            // Empty tuple binds nothing; exec rejects the statement anyway.
            return self;
        }
        match self.clauses.slot(Clause::Values) {
            Some(existing) => {
                existing.push(',');
                existing.push_str(&tuple);
            }
            slot @ None => *slot = Some(format!("VALUES {tuple}")),
        }
        self.current = Clause::Values;
        self
    }

    /// Append one VALUES tuple from a record's non-primary fields.
    ///
    /// Sets the column list from the record type when none was given yet.
    pub fn values_record<T: Record>(&mut self, record: &T) -> &mut Self {
        if self.clauses.get(Clause::Fields).is_none() {
            self.fields(T::fields());
        }
        self.values(record.insert_values())
    }

    // ==================== UPDATE ====================

    /// Start an UPDATE statement.
    pub fn update(&mut self, table: &str) -> &mut Self {
        self.kind = StatementKind::Update;
        let quoted = ident::quote(table);
        self.set_clause(Clause::Update, format!("UPDATE {quoted}"))
    }

    /// Append one `field = value` assignment. Repeatable.
    pub fn set(&mut self, field: &str, value: impl ToValue) -> &mut Self {
        self.placeholder += 1;
        self.args.push(value.to_value());
        let assignment = format!("{} = ${}", ident::quote(field), self.placeholder);
        match self.clauses.slot(Clause::Set) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(&assignment);
            }
            slot @ None => *slot = Some(format!("SET {assignment}")),
        }
        self.current = Clause::Set;
        self
    }

    // ==================== DELETE ====================

    /// Start a DELETE statement.
    pub fn delete_from(&mut self, table: &str) -> &mut Self {
        self.kind = StatementKind::Delete;
        let quoted = ident::quote(table);
        self.set_clause(Clause::Delete, format!("DELETE FROM {quoted}"))
    }

    // ==================== Rendering ====================

    /// Render the canonical SQL string.
    pub fn to_sql(&self) -> String {
        let order = match self.kind {
            StatementKind::Select => SELECT_ORDER,
            StatementKind::Insert => INSERT_ORDER,
            StatementKind::Update => UPDATE_ORDER,
            StatementKind::Delete => DELETE_ORDER,
        };
        let mut sql = String::new();
        for clause in order {
            if let Some(fragment) = self.clauses.get(*clause) {
                if !sql.is_empty() {
                    sql.push(' ');
                }
                sql.push_str(fragment);
            }
        }
        sql
    }

    // ==================== Terminal operations ====================

    fn attached(&self) -> OrmResult<&'a Server> {
        self.server
            .ok_or_else(|| OrmError::configuration("no database configured"))
    }

    /// Execute an INSERT/UPDATE/DELETE statement.
    pub fn exec(&mut self) -> OrmResult<ExecResult> {
        let server = self.attached()?;
        if self.kind == StatementKind::Insert && self.clauses.get(Clause::Values).is_none() {
            return Err(OrmError::configuration("empty insert data"));
        }
        let sql = self.to_sql();
        tracing::debug!(sql = %sql, args = self.args.len(), "exec");
        server.exec(&sql, &self.args)
    }

    /// Fetch at most one row into `dest`.
    ///
    /// `dest` is left untouched when the result set is empty; additional rows
    /// from the cursor are not read.
    pub fn row<D: ScanRow>(&mut self, dest: &mut D) -> OrmResult<()> {
        let server = self.attached()?;
        let sql = self.to_sql();
        tracing::debug!(sql = %sql, args = self.args.len(), "row");
        let mut rows = server.query(&sql, &self.args)?;
        scan::fetch_one(rows.as_mut(), dest)
    }

    /// Fetch all rows, appending one fresh instance per row to `dest`.
    pub fn rows<D: ScanRow>(&mut self, dest: &mut Vec<D>) -> OrmResult<()> {
        let server = self.attached()?;
        let sql = self.to_sql();
        tracing::debug!(sql = %sql, args = self.args.len(), "rows");
        let mut rows = server.query(&sql, &self.args)?;
        scan::fetch_all(rows.as_mut(), dest)
    }
}

fn join_fragments<I>(fragments: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut out = String::new();
    for fragment in fragments {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&fragment);
    }
    out
}
