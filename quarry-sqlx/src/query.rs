use quarry_core::{Direction, Order};

/// SQL flavour a [`Select`] renders for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    /// Generic SQL using `?` placeholders (default).
    #[default]
    Generic,
    /// SQLite-style `?` placeholders.
    Sqlite,
    /// MySQL-style `?` placeholders with backtick quoting.
    MySql,
    /// Postgres-style `$1, $2, ...` placeholders.
    Postgres,
}

impl Dialect {
    /// Guess the dialect from a connection URL scheme.
    pub fn from_url(url: &str) -> Self {
        let scheme = url.split(':').next().unwrap_or_default().to_ascii_lowercase();
        match scheme.as_str() {
            "sqlite" => Dialect::Sqlite,
            "postgres" | "postgresql" => Dialect::Postgres,
            "mysql" | "mariadb" => Dialect::MySql,
            _ => Dialect::Generic,
        }
    }

    fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Generic | Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }

    fn quote_char(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Generic | Dialect::Sqlite | Dialect::Postgres => '"',
        }
    }

    /// `LIMIT` clause standing for "no limit", for engines that reject a bare
    /// `OFFSET`.
    fn unbounded_limit(self) -> Option<&'static str> {
        match self {
            Dialect::Sqlite => Some(" LIMIT -1"),
            Dialect::MySql => Some(" LIMIT 18446744073709551615"),
            Dialect::Generic | Dialect::Postgres => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentifierPolicy {
    /// Do not validate or quote identifiers.
    #[default]
    Raw,
    /// Validate identifiers against a conservative pattern.
    Validate,
    /// Validate and quote identifiers using the dialect quoting style.
    Quote,
}

#[derive(Debug, Clone)]
enum Condition {
    Eq(String, String),
    TextEq(String, String),
    NotEq(String, String),
    Gt(String, String),
    Lt(String, String),
    In(String, Vec<String>),
    IsNull(String),
    IsNotNull(String),
    AnyILike(Vec<String>, String),
}

/// Relational statement: a `SELECT` over one table (or join expression) with
/// bound parameters.
///
/// Used both as the base query a [`SqlxAdapter`](crate::SqlxAdapter) is
/// scoped to and as a metadata sub-query.
///
/// ```ignore
/// let select = Select::new("person")
///     .where_not_null("email")
///     .order_by("id", Direction::Asc);
/// let (sql, params) = select.build_select()?;
/// ```
#[derive(Debug, Clone)]
pub struct Select {
    table: String,
    columns: Vec<String>,
    conditions: Vec<Condition>,
    order: Vec<Order>,
    limit: Option<u64>,
    offset: Option<u64>,
    dialect: Dialect,
    identifier_policy: IdentifierPolicy,
}

impl Select {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            conditions: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
            dialect: Dialect::Generic,
            identifier_policy: IdentifierPolicy::Raw,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Projected columns; `*` when none are given.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    pub fn where_eq(mut self, column: &str, value: &str) -> Self {
        self.conditions
            .push(Condition::Eq(column.to_string(), value.to_string()));
        self
    }

    /// Equality against a value compared as text. Postgres renders
    /// `CAST(col AS TEXT) = $n` so a text bind matches numeric columns;
    /// other dialects coerce the bind themselves and render `col = ?`.
    pub fn where_text_eq(mut self, column: &str, value: &str) -> Self {
        self.conditions
            .push(Condition::TextEq(column.to_string(), value.to_string()));
        self
    }

    pub fn where_not_eq(mut self, column: &str, value: &str) -> Self {
        self.conditions
            .push(Condition::NotEq(column.to_string(), value.to_string()));
        self
    }

    pub fn where_gt(mut self, column: &str, value: &str) -> Self {
        self.conditions
            .push(Condition::Gt(column.to_string(), value.to_string()));
        self
    }

    pub fn where_lt(mut self, column: &str, value: &str) -> Self {
        self.conditions
            .push(Condition::Lt(column.to_string(), value.to_string()));
        self
    }

    pub fn where_in(mut self, column: &str, values: &[&str]) -> Self {
        self.conditions.push(Condition::In(
            column.to_string(),
            values.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn where_null(mut self, column: &str) -> Self {
        self.conditions.push(Condition::IsNull(column.to_string()));
        self
    }

    pub fn where_not_null(mut self, column: &str) -> Self {
        self.conditions
            .push(Condition::IsNotNull(column.to_string()));
        self
    }

    /// Case-insensitive `LIKE` of `pattern` against any of `columns`, as one
    /// parenthesised OR group. No-op when `columns` is empty.
    pub fn where_any_ilike<I, S>(mut self, columns: I, pattern: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if !columns.is_empty() {
            self.conditions
                .push(Condition::AnyILike(columns, pattern.to_string()));
        }
        self
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order.push(Order::new(column, direction));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Render the full query returning `(sql, bind_values)`.
    pub fn build_select(&self) -> Result<(String, Vec<String>), QueryError> {
        let mut params = Params::new(self.dialect);
        let mut sql = self.render_projection(&mut params)?;
        self.append_order(&mut sql)?;
        self.append_limit_offset(&mut sql);
        Ok((sql, params.values))
    }

    /// Render `SELECT COUNT(*)` over the unordered, unpaginated query.
    pub fn build_count(&self) -> Result<(String, Vec<String>), QueryError> {
        let mut params = Params::new(self.dialect);
        let inner = self.render_projection(&mut params)?;
        Ok((format!("SELECT COUNT(*) FROM ({inner}) AS search"), params.values))
    }

    fn render_projection(&self, params: &mut Params) -> Result<String, QueryError> {
        let table = self.identifier(&self.table, false, "table")?;
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(|col| self.identifier(col, true, "column"))
                .collect::<Result<Vec<_>, _>>()?
                .join(", ")
        };

        let mut sql = format!("SELECT {columns} FROM {table}");
        if !self.conditions.is_empty() {
            let clauses = self
                .conditions
                .iter()
                .map(|cond| self.render_condition(cond, params))
                .collect::<Result<Vec<_>, _>>()?;
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        Ok(sql)
    }

    fn render_condition(&self, cond: &Condition, params: &mut Params) -> Result<String, QueryError> {
        let clause = match cond {
            Condition::Eq(col, val) => {
                format!("{} = {}", self.identifier(col, false, "column")?, params.push(val))
            }
            Condition::TextEq(col, val) => {
                let col = self.identifier(col, false, "column")?;
                match self.dialect {
                    Dialect::Postgres => format!("CAST({col} AS TEXT) = {}", params.push(val)),
                    _ => format!("{col} = {}", params.push(val)),
                }
            }
            Condition::NotEq(col, val) => {
                format!("{} != {}", self.identifier(col, false, "column")?, params.push(val))
            }
            Condition::Gt(col, val) => {
                format!("{} > {}", self.identifier(col, false, "column")?, params.push(val))
            }
            Condition::Lt(col, val) => {
                format!("{} < {}", self.identifier(col, false, "column")?, params.push(val))
            }
            Condition::In(col, vals) => {
                let col = self.identifier(col, false, "column")?;
                let placeholders: Vec<_> = vals.iter().map(|val| params.push(val)).collect();
                format!("{col} IN ({})", placeholders.join(", "))
            }
            Condition::IsNull(col) => format!("{} IS NULL", self.identifier(col, false, "column")?),
            Condition::IsNotNull(col) => {
                format!("{} IS NOT NULL", self.identifier(col, false, "column")?)
            }
            Condition::AnyILike(cols, pattern) => {
                let mut alternatives = Vec::with_capacity(cols.len());
                for col in cols {
                    let col = self.identifier(col, false, "column")?;
                    let placeholder = params.push(pattern);
                    alternatives.push(match self.dialect {
                        Dialect::Postgres => format!("{col} ILIKE {placeholder}"),
                        _ => format!("LOWER({col}) LIKE LOWER({placeholder})"),
                    });
                }
                format!("({})", alternatives.join(" OR "))
            }
        };
        Ok(clause)
    }

    fn append_order(&self, sql: &mut String) -> Result<(), QueryError> {
        if self.order.is_empty() {
            return Ok(());
        }
        let clauses = self
            .order
            .iter()
            .map(|order| {
                let col = self.identifier(&order.column, false, "column")?;
                Ok(format!("{col} {}", order.direction.as_str().to_ascii_uppercase()))
            })
            .collect::<Result<Vec<_>, QueryError>>()?;
        sql.push_str(" ORDER BY ");
        sql.push_str(&clauses.join(", "));
        Ok(())
    }

    fn append_limit_offset(&self, sql: &mut String) {
        match (self.limit, self.offset) {
            (Some(limit), _) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(_)) => {
                if let Some(unbounded) = self.dialect.unbounded_limit() {
                    sql.push_str(unbounded);
                }
            }
            (None, None) => {}
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
    }

    fn identifier(&self, ident: &str, allow_star: bool, kind: &'static str) -> Result<String, QueryError> {
        match self.identifier_policy {
            IdentifierPolicy::Raw => Ok(ident.to_string()),
            IdentifierPolicy::Validate | IdentifierPolicy::Quote if !is_valid_identifier(ident, allow_star) => {
                Err(QueryError::InvalidIdentifier {
                    kind,
                    ident: ident.to_string(),
                })
            }
            IdentifierPolicy::Validate => Ok(ident.to_string()),
            IdentifierPolicy::Quote => Ok(quote_identifier(ident, self.dialect, allow_star)),
        }
    }
}

/// Bind values collected while rendering, numbered in order of appearance.
struct Params {
    dialect: Dialect,
    values: Vec<String>,
}

impl Params {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            values: Vec::new(),
        }
    }

    fn push(&mut self, value: &str) -> String {
        self.values.push(value.to_string());
        self.dialect.placeholder(self.values.len())
    }
}

#[derive(Debug, Clone)]
pub enum QueryError {
    InvalidIdentifier { kind: &'static str, ident: String },
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::InvalidIdentifier { kind, ident } => {
                write!(f, "Invalid {kind} identifier: {ident}")
            }
        }
    }
}

impl std::error::Error for QueryError {}

fn is_valid_identifier(ident: &str, allow_star: bool) -> bool {
    if ident.is_empty() {
        return false;
    }
    let parts: Vec<&str> = ident.split('.').collect();
    for (idx, part) in parts.iter().enumerate() {
        if allow_star && *part == "*" {
            return idx + 1 == parts.len();
        }
        if !is_valid_segment(part) {
            return false;
        }
    }
    true
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote_identifier(ident: &str, dialect: Dialect, allow_star: bool) -> String {
    let quote = dialect.quote_char();
    let parts: Vec<&str> = ident.split('.').collect();
    let last_idx = parts.len().saturating_sub(1);
    parts
        .into_iter()
        .enumerate()
        .map(|(idx, part)| {
            if allow_star && part == "*" && idx == last_idx {
                part.to_string()
            } else {
                format!("{quote}{part}{quote}")
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_select() {
        let (sql, params) = Select::new("person").build_select().unwrap();
        assert_eq!(sql, "SELECT * FROM person");
        assert!(params.is_empty());
    }

    #[test]
    fn test_filters_search_order_and_page() {
        let (sql, params) = Select::new("person")
            .columns(["id", "first_name"])
            .where_eq("last_name", "silva")
            .where_any_ilike(["first_name", "last_name"], "%jo%")
            .order_by("age", Direction::Asc)
            .order_by("id", Direction::Desc)
            .limit(10)
            .offset(20)
            .build_select()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT id, first_name FROM person WHERE last_name = ? AND \
             (LOWER(first_name) LIKE LOWER(?) OR LOWER(last_name) LIKE LOWER(?)) \
             ORDER BY age ASC, id DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(params, vec!["silva", "%jo%", "%jo%"]);
    }

    #[test]
    fn test_postgres_ilike_and_placeholders() {
        let (sql, params) = Select::new("person")
            .dialect(Dialect::Postgres)
            .where_eq("status", "active")
            .where_in("role", &["admin", "user"])
            .where_any_ilike(["first_name"], "%ana%")
            .build_select()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM person WHERE status = $1 AND role IN ($2, $3) AND (first_name ILIKE $4)"
        );
        assert_eq!(params, vec!["active", "admin", "user", "%ana%"]);
    }

    #[test]
    fn test_text_eq_casts_column_on_postgres() {
        let select = Select::new("person").where_text_eq("age", "30");
        let (sql, params) = select.clone().dialect(Dialect::Postgres).build_select().unwrap();
        assert_eq!(sql, "SELECT * FROM person WHERE CAST(age AS TEXT) = $1");
        assert_eq!(params, vec!["30"]);

        let (sql, _) = select.dialect(Dialect::Sqlite).build_select().unwrap();
        assert_eq!(sql, "SELECT * FROM person WHERE age = ?");
    }

    #[test]
    fn test_text_eq_quotes_inside_cast() {
        let (sql, _) = Select::new("person")
            .dialect(Dialect::Postgres)
            .identifier_policy(IdentifierPolicy::Quote)
            .where_text_eq("person.age", "30")
            .build_count()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM (SELECT * FROM \"person\" WHERE CAST(\"person\".\"age\" AS TEXT) = $1) AS search"
        );
    }

    #[test]
    fn test_empty_ilike_group_is_skipped() {
        let (sql, _) = Select::new("person")
            .where_any_ilike(Vec::<String>::new(), "%x%")
            .build_select()
            .unwrap();
        assert_eq!(sql, "SELECT * FROM person");
    }

    #[test]
    fn test_count_wraps_unpaginated_select() {
        let (sql, params) = Select::new("person")
            .where_eq("active", "true")
            .where_null("deleted_at")
            .order_by("id", Direction::Asc)
            .limit(5)
            .offset(5)
            .build_count()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM (SELECT * FROM person WHERE active = ? AND deleted_at IS NULL) AS search"
        );
        assert_eq!(params, vec!["true"]);
    }

    #[test]
    fn test_offset_without_limit() {
        let select = Select::new("person").offset(30);
        assert_eq!(
            select.clone().dialect(Dialect::Sqlite).build_select().unwrap().0,
            "SELECT * FROM person LIMIT -1 OFFSET 30"
        );
        assert_eq!(
            select.clone().dialect(Dialect::MySql).build_select().unwrap().0,
            "SELECT * FROM person LIMIT 18446744073709551615 OFFSET 30"
        );
        assert_eq!(
            select.dialect(Dialect::Postgres).build_select().unwrap().0,
            "SELECT * FROM person OFFSET 30"
        );
    }

    #[test]
    fn test_quoted_identifiers() {
        let (sql, params) = Select::new("person")
            .dialect(Dialect::Postgres)
            .identifier_policy(IdentifierPolicy::Quote)
            .columns(["person.id", "person.*"])
            .where_eq("person.email", "a@b.com")
            .order_by("person.id", Direction::Asc)
            .build_select()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT \"person\".\"id\", \"person\".* FROM \"person\" WHERE \"person\".\"email\" = $1 ORDER BY \"person\".\"id\" ASC"
        );
        assert_eq!(params, vec!["a@b.com"]);
    }

    #[test]
    fn test_invalid_identifier_rejected_when_validating() {
        let err = Select::new("person")
            .identifier_policy(IdentifierPolicy::Validate)
            .where_eq("name; DROP TABLE person", "x")
            .build_select()
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidIdentifier { kind: "column", .. }));

        let raw = Select::new("person").where_eq("LOWER(name)", "x").build_select();
        assert!(raw.is_ok());
    }

    #[test]
    fn test_dialect_from_url() {
        assert_eq!(Dialect::from_url("sqlite::memory:"), Dialect::Sqlite);
        assert_eq!(Dialect::from_url("postgres://localhost/db"), Dialect::Postgres);
        assert_eq!(Dialect::from_url("mysql://localhost/db"), Dialect::MySql);
        assert_eq!(Dialect::from_url("odbc:whatever"), Dialect::Generic);
    }
}
