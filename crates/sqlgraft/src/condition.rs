//! Predicate primitives for WHERE and HAVING clauses.
//!
//! [`Op`] pairs a comparison operator with its typed operand(s);
//! [`Condition`] applies one to a column; [`WhereExpr`] composes conditions
//! into an AND/OR/NOT tree. Everything renders into a [`Sql`] fragment, so
//! bind order always matches placeholder order.

use crate::dialect::DialectDescriptor;
use crate::error::GraftResult;
use crate::ident::{Ident, IntoIdent};
use crate::sql::Sql;
use crate::value::SqlValue;

/// A comparison operator together with its operand values.
///
/// # Example
/// ```ignore
/// use sqlgraft::Op;
///
/// Op::eq("value")
/// Op::gt(100)
/// Op::like("%pattern%")
/// Op::is_null()
/// Op::in_list([1, 2, 3])
/// Op::between(10, 20)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Equal: column = value
    Eq(SqlValue),
    /// Not equal: column <> value
    Ne(SqlValue),
    /// Greater than: column > value
    Gt(SqlValue),
    /// Greater than or equal: column >= value
    Gte(SqlValue),
    /// Less than: column < value
    Lt(SqlValue),
    /// Less than or equal: column <= value
    Lte(SqlValue),
    /// LIKE pattern match
    Like(SqlValue),
    /// NOT LIKE pattern match
    NotLike(SqlValue),
    /// IS NULL
    IsNull,
    /// IS NOT NULL
    IsNotNull,
    /// IN (list)
    In(Vec<SqlValue>),
    /// NOT IN (list)
    NotIn(Vec<SqlValue>),
    /// BETWEEN a AND b
    Between(SqlValue, SqlValue),
    /// NOT BETWEEN a AND b
    NotBetween(SqlValue, SqlValue),
}

impl Op {
    pub fn eq(val: impl Into<SqlValue>) -> Self {
        Op::Eq(val.into())
    }

    pub fn ne(val: impl Into<SqlValue>) -> Self {
        Op::Ne(val.into())
    }

    pub fn gt(val: impl Into<SqlValue>) -> Self {
        Op::Gt(val.into())
    }

    pub fn gte(val: impl Into<SqlValue>) -> Self {
        Op::Gte(val.into())
    }

    pub fn lt(val: impl Into<SqlValue>) -> Self {
        Op::Lt(val.into())
    }

    pub fn lte(val: impl Into<SqlValue>) -> Self {
        Op::Lte(val.into())
    }

    pub fn like(pattern: impl Into<SqlValue>) -> Self {
        Op::Like(pattern.into())
    }

    pub fn not_like(pattern: impl Into<SqlValue>) -> Self {
        Op::NotLike(pattern.into())
    }

    pub fn is_null() -> Self {
        Op::IsNull
    }

    pub fn is_not_null() -> Self {
        Op::IsNotNull
    }

    pub fn in_list<T>(vals: impl IntoIterator<Item = T>) -> Self
    where
        T: Into<SqlValue>,
    {
        Op::In(vals.into_iter().map(Into::into).collect())
    }

    pub fn not_in<T>(vals: impl IntoIterator<Item = T>) -> Self
    where
        T: Into<SqlValue>,
    {
        Op::NotIn(vals.into_iter().map(Into::into).collect())
    }

    pub fn between(from: impl Into<SqlValue>, to: impl Into<SqlValue>) -> Self {
        Op::Between(from.into(), to.into())
    }

    pub fn not_between(from: impl Into<SqlValue>, to: impl Into<SqlValue>) -> Self {
        Op::NotBetween(from.into(), to.into())
    }

    /// The SQL operator text.
    pub fn sql_operator(&self) -> &'static str {
        match self {
            Op::Eq(_) => "=",
            Op::Ne(_) => "<>",
            Op::Gt(_) => ">",
            Op::Gte(_) => ">=",
            Op::Lt(_) => "<",
            Op::Lte(_) => "<=",
            Op::Like(_) => "LIKE",
            Op::NotLike(_) => "NOT LIKE",
            Op::IsNull => "IS NULL",
            Op::IsNotNull => "IS NOT NULL",
            Op::In(_) => "IN",
            Op::NotIn(_) => "NOT IN",
            Op::Between(_, _) => "BETWEEN",
            Op::NotBetween(_, _) => "NOT BETWEEN",
        }
    }

    /// All operand values, in binding order.
    pub fn operands(&self) -> Vec<&SqlValue> {
        match self {
            Op::Eq(v)
            | Op::Ne(v)
            | Op::Gt(v)
            | Op::Gte(v)
            | Op::Lt(v)
            | Op::Lte(v)
            | Op::Like(v)
            | Op::NotLike(v) => vec![v],
            Op::IsNull | Op::IsNotNull => Vec::new(),
            Op::In(vals) | Op::NotIn(vals) => vals.iter().collect(),
            Op::Between(a, b) | Op::NotBetween(a, b) => vec![a, b],
        }
    }
}

/// Operand storage for a [`Condition`].
#[derive(Debug, Clone)]
enum ConditionValue {
    Single(SqlValue),
    Pair(SqlValue, SqlValue),
    List(Vec<SqlValue>),
    None,
}

#[derive(Debug, Clone)]
enum ConditionInner {
    /// Raw SQL condition (escape hatch).
    ///
    /// # Safety
    /// Be careful with SQL injection when using raw conditions.
    Raw(String),
    /// A structured condition over a validated identifier.
    Expr {
        column: Ident,
        operator: &'static str,
        value: ConditionValue,
    },
}

/// A single predicate over one column.
#[derive(Debug, Clone)]
pub struct Condition(ConditionInner);

impl Condition {
    /// Create a structured condition from a column identifier and operator.
    pub fn new(column: impl IntoIdent, op: Op) -> GraftResult<Self> {
        let column = column.into_ident()?;
        let operator = op.sql_operator();
        let value = match op {
            Op::Eq(v)
            | Op::Ne(v)
            | Op::Gt(v)
            | Op::Gte(v)
            | Op::Lt(v)
            | Op::Lte(v)
            | Op::Like(v)
            | Op::NotLike(v) => ConditionValue::Single(v),
            Op::IsNull | Op::IsNotNull => ConditionValue::None,
            Op::In(vals) => ConditionValue::List(vals),
            Op::NotIn(vals) => ConditionValue::List(vals),
            Op::Between(a, b) | Op::NotBetween(a, b) => ConditionValue::Pair(a, b),
        };

        Ok(Condition(ConditionInner::Expr {
            column,
            operator,
            value,
        }))
    }

    /// Create a raw SQL condition.
    ///
    /// # Safety
    /// Be careful with SQL injection when using raw conditions.
    pub fn raw(sql: impl Into<String>) -> Self {
        Condition(ConditionInner::Raw(sql.into()))
    }

    pub fn eq(column: impl IntoIdent, value: impl Into<SqlValue>) -> GraftResult<Self> {
        Self::new(column, Op::Eq(value.into()))
    }

    pub fn ne(column: impl IntoIdent, value: impl Into<SqlValue>) -> GraftResult<Self> {
        Self::new(column, Op::Ne(value.into()))
    }

    pub fn gt(column: impl IntoIdent, value: impl Into<SqlValue>) -> GraftResult<Self> {
        Self::new(column, Op::Gt(value.into()))
    }

    pub fn gte(column: impl IntoIdent, value: impl Into<SqlValue>) -> GraftResult<Self> {
        Self::new(column, Op::Gte(value.into()))
    }

    pub fn lt(column: impl IntoIdent, value: impl Into<SqlValue>) -> GraftResult<Self> {
        Self::new(column, Op::Lt(value.into()))
    }

    pub fn lte(column: impl IntoIdent, value: impl Into<SqlValue>) -> GraftResult<Self> {
        Self::new(column, Op::Lte(value.into()))
    }

    pub fn like(column: impl IntoIdent, pattern: impl Into<SqlValue>) -> GraftResult<Self> {
        Self::new(column, Op::Like(pattern.into()))
    }

    pub fn is_null(column: impl IntoIdent) -> GraftResult<Self> {
        Self::new(column, Op::IsNull)
    }

    pub fn is_not_null(column: impl IntoIdent) -> GraftResult<Self> {
        Self::new(column, Op::IsNotNull)
    }

    pub fn in_list<T>(
        column: impl IntoIdent,
        values: impl IntoIterator<Item = T>,
    ) -> GraftResult<Self>
    where
        T: Into<SqlValue>,
    {
        Self::new(column, Op::in_list(values))
    }

    pub fn not_in<T>(
        column: impl IntoIdent,
        values: impl IntoIterator<Item = T>,
    ) -> GraftResult<Self>
    where
        T: Into<SqlValue>,
    {
        Self::new(column, Op::not_in(values))
    }

    pub fn between(
        column: impl IntoIdent,
        from: impl Into<SqlValue>,
        to: impl Into<SqlValue>,
    ) -> GraftResult<Self> {
        Self::new(column, Op::between(from, to))
    }

    /// Append this condition into a [`Sql`] fragment, quoting the column
    /// for `dialect`. Binds are appended in operand order.
    pub fn append_to_sql(&self, sql: &mut Sql, dialect: &DialectDescriptor) -> GraftResult<()> {
        match &self.0 {
            ConditionInner::Raw(s) => {
                sql.push(s);
            }
            ConditionInner::Expr {
                column,
                operator,
                value,
            } => match value {
                ConditionValue::List(vals) if vals.is_empty() => {
                    // Empty IN is always false, empty NOT IN always true.
                    if *operator == "IN" {
                        sql.push("1=0");
                    } else {
                        sql.push("1=1");
                    }
                }
                ConditionValue::Single(v) => {
                    sql.push_ident(column, dialect)?;
                    sql.push(" ");
                    sql.push(operator);
                    sql.push(" ");
                    sql.push_bind(v.clone());
                }
                ConditionValue::Pair(a, b) => {
                    sql.push_ident(column, dialect)?;
                    sql.push(" ");
                    sql.push(operator);
                    sql.push(" ");
                    sql.push_bind(a.clone());
                    sql.push(" AND ");
                    sql.push_bind(b.clone());
                }
                ConditionValue::List(vals) => {
                    sql.push_ident(column, dialect)?;
                    sql.push(" ");
                    sql.push(operator);
                    sql.push(" (");
                    for (i, v) in vals.iter().enumerate() {
                        if i > 0 {
                            sql.push(", ");
                        }
                        sql.push_bind(v.clone());
                    }
                    sql.push(")");
                }
                ConditionValue::None => {
                    sql.push_ident(column, dialect)?;
                    sql.push(" ");
                    sql.push(operator);
                }
            },
        }
        Ok(())
    }
}

/// Boolean expression tree for WHERE clauses.
///
/// # Example
/// ```ignore
/// use sqlgraft::{Condition, WhereExpr};
///
/// let expr = WhereExpr::And(vec![
///     WhereExpr::Atom(Condition::eq("STATUS", "active")?),
///     WhereExpr::Or(vec![
///         WhereExpr::Atom(Condition::eq("ROLE", "admin")?),
///         WhereExpr::Atom(Condition::eq("ROLE", "owner")?),
///     ]),
/// ]);
/// ```
#[derive(Debug, Clone)]
pub enum WhereExpr {
    /// A single condition.
    Atom(Condition),
    /// All sub-expressions must hold. Empty is the identity `TRUE`.
    And(Vec<WhereExpr>),
    /// Any sub-expression must hold. Empty is the identity `FALSE`.
    Or(Vec<WhereExpr>),
    /// Negation.
    Not(Box<WhereExpr>),
    /// Raw SQL (escape hatch, no binds).
    Raw(String),
}

impl WhereExpr {
    pub fn atom(condition: Condition) -> Self {
        WhereExpr::Atom(condition)
    }

    pub fn and(exprs: Vec<WhereExpr>) -> Self {
        WhereExpr::And(exprs)
    }

    pub fn or(exprs: Vec<WhereExpr>) -> Self {
        WhereExpr::Or(exprs)
    }

    pub fn not(expr: WhereExpr) -> Self {
        WhereExpr::Not(Box::new(expr))
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        WhereExpr::Raw(sql.into())
    }

    /// Combine this expression with another using AND.
    pub fn and_with(self, other: WhereExpr) -> WhereExpr {
        match self {
            WhereExpr::And(mut exprs) => {
                exprs.push(other);
                WhereExpr::And(exprs)
            }
            _ => WhereExpr::And(vec![self, other]),
        }
    }

    /// Combine this expression with another using OR.
    pub fn or_with(self, other: WhereExpr) -> WhereExpr {
        match self {
            WhereExpr::Or(mut exprs) => {
                exprs.push(other);
                WhereExpr::Or(exprs)
            }
            _ => WhereExpr::Or(vec![self, other]),
        }
    }

    /// Returns `true` if this expression is the identity `TRUE` (i.e. `AND([])`).
    pub fn is_trivially_true(&self) -> bool {
        matches!(self, WhereExpr::And(exprs) if exprs.is_empty())
    }

    /// Append this expression to a SQL fragment.
    ///
    /// Parentheses are added around compound expressions to ensure correct
    /// precedence.
    pub fn append_to_sql(&self, sql: &mut Sql, dialect: &DialectDescriptor) -> GraftResult<()> {
        match self {
            WhereExpr::Atom(cond) => {
                cond.append_to_sql(sql, dialect)?;
            }
            WhereExpr::And(exprs) => {
                if exprs.is_empty() {
                    sql.push("TRUE");
                } else if exprs.len() == 1 {
                    exprs[0].append_to_sql(sql, dialect)?;
                } else {
                    sql.push("(");
                    for (i, expr) in exprs.iter().enumerate() {
                        if i > 0 {
                            sql.push(" AND ");
                        }
                        expr.append_to_sql(sql, dialect)?;
                    }
                    sql.push(")");
                }
            }
            WhereExpr::Or(exprs) => {
                if exprs.is_empty() {
                    sql.push("FALSE");
                } else if exprs.len() == 1 {
                    exprs[0].append_to_sql(sql, dialect)?;
                } else {
                    sql.push("(");
                    for (i, expr) in exprs.iter().enumerate() {
                        if i > 0 {
                            sql.push(" OR ");
                        }
                        expr.append_to_sql(sql, dialect)?;
                    }
                    sql.push(")");
                }
            }
            WhereExpr::Not(expr) => {
                sql.push("(NOT ");
                expr.append_to_sql(sql, dialect)?;
                sql.push(")");
            }
            WhereExpr::Raw(s) => {
                sql.push(s);
            }
        }
        Ok(())
    }
}

impl From<Condition> for WhereExpr {
    fn from(cond: Condition) -> Self {
        WhereExpr::Atom(cond)
    }
}
