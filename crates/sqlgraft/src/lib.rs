//! # sqlgraft
//!
//! A dialect-agnostic entity-query-to-SQL compiler for Rust.
//!
//! ## Features
//!
//! - **Dialect as data**: one [`DialectDescriptor`] value per database
//!   (quoting, reserved words, pagination style, placeholder style) instead
//!   of a dialect class hierarchy
//! - **Statement builders**: SELECT/INSERT/UPDATE/DELETE plus table, view,
//!   index and sequence DDL, all rendering through the same accumulator
//! - **Entity queries**: [`QueryRequest`] with filter, expand, select,
//!   orderby and paging compiles to one parameterized SELECT
//! - **Deterministic aliases**: `T0`, `T1`, ... assigned per navigation
//!   path, stable across compilations of the same request
//! - **Materialization**: flat joined rows fold back into entity graphs,
//!   deduplicated by declared keys in first-seen order
//! - **Hot-swappable model**: [`ModelHandle`] swaps the entity model
//!   atomically; in-flight compilations keep their snapshot
//! - **Safe defaults**: DELETE requires WHERE, UPDATE requires SET,
//!   parameters are never inlined into SQL text
//!
//! ## Compiling a query
//!
//! ```ignore
//! use sqlgraft::{DialectDescriptor, Filter, QueryRequest, compile};
//!
//! let request = QueryRequest::new("Orders")
//!     .expand("OrderItems")?
//!     .filter(Filter::gt("Price", 100))
//!     .order_by_desc("Created")
//!     .top(10);
//!
//! let compiled = compile(&model, &request, &DialectDescriptor::postgres())?;
//! // compiled.sql:    SELECT T0.ID AS "ID_T0", ... FROM ORDERS T0
//! //                  LEFT JOIN ORDER_ITEMS T1 ON T0.ID = T1.ORDER_ID
//! //                  WHERE T0.PRICE > $1 ORDER BY T0.CREATED DESC LIMIT 10
//! // compiled.params: [SqlValue::Int(100)]
//! ```
//!
//! ## Building statements directly
//!
//! ```ignore
//! use sqlgraft::{Condition, DialectDescriptor, ParamBuilder, SelectBuilder};
//!
//! let statement = SelectBuilder::new()
//!     .column("name")?
//!     .from("users")?
//!     .and_where(Condition::eq("status", "active")?)
//!     .top(10)
//!     .build(&DialectDescriptor::postgres())?;
//! ```

pub mod builder;
pub mod compiler;
pub mod condition;
pub mod defs;
pub mod dialect;
pub mod error;
pub mod ident;
pub mod materialize;
pub mod model;
pub mod query;
pub mod sql;
pub mod value;

pub use builder::{
    CreateIndexBuilder, CreateSequenceBuilder, CreateTableBuilder, CreateViewBuilder,
    DeleteBuilder, DropIndexBuilder, DropSequenceBuilder, DropTableBuilder, DropViewBuilder,
    InsertBuilder, Join, JoinKind, NextValue, OrderBy, OrderItem, Pagination, ParamBuilder,
    SelectBuilder, SortDir, SqlBuilder, Statement, UpdateBuilder,
};
pub use compiler::{
    CompiledQuery, CompilerOptions, MaterializePlan, PlanNode, compile, compile_count,
    compile_count_with, compile_with,
};
pub use condition::{Condition, Op, WhereExpr};
pub use defs::{
    CheckDef, ColumnDef, ForeignKeyDef, IndexDef, SequenceDef, TableDef, UniqueDef, ViewDef,
};
pub use dialect::{DialectDescriptor, DialectRegistry, PaginationStyle, PlaceholderStyle};
pub use error::{GraftError, GraftResult};
pub use ident::{Ident, IntoIdent};
pub use materialize::{EntityGraph, ResultRow, materialize};
pub use model::{
    EntityDef, EntityModel, JoinPair, ModelHandle, Multiplicity, NavigationDef, PropertyDef,
};
pub use query::{ExpandPath, Filter, OrderKey, QueryRequest};
pub use sql::Sql;
pub use value::{SqlValue, ValueType};
