//! Query compiler: entity requests to dialect SQL and a materialization
//! plan.
//!
//! Compilation is a linear pipeline with no backtracking: the entity set is
//! validated, expand paths resolve to aliases and joins, the filter becomes
//! a parameterized predicate, projection and ordering are checked against
//! the model, pagination is applied and the statement renders for the
//! target dialect. Any stage failure aborts the whole compilation; partial
//! SQL is never returned.
//!
//! Compilation is a pure function of its three inputs. There is no shared
//! mutable state, so compiling from many threads against the same model
//! snapshot needs no locking.

pub(crate) mod expand;
pub(crate) mod filter;

use crate::builder::{OrderItem, Pagination, ParamBuilder, SelectBuilder};
use crate::dialect::DialectDescriptor;
use crate::error::{GraftError, GraftResult};
use crate::ident::Ident;
use crate::model::{EntityModel, PropertyDef};
use crate::query::QueryRequest;
use crate::value::SqlValue;
use expand::ExpandTree;
use std::collections::BTreeMap;

/// Compiler tuning knobs, threaded explicitly through the entry points.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Maximum navigation hops a single expand path may take.
    pub max_expand_depth: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self { max_expand_depth: 4 }
    }
}

/// One node of the materialization plan: where an entity occurrence's
/// columns live in the flat result rows.
#[derive(Debug, Clone)]
pub struct PlanNode {
    /// Navigation path from the root; empty for the root.
    pub path: String,
    pub alias: String,
    pub entity: String,
    /// Labels carrying this node's key values, in key declaration order.
    pub key_labels: Vec<String>,
    /// Property name and column label for every projected property.
    pub fields: Vec<(String, String)>,
    /// Index of the parent plan node; `None` for the root.
    pub parent: Option<usize>,
    /// Navigation name this node nests under in its parent.
    pub navigation: Option<String>,
    /// Collection navigations nest as lists, single-valued ones as one
    /// child graph.
    pub collection: bool,
}

/// Tells the materializer how to fold flat rows back into entity graphs.
#[derive(Debug, Clone)]
pub struct MaterializePlan {
    /// Nodes in alias allocation order; the root is first when present.
    pub nodes: Vec<PlanNode>,
}

impl MaterializePlan {
    pub fn root(&self) -> Option<&PlanNode> {
        self.nodes.first()
    }

    /// Direct children of the node at `index`, with their own indices.
    pub fn children_of(&self, index: usize) -> impl Iterator<Item = (usize, &PlanNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.parent == Some(index))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A fully rendered query: SQL text, bound parameters and the context the
/// caller needs to execute it and fold the rows back.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub sql: String,
    /// Bind parameters in placeholder order.
    pub params: Vec<SqlValue>,
    /// Expand path to table alias; the empty path is the root.
    pub alias_map: BTreeMap<String, String>,
    pub root_alias: String,
    pub plan: MaterializePlan,
}

/// Compile `request` against a model snapshot with default options.
pub fn compile(
    model: &EntityModel,
    request: &QueryRequest,
    dialect: &DialectDescriptor,
) -> GraftResult<CompiledQuery> {
    compile_with(model, request, dialect, &CompilerOptions::default())
}

/// Compile `request` against a model snapshot.
pub fn compile_with(
    model: &EntityModel,
    request: &QueryRequest,
    dialect: &DialectDescriptor,
    options: &CompilerOptions,
) -> GraftResult<CompiledQuery> {
    #[cfg(feature = "tracing")]
    tracing::debug!(
        entity_set = %request.entity_set,
        dialect = dialect.name(),
        "compiling query"
    );

    let root = model.entity(&request.entity_set)?;
    let tree = expand::resolve(model, root, &request.expand, options.max_expand_depth)?;
    let joins = expand::build_joins(model, &tree)?;

    let mut builder =
        SelectBuilder::new().from_as(root.table.as_str(), tree.root().alias.as_str())?;
    for join in joins {
        builder = builder.join(join);
    }
    if let Some(filter) = &request.filter {
        builder = builder.and_where(filter::translate(model, &tree, filter)?);
    }

    let (builder, plan) = build_projection(model, &tree, request, builder)?;
    let builder = build_ordering(model, &tree, request, builder)?.pagination(Pagination {
        top: request.top,
        skip: request.skip,
    });

    let statement = builder.build(dialect)?;

    #[cfg(feature = "tracing")]
    tracing::trace!(
        sql = %statement.sql,
        params = statement.params.len(),
        "query rendered"
    );

    Ok(CompiledQuery {
        sql: statement.sql,
        params: statement.params,
        alias_map: alias_map(&tree),
        root_alias: tree.root().alias.clone(),
        plan,
    })
}

/// Compile a row-count query: `SELECT COUNT(*)` over the same FROM, joins
/// and WHERE, with projection, ordering and pagination dropped. The
/// returned plan is empty; count rows are not entity graphs.
pub fn compile_count(
    model: &EntityModel,
    request: &QueryRequest,
    dialect: &DialectDescriptor,
) -> GraftResult<CompiledQuery> {
    compile_count_with(model, request, dialect, &CompilerOptions::default())
}

pub fn compile_count_with(
    model: &EntityModel,
    request: &QueryRequest,
    dialect: &DialectDescriptor,
    options: &CompilerOptions,
) -> GraftResult<CompiledQuery> {
    let root = model.entity(&request.entity_set)?;
    let tree = expand::resolve(model, root, &request.expand, options.max_expand_depth)?;
    let joins = expand::build_joins(model, &tree)?;

    let mut builder = SelectBuilder::new()
        .column_raw("COUNT(*)")
        .from_as(root.table.as_str(), tree.root().alias.as_str())?;
    for join in joins {
        builder = builder.join(join);
    }
    if let Some(filter) = &request.filter {
        builder = builder.and_where(filter::translate(model, &tree, filter)?);
    }

    let statement = builder.build(dialect)?;
    Ok(CompiledQuery {
        sql: statement.sql,
        params: statement.params,
        alias_map: alias_map(&tree),
        root_alias: tree.root().alias.clone(),
        plan: MaterializePlan { nodes: Vec::new() },
    })
}

fn alias_map(tree: &ExpandTree) -> BTreeMap<String, String> {
    tree.nodes
        .iter()
        .map(|node| (node.path.clone(), node.alias.clone()))
        .collect()
}

/// Projection: explicit root selects in request order (keys appended),
/// every other node its full selectable set plus keys. Labels follow the
/// `<column>_<alias>` scheme the materializer keys on.
fn build_projection(
    model: &EntityModel,
    tree: &ExpandTree,
    request: &QueryRequest,
    mut builder: SelectBuilder,
) -> GraftResult<(SelectBuilder, MaterializePlan)> {
    let mut root_selected: Vec<&PropertyDef> = Vec::new();
    for name in &request.select {
        let (alias, property) = filter::resolve_property(model, tree, name)?;
        if !property.selectable {
            return Err(GraftError::schema(
                name,
                format!("property '{}' is not selectable", property.name),
            ));
        }
        // Select entries naming expanded children are validated but do not
        // narrow the child projection; children always carry everything
        // the materializer may need.
        if alias == tree.root().alias && !root_selected.iter().any(|p| p.name == property.name) {
            root_selected.push(property);
        }
    }

    let mut nodes = Vec::with_capacity(tree.nodes.len());
    for node in &tree.nodes {
        let entity = model.entity(&node.entity)?;

        let mut projected: Vec<&PropertyDef> = if node.parent.is_none() && !root_selected.is_empty()
        {
            root_selected.clone()
        } else {
            entity.selectable_properties().collect()
        };
        // Keys are always projected; the materializer needs identity even
        // when the caller did not ask for it.
        for key in entity.key_properties()? {
            if !projected.iter().any(|p| p.name == key.name) {
                projected.push(key);
            }
        }

        let mut fields = Vec::with_capacity(projected.len());
        for property in &projected {
            let label = format!("{}_{}", property.column, node.alias);
            builder = builder.column_as(
                format!("{}.{}", node.alias, property.column),
                label.as_str(),
            )?;
            fields.push((property.name.clone(), label));
        }
        let key_labels = entity
            .key_properties()?
            .into_iter()
            .map(|key| format!("{}_{}", key.column, node.alias))
            .collect();

        nodes.push(PlanNode {
            path: node.path.clone(),
            alias: node.alias.clone(),
            entity: entity.name.clone(),
            key_labels,
            fields,
            parent: node.parent,
            navigation: node.navigation.as_ref().map(|n| n.name.clone()),
            collection: node.navigation.as_ref().is_some_and(|n| n.multiplicity.is_collection()),
        });
    }

    Ok((builder, MaterializePlan { nodes }))
}

fn build_ordering(
    model: &EntityModel,
    tree: &ExpandTree,
    request: &QueryRequest,
    mut builder: SelectBuilder,
) -> GraftResult<SelectBuilder> {
    for key in &request.orderby {
        let (alias, property) = filter::resolve_property(model, tree, &key.property)?;
        if !property.sortable {
            return Err(GraftError::schema(
                key.property.as_str(),
                format!("property '{}' is not sortable", property.name),
            ));
        }
        let column = Ident::parse(&format!("{alias}.{}", property.column))?;
        builder = builder.order_item(OrderItem::new(column, key.dir));
    }
    Ok(builder)
}
