//! Result materialization: flat joined rows back into entity graphs.
//!
//! A query with expanded collection navigations duplicates root columns
//! across child rows. [`materialize`] folds that stream back: rows group by
//! the root entity's key, child graphs deduplicate per parent by their own
//! key, and both keep relative first-seen order. Grouping reads the
//! alias-qualified column labels the compiler projected, so a plan and its
//! rows always travel together.

use crate::compiler::{MaterializePlan, PlanNode};
use crate::error::{GraftError, GraftResult};
use crate::value::SqlValue;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// One flat result row, keyed by column label (e.g. `ID_T0`).
///
/// Execution is external to this crate; the driver layer converts its rows
/// into this shape before handing them over.
#[derive(Debug, Clone, Default)]
pub struct ResultRow(BTreeMap<String, SqlValue>);

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and fixtures.
    pub fn with(mut self, label: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(label, value);
        self
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<SqlValue>) {
        self.0.insert(label.into(), value.into());
    }

    pub fn get(&self, label: &str) -> Option<&SqlValue> {
        self.0.get(label)
    }
}

impl FromIterator<(String, SqlValue)> for ResultRow {
    fn from_iter<I: IntoIterator<Item = (String, SqlValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One materialized entity with its nested children.
///
/// Children sit in a list per navigation name even for single-valued
/// navigations, which then hold at most one element. Expanded navigations
/// are always present, so a root with no matching children serializes with
/// an empty list rather than a missing field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityGraph {
    pub entity: String,
    /// Projected scalar properties by entity-level name.
    pub properties: BTreeMap<String, SqlValue>,
    pub children: BTreeMap<String, Vec<EntityGraph>>,
}

/// Hashable stand-in for one key column value. Doubles are compared by
/// bit pattern; keys should not be doubles, but grouping must still
/// terminate if they are.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Null,
    Bool(bool),
    Int(i64),
    DoubleBits(u64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

impl From<&SqlValue> for KeyPart {
    fn from(value: &SqlValue) -> Self {
        match value {
            SqlValue::Null => KeyPart::Null,
            SqlValue::Bool(v) => KeyPart::Bool(*v),
            SqlValue::Int(v) => KeyPart::Int(*v),
            SqlValue::Double(v) => KeyPart::DoubleBits(v.to_bits()),
            SqlValue::Decimal(v) => KeyPart::Decimal(*v),
            SqlValue::Text(v) => KeyPart::Text(v.clone()),
            SqlValue::Bytes(v) => KeyPart::Bytes(v.clone()),
            SqlValue::Date(v) => KeyPart::Date(*v),
            SqlValue::Time(v) => KeyPart::Time(*v),
            SqlValue::Timestamp(v) => KeyPart::Timestamp(*v),
            SqlValue::Uuid(v) => KeyPart::Uuid(*v),
        }
    }
}

type GroupKey = Vec<KeyPart>;

/// Fold flat rows into entity graphs per the compiled plan.
///
/// An all-NULL key at any node means "no entity here" (the left-join
/// no-match case); the node and everything nested under it are skipped for
/// that row. A row missing one of the plan's key labels is a `Schema`
/// error naming the label. An empty plan (count queries) yields no graphs.
pub fn materialize(plan: &MaterializePlan, rows: &[ResultRow]) -> GraftResult<Vec<EntityGraph>> {
    if plan.is_empty() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<Option<EntityGraph>> = Vec::new();
    let mut child_ids: Vec<BTreeMap<String, Vec<usize>>> = Vec::new();
    let mut index: HashMap<(Option<usize>, usize, GroupKey), usize> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();
    let mut row_entry: Vec<Option<usize>> = vec![None; plan.nodes.len()];

    for row in rows {
        row_entry.fill(None);
        for (node_index, node) in plan.nodes.iter().enumerate() {
            let parent_entry = match node.parent {
                Some(parent) => match row_entry[parent] {
                    Some(entry) => Some(entry),
                    // No parent entity in this row, so no child either.
                    None => continue,
                },
                None => None,
            };
            let Some(key) = read_key(row, node)? else {
                continue;
            };

            let slot = (parent_entry, node_index, key);
            let entry = match index.get(&slot) {
                Some(&entry) => entry,
                None => {
                    let entry = entries.len();
                    entries.push(Some(new_entry(row, node, plan, node_index)));
                    child_ids.push(BTreeMap::new());
                    index.insert(slot, entry);
                    match parent_entry {
                        Some(parent) => {
                            let navigation = node.navigation.clone().ok_or_else(|| {
                                GraftError::schema(
                                    node.path.as_str(),
                                    "plan node has a parent but no navigation name",
                                )
                            })?;
                            child_ids[parent].entry(navigation).or_default().push(entry);
                        }
                        None => roots.push(entry),
                    }
                    entry
                }
            };
            row_entry[node_index] = Some(entry);
        }
    }

    let mut graphs = Vec::with_capacity(roots.len());
    for root in roots {
        graphs.push(assemble(root, &mut entries, &child_ids)?);
    }
    Ok(graphs)
}

/// Read a node's key from the row. `None` means every key column was NULL.
fn read_key(row: &ResultRow, node: &PlanNode) -> GraftResult<Option<GroupKey>> {
    let mut key = Vec::with_capacity(node.key_labels.len());
    let mut all_null = true;
    for label in &node.key_labels {
        let value = row.get(label).ok_or_else(|| {
            GraftError::schema(label.as_str(), "result row is missing this key column")
        })?;
        if !value.is_null() {
            all_null = false;
        }
        key.push(KeyPart::from(value));
    }
    Ok(if all_null { None } else { Some(key) })
}

/// Build a fresh graph for one entity occurrence. Properties the row does
/// not carry are left out rather than fabricated as NULL. Child lists are
/// seeded empty for every expanded navigation under this node.
fn new_entry(
    row: &ResultRow,
    node: &PlanNode,
    plan: &MaterializePlan,
    index: usize,
) -> EntityGraph {
    let mut properties = BTreeMap::new();
    for (name, label) in &node.fields {
        if let Some(value) = row.get(label) {
            properties.insert(name.clone(), value.clone());
        }
    }
    let mut children = BTreeMap::new();
    for (_, child) in plan.children_of(index) {
        if let Some(navigation) = &child.navigation {
            children.insert(navigation.clone(), Vec::new());
        }
    }
    EntityGraph {
        entity: node.entity.clone(),
        properties,
        children,
    }
}

fn assemble(
    id: usize,
    entries: &mut [Option<EntityGraph>],
    child_ids: &[BTreeMap<String, Vec<usize>>],
) -> GraftResult<EntityGraph> {
    let mut graph = entries[id]
        .take()
        .ok_or_else(|| GraftError::schema("", "plan attaches one entity to two parents"))?;
    for (navigation, ids) in &child_ids[id] {
        let slot = graph.children.entry(navigation.clone()).or_default();
        for &child in ids {
            slot.push(assemble(child, entries, child_ids)?);
        }
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::dialect::DialectDescriptor;
    use crate::model::{EntityDef, EntityModel, JoinPair, Multiplicity, NavigationDef, PropertyDef};
    use crate::query::QueryRequest;
    use crate::value::ValueType;

    fn model() -> EntityModel {
        EntityModel::new(1)
            .with_entity(
                EntityDef::new("Orders", "ORDERS")
                    .with_key(&["Id"])
                    .with_property(PropertyDef::new("Id", "ID", ValueType::Int))
                    .with_property(PropertyDef::new("Price", "PRICE", ValueType::Decimal))
                    .with_navigation(NavigationDef::new(
                        "OrderItems",
                        "OrderItems",
                        vec![JoinPair::new("ID", "ORDER_ID")],
                        Multiplicity::OneToMany,
                    ))
                    .with_navigation(
                        NavigationDef::new(
                            "Customer",
                            "Customers",
                            vec![JoinPair::new("CUSTOMER_ID", "ID")],
                            Multiplicity::ManyToOne,
                        )
                        .required(),
                    ),
            )
            .with_entity(
                EntityDef::new("OrderItems", "ORDER_ITEMS")
                    .with_key(&["Id"])
                    .with_property(PropertyDef::new("Id", "ID", ValueType::Int))
                    .with_property(PropertyDef::new("Sku", "SKU", ValueType::Text))
                    .with_navigation(NavigationDef::new(
                        "Product",
                        "Products",
                        vec![JoinPair::new("PRODUCT_ID", "ID")],
                        Multiplicity::ManyToOne,
                    )),
            )
            .with_entity(
                EntityDef::new("Customers", "CUSTOMERS")
                    .with_key(&["Id"])
                    .with_property(PropertyDef::new("Id", "ID", ValueType::Int))
                    .with_property(PropertyDef::new("Name", "NAME", ValueType::Text)),
            )
            .with_entity(
                EntityDef::new("Products", "PRODUCTS")
                    .with_key(&["Id"])
                    .with_property(PropertyDef::new("Id", "ID", ValueType::Int)),
            )
    }

    fn plan_for(expand: &[&str]) -> MaterializePlan {
        let model = model();
        let mut request = QueryRequest::new("Orders");
        for path in expand {
            request = request.expand(path).unwrap();
        }
        compile(&model, &request, &DialectDescriptor::postgres()).unwrap().plan
    }

    #[test]
    fn groups_duplicate_root_rows() {
        let plan = plan_for(&["OrderItems"]);
        let rows = vec![
            ResultRow::new()
                .with("ID_T0", 1_i64)
                .with("PRICE_T0", 150_i64)
                .with("ID_T1", 10_i64)
                .with("SKU_T1", "A"),
            ResultRow::new()
                .with("ID_T0", 1_i64)
                .with("PRICE_T0", 150_i64)
                .with("ID_T1", 11_i64)
                .with("SKU_T1", "B"),
        ];
        let graphs = materialize(&plan, &rows).unwrap();
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].properties["Id"], SqlValue::Int(1));
        let items = &graphs[0].children["OrderItems"];
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].properties["Id"], SqlValue::Int(10));
        assert_eq!(items[1].properties["Id"], SqlValue::Int(11));
    }

    #[test]
    fn repeated_child_rows_deduplicate() {
        let plan = plan_for(&["OrderItems"]);
        let row = ResultRow::new()
            .with("ID_T0", 1_i64)
            .with("PRICE_T0", 150_i64)
            .with("ID_T1", 10_i64)
            .with("SKU_T1", "A");
        let rows = vec![row.clone(), row];
        let graphs = materialize(&plan, &rows).unwrap();
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].children["OrderItems"].len(), 1);
    }

    #[test]
    fn first_seen_order_is_preserved() {
        let plan = plan_for(&[]);
        let rows = vec![
            ResultRow::new().with("ID_T0", 2_i64).with("PRICE_T0", 20_i64),
            ResultRow::new().with("ID_T0", 1_i64).with("PRICE_T0", 10_i64),
            ResultRow::new().with("ID_T0", 2_i64).with("PRICE_T0", 20_i64),
        ];
        let graphs = materialize(&plan, &rows).unwrap();
        let ids: Vec<_> = graphs.iter().map(|g| g.properties["Id"].clone()).collect();
        assert_eq!(ids, [SqlValue::Int(2), SqlValue::Int(1)]);
    }

    #[test]
    fn all_null_child_key_contributes_no_child() {
        let plan = plan_for(&["OrderItems"]);
        let rows = vec![
            ResultRow::new()
                .with("ID_T0", 1_i64)
                .with("PRICE_T0", 150_i64)
                .with("ID_T1", SqlValue::Null)
                .with("SKU_T1", SqlValue::Null),
        ];
        let graphs = materialize(&plan, &rows).unwrap();
        assert_eq!(graphs.len(), 1);
        assert!(graphs[0].children["OrderItems"].is_empty());
    }

    #[test]
    fn missing_key_label_names_it() {
        let plan = plan_for(&[]);
        let rows = vec![ResultRow::new().with("PRICE_T0", 10_i64)];
        let err = materialize(&plan, &rows).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("ID_T0"));
    }

    #[test]
    fn nested_expansion_attaches_grandchildren() {
        let plan = plan_for(&["OrderItems/Product"]);
        let rows = vec![
            ResultRow::new()
                .with("ID_T0", 1_i64)
                .with("PRICE_T0", 150_i64)
                .with("ID_T1", 10_i64)
                .with("SKU_T1", "A")
                .with("ID_T2", 7_i64),
            ResultRow::new()
                .with("ID_T0", 1_i64)
                .with("PRICE_T0", 150_i64)
                .with("ID_T1", 11_i64)
                .with("SKU_T1", "B")
                .with("ID_T2", 7_i64),
        ];
        let graphs = materialize(&plan, &rows).unwrap();
        let items = &graphs[0].children["OrderItems"];
        assert_eq!(items.len(), 2);
        // The same product appears under each item; dedup is per parent.
        assert_eq!(items[0].children["Product"].len(), 1);
        assert_eq!(items[1].children["Product"].len(), 1);
        assert_eq!(items[0].children["Product"][0].properties["Id"], SqlValue::Int(7));
    }

    #[test]
    fn single_valued_navigation_holds_one_child() {
        let plan = plan_for(&["Customer", "OrderItems"]);
        let rows = vec![
            ResultRow::new()
                .with("ID_T0", 1_i64)
                .with("PRICE_T0", 150_i64)
                .with("ID_T1", 5_i64)
                .with("NAME_T1", "ACME")
                .with("ID_T2", 10_i64)
                .with("SKU_T2", "A"),
            ResultRow::new()
                .with("ID_T0", 1_i64)
                .with("PRICE_T0", 150_i64)
                .with("ID_T1", 5_i64)
                .with("NAME_T1", "ACME")
                .with("ID_T2", 11_i64)
                .with("SKU_T2", "B"),
        ];
        let graphs = materialize(&plan, &rows).unwrap();
        assert_eq!(graphs[0].children["Customer"].len(), 1);
        assert_eq!(graphs[0].children["OrderItems"].len(), 2);
    }

    #[test]
    fn skipped_rows_leave_later_roots_intact() {
        let plan = plan_for(&[]);
        let rows = vec![
            ResultRow::new().with("ID_T0", SqlValue::Null).with("PRICE_T0", 1_i64),
            ResultRow::new().with("ID_T0", 3_i64).with("PRICE_T0", 30_i64),
        ];
        let graphs = materialize(&plan, &rows).unwrap();
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].properties["Id"], SqlValue::Int(3));
    }

    #[test]
    fn empty_inputs_yield_no_graphs() {
        let plan = plan_for(&[]);
        assert!(materialize(&plan, &[]).unwrap().is_empty());

        let empty = MaterializePlan { nodes: Vec::new() };
        let rows = vec![ResultRow::new().with("COUNT", 9_i64)];
        assert!(materialize(&empty, &rows).unwrap().is_empty());
    }

    #[test]
    fn graphs_serialize_for_the_response_layer() {
        let plan = plan_for(&["OrderItems"]);
        let rows = vec![
            ResultRow::new()
                .with("ID_T0", 1_i64)
                .with("PRICE_T0", 150_i64)
                .with("ID_T1", 10_i64)
                .with("SKU_T1", "A"),
        ];
        let graphs = materialize(&plan, &rows).unwrap();
        let json = serde_json::to_value(&graphs).unwrap();
        assert_eq!(json[0]["entity"], "Orders");
        assert_eq!(json[0]["properties"]["Id"]["Int"], 1);
        assert_eq!(json[0]["children"]["OrderItems"][0]["properties"]["Sku"]["Text"], "A");
    }
}
