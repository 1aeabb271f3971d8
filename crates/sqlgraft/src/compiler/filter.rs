//! Filter translation: entity property paths to aliased column predicates.

use crate::compiler::expand::ExpandTree;
use crate::condition::{Condition, Op, WhereExpr};
use crate::error::{GraftError, GraftResult};
use crate::model::{EntityModel, PropertyDef};
use crate::query::Filter;

/// Resolve a property path like `OrderItems/Price` to the alias of the
/// owning node and the property definition.
///
/// The navigation prefix must already be present in the expand tree;
/// filters and orderings never introduce joins of their own.
pub(crate) fn resolve_property<'m, 't>(
    model: &'m EntityModel,
    tree: &'t ExpandTree,
    path: &str,
) -> GraftResult<(&'t str, &'m PropertyDef)> {
    let (prefix, name) = match path.rsplit_once('/') {
        Some((prefix, name)) => (prefix, name),
        None => ("", path),
    };
    let node = tree.node_at(prefix).ok_or_else(|| {
        GraftError::schema(
            path,
            format!("navigation '{prefix}' is not expanded in this query"),
        )
    })?;
    let entity = model.entity(&node.entity)?;
    let property = entity
        .property(name)
        .ok_or_else(|| GraftError::unknown_property(path))?;
    Ok((node.alias.as_str(), property))
}

/// Every literal operand must be comparable with the property's declared
/// type. NULL literals are rejected here; null tests have their own
/// operators.
fn check_operands(path: &str, property: &PropertyDef, op: &Op) -> GraftResult<()> {
    for operand in op.operands() {
        let Some(value_type) = operand.value_type() else {
            return Err(GraftError::malformed_filter(format!(
                "cannot compare '{path}' with a NULL literal, use an is-null check"
            )));
        };
        if !property.value_type.is_comparable_with(value_type) {
            return Err(GraftError::malformed_filter(format!(
                "cannot compare {} property '{path}' with a {} literal",
                property.value_type, value_type
            )));
        }
    }
    Ok(())
}

/// Translate a filter tree into a predicate over aliased columns.
pub(crate) fn translate(
    model: &EntityModel,
    tree: &ExpandTree,
    filter: &Filter,
) -> GraftResult<WhereExpr> {
    match filter {
        Filter::Compare { path, op } => {
            let (alias, property) = resolve_property(model, tree, path)?;
            if !property.filterable {
                return Err(GraftError::schema(
                    path,
                    format!("property '{}' is not filterable", property.name),
                ));
            }
            check_operands(path, property, op)?;
            let condition = Condition::new(format!("{alias}.{}", property.column), op.clone())?;
            Ok(WhereExpr::from(condition))
        }
        Filter::And(children) => {
            if children.is_empty() {
                return Err(GraftError::malformed_filter("empty 'and' group"));
            }
            let exprs = children
                .iter()
                .map(|child| translate(model, tree, child))
                .collect::<GraftResult<Vec<_>>>()?;
            Ok(WhereExpr::And(exprs))
        }
        Filter::Or(children) => {
            if children.is_empty() {
                return Err(GraftError::malformed_filter("empty 'or' group"));
            }
            let exprs = children
                .iter()
                .map(|child| translate(model, tree, child))
                .collect::<GraftResult<Vec<_>>>()?;
            Ok(WhereExpr::Or(exprs))
        }
        Filter::Not(inner) => Ok(WhereExpr::not(translate(model, tree, inner)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::expand;
    use crate::dialect::{DialectDescriptor, PlaceholderStyle};
    use crate::model::{EntityDef, JoinPair, Multiplicity, NavigationDef, PropertyDef};
    use crate::query::ExpandPath;
    use crate::sql::Sql;
    use crate::value::ValueType;

    fn model() -> EntityModel {
        EntityModel::new(1)
            .with_entity(
                EntityDef::new("Orders", "ORDERS")
                    .with_key(&["Id"])
                    .with_property(PropertyDef::new("Id", "ID", ValueType::Int))
                    .with_property(PropertyDef::new("Status", "STATUS", ValueType::Text))
                    .with_property(
                        PropertyDef::new("Secret", "SECRET", ValueType::Text)
                            .with_filterable(false),
                    )
                    .with_navigation(NavigationDef::new(
                        "OrderItems",
                        "OrderItems",
                        vec![JoinPair::new("ID", "ORDER_ID")],
                        Multiplicity::OneToMany,
                    )),
            )
            .with_entity(
                EntityDef::new("OrderItems", "ORDER_ITEMS")
                    .with_key(&["Id"])
                    .with_property(PropertyDef::new("Id", "ID", ValueType::Int))
                    .with_property(PropertyDef::new("Price", "PRICE", ValueType::Decimal)),
            )
    }

    fn tree(model: &EntityModel, expand: &[&str]) -> ExpandTree {
        let root = model.entity("Orders").unwrap();
        let paths: Vec<_> = expand
            .iter()
            .map(|p| ExpandPath::parse(p).unwrap())
            .collect();
        expand::resolve(model, root, &paths, 4).unwrap()
    }

    fn render(model: &EntityModel, tree: &ExpandTree, filter: &Filter) -> String {
        let expr = translate(model, tree, filter).unwrap();
        let mut sql = Sql::empty();
        expr.append_to_sql(&mut sql, &DialectDescriptor::postgres())
            .unwrap();
        sql.render(PlaceholderStyle::Numbered)
    }

    #[test]
    fn root_property_uses_root_alias() {
        let model = model();
        let tree = tree(&model, &[]);
        let sql = render(&model, &tree, &Filter::eq("Status", "open"));
        assert_eq!(sql, "T0.STATUS = $1");
    }

    #[test]
    fn navigation_property_uses_node_alias() {
        let model = model();
        let tree = tree(&model, &["OrderItems"]);
        let sql = render(&model, &tree, &Filter::gt("OrderItems/Price", 100_i64));
        assert_eq!(sql, "T1.PRICE > $1");
    }

    #[test]
    fn unexpanded_prefix_is_a_schema_error() {
        let model = model();
        let tree = tree(&model, &[]);
        let err = translate(&model, &tree, &Filter::gt("OrderItems/Price", 1_i64)).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("not expanded"));
    }

    #[test]
    fn unknown_property_is_a_schema_error() {
        let model = model();
        let tree = tree(&model, &[]);
        let err = translate(&model, &tree, &Filter::eq("Nope", 1_i64)).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("unknown property 'Nope'"));
    }

    #[test]
    fn non_filterable_property_is_rejected() {
        let model = model();
        let tree = tree(&model, &[]);
        let err = translate(&model, &tree, &Filter::eq("Secret", "x")).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("not filterable"));
    }

    #[test]
    fn type_mismatch_is_a_malformed_filter() {
        let model = model();
        let tree = tree(&model, &[]);
        let err = translate(&model, &tree, &Filter::eq("Status", 42_i64)).unwrap_err();
        assert!(err.is_malformed_filter());
        assert!(err.to_string().contains("text property 'Status'"));
    }

    #[test]
    fn numeric_widths_compare_fine() {
        let model = model();
        let tree = tree(&model, &["OrderItems"]);
        // Int literal against a decimal column is allowed.
        let sql = render(&model, &tree, &Filter::lte("OrderItems/Price", 10_i64));
        assert_eq!(sql, "T1.PRICE <= $1");
    }

    #[test]
    fn null_literal_is_rejected() {
        let model = model();
        let tree = tree(&model, &[]);
        let err = translate(&model, &tree, &Filter::eq("Status", crate::value::SqlValue::Null))
            .unwrap_err();
        assert!(err.is_malformed_filter());
        assert!(err.to_string().contains("is-null"));
    }

    #[test]
    fn null_tests_have_no_operands() {
        let model = model();
        let tree = tree(&model, &[]);
        let sql = render(&model, &tree, &Filter::is_null("Status"));
        assert_eq!(sql, "T0.STATUS IS NULL");
    }

    #[test]
    fn empty_groups_are_malformed() {
        let model = model();
        let tree = tree(&model, &[]);
        let and = translate(&model, &tree, &Filter::And(vec![])).unwrap_err();
        assert!(and.is_malformed_filter());
        let or = translate(&model, &tree, &Filter::Or(vec![])).unwrap_err();
        assert!(or.is_malformed_filter());
    }

    #[test]
    fn binds_follow_tree_preorder() {
        let model = model();
        let tree = tree(&model, &["OrderItems"]);
        let filter = Filter::and(vec![
            Filter::eq("Status", "open"),
            Filter::or(vec![
                Filter::gt("OrderItems/Price", 100_i64),
                Filter::lt("OrderItems/Price", 10_i64),
            ]),
        ]);
        let expr = translate(&model, &tree, &filter).unwrap();
        let mut sql = Sql::empty();
        expr.append_to_sql(&mut sql, &DialectDescriptor::postgres())
            .unwrap();
        assert_eq!(
            sql.render(PlaceholderStyle::Numbered),
            "(T0.STATUS = $1 AND (T1.PRICE > $2 OR T1.PRICE < $3))"
        );
        assert_eq!(sql.param_count(), 3);
    }
}
