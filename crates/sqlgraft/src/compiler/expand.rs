//! Expand-tree resolution: navigation paths to aliases and join clauses.
//!
//! Alias assignment is a pure function of the expand list: paths are
//! processed in request order, segments left to right, and every unseen
//! path prefix allocates the next `T<n>`. Identical requests therefore
//! always produce identical aliases, and diamond shapes or self joins each
//! get their own alias because allocation follows paths, not entity types.

use crate::builder::Join;
use crate::error::{GraftError, GraftResult};
use crate::model::{EntityDef, EntityModel, NavigationDef};
use crate::query::ExpandPath;
use std::collections::HashMap;

/// One occurrence of an entity in the join graph.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedNode {
    /// Navigation path from the root; empty for the root itself.
    pub path: String,
    pub alias: String,
    /// Entity name in the model snapshot.
    pub entity: String,
    /// Index of the parent node; `None` only for the root.
    pub parent: Option<usize>,
    /// Navigation taken from the parent; `None` only for the root.
    pub navigation: Option<NavigationDef>,
}

/// The resolved expand tree, nodes in allocation order (root first).
#[derive(Debug, Clone)]
pub(crate) struct ExpandTree {
    pub nodes: Vec<ResolvedNode>,
    by_path: HashMap<String, usize>,
}

impl ExpandTree {
    pub fn root(&self) -> &ResolvedNode {
        &self.nodes[0]
    }

    /// Node for a navigation path; the empty path is the root.
    pub fn node_at(&self, path: &str) -> Option<&ResolvedNode> {
        if path.is_empty() {
            return Some(self.root());
        }
        self.by_path.get(path).map(|&index| &self.nodes[index])
    }
}

/// Hands out `T0`, `T1`, ... and guards the uniqueness invariant.
#[derive(Debug, Default)]
struct AliasAllocator {
    next: usize,
    taken: HashMap<String, String>,
}

impl AliasAllocator {
    fn allocate(&mut self, path: &str) -> GraftResult<String> {
        let alias = format!("T{}", self.next);
        self.next += 1;
        if let Some(first) = self.taken.insert(alias.clone(), path.to_string()) {
            return Err(GraftError::AliasCollision {
                alias,
                first,
                second: path.to_string(),
            });
        }
        Ok(alias)
    }
}

/// Resolve the expand list into nodes and aliases.
///
/// A repeated path prefix is one hop and keeps its alias; only unseen
/// prefixes allocate. A path with more segments than `max_depth` fails
/// before any of its segments are resolved.
pub(crate) fn resolve(
    model: &EntityModel,
    root: &EntityDef,
    expand: &[ExpandPath],
    max_depth: usize,
) -> GraftResult<ExpandTree> {
    let mut alloc = AliasAllocator::default();
    let root_alias = alloc.allocate("")?;
    let mut nodes = vec![ResolvedNode {
        path: String::new(),
        alias: root_alias,
        entity: root.name.clone(),
        parent: None,
        navigation: None,
    }];
    let mut by_path: HashMap<String, usize> = HashMap::new();

    for path in expand {
        if path.depth() > max_depth {
            return Err(GraftError::ExpandDepthExceeded {
                depth: path.depth(),
                max: max_depth,
            });
        }

        let mut parent = 0usize;
        let mut prefix = String::new();
        for segment in path.segments() {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);

            if let Some(&index) = by_path.get(&prefix) {
                parent = index;
                continue;
            }

            let parent_entity = model.entity(&nodes[parent].entity)?;
            let navigation = parent_entity
                .navigation(segment)
                .ok_or_else(|| GraftError::unknown_navigation(&prefix, segment))?;
            let target = model.find_entity(&navigation.target).ok_or_else(|| {
                GraftError::schema(
                    &prefix,
                    format!("unknown target entity '{}'", navigation.target),
                )
            })?;

            let alias = alloc.allocate(&prefix)?;
            nodes.push(ResolvedNode {
                path: prefix.clone(),
                alias,
                entity: target.name.clone(),
                parent: Some(parent),
                navigation: Some(navigation.clone()),
            });
            by_path.insert(prefix.clone(), nodes.len() - 1);
            parent = nodes.len() - 1;
        }
    }

    Ok(ExpandTree { nodes, by_path })
}

/// Join clauses for every non-root node, in allocation order.
pub(crate) fn build_joins(model: &EntityModel, tree: &ExpandTree) -> GraftResult<Vec<Join>> {
    let mut joins = Vec::new();
    for node in &tree.nodes {
        let (Some(parent), Some(navigation)) = (node.parent, node.navigation.as_ref()) else {
            continue;
        };
        let parent_alias = &tree.nodes[parent].alias;
        let entity = model.entity(&node.entity)?;

        // Required single-valued navigations join INNER; collections and
        // optional navigations stay LEFT so a missing child never drops
        // its parent row.
        let inner = navigation.required && !navigation.multiplicity.is_collection();
        let mut join = if inner {
            Join::inner(entity.table.as_str())?
        } else {
            Join::left(entity.table.as_str())?
        }
        .alias(node.alias.clone());

        for pair in &navigation.join {
            join = join.on(
                format!("{parent_alias}.{}", pair.source),
                format!("{}.{}", node.alias, pair.target),
            )?;
        }
        joins.push(join);
    }
    Ok(joins)
}
