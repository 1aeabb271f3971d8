//! Entity and navigation metadata.
//!
//! An [`EntityModel`] is one immutable snapshot of the external metadata
//! document: entities, their properties and key, and the navigations
//! between them. Reloads go through [`ModelHandle`], which swaps the
//! current `Arc<EntityModel>` atomically; a compilation keeps the snapshot
//! it captured and is never affected by a mid-flight reload.

use crate::error::{GraftError, GraftResult};
use crate::value::ValueType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

fn default_true() -> bool {
    true
}

/// How many target entities one source entity relates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Multiplicity {
    OneToOne,
    OneToMany,
    ManyToOne,
}

impl Multiplicity {
    /// Collection-valued navigations materialize as child lists.
    pub fn is_collection(self) -> bool {
        matches!(self, Multiplicity::OneToMany)
    }
}

/// A scalar property: entity-level name mapped to a table column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDef {
    pub name: String,
    pub column: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default = "default_true")]
    pub selectable: bool,
    #[serde(default = "default_true")]
    pub filterable: bool,
    #[serde(default = "default_true")]
    pub sortable: bool,
}

impl PropertyDef {
    pub fn new(
        name: impl Into<String>,
        column: impl Into<String>,
        value_type: ValueType,
    ) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            value_type,
            selectable: true,
            filterable: true,
            sortable: true,
        }
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn with_filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }
}

/// One column pair of a navigation's join predicate:
/// `<source entity column> = <target entity column>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPair {
    pub source: String,
    pub target: String,
}

impl JoinPair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A named association from one entity to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationDef {
    pub name: String,
    /// Target entity name.
    pub target: String,
    pub join: Vec<JoinPair>,
    pub multiplicity: Multiplicity,
    /// Required single-valued navigations join INNER instead of LEFT.
    #[serde(default)]
    pub required: bool,
}

impl NavigationDef {
    pub fn new(
        name: impl Into<String>,
        target: impl Into<String>,
        join: Vec<JoinPair>,
        multiplicity: Multiplicity,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            join,
            multiplicity,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// One entity: table mapping, key, properties, navigations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDef {
    pub name: String,
    pub table: String,
    /// Property names forming the entity identity. Never empty after
    /// validation.
    pub key: Vec<String>,
    pub properties: Vec<PropertyDef>,
    #[serde(default)]
    pub navigations: Vec<NavigationDef>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            key: Vec::new(),
            properties: Vec::new(),
            navigations: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: &[&str]) -> Self {
        self.key = key.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn with_property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_navigation(mut self, navigation: NavigationDef) -> Self {
        self.navigations.push(navigation);
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn navigation(&self, name: &str) -> Option<&NavigationDef> {
        self.navigations.iter().find(|n| n.name == name)
    }

    /// Declared selectable scalar properties, in declaration order.
    pub fn selectable_properties(&self) -> impl Iterator<Item = &PropertyDef> {
        self.properties.iter().filter(|p| p.selectable)
    }

    /// The key property definitions, in key declaration order.
    pub fn key_properties(&self) -> GraftResult<Vec<&PropertyDef>> {
        self.key
            .iter()
            .map(|k| {
                self.property(k).ok_or_else(|| {
                    GraftError::schema(
                        format!("{}/key/{k}", self.name),
                        "key names an undeclared property",
                    )
                })
            })
            .collect()
    }
}

/// One versioned snapshot of the whole metadata document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityModel {
    pub version: u64,
    pub entities: Vec<EntityDef>,
}

impl EntityModel {
    pub fn new(version: u64) -> Self {
        Self {
            version,
            entities: Vec::new(),
        }
    }

    pub fn with_entity(mut self, entity: EntityDef) -> Self {
        self.entities.push(entity);
        self
    }

    /// Load and validate a metadata document.
    pub fn from_json(json: &str) -> GraftResult<Self> {
        let model: EntityModel = serde_json::from_str(json)
            .map_err(|e| GraftError::schema("$", e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    pub fn entity(&self, name: &str) -> GraftResult<&EntityDef> {
        self.find_entity(name)
            .ok_or_else(|| GraftError::schema(name, "unknown entity set"))
    }

    pub fn find_entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Structural checks on the whole document. Every finding is a
    /// `Schema` error naming the offending path.
    pub fn validate(&self) -> GraftResult<()> {
        let mut entity_names = HashSet::new();
        for entity in &self.entities {
            if !entity_names.insert(entity.name.as_str()) {
                return Err(GraftError::schema(&entity.name, "duplicate entity name"));
            }
        }

        for entity in &self.entities {
            if entity.table.is_empty() {
                return Err(GraftError::schema(&entity.name, "entity has no table"));
            }
            if entity.key.is_empty() {
                return Err(GraftError::schema(
                    format!("{}/key", entity.name),
                    "entity declares no key properties",
                ));
            }

            let mut property_names = HashSet::new();
            for property in &entity.properties {
                if !property_names.insert(property.name.as_str()) {
                    return Err(GraftError::schema(
                        format!("{}/{}", entity.name, property.name),
                        "duplicate property name",
                    ));
                }
                if property.column.is_empty() {
                    return Err(GraftError::schema(
                        format!("{}/{}", entity.name, property.name),
                        "property has no column",
                    ));
                }
            }

            for key in &entity.key {
                if entity.property(key).is_none() {
                    return Err(GraftError::schema(
                        format!("{}/key/{key}", entity.name),
                        "key names an undeclared property",
                    ));
                }
            }

            let mut navigation_names = HashSet::new();
            for navigation in &entity.navigations {
                let path = format!("{}/{}", entity.name, navigation.name);
                if !navigation_names.insert(navigation.name.as_str()) {
                    return Err(GraftError::schema(&path, "duplicate navigation name"));
                }
                if self.find_entity(&navigation.target).is_none() {
                    return Err(GraftError::schema(
                        &path,
                        format!("unknown target entity '{}'", navigation.target),
                    ));
                }
                if navigation.join.is_empty() {
                    return Err(GraftError::schema(
                        &path,
                        "navigation declares no join columns",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Shared handle to the current model snapshot.
///
/// Readers take cheap `Arc` clones; [`swap`](ModelHandle::swap) installs a
/// validated replacement atomically and returns the previous snapshot.
#[derive(Debug)]
pub struct ModelHandle {
    current: RwLock<Arc<EntityModel>>,
}

impl ModelHandle {
    pub fn new(model: EntityModel) -> GraftResult<Self> {
        model.validate()?;
        Ok(Self {
            current: RwLock::new(Arc::new(model)),
        })
    }

    /// The current snapshot. Holders keep whatever version they captured.
    pub fn snapshot(&self) -> Arc<EntityModel> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Validate and install a new snapshot; returns the replaced one.
    pub fn swap(&self, model: EntityModel) -> GraftResult<Arc<EntityModel>> {
        model.validate()?;
        let next = Arc::new(model);
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(std::mem::replace(&mut *guard, next))
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version
    }
}
