//! # Materials Catalog
//!
//! Abstract materials describe a *kind* of material ("Baltic Birch plywood",
//! "Walnut") without any quantity or dimensions. Cut-list items and inventory
//! entries reference them by id.
//!
//! ## Material Types
//!
//! - **Sheet**: sheet goods. MDF and melamine have no grain; plywoods do.
//! - **Solid wood**: always has grain direction.
//!
//! ## Example
//!
//! ```rust
//! use thrift_core::materials::{build_default_catalog, CatalogIndex, MaterialType};
//!
//! let catalog = build_default_catalog();
//! let index = CatalogIndex::new(&catalog);
//!
//! let mdf = index.find_by_name("MDF").unwrap();
//! assert_eq!(mdf.material_type, MaterialType::Sheet);
//! assert!(!mdf.has_grain_direction);
//! assert_eq!(index.get(&mdf.id).unwrap().name, "MDF");
//! ```

pub mod catalog;

pub use catalog::{build_default_catalog, PLYWOOD_PREFIX, SOLID_PREFIX};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Broad category of an abstract material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialType {
    Sheet,
    SolidWood,
}

impl MaterialType {
    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialType::Sheet => "Sheet",
            MaterialType::SolidWood => "Solid Wood",
        }
    }
}

/// A catalog entry. Immutable once generated; ids must stay stable for as
/// long as anything references them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbstractMaterial {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub material_type: MaterialType,
    pub has_grain_direction: bool,
}

impl AbstractMaterial {
    /// Create a catalog entry with a freshly generated id
    pub fn new(name: impl Into<String>, material_type: MaterialType, has_grain_direction: bool) -> Self {
        AbstractMaterial {
            id: Uuid::new_v4(),
            name: name.into(),
            material_type,
            has_grain_direction,
        }
    }
}

impl std::fmt::Display for AbstractMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Id-keyed view over a catalog slice
#[derive(Debug, Clone)]
pub struct CatalogIndex<'a> {
    by_id: HashMap<Uuid, &'a AbstractMaterial>,
    catalog: &'a [AbstractMaterial],
}

impl<'a> CatalogIndex<'a> {
    pub fn new(catalog: &'a [AbstractMaterial]) -> Self {
        CatalogIndex {
            by_id: catalog.iter().map(|m| (m.id, m)).collect(),
            catalog,
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<&'a AbstractMaterial> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.by_id.contains_key(id)
    }

    /// Case-insensitive exact name match
    pub fn find_by_name(&self, name: &str) -> Option<&'a AbstractMaterial> {
        let name = name.trim();
        self.catalog.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_serialization() {
        let material = AbstractMaterial::new("[Plywood] Maple", MaterialType::Sheet, true);
        let json = serde_json::to_string(&material).unwrap();
        assert!(json.contains("\"type\":\"SHEET\""));
        assert!(json.contains("\"hasGrainDirection\":true"));

        let roundtrip: AbstractMaterial = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, material);
    }

    #[test]
    fn test_solid_wood_serialization() {
        let json = serde_json::to_string(&MaterialType::SolidWood).unwrap();
        assert_eq!(json, "\"SOLID_WOOD\"");
    }

    #[test]
    fn test_catalog_index() {
        let catalog = vec![
            AbstractMaterial::new("MDF", MaterialType::Sheet, false),
            AbstractMaterial::new("[Solid] Walnut", MaterialType::SolidWood, true),
        ];
        let index = CatalogIndex::new(&catalog);

        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&catalog[1].id).unwrap().name, "[Solid] Walnut");
        assert!(index.get(&Uuid::new_v4()).is_none());
        assert_eq!(index.find_by_name("  [solid] walnut ").unwrap().id, catalog[1].id);
        assert!(index.find_by_name("Walnut").is_none());
    }
}
