//! Default Material Catalog
//!
//! Seed data for a blank state. Generated once; persisted catalogs are never
//! regenerated because cut-list items reference materials by id.
//!
//! ## Groups
//!
//! - Sheet goods without grain: `MDF`, `Melamine`, ...
//! - Plywoods (sheet, with grain): `[Plywood] Baltic Birch`, ...
//! - Solid woods (with grain): `[Solid] White Oak`, ...

use lexical_sort::natural_lexical_cmp;

use super::{AbstractMaterial, MaterialType};

/// Name prefix for plywood sheet goods
pub const PLYWOOD_PREFIX: &str = "[Plywood] ";

/// Name prefix for solid woods
pub const SOLID_PREFIX: &str = "[Solid] ";

const SHEET_GOODS: [&str; 5] = ["MDF", "Melamine", "Hardboard", "Particleboard", "OSB"];

const PLYWOODS: [&str; 7] = [
    "Baltic Birch",
    "Birch",
    "Maple",
    "Red Oak",
    "White Oak",
    "Walnut",
    "Cherry",
];

const SOLID_WOODS: [&str; 12] = [
    "Ash",
    "Cherry",
    "Douglas Fir",
    "Hard Maple",
    "Soft Maple",
    "Mahogany",
    "Pine",
    "Poplar",
    "Red Oak",
    "White Oak",
    "Walnut",
    "Sapele",
];

/// Build the default catalog with fresh ids, sorted by name.
///
/// Two calls produce the same names, types and grain flags with distinct ids.
pub fn build_default_catalog() -> Vec<AbstractMaterial> {
    let sheets = SHEET_GOODS
        .iter()
        .map(|name| AbstractMaterial::new(*name, MaterialType::Sheet, false));

    let plywoods = PLYWOODS
        .iter()
        .map(|name| AbstractMaterial::new(format!("{PLYWOOD_PREFIX}{name}"), MaterialType::Sheet, true));

    let solids = SOLID_WOODS
        .iter()
        .map(|name| AbstractMaterial::new(format!("{SOLID_PREFIX}{name}"), MaterialType::SolidWood, true));

    let mut catalog: Vec<AbstractMaterial> = sheets.chain(plywoods).chain(solids).collect();
    catalog.sort_by(|a, b| natural_lexical_cmp(&a.name, &b.name));
    catalog
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_catalog_groups() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.len(), SHEET_GOODS.len() + PLYWOODS.len() + SOLID_WOODS.len());

        for material in &catalog {
            if material.name.starts_with(PLYWOOD_PREFIX) {
                assert_eq!(material.material_type, MaterialType::Sheet);
                assert!(material.has_grain_direction);
            } else if material.name.starts_with(SOLID_PREFIX) {
                assert_eq!(material.material_type, MaterialType::SolidWood);
                assert!(material.has_grain_direction);
            } else {
                assert_eq!(material.material_type, MaterialType::Sheet);
                assert!(!material.has_grain_direction, "{}", material.name);
            }
        }
    }

    #[test]
    fn test_catalog_sorted_by_name() {
        let catalog = build_default_catalog();
        for pair in catalog.windows(2) {
            assert_ne!(
                natural_lexical_cmp(&pair[0].name, &pair[1].name),
                std::cmp::Ordering::Greater,
                "{} should sort before {}",
                pair[1].name,
                pair[0].name
            );
        }
    }

    #[test]
    fn test_catalog_ids_unique_and_fresh() {
        let first = build_default_catalog();
        let second = build_default_catalog();

        let ids: HashSet<_> = first.iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), first.len());

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.material_type, b.material_type);
            assert_eq!(a.has_grain_direction, b.has_grain_direction);
            assert_ne!(a.id, b.id);
        }
    }
}
