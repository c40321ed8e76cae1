//! # Project Data Structures
//!
//! A `Project` is a named piece of work with a cut list: the physical
//! material it requires. Inventory entries use the same `PhysicalMaterial`
//! shape as cut-list items.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── id, name, description
//! ├── image_urls: newline-delimited string
//! └── cutlist: Vec<CutlistItem>
//!     └── abstract_material_id ──> AbstractMaterial (catalog)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use thrift_core::project::{new_project_name, Project};
//!
//! let first = Project::new(new_project_name::<&str>(&[]));
//! assert_eq!(first.name, "New Project");
//!
//! let second = Project::new(new_project_name(&[first.name.as_str()]));
//! assert_eq!(second.name, "New Project 2");
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ThriftError, ThriftResult};
use crate::units::{self, Measurement};

/// Base name for auto-named projects
pub const NEW_PROJECT_NAME: &str = "New Project";

/// Highest suffix tried when deriving a unique project name
const MAX_NAME_SUFFIX: u32 = 999;

/// A concrete quantity of an abstract material with specific dimensions.
///
/// Only ever created fully specified; updates replace the whole item by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalMaterial {
    pub id: Uuid,
    pub abstract_material_id: Uuid,
    pub thickness: Measurement,
    pub width: Measurement,
    pub length: Measurement,
    pub quantity: u32,
    #[serde(default)]
    pub should_maintain_grain_direction: bool,
}

/// A physical material required by a project
pub type CutlistItem = PhysicalMaterial;

impl PhysicalMaterial {
    /// Dimensions as display text, e.g. `3/4" x 5 1/2" x 36"`
    pub fn dimensions_label(&self) -> String {
        format!(
            "{} x {} x {}",
            units::format(&self.thickness),
            units::format(&self.width),
            units::format(&self.length)
        )
    }

    /// Check the invariants every stored item keeps: finite, non-negative
    /// dimensions and a quantity of at least one.
    pub fn validate(&self) -> ThriftResult<()> {
        self.thickness.validate("thickness")?;
        self.width.validate("width")?;
        self.length.validate("length")?;
        if self.quantity == 0 {
            return Err(ThriftError::invalid_input("quantity", "0", "Quantity must be at least 1"));
        }
        Ok(())
    }

    /// Field-wise comparison using measurement tolerance
    pub fn approx_eq(&self, other: &PhysicalMaterial) -> bool {
        self.id == other.id
            && self.abstract_material_id == other.abstract_material_id
            && units::equals(&self.thickness, &other.thickness)
            && units::equals(&self.width, &other.width)
            && units::equals(&self.length, &other.length)
            && self.quantity == other.quantity
            && self.should_maintain_grain_direction == other.should_maintain_grain_direction
    }
}

/// The editable header fields of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectHeader {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Newline-delimited image URLs
    pub image_urls: String,
}

/// Root container for one woodworking project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_urls: String,
    #[serde(default)]
    pub cutlist: Vec<CutlistItem>,
}

impl Project {
    /// Create an empty project with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Project {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            image_urls: String::new(),
            cutlist: Vec::new(),
        }
    }

    pub fn header(&self) -> ProjectHeader {
        ProjectHeader {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            image_urls: self.image_urls.clone(),
        }
    }

    /// Copy the header fields onto this project. The id is left alone.
    pub fn apply_header(&mut self, header: &ProjectHeader) {
        self.name = header.name.clone();
        self.description = header.description.clone();
        self.image_urls = header.image_urls.clone();
    }

    /// The non-empty, trimmed lines of `image_urls`
    pub fn image_url_list(&self) -> Vec<&str> {
        self.image_urls
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn get_item(&self, id: &Uuid) -> Option<&CutlistItem> {
        self.cutlist.iter().find(|item| item.id == *id)
    }

    /// Total number of pieces across the cut list
    pub fn piece_count(&self) -> u64 {
        self.cutlist.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// Derive a project name not already in `existing`.
///
/// Returns "New Project", then "New Project 2", "New Project 3", ... If
/// every suffix up to 999 is taken, falls back to a name with a short
/// random tag.
pub fn new_project_name<S: AsRef<str>>(existing: &[S]) -> String {
    let taken = |candidate: &str| existing.iter().any(|name| name.as_ref() == candidate);

    if !taken(NEW_PROJECT_NAME) {
        return NEW_PROJECT_NAME.to_string();
    }

    (2..=MAX_NAME_SUFFIX)
        .map(|i| format!("{NEW_PROJECT_NAME} {i}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| {
            let tag = Uuid::new_v4().simple().to_string();
            format!("{NEW_PROJECT_NAME} {}", &tag[..8])
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Measurement;

    fn sample_item() -> CutlistItem {
        CutlistItem {
            id: Uuid::new_v4(),
            abstract_material_id: Uuid::new_v4(),
            thickness: Measurement::inches(0.75),
            width: Measurement::inches(5.5),
            length: Measurement::inches(36.0),
            quantity: 4,
            should_maintain_grain_direction: true,
        }
    }

    #[test]
    fn test_project_creation() {
        let project = Project::new("Bookshelf");
        assert_eq!(project.name, "Bookshelf");
        assert!(project.description.is_empty());
        assert!(project.cutlist.is_empty());
    }

    #[test]
    fn test_new_project_name_sequence() {
        assert_eq!(new_project_name::<&str>(&[]), "New Project");
        assert_eq!(new_project_name(&["New Project"]), "New Project 2");
        assert_eq!(new_project_name(&["New Project", "New Project 2"]), "New Project 3");
        // gaps are filled first
        assert_eq!(new_project_name(&["New Project", "New Project 3"]), "New Project 2");
        // only the bare name counts as taken for the first slot
        assert_eq!(new_project_name(&["New Project 2"]), "New Project");
    }

    #[test]
    fn test_new_project_name_exhausted() {
        let mut names = vec!["New Project".to_string()];
        names.extend((2..=999).map(|i| format!("New Project {i}")));
        let name = new_project_name(&names);
        assert!(name.starts_with("New Project "));
        assert!(!names.contains(&name));
    }

    #[test]
    fn test_header_roundtrip() {
        let mut project = Project::new("Table");
        let mut header = project.header();
        header.name = "Dining Table".to_string();
        header.image_urls = "https://a.example/1.jpg\n\n  https://a.example/2.jpg  \n".to_string();

        project.apply_header(&header);
        assert_eq!(project.name, "Dining Table");
        assert_eq!(
            project.image_url_list(),
            vec!["https://a.example/1.jpg", "https://a.example/2.jpg"]
        );
    }

    #[test]
    fn test_project_serialization() {
        let mut project = Project::new("Workbench");
        project.cutlist.push(sample_item());

        let json = serde_json::to_string_pretty(&project).unwrap();
        assert!(json.contains("\"imageUrls\""));
        assert!(json.contains("\"abstractMaterialId\""));
        assert!(json.contains("\"shouldMaintainGrainDirection\": true"));

        let roundtrip: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, project);
    }

    #[test]
    fn test_item_labels_and_counts() {
        let mut project = Project::new("Cabinet");
        let item = sample_item();
        project.cutlist.push(item.clone());
        project.cutlist.push(CutlistItem { id: Uuid::new_v4(), quantity: 2, ..item.clone() });

        assert_eq!(item.dimensions_label(), "3/4\" x 5 1/2\" x 36\"");
        assert_eq!(project.piece_count(), 6);
        assert_eq!(project.get_item(&item.id), Some(&item));
    }

    #[test]
    fn test_piece_count_does_not_overflow() {
        let mut project = Project::new("Shop Stock");
        let item = sample_item();
        project.cutlist.push(CutlistItem { quantity: u32::MAX, ..item.clone() });
        project.cutlist.push(CutlistItem { id: Uuid::new_v4(), quantity: u32::MAX, ..item });
        assert_eq!(project.piece_count(), 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_item_validate() {
        let item = sample_item();
        assert!(item.validate().is_ok());

        let negative = CutlistItem { thickness: Measurement::inches(-1.0), ..item.clone() };
        assert_eq!(negative.validate().unwrap_err().error_code(), "INVALID_INPUT");

        let empty = CutlistItem { quantity: 0, ..item };
        assert!(empty.validate().unwrap_err().to_string().contains("quantity"));
    }

    #[test]
    fn test_item_approx_eq() {
        let item = sample_item();
        let mut metric = item.clone();
        metric.thickness = Measurement::millimetres(19.05);
        assert!(item.approx_eq(&metric));

        metric.quantity = 5;
        assert!(!item.approx_eq(&metric));
    }
}
