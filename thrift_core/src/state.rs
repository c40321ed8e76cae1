//! # State and Operations
//!
//! `State` is the whole persisted tree: projects, catalog, inventory and
//! preferences. It changes only through [`Operation`]s applied by
//! [`reduce`], a pure transition function.
//!
//! ## JSON Serialization
//!
//! Operations serialize adjacently tagged, so an operation log or a message
//! from another front end looks like:
//!
//! ```json
//! { "type": "ADD_PROJECT" }
//! { "type": "SET_PREFERRED_UNIT", "payload": "mm" }
//! { "type": "UPDATE_MATERIAL_IN_PROJECT", "payload": { "projectId": "...", "cutlistItem": { ... } } }
//! ```
//!
//! Unrecognised `type`s deserialize to [`Operation::Unknown`], which leaves
//! the state unchanged.
//!
//! ## Example
//!
//! ```rust
//! use thrift_core::state::{reduce, Operation, State};
//! use thrift_core::units::Unit;
//!
//! let state = State::blank();
//! let state = reduce(state, Operation::AddProject);
//! let state = reduce(state, Operation::SetPreferredUnit(Unit::Millimetre));
//!
//! assert_eq!(state.projects[0].name, "New Project");
//! assert_eq!(state.preferences.preferred_unit, Unit::Millimetre);
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ThriftError, ThriftResult};
use crate::materials::{build_default_catalog, AbstractMaterial, CatalogIndex};
use crate::project::{new_project_name, CutlistItem, PhysicalMaterial, Project, ProjectHeader};
use crate::units::{ImperialPrecision, Unit};

/// Current schema version. Part of the storage key.
pub const SCHEMA_VERSION: &str = "1";

/// User preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Unit assumed for input without an explicit suffix
    pub preferred_unit: Unit,
    /// Rounding used when showing inch values
    #[serde(default)]
    pub imperial_precision: ImperialPrecision,
}

/// The persisted state tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub projects: Vec<Project>,
    pub catalog: Vec<AbstractMaterial>,
    pub inventory: Vec<PhysicalMaterial>,
    #[serde(default)]
    pub preferences: Preferences,
}

impl State {
    /// Empty projects and inventory, a freshly generated catalog and default
    /// preferences.
    pub fn blank() -> Self {
        State {
            projects: Vec::new(),
            catalog: build_default_catalog(),
            inventory: Vec::new(),
            preferences: Preferences::default(),
        }
    }

    pub fn catalog_index(&self) -> CatalogIndex<'_> {
        CatalogIndex::new(&self.catalog)
    }

    pub fn find_material(&self, id: &Uuid) -> Option<&AbstractMaterial> {
        self.catalog.iter().find(|m| m.id == *id)
    }

    pub fn find_project(&self, id: &Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == *id)
    }

    /// Look up a project by id string or by exact name
    pub fn find_project_by_ref(&self, reference: &str) -> Option<&Project> {
        let reference = reference.trim();
        match Uuid::parse_str(reference) {
            Ok(id) => self.find_project(&id),
            Err(_) => self.projects.iter().find(|p| p.name == reference),
        }
    }

    pub fn find_inventory_item(&self, id: &Uuid) -> Option<&PhysicalMaterial> {
        self.inventory.iter().find(|m| m.id == *id)
    }

    /// Check every cut-list and inventory item. See [`PhysicalMaterial::validate`].
    pub fn validate(&self) -> ThriftResult<()> {
        self.projects
            .iter()
            .flat_map(|project| &project.cutlist)
            .chain(&self.inventory)
            .try_for_each(PhysicalMaterial::validate)
    }
}

impl Default for State {
    fn default() -> Self {
        State::blank()
    }
}

/// Payload for cut-list operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectItem {
    pub project_id: Uuid,
    pub cutlist_item: CutlistItem,
}

/// A state transition. One variant per kind; see [`reduce`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    /// Append an empty, uniquely named project
    AddProject,
    /// Merge header fields into the project with the header's id
    EditProject(ProjectHeader),
    AddMaterialToProject(ProjectItem),
    /// Replace the cut-list item with the same id
    UpdateMaterialInProject(ProjectItem),
    AddMaterialToInventory(PhysicalMaterial),
    /// Replace the inventory entry with the same id
    UpdateMaterialInInventory(PhysicalMaterial),
    SetPreferredUnit(Unit),
    SetImperialPrecision(ImperialPrecision),
    /// Replace the whole state (restore from backup)
    SetState(Box<State>),
    /// Replace the state with a blank one
    Reset,
    /// Any operation this version does not know about
    #[serde(other)]
    Unknown,
}

impl Operation {
    /// Every `type` tag this version understands
    pub const KINDS: [&'static str; 10] = [
        "ADD_PROJECT",
        "EDIT_PROJECT",
        "ADD_MATERIAL_TO_PROJECT",
        "UPDATE_MATERIAL_IN_PROJECT",
        "ADD_MATERIAL_TO_INVENTORY",
        "UPDATE_MATERIAL_IN_INVENTORY",
        "SET_PREFERRED_UNIT",
        "SET_IMPERIAL_PRECISION",
        "SET_STATE",
        "RESET",
    ];

    /// Parse an operation message.
    ///
    /// A message whose `type` is not one of [`Operation::KINDS`] becomes
    /// [`Operation::Unknown`] whatever its payload. A known type with a bad
    /// payload is an error, including one that fails [`Operation::validate`].
    pub fn from_json(json: &str) -> ThriftResult<Operation> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| ThriftError::invalid_input("type", json, "Operation has no 'type' tag"))?;

        if !Operation::KINDS.contains(&kind) {
            return Ok(Operation::Unknown);
        }
        let operation: Operation = serde_json::from_value(value)?;
        operation.validate()?;
        Ok(operation)
    }

    /// Check that any items the operation carries keep the data invariants
    pub fn validate(&self) -> ThriftResult<()> {
        match self {
            Operation::AddMaterialToProject(payload) | Operation::UpdateMaterialInProject(payload) => {
                payload.cutlist_item.validate()
            }
            Operation::AddMaterialToInventory(material) | Operation::UpdateMaterialInInventory(material) => {
                material.validate()
            }
            Operation::SetState(state) => state.validate(),
            _ => Ok(()),
        }
    }

    /// Operation kind as it appears in the `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::AddProject => "ADD_PROJECT",
            Operation::EditProject(_) => "EDIT_PROJECT",
            Operation::AddMaterialToProject(_) => "ADD_MATERIAL_TO_PROJECT",
            Operation::UpdateMaterialInProject(_) => "UPDATE_MATERIAL_IN_PROJECT",
            Operation::AddMaterialToInventory(_) => "ADD_MATERIAL_TO_INVENTORY",
            Operation::UpdateMaterialInInventory(_) => "UPDATE_MATERIAL_IN_INVENTORY",
            Operation::SetPreferredUnit(_) => "SET_PREFERRED_UNIT",
            Operation::SetImperialPrecision(_) => "SET_IMPERIAL_PRECISION",
            Operation::SetState(_) => "SET_STATE",
            Operation::Reset => "RESET",
            Operation::Unknown => "UNKNOWN",
        }
    }
}

/// Apply one operation to the state and return the new state.
///
/// Operations that reference a project or item that does not exist leave the
/// state as it was. So does [`Operation::Unknown`].
pub fn reduce(mut state: State, operation: Operation) -> State {
    match operation {
        Operation::AddProject => {
            let name = new_project_name(&state.projects.iter().map(|p| p.name.as_str()).collect::<Vec<_>>());
            state.projects.push(Project::new(name));
        }
        Operation::EditProject(header) => {
            if let Some(project) = project_mut(&mut state, &header.id) {
                project.apply_header(&header);
            }
        }
        Operation::AddMaterialToProject(ProjectItem { project_id, cutlist_item }) => {
            if let Some(project) = project_mut(&mut state, &project_id) {
                project.cutlist.push(cutlist_item);
            }
        }
        Operation::UpdateMaterialInProject(ProjectItem { project_id, cutlist_item }) => {
            if let Some(project) = project_mut(&mut state, &project_id) {
                replace_by_id(&mut project.cutlist, cutlist_item);
            }
        }
        Operation::AddMaterialToInventory(material) => {
            state.inventory.push(material);
        }
        Operation::UpdateMaterialInInventory(material) => {
            replace_by_id(&mut state.inventory, material);
        }
        Operation::SetPreferredUnit(unit) => {
            state.preferences.preferred_unit = unit;
        }
        Operation::SetImperialPrecision(precision) => {
            state.preferences.imperial_precision = precision;
        }
        Operation::SetState(new_state) => return *new_state,
        Operation::Reset => return State::blank(),
        Operation::Unknown => {}
    }
    state
}

fn project_mut<'a>(state: &'a mut State, id: &Uuid) -> Option<&'a mut Project> {
    state.projects.iter_mut().find(|p| p.id == *id)
}

fn replace_by_id(items: &mut [PhysicalMaterial], replacement: PhysicalMaterial) {
    if let Some(slot) = items.iter_mut().find(|item| item.id == replacement.id) {
        *slot = replacement;
    }
}
