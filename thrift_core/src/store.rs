//! # Store
//!
//! The explicit state container the view layer owns. It loads state from
//! durable storage (or starts blank), applies operations through
//! [`reduce`](crate::state::reduce), and writes the full state back after a
//! debounce window.
//!
//! ## Lifecycle
//!
//! ```text
//! open ──> dispatch* ──> tick (writes when the window has passed) ──> close
//!              │                                                      │
//!              └─ schedules/restarts the write window                 └─ cancels a pending write
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use thrift_core::state::Operation;
//! use thrift_core::storage::MemoryStore;
//! use thrift_core::store::{Store, StoreConfig};
//!
//! let mut store = Store::open(MemoryStore::new(), StoreConfig::default())?;
//! let t0 = Instant::now();
//!
//! store.dispatch(Operation::AddProject, t0);
//! store.dispatch(Operation::AddProject, t0 + Duration::from_millis(100));
//! assert!(!store.tick(t0 + Duration::from_millis(200))?);
//!
//! // one write for both operations
//! assert!(store.tick(t0 + Duration::from_millis(700))?);
//! assert_eq!(store.storage().write_count(), 1);
//! # Ok::<(), thrift_core::errors::ThriftError>(())
//! ```

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use crate::errors::{ThriftError, ThriftResult};
use crate::materials::CatalogIndex;
use crate::project::{CutlistItem, PhysicalMaterial, ProjectHeader};
use crate::state::{reduce, Operation, ProjectItem, State, SCHEMA_VERSION};
use crate::storage::{storage_key, KeyValueStore, STORAGE_KEY_PREFIX};
use crate::units::{ImperialPrecision, Unit};

/// Store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Quiet period after the last change before state is written
    pub debounce: Duration,
    /// Key the state blob is stored under
    pub storage_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            debounce: DEFAULT_DEBOUNCE,
            storage_key: storage_key(),
        }
    }
}

impl StoreConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// Portable snapshot of the whole state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    pub state: State,
}

/// Owns the state and its persistence.
pub struct Store<S: KeyValueStore> {
    storage: S,
    config: StoreConfig,
    state: State,
    persist: Debouncer,
}

impl<S: KeyValueStore> Store<S> {
    /// Load state from `storage`, or start from a blank state if nothing is
    /// stored under the configured key.
    ///
    /// A stored blob that does not deserialize, or holds items with negative
    /// dimensions or a zero quantity, is an error, not a silent reset.
    pub fn open(storage: S, config: StoreConfig) -> ThriftResult<Self> {
        let state = match storage.get(&config.storage_key)? {
            Some(json) => {
                let state: State = serde_json::from_str(&json).map_err(|e| {
                    ThriftError::serialization(format!("Invalid state under '{}': {}", config.storage_key, e))
                })?;
                state.validate()?;
                info!(
                    "Loaded state from '{}' ({} projects, {} inventory items)",
                    config.storage_key,
                    state.projects.len(),
                    state.inventory.len()
                );
                state
            }
            None => {
                info!("No state under '{}', starting blank", config.storage_key);
                State::blank()
            }
        };

        let orphaned = orphaned_keys(&storage, &config.storage_key)?;
        if !orphaned.is_empty() {
            // no migration between schema versions; older data stays where it is
            warn!(
                "Ignoring state stored under other schema versions: {}",
                orphaned.join(", ")
            );
        }

        Ok(Store {
            persist: Debouncer::new(config.debounce),
            storage,
            config,
            state,
        })
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn catalog_index(&self) -> CatalogIndex<'_> {
        self.state.catalog_index()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Whether a write is waiting for its debounce window
    pub fn has_pending_write(&self) -> bool {
        self.persist.is_pending()
    }

    /// Apply an operation. If the state changed, (re)start the write window.
    ///
    /// Returns whether the state changed. The operation is applied as given;
    /// the helpers below and [`Operation::from_json`] validate payloads first.
    pub fn dispatch(&mut self, operation: Operation, now: Instant) -> bool {
        let kind = operation.kind();
        let next = reduce(self.state.clone(), operation);
        let changed = next != self.state;
        self.state = next;

        if changed {
            self.persist.schedule(now);
            debug!("Applied {kind}");
        } else {
            debug!("{kind} left state unchanged");
        }
        changed
    }

    /// Write the state if the debounce window has passed.
    ///
    /// Returns `Ok(true)` if a write happened. On failure the write is
    /// re-armed for another window and the error is returned.
    pub fn tick(&mut self, now: Instant) -> ThriftResult<bool> {
        if !self.persist.poll(now) {
            return Ok(false);
        }
        self.write().inspect_err(|_| self.persist.schedule(now))?;
        Ok(true)
    }

    /// Write now if a write is pending. Returns whether a write happened.
    pub fn flush(&mut self) -> ThriftResult<bool> {
        if !self.persist.cancel() {
            return Ok(false);
        }
        if let Err(e) = self.write() {
            self.persist.schedule(Instant::now());
            return Err(e);
        }
        Ok(true)
    }

    /// Tear down the store. A pending write is cancelled, not performed;
    /// call [`flush`](Store::flush) first to keep it.
    pub fn close(mut self) -> S {
        if self.persist.cancel() {
            debug!("Cancelled pending write on close");
        }
        self.storage
    }

    fn write(&mut self) -> ThriftResult<()> {
        let json = serde_json::to_string(&self.state)?;
        match self.storage.set(&self.config.storage_key, &json) {
            Ok(()) => {
                info!("Saved state to '{}'", self.config.storage_key);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to save state to '{}': {}", self.config.storage_key, e);
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Operation helpers
    // ------------------------------------------------------------------

    /// Add a project and return its id
    pub fn add_project(&mut self, now: Instant) -> Uuid {
        self.dispatch(Operation::AddProject, now);
        // AddProject always appends
        self.state.projects.last().map(|p| p.id).unwrap_or_default()
    }

    pub fn edit_project_header(&mut self, header: ProjectHeader, now: Instant) -> ThriftResult<()> {
        self.require_project(&header.id)?;
        self.dispatch(Operation::EditProject(header), now);
        Ok(())
    }

    pub fn add_material_to_project(&mut self, project_id: Uuid, cutlist_item: CutlistItem, now: Instant) -> ThriftResult<()> {
        self.require_project(&project_id)?;
        self.require_material(&cutlist_item.abstract_material_id)?;
        cutlist_item.validate()?;
        self.dispatch(Operation::AddMaterialToProject(ProjectItem { project_id, cutlist_item }), now);
        Ok(())
    }

    pub fn update_material_in_project(&mut self, project_id: Uuid, cutlist_item: CutlistItem, now: Instant) -> ThriftResult<()> {
        self.require_project(&project_id)?;
        self.require_material(&cutlist_item.abstract_material_id)?;
        cutlist_item.validate()?;
        self.dispatch(Operation::UpdateMaterialInProject(ProjectItem { project_id, cutlist_item }), now);
        Ok(())
    }

    pub fn add_material_to_inventory(&mut self, material: PhysicalMaterial, now: Instant) -> ThriftResult<()> {
        self.require_material(&material.abstract_material_id)?;
        material.validate()?;
        self.dispatch(Operation::AddMaterialToInventory(material), now);
        Ok(())
    }

    pub fn update_material_in_inventory(&mut self, material: PhysicalMaterial, now: Instant) -> ThriftResult<()> {
        self.require_material(&material.abstract_material_id)?;
        material.validate()?;
        self.dispatch(Operation::UpdateMaterialInInventory(material), now);
        Ok(())
    }

    pub fn set_preferred_unit(&mut self, unit: Unit, now: Instant) {
        self.dispatch(Operation::SetPreferredUnit(unit), now);
    }

    pub fn set_imperial_precision(&mut self, precision: ImperialPrecision, now: Instant) {
        self.dispatch(Operation::SetImperialPrecision(precision), now);
    }

    /// Start over with a blank state
    pub fn reset(&mut self, now: Instant) {
        self.dispatch(Operation::Reset, now);
    }

    /// Snapshot the current state as backup JSON
    pub fn export_backup(&self) -> ThriftResult<String> {
        let backup = Backup {
            schema_version: SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            state: self.state.clone(),
        };
        Ok(serde_json::to_string_pretty(&backup)?)
    }

    /// Replace the state with the one in a backup produced by
    /// [`export_backup`](Store::export_backup).
    pub fn restore_backup(&mut self, json: &str, now: Instant) -> ThriftResult<()> {
        let backup: Backup = serde_json::from_str(json)?;
        if backup.schema_version != SCHEMA_VERSION {
            return Err(ThriftError::invalid_input(
                "schemaVersion",
                backup.schema_version,
                format!("Backup must be schema version {SCHEMA_VERSION}"),
            ));
        }
        backup.state.validate()?;
        info!("Restoring backup exported at {}", backup.exported_at.to_rfc3339());
        self.dispatch(Operation::SetState(Box::new(backup.state)), now);
        Ok(())
    }

    fn require_project(&self, id: &Uuid) -> ThriftResult<()> {
        match self.state.find_project(id) {
            Some(_) => Ok(()),
            None => Err(ThriftError::project_not_found(id.to_string())),
        }
    }

    fn require_material(&self, id: &Uuid) -> ThriftResult<()> {
        match self.state.find_material(id) {
            Some(_) => Ok(()),
            None => Err(ThriftError::material_not_found(id.to_string())),
        }
    }
}

/// Keys from other schema versions, left behind by a version bump
fn orphaned_keys<S: KeyValueStore>(storage: &S, current: &str) -> ThriftResult<Vec<String>> {
    Ok(storage
        .keys()?
        .into_iter()
        .filter(|key| key.starts_with(STORAGE_KEY_PREFIX) && key != current)
        .collect())
}
