//! # thrift_core - Woodworking Project and Materials Tracker
//!
//! `thrift_core` is the engine behind Thrift: it parses and formats the
//! dimensions woodworkers type (`3/4"`, `5 1/2"`, `19 mm`), keeps a catalog
//! of materials, and holds projects, cut lists and inventory in a single
//! state tree that changes only through operations and is persisted after a
//! short quiet period.
//!
//! ## Design Philosophy
//!
//! - **Pure transitions**: `reduce(state, operation)` is the only way state changes
//! - **JSON-First**: state, operations and errors all implement Serialize/Deserialize
//! - **Explicit time**: debouncing takes `Instant`s from the caller, no timers or threads
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Instant;
//! use thrift_core::storage::MemoryStore;
//! use thrift_core::store::{Store, StoreConfig};
//! use thrift_core::units::{self, Unit};
//!
//! let mut store = Store::open(MemoryStore::new(), StoreConfig::default())?;
//! let project_id = store.add_project(Instant::now());
//! assert_eq!(store.state().find_project(&project_id).unwrap().name, "New Project");
//!
//! let width = units::parse("5 1/2", Unit::Inch).unwrap();
//! assert_eq!(units::format(&width.to_unit(Unit::Millimetre)), "140 mm");
//! store.flush()?;
//! # Ok::<(), thrift_core::ThriftError>(())
//! ```
//!
//! ## Modules
//!
//! - [`units`] - Measurement parsing, formatting, conversion and comparison
//! - [`materials`] - Abstract materials and the default catalog
//! - [`project`] - Projects, cut-list items and physical materials
//! - [`state`] - State tree, operations and the reducer
//! - [`store`] - Loads, updates and persists the state
//! - [`storage`] - Key-value storage backends
//! - [`debounce`] - Deadline-based debouncing
//! - [`row_editor`] - Edit model for one material row
//! - [`errors`] - Structured error types

pub mod debounce;
pub mod errors;
pub mod materials;
pub mod project;
pub mod row_editor;
pub mod state;
pub mod storage;
pub mod store;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use errors::{ThriftError, ThriftResult};
pub use materials::{AbstractMaterial, MaterialType};
pub use project::{CutlistItem, PhysicalMaterial, Project, ProjectHeader};
pub use state::{reduce, Operation, State};
pub use store::{Store, StoreConfig};
pub use units::{ImperialPrecision, Measurement, Unit};
