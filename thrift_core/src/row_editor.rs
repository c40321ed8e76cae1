//! # Row Editor
//!
//! Headless edit model for one row of a cut list or the inventory. A front
//! end feeds it keystrokes and blur events and asks it what to show; the row
//! decides when it holds a complete item and when that item should be
//! dispatched.
//!
//! Two kinds of row:
//!
//! - **New row** ([`RowEditor::new_row`]): the user fills it in and commits
//!   with [`try_add`](RowEditor::try_add), which hands back the item and clears
//!   the row.
//! - **Existing row** ([`RowEditor::for_item`]): edits that leave the row
//!   complete and different from the saved item schedule a debounced save.
//!   [`poll`](RowEditor::poll) hands back the updated item once the window has
//!   passed, and a "saved" indicator stays on for a couple of seconds.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Instant;
//! use thrift_core::row_editor::{Dimension, RowEditor};
//! use thrift_core::state::State;
//! use thrift_core::units::Unit;
//!
//! let state = State::blank();
//! let mdf = state.catalog_index().find_by_name("MDF").unwrap().clone();
//! let now = Instant::now();
//!
//! let mut row = RowEditor::new_row();
//! row.select_material(Some(mdf), now);
//! row.set_text(Dimension::Thickness, "3/4", Unit::Inch, now);
//! row.set_text(Dimension::Width, "24", Unit::Inch, now);
//! assert!(!row.is_ready_to_save());
//!
//! row.set_text(Dimension::Length, "1200 mm", Unit::Inch, now);
//! let item = row.try_add().unwrap();
//! assert_eq!(item.quantity, 1);
//! assert_eq!(row.field(Dimension::Thickness).text(), "");
//! ```

use std::ops::RangeInclusive;
use std::time::Instant;

use uuid::Uuid;

use crate::debounce::{Debouncer, TransientFlag};
use crate::materials::{AbstractMaterial, CatalogIndex};
use crate::project::CutlistItem;
use crate::units::{self, Measurement, Unit};

/// Quantities a row accepts
pub const QUANTITY_RANGE: RangeInclusive<u32> = 1..=10_000;

/// The three measured dimensions of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Thickness,
    Width,
    Length,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Thickness, Dimension::Width, Dimension::Length];

    pub fn display_name(&self) -> &'static str {
        match self {
            Dimension::Thickness => "Thickness",
            Dimension::Width => "Width",
            Dimension::Length => "Length",
        }
    }

    /// Input hint shown next to the column header
    pub fn example(&self) -> &'static str {
        match self {
            Dimension::Thickness => "3/4\" or 19 mm",
            Dimension::Width => "5 1/2\" or 140 mm",
            Dimension::Length => "36\" or 915 mm",
        }
    }
}

// ============================================================================
// MeasurementField
// ============================================================================

/// Raw text of a measurement input together with what it parses to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementField {
    text: String,
    value: Option<Measurement>,
}

impl MeasurementField {
    /// Field pre-filled with a formatted measurement
    pub fn from_measurement(m: Measurement) -> Self {
        MeasurementField {
            text: units::format(&m),
            value: Some(m),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> Option<Measurement> {
        self.value
    }

    /// Store the text as typed and reparse it
    pub fn set_text(&mut self, text: impl Into<String>, preferred: Unit) {
        self.text = text.into();
        self.value = units::parse(&self.text, preferred);
    }

    /// Replace the text with the canonical form of its value, if it has one
    pub fn blur(&mut self) {
        if let Some(value) = self.value {
            self.text = units::format(&value);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    /// Something was typed and it does not parse. An empty field is invalid
    /// but not shown as an error.
    pub fn shows_error(&self) -> bool {
        !self.text.is_empty() && self.value.is_none()
    }

    pub fn clear(&mut self) {
        *self = MeasurementField::default();
    }
}

// ============================================================================
// RowEditor
// ============================================================================

/// Edit model for one material row.
#[derive(Debug, Clone)]
pub struct RowEditor {
    existing: Option<CutlistItem>,
    material: Option<AbstractMaterial>,
    thickness: MeasurementField,
    width: MeasurementField,
    length: MeasurementField,
    quantity: u32,
    maintain_grain_direction: bool,
    readonly: bool,
    allow_grain_selection: bool,
    save: Debouncer,
    saved_indicator: TransientFlag,
}

impl RowEditor {
    /// Empty row for adding a new item
    pub fn new_row() -> Self {
        RowEditor {
            existing: None,
            material: None,
            thickness: MeasurementField::default(),
            width: MeasurementField::default(),
            length: MeasurementField::default(),
            quantity: *QUANTITY_RANGE.start(),
            maintain_grain_direction: false,
            readonly: false,
            allow_grain_selection: false,
            save: Debouncer::default(),
            saved_indicator: TransientFlag::default(),
        }
    }

    /// Row editing an existing item. The material is looked up in `catalog`;
    /// an item whose material is missing starts with no material selected.
    pub fn for_item(item: &CutlistItem, catalog: &CatalogIndex<'_>) -> Self {
        RowEditor {
            existing: Some(item.clone()),
            material: catalog.get(&item.abstract_material_id).cloned(),
            thickness: MeasurementField::from_measurement(item.thickness),
            width: MeasurementField::from_measurement(item.width),
            length: MeasurementField::from_measurement(item.length),
            quantity: item.quantity,
            maintain_grain_direction: item.should_maintain_grain_direction,
            ..RowEditor::new_row()
        }
    }

    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Offer the grain direction choice (cut lists do, inventory does not)
    pub fn allow_grain_selection(mut self, allow: bool) -> Self {
        self.allow_grain_selection = allow;
        self
    }

    pub fn is_new_row(&self) -> bool {
        self.existing.is_none()
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn existing(&self) -> Option<&CutlistItem> {
        self.existing.as_ref()
    }

    pub fn material(&self) -> Option<&AbstractMaterial> {
        self.material.as_ref()
    }

    pub fn field(&self, dimension: Dimension) -> &MeasurementField {
        match dimension {
            Dimension::Thickness => &self.thickness,
            Dimension::Width => &self.width,
            Dimension::Length => &self.length,
        }
    }

    fn field_mut(&mut self, dimension: Dimension) -> &mut MeasurementField {
        match dimension {
            Dimension::Thickness => &mut self.thickness,
            Dimension::Width => &mut self.width,
            Dimension::Length => &mut self.length,
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn is_quantity_valid(&self) -> bool {
        QUANTITY_RANGE.contains(&self.quantity)
    }

    pub fn maintain_grain_direction(&self) -> bool {
        self.maintain_grain_direction
    }

    /// Whether the grain checkbox should be offered for the current material
    pub fn shows_grain_selection(&self) -> bool {
        self.allow_grain_selection && self.material.as_ref().is_some_and(|m| m.has_grain_direction)
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    pub fn select_material(&mut self, material: Option<AbstractMaterial>, now: Instant) {
        self.material = material;
        self.after_edit(now);
    }

    pub fn set_text(&mut self, dimension: Dimension, text: impl Into<String>, preferred: Unit, now: Instant) {
        self.field_mut(dimension).set_text(text, preferred);
        self.after_edit(now);
    }

    pub fn set_thickness_text(&mut self, text: impl Into<String>, preferred: Unit, now: Instant) {
        self.set_text(Dimension::Thickness, text, preferred, now);
    }

    pub fn set_width_text(&mut self, text: impl Into<String>, preferred: Unit, now: Instant) {
        self.set_text(Dimension::Width, text, preferred, now);
    }

    pub fn set_length_text(&mut self, text: impl Into<String>, preferred: Unit, now: Instant) {
        self.set_text(Dimension::Length, text, preferred, now);
    }

    /// Focus left the input: show the canonical form of a valid value
    pub fn blur(&mut self, dimension: Dimension) {
        self.field_mut(dimension).blur();
    }

    pub fn blur_thickness(&mut self) {
        self.blur(Dimension::Thickness);
    }

    pub fn blur_width(&mut self) {
        self.blur(Dimension::Width);
    }

    pub fn blur_length(&mut self) {
        self.blur(Dimension::Length);
    }

    pub fn set_quantity(&mut self, quantity: u32, now: Instant) {
        self.quantity = quantity;
        self.after_edit(now);
    }

    pub fn set_maintain_grain_direction(&mut self, maintain: bool, now: Instant) {
        self.maintain_grain_direction = maintain;
        self.after_edit(now);
    }

    /// Existing rows restart their save window while ready, and drop a
    /// pending save once an edit leaves them incomplete.
    fn after_edit(&mut self, now: Instant) {
        if self.is_new_row() {
            return;
        }
        if self.is_ready_to_save() {
            self.save.schedule(now);
        } else {
            self.save.cancel();
        }
    }

    // ------------------------------------------------------------------
    // Readiness
    // ------------------------------------------------------------------

    /// Complete and, for an existing row, different from what is saved.
    pub fn is_ready_to_save(&self) -> bool {
        if self.readonly || !self.is_quantity_valid() {
            return false;
        }
        let (Some(material), Some(thickness), Some(width), Some(length)) =
            (&self.material, self.thickness.value, self.width.value, self.length.value)
        else {
            return false;
        };

        match &self.existing {
            None => true,
            Some(saved) => {
                material.id != saved.abstract_material_id
                    || !units::equals(&thickness, &saved.thickness)
                    || !units::equals(&width, &saved.width)
                    || !units::equals(&length, &saved.length)
                    || self.quantity != saved.quantity
                    || self.maintain_grain_direction != saved.should_maintain_grain_direction
            }
        }
    }

    /// The item this row describes, if it is ready to save.
    ///
    /// Keeps the existing id or generates one. The grain flag is only kept
    /// when the material has a grain direction.
    pub fn build_item(&self) -> Option<CutlistItem> {
        if !self.is_ready_to_save() {
            return None;
        }
        let material = self.material.as_ref()?;
        Some(CutlistItem {
            id: self.existing.as_ref().map(|item| item.id).unwrap_or_else(Uuid::new_v4),
            abstract_material_id: material.id,
            thickness: self.thickness.value?,
            width: self.width.value?,
            length: self.length.value?,
            quantity: self.quantity,
            should_maintain_grain_direction: material.has_grain_direction && self.maintain_grain_direction,
        })
    }

    // ------------------------------------------------------------------
    // Commit
    // ------------------------------------------------------------------

    /// New rows only: take the finished item and clear the row for the next
    /// one. Returns `None` if the row is not ready or is an existing row.
    pub fn try_add(&mut self) -> Option<CutlistItem> {
        if !self.is_new_row() {
            return None;
        }
        let item = self.build_item()?;
        self.clear();
        Some(item)
    }

    /// Existing rows only: the updated item once the save window has passed.
    ///
    /// The returned item becomes the row's saved baseline and the saved
    /// indicator is shown.
    pub fn poll(&mut self, now: Instant) -> Option<CutlistItem> {
        if !self.save.poll(now) {
            return None;
        }
        let item = self.build_item()?;
        self.existing = Some(item.clone());
        self.saved_indicator.show(now);
        Some(item)
    }

    pub fn has_pending_save(&self) -> bool {
        self.save.is_pending()
    }

    pub fn shows_saved_indicator(&self, now: Instant) -> bool {
        self.saved_indicator.is_visible(now)
    }

    /// Teardown. Drops a pending save without producing it.
    pub fn close(&mut self) -> bool {
        self.saved_indicator.hide();
        self.save.cancel()
    }

    fn clear(&mut self) {
        self.material = None;
        self.thickness.clear();
        self.width.clear();
        self.length.clear();
        self.quantity = *QUANTITY_RANGE.start();
        self.maintain_grain_direction = false;
    }
}

impl Default for RowEditor {
    fn default() -> Self {
        RowEditor::new_row()
    }
}
