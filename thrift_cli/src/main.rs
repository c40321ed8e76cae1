//! # Thrift CLI
//!
//! Command-line front end for Thrift. Each invocation opens the saved state,
//! applies one command and writes the state back before exiting.

use std::fs;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use thrift_core::materials::AbstractMaterial;
use thrift_core::project::PhysicalMaterial;
use thrift_core::row_editor::{Dimension, RowEditor};
use thrift_core::state::State;
use thrift_core::storage::FileStore;
use thrift_core::store::{Store, StoreConfig};
use thrift_core::units::{self, ImperialPrecision, Measurement, Unit};
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::opts::{
    Command, CutlistCommand, InventoryCommand, Opts, PrefsCommand, ProjectCommand, RowArgs, RowEditArgs,
};

mod opts;

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(opts.verbose.tracing_level_filter().into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let data_dir = opts.resolve_data_dir()?;
    debug!("Using data directory {}", data_dir.display());

    let config = StoreConfig::default().with_debounce(Duration::from_millis(opts.debounce_ms));
    let mut store = Store::open(FileStore::new(data_dir), config)?;

    run(&mut store, opts.command)?;

    // every command's changes are saved before exit
    if store.flush()? {
        info!("Saved");
    }
    store.close();
    Ok(())
}

fn run(store: &mut Store<FileStore>, command: Command) -> anyhow::Result<()> {
    let now = Instant::now();
    let prefs = store.state().preferences;

    match command {
        Command::Parse { text, unit, json } => {
            let m = parse_measurement(&text, unit.unwrap_or(prefs.preferred_unit))?;
            if json {
                println!("{}", serde_json::to_string(&m)?);
            } else {
                println!("{}", units::format_with_precision(&m, prefs.imperial_precision));
            }
        }
        Command::Convert { text, to, unit } => {
            let m = parse_measurement(&text, unit.unwrap_or(prefs.preferred_unit))?;
            println!("{}", units::format_with_precision(&m.to_unit(to), prefs.imperial_precision));
        }
        Command::Compare { a, b, unit } => {
            let preferred = unit.unwrap_or(prefs.preferred_unit);
            let a = parse_measurement(&a, preferred)?;
            let b = parse_measurement(&b, preferred)?;
            println!("{}", if units::equals(&a, &b) { "equal" } else { "not equal" });
        }
        Command::Catalog => {
            for material in &store.state().catalog {
                let grain = if material.has_grain_direction { "grain" } else { "-" };
                println!("{}\t{}\t{}", material.name, material.material_type.display_name(), grain);
            }
        }
        Command::Project { command } => run_project(store, command, now)?,
        Command::Cutlist { command } => run_cutlist(store, command, now)?,
        Command::Inventory { command } => run_inventory(store, command, now)?,
        Command::Prefs { command } => match command {
            PrefsCommand::Show => {
                println!("unit\t{}", prefs.preferred_unit);
                println!("precision\t{}", prefs.imperial_precision.display_name());
            }
            PrefsCommand::Unit { unit } => {
                store.set_preferred_unit(unit, now);
                println!("Preferred unit: {}", unit.display_name());
            }
            PrefsCommand::Precision { precision } => {
                store.set_imperial_precision(precision, now);
                println!("Imperial precision: {}", precision.display_name());
            }
        },
        Command::Backup { output } => {
            let backup = store.export_backup()?;
            match output {
                Some(path) => {
                    fs::write(&path, backup).with_context(|| format!("Writing backup to {}", path.display()))?;
                    println!("Backup written to {}", path.display());
                }
                None => println!("{backup}"),
            }
        }
        Command::Restore { file } => {
            let json = fs::read_to_string(&file).with_context(|| format!("Reading backup {}", file.display()))?;
            store.restore_backup(&json, now)?;
            println!("Restored {} projects", store.state().projects.len());
        }
        Command::Reset { yes } => {
            if !yes {
                bail!("Reset discards all projects and inventory; pass --yes to confirm");
            }
            store.reset(now);
            println!("Started over");
        }
    }
    Ok(())
}

fn run_project(store: &mut Store<FileStore>, command: ProjectCommand, now: Instant) -> anyhow::Result<()> {
    match command {
        ProjectCommand::Add => {
            let id = store.add_project(now);
            let name = find_project(store.state(), &id.to_string())?.name.clone();
            println!("{id}\t{name}");
        }
        ProjectCommand::List => {
            for project in &store.state().projects {
                println!("{}\t{}\t{} pieces", project.id, project.name, project.piece_count());
            }
        }
        ProjectCommand::Edit {
            project,
            name,
            description,
            image_urls,
        } => {
            let mut header = find_project(store.state(), &project)?.header();
            if let Some(name) = name {
                header.name = name;
            }
            if let Some(description) = description {
                header.description = description;
            }
            if !image_urls.is_empty() {
                header.image_urls = image_urls.join("\n");
            }
            let name = header.name.clone();
            store.edit_project_header(header, now)?;
            println!("Updated {name}");
        }
        ProjectCommand::Show { project, json } => {
            let state = store.state();
            let project = find_project(state, &project)?;
            if json {
                println!("{}", serde_json::to_string_pretty(project)?);
                return Ok(());
            }
            println!("{}", project.name);
            if !project.description.is_empty() {
                println!("{}", project.description);
            }
            for url in project.image_url_list() {
                println!("image\t{url}");
            }
            for item in &project.cutlist {
                println!("{}", item_line(state, item));
            }
        }
    }
    Ok(())
}

fn run_cutlist(store: &mut Store<FileStore>, command: CutlistCommand, now: Instant) -> anyhow::Result<()> {
    let preferred = store.state().preferences.preferred_unit;
    match command {
        CutlistCommand::Add { project, row, grain } => {
            let project_id = find_project(store.state(), &project)?.id;
            let mut editor = RowEditor::new_row().allow_grain_selection(true);
            fill_row(&mut editor, store.state(), &row, preferred, now)?;
            editor.set_maintain_grain_direction(grain, now);

            let item = editor.try_add().ok_or_else(|| row_error(&editor))?;
            store.add_material_to_project(project_id, item.clone(), now)?;
            println!("{}", item_line(store.state(), &item));
        }
        CutlistCommand::Update { project, item, row, grain } => {
            let project = find_project(store.state(), &project)?;
            let project_id = project.id;
            let existing = project
                .get_item(&item)
                .ok_or_else(|| anyhow!("No cut-list item {item} in {}", project.name))?;

            let mut editor = RowEditor::for_item(existing, &store.catalog_index()).allow_grain_selection(true);
            edit_row(&mut editor, store.state(), &row, preferred, now)?;
            if let Some(grain) = grain {
                editor.set_maintain_grain_direction(grain, now);
            }

            let Some(updated) = editor.build_item() else {
                check_row(&editor)?;
                println!("Nothing to update");
                return Ok(());
            };
            editor.close();
            store.update_material_in_project(project_id, updated.clone(), now)?;
            println!("{}", item_line(store.state(), &updated));
        }
    }
    Ok(())
}

fn run_inventory(store: &mut Store<FileStore>, command: InventoryCommand, now: Instant) -> anyhow::Result<()> {
    let preferred = store.state().preferences.preferred_unit;
    match command {
        InventoryCommand::Add { row } => {
            let mut editor = RowEditor::new_row();
            fill_row(&mut editor, store.state(), &row, preferred, now)?;

            let material = editor.try_add().ok_or_else(|| row_error(&editor))?;
            store.add_material_to_inventory(material.clone(), now)?;
            println!("{}", item_line(store.state(), &material));
        }
        InventoryCommand::Update { item, row } => {
            let existing = store
                .state()
                .find_inventory_item(&item)
                .ok_or_else(|| anyhow!("No inventory item {item}"))?;

            let mut editor = RowEditor::for_item(existing, &store.catalog_index());
            edit_row(&mut editor, store.state(), &row, preferred, now)?;

            let Some(updated) = editor.build_item() else {
                check_row(&editor)?;
                println!("Nothing to update");
                return Ok(());
            };
            editor.close();
            store.update_material_in_inventory(updated.clone(), now)?;
            println!("{}", item_line(store.state(), &updated));
        }
        InventoryCommand::List { json } => {
            let state = store.state();
            if json {
                println!("{}", serde_json::to_string_pretty(&state.inventory)?);
            } else {
                for material in &state.inventory {
                    println!("{}", item_line(state, material));
                }
            }
        }
    }
    Ok(())
}

fn parse_measurement(text: &str, preferred: Unit) -> anyhow::Result<Measurement> {
    units::parse(text, preferred).ok_or_else(|| anyhow!("'{text}' is not a valid measurement"))
}

fn find_project<'a>(state: &'a State, reference: &str) -> anyhow::Result<&'a thrift_core::Project> {
    state
        .find_project_by_ref(reference)
        .ok_or_else(|| anyhow!("No project named or with id '{reference}'"))
}

fn find_material(state: &State, name: &str) -> anyhow::Result<AbstractMaterial> {
    state
        .catalog_index()
        .find_by_name(name)
        .cloned()
        .ok_or_else(|| anyhow!("No material named '{name}' in the catalog, see 'thrift catalog'"))
}

fn fill_row(editor: &mut RowEditor, state: &State, row: &RowArgs, preferred: Unit, now: Instant) -> anyhow::Result<()> {
    editor.select_material(Some(find_material(state, &row.material)?), now);
    editor.set_thickness_text(row.thickness.as_str(), preferred, now);
    editor.set_width_text(row.width.as_str(), preferred, now);
    editor.set_length_text(row.length.as_str(), preferred, now);
    editor.set_quantity(row.quantity, now);
    Ok(())
}

fn edit_row(editor: &mut RowEditor, state: &State, row: &RowEditArgs, preferred: Unit, now: Instant) -> anyhow::Result<()> {
    if let Some(name) = &row.material {
        editor.select_material(Some(find_material(state, name)?), now);
    }
    if let Some(text) = &row.thickness {
        editor.set_thickness_text(text.as_str(), preferred, now);
    }
    if let Some(text) = &row.width {
        editor.set_width_text(text.as_str(), preferred, now);
    }
    if let Some(text) = &row.length {
        editor.set_length_text(text.as_str(), preferred, now);
    }
    if let Some(quantity) = row.quantity {
        editor.set_quantity(quantity, now);
    }
    Ok(())
}

/// Explain why a row cannot be saved
fn row_error(editor: &RowEditor) -> anyhow::Error {
    match check_row(editor) {
        Err(e) => e,
        Ok(()) => anyhow!("Row is incomplete"),
    }
}

fn check_row(editor: &RowEditor) -> anyhow::Result<()> {
    if editor.material().is_none() {
        bail!("No material selected; pass --material with a name from 'thrift catalog'");
    }
    for dimension in Dimension::ALL {
        let field = editor.field(dimension);
        if !field.is_valid() {
            bail!(
                "{} '{}' is not a valid measurement (e.g. {})",
                dimension.display_name(),
                field.text(),
                dimension.example()
            );
        }
    }
    if !editor.is_quantity_valid() {
        bail!("Quantity {} is out of range (1 to 10000)", editor.quantity());
    }
    Ok(())
}

fn item_line(state: &State, item: &PhysicalMaterial) -> String {
    let precision: ImperialPrecision = state.preferences.imperial_precision;
    let material = state
        .find_material(&item.abstract_material_id)
        .map(|m| m.name.as_str())
        .unwrap_or("?");
    let grain = if item.should_maintain_grain_direction { "\tgrain" } else { "" };
    format!(
        "{}\t{}\t{} x {} x {}\tx{}{}",
        item.id,
        material,
        units::format_with_precision(&item.thickness, precision),
        units::format_with_precision(&item.width, precision),
        units::format_with_precision(&item.length, precision),
        item.quantity,
        grain
    )
}
