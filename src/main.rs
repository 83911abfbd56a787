// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Invitation Designer
//!
//! A desktop canvas editor for event invitations: free-form placement of
//! text, images, shapes, badges and guest QR codes, with per-event
//! autosave and export to JPEG, PNG or PDF.

mod app;
mod config;
mod designer;
mod interaction;
mod io;
mod models;
mod ui;
mod util;

use anyhow::{anyhow, Context, Result};
use app::DesignerApp;
use clap::Parser;
use config::{Cli, Command};
use io::export::{self, FlatRasterizer};
use io::store::{FileStore, KeyValueStore, ProjectRepository};
use models::event::{Event, EventRegistry};
use std::sync::Arc;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir();
    let store = FileStore::open(&data_dir)
        .with_context(|| format!("Failed to open store at {}", data_dir.display()))?;
    log::info!("Using store at {}", store.root().display());

    if let Some(command) = &cli.command {
        return run_command(command, &store, &cli.site_url);
    }
    run_gui(cli, Arc::new(store))
}

fn run_gui(cli: Cli, store: Arc<dyn KeyValueStore>) -> Result<()> {
    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 900.0])
            .with_min_inner_size([960.0, 640.0])
            .with_title("Invitation Designer"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Invitation Designer",
        options,
        Box::new(move |_cc| Ok(Box::new(DesignerApp::new(store, &cli)))),
    )
    .map_err(|e| anyhow!("Application error: {}", e))?;

    Ok(())
}

fn run_command(command: &Command, store: &dyn KeyValueStore, site_url: &str) -> Result<()> {
    match command {
        Command::AddEvent { id, name } => {
            let mut registry = EventRegistry::load(store)?;
            registry.upsert(Event::new(id.as_str(), name.as_str()));
            registry.save(store)?;
            println!("Registered event {id} ({name})");
        }
        Command::AddGuest {
            event,
            id,
            name,
            phone,
            email,
            pax,
        } => {
            let registry = EventRegistry::load(store)?;
            if registry.get(event).is_none() {
                return Err(anyhow!("Unknown event {event}"));
            }
            let guest = models::guest::Guest {
                id: id.clone(),
                name: name.clone(),
                email: email.clone(),
                phone: phone.clone(),
                guest_count: (*pax).max(1),
                invitation_token: None,
                extra: Default::default(),
            };
            models::guest::upsert_guest(store, event, guest)?;
            println!("Saved guest {id} ({name}) for event {event}");
        }
        Command::StageBundle { event, guest } => {
            let registry = EventRegistry::load(store)?;
            let event = registry
                .get(event)
                .ok_or_else(|| anyhow!("Unknown event {event}"))?;
            let guests = models::guest::load_guests(store, &event.id)?;
            let guest = guests
                .iter()
                .find(|g| &g.id == guest)
                .ok_or_else(|| anyhow!("Unknown guest {guest} for event {}", event.id))?;
            let bundle = io::clipboard::GuestBundle::for_guest(event, guest, site_url)?;
            io::clipboard::write_bundle(store, &bundle)?;
            println!("Staged bundle for {} ({})", bundle.name, bundle.invitation_link);
        }
        Command::Export { event, format, output } => {
            let project = ProjectRepository::new(store)
                .get(event)?
                .ok_or_else(|| anyhow!("No design stored for event {event}"))?;
            let path = output
                .clone()
                .unwrap_or_else(|| export::default_file_name(&project.project_name, *format).into());
            export::export_project(&FlatRasterizer, &project, *format, &path)?;
            println!("Wrote {}", path.display());
        }
        Command::Dump { event, output } => {
            let project = ProjectRepository::new(store)
                .get(event)?
                .ok_or_else(|| anyhow!("No design stored for event {event}"))?;
            io::serialization::export_project(&project, output)?;
            println!("Wrote {}", output.display());
        }
        Command::Load { event, input } => {
            let project = io::serialization::import_project(input)?;
            ProjectRepository::new(store).put(event, &project)?;
            println!("Stored {} elements for event {event}", project.elements.len());
        }
    }
    Ok(())
}
