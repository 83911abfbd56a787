// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Command line and environment configuration.
//!
//! Without a subcommand the designer window opens. The subcommands run
//! headless against the same store.

use crate::io::autosave::DEFAULT_DEBOUNCE;
use crate::io::export::ExportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "invite-designer";

/// Invitation designer.
#[derive(Parser, Debug)]
#[command(name = "invite-designer", version, about)]
pub struct Cli {
    /// Directory holding the key-value store.
    #[arg(long, env = "DESIGNER_DATA_DIR", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Event to open on start (defaults to the first registered one).
    #[arg(long, env = "DESIGNER_EVENT", value_name = "ID")]
    pub event: Option<String>,

    /// Quiet period before an edit is autosaved, in milliseconds.
    #[arg(
        long,
        env = "DESIGNER_AUTOSAVE_MS",
        default_value_t = DEFAULT_DEBOUNCE.as_millis() as u64,
        value_name = "MS"
    )]
    pub autosave_ms: u64,

    /// Base URL of the invitation site, used in invitation links.
    #[arg(
        long,
        env = "DESIGNER_SITE_URL",
        default_value = "http://localhost:3000",
        value_name = "URL",
        global = true
    )]
    pub site_url: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register (or rename) an event.
    AddEvent {
        #[arg(long)]
        id: String,
        /// Couple names shown on the invitation.
        #[arg(long)]
        name: String,
    },
    /// Add a guest to an event's guest list, or update one with the same id.
    AddGuest {
        #[arg(long)]
        event: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// People admitted by the invitation.
        #[arg(long, default_value_t = 1)]
        pax: u32,
    },
    /// Stage a guest bundle for pasting into the designer.
    StageBundle {
        #[arg(long)]
        event: String,
        #[arg(long)]
        guest: String,
    },
    /// Render a stored design to an image or PDF.
    Export {
        #[arg(long)]
        event: String,
        #[arg(long, value_enum, default_value_t = ExportFormat::Jpeg)]
        format: ExportFormat,
        /// Output file; defaults to the project name in the current directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write a stored design to a JSON or YAML file.
    Dump {
        #[arg(long)]
        event: String,
        #[arg(long)]
        output: PathBuf,
    },
    /// Replace a stored design with one read from a JSON or YAML file.
    Load {
        #[arg(long)]
        event: String,
        #[arg(long)]
        input: PathBuf,
    },
}

impl Cli {
    /// Store directory: the flag, else the platform data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
        })
    }

    pub fn autosave_window(&self) -> Duration {
        Duration::from_millis(self.autosave_ms)
    }
}
