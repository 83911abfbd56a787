// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Events and the active-event pointer.
//!
//! Each event owns one design. The registry keeps the list of events, which
//! one is active, and notifies subscribers when the active event changes.

use crate::io::store::{get_json, put_json, KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};

/// Store key of the event list.
pub const EVENTS_KEY: &str = "events";

/// An event (wedding, party, ...) that designs and guest lists belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub slug: String,
    pub couple_names: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wedding_date: Option<String>,
}

impl Event {
    pub fn new(id: impl Into<String>, couple_names: impl Into<String>) -> Self {
        let couple_names = couple_names.into();
        Self {
            id: id.into(),
            slug: slugify(&couple_names),
            couple_names,
            wedding_date: None,
        }
    }

    /// Name of a brand new design for this event.
    pub fn default_project_name(&self) -> String {
        let names = if self.couple_names.trim().is_empty() {
            "MASTER".to_string()
        } else {
            self.couple_names.to_uppercase()
        };
        format!("INVITATION - {names}")
    }
}

/// Lowercase ASCII words joined by dashes.
pub fn slugify(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

type Listener = Box<dyn FnMut(Option<&Event>) + Send>;

/// Event list plus the active-event pointer, with change notification.
#[derive(Default)]
pub struct EventRegistry {
    events: Vec<Event>,
    active: Option<String>,
    listeners: Vec<Listener>,
}

impl EventRegistry {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    /// Load the event list from the store.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StoreError> {
        let events: Vec<Event> = get_json(store, EVENTS_KEY)?.unwrap_or_default();
        log::info!("Loaded {} events", events.len());
        Ok(Self::new(events))
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        put_json(store, EVENTS_KEY, &self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Insert or replace an event by id.
    pub fn upsert(&mut self, event: Event) {
        match self.events.iter_mut().find(|e| e.id == event.id) {
            Some(existing) => *existing = event,
            None => self.events.push(event),
        }
    }

    pub fn active(&self) -> Option<&Event> {
        self.active.as_deref().and_then(|id| self.get(id))
    }

    /// Make `id` the active event (or none). Subscribers are notified only
    /// when the active event actually changes. Unknown ids are rejected.
    pub fn set_active(&mut self, id: Option<&str>) -> bool {
        if let Some(id) = id {
            if self.get(id).is_none() {
                log::warn!("Ignoring unknown event {}", id);
                return false;
            }
        }
        if self.active.as_deref() == id {
            return false;
        }
        self.active = id.map(str::to_string);
        log::info!("Active event is now {:?}", self.active);

        let active = self.active.as_deref().and_then(|id| self.events.iter().find(|e| e.id == id));
        for listener in self.listeners.iter_mut() {
            listener(active);
        }
        true
    }

    /// Register a listener for active-event changes. Listeners live as
    /// long as the registry.
    pub fn subscribe(&mut self, listener: impl FnMut(Option<&Event>) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }
}
