// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Guest records.
//!
//! Guest lists are owned by the guest-management screen. The designer reads
//! them to build invitation bundles and share links; the `add-guest`
//! command upserts single guests without touching the other fields.

use crate::io::store::{get_json, put_json, KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};

/// A guest as stored by the guest list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Number of people the invitation admits.
    #[serde(default = "one")]
    pub guest_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitation_token: Option<String>,
    /// Fields owned by the guest screen (RSVP state, notes, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn one() -> u32 {
    1
}

impl Guest {
    /// The stored invitation token, or a fresh one derived from the id.
    pub fn token(&self, now_millis: i64) -> String {
        self.invitation_token
            .clone()
            .unwrap_or_else(|| format!("inv_{}_{}", self.id, to_base36(now_millis.max(0) as u64)))
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

pub fn guests_key(event_id: &str) -> String {
    format!("dex_guests_{event_id}")
}

/// Load the guest list of an event; a missing list is empty.
pub fn load_guests(store: &dyn KeyValueStore, event_id: &str) -> Result<Vec<Guest>, StoreError> {
    Ok(get_json(store, &guests_key(event_id))?.unwrap_or_default())
}

pub fn save_guests(
    store: &dyn KeyValueStore,
    event_id: &str,
    guests: &[Guest],
) -> Result<(), StoreError> {
    put_json(store, &guests_key(event_id), &guests)
}

/// Insert `guest`, or update the guest with the same id. An update keeps
/// the stored token and guest-screen fields.
pub fn upsert_guest(store: &dyn KeyValueStore, event_id: &str, guest: Guest) -> Result<(), StoreError> {
    let mut guests = load_guests(store, event_id)?;
    match guests.iter_mut().find(|g| g.id == guest.id) {
        Some(existing) => {
            existing.name = guest.name;
            existing.email = guest.email.or(existing.email.take());
            existing.phone = guest.phone.or(existing.phone.take());
            existing.guest_count = guest.guest_count;
            if guest.invitation_token.is_some() {
                existing.invitation_token = guest.invitation_token;
            }
        }
        None => guests.push(guest),
    }
    save_guests(store, event_id, &guests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::MemoryStore;

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn test_token_prefers_stored() {
        let mut guest = Guest {
            id: "g1".into(),
            name: "Ana".into(),
            email: None,
            phone: None,
            guest_count: 2,
            invitation_token: None,
            extra: Default::default(),
        };
        assert_eq!(guest.token(36), "inv_g1_10");
        guest.invitation_token = Some("tok".into());
        assert_eq!(guest.token(36), "tok");
    }

    #[test]
    fn test_guest_list_roundtrip_and_defaults() {
        let store = MemoryStore::new();
        assert!(load_guests(&store, "evt").unwrap().is_empty());

        store
            .put(&guests_key("evt"), r#"[{"id":"g","name":"Bia","rsvpStatus":"PENDING"}]"#)
            .unwrap();
        let guests = load_guests(&store, "evt").unwrap();
        assert_eq!(guests[0].guest_count, 1);

        save_guests(&store, "evt", &guests).unwrap();
        assert_eq!(load_guests(&store, "evt").unwrap(), guests);
        let raw = store.get(&guests_key("evt")).unwrap().unwrap();
        assert!(raw.contains(r#""rsvpStatus":"PENDING""#), "{raw}");
    }

    #[test]
    fn test_upsert_keeps_guest_screen_fields() {
        let store = MemoryStore::new();
        store
            .put(
                &guests_key("evt"),
                r#"[{"id":"g","name":"Bia","invitationToken":"tok","rsvpStatus":"CONFIRMED"}]"#,
            )
            .unwrap();

        let update = Guest {
            id: "g".into(),
            name: "Bia Souza".into(),
            email: None,
            phone: Some("+55 11 99999-0000".into()),
            guest_count: 3,
            invitation_token: None,
            extra: Default::default(),
        };
        upsert_guest(&store, "evt", update.clone()).unwrap();
        upsert_guest(&store, "evt", Guest { id: "h".into(), ..update }).unwrap();

        let guests = load_guests(&store, "evt").unwrap();
        assert_eq!(guests.len(), 2);
        assert_eq!(guests[0].name, "Bia Souza");
        assert_eq!(guests[0].guest_count, 3);
        assert_eq!(guests[0].invitation_token.as_deref(), Some("tok"));
        assert_eq!(guests[0].extra["rsvpStatus"], "CONFIRMED");
        assert_eq!(guests[1].id, "h");
    }
}
