// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Guest bundle hand-off between the guest list and the designer.
//!
//! The guest list writes a single bundle record (QR image, name, party
//! size, invitation link) to shared storage. Pasting it into the designer
//! spawns a QR code and two captions laid out around the canvas center.
//! The import is one-shot: the spawned elements keep no link to the guest.

use super::store::{KeyValueStore, StoreError};
use crate::models::element::{ElementKind, ElementPatch, TextTransform, FONT_FAMILIES};
use crate::models::event::Event;
use crate::models::guest::Guest;
use crate::models::project::{CanvasSize, DesignState};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Store key shared by the producer and consumer of bundles.
pub const BUNDLE_KEY: &str = "dex_designer_clipboard_v2";
/// Type tag every valid bundle carries.
pub const BUNDLE_TYPE: &str = "dex_guest_bundle_v2";

const QR_SERVICE: &str = "https://api.qrserver.com/v1/create-qr-code/";

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard is empty")]
    Empty,

    #[error("clipboard holds a malformed bundle: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("clipboard holds a {0:?} record, not a guest bundle")]
    WrongType(String),

    #[error("invalid invitation link: {0}")]
    Link(#[from] url::ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Cross-feature guest payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestBundle {
    #[serde(rename = "type")]
    pub tag: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub pax: u32,
    pub invitation_link: String,
    pub qr_image: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub event_id: String,
    pub event_name: String,
}

/// `<site>/#/<event slug>?token=<token>`
pub fn invitation_link(site_url: &str, slug: &str, token: &str) -> String {
    format!("{}/#/{}?token={}", site_url.trim_end_matches('/'), slug, token)
}

/// URL of a QR image encoding `data`.
pub fn qr_image_url(data: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(QR_SERVICE, &[("size", "500x500"), ("data", data)])
}

impl GuestBundle {
    /// Build the bundle the guest list would stage for `guest`.
    pub fn for_guest(event: &Event, guest: &Guest, site_url: &str) -> Result<Self, ClipboardError> {
        let now = chrono::Utc::now().timestamp_millis();
        let link = invitation_link(site_url, &event.slug, &guest.token(now));
        let qr_image = qr_image_url(&link)?.to_string();
        Ok(Self {
            tag: BUNDLE_TYPE.to_string(),
            name: guest.name.clone(),
            email: guest.email.clone(),
            phone: guest.phone.clone(),
            pax: guest.guest_count,
            invitation_link: link,
            qr_image,
            timestamp: now,
            event_id: event.id.clone(),
            event_name: event.couple_names.clone(),
        })
    }

    /// The three elements this bundle turns into, placed relative to the
    /// center of `canvas`.
    pub fn layout(&self, canvas: &CanvasSize) -> [(ElementKind, ElementPatch); 3] {
        let cx = canvas.width as f64 / 2.0;
        let cy = canvas.height as f64 / 2.0;

        let qr = ElementPatch {
            content: Some(self.qr_image.clone()),
            width: Some(450.0),
            height: Some(450.0),
            x: Some(cx - 225.0),
            y: Some(cy - 400.0),
            ..Default::default()
        };
        let name = ElementPatch {
            content: Some(self.name.to_uppercase()),
            font_size: Some(54.0),
            font_weight: Some("900".into()),
            font_family: Some(FONT_FAMILIES[1].1.into()),
            width: Some(700.0),
            x: Some(cx - 350.0),
            y: Some(cy + 120.0),
            ..Default::default()
        };
        let pax = ElementPatch {
            content: Some(format!("INVITATION VALID FOR {} PERSON(S)", self.pax)),
            font_size: Some(24.0),
            font_weight: Some("700".into()),
            color: Some("#F97316".into()),
            text_transform: Some(TextTransform::Uppercase),
            width: Some(600.0),
            x: Some(cx - 300.0),
            y: Some(cy + 210.0),
            ..Default::default()
        };

        [
            (ElementKind::QrCode, qr),
            (ElementKind::Text, name),
            (ElementKind::Text, pax),
        ]
    }
}

/// Read and validate the staged bundle.
pub fn read_bundle(store: &dyn KeyValueStore) -> Result<GuestBundle, ClipboardError> {
    let raw = store.get(BUNDLE_KEY)?.ok_or(ClipboardError::Empty)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let tag = value.get("type").and_then(|t| t.as_str()).unwrap_or_default();
    if tag != BUNDLE_TYPE {
        return Err(ClipboardError::WrongType(tag.to_string()));
    }
    Ok(serde_json::from_value(value)?)
}

/// Stage a bundle for the designer to pick up.
pub fn write_bundle(store: &dyn KeyValueStore, bundle: &GuestBundle) -> Result<(), ClipboardError> {
    let raw = serde_json::to_string(bundle)?;
    store.put(BUNDLE_KEY, &raw)?;
    log::info!("Staged guest bundle for {} ({} pax)", bundle.name, bundle.pax);
    Ok(())
}

/// Materialize the staged bundle into `design`. Returns the new ids.
///
/// Nothing is added unless the bundle is present and valid.
pub fn paste_bundle(
    store: &dyn KeyValueStore,
    design: &mut DesignState,
) -> Result<(GuestBundle, Vec<String>), ClipboardError> {
    let bundle = read_bundle(store)?;
    let ids = bundle
        .layout(design.canvas_size())
        .into_iter()
        .map(|(kind, patch)| design.add_element(kind, patch))
        .collect();
    log::info!("Pasted guest bundle for {}", bundle.name);
    Ok((bundle, ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::MemoryStore;
    use crate::models::project::CanvasPreset;

    fn guest() -> Guest {
        Guest {
            id: "g1".into(),
            name: "Ana Souza".into(),
            email: None,
            phone: Some("+55 (11) 99999-0000".into()),
            guest_count: 3,
            invitation_token: Some("tok123".into()),
            extra: Default::default(),
        }
    }

    fn staged_store() -> (MemoryStore, GuestBundle) {
        let store = MemoryStore::new();
        let event = Event::new("evt", "Ana & Bruno");
        let bundle = GuestBundle::for_guest(&event, &guest(), "https://invites.example/").unwrap();
        write_bundle(&store, &bundle).unwrap();
        (store, bundle)
    }

    #[test]
    fn test_bundle_links() {
        let (_, bundle) = staged_store();
        assert_eq!(
            bundle.invitation_link,
            "https://invites.example/#/ana-bruno?token=tok123"
        );
        let qr = Url::parse(&bundle.qr_image).unwrap();
        let data = qr
            .query_pairs()
            .find(|(k, _)| k == "data")
            .map(|(_, v)| v.into_owned());
        assert_eq!(data.as_deref(), Some(bundle.invitation_link.as_str()));
        assert_eq!(bundle.tag, BUNDLE_TYPE);
    }

    #[test]
    fn test_empty_clipboard_leaves_design_alone() {
        let store = MemoryStore::new();
        let mut design = DesignState::new();
        let rev = design.revision();
        assert!(matches!(
            paste_bundle(&store, &mut design),
            Err(ClipboardError::Empty)
        ));
        assert_eq!(design.revision(), rev);
    }

    #[test]
    fn test_wrong_type_and_malformed() {
        let store = MemoryStore::new();
        let mut design = DesignState::new();
        store.put(BUNDLE_KEY, r#"{"type":"something_else"}"#).unwrap();
        assert!(matches!(
            paste_bundle(&store, &mut design),
            Err(ClipboardError::WrongType(_))
        ));
        store.put(BUNDLE_KEY, "{oops").unwrap();
        assert!(matches!(
            paste_bundle(&store, &mut design),
            Err(ClipboardError::Malformed(_))
        ));
        assert!(design.elements().is_empty());
    }

    #[test]
    fn test_bundle_from_guest_screen_is_accepted() {
        let store = MemoryStore::new();
        store
            .put(
                "dex_designer_clipboard_v2",
                r#"{"type":"dex_guest_bundle_v2","name":"Bia","pax":2,
                    "invitationLink":"https://invites.example/#/ana?token=t",
                    "qrImage":"https://api.qrserver.com/v1/create-qr-code/?size=500x500&data=x",
                    "timestamp":1700000000000,"eventId":"evt","eventName":"Ana"}"#,
            )
            .unwrap();
        let mut design = DesignState::new();
        let (bundle, ids) = paste_bundle(&store, &mut design).unwrap();
        assert_eq!(bundle.name, "Bia");
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_paste_layout() {
        let (store, bundle) = staged_store();
        let mut design = DesignState::new();
        design.set_canvas_size(CanvasPreset::Stories.size());
        let (_, ids) = paste_bundle(&store, &mut design).unwrap();
        assert_eq!(ids.len(), 3);

        let qr = design.element(&ids[0]).unwrap();
        assert_eq!(qr.kind, ElementKind::QrCode);
        assert_eq!((qr.x, qr.y, qr.width, qr.height), (540.0 - 225.0, 960.0 - 400.0, 450.0, 450.0));
        assert_eq!(qr.content, bundle.qr_image);

        let name = design.element(&ids[1]).unwrap();
        assert_eq!(name.content, "ANA SOUZA");
        assert_eq!((name.x, name.y), (190.0, 1080.0));

        let pax = design.element(&ids[2]).unwrap();
        assert_eq!(pax.content, "INVITATION VALID FOR 3 PERSON(S)");
        assert_eq!((pax.x, pax.y), (240.0, 1170.0));
    }

    #[test]
    fn test_pasting_twice_gives_independent_sets() {
        let (store, _) = staged_store();
        let mut design = DesignState::new();
        let (_, first) = paste_bundle(&store, &mut design).unwrap();
        let (_, second) = paste_bundle(&store, &mut design).unwrap();
        assert_eq!(design.elements().len(), 6);
        for id in &first {
            assert!(!second.contains(id));
        }

        design.update_element(&first[1], &ElementPatch::content("CHANGED"));
        assert_eq!(design.element(&second[1]).unwrap().content, "ANA SOUZA");
    }
}
