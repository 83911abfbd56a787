// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! WhatsApp share links for invitations.

use crate::models::guest::Guest;
use thiserror::Error;
use url::Url;

const WHATSAPP_SEND: &str = "https://web.whatsapp.com/send";

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("{0} has no phone number")]
    NoPhone(String),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// Default message for a guest.
pub fn default_message(guest: &Guest, event_name: &str) -> String {
    format!(
        "Hi {}! You are invited to {}. Please confirm your attendance.",
        guest.name, event_name
    )
}

/// Build the WhatsApp send link for `guest`.
pub fn whatsapp_link(guest: &Guest, message: &str, invitation_link: &str) -> Result<Url, ShareError> {
    let digits: String = guest
        .phone
        .as_deref()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return Err(ShareError::NoPhone(guest.name.clone()));
    }
    let text = format!("{message}\n\nInvitation link: {invitation_link}");
    let url = Url::parse_with_params(WHATSAPP_SEND, &[("phone", digits.as_str()), ("text", text.as_str())])?;
    log::debug!("Share link for {} built", guest.name);
    Ok(url)
}
