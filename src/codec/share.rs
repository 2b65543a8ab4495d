//! Compact share links.
//!
//! A share payload carries only the display name and the six jar percentages:
//! `name|NEC|FFA|LTS|EDU|PLAY|GIVE`, UTF-8 encoded and then base64 encoded so
//! it survives a URL query parameter. History is never shared.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use url::Url;

use crate::domain::{Jar, JarId, MonthKey, MonthlyRecord};
use crate::errors::{JarsError, ShareDecodeError};
use crate::ledger::RecordStore;

/// Query parameter that carries the payload.
pub const SHARE_PARAM: &str = "s";
/// Name written when the user has not set one.
pub const DEFAULT_SHARE_NAME: &str = "User";

const FIELD_SEPARATOR: char = '|';
const FIELD_COUNT: usize = 1 + JarId::ALL.len();
const QR_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/?size=160x160&data=";

/// A decoded share payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedConfig {
    pub user_name: String,
    /// All six catalog jars, in catalog order, with the shared percentages.
    pub jars: Vec<Jar>,
}

impl SharedConfig {
    /// A store holding one empty record for `month` with the shared jars.
    pub fn into_store(self, month: MonthKey) -> RecordStore {
        RecordStore::from_records(
            vec![MonthlyRecord::with_jars(month, self.jars)],
            self.user_name,
        )
    }
}

/// Encodes `name` and the percentages of `jars` in catalog order. Categories
/// missing from `jars` are written with their catalog default.
pub fn encode_compact(name: &str, jars: &[Jar]) -> String {
    let name: String = name.chars().filter(|c| *c != FIELD_SEPARATOR).collect();
    let name = if name.is_empty() {
        DEFAULT_SHARE_NAME
    } else {
        name.as_str()
    };
    let mut data = String::from(name);
    for id in JarId::ALL {
        let percentage = jars
            .iter()
            .find(|jar| jar.id == id)
            .map(|jar| jar.percentage)
            .unwrap_or(id.catalog_entry().default_percentage);
        data.push(FIELD_SEPARATOR);
        data.push_str(&percentage.to_string());
    }
    STANDARD.encode(data.as_bytes())
}

pub fn decode_compact(payload: &str) -> Result<SharedConfig, ShareDecodeError> {
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| ShareDecodeError::Base64)?;
    let raw = String::from_utf8(bytes).map_err(|_| ShareDecodeError::Utf8)?;
    let parts: Vec<&str> = raw.split(FIELD_SEPARATOR).collect();
    if parts.len() < FIELD_COUNT {
        return Err(ShareDecodeError::FieldCount { found: parts.len() });
    }

    let jars = JarId::ALL
        .into_iter()
        .enumerate()
        .map(|(index, id)| {
            let position = index + 1;
            let value = parts[position].trim();
            value
                .parse::<u8>()
                .ok()
                .filter(|percentage| *percentage <= 100)
                .map(|percentage| Jar::with_percentage(id, percentage))
                .ok_or_else(|| ShareDecodeError::Percentage {
                    position,
                    value: value.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SharedConfig {
        user_name: parts[0].to_string(),
        jars,
    })
}

/// Builds the share link for `base_url`, replacing any query or fragment.
pub fn share_url(base_url: &str, payload: &str) -> Result<String, JarsError> {
    let mut url = Url::parse(base_url).map_err(|err| {
        JarsError::Config(format!("invalid share base url `{}`: {}", base_url, err))
    })?;
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair(SHARE_PARAM, payload);
    Ok(url.to_string())
}

/// Image URL for a QR code rendering of `share_url`.
pub fn qr_code_url(share_url: &str) -> String {
    format!("{}{}", QR_ENDPOINT, urlencoding::encode(share_url))
}

/// Result of pulling the share parameter out of a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumedLink {
    pub payload: Option<String>,
    /// The URL with the share parameter removed; other parameters are kept.
    pub stripped_url: String,
}

/// Extracts the share payload from `url` and returns the URL without it, so
/// reloading the stripped URL does not apply the share a second time. Text
/// that is not an absolute URL is returned unchanged with no payload.
pub fn consume_share_param(url: &str) -> ConsumedLink {
    let Ok(mut parsed) = Url::parse(url) else {
        return ConsumedLink {
            payload: None,
            stripped_url: url.to_string(),
        };
    };

    let mut payload = None;
    let mut kept = Vec::new();
    for (key, value) in parsed.query_pairs() {
        if key == SHARE_PARAM {
            payload.get_or_insert_with(|| value.into_owned());
        } else {
            kept.push((key.into_owned(), value.into_owned()));
        }
    }
    if payload.is_none() {
        return ConsumedLink {
            payload,
            stripped_url: url.to_string(),
        };
    }

    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(kept);
    }
    ConsumedLink {
        payload,
        stripped_url: parsed.to_string(),
    }
}
