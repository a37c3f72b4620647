//! Instagram message page parsing.
//!
//! A page (`message_<N>.json`) is read into a generic [`serde_json::Value`]
//! first. Recognized fields are then mapped onto typed values; everything
//! else is dropped without error, so export format drift in unrelated fields
//! never costs a conversation.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use crate::error::{DocumentError, IdentityError};
use crate::message::{Attachment, Message};
use crate::models::ParticipantIdentity;

/// Media fields that hold one array item per attachment.
const MEDIA_FIELDS: &[(&str, Attachment)] = &[
    ("photos", Attachment::Photo),
    ("videos", Attachment::Video),
    ("audio_files", Attachment::Audio),
    ("gifs", Attachment::Gif),
    ("files", Attachment::File),
];

/// One parsed message page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePage {
    /// Participant names in file order; `None` where an entry has no usable name.
    pub participants: Vec<Option<String>>,
    /// Messages in file order.
    pub messages: Vec<Message>,
}

impl MessagePage {
    /// Extracts the participant identity of a first page.
    ///
    /// Only exactly two named participants form a valid identity.
    pub fn identity(&self) -> Result<ParticipantIdentity, IdentityError> {
        let names: Vec<String> = self.participants.iter().flatten().cloned().collect();
        if self.participants.len() != 2 || names.len() != 2 {
            return Err(IdentityError::InvalidParticipants { found: names.len() });
        }
        Ok(ParticipantIdentity::new(names))
    }
}

/// Fix Meta's broken encoding (Mojibake).
///
/// Meta exports UTF-8 text as if every byte were an ISO-8859-1 character:
/// "Привет" comes out as "ÐŸÑ€Ð¸Ð²ÐµÑ‚". Text that contains characters
/// outside Latin-1, or whose bytes do not form valid UTF-8, is returned
/// unchanged.
pub fn fix_mojibake_encoding(s: &str) -> String {
    if s.is_ascii() || s.chars().any(|c| u32::from(c) > 0xFF) {
        return s.to_string();
    }
    let bytes: Vec<u8> = s.chars().map(|c| c as u8).collect();
    String::from_utf8(bytes).unwrap_or_else(|_| s.to_string())
}

/// Parses a millisecond timestamp to DateTime.
pub fn parse_ms_timestamp(timestamp_ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(timestamp_ms).single()
}

/// Parses a page from raw bytes.
pub fn parse_page(bytes: &[u8], fix_encoding: bool) -> Result<MessagePage, DocumentError> {
    let document: Value = serde_json::from_slice(bytes)?;
    page_from_document(&document, fix_encoding)
}

/// Maps a generic JSON document onto a [`MessagePage`].
pub fn page_from_document(
    document: &Value,
    fix_encoding: bool,
) -> Result<MessagePage, DocumentError> {
    let object = document.as_object().ok_or(DocumentError::NotAnObject)?;
    let text = |s: &str| {
        if fix_encoding {
            fix_mojibake_encoding(s)
        } else {
            s.to_string()
        }
    };

    let participants = array_field(object, "participants")
        .map(|p| {
            p.get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.trim().is_empty())
                .map(text)
        })
        .collect();

    let messages = array_field(object, "messages")
        .filter_map(Value::as_object)
        .map(|raw| message_from_object(raw, &text))
        .collect();

    Ok(MessagePage {
        participants,
        messages,
    })
}

fn message_from_object(raw: &Map<String, Value>, text: &impl Fn(&str) -> String) -> Message {
    let mut msg = Message::new(
        raw.get("sender_name")
            .and_then(Value::as_str)
            .map(text)
            .unwrap_or_default(),
    );

    msg.content = raw.get("content").and_then(Value::as_str).map(text);
    msg.timestamp = raw
        .get("timestamp_ms")
        .and_then(Value::as_i64)
        .and_then(parse_ms_timestamp);

    for (field, marker) in MEDIA_FIELDS {
        let count = array_field(raw, field).count();
        msg.attachments
            .extend(std::iter::repeat_n(marker.clone(), count));
    }
    if raw.get("sticker").is_some_and(Value::is_object) {
        msg.attachments.push(Attachment::Sticker);
    }
    if let Some(share) = raw.get("share").and_then(Value::as_object) {
        msg.attachments.push(Attachment::Share {
            link: share
                .get("link")
                .and_then(Value::as_str)
                .map(str::to_string),
        });
    }

    msg.reactions = array_field(raw, "reactions").count();
    msg
}

fn array_field<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Value> + 'a {
    object
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}
