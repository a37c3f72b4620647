//! Document parsing for export pages.
//!
//! Pages are parsed into a generic JSON value and then mapped onto the typed
//! [`Message`](crate::Message) model; unknown fields are ignored.

pub mod instagram;

pub use instagram::{MessagePage, fix_mojibake_encoding, parse_ms_timestamp, parse_page};
