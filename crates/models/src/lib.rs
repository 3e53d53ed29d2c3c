//! Document field names, driver-style acknowledgements and the MongoDB
//! connection that owns the collections.

pub mod errors;
pub mod id;
pub mod ack;
pub mod service;
pub mod booking;
pub mod db;

pub use ack::{DeleteAck, InsertAck, UpdateAck};
pub use booking::BookingStatus;

/// Free-form top-level fields of a document. Services, popular entries and
/// bookings are all stored and returned in this shape.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// String value of `key`, if present and textual.
pub fn text_field<'a>(doc: &'a Fields, key: &str) -> Option<&'a str> {
    doc.get(key).and_then(serde_json::Value::as_str)
}
