//! Domain models shared by the client and the command surface.

mod event;
mod message;
mod range;
pub mod time;

pub use event::{CalendarEvent, NewEvent};
pub use message::{AttachmentFile, BodyType, EmailMessage, Importance, OutgoingMessage};
pub use range::{DateRange, parse_end_bound};
pub use time::{TIMESTAMP_FORMAT, format_timestamp, parse_timestamp};
