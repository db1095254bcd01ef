//! ---
//! vire_section: "02-messaging-ipc-data-model"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Message schema helpers and protocol codecs."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
use std::fmt;

use tracing::debug;

use crate::message::Message;

/// Stage of the message life cycle, used for consistent logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDirection {
    /// Envelope sealed locally.
    Built,
    /// Message encoded for sending.
    Outbound,
    /// Message decoded after reception.
    Inbound,
}

impl fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MessageDirection::Built => "built",
            MessageDirection::Outbound => "outbound",
            MessageDirection::Inbound => "inbound",
        })
    }
}

/// Emit a structured log entry for envelope activity.
pub fn log_message(direction: MessageDirection, message: &Message) {
    let header = message.header();
    debug!(
        message_id = %header.message_id(),
        timestamp = %vire_common::time::format_optional(header.timestamp()),
        in_reply_to = ?header.in_reply_to().map(ToString::to_string),
        category = message.payload().map(|p| p.category().label()).unwrap_or("none"),
        payload_type = %message.body().payload_type_id(),
        asynchronous = header.is_asynchronous(),
        direction = %direction,
        "messaging activity"
    );
}
