// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Session wire schema for the RoomSync hub.
//!
//! Layout events and lock traffic reuse the typed [`Outbound`] / [`Inbound`]
//! enums from `roomsync-core`; this crate adds the session handshake,
//! notifications and the packet framing in [`wire`].

pub use roomsync_core::{Inbound, LockEntry, Outbound, PeerId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default Unix socket path for the session hub.
///
/// Prefers a per-user runtime dir (XDG_RUNTIME_DIR) and falls back to `/tmp`
/// when unavailable.
pub fn default_socket_path() -> PathBuf {
    let base = std::env::var_os("XDG_RUNTIME_DIR")
        .map_or_else(|| PathBuf::from("/tmp"), PathBuf::from);
    base.join("roomsync-hub.sock")
}

/// Envelope carried as the payload of a packet.
///
/// * `op` – operation name.
/// * `ts` – logical timestamp (authoritative on the hub side).
/// * `payload` – operation specific body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpEnvelope<P> {
    /// Operation name (e.g. "hello", "furniture_move", "object_locked").
    pub op: String,
    /// Logical timestamp (monotonic per hub).
    pub ts: u64,
    /// Operation-specific body.
    pub payload: P,
}

/// Notification severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotifyKind {
    /// Informational notification.
    Info,
    /// Warning notification.
    Warn,
    /// Error notification.
    Error,
}

/// Scope for notifications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotifyScope {
    /// Every connected participant.
    Global,
    /// Members of one project.
    Project(String),
    /// Local-only to the emitting tool.
    Local,
}

/// Notification broadcast frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    /// Severity of the notification.
    pub kind: NotifyKind,
    /// Delivery scope.
    pub scope: NotifyScope,
    /// Short title line.
    pub title: String,
    /// Optional details.
    pub body: Option<String>,
}

/// Error payload used in `error` and failed `welcome` responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorPayload {
    /// Numeric error code.
    pub code: u32,
    /// Stable identifier (e.g. "E_NOT_JOINED").
    pub name: String,
    /// Optional machine-readable details.
    pub details: Option<ciborium::value::Value>,
    /// Human readable message.
    pub message: String,
}

impl ErrorPayload {
    /// Error without details.
    pub fn new(code: u32, name: &str, message: impl Into<String>) -> Self {
        Self {
            code,
            name: name.to_owned(),
            details: None,
            message: message.into(),
        }
    }
}

/// Join request (editor → hub). Must be the first message on a connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HelloPayload {
    /// Project (room layout) to join.
    pub project_id: String,
    /// Participant identity.
    pub peer_id: PeerId,
    /// Implementation version (not wire version).
    pub client_version: u32,
}

/// Join acknowledgement (hub → editor).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WelcomePayload {
    /// Status of the join.
    pub status: AckStatus,
    /// Hub implementation version.
    pub server_version: u32,
    /// Other participants already in the project.
    pub peers: Vec<PeerId>,
    /// Set when `status` is [`AckStatus::Error`].
    pub error: Option<ErrorPayload>,
}

/// Status enumeration for the join acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AckStatus {
    /// Joined.
    #[serde(rename = "OK")]
    Ok,
    /// Refused.
    #[serde(rename = "ERROR")]
    Error,
}

/// Wire message kinds carried inside envelope payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Join request (op = "hello").
    Hello(HelloPayload),
    /// Join acknowledgement (op = "welcome").
    Welcome(WelcomePayload),
    /// Protocol or processing error (op = "error").
    Error(ErrorPayload),
    /// Editor → hub layout or lock event.
    Client(Outbound),
    /// Hub → editor layout, lock or presence event.
    Server(Inbound),
    /// Notification broadcast (op = "notification").
    Notification(Notification),
}

impl Message {
    /// Canonical op string for this message.
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::Hello(_) => "hello",
            Self::Welcome(_) => "welcome",
            Self::Error(_) => "error",
            Self::Client(o) => o.op_name(),
            Self::Server(i) => i.op_name(),
            Self::Notification(_) => "notification",
        }
    }
}

pub mod wire;
