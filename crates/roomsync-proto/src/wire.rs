// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Packet framing and CBOR helpers.
//!
//! Packet layout:
//!
//! ``MAGIC(4) || VERSION(2) || FLAGS(2) || LENGTH(4) || PAYLOAD || CHECKSUM(32)``
//!
//! * PAYLOAD is a CBOR [`OpEnvelope`]
//! * CHECKSUM = blake3-256 over HEADER (first 12 bytes) || PAYLOAD

use blake3::Hasher;
use ciborium::value::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use roomsync_core::{Inbound, Outbound};

use crate::{Message, OpEnvelope};

/// Protocol magic constant "RMSY".
pub const MAGIC: [u8; 4] = *b"RMSY";
/// Wire protocol version (big-endian u16).
pub const VERSION: u16 = 0x0001;
/// Reserved flags (zero for v1).
pub const FLAGS: u16 = 0x0000;
/// Header length in bytes.
pub const HEADER_LEN: usize = 12;
/// Checksum length in bytes.
pub const CHECKSUM_LEN: usize = 32;
/// Largest accepted payload.
pub const MAX_PAYLOAD: usize = 8 * 1024 * 1024;

/// Framing and payload failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// Fewer bytes than the packet announces.
    #[error("incomplete packet")]
    Incomplete,
    /// Magic mismatch.
    #[error("bad magic")]
    BadMagic,
    /// Unknown protocol version.
    #[error("unsupported version {0}")]
    UnsupportedVersion(u16),
    /// Declared payload length exceeds [`MAX_PAYLOAD`].
    #[error("payload too large: {0} bytes")]
    PayloadTooLarge(usize),
    /// Checksum did not verify.
    #[error("checksum mismatch")]
    ChecksumMismatch,
    /// Envelope op is not part of the protocol.
    #[error("unknown op {0}")]
    UnknownOp(String),
    /// CBOR encode/decode failure.
    #[error("cbor: {0}")]
    Cbor(String),
}

fn cbor_err(e: impl std::fmt::Display) -> WireError {
    WireError::Cbor(e.to_string())
}

/// Encode to CBOR bytes.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, WireError> {
    let mut out = Vec::new();
    ciborium::into_writer(value, &mut out).map_err(cbor_err)?;
    Ok(out)
}

/// Decode from CBOR bytes.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, WireError> {
    ciborium::from_reader(bytes).map_err(cbor_err)
}

/// A full packet (header + payload + checksum).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Raw header.
    pub header: [u8; HEADER_LEN],
    /// CBOR payload bytes.
    pub payload: Vec<u8>,
    /// blake3 checksum over header||payload.
    pub checksum: [u8; CHECKSUM_LEN],
}

fn checksum(header: &[u8], payload: &[u8]) -> blake3::Hash {
    let mut hasher = Hasher::new();
    hasher.update(header);
    hasher.update(payload);
    hasher.finalize()
}

/// Total packet length announced by the header at the front of `buf`.
///
/// Returns `Ok(None)` while the header itself is still incomplete; rejects
/// oversize payloads before they are buffered.
pub fn frame_len(buf: &[u8]) -> Result<Option<usize>, WireError> {
    let Some(len_bytes) = buf.get(8..HEADER_LEN) else {
        return Ok(None);
    };
    let mut raw = [0u8; 4];
    raw.copy_from_slice(len_bytes);
    let len = u32::from_be_bytes(raw) as usize;
    if len > MAX_PAYLOAD {
        return Err(WireError::PayloadTooLarge(len));
    }
    Ok(Some(HEADER_LEN + len + CHECKSUM_LEN))
}

impl Packet {
    /// Build a packet around a CBOR payload.
    pub fn from_payload(payload: Vec<u8>) -> Result<Self, WireError> {
        if payload.len() > MAX_PAYLOAD {
            return Err(WireError::PayloadTooLarge(payload.len()));
        }
        let len =
            u32::try_from(payload.len()).map_err(|_| WireError::PayloadTooLarge(payload.len()))?;
        let mut header = [0u8; HEADER_LEN];
        header[0..4].copy_from_slice(&MAGIC);
        header[4..6].copy_from_slice(&VERSION.to_be_bytes());
        header[6..8].copy_from_slice(&FLAGS.to_be_bytes());
        header[8..12].copy_from_slice(&len.to_be_bytes());
        let checksum = *checksum(&header, &payload).as_bytes();
        Ok(Self {
            header,
            payload,
            checksum,
        })
    }

    /// Concatenated packet bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.payload.len() + CHECKSUM_LEN);
        out.extend_from_slice(&self.header);
        out.extend_from_slice(&self.payload);
        out.extend_from_slice(&self.checksum);
        out
    }

    /// Encode an [`OpEnvelope`] into a full packet byte vector.
    pub fn encode_envelope<P: Serialize>(env: &OpEnvelope<P>) -> Result<Vec<u8>, WireError> {
        Ok(Self::from_payload(to_cbor(env)?)?.to_bytes())
    }

    /// Decode one packet from the front of `bytes`, returning the envelope
    /// and the number of bytes consumed.
    pub fn decode_envelope<P: DeserializeOwned>(
        bytes: &[u8],
    ) -> Result<(OpEnvelope<P>, usize), WireError> {
        let total = frame_len(bytes)?.ok_or(WireError::Incomplete)?;
        let packet = bytes.get(..total).ok_or(WireError::Incomplete)?;
        if packet[0..4] != MAGIC {
            return Err(WireError::BadMagic);
        }
        let version = u16::from_be_bytes([packet[4], packet[5]]);
        if version != VERSION {
            return Err(WireError::UnsupportedVersion(version));
        }
        let (header, rest) = packet.split_at(HEADER_LEN);
        let (payload, sum) = rest.split_at(rest.len() - CHECKSUM_LEN);
        if checksum(header, payload).as_bytes() != sum {
            return Err(WireError::ChecksumMismatch);
        }
        let env: OpEnvelope<P> = from_cbor(payload)?;
        Ok((env, total))
    }
}

fn value<T: Serialize>(payload: &T) -> Result<Value, WireError> {
    Value::serialized(payload).map_err(cbor_err)
}

fn take<T: DeserializeOwned>(payload: Value) -> Result<T, WireError> {
    payload.deserialized().map_err(cbor_err)
}

fn outbound_payload(o: &Outbound) -> Result<Value, WireError> {
    match o {
        Outbound::FurnitureAdd(obj) => value(obj),
        Outbound::FurnitureMove(m) => value(m),
        Outbound::FurnitureDelete(r) | Outbound::RequestLock(r) | Outbound::ReleaseLock(r) => {
            value(r)
        }
    }
}

fn inbound_payload(i: &Inbound) -> Result<Value, WireError> {
    match i {
        Inbound::FurnitureAdded(obj) => value(obj),
        Inbound::FurnitureUpdated(m) => value(m),
        Inbound::FurnitureDeleted(r) | Inbound::ObjectUnlocked(r) => value(r),
        Inbound::ObjectLocked(e) | Inbound::LockRejected(e) => value(e),
        Inbound::CurrentLocks(all) => value(all),
        Inbound::PeerJoined(p) | Inbound::PeerLeft(p) => value(p),
    }
}

/// Encode a [`Message`] into a packet with the provided logical timestamp.
pub fn encode_message(msg: &Message, ts: u64) -> Result<Vec<u8>, WireError> {
    let payload = match msg {
        Message::Hello(p) => value(p)?,
        Message::Welcome(p) => value(p)?,
        Message::Error(p) => value(p)?,
        Message::Client(o) => outbound_payload(o)?,
        Message::Server(i) => inbound_payload(i)?,
        Message::Notification(n) => value(n)?,
    };
    let env = OpEnvelope {
        op: msg.op_name().to_owned(),
        ts,
        payload,
    };
    Packet::encode_envelope(&env)
}

/// Decode bytes into `(Message, ts, bytes_consumed)`.
pub fn decode_message(bytes: &[u8]) -> Result<(Message, u64, usize), WireError> {
    let (env, used) = Packet::decode_envelope::<Value>(bytes)?;
    let p = env.payload;
    let msg = match env.op.as_str() {
        "hello" => Message::Hello(take(p)?),
        "welcome" => Message::Welcome(take(p)?),
        "error" => Message::Error(take(p)?),
        "notification" => Message::Notification(take(p)?),
        "furniture_add" => Message::Client(Outbound::FurnitureAdd(take(p)?)),
        "furniture_delete" => Message::Client(Outbound::FurnitureDelete(take(p)?)),
        "furniture_move" => Message::Client(Outbound::FurnitureMove(take(p)?)),
        "request_lock" => Message::Client(Outbound::RequestLock(take(p)?)),
        "release_lock" => Message::Client(Outbound::ReleaseLock(take(p)?)),
        "furniture_added" => Message::Server(Inbound::FurnitureAdded(take(p)?)),
        "furniture_deleted" => Message::Server(Inbound::FurnitureDeleted(take(p)?)),
        "furniture_updated" => Message::Server(Inbound::FurnitureUpdated(take(p)?)),
        "object_locked" => Message::Server(Inbound::ObjectLocked(take(p)?)),
        "object_unlocked" => Message::Server(Inbound::ObjectUnlocked(take(p)?)),
        "lock_rejected" => Message::Server(Inbound::LockRejected(take(p)?)),
        "current_locks" => Message::Server(Inbound::CurrentLocks(take(p)?)),
        "peer_joined" => Message::Server(Inbound::PeerJoined(take(p)?)),
        "peer_left" => Message::Server(Inbound::PeerLeft(take(p)?)),
        other => return Err(WireError::UnknownOp(other.to_owned())),
    };
    Ok((msg, env.ts, used))
}

// --- Unit tests -----------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{HelloPayload, Notification, NotifyKind, NotifyScope};
    use roomsync_core::{LockEntry, MoveEvent, ObjectRef, PlacedObject, Pose};
    use roomsync_geom::{Footprint, MountType, Position};

    fn hello() -> Message {
        Message::Hello(HelloPayload {
            project_id: "flat-42".into(),
            peer_id: "alice".into(),
            client_version: 1,
        })
    }

    #[test]
    fn header_layout_is_fixed() {
        let bytes = encode_message(&hello(), 7).unwrap();
        assert_eq!(hex::encode(&bytes[..8]), "524d535900010000");
        let total = frame_len(&bytes).unwrap().unwrap();
        assert_eq!(total, bytes.len());
        assert_eq!(frame_len(&bytes[..5]).unwrap(), None);
    }

    #[test]
    fn layout_and_lock_messages_survive_the_wire() {
        let obj = PlacedObject::new(
            "tv",
            "wall-tv",
            Position::new(0.0, 1.5, -3.9),
            Footprint::new(1.2, 0.7, 0.1),
            MountType::Wall,
        );
        let msgs = vec![
            hello(),
            Message::Client(Outbound::FurnitureAdd(obj)),
            Message::Client(Outbound::FurnitureMove(MoveEvent::new(
                "tv".into(),
                Pose::new(Position::new(1.0, 1.5, -3.9), 90.0),
            ))),
            Message::Client(Outbound::RequestLock(ObjectRef {
                object_id: "tv".into(),
            })),
            Message::Server(Inbound::CurrentLocks(vec![LockEntry {
                object_id: "tv".into(),
                holder_id: "alice".into(),
            }])),
            Message::Notification(Notification {
                kind: NotifyKind::Warn,
                scope: NotifyScope::Project("flat-42".into()),
                title: "hub restarting".into(),
                body: None,
            }),
        ];
        let mut stream = Vec::new();
        for (ts, m) in msgs.iter().enumerate() {
            stream.extend(encode_message(m, ts as u64).unwrap());
        }
        let mut at = 0;
        for (ts, m) in msgs.iter().enumerate() {
            let (decoded, got_ts, used) = decode_message(&stream[at..]).unwrap();
            assert_eq!(&decoded, m);
            assert_eq!(got_ts, ts as u64);
            at += used;
        }
        assert_eq!(at, stream.len());
    }

    #[test]
    fn corrupted_payload_fails_the_checksum() {
        let mut bytes = encode_message(&hello(), 0).unwrap();
        bytes[HEADER_LEN + 2] ^= 0xff;
        assert_eq!(decode_message(&bytes), Err(WireError::ChecksumMismatch));
    }

    #[test]
    fn truncated_and_foreign_packets_are_rejected() {
        let bytes = encode_message(&hello(), 0).unwrap();
        assert_eq!(
            decode_message(&bytes[..bytes.len() - 1]),
            Err(WireError::Incomplete)
        );
        let mut foreign = bytes.clone();
        foreign[0] = b'X';
        assert_eq!(decode_message(&foreign), Err(WireError::BadMagic));
        let mut future = bytes;
        future[5] = 9;
        assert_eq!(decode_message(&future), Err(WireError::UnsupportedVersion(9)));
    }

    #[test]
    fn oversize_length_is_refused_from_the_header() {
        let mut header = Vec::new();
        header.extend_from_slice(&MAGIC);
        header.extend_from_slice(&VERSION.to_be_bytes());
        header.extend_from_slice(&FLAGS.to_be_bytes());
        header.extend_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(frame_len(&header), Err(WireError::PayloadTooLarge(_))));
    }

    #[test]
    fn unknown_ops_are_rejected() {
        let env = OpEnvelope {
            op: "teleport".to_string(),
            ts: 3,
            payload: Value::Null,
        };
        let bytes = Packet::encode_envelope(&env).unwrap();
        assert_eq!(
            decode_message(&bytes),
            Err(WireError::UnknownOp("teleport".into()))
        );
    }
}
