// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Editor-facing session port abstraction and the pump that drives an
//! [`Editor`] from it.

use crate::Channels;
use roomsync_core::{Editor, Inbound, Outbound};
use roomsync_proto::Notification;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::time::Instant;
use tracing::{debug, warn};

/// Cap on inbound events applied per pump.
pub const MAX_INBOUND_PER_PUMP: usize = 256;

/// Minimal port for pulling hub traffic and pushing editor events.
pub trait SessionPort {
    /// Drain up to `max` inbound layout/lock/presence events.
    fn drain_inbound(&mut self, max: usize) -> Vec<Inbound>;
    /// Drain up to `max` notifications.
    fn drain_notifications(&mut self, max: usize) -> Vec<Notification>;
    /// Send editor events in order. Returns `false` once the connection is gone.
    fn send(&mut self, events: Vec<Outbound>) -> bool;
    /// Drop any buffered traffic (e.g., after a reconnect).
    fn clear_streams(&mut self) {}
}

/// Channel-backed session port.
#[derive(Default)]
pub struct ChannelSession {
    inbound_rx: Option<Receiver<Inbound>>,
    notif_rx: Option<Receiver<Notification>>,
    outbound_tx: Option<Sender<Outbound>>,
}

impl ChannelSession {
    /// Port with no live connection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the channels of a freshly spawned connection.
    pub fn set_channels(&mut self, channels: Channels) {
        self.inbound_rx = Some(channels.inbound);
        self.notif_rx = Some(channels.notifications);
        self.outbound_tx = Some(channels.outbound);
    }

    /// Whether the outbound side is still attached.
    pub fn is_connected(&self) -> bool {
        self.outbound_tx.is_some()
    }
}

fn drain<T>(rx: &mut Option<Receiver<T>>, max: usize) -> Vec<T> {
    let mut out = Vec::new();
    let Some(r) = rx.as_ref() else {
        return out;
    };
    while out.len() < max {
        match r.try_recv() {
            Ok(v) => out.push(v),
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                *rx = None;
                break;
            }
        }
    }
    out
}

impl SessionPort for ChannelSession {
    fn drain_inbound(&mut self, max: usize) -> Vec<Inbound> {
        drain(&mut self.inbound_rx, max)
    }

    fn drain_notifications(&mut self, max: usize) -> Vec<Notification> {
        drain(&mut self.notif_rx, max)
    }

    fn send(&mut self, events: Vec<Outbound>) -> bool {
        let Some(tx) = self.outbound_tx.as_ref() else {
            return events.is_empty();
        };
        for event in events {
            if tx.send(event).is_err() {
                self.outbound_tx = None;
                return false;
            }
        }
        true
    }

    fn clear_streams(&mut self) {
        let _ = drain(&mut self.inbound_rx, usize::MAX);
        let _ = drain(&mut self.notif_rx, usize::MAX);
    }
}

/// What one [`pump`] pass did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PumpReport {
    /// Inbound events applied to the layout.
    pub applied: usize,
    /// Inbound events dropped as invalid.
    pub rejected: usize,
    /// Editor events handed to the port.
    pub sent: usize,
    /// Notifications for the UI to show.
    pub notifications: Vec<Notification>,
    /// `false` once the port reported a lost connection.
    pub connected: bool,
}

/// One editor tick: apply hub traffic, fire due throttled moves, flush the
/// outbox.
pub fn pump(editor: &mut Editor, port: &mut impl SessionPort, now: Instant) -> PumpReport {
    let mut report = PumpReport {
        connected: true,
        ..PumpReport::default()
    };
    for msg in port.drain_inbound(MAX_INBOUND_PER_PUMP) {
        match editor.apply_inbound(msg, now) {
            Ok(()) => report.applied += 1,
            Err(_) => report.rejected += 1,
        }
    }
    report.notifications = port.drain_notifications(MAX_INBOUND_PER_PUMP);
    editor.poll(now);
    let outbox = editor.drain_outbox();
    report.sent = outbox.len();
    if !port.send(outbox) {
        warn!(peer = %editor.me(), "session connection lost");
        report.connected = false;
    }
    if report.applied + report.sent > 0 {
        debug!(applied = report.applied, sent = report.sent, "pumped session");
    }
    report
}
