// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Unix-socket CBOR hub: groups editors by project, arbitrates object locks
//! and relays layout events to the other members of a project.

use anyhow::Result;
use roomsync_app_core::config::{ConfigService, HUB_PREFS_KEY};
use roomsync_app_core::prefs::HubPrefs;
use roomsync_config_fs::FsConfigStore;
use roomsync_core::{
    Inbound, LockDecision, LockEntry, LockTable, ObjectRef, Outbound, PeerId, PeerRef,
};
use roomsync_proto::{
    default_socket_path,
    wire::{decode_message, encode_message, frame_len},
    AckStatus, ErrorPayload, HelloPayload, Message, Notification, NotifyScope, WelcomePayload,
};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

const SERVER_VERSION: u32 = 1;

const E_NOT_JOINED: u32 = 1;
const E_ALREADY_JOINED: u32 = 2;
const E_BAD_PAYLOAD: u32 = 3;
const E_DUPLICATE_PEER: u32 = 4;
const E_BAD_SCOPE: u32 = 5;

struct Membership {
    project: String,
    peer: PeerId,
}

struct ConnState {
    joined: Option<Membership>,
    tx: mpsc::Sender<Vec<u8>>,
}

#[derive(Default)]
struct Project {
    members: BTreeMap<u64, PeerId>,
    locks: LockTable,
}

#[derive(Default)]
struct HubState {
    next_conn_id: u64,
    next_ts: u64,
    projects: HashMap<String, Project>,
    conns: HashMap<u64, ConnState>,
}

/// Packets ready to send once the hub lock is released.
type Deliveries = Vec<(mpsc::Sender<Vec<u8>>, Vec<u8>)>;

impl HubState {
    fn alloc_ts(&mut self) -> u64 {
        let t = self.next_ts;
        self.next_ts += 1;
        t
    }

    fn register(&mut self, tx: mpsc::Sender<Vec<u8>>) -> u64 {
        let id = self.next_conn_id;
        self.next_conn_id += 1;
        self.conns.insert(id, ConnState { joined: None, tx });
        id
    }

    fn to_conn(&mut self, conn_id: u64, msg: &Message, out: &mut Deliveries) -> Result<()> {
        let ts = self.alloc_ts();
        if let Some(conn) = self.conns.get(&conn_id) {
            out.push((conn.tx.clone(), encode_message(msg, ts)?));
        }
        Ok(())
    }

    fn to_project(
        &mut self,
        project: &str,
        msg: &Message,
        except: Option<u64>,
        out: &mut Deliveries,
    ) -> Result<()> {
        let ts = self.alloc_ts();
        let pkt = encode_message(msg, ts)?;
        if let Some(p) = self.projects.get(project) {
            for conn_id in p.members.keys().filter(|id| Some(**id) != except) {
                if let Some(conn) = self.conns.get(conn_id) {
                    out.push((conn.tx.clone(), pkt.clone()));
                }
            }
        }
        Ok(())
    }

    fn error(
        &mut self,
        conn_id: u64,
        code: u32,
        name: &str,
        message: String,
        out: &mut Deliveries,
    ) -> Result<()> {
        self.to_conn(conn_id, &Message::Error(ErrorPayload::new(code, name, message)), out)
    }

    fn membership(&self, conn_id: u64) -> Option<(String, PeerId)> {
        self.conns
            .get(&conn_id)
            .and_then(|c| c.joined.as_ref())
            .map(|m| (m.project.clone(), m.peer.clone()))
    }
}

async fn deliver(out: Deliveries) {
    for (tx, pkt) in out {
        let _ = tx.send(pkt).await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    // Config (best-effort)
    let config: Option<ConfigService<FsConfigStore>> =
        FsConfigStore::new().map(ConfigService::new).ok();

    let prefs: HubPrefs = config
        .as_ref()
        .and_then(|c| c.load::<HubPrefs>(HUB_PREFS_KEY).ok().flatten())
        .unwrap_or_default();

    // Persist defaults once if absent
    if let Some(cfg) = &config {
        let _ = cfg.save(HUB_PREFS_KEY, &prefs);
    }

    let socket_path = prefs
        .socket_path
        .map_or_else(default_socket_path, PathBuf::from);

    let hub = Arc::new(Mutex::new(HubState::default()));

    // Remove stale socket if present
    let _ = std::fs::remove_file(&socket_path);
    let listener = UnixListener::bind(&socket_path)?;
    info!("session hub listening at {}", socket_path.display());

    loop {
        let (stream, _) = listener.accept().await?;
        let hub_state = hub.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_client(stream, hub_state).await {
                warn!(?err, "client handler error");
            }
        });
    }
}

async fn handle_client(stream: UnixStream, hub: Arc<Mutex<HubState>>) -> Result<()> {
    let (mut reader, writer) = tokio::io::split(stream);

    let (tx, mut rx) = mpsc::channel::<Vec<u8>>(256);
    let conn_id = hub.lock().await.register(tx);

    // writer task
    tokio::spawn(async move {
        let mut ws = writer;
        while let Some(buf) = rx.recv().await {
            if ws.write_all(&buf).await.is_err() {
                break;
            }
        }
    });

    let mut read_buf: Vec<u8> = vec![0u8; 16 * 1024];
    let mut acc: Vec<u8> = Vec::with_capacity(32 * 1024);
    'read: loop {
        let n = match reader.read(&mut read_buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                warn!(?err, "read failed on connection {}", conn_id);
                break;
            }
        };
        acc.extend_from_slice(&read_buf[..n]);

        // process as many frames as available
        loop {
            let total = match frame_len(&acc) {
                Ok(Some(total)) if acc.len() >= total => total,
                Ok(_) => break,
                Err(err) => {
                    warn!(?err, "dropping connection {}", conn_id);
                    break 'read;
                }
            };
            let packet: Vec<u8> = acc.drain(..total).collect();
            match decode_message(&packet) {
                Ok((msg, _ts, _used)) => {
                    if let Err(err) = handle_message(msg, conn_id, &hub).await {
                        warn!(?err, "dropping connection {}", conn_id);
                        break 'read;
                    }
                }
                Err(err) => {
                    warn!(?err, "failed to decode packet");
                    break 'read;
                }
            }
        }
    }

    disconnect(conn_id, &hub).await
}

/// Forgets a connection: frees its locks and tells the rest of its project.
async fn disconnect(conn_id: u64, hub: &Arc<Mutex<HubState>>) -> Result<()> {
    let mut out = Deliveries::new();
    {
        let mut h = hub.lock().await;
        let Some(conn) = h.conns.remove(&conn_id) else {
            return Ok(());
        };
        let Some(Membership { project, peer }) = conn.joined else {
            return Ok(());
        };
        let freed = match h.projects.get_mut(&project) {
            Some(p) => {
                p.members.remove(&conn_id);
                p.locks.release_all_held_by(&peer)
            }
            None => Vec::new(),
        };
        info!(%peer, %project, freed = freed.len(), "peer left");
        for object_id in freed {
            h.to_project(
                &project,
                &Message::Server(Inbound::ObjectUnlocked(ObjectRef { object_id })),
                None,
                &mut out,
            )?;
        }
        h.to_project(
            &project,
            &Message::Server(Inbound::PeerLeft(PeerRef { peer_id: peer })),
            None,
            &mut out,
        )?;
        if h.projects.get(&project).is_some_and(|p| p.members.is_empty()) {
            h.projects.remove(&project);
            debug!(%project, "project closed");
        }
    }
    deliver(out).await;
    Ok(())
}

// Handle a single inbound message from a connection.
async fn handle_message(msg: Message, conn_id: u64, hub: &Arc<Mutex<HubState>>) -> Result<()> {
    let mut out = Deliveries::new();
    let result = {
        let mut h = hub.lock().await;
        match msg {
            Message::Hello(hello) => join(&mut h, conn_id, hello, &mut out),
            Message::Client(event) => relay(&mut h, conn_id, event, &mut out),
            Message::Notification(n) => notify(&mut h, conn_id, n, &mut out),
            Message::Welcome(_) | Message::Error(_) | Message::Server(_) => {
                // should not be initiated by clients; ignore
                debug!(op = msg.op_name(), conn_id, "ignoring hub-only message");
                Ok(())
            }
        }
    };
    deliver(out).await;
    result
}

fn join(h: &mut HubState, conn_id: u64, hello: HelloPayload, out: &mut Deliveries) -> Result<()> {
    if h.membership(conn_id).is_some() {
        return h.error(conn_id, E_ALREADY_JOINED, "E_ALREADY_JOINED", "already joined".into(), out);
    }
    let HelloPayload {
        project_id,
        peer_id,
        ..
    } = hello;
    let project = h.projects.entry(project_id.clone()).or_default();
    if project.members.values().any(|p| *p == peer_id) {
        let refusal = Message::Welcome(WelcomePayload {
            status: AckStatus::Error,
            server_version: SERVER_VERSION,
            peers: Vec::new(),
            error: Some(ErrorPayload::new(
                E_DUPLICATE_PEER,
                "E_DUPLICATE_PEER",
                format!("{peer_id} is already in {project_id}"),
            )),
        });
        return h.to_conn(conn_id, &refusal, out);
    }
    let peers: Vec<PeerId> = project.members.values().cloned().collect();
    let locks = project.locks.snapshot();
    project.members.insert(conn_id, peer_id.clone());
    if let Some(conn) = h.conns.get_mut(&conn_id) {
        conn.joined = Some(Membership {
            project: project_id.clone(),
            peer: peer_id.clone(),
        });
    }
    info!(peer = %peer_id, project = %project_id, "peer joined");

    let welcome = Message::Welcome(WelcomePayload {
        status: AckStatus::Ok,
        server_version: SERVER_VERSION,
        peers,
        error: None,
    });
    h.to_conn(conn_id, &welcome, out)?;
    h.to_conn(conn_id, &Message::Server(Inbound::CurrentLocks(locks)), out)?;
    h.to_project(
        &project_id,
        &Message::Server(Inbound::PeerJoined(PeerRef { peer_id })),
        Some(conn_id),
        out,
    )
}

fn relay(h: &mut HubState, conn_id: u64, event: Outbound, out: &mut Deliveries) -> Result<()> {
    let Some((project, peer)) = h.membership(conn_id) else {
        h.error(
            conn_id,
            E_NOT_JOINED,
            "E_NOT_JOINED",
            format!("{} before hello", event.op_name()),
            out,
        )?;
        anyhow::bail!("conn {conn_id} sent {} before hello", event.op_name());
    };
    if let Err(err) = event.validate() {
        warn!(%peer, op = event.op_name(), %err, "rejecting event");
        return h.error(conn_id, E_BAD_PAYLOAD, "E_BAD_PAYLOAD", err.to_string(), out);
    }
    match event {
        Outbound::RequestLock(r) => {
            let decision = h
                .projects
                .get_mut(&project)
                .map(|p| p.locks.request(&r.object_id, &peer));
            match decision {
                Some(LockDecision::Granted) => {
                    let entry = LockEntry {
                        object_id: r.object_id,
                        holder_id: peer,
                    };
                    let locked = Message::Server(Inbound::ObjectLocked(entry));
                    h.to_project(&project, &locked, None, out)
                }
                Some(LockDecision::Rejected { holder }) => {
                    debug!(%peer, object = %r.object_id, %holder, "lock rejected");
                    let entry = LockEntry {
                        object_id: r.object_id,
                        holder_id: holder,
                    };
                    h.to_conn(conn_id, &Message::Server(Inbound::LockRejected(entry)), out)
                }
                None => Ok(()),
            }
        }
        Outbound::ReleaseLock(r) => {
            let released = h
                .projects
                .get_mut(&project)
                .is_some_and(|p| p.locks.release_if_holder(&r.object_id, &peer));
            if released {
                h.to_project(&project, &Message::Server(Inbound::ObjectUnlocked(r)), None, out)
            } else {
                debug!(%peer, object = %r.object_id, "release of a lock not held");
                Ok(())
            }
        }
        other => {
            if let Outbound::FurnitureDelete(r) = &other {
                let freed = h
                    .projects
                    .get_mut(&project)
                    .and_then(|p| p.locks.release(&r.object_id));
                if freed.is_some() {
                    h.to_project(
                        &project,
                        &Message::Server(Inbound::ObjectUnlocked(r.clone())),
                        Some(conn_id),
                        out,
                    )?;
                }
            }
            match other.into_relayed() {
                Some(relayed) => {
                    h.to_project(&project, &Message::Server(relayed), Some(conn_id), out)
                }
                None => Ok(()),
            }
        }
    }
}

/// Shares a notification with the sender's own project.
///
/// Only joined members may notify, and only into the project they joined;
/// `Global` and foreign-project scopes are refused.
fn notify(h: &mut HubState, conn_id: u64, n: Notification, out: &mut Deliveries) -> Result<()> {
    let Some((project, peer)) = h.membership(conn_id) else {
        h.error(
            conn_id,
            E_NOT_JOINED,
            "E_NOT_JOINED",
            "notification before hello".into(),
            out,
        )?;
        anyhow::bail!("conn {conn_id} sent notification before hello");
    };
    let own_project = matches!(&n.scope, NotifyScope::Project(target) if *target == project);
    if own_project {
        return h.to_project(&project, &Message::Notification(n), Some(conn_id), out);
    }
    match &n.scope {
        NotifyScope::Local => Ok(()),
        NotifyScope::Global | NotifyScope::Project(_) => {
            warn!(%peer, scope = ?n.scope, "refusing notification outside the project");
            h.error(
                conn_id,
                E_BAD_SCOPE,
                "E_BAD_SCOPE",
                format!("notifications are limited to project {project}"),
                out,
            )
        }
    }
}
