// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Client helper for talking to the RoomSync session hub over Unix sockets
//! (CBOR-framed), plus editor-facing adapters (channels + ports).

use anyhow::Result;
use roomsync_core::{Inbound, Outbound};
use roomsync_proto::{
    wire::{decode_message, encode_message, frame_len, WireError, CHECKSUM_LEN, HEADER_LEN},
    ErrorPayload, HelloPayload, Message, Notification, WelcomePayload,
};
use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream as AsyncUnixStream;

pub mod tool;

fn frame_total(header: &[u8; HEADER_LEN]) -> io::Result<usize> {
    match frame_len(header) {
        Ok(Some(total)) => Ok(total),
        Ok(None) => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "short header")),
        Err(err) => Err(io::Error::new(io::ErrorKind::InvalidData, err)),
    }
}

/// Minimal async client over Unix sockets.
pub struct SessionClient {
    stream: AsyncUnixStream,
}

impl SessionClient {
    /// Connect to the hub at the given Unix socket path.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let stream = AsyncUnixStream::connect(path).await?;
        Ok(Self { stream })
    }

    /// Send any message. Clients stamp `ts = 0`; the hub owns the clock.
    pub async fn send(&mut self, msg: &Message) -> Result<()> {
        let pkt = encode_message(msg, 0)?;
        self.stream.write_all(&pkt).await?;
        Ok(())
    }

    /// Join a project.
    pub async fn send_hello(&mut self, payload: HelloPayload) -> Result<()> {
        self.send(&Message::Hello(payload)).await
    }

    /// Send one editor event.
    pub async fn send_event(&mut self, event: Outbound) -> Result<()> {
        self.send(&Message::Client(event)).await
    }

    /// Poll a single message. Returns `Ok(None)` when the stream is closed
    /// before any bytes are read.
    ///
    /// Reads until a full frame header is buffered so short reads cannot
    /// desynchronize framing.
    pub async fn poll_message(&mut self) -> Result<Option<Message>> {
        let mut header = [0u8; HEADER_LEN];
        let mut read = 0usize;
        while read < header.len() {
            let n = self.stream.read(&mut header[read..]).await?;
            if n == 0 {
                if read == 0 {
                    return Ok(None);
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("truncated frame header: read {read} of {HEADER_LEN} bytes"),
                )
                .into());
            }
            read += n;
        }
        let total = frame_total(&header)?;
        let mut packet = vec![0u8; total];
        packet[..HEADER_LEN].copy_from_slice(&header);
        self.stream.read_exact(&mut packet[HEADER_LEN..]).await?;
        let (msg, _ts, _) = decode_message(&packet)?;
        Ok(Some(msg))
    }

    /// Waits for the hub's answer to `hello`.
    pub async fn await_welcome(&mut self) -> Result<WelcomePayload> {
        while let Some(msg) = self.poll_message().await? {
            match msg {
                Message::Welcome(w) => return Ok(w),
                Message::Error(e) => anyhow::bail!("hub error {}: {}", e.name, e.message),
                _ => continue,
            }
        }
        anyhow::bail!("hub closed the connection before welcome")
    }

    /// Expose the underlying stream (e.g., for select!).
    pub fn stream(&mut self) -> &mut AsyncUnixStream {
        &mut self.stream
    }
}

/// Receivers and sender bridging an editor to a background connection.
pub struct Channels {
    /// Join acknowledgement (one value).
    pub welcome: Receiver<WelcomePayload>,
    /// Layout, lock and presence events from the hub.
    pub inbound: Receiver<Inbound>,
    /// Hub notifications.
    pub notifications: Receiver<Notification>,
    /// Errors reported by the hub.
    pub errors: Receiver<ErrorPayload>,
    /// Editor events to send.
    pub outbound: Sender<Outbound>,
}

/// Blocking read of one packet. `Ok(None)` on a clean close between packets.
fn read_packet(stream: &mut impl Read) -> io::Result<Option<Vec<u8>>> {
    let mut header = [0u8; HEADER_LEN];
    match stream.read_exact(&mut header) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let total = frame_total(&header)?;
    debug_assert!(total >= HEADER_LEN + CHECKSUM_LEN);
    let mut packet = vec![0u8; total];
    packet[..HEADER_LEN].copy_from_slice(&header);
    stream.read_exact(&mut packet[HEADER_LEN..])?;
    Ok(Some(packet))
}

fn write_message(stream: &mut impl Write, msg: &Message) -> io::Result<()> {
    let pkt = encode_message(msg, 0)
        .map_err(|e: WireError| io::Error::new(io::ErrorKind::InvalidData, e))?;
    stream.write_all(&pkt)
}

/// Sends `hello` on `stream`, then moves it onto two background threads:
/// one decoding hub messages into the returned receivers, one writing editor
/// events from the returned sender.
pub fn spawn_channels(stream: UnixStream, hello: HelloPayload) -> io::Result<Channels> {
    let mut writer = stream.try_clone()?;
    let mut reader = stream;
    write_message(&mut writer, &Message::Hello(hello))?;

    let (welcome_tx, welcome) = mpsc::channel();
    let (inbound_tx, inbound) = mpsc::channel();
    let (notif_tx, notifications) = mpsc::channel();
    let (error_tx, errors) = mpsc::channel();
    let (outbound, outbound_rx) = mpsc::channel::<Outbound>();

    thread::spawn(move || {
        while let Ok(event) = outbound_rx.recv() {
            if write_message(&mut writer, &Message::Client(event)).is_err() {
                break;
            }
        }
    });

    thread::spawn(move || {
        while let Ok(Some(packet)) = read_packet(&mut reader) {
            match decode_message(&packet) {
                Ok((Message::Welcome(w), _, _)) => {
                    let _ = welcome_tx.send(w);
                }
                Ok((Message::Server(event), _, _)) => {
                    let _ = inbound_tx.send(event);
                }
                Ok((Message::Notification(n), _, _)) => {
                    let _ = notif_tx.send(n);
                }
                Ok((Message::Error(e), _, _)) => {
                    let _ = error_tx.send(e);
                }
                Ok(_) => continue,
                Err(_) => break,
            }
        }
    });

    Ok(Channels {
        welcome,
        inbound,
        notifications,
        errors,
        outbound,
    })
}

/// Connect, say hello, and bridge the connection onto channels.
///
/// The socket connect happens synchronously so callers can surface
/// connection errors in their UI.
pub fn connect_channels(path: impl AsRef<Path>, hello: HelloPayload) -> io::Result<Channels> {
    let stream = UnixStream::connect(path)?;
    spawn_channels(stream, hello)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use roomsync_core::{LockEntry, ObjectRef};
    use roomsync_proto::AckStatus;
    use std::time::Duration;
    use tokio::task;

    #[tokio::test]
    async fn lock_grant_split_inside_the_header_decodes_whole() {
        let (client_stream, mut hub_stream) = tokio::net::UnixStream::pair().unwrap();

        let granted = Message::Server(Inbound::ObjectLocked(LockEntry {
            object_id: "wardrobe".into(),
            holder_id: "bob".into(),
        }));
        let frame = encode_message(&granted, 7).unwrap();
        let reader = task::spawn(async move {
            let mut client = SessionClient {
                stream: client_stream,
            };
            client.poll_message().await
        });

        // Magic arrives alone; length and body trail behind.
        for chunk in [&frame[..4], &frame[4..HEADER_LEN + 3], &frame[HEADER_LEN + 3..]] {
            hub_stream.write_all(chunk).await.unwrap();
            task::yield_now().await;
        }

        assert_eq!(reader.await.unwrap().unwrap(), Some(granted));
    }

    #[tokio::test]
    async fn header_cut_short_by_hangup_is_an_error() {
        let (client_stream, mut hub_stream) = tokio::net::UnixStream::pair().unwrap();
        let frame = encode_message(
            &Message::Server(Inbound::ObjectUnlocked(ObjectRef {
                object_id: "wardrobe".into(),
            })),
            8,
        )
        .unwrap();
        hub_stream.write_all(&frame[..6]).await.unwrap();
        drop(hub_stream);

        let mut client = SessionClient {
            stream: client_stream,
        };
        assert!(client.poll_message().await.is_err());
    }

    #[test]
    fn channels_say_hello_and_route_hub_messages() {
        let (client, mut hub) = UnixStream::pair().unwrap();
        let chans = spawn_channels(
            client,
            HelloPayload {
                project_id: "flat".into(),
                peer_id: "alice".into(),
                client_version: 1,
            },
        )
        .unwrap();

        let hello = read_packet(&mut hub).unwrap().unwrap();
        assert!(matches!(decode_message(&hello).unwrap().0, Message::Hello(_)));

        let welcome = WelcomePayload {
            status: AckStatus::Ok,
            server_version: 1,
            peers: vec!["bob".into()],
            error: None,
        };
        let locked = Inbound::ObjectLocked(LockEntry {
            object_id: "sofa".into(),
            holder_id: "bob".into(),
        });
        write_message(&mut hub, &Message::Welcome(welcome.clone())).unwrap();
        write_message(&mut hub, &Message::Server(locked.clone())).unwrap();

        let wait = Duration::from_secs(1);
        assert_eq!(chans.welcome.recv_timeout(wait).unwrap(), welcome);
        assert_eq!(chans.inbound.recv_timeout(wait).unwrap(), locked);

        let release = Outbound::ReleaseLock(ObjectRef {
            object_id: "sofa".into(),
        });
        chans.outbound.send(release.clone()).unwrap();
        let sent = read_packet(&mut hub).unwrap().unwrap();
        assert_eq!(decode_message(&sent).unwrap().0, Message::Client(release));
    }
}
