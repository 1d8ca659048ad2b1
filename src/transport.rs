//! The framing and multiplexing layer underneath [`crate::session::Session`]:
//! one background thread reads packets off the wire and either wakes the
//! caller blocked on a matching request id, or forwards a composite-event
//! packet to the registered hook.

use std::collections::HashMap;
use std::io::{self, BufReader, Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use log::{error, trace};

use crate::codec::{IdSizes, JdwpReadable, JdwpReader, JdwpWriter};
use crate::config::ConnectConfig;
use crate::error::ClientError;
use crate::protocol::{CommandId, ErrorCode, PacketHeader, PacketMeta};

const HANDSHAKE: &[u8; 14] = b"JDWP-Handshake";

type PendingReply = (ErrorCode, Vec<u8>);

/// What the session needs from the wire: send a request and block for its
/// reply, and register the single handler for out-of-band event packets.
pub trait Transport: Send + Sync {
    fn request(&self, command: CommandId, payload: Vec<u8>) -> Result<PendingReply, ClientError>;

    fn hook(&self, command: CommandId, handler: Box<dyn Fn(&[u8]) + Send + Sync>);
}

/// A live connection to a JDWP-speaking endpoint, demultiplexing replies by
/// packet id over a single background reader thread.
pub struct TcpTransport {
    writer: Mutex<TcpStream>,
    next_id: AtomicU32,
    pending: Mutex<HashMap<u32, Sender<PendingReply>>>,
    event_hook: Mutex<Option<(CommandId, Box<dyn Fn(&[u8]) + Send + Sync>)>>,
    dead: Mutex<Option<String>>,
}

impl TcpTransport {
    /// Dials `config`, performs the 14-byte handshake and starts the
    /// background reader thread. The returned transport outlives the
    /// connect call; the reader thread holds its own `Arc`.
    pub fn connect(config: &ConnectConfig) -> Result<Arc<Self>, ClientError> {
        let stream = TcpStream::connect((config.host.as_str(), config.port))
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        stream.set_nodelay(true).ok();

        stream
            .set_read_timeout(Some(config.handshake_timeout))
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        perform_handshake(&stream)?;
        stream
            .set_read_timeout(None)
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let reader_stream = stream
            .try_clone()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let transport = Arc::new(TcpTransport {
            writer: Mutex::new(stream),
            next_id: AtomicU32::new(1),
            pending: Mutex::new(HashMap::new()),
            event_hook: Mutex::new(None),
            dead: Mutex::new(None),
        });

        let reader_transport = transport.clone();
        thread::Builder::new()
            .name("jdwp-reader".to_owned())
            .spawn(move || reader_transport.reader_loop(reader_stream))
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(transport)
    }

    fn reader_loop(self: Arc<Self>, stream: TcpStream) {
        let mut reader = BufReader::new(stream);
        loop {
            match read_packet(&mut reader) {
                Ok((header, body)) => match header.meta() {
                    PacketMeta::Reply(code) => {
                        trace!("read reply packet {} ({} byte body, code {code})", header.id(), body.len());
                        if let Some(tx) = self.pending.lock().expect("transport lock poisoned").remove(&header.id()) {
                            let _ = tx.send((code, body));
                        }
                    }
                    PacketMeta::Command(command) => {
                        trace!("read command packet {command} ({} byte body)", body.len());
                        let hook = self.event_hook.lock().expect("transport lock poisoned");
                        if let Some((registered, handler)) = hook.as_ref() {
                            if *registered == command {
                                handler(&body);
                            }
                        }
                    }
                },
                Err(e) => {
                    error!("reader thread exiting: {e}");
                    self.mark_dead(e.to_string());
                    break;
                }
            }
        }
    }

    fn mark_dead(&self, reason: String) {
        let mut dead = self.dead.lock().expect("transport lock poisoned");
        if dead.is_none() {
            error!("transport marked dead: {reason}");
            *dead = Some(reason);
        }
        // Dropping the pending senders unblocks every outstanding
        // `request` call: its `recv()` observes a disconnected channel.
        self.pending.lock().expect("transport lock poisoned").clear();
    }
}

impl Transport for TcpTransport {
    fn request(&self, command: CommandId, payload: Vec<u8>) -> Result<PendingReply, ClientError> {
        if let Some(reason) = self.dead.lock().expect("transport lock poisoned").as_ref() {
            return Err(ClientError::Transport(reason.clone()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel();
        self.pending.lock().expect("transport lock poisoned").insert(id, tx);

        let mut packet = Vec::with_capacity(PacketHeader::SIZE as usize + payload.len());
        let length = PacketHeader::SIZE + payload.len() as u32;
        packet.extend_from_slice(&length.to_be_bytes());
        packet.extend_from_slice(&id.to_be_bytes());
        packet.push(0x00); // flags: command packet
        packet.push(command.command_set());
        packet.push(command.command());
        packet.extend_from_slice(&payload);

        trace!("writing command packet {id} {command} ({} byte payload)", payload.len());
        {
            let mut writer = self.writer.lock().expect("transport lock poisoned");
            if let Err(e) = writer.write_all(&packet) {
                self.pending.lock().expect("transport lock poisoned").remove(&id);
                let reason = e.to_string();
                self.mark_dead(reason.clone());
                return Err(ClientError::Transport(reason));
            }
        }

        rx.recv()
            .map_err(|_| ClientError::Transport("connection closed while awaiting reply".to_owned()))
    }

    fn hook(&self, command: CommandId, handler: Box<dyn Fn(&[u8]) + Send + Sync>) {
        *self.event_hook.lock().expect("transport lock poisoned") = Some((command, handler));
    }
}

fn perform_handshake(stream: &TcpStream) -> Result<(), ClientError> {
    trace!("sending JDWP handshake");
    let mut stream = stream.try_clone().map_err(|e| ClientError::Transport(e.to_string()))?;
    stream
        .write_all(HANDSHAKE)
        .map_err(|e| ClientError::Transport(e.to_string()))?;

    let mut reply = [0u8; 14];
    stream.read_exact(&mut reply).map_err(|e| {
        error!("handshake failed: {e}");
        ClientError::Transport(format!("handshake failed: {e}"))
    })?;

    if &reply != HANDSHAKE {
        error!("remote did not echo the JDWP handshake");
        return Err(ClientError::Transport(
            "remote did not echo the JDWP handshake".to_owned(),
        ));
    }
    trace!("handshake complete");
    Ok(())
}

/// Reads one packet: the 11-byte header (decoded with a throwaway
/// [`IdSizes`], since none of its fields are id-typed) followed by its raw
/// body. The body is decoded later, with the session's negotiated id
/// widths, by whoever is waiting on it.
fn read_packet<R: Read>(stream: &mut R) -> io::Result<(PacketHeader, Vec<u8>)> {
    let mut reader = JdwpReader::new(stream, IdSizes::default());
    let header = PacketHeader::read(&mut reader)?;
    let body_len = header.length().saturating_sub(PacketHeader::SIZE) as usize;
    let mut body = vec![0u8; body_len];
    reader.read_exact(&mut body)?;
    Ok((header, body))
}

/// Encodes a [`crate::protocol::Command`]'s payload with the session's
/// negotiated id widths.
pub fn encode_payload<C: crate::protocol::Command>(command: &C, id_sizes: IdSizes) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut writer = JdwpWriter::new(&mut buf, id_sizes);
        command.write(&mut writer)?;
    }
    Ok(buf)
}

/// Decodes a reply body with the session's negotiated id widths.
pub fn decode_reply<T: crate::codec::JdwpReadable>(body: &[u8], id_sizes: IdSizes) -> io::Result<T> {
    let mut reader = JdwpReader::new(body, id_sizes);
    T::read(&mut reader)
}
