use std::io::{self, ErrorKind, Read, Write};
use std::mem;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use log::debug;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::error::ProbeError;
use crate::payload;
use crate::report::ProbeReport;

/// What to do once the payload has gone out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// Read a single reply of at most `capacity` bytes.
    Reply { capacity: usize },
    /// Read nothing; linger for `duration` so the server can drain the
    /// request, then close.
    Pause { duration: Duration },
}

/// One configured attempt. Everything is fixed before `run`; the stages are
/// strictly ordered and the first failure skips the rest, except release.
#[derive(Debug, Clone)]
pub struct Probe {
    pub host: String,
    pub port: u16,
    pub payload: Bytes,
    pub wait: Wait,
}

impl Probe {
    /// The 16-byte request the server answers.
    pub fn exchange() -> Probe {
        Probe {
            host: payload::TARGET_HOST.to_string(),
            port: payload::TARGET_PORT,
            payload: Bytes::from_static(payload::EXCHANGE_PAYLOAD),
            wait: Wait::Reply {
                capacity: payload::REPLY_CAPACITY,
            },
        }
    }

    /// The 20-byte request sent without reading anything back.
    pub fn oneway() -> Probe {
        Probe {
            host: payload::TARGET_HOST.to_string(),
            port: payload::TARGET_PORT,
            payload: Bytes::from_static(payload::ONEWAY_PAYLOAD),
            wait: Wait::Pause {
                duration: payload::ONEWAY_PAUSE,
            },
        }
    }

    /// Runs the attempt to completion and reports what happened. The
    /// transport is released exactly once on every path.
    pub fn run(&self) -> ProbeReport {
        let mut report = ProbeReport::default();
        let mut transport = Transport::idle();

        if let Err(error) = self.attempt(&mut transport, &mut report) {
            debug!("attempt ended at {:?}: {}", error.stage(), error);
            report.error = Some(error);
        }

        report.close_error = transport.release().err();
        report
    }

    fn attempt(
        &self,
        transport: &mut Transport,
        report: &mut ProbeReport,
    ) -> Result<(), ProbeError> {
        transport.open()?;
        let addr = resolve(&self.host, self.port)?;
        transport.establish(&addr)?;
        debug!("connected to {}", addr);

        send_all(transport.stream()?, &self.payload)?;
        report.sent = Some(self.payload.clone());

        match self.wait {
            Wait::Reply { capacity } => {
                let reply = recv_bounded(transport.stream()?, capacity)?;
                debug!("received {} bytes", reply.len());
                report.reply = Some(reply);
            }
            Wait::Pause { duration } => {
                debug!("lingering {:?} before close", duration);
                thread::sleep(duration);
                report.paused = Some(duration);
            }
        }

        Ok(())
    }
}

/// Scoped owner of the probe socket. The descriptor is released exactly
/// once: explicitly through `release`, or on drop as a backstop.
pub struct Transport {
    state: State,
}

enum State {
    Idle,
    Open(Socket),
    Connected(TcpStream),
    Released,
}

impl Transport {
    pub fn idle() -> Transport {
        Transport { state: State::Idle }
    }

    /// Acquires a connection-oriented IPv4 socket.
    pub fn open(&mut self) -> Result<(), ProbeError> {
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
            .map_err(|source| ProbeError::SocketCreation { source })?;

        self.state = State::Open(socket);
        Ok(())
    }

    /// Connects the open socket to the target address.
    pub fn establish(&mut self, addr: &SocketAddr) -> Result<(), ProbeError> {
        match mem::replace(&mut self.state, State::Idle) {
            State::Open(socket) => match socket.connect(&SockAddr::from(*addr)) {
                Ok(()) => {
                    self.state = State::Connected(socket.into());
                    Ok(())
                }
                Err(source) => {
                    // the failed socket stays owned so release still covers it
                    self.state = State::Open(socket);
                    Err(classify_connect(addr, source))
                }
            },
            state => {
                self.state = state;
                Err(ProbeError::unexpected(
                    "connect attempted without an open socket",
                ))
            }
        }
    }

    pub fn stream(&self) -> Result<&TcpStream, ProbeError> {
        match &self.state {
            State::Connected(stream) => Ok(stream),
            _ => Err(ProbeError::unexpected("transport is not connected")),
        }
    }

    /// Releases the descriptor. Safe to call in any state and a no-op the
    /// second time. A peer that closed the connection first is not an error.
    pub fn release(&mut self) -> Result<(), ProbeError> {
        match mem::replace(&mut self.state, State::Released) {
            State::Connected(stream) => match stream.shutdown(Shutdown::Both) {
                Ok(()) => Ok(()),
                Err(source) if source.kind() == ErrorKind::NotConnected => Ok(()),
                Err(source) => Err(ProbeError::Close { source }),
            },
            _ => Ok(()),
        }
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, ProbeError> {
    let authority = format!("{}:{}", host, port);

    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ProbeError::AddressResolution {
            authority: authority.clone(),
            source,
        })?;

    addrs
        .find(|addr| addr.is_ipv4())
        .ok_or(ProbeError::AddressResolution {
            authority,
            source: io::Error::new(ErrorKind::NotFound, "no IPv4 address for host"),
        })
}

fn classify_connect(addr: &SocketAddr, source: io::Error) -> ProbeError {
    let authority = addr.to_string();

    match source.kind() {
        ErrorKind::ConnectionRefused
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::HostUnreachable
        | ErrorKind::NetworkUnreachable
        | ErrorKind::TimedOut => ProbeError::Connection { authority, source },
        _ => ProbeError::GenericSocket { authority, source },
    }
}

/// Sends every payload byte or fails. A zero-length write is a failure
/// carrying the byte counts, never a silently accepted short send.
fn send_all<W: Write>(mut writer: W, payload: &[u8]) -> Result<(), ProbeError> {
    let expected = payload.len();
    let mut sent = 0;

    while sent < expected {
        match writer.write(&payload[sent..]) {
            Ok(0) => {
                return Err(ProbeError::Send {
                    sent,
                    expected,
                    source: io::Error::new(ErrorKind::WriteZero, "socket accepted no bytes"),
                })
            }
            Ok(written) => sent += written,
            Err(source) if source.kind() == ErrorKind::Interrupted => {}
            Err(source) => return Err(ProbeError::Send { sent, expected, source }),
        }
    }

    Ok(())
}

/// One bounded read. Zero bytes means the server closed or had nothing to
/// say; both count as a reply.
fn recv_bounded<R: Read>(mut reader: R, capacity: usize) -> Result<Vec<u8>, ProbeError> {
    let mut reply = vec![0u8; capacity];

    loop {
        match reader.read(&mut reply) {
            Ok(received) => {
                reply.truncate(received);
                return Ok(reply);
            }
            Err(source) if source.kind() == ErrorKind::Interrupted => {}
            Err(source) => return Err(ProbeError::Receive { source }),
        }
    }
}
