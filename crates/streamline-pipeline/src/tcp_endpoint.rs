//! Single-client, non-blocking TCP listening endpoint with accept-replace
//! semantics.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::{Duration, Instant};

use socket2::{Domain, Protocol, Socket, Type};

use crate::error::{Error, Result};

const READ_CHUNK: usize = 4096;
const POLL_GRANULARITY: Duration = Duration::from_millis(1);

/// A non-blocking, single-connection TCP server.
///
/// Only ever tracks one peer connection at a time: a new `accept()` replaces
/// whatever connection was previously open (closing it first), matching the
/// single-upstream-device assumption of the rest of the pipeline.
pub struct TcpEndpoint {
    listener: TcpListener,
    conn: Option<TcpStream>,
    bound_host: String,
    bound_port: u16,
}

impl TcpEndpoint {
    /// Bind a listening socket at `host:port`.
    ///
    /// If binding the requested `host` fails because the address is not
    /// available on this machine, and `host` was not already the unspecified
    /// address, retries against `0.0.0.0` on the same port and records the
    /// actual bound host.
    pub fn bind(host: &str, port: u16) -> Result<Self> {
        let (listener, bound_host) = Self::bind_with_fallback(host, port)?;
        Ok(Self {
            listener,
            conn: None,
            bound_host,
            bound_port: port,
        })
    }

    fn bind_with_fallback(host: &str, port: u16) -> Result<(TcpListener, String)> {
        match Self::try_bind(host, port) {
            Ok(listener) => Ok((listener, host.to_string())),
            Err(e) if host != "0.0.0.0" && e.kind() == ErrorKind::AddrNotAvailable => {
                tracing::warn!(requested_host = host, "bind failed, falling back to 0.0.0.0");
                let listener = Self::try_bind("0.0.0.0", port)
                    .map_err(|e| Error::Bind("0.0.0.0".to_string(), e))?;
                Ok((listener, "0.0.0.0".to_string()))
            }
            Err(e) => Err(Error::Bind(host.to_string(), e)),
        }
    }

    fn try_bind(host: &str, port: u16) -> std::io::Result<TcpListener> {
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|_| std::io::Error::new(ErrorKind::InvalidInput, "invalid host/port"))?;

        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.listen(1)?;
        socket.set_nonblocking(true)?;
        Ok(socket.into())
    }

    /// The host actually bound (may differ from the requested host after a
    /// fallback).
    #[must_use]
    pub fn bound_host(&self) -> &str {
        &self.bound_host
    }

    /// The port actually bound.
    #[must_use]
    pub fn bound_port(&self) -> u16 {
        self.bound_port
    }

    /// The real local address of the listening socket, including the actual
    /// port chosen by the OS when the caller requested port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// True if a peer is currently connected.
    #[must_use]
    pub fn has_connection(&self) -> bool {
        self.conn.is_some()
    }

    /// Wait up to `timeout` for the listener or current connection to become
    /// readable, servicing at most one accept and one read.
    ///
    /// Returns the bytes read from the connection, if any (possibly empty,
    /// either because nothing arrived before the deadline or because only an
    /// accept happened this call).
    pub fn poll(&mut self, timeout: Duration) -> Vec<u8> {
        let deadline = Instant::now() + timeout;

        loop {
            match self.listener.accept() {
                Ok((stream, _addr)) => {
                    if stream.set_nonblocking(true).is_ok() {
                        self.conn = Some(stream);
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {}
                Err(e) => {
                    tracing::warn!(error = %e, "listener accept error");
                }
            }

            if let Some(conn) = self.conn.as_mut() {
                let mut buf = [0u8; READ_CHUNK];
                match conn.read(&mut buf) {
                    Ok(0) => {
                        self.conn = None;
                    }
                    Ok(n) => return buf[..n].to_vec(),
                    Err(e) if e.kind() == ErrorKind::WouldBlock => {}
                    Err(_) => {
                        self.conn = None;
                    }
                }
            }

            if Instant::now() >= deadline {
                return Vec::new();
            }
            std::thread::sleep(POLL_GRANULARITY.min(deadline.saturating_duration_since(Instant::now())));
        }
    }

    /// Best-effort send. Returns `false` if there is no connection or the
    /// write fails; never blocks indefinitely. On error the connection is
    /// left open — the next failing `poll` tears it down.
    pub fn send(&mut self, bytes: &[u8]) -> bool {
        let Some(conn) = self.conn.as_mut() else {
            return false;
        };

        let mut written = 0;
        while written < bytes.len() {
            match conn.write(&bytes[written..]) {
                Ok(0) => return false,
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(POLL_GRANULARITY);
                }
                Err(_) => return false,
            }
        }
        true
    }
}
