use crate::responder::DnsResponder;
use crate::wire::HEADER_LEN;
use std::io;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Serving loop: one task, one datagram at a time.
///
/// The only suspension points are the socket receive and the reply send, so
/// a table swap via [`DnsResponder::add_domain`] can never interleave with
/// an in-flight lookup.
pub struct UdpServer {
    socket: UdpSocket,
    responder: Arc<DnsResponder>,
    max_packet_len: usize,
    shutdown: CancellationToken,
}

impl UdpServer {
    pub fn new(socket: UdpSocket, responder: Arc<DnsResponder>, max_packet_len: usize) -> Self {
        Self {
            socket,
            responder,
            max_packet_len,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Runs until cancelled. Receive and send failures are logged and the
    /// loop keeps serving; each reply is sent exactly once, no retries.
    pub async fn run(self) {
        let mut buf = vec![0u8; self.max_packet_len.max(HEADER_LEN)];

        match self.socket.local_addr() {
            Ok(addr) => info!(local_addr = %addr, "DNS responder listening"),
            Err(_) => info!("DNS responder listening"),
        }

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("DNS responder shutting down");
                    break;
                }
                recv = self.socket.recv_from(&mut buf) => {
                    let (len, peer) = match recv {
                        Ok(received) => received,
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            error!(error = %e, "UDP recv error");
                            continue;
                        }
                    };

                    let Some(reply) = self.responder.handle_packet(&buf[..len]) else {
                        continue;
                    };
                    if let Err(e) = self.socket.send_to(&reply, peer).await {
                        warn!(peer = %peer, error = %e, "failed to send DNS reply");
                    }
                }
            }
        }
    }
}
