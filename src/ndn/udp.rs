use async_trait::async_trait;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, trace};

use super::data::SignedObject;
use super::name::Name;
use super::tlv::{self, Packet};
use super::transport::{Face, InterestOptions, Transport, TransportError};

/// Largest packet an NDN forwarder will send over UDP.
pub const MAX_PACKET_SIZE: usize = 8800;

/// Faces over UDP to a local forwarder, one socket per face.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    forwarder: SocketAddr,
}

impl UdpTransport {
    pub fn new(forwarder: SocketAddr) -> Self {
        Self { forwarder }
    }

    pub fn forwarder(&self) -> SocketAddr {
        self.forwarder
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn open(&self) -> Result<Box<dyn Face>, TransportError> {
        let bind_addr = if self.forwarder.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(self.forwarder).await?;
        debug!("UDP face connected to {}", self.forwarder);
        Ok(Box::new(UdpFace {
            socket: Some(socket),
            buf: vec![0; MAX_PACKET_SIZE],
        }))
    }
}

struct UdpFace {
    socket: Option<UdpSocket>,
    buf: Vec<u8>,
}

#[async_trait]
impl Face for UdpFace {
    async fn express_interest(
        &mut self,
        name: &Name,
        options: &InterestOptions,
    ) -> Result<SignedObject, TransportError> {
        let socket = self.socket.as_ref().ok_or(TransportError::Closed)?;
        let wire = tlv::encode_interest(name, options, rand::random::<u32>());
        socket.send(&wire).await?;

        // The lifetime is enforced by the caller; keep reading until a
        // matching packet arrives.
        loop {
            let len = socket.recv(&mut self.buf).await?;
            match tlv::decode_packet(&self.buf[..len]) {
                Ok(Packet::Data(object)) if options.satisfied_by(name, &object.name) => {
                    return Ok(object);
                }
                Ok(Packet::Nack { name: nacked, reason }) if &nacked == name => {
                    return Err(TransportError::Nack { name: nacked, reason });
                }
                Ok(_) => trace!("Ignoring unrelated packet while waiting for {}", name),
                Err(e) => debug!("Dropping undecodable datagram: {}", e),
            }
        }
    }

    fn close(&mut self) {
        self.socket = None;
    }
}
