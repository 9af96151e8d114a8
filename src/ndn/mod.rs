//! Hierarchical names, signed objects and the network faces that carry them.

pub mod data;
pub mod memory;
pub mod name;
pub mod tlv;
pub mod transport;
pub mod udp;

pub use data::{KeyLocator, SignedObject};
pub use memory::MemoryNetwork;
pub use name::{Component, Name, NameError, dnsify, ndnify, qualify, relativize};
pub use transport::{Face, FaceScope, InterestOptions, Transport, TransportError};
pub use udp::UdpTransport;
