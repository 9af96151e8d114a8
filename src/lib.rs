pub mod config;
pub mod dns;
pub mod error;
pub mod ndn;
pub mod policy;
pub mod resolver;
pub mod wire;

pub use config::{PolicyConfig, ResolverConfig};
pub use dns::DNSMessage;
pub use error::{ConfigError, Error};
pub use ndn::{Name, SignedObject};
pub use policy::{TrustPolicy, TrustVerifier};
pub use resolver::{Resolution, ResolutionEngine, ResolveError};
