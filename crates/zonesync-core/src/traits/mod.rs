//! Collaborator traits
//!
//! The core treats the remote DNS provider and the live DNS resolver as
//! opaque collaborators, specified only at their interface boundary.

pub mod resolver;
pub mod zone_api;

pub use resolver::{DnsResolver, ResolveError, ResolvedRecord};
pub use zone_api::{RecordSetProperties, RemoteRecordSet, ZoneApi};
