//! Remote data node access.
//!
//! Builds VSS2 queries, sends them to VAMDC-style data nodes over blocking
//! HTTP, and parses the XSAMS responses into typed records. The [`Gateway`]
//! trait is the only surface the synchroniser depends on.

pub mod client;
pub mod error;
pub mod node;
pub mod query;
pub mod result;
pub mod xsams;

pub use client::{Gateway, VamdcClient, parse_last_modified, uuid_from_token};
pub use error::NodeError;
pub use node::{Node, NodeRegistry, StaticRegistry, builtin_nodes};
pub use query::SpeciesQuery;
pub use result::{
    Atom, Molecule, PartitionFunctionBlock, QuantumNumbers, QueryResult, RadiativeTransition,
    SpeciesCatalogue, State, is_vibrational_label,
};
pub use xsams::{parse_xsams, parse_xsams_str};
