//! Data node descriptors and the registry that resolves them.

use serde::{Deserialize, Serialize};

/// A remote data node answering VSS2 queries with XSAMS documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// IVOA identifier, also stored as the resource id of imported records.
    pub identifier: String,
    /// Base URL of the TAP service. Queries go to `{url}/sync`.
    pub url: String,
    pub name: String,
}

impl Node {
    pub fn new(
        identifier: impl Into<String>,
        url: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            url: url.into(),
            name: name.into(),
        }
    }

    /// URL of the synchronous query endpoint.
    pub fn sync_url(&self) -> String {
        format!("{}/sync", self.url.trim_end_matches('/'))
    }
}

/// Resolves node identifiers to node descriptors.
pub trait NodeRegistry {
    /// Find a node by identifier or (case-insensitive) name.
    fn find(&self, identifier: &str) -> Option<&Node>;

    /// All known nodes.
    fn nodes(&self) -> &[Node];
}

/// A registry with a fixed list of nodes, typically from the settings file.
#[derive(Debug, Clone)]
pub struct StaticRegistry {
    nodes: Vec<Node>,
}

impl StaticRegistry {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// The built-in nodes plus `extra`. Entries in `extra` replace built-in
    /// nodes with the same identifier.
    pub fn with_defaults(extra: Vec<Node>) -> Self {
        let mut nodes: Vec<Node> = builtin_nodes()
            .into_iter()
            .filter(|n| !extra.iter().any(|e| e.identifier == n.identifier))
            .collect();
        nodes.extend(extra);
        Self { nodes }
    }
}

impl Default for StaticRegistry {
    fn default() -> Self {
        Self::new(builtin_nodes())
    }
}

impl NodeRegistry for StaticRegistry {
    fn find(&self, identifier: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| n.identifier == identifier)
            .or_else(|| {
                self.nodes
                    .iter()
                    .find(|n| n.name.eq_ignore_ascii_case(identifier))
            })
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

/// The CDMS and JPL catalogue nodes.
pub fn builtin_nodes() -> Vec<Node> {
    vec![
        Node::new(
            "ivo://vamdc/cdms/vamdc-tap_12.07",
            "https://cdms.astro.uni-koeln.de/cdms/tap/",
            "CDMS",
        ),
        Node::new(
            "ivo://vamdc/jpl/vamdc-tap_12.07",
            "https://cdms.astro.uni-koeln.de/jpl/tap/",
            "JPL",
        ),
    ]
}
