/// Errors that can occur while talking to a data node.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Node returned no content for {url}")]
    NoContent { url: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error (HTTP {status}) for {url}")]
    Status { status: u16, url: String },

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Invalid XSAMS document: {0}")]
    InvalidXsams(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NodeError {
    pub fn invalid_xsams(msg: impl Into<String>) -> Self {
        Self::InvalidXsams(msg.into())
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Whether the error means the node answered but has nothing for the
    /// query.
    pub fn is_no_content(&self) -> bool {
        matches!(self, Self::NoContent { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
