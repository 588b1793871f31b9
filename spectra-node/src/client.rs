//! HTTP access to data nodes.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};

use crate::error::NodeError;
use crate::node::Node;
use crate::query::SpeciesQuery;
use crate::result::{QueryResult, SpeciesCatalogue};
use crate::xsams::parse_xsams_str;

const TOKEN_HEADER: &str = "vamdc-request-token";
const QUERY_STORE_URL: &str = "https://querystore.vamdc.eu/GetUUIDByToken";
const QUERY_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Boundary to the remote data nodes.
///
/// The synchroniser only talks to nodes through this trait, so tests can
/// substitute a scripted implementation.
pub trait Gateway {
    /// Run a query and parse the XSAMS response.
    fn fetch(&self, node: &Node, query: &SpeciesQuery) -> Result<QueryResult, NodeError>;

    /// Last-modified date of a species' data, from a HEAD request.
    ///
    /// `Ok(None)` when the node does not report a date. Fails with
    /// [`NodeError::NoContent`] when the node no longer knows the species.
    fn fetch_last_modified(
        &self,
        node: &Node,
        species_numeric_id: &str,
    ) -> Result<Option<DateTime<Utc>>, NodeError>;

    /// The list of species a node offers.
    fn fetch_species_catalogue(&self, node: &Node) -> Result<SpeciesCatalogue, NodeError> {
        let result = self.fetch(node, &SpeciesQuery::AllSpecies)?;
        Ok(result.species_catalogue())
    }
}

/// Blocking HTTP gateway speaking the VAMDC TAP protocol.
pub struct VamdcClient {
    http: Client,
    resolve_uuid: bool,
}

impl VamdcClient {
    /// `resolve_uuid` enables the query-store lookup of request tokens.
    pub fn new(timeout: Duration, resolve_uuid: bool) -> Result<Self, NodeError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("spectra/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, resolve_uuid })
    }

    fn query_params(query: &SpeciesQuery) -> [(&'static str, String); 4] {
        [
            ("REQUEST", "doQuery".to_string()),
            ("LANG", "VSS2".to_string()),
            ("FORMAT", "XSAMS".to_string()),
            ("QUERY", query.to_vss2()),
        ]
    }

    /// Turn transport failures into typed errors. Timeouts are reported
    /// separately so that only the current fetch is abandoned.
    fn send(
        &self,
        request: reqwest::blocking::RequestBuilder,
        url: &str,
    ) -> Result<Response, NodeError> {
        match request.send() {
            Ok(response) => Ok(response),
            Err(e) if e.is_timeout() => Err(NodeError::Timeout {
                url: url.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Query UUID for a request token.
    fn uuid_for_token(&self, token: &str) -> Option<String> {
        if self.resolve_uuid {
            match self.lookup_uuid(token) {
                Ok(Some(uuid)) => return Some(uuid),
                Ok(None) => log::debug!("Query store has no UUID for token {token} yet"),
                Err(e) => log::warn!("Query store lookup failed for token {token}: {e}"),
            }
        }
        uuid_from_token(token)
    }

    fn lookup_uuid(&self, token: &str) -> Result<Option<String>, NodeError> {
        let response = self
            .http
            .post(QUERY_STORE_URL)
            .timeout(QUERY_STORE_TIMEOUT)
            .header(reqwest::header::ACCEPT, "text/plain")
            .form(&[("queryToken", token)])
            .send()?;
        let body = response.text()?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        Ok(value
            .get("UUID")
            .and_then(|v| v.as_str())
            .map(str::to_string))
    }
}

impl Gateway for VamdcClient {
    fn fetch(&self, node: &Node, query: &SpeciesQuery) -> Result<QueryResult, NodeError> {
        let url = node.sync_url();
        log::debug!("GET {url} QUERY={query}");

        let request = self.http.get(&url).query(&Self::query_params(query));
        let response = self.send(request, &url)?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Err(NodeError::NoContent { url });
        }
        if !status.is_success() {
            return Err(NodeError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let token = response
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = match response.text() {
            Ok(body) => body,
            Err(e) if e.is_timeout() => return Err(NodeError::Timeout { url }),
            Err(e) => return Err(e.into()),
        };

        let mut result = parse_xsams_str(&body)?;
        result.query_uuid = token.as_deref().and_then(|t| self.uuid_for_token(t));
        result.request_token = token;
        log::debug!(
            "{}: {} molecules, {} atoms, {} states, {} transitions",
            node.name,
            result.molecules.len(),
            result.atoms.len(),
            result.states.len(),
            result.radiative_transitions.len()
        );
        Ok(result)
    }

    fn fetch_last_modified(
        &self,
        node: &Node,
        species_numeric_id: &str,
    ) -> Result<Option<DateTime<Utc>>, NodeError> {
        let url = node.sync_url();
        let query = SpeciesQuery::by_species_id(species_numeric_id)?;
        let request = self.http.head(&url).query(&Self::query_params(&query));
        let response = self.send(request, &url)?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Err(NodeError::NoContent { url });
        }
        if !status.is_success() {
            return Err(NodeError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let Some(header) = response.headers().get(reqwest::header::LAST_MODIFIED) else {
            return Ok(None);
        };
        let raw = header.to_str().unwrap_or_default();
        Ok(parse_last_modified(raw))
    }
}

/// Parse an HTTP date (`Tue, 15 Nov 1994 08:12:31 GMT`). Unparseable dates
/// are logged and treated as absent.
pub fn parse_last_modified(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc2822(raw.trim()) {
        Ok(date) => Some(date.with_timezone(&Utc)),
        Err(e) => {
            log::warn!("Could not parse Last-Modified date '{raw}': {e}");
            None
        }
    }
}

/// The UUID segment of a `node:uuid:method` request token. Tokens of
/// another shape are used whole.
pub fn uuid_from_token(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let parts: Vec<&str> = token.split(':').collect();
    match parts.as_slice() {
        [_, uuid, _] if !uuid.is_empty() => Some(uuid.to_string()),
        _ => Some(token.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_is_middle_token_segment() {
        assert_eq!(
            uuid_from_token("cdms:4f2a6c1e-0000-4a7b-9b1d-1f0c2e3d4a5b:get").as_deref(),
            Some("4f2a6c1e-0000-4a7b-9b1d-1f0c2e3d4a5b")
        );
        assert_eq!(uuid_from_token("opaque").as_deref(), Some("opaque"));
        assert_eq!(uuid_from_token("  "), None);
    }

    #[test]
    fn last_modified_parses_http_dates() {
        let date = parse_last_modified("Tue, 15 Nov 1994 08:12:31 GMT").unwrap();
        assert_eq!(date.to_rfc3339(), "1994-11-15T08:12:31+00:00");
        assert!(parse_last_modified("yesterday").is_none());
    }

    #[test]
    fn query_params_carry_vss2_text() {
        let params = VamdcClient::query_params(&SpeciesQuery::BySpeciesId("28".into()));
        assert_eq!(params[0], ("REQUEST", "doQuery".to_string()));
        assert_eq!(params[3], ("QUERY", "SELECT ALL WHERE SpeciesID=28".to_string()));
    }
}
