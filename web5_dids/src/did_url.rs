// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! A minimal DID Core URL parser: `did:<method>:<method-id>[/path][?query][#fragment]`.

/// A parsed DID URL. `uri` is the full input verbatim; `method`/`id` are
/// the DID's own components; `path`/`query`/`fragment` are preserved
/// exactly as given, without percent-decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidUrl {
  pub method: String,
  pub id: String,
  pub path: Option<String>,
  pub query: Option<String>,
  pub fragment: Option<String>,
  pub uri: String,
}

impl DidUrl {
  /// The base DID (`did:<method>:<id>`), without path/query/fragment.
  pub fn base_uri(&self) -> String {
    format!("did:{}:{}", self.method, self.id)
  }
}

/// Parses a DID URL per DID Core syntax, returning `None` on malformed
/// input rather than an error, matching the parser contract.
pub fn parse(did_url: &str) -> Option<DidUrl> {
  let rest = did_url.strip_prefix("did:")?;

  let (before_fragment, fragment) = match rest.split_once('#') {
    Some((before, frag)) => (before, Some(frag.to_string())),
    None => (rest, None),
  };

  let (before_query, query) = match before_fragment.split_once('?') {
    Some((before, q)) => (before, Some(q.to_string())),
    None => (before_fragment, None),
  };

  let (method_and_id, path) = match before_query.split_once('/') {
    Some((before, p)) => (before, Some(format!("/{p}"))),
    None => (before_query, None),
  };

  let (method, id) = method_and_id.split_once(':')?;
  if method.is_empty() || id.is_empty() {
    return None;
  }
  if !method.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
    return None;
  }

  Some(DidUrl {
    method: method.to_string(),
    id: id.to_string(),
    path,
    query,
    fragment,
    uri: did_url.to_string(),
  })
}
