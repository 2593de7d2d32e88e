//! Client address resolution for rate-limit keys.

use std::net::SocketAddr;

use http::HeaderMap;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const UNKNOWN_CLIENT: &str = "unknown";

/// Resolve the key identifying the caller.
///
/// With `trust_proxy_hops == 0` the socket peer is used. Otherwise the
/// `X-Forwarded-For` chain is read and the entry `trust_proxy_hops` places
/// from the right is taken, i.e. the address as seen by the outermost
/// trusted proxy. Falls back to the peer, then to `"unknown"`.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy_hops: usize) -> String {
    if trust_proxy_hops > 0
        && let Some(addr) = forwarded_client(headers, trust_proxy_hops)
    {
        return addr;
    }
    peer.map(|p| p.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn forwarded_client(headers: &HeaderMap, hops: usize) -> Option<String> {
    let chain: Vec<&str> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    chain
        .get(chain.len().saturating_sub(hops))
        .map(|s| s.to_string())
}
