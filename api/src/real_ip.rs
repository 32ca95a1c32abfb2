// Proxy handling follows the usual "walk X-Forwarded-For from the right"
// approach: only hops appended by proxies we trust are believed.

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::ConnectInfo,
    http::{HeaderMap, request::Parts},
};
use ipnetwork::IpNetwork;

use crate::{App, error::AppError};

fn is_trusted(ip: &IpAddr, trusted_proxies: &[IpNetwork]) -> bool {
    trusted_proxies.iter().any(|proxy| proxy.contains(*ip))
}

fn forwarded_for(headers: &HeaderMap) -> Vec<IpAddr> {
    headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| header.split(','))
        .filter_map(|ip| ip.trim().parse().ok())
        .collect()
}

/// Resolves the originating client address. Forwarded headers are only
/// honoured when the connecting socket is a trusted proxy; the client is
/// then the right-most forwarded address that is not itself a trusted proxy.
pub fn resolve_client_ip(
    headers: &HeaderMap,
    socket_ip: IpAddr,
    trusted_proxies: &[IpNetwork],
) -> IpAddr {
    if !is_trusted(&socket_ip, trusted_proxies) {
        return socket_ip;
    }

    let hops = forwarded_for(headers);

    hops.iter()
        .rev()
        .find(|ip| !is_trusted(ip, trusted_proxies))
        .or(hops.first())
        .copied()
        .unwrap_or(socket_ip)
}

pub struct ClientIp(pub IpAddr);

impl axum::extract::FromRequestParts<App> for ClientIp {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
        let socket_ip: IpAddr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .ok_or("couldn't get connecting socket IP")?
            .0
            .ip();

        let client_ip = resolve_client_ip(&parts.headers, socket_ip, &state.config.trusted_proxies);

        if client_ip != socket_ip {
            tracing::debug!(?client_ip, ?socket_ip, "Using forwarded client IP");
        }

        Ok(ClientIp(client_ip))
    }
}
