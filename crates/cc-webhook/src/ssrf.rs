//! Outbound webhook URL validation — §4.8's "SSRF is rejected at the API
//! edge." Called from agent registration/update, not from the dispatcher
//! itself, so a URL is only ever checked once, at the point it is accepted.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use reqwest::Url;

use crate::error::DispatchError;

/// `allow_private` mirrors `NODE_ENV=development`, which relaxes the host
/// check so a local test agent can point at `http://localhost:...`.
pub fn validate_webhook_url(raw: &str, allow_private: bool) -> Result<(), DispatchError> {
    let url = Url::parse(raw).map_err(|e| DispatchError::InvalidUrl(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(DispatchError::InvalidUrl(format!("unsupported scheme {other}"))),
    }

    if allow_private {
        return Ok(());
    }

    let host = url
        .host_str()
        .ok_or_else(|| DispatchError::InvalidUrl("url has no host".into()))?;

    if host.eq_ignore_ascii_case("localhost") {
        return Err(DispatchError::InvalidUrl("localhost is not allowed".into()));
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_disallowed_ip(ip) {
            return Err(DispatchError::InvalidUrl(format!("{host} resolves to a private or loopback address")));
        }
    }

    Ok(())
}

fn is_disallowed_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_disallowed_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_disallowed_v4(v4),
            None => is_disallowed_v6(v6),
        },
    }
}

fn is_disallowed_v4(ip: Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
}

fn is_disallowed_v6(ip: Ipv6Addr) -> bool {
    // fc00::/7 is the unique-local range, RFC1918's IPv6 analogue; fe80::/10
    // is link-local. Neither has a stable `Ipv6Addr` predicate yet, so the
    // mask is applied directly against the first 16-bit segment.
    let segments = ip.segments();
    let is_unique_local = segments[0] & 0xfe00 == 0xfc00;
    let is_link_local = segments[0] & 0xffc0 == 0xfe80;
    ip.is_loopback() || ip.is_unspecified() || is_unique_local || is_link_local
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_loopback() {
        assert!(validate_webhook_url("http://127.0.0.1:9000/hook", false).is_err());
        assert!(validate_webhook_url("http://localhost/hook", false).is_err());
    }

    #[test]
    fn rejects_rfc1918() {
        assert!(validate_webhook_url("https://10.0.0.5/hook", false).is_err());
        assert!(validate_webhook_url("https://192.168.1.5/hook", false).is_err());
        assert!(validate_webhook_url("https://172.16.0.5/hook", false).is_err());
    }

    #[test]
    fn rejects_link_local_and_ipv6_localhost() {
        assert!(validate_webhook_url("http://169.254.1.1/hook", false).is_err());
        assert!(validate_webhook_url("http://[::1]/hook", false).is_err());
        assert!(validate_webhook_url("http://[fe80::1]/hook", false).is_err());
    }

    #[test]
    fn accepts_public_https() {
        assert!(validate_webhook_url("https://agent.example.com/webhooks/clawcombat", false).is_ok());
    }

    #[test]
    fn development_mode_allows_private_hosts() {
        assert!(validate_webhook_url("http://127.0.0.1:9000/hook", true).is_ok());
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(validate_webhook_url("ftp://agent.example.com/hook", false).is_err());
    }
}
