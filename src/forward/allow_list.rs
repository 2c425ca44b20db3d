//! Target allow-list.
//!
//! A best-effort guard against forwarding to the host itself or to the local
//! network. It is intentionally narrow: metadata addresses such as
//! `169.254.169.254`, other loopback spellings, private ranges and DNS
//! rebinding are not covered.

use std::net::{Ipv4Addr, Ipv6Addr};

use url::{Host, Url};

/// Returns true when `base` may be used as a forwarding target.
///
/// Rejects unparsable URLs, any scheme other than `https`, the hosts
/// `localhost`, `127.0.0.1` and `::1`, and hostnames ending in `.local`.
pub fn is_allowed_base(base: &str) -> bool {
    let Ok(url) = Url::parse(base) else {
        return false;
    };

    if url.scheme() != "https" {
        return false;
    }

    match url.host() {
        Some(Host::Domain(domain)) => {
            let host = domain.to_ascii_lowercase();
            host != "localhost" && !host.ends_with(".local")
        }
        Some(Host::Ipv4(addr)) => addr != Ipv4Addr::LOCALHOST,
        Some(Host::Ipv6(addr)) => addr != Ipv6Addr::LOCALHOST,
        None => false,
    }
}
