//! URL-level security checks (§4.1's "all fail the URL validity" list).
//!
//! Hostname classification here is by string/literal match only — no DNS
//! resolution happens at parse time. Grounded on the teacher's SSRF guard
//! in `crawler/src/engine.rs` (`is_ssrf_target`/`is_private_ip`).

use std::net::IpAddr;

use url::Url;

pub(crate) fn check(url: &Url, allow_local: bool) -> Result<(), String> {
    if !allow_local {
        if let Some(host) = url.host_str() {
            if is_private_or_local(host) {
                return Err(format!("host resolves to a private/loopback address: {host}"));
            }
        }
    }

    if path_escapes_root(url.path()) {
        return Err("path traversal escapes root after normalization".to_string());
    }

    if has_encoded_control_char(url.path())
        || url.query().is_some_and(has_encoded_control_char)
        || url.host_str().is_some_and(has_encoded_control_char)
    {
        return Err("percent-encoded NUL or control character in URL".to_string());
    }

    Ok(())
}

/// Scans for `%XX` triples that decode to a NUL byte, a C0 control
/// character, or DEL (0x7F). The `url` crate percent-encodes but never
/// decodes path/query bytes, so `%00` survives parsing untouched.
fn has_encoded_control_char(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i + 2 < bytes.len() {
        if bytes[i] == b'%' {
            if let Ok(hex) = std::str::from_utf8(&bytes[i + 1..i + 3]) {
                if let Ok(decoded) = u8::from_str_radix(hex, 16) {
                    if decoded < 0x20 || decoded == 0x7f {
                        return true;
                    }
                }
            }
        }
        i += 1;
    }
    false
}

fn is_private_or_local(host: &str) -> bool {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return is_private_ip(&ip);
    }

    let lower = host.to_ascii_lowercase();
    lower == "localhost"
        || lower.ends_with(".localhost")
        || lower.ends_with(".local")
        || lower.ends_with(".internal")
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                || is_carrier_grade_nat(v4)
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00) == 0xfc00 // unique local fc00::/7
                || (v6.segments()[0] & 0xffc0) == 0xfe80 // link-local fe80::/10
        }
    }
}

/// `100.64.0.0/10`, used for carrier-grade NAT — not covered by
/// `Ipv4Addr::is_private`.
fn is_carrier_grade_nat(v4: &std::net::Ipv4Addr) -> bool {
    let octets = v4.octets();
    octets[0] == 100 && (octets[1] & 0b1100_0000) == 0b0100_0000
}

fn path_escapes_root(path: &str) -> bool {
    path.split('/').any(|segment| segment == "..")
}
