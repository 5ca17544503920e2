use std::fmt;

use url::Url;

/// Why a source URL yielded no referring host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    Parse(url::ParseError),
    NoHost,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Parse(e) => write!(f, "unparsable URL: {}", e),
            HostError::NoHost => f.write_str("URL has no host"),
        }
    }
}

impl std::error::Error for HostError {}

/// Strip scheme and `www.` from a user-supplied domain.
///
/// Plain literal removal, scheme first and then `www.`, so
/// `https://www.example.com` and `example.com` end up identical.
pub fn normalize_domain(domain: &str) -> String {
    domain
        .trim()
        .replace("http://", "")
        .replace("https://", "")
        .replace("www.", "")
}

/// Hostname of a backlink's source page.
pub fn referring_host(source_url: &str) -> Result<String, HostError> {
    let url = Url::parse(source_url).map_err(HostError::Parse)?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(host.to_string()),
        _ => Err(HostError::NoHost),
    }
}
