use std::time::Duration;

use anyhow::Context;
use url::Url;

pub const SERVER_URL_ENV: &str = "KOLP_SERVER_URL";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Parse and normalize the server base URL so joins keep the full path.
pub fn parse_server_url(raw: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(raw.trim()).with_context(|| format!("invalid server URL '{}'", raw))?;
    match url.scheme() {
        "http" | "https" => {}
        other => anyhow::bail!("unsupported server URL scheme '{}'", other),
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Up,
    Degraded,
    Down,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_trailing_slash() {
        let url = parse_server_url("http://localhost:3000/kol").unwrap();
        assert_eq!(url.join("health").unwrap().as_str(), "http://localhost:3000/kol/health");
        let url = parse_server_url(DEFAULT_SERVER_URL).unwrap();
        assert_eq!(url.join("api/customers").unwrap().as_str(), "http://localhost:3000/api/customers");
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(parse_server_url("ftp://example.com").is_err());
        assert!(parse_server_url("not a url").is_err());
    }
}
