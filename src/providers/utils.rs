use anyhow::Result;
use reqwest::Client;
use std::time::Duration;

/// HTTP client shared by the REST-based backends.
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()?)
}

/// Joins a base URL and an API path without doubling or dropping the slash.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalizes_slashes() {
        assert_eq!(endpoint("http://localhost:11434", "api/embed"), "http://localhost:11434/api/embed");
        assert_eq!(endpoint("http://localhost:11434/", "/api/embed"), "http://localhost:11434/api/embed");
    }

    #[test]
    fn client_builds_with_timeout() {
        assert!(build_http_client(Duration::from_secs(5)).is_ok());
    }
}
