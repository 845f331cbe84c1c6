use reqwest::Url;

use crate::error::CoreError;

/// Validate a configured endpoint as an absolute HTTP(S) URL.
pub(crate) fn parse_endpoint(endpoint: &str) -> Result<Url, CoreError> {
    let parsed = Url::parse(endpoint).map_err(|e| CoreError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
        reason: format!("expected HTTP(S) URL ({e})"),
    })?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        "http" | "https" => Err(CoreError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason: "missing host".to_owned(),
        }),
        other => Err(CoreError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason: format!("unsupported scheme `{other}`; expected http or https"),
        }),
    }
}
