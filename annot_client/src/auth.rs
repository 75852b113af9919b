use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::Deserialize;
use tracing::info;

use crate::api::error_detail;
use crate::config::Context;

/// Claims of interest inside a Nobl9 access token.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default, rename = "m2mProfile")]
    m2m_profile: Option<M2mProfile>,
}

#[derive(Debug, Deserialize)]
struct M2mProfile {
    #[serde(default)]
    organization: Option<String>,
}

/// Extracts the organization from a JWT's `m2mProfile` claim.
///
/// Anything that does not decode yields `None`; a stale or malformed token
/// just means the caller falls through to the next source.
pub fn organization_from_token(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: TokenClaims = serde_json::from_slice(&bytes).ok()?;
    claims.m2m_profile?.organization
}

/// Resolution order: explicit config value, then the stored token's claim,
/// then the SLOCTL_ORGANIZATION environment variable.
pub fn resolve_organization(context: &Context) -> Option<String> {
    if let Some(organization) = context.organization.as_deref() {
        if !organization.is_empty() {
            return Some(organization.to_string());
        }
    }
    if let Some(token) = context.access_token.as_deref() {
        if let Some(organization) = organization_from_token(token) {
            return Some(organization);
        }
    }
    std::env::var("SLOCTL_ORGANIZATION")
        .ok()
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges client credentials for a bearer token.
pub async fn fetch_access_token(context: &Context, organization: &str) -> Result<String> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("building HTTP client")?;

    let credentials = STANDARD.encode(format!("{}:{}", context.client_id, context.client_secret));
    let url = format!("{}/api/accessToken", context.base_url());
    info!(url = %url, "authenticating");

    let response = http
        .post(&url)
        .header("Accept", "application/json; version=v1alpha")
        .header("Organization", organization)
        .header("Authorization", format!("Basic {credentials}"))
        .send()
        .await
        .context("access token request failed")?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        bail!(
            "authentication failed (status {}): {}",
            status.as_u16(),
            error_detail(&body)
        );
    }

    let token: TokenResponse = serde_json::from_str(&body)
        .with_context(|| format!("unexpected access token response: {body}"))?;
    info!("access token acquired");
    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &str) -> String {
        let encoded = URL_SAFE_NO_PAD.encode(payload);
        format!("eyJhbGciOiJSUzI1NiJ9.{encoded}.c2lnbmF0dXJl")
    }

    fn context_with(organization: Option<&str>, access_token: Option<String>) -> Context {
        Context {
            name: "test".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            organization: organization.map(str::to_string),
            access_token,
            url: None,
        }
    }

    #[test]
    fn decodes_organization_claim() {
        let token = token_with_payload(r#"{"m2mProfile": {"organization": "acme"}}"#);
        assert_eq!(organization_from_token(&token).as_deref(), Some("acme"));
    }

    #[test]
    fn malformed_tokens_decode_to_none() {
        assert_eq!(organization_from_token("not-a-jwt"), None);
        assert_eq!(organization_from_token("a.%%%.c"), None);

        let token = token_with_payload(r#"{"sub": "someone"}"#);
        assert_eq!(organization_from_token(&token), None);
    }

    #[test]
    fn config_organization_wins_over_token_claim() {
        let token = token_with_payload(r#"{"m2mProfile": {"organization": "from-token"}}"#);
        let context = context_with(Some("from-config"), Some(token));
        assert_eq!(resolve_organization(&context).as_deref(), Some("from-config"));
    }

    #[test]
    fn token_claim_fills_in_for_missing_config_value() {
        let token = token_with_payload(r#"{"m2mProfile": {"organization": "from-token"}}"#);
        let context = context_with(None, Some(token));
        assert_eq!(resolve_organization(&context).as_deref(), Some("from-token"));
    }
}
