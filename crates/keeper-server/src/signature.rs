//! Ed25519 verification of incoming interactions.
//!
//! Discord signs `timestamp || body` with the application key and sends the
//! hex signature in `X-Signature-Ed25519` and the timestamp in
//! `X-Signature-Timestamp`. Unsigned or mis-signed requests must be
//! rejected with 401 or Discord disables the endpoint.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH};
use thiserror::Error;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Interactions are small; anything larger is not from Discord.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Problems with the configured public key.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("public key is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("public key must be 32 bytes, got {0}")]
    Length(usize),

    #[error("public key is not a valid Ed25519 key")]
    Invalid,
}

/// Checks interaction signatures against the application public key.
#[derive(Debug, Clone, Default)]
pub struct InteractionVerifier {
    key: Option<VerifyingKey>,
}

impl InteractionVerifier {
    /// Verifier that rejects every request.
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Parses the hex public key shown in the developer portal.
    pub fn from_hex(public_key: &str) -> std::result::Result<Self, KeyError> {
        let bytes = hex::decode(public_key.trim())?;
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::Length(bytes.len()))?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::Invalid)?;
        Ok(Self { key: Some(key) })
    }

    pub fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    /// Verifies one request.
    ///
    /// Checks run in order: empty body (400), then missing headers or key
    /// (401), then the signature itself (401).
    pub fn verify(
        &self,
        signature: Option<&str>,
        timestamp: Option<&str>,
        body: &[u8],
    ) -> Result<()> {
        if body.is_empty() {
            return Err(ApiError::BadRequest("empty body".into()));
        }

        let (Some(signature), Some(timestamp), Some(key)) = (signature, timestamp, &self.key)
        else {
            return Err(ApiError::Unauthorized("missing signature".into()));
        };

        let invalid = || ApiError::Unauthorized("invalid request signature".into());

        let signature = hex::decode(signature).map_err(|_| invalid())?;
        let signature = Signature::from_slice(&signature).map_err(|_| invalid())?;

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        key.verify(&message, &signature).map_err(|_| invalid())
    }
}

/// Middleware guarding `POST /interactions`.
///
/// Buffers the body, verifies it, and hands the same bytes on to the handler.
pub async fn verify_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::BadRequest(format!("unreadable body: {}", e)))?;

    let result = state.verifier.verify(
        header(&parts.headers, SIGNATURE_HEADER),
        header(&parts.headers, TIMESTAMP_HEADER),
        &bytes,
    );
    if let Err(e) = result {
        debug!(error = %e, "rejected interaction");
        return Err(e);
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(request).await)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
