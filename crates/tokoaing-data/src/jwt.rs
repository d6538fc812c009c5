use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::Sha256;

use crate::error::AuthError;

/// Minimal HS256 JWT utilities for the admin session token.
///
/// - Only supports JSON objects for header/payload.
/// - Uses base64url encoding WITHOUT padding.
/// - Performs signature verification using `Hmac::verify_slice`.
///
/// Expiry (`exp`) is a claim like any other; `admin::AdminSessions` is the
/// caller that validates it.

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

fn bad_token(msg: impl Into<String>) -> AuthError {
    AuthError::InvalidToken(msg.into())
}

fn b64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn b64url_decode(s: &str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_NO_PAD
        .decode(s.as_bytes())
        .map_err(|e| bad_token(format!("invalid base64url: {e}")))
}

/// Encode claims as an HS256-signed JWT.
pub fn encode_hs256<T: Serialize>(secret: &[u8], claims: &T) -> Result<String, AuthError> {
    let header = JwtHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };

    let header_json = serde_json::to_vec(&header)
        .map_err(|e| bad_token(format!("failed to serialize header: {e}")))?;
    let claims_json = serde_json::to_vec(claims)
        .map_err(|e| bad_token(format!("failed to serialize claims: {e}")))?;

    let header_b64 = b64url_encode(&header_json);
    let claims_b64 = b64url_encode(&claims_json);
    let signing_input = format!("{header_b64}.{claims_b64}");

    let mut mac = Hmac::<Sha256>::new_from_slice(secret)
        .map_err(|e| AuthError::Config(format!("invalid HMAC key: {e}")))?;
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();
    let sig_b64 = b64url_encode(&signature);

    Ok(format!("{signing_input}.{sig_b64}"))
}

/// Decode an HS256 JWT and verify its signature.
///
/// Does not validate `iss`, `exp`, or `nbf`; callers must do that.
pub fn decode_hs256<T: DeserializeOwned>(secret: &[u8], token: &str) -> Result<T, AuthError> {
    let token = token.replace(char::is_whitespace, "");
    let mut parts = token.split('.');
    let Some(header_b64) = parts.next() else {
        return Err(bad_token("missing header segment"));
    };
    let Some(payload_b64) = parts.next() else {
        return Err(bad_token("missing payload segment"));
    };
    let Some(sig_b64) = parts.next() else {
        return Err(bad_token("missing signature segment"));
    };
    if parts.next().is_some() {
        return Err(bad_token("too many segments"));
    }

    // Parse header to ensure alg/typ are what we expect.
    let header_raw = b64url_decode(header_b64)?;
    let header: JwtHeader = serde_json::from_slice(&header_raw)
        .map_err(|e| bad_token(format!("invalid header JSON: {e}")))?;
    if header.alg != "HS256" || header.typ.to_ascii_uppercase() != "JWT" {
        return Err(bad_token("unsupported header"));
    }

    // Verify signature.
    let signing_input = format!("{header_b64}.{payload_b64}");
    let sig = b64url_decode(sig_b64)?;

    let mut mac = Hmac::<Sha256>::new_from_slice(secret)
        .map_err(|e| AuthError::Config(format!("invalid HMAC key: {e}")))?;
    mac.update(signing_input.as_bytes());
    mac.verify_slice(&sig)
        .map_err(|_| bad_token("signature mismatch"))?;

    // Parse payload.
    let payload_raw = b64url_decode(payload_b64)?;
    let claims: T = serde_json::from_slice(&payload_raw)
        .map_err(|e| bad_token(format!("invalid payload JSON: {e}")))?;

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Claims {
        sub: String,
        exp: i64,
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let claims = Claims {
            sub: "admin".to_string(),
            exp: 1_900_000_000,
        };
        let token = encode_hs256(b"secret", &claims).unwrap();
        let back: Claims = decode_hs256(b"secret", &token).unwrap();
        assert_eq!(back, claims);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = Claims {
            sub: "admin".to_string(),
            exp: 1_900_000_000,
        };
        let token = encode_hs256(b"secret", &claims).unwrap();
        assert!(decode_hs256::<Claims>(b"other", &token).is_err());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let claims = Claims {
            sub: "admin".to_string(),
            exp: 1_900_000_000,
        };
        let token = encode_hs256(b"secret", &claims).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(br#"{"sub":"root","exp":1900000000}"#);
        parts[1] = &forged;
        let forged_token = parts.join(".");
        assert!(decode_hs256::<Claims>(b"secret", &forged_token).is_err());
    }
}
