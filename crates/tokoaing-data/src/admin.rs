use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::{crypto, env, jwt, util};

/// OWASP-recommended floor for PBKDF2-HMAC-SHA256.
pub const DEFAULT_ITERATIONS: u32 = 600_000;
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

const TOKEN_SUBJECT: &str = "admin";

/// Admin-session configuration.
///
/// The admin password itself is never stored or shipped anywhere; only its
/// PBKDF2 hash and salt are configured, and validation happens inside the
/// service.
#[derive(Clone)]
pub struct AdminConfig {
    pub password_hash: Vec<u8>,
    pub password_salt: Vec<u8>,
    pub iterations: u32,
    pub token_secret: Vec<u8>,
    pub token_ttl_secs: i64,
}

impl AdminConfig {
    /// Read the configuration from the environment.
    ///
    /// Required: `ADMIN_PASSWORD_HASH`, `ADMIN_PASSWORD_SALT`,
    /// `ADMIN_TOKEN_SECRET` (all hex). Optional:
    /// `ADMIN_PBKDF2_ITERATIONS`, `ADMIN_TOKEN_TTL_SECS`.
    pub fn from_env() -> Result<Self, AuthError> {
        let password_hash = required_hex("ADMIN_PASSWORD_HASH")?;
        let password_salt = required_hex("ADMIN_PASSWORD_SALT")?;
        let token_secret = required_hex("ADMIN_TOKEN_SECRET")?;

        let iterations = match env::env_string("ADMIN_PBKDF2_ITERATIONS") {
            None => DEFAULT_ITERATIONS,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| config_err("ADMIN_PBKDF2_ITERATIONS", "a positive integer"))?,
        };
        let token_ttl_secs = match env::env_string("ADMIN_TOKEN_TTL_SECS") {
            None => DEFAULT_TOKEN_TTL_SECS,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| config_err("ADMIN_TOKEN_TTL_SECS", "a positive integer"))?,
        };

        Ok(Self {
            password_hash,
            password_salt,
            iterations,
            token_secret,
            token_ttl_secs,
        })
    }

    /// Derive a fresh configuration for `password` with random salt and
    /// signing secret. Setup tooling prints `env_values` from this.
    pub fn generate(password: &str) -> Self {
        Self::generate_with(password, DEFAULT_ITERATIONS, DEFAULT_TOKEN_TTL_SECS)
    }

    pub fn generate_with(password: &str, iterations: u32, token_ttl_secs: i64) -> Self {
        let password_salt = util::random_bytes(16);
        let password_hash = crypto::hash_password(password.as_bytes(), &password_salt, iterations);
        Self {
            password_hash,
            password_salt,
            iterations,
            token_secret: util::random_bytes(32),
            token_ttl_secs,
        }
    }

    /// The environment entries `from_env` expects, ready for a deployment's
    /// secret store.
    pub fn env_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ADMIN_PASSWORD_HASH", util::hex_encode(&self.password_hash)),
            ("ADMIN_PASSWORD_SALT", util::hex_encode(&self.password_salt)),
            ("ADMIN_TOKEN_SECRET", util::hex_encode(&self.token_secret)),
            ("ADMIN_PBKDF2_ITERATIONS", self.iterations.to_string()),
            ("ADMIN_TOKEN_TTL_SECS", self.token_ttl_secs.to_string()),
        ]
    }
}

fn required_hex(key: &str) -> Result<Vec<u8>, AuthError> {
    let raw = env::env_string(key).ok_or_else(|| AuthError::Config(format!("{key} is not set")))?;
    util::hex_decode(&raw).ok_or_else(|| config_err(key, "hex"))
}

fn config_err(key: &str, expected: &str) -> AuthError {
    AuthError::Config(format!("{key} must be {expected}"))
}

/// Claims carried by an admin session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    /// Issued at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

/// Issues and validates short-lived admin session tokens.
///
/// Admin-only operations take a verified session from here instead of a
/// client-side flag.
pub struct AdminSessions {
    config: AdminConfig,
}

impl AdminSessions {
    pub fn new(config: AdminConfig) -> Self {
        Self { config }
    }

    /// Exchange the admin password for a session token.
    pub fn login(&self, password: &str) -> Result<String, AuthError> {
        let ok = crypto::verify_password_hash(
            password.as_bytes(),
            &self.config.password_salt,
            &self.config.password_hash,
            self.config.iterations,
        );
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now().timestamp();
        let claims = AdminClaims {
            sub: TOKEN_SUBJECT.to_string(),
            iat: now,
            exp: now + self.config.token_ttl_secs,
        };
        jwt::encode_hs256(&self.config.token_secret, &claims)
    }

    /// Validate a presented session token: signature, subject, expiry.
    pub fn verify(&self, token: &str) -> Result<AdminClaims, AuthError> {
        let claims: AdminClaims = jwt::decode_hs256(&self.config.token_secret, token)?;
        if claims.sub != TOKEN_SUBJECT {
            return Err(AuthError::InvalidToken("unexpected subject".to_string()));
        }
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }
}
