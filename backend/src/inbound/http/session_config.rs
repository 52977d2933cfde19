//! Session cookie settings read from the environment.
//!
//! Debug builds fall back to defaults with a warning when a variable is
//! missing or malformed. Release builds refuse to start instead.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use zeroize::Zeroizing;

pub const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
pub const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
pub const SAMESITE_ENV: &str = "SESSION_SAMESITE";
pub const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

const DEFAULT_KEY_PATH: &str = "/var/run/secrets/session_key";
/// Minimum key file length accepted by release builds.
pub const MIN_KEY_LEN: usize = 64;
/// Shortest master key `Key::derive_from` accepts.
const DERIVE_MIN_LEN: usize = 32;
const FINGERPRINT_BYTES: usize = 8;
const BOOL_VALUES: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_VALUES: &str = "Strict|Lax|None";

/// How strictly session variables are validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// Mode matching the current compilation profile.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn default_same_site(self) -> SameSite {
        match self {
            Self::Debug => SameSite::Lax,
            Self::Release => SameSite::Strict,
        }
    }
}

/// Validated cookie session settings.
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
    /// Truncated SHA-256 of the signing key, safe to log.
    pub key_fingerprint: String,
}

#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("{name} must be set")]
    MissingEnv { name: &'static str },
    #[error("{name}='{value}' is invalid; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("cannot read session key {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key {path} has {length} bytes; at least {min_len} required")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SESSION_SAMESITE=None needs SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL cannot be enabled in release builds")]
    EphemeralNotAllowed,
}

struct Lookup<'a, E> {
    env: &'a E,
    mode: BuildMode,
}

impl<E: Env> Lookup<'_, E> {
    /// Return `default` in debug builds, fail in release builds.
    fn tolerate<T>(&self, default: T, error: SessionConfigError) -> Result<T, SessionConfigError> {
        match self.mode {
            BuildMode::Debug => {
                warn!(%error, "session setting falls back to its default");
                Ok(default)
            }
            BuildMode::Release => Err(error),
        }
    }

    fn read<T>(
        &self,
        name: &'static str,
        expected: &'static str,
        default: T,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T, SessionConfigError> {
        match self.env.string(name) {
            None => self.tolerate(default, SessionConfigError::MissingEnv { name }),
            Some(value) => match parse(&value) {
                Some(parsed) => Ok(parsed),
                None => self.tolerate(
                    default,
                    SessionConfigError::InvalidEnv {
                        name,
                        value,
                        expected,
                    },
                ),
            },
        }
    }
}

/// Read and validate every session variable.
///
/// # Examples
///
/// ```rust
/// use finlead::inbound::http::session_config::{BuildMode, session_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
/// let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let lookup = Lookup { env, mode };
    let cookie_secure = lookup.read(COOKIE_SECURE_ENV, BOOL_VALUES, true, parse_bool)?;
    let same_site = lookup.read(
        SAMESITE_ENV,
        SAMESITE_VALUES,
        mode.default_same_site(),
        parse_same_site,
    )?;
    if same_site == SameSite::None && !cookie_secure {
        lookup.tolerate((), SessionConfigError::InsecureSameSiteNone)?;
    }
    let allow_ephemeral = lookup.read(ALLOW_EPHEMERAL_ENV, BOOL_VALUES, false, parse_bool)?;
    if allow_ephemeral && mode == BuildMode::Release {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }

    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| DEFAULT_KEY_PATH.to_owned()),
    );
    let key = load_key(path, mode, allow_ephemeral)?;
    let key_fingerprint = fingerprint(&key);
    info!(fingerprint = %key_fingerprint, "session key loaded");

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
        key_fingerprint,
    })
}

fn load_key(
    path: PathBuf,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    match std::fs::read(&path) {
        Ok(bytes) => {
            let bytes = Zeroizing::new(bytes);
            let min_len = match mode {
                BuildMode::Release => MIN_KEY_LEN,
                BuildMode::Debug => DERIVE_MIN_LEN,
            };
            if bytes.len() < min_len {
                return Err(SessionConfigError::KeyTooShort {
                    length: bytes.len(),
                    path,
                    min_len,
                });
            }
            Ok(Key::derive_from(&bytes))
        }
        Err(source) if mode == BuildMode::Debug || allow_ephemeral => {
            warn!(path = %path.display(), error = %source, "generating an ephemeral session key");
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}

/// First eight bytes of the SHA-256 of the signing key, hex encoded.
#[must_use]
pub fn fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}
