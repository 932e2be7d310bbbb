//! Process configuration, read once from the environment at startup.
//!
//! | Variable            | Required | Default                                |
//! |---------------------|----------|----------------------------------------|
//! | `HMAC_SECRET`       | yes      |                                        |
//! | `SUPABASE_URL`      | yes      |                                        |
//! | `SUPABASE_KEY`      | yes      |                                        |
//! | `SCAN_BASE_URL`     | no       | `https://greenfieldscanwin.vercel.app` |
//! | `QR_BUCKET`         | no       | `qr-codes2`                            |
//! | `QR_TABLE`          | no       | `qr_codes`                             |
//! | `QR_OUTPUT_DIR`     | no       | `generated_qrs`                        |
//! | `HTTP_TIMEOUT_SECS` | no       | `30`                                   |
//!
//! Any error here is fatal and is raised before the input file is opened.

use crate::error::{GeneratorError, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SCAN_BASE_URL: &str = "https://greenfieldscanwin.vercel.app";
pub const DEFAULT_BUCKET: &str = "qr-codes2";
pub const DEFAULT_TABLE: &str = "qr_codes";
pub const DEFAULT_OUTPUT_DIR: &str = "generated_qrs";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// A credential read from the environment. Its `Debug` output is redacted.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    /// Returns `None` for an empty or whitespace-only value.
    pub fn new(value: String) -> Option<Self> {
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub hmac_secret: Secret,
    pub supabase_url: String,
    pub supabase_key: Secret,
    pub scan_base_url: String,
    pub bucket: String,
    pub table: String,
    pub output_dir: PathBuf,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let hmac_secret = required_secret(&lookup, "HMAC_SECRET")?;
        let supabase_url = lookup("SUPABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| missing("SUPABASE_URL"))?;
        let supabase_key = required_secret(&lookup, "SUPABASE_KEY")?;

        let table = optional(&lookup, "QR_TABLE", DEFAULT_TABLE);
        if !is_valid_identifier(&table) {
            return Err(GeneratorError::Config(format!(
                "QR_TABLE must contain only letters, digits and '_', got {table:?}"
            )));
        }

        let bucket = optional(&lookup, "QR_BUCKET", DEFAULT_BUCKET);
        if !is_valid_bucket_name(&bucket) {
            return Err(GeneratorError::Config(format!(
                "QR_BUCKET must contain only letters, digits, '_' and '-', got {bucket:?}"
            )));
        }

        let http_timeout = match lookup("HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    GeneratorError::Config(format!(
                        "HTTP_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}"
                    ))
                })?;
                if secs == 0 {
                    return Err(GeneratorError::Config(
                        "HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            hmac_secret,
            supabase_url,
            supabase_key,
            scan_base_url: optional(&lookup, "SCAN_BASE_URL", DEFAULT_SCAN_BASE_URL),
            bucket,
            table,
            output_dir: PathBuf::from(optional(&lookup, "QR_OUTPUT_DIR", DEFAULT_OUTPUT_DIR)),
            http_timeout,
        })
    }
}

fn missing(name: &str) -> GeneratorError {
    GeneratorError::Config(format!("{name} is not set"))
}

fn required_secret<F>(lookup: &F, name: &str) -> Result<Secret>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).and_then(Secret::new).ok_or_else(|| missing(name))
}

fn optional<F>(lookup: &F, name: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Table names are spliced into SQL and URLs, so only plain identifiers pass.
pub(crate) fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Bucket names become a URL path segment; `-` is allowed on top of identifiers.
fn is_valid_bucket_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const BASE: [(&str, &str); 3] = [
        ("HMAC_SECRET", "s3cret"),
        ("SUPABASE_URL", "https://project.supabase.co"),
        ("SUPABASE_KEY", "service-key"),
    ];

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&BASE)).unwrap();
        assert_eq!(config.scan_base_url, DEFAULT_SCAN_BASE_URL);
        assert_eq!(config.bucket, "qr-codes2");
        assert_eq!(config.table, "qr_codes");
        assert_eq!(config.output_dir, PathBuf::from("generated_qrs"));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_hmac_secret_is_fatal() {
        let err = Config::from_lookup(lookup(&BASE[1..])).unwrap_err();
        assert!(matches!(err, GeneratorError::Config(ref m) if m.contains("HMAC_SECRET")));
    }

    #[test]
    fn blank_hmac_secret_is_fatal() {
        let err = Config::from_lookup(lookup(&[
            ("HMAC_SECRET", "   "),
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_KEY", "service-key"),
        ]))
        .unwrap_err();
        assert!(matches!(err, GeneratorError::Config(_)));
    }

    #[test]
    fn missing_store_credentials_are_fatal() {
        let err = Config::from_lookup(lookup(&BASE[..2])).unwrap_err();
        assert!(matches!(err, GeneratorError::Config(ref m) if m.contains("SUPABASE_KEY")));
        let err = Config::from_lookup(lookup(&[BASE[0], BASE[2]])).unwrap_err();
        assert!(matches!(err, GeneratorError::Config(ref m) if m.contains("SUPABASE_URL")));
    }

    #[test]
    fn overrides_are_read() {
        let mut vars = BASE.to_vec();
        vars.extend([
            ("SCAN_BASE_URL", "https://scan.example.com"),
            ("QR_BUCKET", "codes"),
            ("QR_TABLE", "codes_v2"),
            ("QR_OUTPUT_DIR", "out"),
            ("HTTP_TIMEOUT_SECS", "5"),
        ]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.scan_base_url, "https://scan.example.com");
        assert_eq!(config.bucket, "codes");
        assert_eq!(config.table, "codes_v2");
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_timeout_and_table_are_rejected() {
        let mut vars = BASE.to_vec();
        vars.push(("HTTP_TIMEOUT_SECS", "soon"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());

        let mut vars = BASE.to_vec();
        vars.push(("QR_TABLE", "qr_codes; drop table x"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn bucket_must_be_a_single_path_segment() {
        for bad in ["qr/../other", "qr codes", "qr?x=1", "qr%2Fx"] {
            let mut vars = BASE.to_vec();
            vars.push(("QR_BUCKET", bad));
            let err = Config::from_lookup(lookup(&vars)).unwrap_err();
            assert!(
                matches!(err, GeneratorError::Config(ref m) if m.contains("QR_BUCKET")),
                "{bad}"
            );
        }

        let mut vars = BASE.to_vec();
        vars.push(("QR_BUCKET", "qr-codes_3"));
        assert_eq!(Config::from_lookup(lookup(&vars)).unwrap().bucket, "qr-codes_3");
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let config = Config::from_lookup(lookup(&BASE)).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("service-key"));
    }
}
