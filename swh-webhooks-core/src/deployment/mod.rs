//! Deployment configuration of the Svix server.
//!
//! The Svix server is configured through `SVIX_*` environment variables,
//! shipped in `deploy/svix.env` and loaded by Docker Compose. This module
//! gives that file a typed model so it can be checked before deployment and
//! rendered back in a canonical form.

mod env_file;
mod values;

pub use values::{CacheType, LogFormat, LogLevel, QueueType, Subnet};

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const SVIX_LISTEN_ADDRESS: &str = "SVIX_LISTEN_ADDRESS";
pub const SVIX_JWT_SECRET: &str = "SVIX_JWT_SECRET";
pub const SVIX_MAIN_SECRET: &str = "SVIX_MAIN_SECRET";
pub const SVIX_LOG_LEVEL: &str = "SVIX_LOG_LEVEL";
pub const SVIX_LOG_FORMAT: &str = "SVIX_LOG_FORMAT";
pub const SVIX_DB_DSN: &str = "SVIX_DB_DSN";
pub const SVIX_REDIS_DSN: &str = "SVIX_REDIS_DSN";
pub const SVIX_QUEUE_TYPE: &str = "SVIX_QUEUE_TYPE";
pub const SVIX_CACHE_TYPE: &str = "SVIX_CACHE_TYPE";
pub const SVIX_RETRY_SCHEDULE: &str = "SVIX_RETRY_SCHEDULE";
pub const SVIX_ENDPOINT_HTTPS_ONLY: &str = "SVIX_ENDPOINT_HTTPS_ONLY";
pub const SVIX_WHITELIST_SUBNETS: &str = "SVIX_WHITELIST_SUBNETS";
pub const SVIX_WORKER_MAX_TASKS: &str = "SVIX_WORKER_MAX_TASKS";

/// Seconds between delivery attempts used by Svix when none is configured.
pub const DEFAULT_RETRY_SCHEDULE: [u64; 7] = [5, 300, 1800, 7200, 18000, 36000, 36000];

/// Port the Svix server listens on in the local topology.
pub const DEFAULT_PORT: u16 = 8071;

/// Errors found in a deployment environment file.
#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    #[error("{0} is required")]
    Missing(&'static str),

    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

fn invalid(var: &'static str, reason: impl Into<String>) -> DeploymentError {
    DeploymentError::Invalid {
        var,
        reason: reason.into(),
    }
}

/// Environment of the Svix server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvixServerEnv {
    pub listen_address: SocketAddr,
    /// Secret used to sign the API bearer tokens.
    pub jwt_secret: String,
    /// Key encrypting endpoint secrets at rest.
    pub main_secret: Option<String>,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    /// PostgreSQL connection string.
    pub db_dsn: Url,
    /// Redis connection string, needed by redis based queues and caches.
    pub redis_dsn: Option<Url>,
    pub queue_type: QueueType,
    pub cache_type: CacheType,
    /// Seconds to wait before each retry of a failed delivery.
    pub retry_schedule_secs: Vec<u64>,
    /// Refuse endpoints that are not served over HTTPS.
    pub endpoint_https_only: bool,
    /// Private subnets deliveries are allowed to reach.
    pub whitelist_subnets: Vec<Subnet>,
    /// Maximum number of concurrent delivery tasks per worker.
    pub worker_max_tasks: Option<u16>,
    /// Variables this model does not know, kept verbatim.
    pub extra: Vec<(String, String)>,
}

impl SvixServerEnv {
    /// Read and validate an environment file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DeploymentError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DeploymentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate environment file content.
    pub fn parse(content: &str) -> Result<Self, DeploymentError> {
        let mut vars = env_file::parse(content)?;
        let mut take = |key: &str| -> Option<String> {
            let index = vars.iter().rposition(|(k, _)| k == key)?;
            let value = vars.remove(index).1;
            vars.retain(|(k, _)| k != key);
            Some(value).filter(|v| !v.is_empty())
        };

        let listen_address = match take(SVIX_LISTEN_ADDRESS) {
            Some(addr) => addr
                .parse()
                .map_err(|_| invalid(SVIX_LISTEN_ADDRESS, format!("{addr:?} is not a socket address")))?,
            None => SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
        };
        let jwt_secret = take(SVIX_JWT_SECRET).ok_or(DeploymentError::Missing(SVIX_JWT_SECRET))?;
        let main_secret = take(SVIX_MAIN_SECRET);
        let log_level = parse_or_default(SVIX_LOG_LEVEL, take(SVIX_LOG_LEVEL))?;
        let log_format = parse_or_default(SVIX_LOG_FORMAT, take(SVIX_LOG_FORMAT))?;
        let queue_type: QueueType = parse_or_default(SVIX_QUEUE_TYPE, take(SVIX_QUEUE_TYPE))?;
        let cache_type: CacheType = parse_or_default(SVIX_CACHE_TYPE, take(SVIX_CACHE_TYPE))?;

        let db_dsn = take(SVIX_DB_DSN).ok_or(DeploymentError::Missing(SVIX_DB_DSN))?;
        let db_dsn = parse_dsn(SVIX_DB_DSN, &db_dsn, &["postgres", "postgresql"])?;

        let redis_dsn = take(SVIX_REDIS_DSN)
            .map(|dsn| parse_dsn(SVIX_REDIS_DSN, &dsn, &["redis", "rediss"]))
            .transpose()?;
        if redis_dsn.is_none() && (queue_type.needs_redis() || cache_type.needs_redis()) {
            return Err(invalid(
                SVIX_REDIS_DSN,
                format!("required by queue type {queue_type} and cache type {cache_type}"),
            ));
        }

        let retry_schedule_secs = match take(SVIX_RETRY_SCHEDULE) {
            Some(schedule) => parse_retry_schedule(&schedule)?,
            None => DEFAULT_RETRY_SCHEDULE.to_vec(),
        };
        let endpoint_https_only = match take(SVIX_ENDPOINT_HTTPS_ONLY) {
            Some(flag) => parse_bool(SVIX_ENDPOINT_HTTPS_ONLY, &flag)?,
            None => false,
        };
        let whitelist_subnets = match take(SVIX_WHITELIST_SUBNETS) {
            Some(list) => parse_subnets(&list)?,
            None => Vec::new(),
        };
        let worker_max_tasks = take(SVIX_WORKER_MAX_TASKS)
            .map(|n| match n.parse::<u16>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(invalid(SVIX_WORKER_MAX_TASKS, format!("{n:?} is not a positive integer"))),
            })
            .transpose()?;

        Ok(Self {
            listen_address,
            jwt_secret,
            main_secret,
            log_level,
            log_format,
            db_dsn,
            redis_dsn,
            queue_type,
            cache_type,
            retry_schedule_secs,
            endpoint_https_only,
            whitelist_subnets,
            worker_max_tasks,
            extra: vars,
        })
    }

    /// Delays between delivery attempts.
    pub fn retry_schedule(&self) -> Vec<Duration> {
        self.retry_schedule_secs
            .iter()
            .copied()
            .map(Duration::from_secs)
            .collect()
    }

    /// Time between the first attempt and the last retry.
    pub fn retry_window(&self) -> Duration {
        self.retry_schedule()
            .into_iter()
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    /// Number of delivery attempts, the first one included.
    pub fn max_attempts(&self) -> usize {
        self.retry_schedule_secs.len() + 1
    }

    /// Render the environment back in canonical order.
    pub fn render(&self) -> String {
        let mut vars: Vec<(&str, String)> = vec![
            (SVIX_LISTEN_ADDRESS, self.listen_address.to_string()),
            (SVIX_JWT_SECRET, self.jwt_secret.clone()),
        ];
        if let Some(secret) = &self.main_secret {
            vars.push((SVIX_MAIN_SECRET, secret.clone()));
        }
        vars.push((SVIX_LOG_LEVEL, self.log_level.to_string()));
        vars.push((SVIX_LOG_FORMAT, self.log_format.to_string()));
        vars.push((SVIX_DB_DSN, self.db_dsn.to_string()));
        if let Some(dsn) = &self.redis_dsn {
            vars.push((SVIX_REDIS_DSN, dsn.to_string()));
        }
        vars.push((SVIX_QUEUE_TYPE, self.queue_type.to_string()));
        vars.push((SVIX_CACHE_TYPE, self.cache_type.to_string()));
        vars.push((
            SVIX_RETRY_SCHEDULE,
            self.retry_schedule_secs
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(","),
        ));
        vars.push((SVIX_ENDPOINT_HTTPS_ONLY, self.endpoint_https_only.to_string()));
        if !self.whitelist_subnets.is_empty() {
            let subnets: Vec<String> = self.whitelist_subnets.iter().map(Subnet::to_string).collect();
            vars.push((SVIX_WHITELIST_SUBNETS, format!("[{}]", subnets.join(","))));
        }
        if let Some(n) = self.worker_max_tasks {
            vars.push((SVIX_WORKER_MAX_TASKS, n.to_string()));
        }

        let mut out = String::new();
        for (key, value) in vars
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        {
            out.push_str(key);
            out.push('=');
            out.push_str(&env_file::quote(value));
            out.push('\n');
        }
        out
    }
}

fn parse_or_default<T>(var: &'static str, value: Option<String>) -> Result<T, DeploymentError>
where
    T: std::str::FromStr<Err = String> + Default,
{
    match value {
        Some(v) => v.parse().map_err(|e| invalid(var, e)),
        None => Ok(T::default()),
    }
}

fn parse_dsn(var: &'static str, dsn: &str, schemes: &[&str]) -> Result<Url, DeploymentError> {
    let url = Url::parse(dsn).map_err(|e| invalid(var, e.to_string()))?;
    if !schemes.contains(&url.scheme()) {
        return Err(invalid(
            var,
            format!("scheme {:?} is not one of {}", url.scheme(), schemes.join(", ")),
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid(var, "missing host"));
    }
    Ok(url)
}

fn parse_retry_schedule(schedule: &str) -> Result<Vec<u64>, DeploymentError> {
    let delays = schedule
        .split(',')
        .map(str::trim)
        .map(|s| match s.parse::<u64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(invalid(
                SVIX_RETRY_SCHEDULE,
                format!("{s:?} is not a positive number of seconds"),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let total = delays.iter().try_fold(0u64, |total, delay| total.checked_add(*delay));
    if total.is_none() {
        return Err(invalid(SVIX_RETRY_SCHEDULE, "total retry time overflows"));
    }
    Ok(delays)
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, DeploymentError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(invalid(var, format!("{other:?} is not a boolean"))),
    }
}

fn parse_subnets(list: &str) -> Result<Vec<Subnet>, DeploymentError> {
    let inner = list.trim();
    let inner = inner
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(inner);
    inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().map_err(|e| invalid(SVIX_WHITELIST_SUBNETS, e)))
        .collect()
}
