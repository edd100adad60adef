use crate::error::{BadEnvVarSnafu, ParseFlagSnafu, ParseSecondsSnafu, RegistrarResult};
use dotenvy::var;
use snafu::ResultExt;
use std::{env::VarError, sync::Arc, time::Duration};

const DEFAULT_SERVER_IP: &str = "127.0.0.1:3000";
const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    server_ip: Arc<str>,
    api_config: Arc<ApiConfig>,
}

impl RuntimeConfiguration {
    pub fn new() -> RegistrarResult<Self> {
        let server_ip = optional_env_var("REGISTRAR_SERVER_IP")?
            .unwrap_or_else(|| DEFAULT_SERVER_IP.to_string());
        Ok(Self::with_api(server_ip, ApiConfig::new()?))
    }

    pub fn with_api(server_ip: impl Into<Arc<str>>, api_config: ApiConfig) -> Self {
        Self {
            server_ip: server_ip.into(),
            api_config: Arc::new(api_config),
        }
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }

    pub fn api_config(&self) -> Arc<ApiConfig> {
        self.api_config.clone()
    }
}

/// Where the student collection lives, and how the `/api` proxy in front of it behaves.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
    permissive_cors: bool,
    request_timeout: Duration,
}

impl ApiConfig {
    pub fn new() -> RegistrarResult<Self> {
        let base_url =
            optional_env_var("STUDENTS_API_URL")?.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let permissive_cors = match optional_env_var("REGISTRAR_PROXY_CORS")? {
            Some(flag) => flag.trim().parse().context(ParseFlagSnafu {
                name: "REGISTRAR_PROXY_CORS",
            })?,
            None => false,
        };

        let request_timeout = match optional_env_var("STUDENTS_API_TIMEOUT_SECS")? {
            Some(secs) => Duration::from_secs(secs.trim().parse::<u64>().context(ParseSecondsSnafu {
                name: "STUDENTS_API_TIMEOUT_SECS",
            })?),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self::from_parts(&base_url, permissive_cors).with_request_timeout(request_timeout))
    }

    pub fn from_parts(base_url: &str, permissive_cors: bool) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            permissive_cors,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn students_url(&self) -> String {
        format!("{}/api/students", self.base_url)
    }

    pub const fn permissive_cors(&self) -> bool {
        self.permissive_cors
    }

    /// Upper bound on any single call to the student API, connect to last body byte.
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

fn optional_env_var(name: &'static str) -> RegistrarResult<Option<String>> {
    match var(name) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
        Err(source) => Err(source).context(BadEnvVarSnafu { name }),
    }
}
