//! HTTP transport for the RouterOS REST API.
//!
//! RouterOS 7.1+ serves `/rest` over the `www` and `www-ssl` services with
//! HTTP Basic authentication on every request.

use crate::backend::{Request, Response, Transport};
use crate::error::Result;
use crate::types::{ConnectionConfig, Method};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use ureq::tls::TlsConfig;

/// HTTP(S) transport backed by a blocking `ureq` agent.
pub struct HttpTransport {
    agent: ureq::Agent,
    config: ConnectionConfig,
    authorization: String,
}

impl HttpTransport {
    /// Create a transport for the given router.
    #[must_use]
    pub fn new(config: ConnectionConfig) -> Self {
        let mut builder = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false);

        if !config.verify_tls {
            builder = builder.tls_config(TlsConfig::builder().disable_verification(true).build());
        }

        let agent = ureq::Agent::new_with_config(builder.build());
        let authorization = basic_auth(&config.username, &config.password);

        Self {
            agent,
            config,
            authorization,
        }
    }

    /// The router this transport talks to.
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        let url = self.config.endpoint(&request.path);
        let auth = self.authorization.as_str();

        let mut response = match request.method {
            Method::Get => {
                let mut builder = self.agent.get(&url).header("Authorization", auth);
                for (key, value) in &request.query {
                    builder = builder.query(key, value);
                }
                builder.call()?
            }
            Method::Delete => self.agent.delete(&url).header("Authorization", auth).call()?,
            Method::Put | Method::Patch => {
                let builder = if request.method == Method::Put {
                    self.agent.put(&url)
                } else {
                    self.agent.patch(&url)
                };
                let body = request
                    .body
                    .clone()
                    .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
                builder.header("Authorization", auth).send_json(&body)?
            }
        };

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        Ok(Response { status, body })
    }
}

fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth() {
        // admin:secret
        assert_eq!(basic_auth("admin", "secret"), "Basic YWRtaW46c2VjcmV0");
        assert_eq!(basic_auth("admin", ""), "Basic YWRtaW46");
    }

    #[test]
    fn test_new_keeps_config() {
        let config = ConnectionConfig::new("https://192.168.88.1", "admin", "");
        let transport = HttpTransport::new(config.clone());
        assert_eq!(transport.config(), &config);
    }
}
