//! Grading service client
//!
//! The service takes the server address and a script number as query
//! parameters, runs the script against that server and answers with an
//! HTML report once the script is done.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::common::{Error, Result};
use crate::sequence::ScriptId;

/// Parameters of a single script invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptRequest {
    /// Address of the server under test
    pub ip: String,
    /// Port of the server under test
    pub port: u16,
    pub script: ScriptId,
}

impl ScriptRequest {
    /// Query string parameters, in the order the service documents them
    pub fn query(&self) -> [(&'static str, String); 3] {
        [
            ("DSIP", self.ip.clone()),
            ("DSPORT", self.port.to_string()),
            ("SCRIPT", self.script.to_string()),
        ]
    }
}

/// Something that can run a script remotely and hand back the report body
#[async_trait]
pub trait GraderClient: Send + Sync {
    async fn run_script(&self, request: &ScriptRequest) -> Result<String>;
}

/// [`GraderClient`] talking HTTP to the real service
#[derive(Debug, Clone)]
pub struct HttpGrader {
    client: reqwest::Client,
    url: String,
}

impl HttpGrader {
    /// Build a client for `url`. Without a timeout a request waits for as
    /// long as the script takes.
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent("grader-cli");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl GraderClient for HttpGrader {
    async fn run_script(&self, request: &ScriptRequest) -> Result<String> {
        let script = request.script.get();
        tracing::debug!(url = %self.url, ?request, "requesting script");

        let response = self
            .client
            .get(&self.url)
            .query(&request.query())
            .send()
            .await
            .map_err(|source| Error::Request { script, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                script,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| Error::Request { script, source })?;
        tracing::debug!(script, bytes = body.len(), "received report");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parameters() {
        let request = ScriptRequest {
            ip: "193.136.128.103".to_string(),
            port: 58018,
            script: ScriptId::new(6).unwrap(),
        };
        assert_eq!(
            request.query(),
            [
                ("DSIP", "193.136.128.103".to_string()),
                ("DSPORT", "58018".to_string()),
                ("SCRIPT", "6".to_string()),
            ]
        );
    }

    #[test]
    fn test_http_grader_builds() {
        let grader = HttpGrader::new("http://localhost:59000/index.html", None).unwrap();
        assert_eq!(grader.url(), "http://localhost:59000/index.html");

        let grader = HttpGrader::new(
            "http://localhost:59000/index.html",
            Some(Duration::from_secs(5)),
        );
        assert!(grader.is_ok());
    }
}
