use crate::error::FetchError;
use chrono::{DateTime, Local, NaiveDateTime};
use log::{info, trace};
use serde_json::Value;
use std::time::Duration;
use ureq::{Agent, AgentBuilder};

/// Blocking HTTP client for JSON documents
#[derive(Debug)]
pub struct HttpClient {
    agent: Agent,
}

impl HttpClient {
    const TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new() -> Self {
        Self {
            agent: AgentBuilder::new()
                .timeout(Self::TIMEOUT)
                .user_agent("matrixclock")
                .build(),
        }
    }

    /// GET a JSON document. Query params are percent-encoded by ureq.
    pub fn fetch_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, FetchError> {
        trace!("Fetching {url}");
        let request = query
            .iter()
            .fold(self.agent.get(url), |request, (param, value)| {
                request.query(param, value)
            });
        let response = request
            .call()
            .map_err(|err| FetchError::transport(url, err))?;
        response.into_json().map_err(|err| {
            FetchError::decode(format!("response from {url}"), err)
        })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Wall clock corrected against a network time source. The system clock keeps
/// ticking between syncs; we just track how far off it was at the last one.
#[derive(Debug, Default)]
pub struct NetworkClock {
    offset: chrono::Duration,
}

impl NetworkClock {
    /// Update the offset from a time service response. The response needs a
    /// `datetime` field in RFC 3339 format, with the local UTC offset.
    pub fn sync(&mut self, document: &Value) -> Result<(), FetchError> {
        self.sync_at(document, Local::now().naive_local())
    }

    fn sync_at(
        &mut self,
        document: &Value,
        system_now: NaiveDateTime,
    ) -> Result<(), FetchError> {
        let datetime = document
            .get("datetime")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                FetchError::decode("time response", "missing `datetime`")
            })?;
        let remote = DateTime::parse_from_rfc3339(datetime)
            .map_err(|err| FetchError::decode("time response", err))?;
        self.offset = remote.naive_local() - system_now;
        info!(
            "Synchronized clock to {remote}, offset {}ms",
            self.offset.num_milliseconds()
        );
        Ok(())
    }

    /// Current corrected local time
    pub fn now(&self) -> NaiveDateTime {
        self.corrected(Local::now().naive_local())
    }

    fn corrected(&self, system_now: NaiveDateTime) -> NaiveDateTime {
        system_now + self.offset
    }
}
