// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
// Kafka REST Bus Adapter
//
// Publishes entity events to Kafka through a REST proxy (v2 JSON embedded
// format). One HTTP request per record; the record key is the entity id so
// all events for one entity land on the same partition.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::domain::bus::{BusError, MessageBus};

pub const KAFKA_JSON_CONTENT_TYPE: &str = "application/vnd.kafka.json.v2+json";

pub struct KafkaRestBus {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct ProduceRequest<'a> {
    records: Vec<ProduceRecord<'a>>,
}

#[derive(Serialize)]
struct ProduceRecord<'a> {
    key: &'a str,
    value: Value,
}

impl KafkaRestBus {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, BusError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BusError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn topic_url(&self, topic: &str) -> String {
        format!("{}/topics/{}", self.endpoint, topic)
    }
}

/// Builds the proxy request body. Payloads that are not JSON are sent as a
/// JSON string.
fn encode_record(key: &str, payload: &[u8]) -> Result<Vec<u8>, BusError> {
    let value = serde_json::from_slice::<Value>(payload)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(payload).into_owned()));

    serde_json::to_vec(&ProduceRequest {
        records: vec![ProduceRecord { key, value }],
    })
    .map_err(|e| BusError::Transport(format!("Failed to encode record: {}", e)))
}

#[async_trait]
impl MessageBus for KafkaRestBus {
    async fn publish(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<(), BusError> {
        let body = encode_record(key, &payload)?;
        let url = self.topic_url(topic);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", KAFKA_JSON_CONTENT_TYPE)
            .header("Accept", "application/vnd.kafka.v2+json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BusError::Timeout
                } else {
                    BusError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BusError::Rejected { status, body });
        }

        debug!(topic, key, "Record accepted by Kafka REST proxy");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_url_trims_trailing_slash() {
        let bus = KafkaRestBus::new("http://proxy:8082/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            bus.topic_url("lead-created"),
            "http://proxy:8082/topics/lead-created"
        );
    }

    #[test]
    fn test_record_embeds_json_payload() {
        let body = encode_record("42", br#"{"id":42}"#).unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["records"][0]["key"], "42");
        assert_eq!(value["records"][0]["value"]["id"], 42);
    }

    #[test]
    fn test_record_wraps_non_json_payload() {
        let body = encode_record("1", b"plain").unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["records"][0]["value"], "plain");
    }
}
