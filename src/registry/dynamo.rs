use super::ConnectionRegistry;
use crate::error::{FanoutError, Result};
use crate::models::ConnectionId;
use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Partition key of the connections table
pub const CONNECTION_ID_ATTR: &str = "connectionId";

/// DynamoDB-backed registry, one row per connection keyed by `connectionId`.
#[derive(Clone)]
pub struct DynamoConnectionRegistry {
    client: Arc<Client>,
    table_name: String,
}

impl DynamoConnectionRegistry {
    pub fn new(client: Arc<Client>, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl ConnectionRegistry for DynamoConnectionRegistry {
    async fn list_all(&self) -> Result<Vec<ConnectionId>> {
        let mut connection_ids = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;
        let mut pages = 0usize;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .projection_expression("#cid")
                .expression_attribute_names("#cid", CONNECTION_ID_ATTR)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| FanoutError::RegistryList(DisplayErrorContext(&e).to_string()))?;
            pages += 1;

            connection_ids.extend(output.items().iter().filter_map(connection_id_of));

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        debug!(
            table = %self.table_name,
            pages,
            count = connection_ids.len(),
            "Scanned connections table"
        );

        Ok(connection_ids)
    }

    async fn remove(&self, connection_id: &ConnectionId) -> Result<()> {
        // DeleteItem on a missing key is a successful no-op
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(
                CONNECTION_ID_ATTR,
                AttributeValue::S(connection_id.as_str().to_string()),
            )
            .send()
            .await
            .map_err(|e| FanoutError::RegistryRemove {
                connection_id: connection_id.to_string(),
                detail: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }
}

fn connection_id_of(item: &HashMap<String, AttributeValue>) -> Option<ConnectionId> {
    match item.get(CONNECTION_ID_ATTR) {
        Some(AttributeValue::S(id)) => Some(ConnectionId::new(id.clone())),
        other => {
            warn!(attribute = ?other, "Skipping connection row without a string connectionId");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::config::retry::RetryConfig;
    use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
    use aws_smithy_runtime::client::http::test_util::{ReplayEvent, StaticReplayClient};
    use aws_smithy_runtime_api::client::orchestrator::{HttpRequest, HttpResponse};
    use aws_smithy_runtime_api::http::StatusCode;
    use aws_smithy_types::body::SdkBody;

    #[test]
    fn test_connection_id_of_string_attribute() {
        let mut item = HashMap::new();
        item.insert(
            CONNECTION_ID_ATTR.to_string(),
            AttributeValue::S("abc=".to_string()),
        );
        assert_eq!(connection_id_of(&item), Some(ConnectionId::from("abc=")));
    }

    #[test]
    fn test_connection_id_of_skips_malformed_rows() {
        let mut numeric = HashMap::new();
        numeric.insert(
            CONNECTION_ID_ATTR.to_string(),
            AttributeValue::N("42".to_string()),
        );
        assert_eq!(connection_id_of(&numeric), None);
        assert_eq!(connection_id_of(&HashMap::new()), None);
    }

    fn dynamo_response(status: u16, body: &str) -> ReplayEvent {
        let mut response = HttpResponse::new(
            StatusCode::try_from(status).unwrap(),
            SdkBody::from(body.to_string()),
        );
        response
            .headers_mut()
            .insert("content-type", "application/x-amz-json-1.0");
        ReplayEvent::new(HttpRequest::new(SdkBody::empty()), response)
    }

    fn registry_with(events: Vec<ReplayEvent>) -> (DynamoConnectionRegistry, StaticReplayClient) {
        let http_client = StaticReplayClient::new(events);
        let config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
            .retry_config(RetryConfig::disabled())
            .http_client(http_client.clone())
            .build();

        let registry = DynamoConnectionRegistry::new(
            Arc::new(Client::from_conf(config)),
            "wand-ws-connections",
        );
        (registry, http_client)
    }

    fn request_body(request: &HttpRequest) -> String {
        String::from_utf8(request.body().bytes().unwrap_or_default().to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_list_all_follows_last_evaluated_key() {
        let (registry, http_client) = registry_with(vec![
            dynamo_response(
                200,
                r#"{"Items":[{"connectionId":{"S":"conn-a"}},{"connectionId":{"S":"conn-b"}}],
                    "Count":2,"ScannedCount":2,
                    "LastEvaluatedKey":{"connectionId":{"S":"conn-b"}}}"#,
            ),
            dynamo_response(
                200,
                r#"{"Items":[{"connectionId":{"S":"conn-c"}},{"connectionId":{"N":"7"}},{}],
                    "Count":3,"ScannedCount":3}"#,
            ),
        ]);

        let mut listed = registry.list_all().await.unwrap();
        listed.sort();

        assert_eq!(
            listed,
            vec![
                ConnectionId::from("conn-a"),
                ConnectionId::from("conn-b"),
                ConnectionId::from("conn-c"),
            ]
        );

        let requests: Vec<&HttpRequest> = http_client.actual_requests().collect();
        assert_eq!(requests.len(), 2);

        let first = request_body(requests[0]);
        assert!(first.contains("wand-ws-connections"));
        assert!(!first.contains("ExclusiveStartKey"));

        let second = request_body(requests[1]);
        assert!(second.contains("ExclusiveStartKey"));
        assert!(second.contains("conn-b"));
    }

    #[tokio::test]
    async fn test_list_all_single_page() {
        let (registry, http_client) = registry_with(vec![dynamo_response(
            200,
            r#"{"Items":[],"Count":0,"ScannedCount":0}"#,
        )]);

        assert_eq!(registry.table_name(), "wand-ws-connections");
        assert!(registry.list_all().await.unwrap().is_empty());
        assert_eq!(http_client.actual_requests().count(), 1);
    }

    #[tokio::test]
    async fn test_list_all_scan_failure_is_registry_error() {
        let (registry, _http_client) = registry_with(vec![dynamo_response(
            400,
            r#"{"__type":"com.amazonaws.dynamodb.v20120810#ResourceNotFoundException",
                "message":"Requested resource not found"}"#,
        )]);

        let err = registry.list_all().await.unwrap_err();
        assert!(matches!(err, FanoutError::RegistryList(_)));
    }

    #[tokio::test]
    async fn test_remove_deletes_by_connection_id() {
        let (registry, http_client) = registry_with(vec![dynamo_response(200, "{}")]);

        registry.remove(&ConnectionId::from("conn-z")).await.unwrap();

        let requests: Vec<&HttpRequest> = http_client.actual_requests().collect();
        assert_eq!(requests.len(), 1);
        let body = request_body(requests[0]);
        assert!(body.contains(r#""connectionId":{"S":"conn-z"}"#));
    }
}
