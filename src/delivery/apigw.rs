use super::{classify_failure, DeliveryChannel};
use crate::models::{ConnectionId, DeliveryOutcome};
use async_trait::async_trait;
use aws_sdk_apigatewaymanagement::error::DisplayErrorContext;
use aws_sdk_apigatewaymanagement::primitives::Blob;
use aws_sdk_apigatewaymanagement::Client;
use std::sync::Arc;
use tracing::debug;

/// API Gateway WebSocket management API client bound to one stage endpoint.
#[derive(Clone)]
pub struct ApiGatewayChannel {
    client: Arc<Client>,
}

impl ApiGatewayChannel {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Build a client that targets `endpoint` instead of the regional default.
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig, endpoint: &str) -> Self {
        let config = aws_sdk_apigatewaymanagement::config::Builder::from(sdk_config)
            .endpoint_url(endpoint)
            .build();

        Self::new(Arc::new(Client::from_conf(config)))
    }
}

#[async_trait]
impl DeliveryChannel for ApiGatewayChannel {
    async fn post_to_connection(
        &self,
        connection_id: &ConnectionId,
        payload: &[u8],
    ) -> DeliveryOutcome {
        let result = self
            .client
            .post_to_connection()
            .connection_id(connection_id.as_str())
            .data(Blob::new(payload))
            .send()
            .await;

        match result {
            Ok(_) => DeliveryOutcome::Delivered,
            Err(err) => {
                if err
                    .as_service_error()
                    .map(|e| e.is_gone_exception())
                    .unwrap_or(false)
                {
                    return DeliveryOutcome::Gone;
                }

                let status = err.raw_response().map(|r| r.status().as_u16());
                debug!(
                    connection_id = %connection_id,
                    status = ?status,
                    "PostToConnection failed"
                );
                classify_failure(status, DisplayErrorContext(&err).to_string())
            }
        }
    }
}
