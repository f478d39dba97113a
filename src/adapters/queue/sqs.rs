//! Amazon SQS publisher
//!
//! Each canonical record becomes one message on a FIFO queue, grouped under
//! the configured message group id.

use super::traits::MessageQueue;
use crate::config::QueueConfig;
use crate::domain::{CanonicalRecord, QueueError};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sqs::config::Region;
use aws_sdk_sqs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_sqs::operation::send_message::SendMessageError;
use aws_sdk_sqs::types::MessageAttributeValue;
use aws_sdk_sqs::Client;
use chrono::{SecondsFormat, Utc};

pub const MESSAGE_TYPE: &str = "ItemMaster";

/// Service error codes that no retry can fix
const PERMANENT_CODES: [&str; 6] = [
    "InvalidParameterValue",
    "MissingParameter",
    "InvalidAddress",
    "InvalidSecurity",
    "AccessDenied",
    "AWS.SimpleQueueService.NonExistentQueue",
];

/// Message body and attributes, independent of the SDK request type
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub body: String,
    pub group_id: String,
    pub attributes: Vec<(&'static str, String)>,
}

impl OutgoingMessage {
    /// Build the message for `record`
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Serialization` if the record cannot be encoded.
    pub fn for_record(record: &CanonicalRecord, group_id: &str) -> Result<Self, QueueError> {
        let body = record
            .to_json()
            .map_err(|e| QueueError::Serialization(e.to_string()))?;

        Ok(Self {
            body,
            group_id: group_id.to_string(),
            attributes: vec![
                ("MessageType", MESSAGE_TYPE.to_string()),
                (
                    "Timestamp",
                    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
            ],
        })
    }
}

/// SQS-backed message queue
pub struct SqsQueue {
    client: Client,
    queue_url: String,
    group_id: String,
}

impl SqsQueue {
    /// Build an SQS client from the default AWS credential chain
    pub async fn new(config: &QueueConfig) -> Result<Self, QueueError> {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_sqs::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::info!(
            queue_url = %config.queue_url,
            region = %config.region,
            endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
            "SQS client initialized"
        );

        Ok(Self::with_client(Client::from_conf(builder.build()), config))
    }

    /// Wrap an existing SDK client
    pub fn with_client(client: Client, config: &QueueConfig) -> Self {
        Self {
            client,
            queue_url: config.queue_url.clone(),
            group_id: config.message_group_id.clone(),
        }
    }
}

#[async_trait]
impl MessageQueue for SqsQueue {
    async fn send(&self, record: &CanonicalRecord) -> Result<String, QueueError> {
        let message = OutgoingMessage::for_record(record, &self.group_id)?;

        let mut request = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(message.body)
            .message_group_id(message.group_id);

        for (name, value) in message.attributes {
            let attribute = MessageAttributeValue::builder()
                .data_type("String")
                .string_value(value)
                .build()
                .map_err(|e| QueueError::Configuration(e.to_string()))?;
            request = request.message_attributes(name, attribute);
        }

        let output = request.send().await.map_err(|e| classify(&e))?;

        let message_id = output.message_id().unwrap_or_default().to_string();
        tracing::debug!(sku = %record.sku_label(), message_id = %message_id, "Message sent to SQS");
        Ok(message_id)
    }

    fn queue_name(&self) -> &str {
        &self.queue_url
    }
}

/// Map an SDK failure to a transient `SendFailed` or a permanent `Rejected`
///
/// Timeouts, dispatch failures, unreadable responses and throttling stay
/// retryable. A request that could not be built is rejected.
pub(crate) fn classify<R>(error: &SdkError<SendMessageError, R>) -> QueueError
where
    R: std::fmt::Debug,
{
    if let Some(service) = error.as_service_error() {
        return classify_service(service);
    }

    let detail = DisplayErrorContext(error).to_string();
    match error {
        SdkError::ConstructionFailure(_) => QueueError::Rejected(detail),
        _ => QueueError::SendFailed(detail),
    }
}

fn classify_service(error: &SendMessageError) -> QueueError {
    let detail = DisplayErrorContext(error).to_string();
    let permanent = error.is_queue_does_not_exist()
        || error.is_invalid_message_contents()
        || error.is_unsupported_operation()
        || error.code().is_some_and(|code| PERMANENT_CODES.contains(&code));

    if permanent {
        QueueError::Rejected(detail)
    } else {
        QueueError::SendFailed(detail)
    }
}
