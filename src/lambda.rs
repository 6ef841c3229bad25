// src/lambda.rs

//! AWS Lambda handler for the discovery generator.
//!
//! Configuration comes from the defaults plus environment overrides; the
//! snapshot lives in S3.

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::apply_env_overrides;
use crate::error::Result;
use crate::models::Config;
use crate::pipeline::{PublishOutcome, run_publish};
use crate::storage::S3Storage;
use crate::utils::http::create_async_client;

/// Lambda invocation payload.
#[derive(Debug, Default, Deserialize)]
pub struct PublishRequest {
    /// Write the document even when the institutions did not change
    #[serde(default)]
    pub force: bool,
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct PublishResponse {
    /// Whether the run completed
    pub success: bool,

    /// Whether a new document was written
    pub published: bool,

    /// Sequence number of the live document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,

    /// Number of institutions in the written document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institutions: Option<usize>,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<PublishOutcome> for PublishResponse {
    fn from(outcome: PublishOutcome) -> Self {
        match outcome {
            PublishOutcome::Published {
                seq, institutions, ..
            } => Self {
                success: true,
                published: true,
                seq: Some(seq),
                institutions: Some(institutions),
                error: None,
            },
            PublishOutcome::Unchanged { seq } => Self {
                success: true,
                published: false,
                seq: Some(seq),
                ..Default::default()
            },
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<Option<PublishRequest>>,
) -> std::result::Result<PublishResponse, LambdaError> {
    let (request, _context) = event.into_parts();
    let request = request.unwrap_or_default();
    info!("Starting publish: force={}", request.force);

    match run(&request).await {
        Ok(outcome) => {
            match &outcome {
                PublishOutcome::Published { seq, location, .. } => {
                    info!("Published seq {} to {}", seq, location)
                }
                PublishOutcome::Unchanged { seq } => info!("Unchanged {}", seq),
            }
            Ok(outcome.into())
        }
        Err(e) => {
            error!("Publish failed: {}", e);
            Ok(PublishResponse {
                error: Some(e.to_string()),
                ..Default::default()
            })
        }
    }
}

async fn run(request: &PublishRequest) -> Result<PublishOutcome> {
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    config.validate()?;

    let storage = S3Storage::from_config(&config.output).await?;
    let client = create_async_client(&config.catalog)?;
    run_publish(&config, &storage, &client, request.force).await
}
