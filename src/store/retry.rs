//! Inquiry sink wrapper with exponential backoff for transient failures.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use tracing::warn;
use uuid::Uuid;

use super::{InquirySink, StoreError};
use crate::config::IntakeConfig;
use crate::intake::InquiryRecord;

/// Retries IO failures of the wrapped sink; explicit rejections are final
pub struct RetryingSink<S> {
    inner: S,
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl<S: InquirySink> RetryingSink<S> {
    pub fn new(inner: S, max_retries: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay,
        }
    }

    pub fn from_config(inner: S, config: &IntakeConfig) -> Self {
        Self::new(
            inner,
            config.submit_retries,
            Duration::from_millis(config.retry_base_delay_ms),
            Duration::from_millis(config.retry_max_delay_ms),
        )
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn retry_strategy(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries)
    }

    fn should_retry(err: &StoreError) -> bool {
        matches!(err, StoreError::Io(_))
    }
}

#[async_trait]
impl<S: InquirySink> InquirySink for RetryingSink<S> {
    async fn record_inquiry(&self, inquiry: &InquiryRecord) -> Result<Uuid, StoreError> {
        let op = || async { self.inner.record_inquiry(inquiry).await };

        op.retry(self.retry_strategy())
            .when(Self::should_retry)
            .notify(|err, dur| {
                warn!("Retrying record_inquiry after {:?}: {}", dur, err);
            })
            .await
    }
}
