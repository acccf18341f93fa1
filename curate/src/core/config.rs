use std::time::Duration;

use aws_config::SdkConfig;

use crate::core::client::{Athena, CatalogClient, Glue, QueryClient, QueueClient, ReportConverter, S3ReportConverter, SQS};
use crate::core::clock::{Clock, SystemClock};
use crate::core::cloud::InstanceIdentity;
use crate::types::params::WorkerParams;

/// Interval between two status checks of a running catalog query
pub const QUERY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Everything a job needs, shared read-only by the consumer.
pub struct Config {
    params: WorkerParams,
    identity: InstanceIdentity,
    queue: Box<dyn QueueClient>,
    converter: Box<dyn ReportConverter>,
    queries: Box<dyn QueryClient>,
    catalog: Box<dyn CatalogClient>,
    clock: Box<dyn Clock>,
    query_poll_interval: Duration,
}

impl Config {
    /// Builds the AWS backed clients for the discovered region
    pub fn setup(params: WorkerParams, identity: InstanceIdentity, aws_config: &SdkConfig) -> Self {
        let queue = Box::new(SQS::new(aws_config, params.queue_url.clone()));
        let converter = Box::new(S3ReportConverter::new(aws_config, params.converter_bin.clone()));

        Self::new(
            params,
            identity,
            queue,
            converter,
            Box::new(Athena::new(aws_config)),
            Box::new(Glue::new(aws_config)),
            Box::new(SystemClock),
        )
    }

    /// Builds a config from already constructed clients.
    ///
    /// # Arguments
    /// * `params` - Validated worker parameters.
    /// * `identity` - Account, region and instance the worker runs as.
    /// * `queue` - Source of job messages.
    /// * `converter` - Manifest access and report conversion.
    /// * `queries` - Runs catalog DDL.
    /// * `catalog` - Reads and updates table definitions.
    /// * `clock` - Source of "today" for billing period resolution.
    ///
    /// # Returns
    /// * `Config` - Usually wrapped in an `Arc` and shared with the consumer.
    pub fn new(
        params: WorkerParams,
        identity: InstanceIdentity,
        queue: Box<dyn QueueClient>,
        converter: Box<dyn ReportConverter>,
        queries: Box<dyn QueryClient>,
        catalog: Box<dyn CatalogClient>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            params,
            identity,
            queue,
            converter,
            queries,
            catalog,
            clock,
            query_poll_interval: QUERY_POLL_INTERVAL,
        }
    }

    pub fn with_query_poll_interval(mut self, interval: Duration) -> Self {
        self.query_poll_interval = interval;
        self
    }

    pub fn params(&self) -> &WorkerParams {
        &self.params
    }

    pub fn identity(&self) -> &InstanceIdentity {
        &self.identity
    }

    pub fn queue(&self) -> &dyn QueueClient {
        self.queue.as_ref()
    }

    pub fn converter(&self) -> &dyn ReportConverter {
        self.converter.as_ref()
    }

    pub fn queries(&self) -> &dyn QueryClient {
        self.queries.as_ref()
    }

    pub fn catalog(&self) -> &dyn CatalogClient {
        self.catalog.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn query_poll_interval(&self) -> Duration {
        self.query_poll_interval
    }
}
