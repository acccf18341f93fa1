use chrono::Datelike;

use crate::core::client::converter::{AssumedRole, ConversionRequest};
use crate::core::config::Config;
use crate::error::JobError;
use crate::types::billing::{resolve_anchor, BillingPeriod};
use crate::types::job::Job;
use crate::types::schema::TableSchema;
use crate::worker::catalog::{CatalogSynchronizer, CatalogTable};

/// A report that was converted and is ready to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedReport {
    pub period: BillingPeriod,
    pub request: ConversionRequest,
    pub schema: TableSchema,
}

impl ConvertedReport {
    pub fn location(&self) -> String {
        self.request.destination_location()
    }
}

/// Drives one job through period resolution, conversion and catalog publishing.
pub struct ReportProcessor<'a> {
    config: &'a Config,
}

impl<'a> ReportProcessor<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Converts the report and publishes it to the catalog
    pub async fn run(&self, job: &Job) -> Result<ConvertedReport, JobError> {
        let report = self.convert(job).await?;
        self.publish(job, &report).await?;
        Ok(report)
    }

    /// Resolves the billing period and converts that month of the report.
    ///
    /// When the current month's manifest is missing early in the month the previous month is
    /// converted instead.
    pub async fn convert(&self, job: &Job) -> Result<ConvertedReport, JobError> {
        job.validate()?;

        let params = self.config.params();
        let converter = self.config.converter();
        let anchor = resolve_anchor(job.date.as_deref(), self.config.clock().today())?;
        let mut period = BillingPeriod::containing(anchor);
        let mut request = self.conversion_request(job, &period);

        match converter.check_manifest_exists(&request).await {
            Ok(()) => {}
            Err(e) if e.is_manifest_not_found() => {
                if !params.manifest_fallback.applies(anchor) {
                    return Err(JobError::ManifestDelayed {
                        manifest_key: request.manifest_key,
                        day_of_month: anchor.day(),
                        grace_days: params.manifest_fallback.grace_days,
                    });
                }
                period = period.previous();
                tracing::info!(
                    missing = %request.manifest_key,
                    period = %period.period_tag(),
                    "Manifest not published yet, processing previous month"
                );
                request.set_manifest_key(period.manifest_key(&job.report_path, &job.report_name));
                request.set_destination_path(period.destination_path(
                    &params.destination_prefix,
                    job.database(),
                    job.report_id(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        converter.convert(&request).await?;
        let schema = converter.columns(&request).await?;
        tracing::info!(location = %request.destination_location(), columns = schema.len(), "Report converted");

        Ok(ConvertedReport { period, request, schema })
    }

    /// Creates or updates the catalog table of a converted report
    pub async fn publish(&self, job: &Job, report: &ConvertedReport) -> Result<(), JobError> {
        let synchronizer = CatalogSynchronizer::new(
            self.config.queries(),
            self.config.catalog(),
            self.config.identity().query_results_location(),
            self.config.query_poll_interval(),
        );
        let table = CatalogTable {
            database: job.database().to_string(),
            name: format!("{}_{}", job.report_id(), report.period.partition_tag()),
            location: report.location(),
            encrypted: job.destination_kms_key_arn.is_some(),
        };

        synchronizer.synchronize(&table, &report.schema).await?;
        Ok(())
    }

    fn conversion_request(&self, job: &Job, period: &BillingPeriod) -> ConversionRequest {
        let params = self.config.params();
        let mut request = ConversionRequest::new(
            job.source_bucket.clone(),
            period.manifest_key(&job.report_path, &job.report_name),
            job.destination_bucket.clone(),
            period.destination_path(&params.destination_prefix, job.database(), job.report_id()),
        )
        .with_scratch_dir(params.scratch_dir.clone());

        if let Some(role_arn) = &job.source_role_arn {
            request = request.with_source_role(AssumedRole::new(role_arn.clone(), job.source_external_id.clone()));
        }
        if let Some(role_arn) = &job.destination_role_arn {
            request =
                request.with_destination_role(AssumedRole::new(role_arn.clone(), job.destination_external_id.clone()));
        }
        if let Some(key) = &job.destination_kms_key_arn {
            request = request.with_destination_kms_key(key.clone());
        }
        request
    }
}
