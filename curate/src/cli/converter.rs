use clap::Args;

use crate::types::billing::DEFAULT_MANIFEST_GRACE_DAYS;

/// Parameters used to config the report conversion.
#[derive(Debug, Clone, Args)]
pub struct ConverterCliArgs {
    /// Executable performing the columnar conversion.
    #[arg(env = "CURATE_CONVERTER_BIN", long = "converter-bin", default_value = "curconvert")]
    pub converter_bin: std::path::PathBuf,

    /// Last day of the month on which a missing manifest falls back to the previous month.
    #[arg(env = "CURATE_MANIFEST_GRACE_DAYS", long = "manifest-grace-days", default_value_t = DEFAULT_MANIFEST_GRACE_DAYS)]
    pub manifest_grace_days: u32,
}
