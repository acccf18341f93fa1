use clap::Args;

/// Parameters used to config the health check server.
#[derive(Debug, Clone, Args)]
pub struct ServerCliArgs {
    /// The host to listen on.
    #[arg(env = "CURATE_HEALTH_HOST", long = "health-host", default_value = "0.0.0.0")]
    pub host: String,

    /// Health port to listen on.
    #[arg(env = "CURATE_HEALTH_PORT", long = "healthport", default_value = "80")]
    pub port: u16,
}
