pub mod catalog;
pub mod consumer;
pub mod processor;
pub mod protection;

pub use catalog::{CatalogSynchronizer, CatalogTable};
pub use consumer::{JobConsumer, MessageOutcome, PollOutcome};
pub use processor::{ConvertedReport, ReportProcessor};
pub use protection::{ProtectionCoordinator, ProtectionError, ProtectionHandle, ProtectionTicket};
