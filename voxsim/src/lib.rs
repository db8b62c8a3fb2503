pub mod files;
pub mod headless;
pub mod metrics_report;
pub mod settings;
