//! Collects the measurements recorded through the `metrics` macros and renders them as YAML.

use anyhow::{anyhow, Result};
use metrics_core::{Builder, Drain, Observe};
use metrics_runtime::{observers::YamlBuilder, Controller, Receiver};

type MetricsObserver = <YamlBuilder as Builder>::Output;

pub struct MetricsReport {
    controller: Controller,
    observer: MetricsObserver,
}

impl MetricsReport {
    /// Installs a process-wide recorder. Can only succeed once per process.
    pub fn install() -> Result<Self> {
        let receiver = Receiver::builder()
            .build()
            .map_err(|err| anyhow!("Building metrics receiver: {:?}", err))?;
        let controller = receiver.controller();
        receiver.install();

        Ok(MetricsReport {
            controller,
            observer: YamlBuilder::new().build(),
        })
    }

    /// Renders everything recorded so far.
    pub fn drain(&mut self) -> String {
        self.controller.observe(&mut self.observer);
        self.observer.drain()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_report_includes_recorded_metrics() {
        let mut report = MetricsReport::install().unwrap();

        metrics::counter!("report.rebuilt_chunks", 7);
        metrics::timing!("report.tick", Duration::from_millis(3));

        let rendered = report.drain();
        assert!(rendered.contains("rebuilt_chunks"), "{}", rendered);
        assert!(rendered.contains("tick"), "{}", rendered);
    }
}
