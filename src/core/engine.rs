use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct SweepEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> SweepEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Measure, render, then write; returns where the report went.
    pub fn run(&self) -> Result<String> {
        tracing::info!("Starting regex sweep...");
        self.monitor.log_stats("Start");

        let mut reports = self.pipeline.measure()?;
        let sizes: usize = reports.iter().map(|r| r.measurements.len()).sum();
        tracing::info!("Measured {} experiments, {} sizes", reports.len(), sizes);
        self.monitor.log_stats("Measure");

        if let Some(snapshot) = self.monitor.snapshot() {
            for report in &mut reports {
                report.system = Some(snapshot);
            }
        }

        let rendered = self.pipeline.render(&reports)?;
        tracing::debug!("Rendered {} bytes", rendered.len());

        let destination = self.pipeline.load(rendered)?;
        tracing::info!("Report written to: {}", destination);
        self.monitor.log_final_stats();

        Ok(destination)
    }
}
