use crate::core::report;
use crate::core::sweep::Sweeper;
use crate::core::{ConfigProvider, Pipeline, Storage, SweepReport};
use crate::domain::model::{OutputFormat, SizeMeasurement};
use crate::utils::error::{Result, SweepError};
use std::io::Write;

pub struct SweepPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> SweepPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    /// Text going to stdout is printed size by size while the sweep runs.
    fn streams_to_stdout(&self) -> bool {
        self.config.output_format() == OutputFormat::Text && self.config.output_path().is_none()
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for SweepPipeline<S, C> {
    fn measure(&self) -> Result<Vec<SweepReport>> {
        let experiments = self.config.experiments()?;
        let quiet = self.config.quiet_matches();
        let stream = self.streams_to_stdout();
        let mut reports = Vec::with_capacity(experiments.len());

        for (i, exp) in experiments.iter().enumerate() {
            if stream {
                let mut header = if i > 0 { "\n".to_string() } else { String::new() };
                header.push_str(&report::text_header(
                    &exp.name,
                    exp.workload.name(),
                    exp.engine,
                    exp.mode,
                    &exp.workload.pattern_template(),
                ));
                write_stdout(header.as_bytes())?;
            }

            // 寫入失敗（例如管線關閉）即停止量測
            let mut print_size = |m: &SizeMeasurement| write_stdout(report::text_size(m, quiet).as_bytes());
            let mut ignore = |_: &SizeMeasurement| -> Result<()> { Ok(()) };
            let observer: &mut dyn FnMut(&SizeMeasurement) -> Result<()> =
                if stream { &mut print_size } else { &mut ignore };

            let sweep_report = Sweeper::new(exp).run_with(observer)?;

            if stream {
                write_stdout(report::text_footer(&sweep_report).as_bytes())?;
            }
            reports.push(sweep_report);
        }

        Ok(reports)
    }

    fn render(&self, reports: &[SweepReport]) -> Result<Vec<u8>> {
        if self.streams_to_stdout() {
            // 已即時輸出
            return Ok(Vec::new());
        }
        report::render(reports, self.config.output_format(), self.config.quiet_matches())
    }

    fn load(&self, rendered: Vec<u8>) -> Result<String> {
        match self.config.output_path() {
            Some(path) => {
                tracing::debug!("Writing {} bytes to {}", rendered.len(), path);
                self.storage.write_file(path, &rendered)?;
                Ok(path.to_string())
            }
            None => {
                write_stdout(&rendered)?;
                Ok("stdout".to_string())
            }
        }
    }
}

fn write_stdout(bytes: &[u8]) -> Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(bytes)
        .and_then(|_| out.flush())
        .map_err(SweepError::from_stdout)
}
