use crate::core::engines::EngineOptions;
use crate::domain::model::{ExperimentConfig, Outcome, Sample, SizeMeasurement, SweepReport};
use crate::domain::ports::Matcher;
use crate::utils::error::Result;
use std::time::{Duration, Instant};

/// Runs one experiment: the size sweep with repeated timed matches.
pub struct Sweeper<'a> {
    experiment: &'a ExperimentConfig,
}

impl<'a> Sweeper<'a> {
    pub fn new(experiment: &'a ExperimentConfig) -> Self {
        Self { experiment }
    }

    pub fn run(&self) -> Result<SweepReport> {
        self.run_with(&mut |_: &SizeMeasurement| Ok(()))
    }

    /// Measures every size in order and hands each finished size to `observer`.
    ///
    /// An error from `observer` ends the sweep and is returned as is.
    pub fn run_with(&self, observer: &mut dyn FnMut(&SizeMeasurement) -> Result<()>) -> Result<SweepReport> {
        let exp = self.experiment;
        let started_at = chrono::Utc::now();
        let mut measurements = Vec::with_capacity(exp.sweep.len());
        let mut stopped_early = false;

        tracing::info!(
            "🚀 Experiment '{}': {} on {} ({} mode), {} sizes x {} repetitions",
            exp.name,
            exp.workload.name(),
            exp.engine,
            exp.mode,
            exp.sweep.len(),
            exp.repetitions
        );

        for n in exp.sweep.sizes() {
            let measurement = self.measure_size(n)?;

            tracing::info!(
                "n={} mean={:?} min={:?} max={:?}",
                n,
                measurement.mean(),
                Duration::from_nanos(measurement.min_ns),
                Duration::from_nanos(measurement.max_ns)
            );
            observer(&measurement)?;

            let over_budget = exp.budget.is_some_and(|budget| measurement.mean() > budget);
            measurements.push(measurement);

            if over_budget {
                tracing::warn!("⏱️ Time budget exceeded at n={}, stopping sweep", n);
                stopped_early = true;
                break;
            }
        }

        Ok(SweepReport {
            name: exp.name.clone(),
            workload: exp.workload.name().to_string(),
            engine: exp.engine,
            mode: exp.mode,
            pattern_template: exp.workload.pattern_template(),
            repetitions: exp.repetitions,
            include_compile: exp.include_compile,
            started_at,
            measurements,
            stopped_early,
            system: None,
        })
    }

    fn measure_size(&self, n: usize) -> Result<SizeMeasurement> {
        let exp = self.experiment;
        let pattern = exp.workload.pattern(n);
        let haystack = exp.workload.haystack(n);
        let options = EngineOptions {
            backtrack_limit: exp.backtrack_limit,
        };

        tracing::debug!("n={} pattern={} haystack_len={}", n, pattern, haystack.len());

        let mut samples = Vec::with_capacity(exp.repetitions);
        for repetition in 0..exp.repetitions {
            // 每次重新編譯，編譯時間只在 include_compile 時計入
            let compile_start = Instant::now();
            let mut matcher = exp.engine.compile(&pattern, exp.mode, options)?;
            let compile_elapsed = compile_start.elapsed();

            let start = Instant::now();
            let outcome = timed_match(matcher.as_mut(), &haystack);
            let mut elapsed = start.elapsed();
            if exp.include_compile {
                elapsed += compile_elapsed;
            }

            if outcome.is_failure() {
                tracing::warn!("⚠️ n={} repetition {}: {}", n, repetition, outcome);
            }

            samples.push(Sample {
                repetition,
                elapsed_ns: elapsed.as_nanos().min(u64::MAX as u128) as u64,
                outcome,
            });
        }

        Ok(SizeMeasurement::from_samples(n, samples))
    }
}

#[inline(never)]
fn timed_match(matcher: &mut dyn Matcher, haystack: &str) -> Outcome {
    std::hint::black_box(matcher.run(std::hint::black_box(haystack)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Engine, MatchMode, Sweep, Workload};
    use crate::utils::error::SweepError;

    fn experiment(workload: Workload, engine: Engine, sweep: Sweep) -> ExperimentConfig {
        ExperimentConfig {
            name: "test".to_string(),
            mode: workload.default_mode(),
            workload,
            engine,
            sweep,
            repetitions: 3,
            include_compile: false,
            budget: None,
            backtrack_limit: 1_000_000,
        }
    }

    #[test]
    fn test_every_size_has_all_repetitions() {
        let sweep = Sweep {
            start: 0,
            end: 30,
            step: 10,
        };
        let exp = experiment(Workload::StarStar, Engine::Regex, sweep);
        let report = Sweeper::new(&exp).run().unwrap();

        let sizes: Vec<usize> = report.measurements.iter().map(|m| m.n).collect();
        assert_eq!(sizes, vec![0, 10, 20]);
        for m in &report.measurements {
            assert_eq!(m.samples.len(), 3);
            assert!(m.min_ns <= m.mean_ns && m.mean_ns <= m.max_ns);
            assert_eq!(m.outcome(), Some(&Outcome::NoMatch));
        }
        assert!(!report.stopped_early);
        assert_eq!(report.pattern_template, "(a*)*b");
    }

    #[test]
    fn test_observer_sees_sizes_in_order() {
        let sweep = Sweep {
            start: 1,
            end: 6,
            step: 2,
        };
        let exp = experiment(Workload::OptionalRepeat, Engine::Pikevm, sweep);
        let mut seen = Vec::new();
        let report = Sweeper::new(&exp).run_with(&mut |m: &SizeMeasurement| {
                seen.push(m.n);
                Ok(())
            })
            .unwrap();

        assert_eq!(seen, vec![1, 3, 5]);
        for m in &report.measurements {
            assert_eq!(m.outcome(), Some(&Outcome::Matched { start: 0, end: m.n }));
        }
    }

    #[test]
    fn test_zero_budget_stops_after_first_size() {
        let mut exp = experiment(Workload::Alternation, Engine::Fancy, Sweep::default());
        exp.budget = Some(Duration::ZERO);
        exp.include_compile = true;
        let report = Sweeper::new(&exp).run().unwrap();

        // 含編譯時間的平均必定大於零
        assert!(report.stopped_early);
        assert_eq!(report.measurements.len(), 1);
    }

    #[test]
    fn test_tokenize_counts_while_tokens() {
        let sweep = Sweep {
            start: 1,
            end: 3,
            step: 1,
        };
        let exp = experiment(Workload::WhileProgram, Engine::Regex, sweep);
        let report = Sweeper::new(&exp).run().unwrap();
        assert_eq!(exp.mode, MatchMode::Tokenize);

        let counts: Vec<usize> = report
            .measurements
            .iter()
            .map(|m| match m.outcome() {
                Some(Outcome::Tokens { count }) => *count,
                other => panic!("unexpected outcome {:?}", other),
            })
            .collect();
        assert!(counts[0] > 0);
        // 兩份程式之間多一個換行 token
        assert_eq!(counts[1], counts[0] * 2 + 1);
    }

    #[test]
    fn test_compile_error_aborts_experiment() {
        let exp = experiment(
            Workload::Custom {
                pattern: "(a".to_string(),
                unit: "a".to_string(),
            },
            Engine::Regex,
            Sweep::default(),
        );
        assert!(Sweeper::new(&exp).run().is_err());
    }

    #[test]
    fn test_engine_failures_are_recorded_and_the_sweep_goes_on() {
        // BoundedBacktracker 的 visited 容量放不下百萬字元的輸入
        let sweep = Sweep {
            start: 1_000_000,
            end: 1_000_011,
            step: 10,
        };
        let mut exp = experiment(Workload::StarStar, Engine::Backtrack, sweep);
        exp.repetitions = 2;
        let report = Sweeper::new(&exp).run().unwrap();

        let sizes: Vec<usize> = report.measurements.iter().map(|m| m.n).collect();
        assert_eq!(sizes, vec![1_000_000, 1_000_010]);
        for m in &report.measurements {
            assert_eq!(m.samples.len(), 2);
            for sample in &m.samples {
                match &sample.outcome {
                    Outcome::Failed { reason } => assert!(reason.contains("too long"), "{}", reason),
                    other => panic!("n={} expected a failure, got {}", m.n, other),
                }
            }
        }
        assert!(!report.stopped_early);
    }

    #[test]
    fn test_observer_error_stops_the_sweep() {
        let exp = experiment(Workload::StarStar, Engine::Regex, Sweep::default());
        let mut calls = 0;
        let result = Sweeper::new(&exp).run_with(&mut |_: &SizeMeasurement| -> Result<()> {
            calls += 1;
            Err(SweepError::OutputClosed)
        });

        assert!(matches!(result, Err(SweepError::OutputClosed)));
        assert_eq!(calls, 1);
    }
}
