use crate::domain::model::SystemSnapshot;
#[cfg(feature = "cli")]
use std::cell::{Cell, RefCell};
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

/// One reading of this process, taken between sweep phases.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy)]
pub struct ProcessSample {
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
    pub total_memory_mb: u64,
    pub elapsed: Duration,
}

#[cfg(feature = "cli")]
impl ProcessSample {
    pub fn memory_percent(&self) -> f32 {
        if self.total_memory_mb == 0 {
            return 0.0;
        }
        self.memory_mb as f32 / self.total_memory_mb as f32 * 100.0
    }

    pub fn to_snapshot(self) -> SystemSnapshot {
        SystemSnapshot {
            cpu_usage: self.cpu_usage,
            memory_usage_mb: self.memory_mb,
            peak_memory_mb: self.peak_memory_mb,
        }
    }
}

/// Tracks the harness's own CPU and memory so reports can say what the
/// machine was doing while the timings were taken.
///
/// A monitor built with `enabled = false` (or without a resolvable PID)
/// never touches sysinfo.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Option<RefCell<System>>,
    pid: Pid,
    started: Instant,
    peak_memory_mb: Cell<u64>,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = if enabled {
            sysinfo::get_current_pid()
                .map_err(|e| tracing::warn!("⚠️ Cannot resolve current PID, monitoring disabled: {}", e))
                .ok()
        } else {
            None
        };

        let monitor = Self {
            system: pid.map(|_| RefCell::new(System::new())),
            pid: pid.unwrap_or_else(|| Pid::from_u32(0)),
            started: Instant::now(),
            peak_memory_mb: Cell::new(0),
        };
        // 第一次讀取作為 CPU 使用率的基準
        monitor.sample();
        monitor
    }

    /// Refreshes only this process and the memory totals.
    pub fn sample(&self) -> Option<ProcessSample> {
        let mut system = self.system.as_ref()?.borrow_mut();
        system.refresh_memory();
        system.refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);

        let process = system.process(self.pid)?;
        let memory_mb = process.memory() / 1024 / 1024;
        let peak = self.peak_memory_mb.get().max(memory_mb);
        self.peak_memory_mb.set(peak);

        Some(ProcessSample {
            cpu_usage: process.cpu_usage(),
            memory_mb,
            peak_memory_mb: peak,
            total_memory_mb: system.total_memory() / 1024 / 1024,
            elapsed: self.started.elapsed(),
        })
    }

    pub fn snapshot(&self) -> Option<SystemSnapshot> {
        self.sample().map(ProcessSample::to_snapshot)
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(sample) = self.sample() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB ({:.1}%), Peak: {}MB, Time: {:?}",
                phase,
                sample.cpu_usage,
                sample.memory_mb,
                sample.memory_percent(),
                sample.peak_memory_mb,
                sample.elapsed
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(sample) = self.sample() {
            tracing::info!(
                "📊 Sweep finished in {:?}, peak memory {}MB",
                sample.elapsed,
                sample.peak_memory_mb
            );
        }
    }
}

// 非 CLI 環境的空實現
#[cfg(not(feature = "cli"))]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn snapshot(&self) -> Option<SystemSnapshot> {
        None
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_reports_nothing() {
        let monitor = SystemMonitor::new(false);
        assert!(monitor.sample().is_none());
        assert!(monitor.snapshot().is_none());
    }

    #[test]
    fn test_peak_memory_never_drops() {
        let monitor = SystemMonitor::new(true);
        let Some(first) = monitor.sample() else {
            // 沙箱環境可能讀不到自己的行程
            return;
        };
        let _buffer = vec![1u8; 8 * 1024 * 1024];
        let second = monitor.sample().unwrap();

        assert!(second.peak_memory_mb >= first.peak_memory_mb);
        assert!(second.peak_memory_mb >= second.memory_mb);
        assert!(second.elapsed >= first.elapsed);
        assert_eq!(second.to_snapshot().peak_memory_mb, second.peak_memory_mb);
    }
}
