#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessStats {
    pub peak_cpu_usage: f32,
    pub peak_memory_mb: u64,
    pub samples: u32,
    pub elapsed_time: Duration,
}

/// 監看 gifsicle 子行程的 CPU 與記憶體用量
#[cfg(feature = "cli")]
pub struct ProcessMonitor {
    system: System,
    pid: Pid,
    start_time: Instant,
    peak_cpu: f32,
    peak_memory: u64,
    samples: u32,
}

#[cfg(feature = "cli")]
impl ProcessMonitor {
    pub fn attach(pid: u32) -> Self {
        Self {
            system: System::new(),
            pid: Pid::from_u32(pid),
            start_time: Instant::now(),
            peak_cpu: 0.0,
            peak_memory: 0,
            samples: 0,
        }
    }

    /// 回傳本次取樣的 (CPU %, 記憶體 MB)；行程已結束時回傳 None
    pub fn sample(&mut self) -> Option<(f32, u64)> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );

        let process = self.system.process(self.pid)?;
        let memory_mb = process.memory() / 1024 / 1024;
        let cpu = process.cpu_usage();

        self.samples += 1;
        if memory_mb > self.peak_memory {
            self.peak_memory = memory_mb;
        }
        if cpu > self.peak_cpu {
            self.peak_cpu = cpu;
        }

        tracing::debug!("📊 gifsicle - CPU: {:.1}%, Memory: {}MB", cpu, memory_mb);
        Some((cpu, memory_mb))
    }

    pub fn finish(self) -> ProcessStats {
        let stats = ProcessStats {
            peak_cpu_usage: self.peak_cpu,
            peak_memory_mb: self.peak_memory,
            samples: self.samples,
            elapsed_time: self.start_time.elapsed(),
        };

        tracing::info!(
            "📊 gifsicle stats - Time: {:?}, Peak CPU: {:.1}%, Peak Memory: {}MB ({} samples)",
            stats.elapsed_time,
            stats.peak_cpu_usage,
            stats.peak_memory_mb,
            stats.samples
        );
        stats
    }
}

// 非 CLI 環境沒有 sysinfo，只保留計時
#[cfg(not(feature = "cli"))]
pub struct ProcessMonitor {
    start_time: Instant,
}

#[cfg(not(feature = "cli"))]
impl ProcessMonitor {
    pub fn attach(_pid: u32) -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    pub fn sample(&mut self) -> Option<(f32, u64)> {
        None
    }

    pub fn finish(self) -> ProcessStats {
        ProcessStats {
            peak_cpu_usage: 0.0,
            peak_memory_mb: 0,
            samples: 0,
            elapsed_time: self.start_time.elapsed(),
        }
    }
}
