use crate::core::command::GifsicleCommand;
use crate::core::info::parse_info;
use crate::domain::model::GifInfo;
use crate::utils::error::{Result, SqueezeError};
use crate::utils::monitor::{ProcessMonitor, ProcessStats};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;
const ERROR_TAIL_LINES: usize = 20;
const SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug)]
pub struct RunOutput {
    pub lines: Vec<String>,
    pub stats: Option<ProcessStats>,
}

/// 負責呼叫外部的 gifsicle 執行檔
#[derive(Debug, Clone)]
pub struct GifsicleRunner {
    program: String,
    timeout: Duration,
    monitoring: bool,
}

impl GifsicleRunner {
    pub fn new(program: impl Into<String>, timeout_seconds: u64) -> Self {
        Self {
            program: program.into(),
            timeout: Duration::from_secs(timeout_seconds),
            monitoring: false,
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitoring = enabled;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// `gifsicle --version` 的第一行；找不到執行檔時回傳 ToolUnavailable
    pub async fn version(&self) -> Result<String> {
        let mut cmd = GifsicleCommand::version(&self.program).to_tokio();
        cmd.stdin(Stdio::null()).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| SqueezeError::ToolTimeout {
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|e| SqueezeError::ToolUnavailable {
                message: format!("{}: {}", self.program, e),
            })?;

        if !output.status.success() {
            return Err(SqueezeError::ToolUnavailable {
                message: format!(
                    "`{} --version` exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    /// 讀取 GIF 資訊；失敗只記警告，不影響壓縮流程
    pub async fn info(&self, path: &Path) -> Option<GifInfo> {
        let mut cmd = GifsicleCommand::info(&self.program, path).to_tokio();
        cmd.stdin(Stdio::null()).kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::warn!("⚠️ Could not get GIF info for {}: {}", path.display(), e);
                return None;
            }
            Err(_) => {
                tracing::warn!("⚠️ GIF info for {} timed out", path.display());
                return None;
            }
        };

        if !output.status.success() {
            tracing::warn!(
                "⚠️ Could not get GIF info for {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        let info = parse_info(&String::from_utf8_lossy(&output.stdout));
        if info.is_none() {
            tracing::warn!("⚠️ Unrecognised gifsicle --info output for {}", path.display());
        }
        info
    }

    /// 執行指令，逐行把 stdout/stderr 寫進日誌
    pub async fn run(&self, command: &GifsicleCommand) -> Result<RunOutput> {
        let mut cmd = command.to_tokio();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                SqueezeError::ToolUnavailable {
                    message: format!("{}: {}", command.program(), e),
                }
            }
            _ => SqueezeError::IoError(e),
        })?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_line_reader(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_line_reader(stderr, tx.clone()));
        }
        drop(tx);

        let mut monitor = if self.monitoring {
            child.id().map(ProcessMonitor::attach)
        } else {
            None
        };

        let waited = tokio::time::timeout(
            self.timeout,
            wait_with_sampling(&mut child, monitor.as_mut()),
        )
        .await;

        let status = match waited {
            Ok(status) => status?,
            Err(_) => {
                if let Err(e) = child.kill().await {
                    tracing::warn!("⚠️ Failed to kill timed out gifsicle: {}", e);
                }
                return Err(SqueezeError::ToolTimeout {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        for reader in readers {
            if let Err(e) = reader.await {
                tracing::warn!("⚠️ Output reader task failed: {}", e);
            }
        }

        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        let stats = monitor.map(ProcessMonitor::finish);

        if !status.success() {
            let tail_start = lines.len().saturating_sub(ERROR_TAIL_LINES);
            return Err(SqueezeError::ToolFailed {
                code: status.code(),
                output: lines[tail_start..].join("\n"),
            });
        }

        Ok(RunOutput { lines, stats })
    }
}

async fn wait_with_sampling(
    child: &mut Child,
    mut monitor: Option<&mut ProcessMonitor>,
) -> std::io::Result<ExitStatus> {
    let mut ticker = tokio::time::interval(SAMPLE_INTERVAL);
    loop {
        tokio::select! {
            status = child.wait() => return status,
            _ = ticker.tick(), if monitor.is_some() => {
                if let Some(monitor) = monitor.as_deref_mut() {
                    monitor.sample();
                }
            }
        }
    }
}

fn spawn_line_reader<R>(reader: R, tx: mpsc::UnboundedSender<String>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    // gifsicle 會原樣輸出非 UTF-8 的檔名，所以要一直讀到 EOF
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    tracing::info!("  {}", line);
                    let _ = tx.send(line.to_string());
                }
                Err(e) => {
                    tracing::debug!("Stopped reading gifsicle output: {}", e);
                    break;
                }
            }
        }
    })
}
