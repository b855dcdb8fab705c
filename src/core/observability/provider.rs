use crate::app::config::{FileRotation, LogSink, LogType, LoggingConfig};
use anyhow::{Context, Result, anyhow};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::format::{FmtSpan, Writer};
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Keeps the background log writers alive. Dropping it flushes
/// whatever is still buffered, so hold it until shutdown
#[must_use]
pub struct LogGuards {
    guards: Vec<WorkerGuard>,
}

impl LogGuards {
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Installs the global subscriber with one layer per configured sink
pub fn init(config: &LoggingConfig) -> Result<LogGuards> {
    config.validate()?;

    let filter = EnvFilter::builder()
        .with_default_directive("warn".parse()?)
        .from_env()?
        .add_directive(format!("{}={}", env!("CARGO_CRATE_NAME"), config.level).parse()?);

    let mut layers = Vec::with_capacity(config.sinks.len());
    let mut guards = Vec::with_capacity(config.sinks.len());

    for sink in &config.sinks {
        let (layer, guard) = sink_layer(sink)?;
        layers.push(layer);
        guards.push(guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("tracing subscriber already installed")?;

    Ok(LogGuards { guards })
}

fn sink_layer(sink: &LogSink) -> Result<(BoxedLayer, WorkerGuard)> {
    match &sink.dest {
        LogType::Stdout { color, json } => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

            let layer = if *json {
                fmt::layer().json().with_writer(writer).boxed()
            } else {
                fmt::layer()
                    .compact()
                    .with_timer(LocalTime)
                    .with_ansi(*color)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(writer)
                    .boxed()
            };

            Ok((layer, guard))
        }
        LogType::File {
            path,
            json,
            rotation,
            max_files,
        } => {
            let (writer, guard) = rolling_writer(path, rotation, *max_files)?;

            let layer = if *json {
                fmt::layer().json().with_writer(writer).boxed()
            } else {
                fmt::layer()
                    .with_timer(LocalTime)
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed()
            };

            Ok((layer, guard))
        }
    }
}

/// Splits a log path into the directory and the file name prefix
/// used by the rolling appender
fn split_log_path(path: &Path) -> Result<(PathBuf, String)> {
    let prefix = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Log path {} has no file name", path.display()))?;

    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((directory, prefix.to_string()))
}

fn rolling_writer(
    path: &Path,
    rotation: &FileRotation,
    max_files: usize,
) -> Result<(NonBlocking, WorkerGuard)> {
    let (directory, prefix) = split_log_path(path)?;

    std::fs::create_dir_all(&directory)
        .with_context(|| format!("Cannot create log directory {}", directory.display()))?;

    prune_rotated(&directory, &prefix, max_files)?;

    let appender = match rotation {
        FileRotation::Daily => tracing_appender::rolling::daily(&directory, &prefix),
        FileRotation::Hourly => tracing_appender::rolling::hourly(&directory, &prefix),
        FileRotation::Never => tracing_appender::rolling::never(&directory, &prefix),
    };

    Ok(tracing_appender::non_blocking(appender))
}

/// Deletes all but the newest `keep` files starting with `prefix`, 0 keeps all
fn prune_rotated(directory: &Path, prefix: &str, keep: usize) -> Result<usize> {
    if keep == 0 {
        return Ok(0);
    }

    let mut rotated = Vec::new();
    for entry in std::fs::read_dir(directory)?.flatten() {
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(prefix) {
            continue;
        }

        if let Ok(modified) = entry.metadata().and_then(|meta| meta.modified()) {
            rotated.push((modified, entry.path()));
        }
    }

    // newest first
    rotated.sort_by(|a, b| b.0.cmp(&a.0));

    let mut removed = 0;
    for (_, path) in rotated.into_iter().skip(keep) {
        if std::fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("adslot-logs-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_split_log_path() {
        let (dir, prefix) = split_log_path(Path::new("logs/adslot.log")).unwrap();
        assert_eq!(dir, PathBuf::from("logs"));
        assert_eq!(prefix, "adslot.log");

        let (dir, _) = split_log_path(Path::new("adslot.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
    }

    #[test]
    fn test_prune_keeps_newest_matching_files() {
        let dir = scratch_dir("prune");
        for name in ["adslot.log.1", "adslot.log.2", "adslot.log.3", "other.log"] {
            std::fs::write(dir.join(name), name).unwrap();
        }

        let removed = prune_rotated(&dir, "adslot.log", 2).unwrap();
        assert_eq!(removed, 1);
        assert!(dir.join("other.log").exists());

        let remaining = std::fs::read_dir(&dir)
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with("adslot.log"))
            .count();
        assert_eq!(remaining, 2);

        assert_eq!(prune_rotated(&dir, "adslot.log", 0).unwrap(), 0);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
