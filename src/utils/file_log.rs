use crate::utils::app_paths::AppPaths;
use crate::utils::logging::LogEntry;
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

static FILE_LOGGER: OnceLock<FileLogger> = OnceLock::new();

/// Appends formatted log entries to a timestamped file, one file per run.
pub struct FileLogger {
    log_file: Mutex<Option<File>>,
    log_path: PathBuf,
}

impl FileLogger {
    /// Open a new log file in `log_dir` and point `latest.log` at it.
    pub fn create_in(log_dir: &Path) -> Self {
        let _ = std::fs::create_dir_all(log_dir);

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("dataview_{}.log", timestamp));
        let latest_path = log_dir.join("latest.log");

        #[cfg(unix)]
        {
            let _ = std::fs::remove_file(&latest_path);
            let _ = std::os::unix::fs::symlink(&log_path, &latest_path);
        }

        #[cfg(windows)]
        {
            let _ = std::fs::write(
                &latest_path,
                format!("Current log file: {}\n", log_path.display()),
            );
        }

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .ok();

        Self {
            log_file: Mutex::new(log_file),
            log_path,
        }
    }

    pub fn write_entry(&self, entry: &LogEntry) {
        if let Ok(mut file_opt) = self.log_file.lock() {
            if let Some(ref mut file) = *file_opt {
                let _ = writeln!(file, "{}", entry.format_for_display());
                let _ = file.flush();
            }
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn flush(&self) {
        if let Ok(mut file_opt) = self.log_file.lock() {
            if let Some(ref mut file) = *file_opt {
                let _ = file.flush();
            }
        }
    }
}

fn default_log_dir() -> PathBuf {
    AppPaths::log_dir().unwrap_or_else(|_| std::env::temp_dir().join("parquet-dataview"))
}

/// Initialize the global file logger
pub fn init_file_logger() -> &'static FileLogger {
    FILE_LOGGER.get_or_init(|| FileLogger::create_in(&default_log_dir()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tracing::Level;

    #[test]
    fn test_writes_entries_to_file() {
        let dir = TempDir::new().unwrap();
        let logger = FileLogger::create_in(dir.path());
        logger.write_entry(&LogEntry::new(Level::WARN, "render", "bad chart".to_string()));
        logger.flush();

        let content = std::fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("WARN [render] bad chart"));
        #[cfg(unix)]
        assert!(dir.path().join("latest.log").exists());
    }
}
