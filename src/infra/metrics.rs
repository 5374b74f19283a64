// ============================================================
// Layer 6 - Metrics Logger
// ============================================================
// Appends training history to a CSV file, one row per epoch.
//
// Output file: <dir>/<model>_metrics.csv
//
//   epoch,loss,accuracy
//   1,0.542113,0.771204
//   2,0.497830,0.790561
//
// The autoencoder reports no accuracy, so that column is left
// empty for its rows. Runs append to the same file, so a file
// may hold several training runs back to back.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::epoch::EpochMetrics;

pub const CSV_HEADER: &str = "epoch,loss,accuracy";

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Nothing touches the disk until the first `log_all` with at
    /// least one epoch, so predict runs and rejected requests leave
    /// no file behind.
    pub fn new(dir: impl Into<PathBuf>, model: &str) -> Self {
        let csv_path = dir.into().join(format!("{model}_metrics.csv"));
        Self { csv_path }
    }

    /// Append every epoch in one open/close, creating the directory
    /// and writing the header if the file is new.
    pub fn log_all(&self, history: &[EpochMetrics]) -> Result<()> {
        if history.is_empty() {
            return Ok(());
        }

        if let Some(dir) = self.csv_path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;
        }

        let is_new = !self.csv_path.exists();
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        if is_new {
            writeln!(f, "{CSV_HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", self.csv_path.display());
        }

        for m in history {
            let accuracy = m.accuracy.map(|a| format!("{a:.6}")).unwrap_or_default();
            writeln!(f, "{},{:.6},{}", m.epoch, m.loss, accuracy)?;
        }

        tracing::debug!("Logged {} epochs to '{}'", history.len(), self.csv_path.display());
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_header_once_and_appends() {
        let dir = tempfile::tempdir().unwrap();

        let logger = MetricsLogger::new(dir.path(), "cnn");
        logger.log_all(&[EpochMetrics::with_accuracy(1, 0.5, 0.8)]).unwrap();

        // A second logger on the same file must not repeat the header
        let again = MetricsLogger::new(dir.path(), "cnn");
        again.log_all(&[EpochMetrics::with_accuracy(2, 0.25, 0.9)]).unwrap();

        let text = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(
            text,
            "epoch,loss,accuracy\n1,0.500000,0.800000\n2,0.250000,0.900000\n"
        );
    }

    #[test]
    fn test_loss_only_rows_leave_accuracy_empty() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path(), "autoencoder");
        logger
            .log_all(&[EpochMetrics::new(1, 1.5), EpochMetrics::new(2, 1.25)])
            .unwrap();

        assert!(logger.csv_path().ends_with("autoencoder_metrics.csv"));
        let text = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(text, "epoch,loss,accuracy\n1,1.500000,\n2,1.250000,\n");
    }

    #[test]
    fn test_file_created_lazily() {
        let dir    = tempfile::tempdir().unwrap();
        let nested = dir.path().join("runs").join("today");
        let logger = MetricsLogger::new(&nested, "cnn");
        assert!(!nested.exists());

        logger.log_all(&[]).unwrap();
        assert!(!logger.csv_path().exists());

        logger.log_all(&[EpochMetrics::with_accuracy(1, 0.5, 0.8)]).unwrap();
        assert_eq!(fs::read_to_string(logger.csv_path()).unwrap().lines().count(), 2);
    }
}
