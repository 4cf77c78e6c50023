use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use leadflow_core::imports::{ImportOutcome, ImportProgress, ImportProgressReporter};

/// Logs import progress and forwards each snapshot to the command loop.
pub struct ChannelProgressReporter {
    tx: UnboundedSender<ImportProgress>,
}

impl ChannelProgressReporter {
    pub fn new() -> (Self, UnboundedReceiver<ImportProgress>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ImportProgressReporter for ChannelProgressReporter {
    fn report_import_start(&self, file_name: &str) {
        tracing::info!("Submitting {}", file_name);
    }

    fn report_progress(&self, progress: &ImportProgress) {
        tracing::debug!(
            batch_id = %progress.batch_id,
            status = %progress.status,
            percent = progress.percent,
            "Import progress"
        );
        // The receiver is gone once the command stopped listening
        let _ = self.tx.send(progress.clone());
    }

    fn report_import_complete(&self, outcome: &ImportOutcome) {
        if outcome.success {
            tracing::info!("{}", outcome.message);
        } else {
            tracing::warn!("Import failed: {}", outcome.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadflow_core::imports::ImportBatchStatus;

    #[test]
    fn test_progress_is_forwarded() {
        let (reporter, mut rx) = ChannelProgressReporter::new();
        let progress = ImportProgress {
            batch_id: "batch-1".to_string(),
            filename: "leads.csv".to_string(),
            status: ImportBatchStatus::Processing,
            processed_rows: 5,
            total_rows: 10,
            percent: 50,
            success_count: 5,
            error_count: 0,
            duplicate_count: 0,
        };

        reporter.report_progress(&progress);
        drop(reporter);

        assert_eq!(rx.try_recv().unwrap(), progress);
        assert!(rx.try_recv().is_err());
    }
}
