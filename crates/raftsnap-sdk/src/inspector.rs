use std::fs::File;
use std::io::Read;
use std::path::Path;

use raftsnap_archive::{SnapshotVerifier, VerifiedSnapshot};
use raftsnap_projection::{KvStatsAggregator, ProjectionBuilder};
use raftsnap_stream::{spawn_decoder, DecoderConfig, MAX_RECORD_SIZE};
use raftsnap_types::InspectionReport;
use tracing::{debug, info, warn};

use crate::config::InspectConfig;
use crate::error::{SdkError, SdkResult};

/// Verifies snapshot archives and reports on their contents.
#[derive(Clone, Debug)]
pub struct Inspector {
    config: InspectConfig,
}

impl Inspector {
    pub fn new(config: InspectConfig) -> SdkResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &InspectConfig {
        &self.config
    }

    /// Inspect the archive at `path`.
    pub async fn inspect_path(&self, path: impl AsRef<Path>) -> SdkResult<InspectionReport> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SdkError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "inspecting snapshot");
        self.inspect_reader(file).await
    }

    /// Inspect an archive read from `input`.
    ///
    /// Verification runs to completion before any record is decoded; nothing
    /// is reported for an archive that fails it. The staged `state.bin` is
    /// removed before returning, whatever the outcome.
    pub async fn inspect_reader<R>(&self, input: R) -> SdkResult<InspectionReport>
    where
        R: Read + Send + 'static,
    {
        let verifier = match &self.config.scratch_dir {
            Some(dir) => SnapshotVerifier::with_scratch_dir(dir.clone()),
            None => SnapshotVerifier::new(),
        };
        let snapshot = tokio::task::spawn_blocking(move || verifier.verify(input))
            .await
            .map_err(|e| SdkError::Internal(format!("verification task failed: {e}")))??;

        let report = self.project(&snapshot).await;

        if let Err(e) = snapshot.close() {
            warn!(error = ?e, "failed to remove scratch file");
        }
        report
    }

    async fn project(&self, snapshot: &VerifiedSnapshot) -> SdkResult<InspectionReport> {
        let aggregator = if self.config.kv.enabled {
            KvStatsAggregator::new(self.config.kv.clone())?
        } else {
            KvStatsAggregator::disabled()
        };
        let mut builder = ProjectionBuilder::new(aggregator).load_values(self.config.load_values);

        let state = snapshot.open_state().map_err(SdkError::Staging)?;
        let stream = spawn_decoder(
            state,
            DecoderConfig {
                channel_capacity: self.config.channel_capacity,
                max_record_size: MAX_RECORD_SIZE,
            },
        );
        let summary = stream
            .for_each(|record| {
                builder.apply(record);
                Ok(())
            })
            .await?;

        let built = builder.finish();
        let stats = built.sink.finish();
        let report = InspectionReport::new(
            snapshot.metadata().clone(),
            stats.buckets,
            stats.total,
            summary.records,
            built.projection.len() as u64,
        );
        info!(
            records = report.records_decoded,
            unique_keys = report.unique_keys,
            counted = report.total_count,
            buckets = report.buckets.len(),
            "snapshot inspected"
        );
        Ok(report)
    }
}
