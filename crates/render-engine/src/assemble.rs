//! Clip assembly: extract each interval, then join them into one video.
//!
//! Segments are written into a scratch directory that is removed when
//! assembly returns, whatever the outcome.

use std::path::{Path, PathBuf};

use serde::Serialize;

use zoomies_common::error::{ZoomiesError, ZoomiesResult};
use zoomies_processing_core::intervals::{sorted_by_start, TimeInterval};

use crate::backend::VideoBackend;

/// What happened to one interval during extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SegmentResult {
    Extracted { interval: TimeInterval },
    Skipped { interval: TimeInterval, reason: String },
}

impl SegmentResult {
    pub fn interval(&self) -> &TimeInterval {
        match self {
            Self::Extracted { interval } | Self::Skipped { interval, .. } => interval,
        }
    }

    pub fn is_extracted(&self) -> bool {
        matches!(self, Self::Extracted { .. })
    }
}

/// Whether an output video was written.
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyOutcome {
    Produced(PathBuf),
    /// No interval could be extracted; nothing was written.
    Empty,
}

/// Result of [`ClipAssembler::assemble`].
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub outcome: AssemblyOutcome,
    /// One entry per interval, in ascending start order.
    pub segments: Vec<SegmentResult>,
}

impl Assembly {
    pub fn extracted_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_extracted()).count()
    }
}

/// Cuts intervals out of a source video and concatenates them.
pub struct ClipAssembler<'a> {
    backend: &'a dyn VideoBackend,
}

impl<'a> ClipAssembler<'a> {
    pub fn new(backend: &'a dyn VideoBackend) -> Self {
        Self { backend }
    }

    /// Probe `source` for its duration, then assemble.
    pub fn assemble(
        &self,
        source: &Path,
        intervals: &[TimeInterval],
        output: &Path,
    ) -> ZoomiesResult<Assembly> {
        let info = self.backend.probe(source)?;
        self.assemble_with_duration(source, info.duration_secs, intervals, output)
    }

    /// Assemble against a known source duration.
    pub fn assemble_with_duration(
        &self,
        source: &Path,
        source_duration_secs: f64,
        intervals: &[TimeInterval],
        output: &Path,
    ) -> ZoomiesResult<Assembly> {
        if !source.exists() {
            return Err(ZoomiesError::FileNotFound {
                path: source.to_path_buf(),
            });
        }

        let scratch = tempfile::Builder::new()
            .prefix("zoomies-segments-")
            .tempdir()?;

        let mut segments = Vec::with_capacity(intervals.len());
        let mut extracted_paths = Vec::new();

        for (idx, interval) in sorted_by_start(intervals).into_iter().enumerate() {
            let dest = scratch.path().join(format!("segment-{idx:04}.mp4"));
            match self.extract_one(source, source_duration_secs, &interval, &dest) {
                Ok(()) => {
                    extracted_paths.push(dest);
                    segments.push(SegmentResult::Extracted { interval });
                }
                Err(err) => {
                    tracing::warn!(
                        start_secs = interval.start_secs,
                        end_secs = interval.end_secs,
                        error = %err,
                        "Skipping segment"
                    );
                    segments.push(SegmentResult::Skipped {
                        interval,
                        reason: err.to_string(),
                    });
                }
            }
        }

        if extracted_paths.is_empty() {
            tracing::warn!(
                intervals = intervals.len(),
                "No segments extracted; no output written"
            );
            return Ok(Assembly {
                outcome: AssemblyOutcome::Empty,
                segments,
            });
        }

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        self.backend.concat_segments(&extracted_paths, output)?;

        tracing::info!(
            backend = self.backend.name(),
            output = %output.display(),
            extracted = extracted_paths.len(),
            skipped = segments.len() - extracted_paths.len(),
            "Highlight reel written"
        );

        Ok(Assembly {
            outcome: AssemblyOutcome::Produced(output.to_path_buf()),
            segments,
        })
    }

    fn extract_one(
        &self,
        source: &Path,
        source_duration_secs: f64,
        interval: &TimeInterval,
        dest: &Path,
    ) -> ZoomiesResult<()> {
        if interval.end_secs > source_duration_secs {
            return Err(ZoomiesError::extraction(
                interval.start_secs,
                interval.end_secs,
                format!("source video is only {source_duration_secs:.3}s long"),
            ));
        }
        if interval.duration_secs() <= 0.0 {
            return Err(ZoomiesError::extraction(
                interval.start_secs,
                interval.end_secs,
                "interval is empty",
            ));
        }
        self.backend.extract_segment(source, interval, dest)
    }
}
