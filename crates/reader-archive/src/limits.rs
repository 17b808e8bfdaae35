//! Resource ceilings for archive extraction
//!
//! The limiter is the engine's only defense against runaway work: there is
//! no timeout or cancellation path. Aggregate ceilings (total size, entry
//! count, depth, compression ratio) are fatal and abort the whole call with
//! no partial result; the single-entry size ceiling only skips that entry.
//! All checks are cheap comparisons on container metadata, performed before
//! an entry's content is read.

use reader_core::{ReaderError, Result};

/// Default ceiling on cumulative extracted bytes (512 MB).
pub const DEFAULT_MAX_TOTAL_SIZE: u64 = 512 * 1024 * 1024;

/// Default ceiling on a single entry's declared size (64 MB).
///
/// Entries above this are skipped, not fatal.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Default ceiling on container nesting depth.
///
/// Direct children of the outermost container are at depth 0.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Default ceiling on processed entries per call.
pub const DEFAULT_MAX_FILES: u64 = 4096;

/// Default ceiling on a single entry's declared compression ratio.
pub const DEFAULT_MAX_COMPRESSION_RATIO: f64 = 200.0;

/// Configured ceilings for one extraction call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionLimits {
    /// Ceiling on cumulative extracted bytes across all entries
    pub max_total_size: u64,
    /// Ceiling on a single entry's declared size; oversized entries are skipped
    pub max_file_size: u64,
    /// Ceiling on container nesting depth
    pub max_depth: usize,
    /// Ceiling on processed entries
    pub max_files: u64,
    /// Ceiling on declared uncompressed/compressed ratio per entry
    pub max_compression_ratio: f64,
}

impl Default for ExtractionLimits {
    #[inline]
    fn default() -> Self {
        Self {
            max_total_size: DEFAULT_MAX_TOTAL_SIZE,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            max_files: DEFAULT_MAX_FILES,
            max_compression_ratio: DEFAULT_MAX_COMPRESSION_RATIO,
        }
    }
}

impl ExtractionLimits {
    /// Set the cumulative extracted-bytes ceiling
    #[inline]
    #[must_use = "returns limits with the total-size ceiling configured"]
    pub const fn with_max_total_size(mut self, bytes: u64) -> Self {
        self.max_total_size = bytes;
        self
    }

    /// Set the single-entry size ceiling
    #[inline]
    #[must_use = "returns limits with the file-size ceiling configured"]
    pub const fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Set the nesting-depth ceiling
    #[inline]
    #[must_use = "returns limits with the depth ceiling configured"]
    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the processed-entry ceiling
    #[inline]
    #[must_use = "returns limits with the file-count ceiling configured"]
    pub const fn with_max_files(mut self, count: u64) -> Self {
        self.max_files = count;
        self
    }

    /// Set the compression-ratio ceiling
    #[inline]
    #[must_use = "returns limits with the compression-ratio ceiling configured"]
    pub const fn with_max_compression_ratio(mut self, ratio: f64) -> Self {
        self.max_compression_ratio = ratio;
        self
    }

    /// Fatal check of the depth the walk is about to enter.
    ///
    /// Evaluated *before* a nested container is pushed onto the work-list,
    /// so adversarially deep nesting never gets to allocate a frame.
    ///
    /// # Errors
    ///
    /// [`ReaderError::DepthExceeded`] when `next_depth` passes the ceiling.
    pub fn check_depth(&self, next_depth: usize) -> Result<()> {
        if next_depth > self.max_depth {
            return Err(ReaderError::DepthExceeded {
                depth: next_depth,
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    /// Fatal decompression-bomb check from container metadata.
    ///
    /// Evaluated before the entry is decompressed. `compressed` is `None`
    /// for container formats that record no per-entry compressed size
    /// (RAR, 7Z solid blocks); the aggregate ceilings carry the defense
    /// there. A zero compressed size is only harmless when the declared
    /// uncompressed size is also zero.
    ///
    /// # Errors
    ///
    /// [`ReaderError::CompressionRatioExceeded`] when the declared ratio
    /// passes the ceiling.
    pub fn check_compression_ratio(
        &self,
        name: &str,
        compressed: Option<u64>,
        uncompressed: u64,
    ) -> Result<()> {
        let Some(compressed) = compressed else {
            return Ok(());
        };

        let ratio = if compressed == 0 {
            if uncompressed == 0 {
                return Ok(());
            }
            f64::INFINITY
        } else {
            uncompressed as f64 / compressed as f64
        };

        if ratio > self.max_compression_ratio {
            return Err(ReaderError::CompressionRatioExceeded {
                name: name.to_string(),
                ratio,
                limit: self.max_compression_ratio,
            });
        }
        Ok(())
    }

    /// Non-fatal single-entry ceiling; callers skip entries that fail it.
    #[inline]
    #[must_use = "a false result means the entry must be skipped"]
    pub const fn check_file_size(&self, declared: u64) -> bool {
        declared <= self.max_file_size
    }
}

/// Running totals for one extraction call.
///
/// One tracker lives on the extraction context and is shared by every
/// container frame, so the ceilings are global to the call rather than
/// per-container.
#[derive(Debug, Default)]
pub struct ResourceTracker {
    extracted_bytes: u64,
    file_count: u64,
}

impl ResourceTracker {
    /// Create a tracker with zeroed totals
    #[inline]
    #[must_use = "creating a tracker that is not used is a waste of resources"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more processed entry.
    ///
    /// # Errors
    ///
    /// [`ReaderError::FileCountExceeded`] once the count passes `max_files`.
    pub fn check_file_count(&mut self, limits: &ExtractionLimits) -> Result<()> {
        self.file_count += 1;
        if self.file_count > limits.max_files {
            return Err(ReaderError::FileCountExceeded {
                limit: limits.max_files,
            });
        }
        Ok(())
    }

    /// Add an entry's size to the running total.
    ///
    /// Called first with the declared size before the entry is read, then
    /// again with any measured excess, so a lying header cannot smuggle
    /// bytes past the ceiling.
    ///
    /// # Errors
    ///
    /// [`ReaderError::TotalSizeExceeded`] once the total passes
    /// `max_total_size`.
    pub fn check_total_size(&mut self, limits: &ExtractionLimits, bytes: u64) -> Result<()> {
        self.extracted_bytes = self.extracted_bytes.saturating_add(bytes);
        if self.extracted_bytes > limits.max_total_size {
            return Err(ReaderError::TotalSizeExceeded {
                extracted: self.extracted_bytes,
                limit: limits.max_total_size,
            });
        }
        Ok(())
    }

    /// Cumulative extracted bytes so far
    #[inline]
    #[must_use]
    pub const fn extracted_bytes(&self) -> u64 {
        self.extracted_bytes
    }

    /// Processed entries so far
    #[inline]
    #[must_use]
    pub const fn file_count(&self) -> u64 {
        self.file_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let limits = ExtractionLimits::default();
        assert_eq!(limits.max_total_size, 512 * 1024 * 1024);
        assert_eq!(limits.max_file_size, 64 * 1024 * 1024);
        assert_eq!(limits.max_depth, 5);
        assert_eq!(limits.max_files, 4096);
        assert!((limits.max_compression_ratio - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder_overrides() {
        let limits = ExtractionLimits::default()
            .with_max_total_size(1024)
            .with_max_file_size(256)
            .with_max_depth(2)
            .with_max_files(10)
            .with_max_compression_ratio(50.0);
        assert_eq!(limits.max_total_size, 1024);
        assert_eq!(limits.max_file_size, 256);
        assert_eq!(limits.max_depth, 2);
        assert_eq!(limits.max_files, 10);
        assert!((limits.max_compression_ratio - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_file_count_is_fatal_past_limit() {
        let limits = ExtractionLimits::default().with_max_files(2);
        let mut tracker = ResourceTracker::new();
        assert!(tracker.check_file_count(&limits).is_ok());
        assert!(tracker.check_file_count(&limits).is_ok());
        let err = tracker.check_file_count(&limits).unwrap_err();
        assert!(err.to_string().contains("maximum file count"));
    }

    #[test]
    fn test_total_size_accumulates_across_calls() {
        let limits = ExtractionLimits::default().with_max_total_size(100);
        let mut tracker = ResourceTracker::new();
        assert!(tracker.check_total_size(&limits, 60).is_ok());
        assert_eq!(tracker.extracted_bytes(), 60);
        let err = tracker.check_total_size(&limits, 41).unwrap_err();
        assert!(err.to_string().contains("maximum total size"));
    }

    #[test]
    fn test_total_size_saturates_instead_of_overflowing() {
        let limits = ExtractionLimits::default();
        let mut tracker = ResourceTracker::new();
        tracker.check_total_size(&limits, u64::MAX).unwrap_err();
        assert!(tracker.check_total_size(&limits, u64::MAX).is_err());
    }

    #[test]
    fn test_depth_boundary() {
        let limits = ExtractionLimits::default().with_max_depth(2);
        assert!(limits.check_depth(1).is_ok());
        assert!(limits.check_depth(2).is_ok());
        let err = limits.check_depth(3).unwrap_err();
        assert!(err.to_string().contains("maximum depth"));
    }

    #[test]
    fn test_compression_ratio() {
        let limits = ExtractionLimits::default().with_max_compression_ratio(10.0);
        // 5:1 is fine
        assert!(limits
            .check_compression_ratio("a.txt", Some(100), 500)
            .is_ok());
        // 50:1 trips
        let err = limits
            .check_compression_ratio("bomb.txt", Some(10), 500)
            .unwrap_err();
        assert!(err.to_string().contains("compression ratio"));
        // exactly at the ceiling passes
        assert!(limits
            .check_compression_ratio("edge.txt", Some(10), 100)
            .is_ok());
    }

    #[test]
    fn test_zero_compressed_size_guard() {
        let limits = ExtractionLimits::default();
        // zero-by-zero carries no ratio risk
        assert!(limits.check_compression_ratio("empty", Some(0), 0).is_ok());
        // zero compressed with real payload is an infinite ratio
        assert!(limits
            .check_compression_ratio("weird", Some(0), 4096)
            .is_err());
    }

    #[test]
    fn test_unknown_compressed_size_skips_the_check() {
        let limits = ExtractionLimits::default().with_max_compression_ratio(1.0);
        assert!(limits
            .check_compression_ratio("rar-entry", None, u64::MAX)
            .is_ok());
    }

    #[test]
    fn test_file_size_is_non_fatal() {
        let limits = ExtractionLimits::default().with_max_file_size(1024);
        assert!(limits.check_file_size(1024));
        assert!(!limits.check_file_size(1025));
    }
}
