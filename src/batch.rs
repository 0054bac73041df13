//! Directory-tree batch conversion.
//!
//! Two phases: discover every candidate first, then schedule jobs on a
//! bounded worker pool. Keeping discovery separate pins `total` before
//! any job runs, so the final tally is stable and partial progress is
//! meaningful.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use tracing::{error, info};
use walkdir::WalkDir;

use crate::cli;
use crate::error::Result;
use crate::job::ConversionJob;

/// Files smaller than this cannot hold a radiometric payload.
pub const MIN_CANDIDATE_BYTES: u64 = 100_000;

/// Default bounded concurrency for batch runs.
pub const DEFAULT_CONCURRENCY: usize = 4;

const CONTENT_PROBE_BYTES: usize = 1000;
const OUTPUT_EXTENSION: &str = "tiff";

/// A file selected by discovery, consumed by exactly one job.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub path: PathBuf,
    /// Path relative to the batch input root; mirrored under the
    /// output root.
    pub relative: PathBuf,
    pub size: u64,
}

/// Aggregate outcome of a batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchResult {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

/// Case-insensitive extension filter for the supported input set.
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            e == "jpg" || e == "jpeg"
        })
        .unwrap_or(false)
}

/// Best-effort guess whether a file carries a radiometric payload.
///
/// Deliberately permissive: the R-JPEG signature is proprietary, so
/// everything that passes the size floor is accepted unless its name
/// and header both say nothing and the header cannot even be read.
/// False positives cost one failed job; false negatives would silently
/// drop data.
pub fn is_likely_radiometric(path: &Path, size: u64) -> bool {
    if size < MIN_CANDIDATE_BYTES {
        return false;
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_uppercase())
        .unwrap_or_default();
    if name.contains("DJI") || name.contains("_T") || name.contains("_R") {
        return true;
    }

    match probe_header(path) {
        Ok(_) => true,
        Err(_) => false,
    }
}

fn probe_header(path: &Path) -> std::io::Result<bool> {
    let mut head = [0u8; CONTENT_PROBE_BYTES];
    let mut file = File::open(path)?;
    let len = file.read(&mut head)?;
    let head = &head[..len];
    Ok(contains_tag(head, b"DJI") || contains_tag(head, b"FLIR"))
}

fn contains_tag(haystack: &[u8], tag: &[u8]) -> bool {
    haystack.windows(tag.len()).any(|window| window == tag)
}

/// Walks `input_dir` and collects candidate files.
///
/// Walk errors are fatal: an unreadable tree means there is nothing
/// meaningful to schedule.
pub fn discover(input_dir: &Path, recursive: bool) -> Result<Vec<CandidateFile>> {
    let mut walker = WalkDir::new(input_dir);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut candidates = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !has_supported_extension(entry.path()) {
            continue;
        }
        let size = entry.metadata()?.len();
        if !is_likely_radiometric(entry.path(), size) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(input_dir)
            .unwrap_or(entry.path())
            .to_path_buf();
        candidates.push(CandidateFile {
            path: entry.path().to_path_buf(),
            relative,
            size,
        });
    }
    Ok(candidates)
}

/// Converts every candidate under `input_dir`, mirroring the tree
/// under `output_dir` with a `.tiff` extension.
///
/// Jobs run on a dedicated pool of `concurrency` workers. A job
/// failure is logged and counted, never propagated; `total` is fixed
/// once discovery finishes.
pub fn run_batch(
    job: &ConversionJob,
    input_dir: &Path,
    output_dir: &Path,
    recursive: bool,
    concurrency: usize,
) -> Result<BatchResult> {
    let candidates = discover(input_dir, recursive)?;
    let total = candidates.len();
    info!(total, recursive, "discovered candidate radiometric images");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency.max(1))
        .build()?;

    let success = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    let bar = cli::progress_bar(total as u64);
    pool.install(|| {
        candidates
            .par_iter()
            .progress_with(bar)
            .for_each(|candidate| {
                let out_path = output_dir
                    .join(&candidate.relative)
                    .with_extension(OUTPUT_EXTENSION);
                match job.run(&candidate.path, &out_path) {
                    Ok(_) => {
                        success.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(err) => {
                        failed.fetch_add(1, Ordering::Relaxed);
                        error!(
                            path = %candidate.path.display(),
                            size = candidate.size,
                            error = %err,
                            "conversion failed, continuing batch"
                        );
                    }
                }
            });
    });

    let result = BatchResult {
        total,
        success: success.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
    };
    info!(
        total = result.total,
        success = result.success,
        failed = result.failed,
        "batch complete"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceModel;
    use crate::encode::TiffCompression;
    use crate::error::ConvertError;
    use crate::source::RadiometricSource;
    use std::fs;

    fn write_candidate(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; 150_000]).unwrap();
    }

    fn synthetic_job() -> ConversionJob {
        ConversionJob::new(
            RadiometricSource::Synthetic,
            DeviceModel::M30T,
            TiffCompression::None,
        )
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(has_supported_extension(Path::new("a/b.jpg")));
        assert!(has_supported_extension(Path::new("a/b.JPEG")));
        assert!(has_supported_extension(Path::new("a/b.Jpg")));
        assert!(!has_supported_extension(Path::new("a/b.png")));
        assert!(!has_supported_extension(Path::new("a/jpg")));
    }

    #[test]
    fn small_files_are_never_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DJI_0001_T.jpg");
        fs::write(&path, vec![0u8; 1024]).unwrap();
        assert!(!is_likely_radiometric(&path, 1024));
    }

    #[test]
    fn vendor_marker_in_name_accepts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dji_0001.jpg");
        write_candidate(&path);
        assert!(is_likely_radiometric(&path, 150_000));
    }

    #[test]
    fn vendor_tag_in_header_accepts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("untitled.jpg");
        let mut content = vec![0u8; 150_000];
        content[100..104].copy_from_slice(b"FLIR");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        assert!(is_likely_radiometric(&path, 150_000));
    }

    #[test]
    fn unmatched_readable_file_is_accepted_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("untitled.jpg");
        write_candidate(&path);
        assert!(is_likely_radiometric(&path, 150_000));
    }

    #[test]
    fn discovery_counts_only_matching_extensions() {
        let dir = tempfile::tempdir().unwrap();
        write_candidate(&dir.path().join("one.jpg"));
        write_candidate(&dir.path().join("two.JPEG"));
        write_candidate(&dir.path().join("sub/three.jpeg"));
        write_candidate(&dir.path().join("four.png"));
        fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();

        let candidates = discover(dir.path(), true).unwrap();
        assert_eq!(candidates.len(), 3);
        for candidate in &candidates {
            assert!(candidate.relative.is_relative());
            assert!(candidate.size >= MIN_CANDIDATE_BYTES);
        }
    }

    #[test]
    fn non_recursive_discovery_stays_at_top_level() {
        let dir = tempfile::tempdir().unwrap();
        write_candidate(&dir.path().join("top.jpg"));
        write_candidate(&dir.path().join("sub/nested.jpg"));

        let candidates = discover(dir.path(), false).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].relative, Path::new("top.jpg"));
    }

    #[test]
    fn discovery_on_missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(&dir.path().join("absent"), true).unwrap_err();
        assert!(matches!(err, ConvertError::Discovery(_)));
    }

    #[test]
    fn batch_isolates_per_file_failures() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_candidate(&input.path().join("ok_one.jpg"));
        write_candidate(&input.path().join("ok_two.jpg"));
        write_candidate(&input.path().join("bad.jpg"));
        // squat on bad.jpg's output path so its final rename fails
        fs::create_dir_all(output.path().join("bad.tiff")).unwrap();

        let result =
            run_batch(&synthetic_job(), input.path(), output.path(), true, 2).unwrap();
        assert_eq!(
            result,
            BatchResult {
                total: 3,
                success: 2,
                failed: 1
            }
        );
        assert!(output.path().join("ok_one.tiff").exists());
        assert!(output.path().join("ok_two.tiff").exists());
    }

    #[test]
    fn batch_mirrors_subdirectories() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_candidate(&input.path().join("flight1/DJI_0007_T.jpg"));

        let result =
            run_batch(&synthetic_job(), input.path(), output.path(), true, 1).unwrap();
        assert_eq!(result.success, 1);
        assert!(output.path().join("flight1/DJI_0007_T.tiff").exists());
    }

    #[test]
    fn empty_tree_completes_with_zero_total() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let result =
            run_batch(&synthetic_job(), input.path(), output.path(), true, 4).unwrap();
        assert_eq!(result, BatchResult::default());
    }
}
