//! End-to-end runs through the public API with a scripted executor:
//! completeness, idempotence, failure isolation, the concurrency bound, and
//! graceful cancellation.

use featmill::engine::JobExecutor;
use featmill::{FeatmillError, Opts, extract_dir};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Executor that writes a marker artifact, with scripted failures and
/// in-flight accounting.
#[derive(Default)]
struct MockExecutor {
    invocations: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
    fail_inputs: Mutex<HashSet<PathBuf>>,
    delay_ms: u64,
}

impl MockExecutor {
    fn failing_on(inputs: &[PathBuf]) -> Self {
        Self {
            fail_inputs: Mutex::new(inputs.iter().cloned().collect()),
            ..Self::default()
        }
    }
}

impl JobExecutor for MockExecutor {
    fn execute(&self, input: &Path, output: &Path) -> Result<(), FeatmillError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        if self.delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(self.delay_ms));
        }
        let fail = self.fail_inputs.lock().unwrap().contains(input);
        let res = if fail {
            Err(FeatmillError::Extractor {
                input: input.to_path_buf(),
                reason: "scripted failure".to_string(),
            })
        } else {
            fs::write(output, b"feature").map_err(|source| FeatmillError::Io {
                path: output.to_path_buf(),
                source,
            })
        };
        self.active.fetch_sub(1, Ordering::SeqCst);
        res
    }
}

fn setup_tree(files: &[&str]) -> (tempfile::TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("audio");
    let out = dir.path().join("out");
    for rel in files {
        let path = audio.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"mp3-bytes").unwrap();
    }
    (dir, audio, out)
}

fn count_files(dir: &Path) -> usize {
    let mut count = 0;
    for entry in fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        if entry.file_type().unwrap().is_dir() {
            count += count_files(&entry.path());
        } else {
            count += 1;
        }
    }
    count
}

fn test_opts(out: &Path) -> Opts {
    Opts {
        out_dir: out.to_path_buf(),
        pattern: "**/*.mp3".to_string(),
        artifact_ext: "feat".to_string(),
        jobs: 2,
        ..Opts::default()
    }
}

#[test]
fn test_run_produces_one_artifact_per_input() {
    let (_dir, audio, out) = setup_tree(&["a/x.mp3", "a/y.mp3", "b/z.mp3"]);
    let executor = MockExecutor::default();

    let summary = extract_dir(&audio, &test_opts(&out), &executor, None).unwrap();
    assert_eq!(summary.candidates, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.succeeded, 3);
    assert!(summary.failed.is_empty());
    assert!(!summary.cancelled);

    for rel in ["a/x.feat", "a/y.feat", "b/z.feat"] {
        assert!(out.join(rel).is_file(), "missing artifact {rel}");
    }
    assert_eq!(executor.invocations.load(Ordering::SeqCst), 3);
}

#[test]
fn test_rerun_skips_finished_outputs() {
    let (_dir, audio, out) = setup_tree(&["a/x.mp3", "a/y.mp3", "b/z.mp3"]);
    let opts = test_opts(&out);

    extract_dir(&audio, &opts, &MockExecutor::default(), None).unwrap();

    let second = MockExecutor::default();
    let summary = extract_dir(&audio, &opts, &second, None).unwrap();
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.succeeded, 0);
    assert!(summary.failed.is_empty());
    // The idempotence contract: zero external computations on the second run.
    assert_eq!(second.invocations.load(Ordering::SeqCst), 0);
}

#[test]
fn test_partial_rerun_dispatches_only_the_remainder() {
    let (_dir, audio, out) = setup_tree(&["a/x.mp3", "a/y.mp3", "b/z.mp3"]);
    // One artifact already exists from a previous partial run.
    fs::create_dir_all(out.join("a")).unwrap();
    fs::write(out.join("a/x.feat"), b"feature").unwrap();

    let executor = MockExecutor::default();
    let summary = extract_dir(&audio, &test_opts(&out), &executor, None).unwrap();
    assert_eq!(summary.candidates, 3);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(executor.invocations.load(Ordering::SeqCst), 2);
}

#[test]
fn test_force_recomputes_existing_outputs() {
    let (_dir, audio, out) = setup_tree(&["a/x.mp3", "a/y.mp3"]);
    let mut opts = test_opts(&out);
    extract_dir(&audio, &opts, &MockExecutor::default(), None).unwrap();

    opts.force = true;
    let second = MockExecutor::default();
    let summary = extract_dir(&audio, &opts, &second, None).unwrap();
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(second.invocations.load(Ordering::SeqCst), 2);
}

#[test]
fn test_one_failure_does_not_abort_siblings() {
    let (_dir, audio, out) = setup_tree(&["a/x.mp3", "a/y.mp3", "b/z.mp3"]);
    // Canonicalize so the scripted path matches what dispatch sees.
    let bad_input = audio.canonicalize().unwrap().join("a/y.mp3");
    let executor = MockExecutor::failing_on(std::slice::from_ref(&bad_input));

    let summary = extract_dir(&audio, &test_opts(&out), &executor, None).unwrap();
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, vec![bad_input.clone()]);
    assert!(out.join("a/x.feat").is_file());
    assert!(out.join("b/z.feat").is_file());
    assert!(!out.join("a/y.feat").exists());

    // Recovery is a plain rerun: only the failed input is dispatched again.
    let retry = MockExecutor::default();
    let summary = extract_dir(&audio, &test_opts(&out), &retry, None).unwrap();
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(retry.invocations.load(Ordering::SeqCst), 1);
    assert!(out.join("a/y.feat").is_file());
}

#[test]
fn test_concurrency_never_exceeds_limit() {
    let files: Vec<String> = (0..12).map(|i| format!("part/{i}.mp3")).collect();
    let refs: Vec<&str> = files.iter().map(String::as_str).collect();
    let (_dir, audio, out) = setup_tree(&refs);

    let executor = MockExecutor {
        delay_ms: 25,
        ..MockExecutor::default()
    };
    let mut opts = test_opts(&out);
    opts.jobs = 3;

    let summary = extract_dir(&audio, &opts, &executor, None).unwrap();
    assert_eq!(summary.succeeded, 12);
    assert_eq!(executor.invocations.load(Ordering::SeqCst), 12);
    assert!(
        executor.max_active.load(Ordering::SeqCst) <= 3,
        "pool exceeded the concurrency limit"
    );
}

#[test]
fn test_zero_concurrency_is_a_config_error() {
    let (_dir, audio, out) = setup_tree(&["a/x.mp3"]);
    let mut opts = test_opts(&out);
    opts.jobs = 0;
    let err = extract_dir(&audio, &opts, &MockExecutor::default(), None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FeatmillError>(),
        Some(FeatmillError::Config(_))
    ));
}

#[test]
fn test_missing_audio_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let missing = dir.path().join("no-audio");
    let err = extract_dir(&missing, &test_opts(&out), &MockExecutor::default(), None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FeatmillError>(),
        Some(FeatmillError::NotFound(_))
    ));
}

#[test]
fn test_midrun_cancel_finishes_started_jobs() {
    let files: Vec<String> = (0..8).map(|i| format!("part/{i}.mp3")).collect();
    let refs: Vec<&str> = files.iter().map(String::as_str).collect();
    let (_dir, audio, out) = setup_tree(&refs);

    // Raises the stop flag from inside a running job, then finishes the
    // job normally: admissions must stop, this execution must not.
    struct CancellingExecutor {
        flag: Arc<AtomicBool>,
        started: AtomicUsize,
    }

    impl JobExecutor for CancellingExecutor {
        fn execute(&self, _input: &Path, output: &Path) -> Result<(), FeatmillError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            self.flag.store(true, Ordering::Relaxed);
            std::thread::sleep(Duration::from_millis(10));
            fs::write(output, b"feature").map_err(|source| FeatmillError::Io {
                path: output.to_path_buf(),
                source,
            })
        }
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let executor = CancellingExecutor {
        flag: Arc::clone(&cancel),
        started: AtomicUsize::new(0),
    };
    let mut opts = test_opts(&out);
    opts.jobs = 2;

    let summary = extract_dir(&audio, &opts, &executor, Some(cancel)).unwrap();
    let started = executor.started.load(Ordering::SeqCst);

    assert!(summary.cancelled);
    // Every claimed job ran to completion and was reported; no slot claimed
    // new work after the flag went up.
    assert!(started >= 1);
    assert!(started < 8, "admissions did not stop");
    assert_eq!(summary.succeeded, started);
    assert!(summary.failed.is_empty());

    assert_eq!(
        count_files(&out),
        started,
        "finished artifacts must match started jobs"
    );
}

#[test]
fn test_unwritable_artifact_dir_fails_that_job_only() {
    let (_dir, audio, out) = setup_tree(&["a/x.mp3", "b/y.mp3"]);
    // A regular file where the artifact directory should go: preparing
    // out/a/x.feat fails before dispatch, b/y.mp3 is unaffected.
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("a"), b"not a directory").unwrap();

    let executor = MockExecutor::default();
    let summary = extract_dir(&audio, &test_opts(&out), &executor, None).unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(
        summary.failed,
        vec![audio.canonicalize().unwrap().join("a/x.mp3")]
    );
    assert!(out.join("b/y.feat").is_file());
    // The pre-failed job never reaches the pool.
    assert_eq!(executor.invocations.load(Ordering::SeqCst), 1);
}

#[test]
fn test_cancellation_drains_without_new_work() {
    let (_dir, audio, out) = setup_tree(&["a/x.mp3", "a/y.mp3", "b/z.mp3"]);
    let executor = MockExecutor::default();
    // Stop signal arrives before any slot claims work.
    let cancel = Arc::new(AtomicBool::new(true));

    let summary = extract_dir(&audio, &test_opts(&out), &executor, Some(cancel)).unwrap();
    assert!(summary.cancelled);
    assert_eq!(summary.succeeded, 0);
    assert!(summary.failed.is_empty());
    assert_eq!(executor.invocations.load(Ordering::SeqCst), 0);
}

// --- CommandExecutor against real processes ---

#[cfg(unix)]
mod command_executor {
    use featmill::engine::{CommandExecutor, JobExecutor};
    use featmill::{FeatmillError, extract_dir};
    use std::fs;

    #[test]
    fn test_command_executor_renames_finished_artifact() {
        let (_dir, audio, out) = super::setup_tree(&["a/x.mp3", "b/z.mp3"]);
        // `cp input tmp` satisfies the extractor contract: the artifact is
        // fully written before exit 0, and the pool renames it into place.
        let executor = CommandExecutor::new("cp", Vec::new());

        let summary = extract_dir(&audio, &super::test_opts(&out), &executor, None).unwrap();
        assert_eq!(summary.succeeded, 2);
        assert_eq!(fs::read(out.join("a/x.feat")).unwrap(), b"mp3-bytes");
        assert!(!out.join("a/x.feat.part").exists());
    }

    #[test]
    fn test_command_executor_failure_leaves_no_artifact() {
        let (_dir, audio, out) = super::setup_tree(&["a/x.mp3"]);
        let executor = CommandExecutor::new("false", Vec::new());

        let summary = extract_dir(&audio, &super::test_opts(&out), &executor, None).unwrap();
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed.len(), 1);
        assert!(!out.join("a/x.feat").exists());
        assert!(!out.join("a/x.feat.part").exists());
    }

    #[test]
    fn test_command_executor_rejects_silent_success() {
        // `true` exits 0 without writing anything; that must not count as a
        // finished artifact.
        let executor = CommandExecutor::new("true", Vec::new());
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("x.mp3");
        fs::write(&input, b"mp3-bytes").unwrap();
        let output = dir.path().join("x.feat");

        let err = executor.execute(&input, &output).unwrap_err();
        assert!(matches!(err, FeatmillError::Extractor { .. }));
        assert!(!output.exists());
    }
}
