//! Run orchestration: authenticate, reconcile, hydrate, report.
//!
//! One run is strictly sequential: authenticate → load ids → compute the
//! work set from persisted state → loop (fetch, persist, pace) → final
//! flush → summary. Resumption works across runs, not within one: a
//! killed run loses whatever sat in the unflushed buffer and picks the
//! rest up next time from the store and failure log.
//!
//! Two simultaneous runs against one output store are unsupported: both
//! would compute overlapping work sets and race on appends.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use birdbath_core::{
    CsvBatchWriter, FailureLog, Pacer, RetryPolicy, SharedProgress, fmt_num, ledger,
};

use crate::fetcher::{FetchFailure, Fetcher};
use crate::record::TweetRecord;
use crate::session::{Credentials, Session};
use crate::stats::RunSummary;

/// Everything a run needs, resolved from CLI flags and config file by
/// the binary.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub failed: PathBuf,
    pub cookie_file: PathBuf,
    pub base_url: String,
    pub batch_size: usize,
    pub limit: i64,
    pub retry: RetryPolicy,
    pub pacer: Pacer,
    pub credentials: Option<Credentials>,
}

/// Main entry point for the hydrate command.
pub fn run(config: &RunConfig, progress: &SharedProgress) -> anyhow::Result<ExitCode> {
    let session = Session::establish(
        &config.base_url,
        &config.cookie_file,
        config.credentials.as_ref(),
    )
    .context("Authentication failed")?;

    let all_ids = match ledger::load_ids(&config.input) {
        Ok(ids) => ids,
        Err(e) => {
            log::error!("Error reading input file {}: {e}", config.input.display());
            return Ok(ExitCode::FAILURE);
        }
    };

    let hydrated = ledger::hydrated_ids(&config.output);
    let failed = ledger::failed_ids(&config.failed);
    let work_set = ledger::work_set(&all_ids, &hydrated, &failed, config.limit);
    log::info!("Tweets to hydrate this run: {}", fmt_num(work_set.len()));

    let fetcher = Fetcher::new(&session, config.retry);
    let mut writer = CsvBatchWriter::new(&config.output);
    let failure_log = FailureLog::new(&config.failed);

    let start = Instant::now();
    let counts = hydrate_all(
        &work_set,
        |id| fetcher.fetch_one(id),
        &mut writer,
        &failure_log,
        &config.pacer,
        config.batch_size,
        progress,
    );

    let summary = RunSummary {
        success: counts.success,
        failed: counts.failed,
        elapsed: start.elapsed(),
        output: config.output.clone(),
    };
    if progress.is_tty() {
        progress.println(summary.format_table());
    } else {
        summary.log();
    }
    Ok(ExitCode::SUCCESS)
}

/// Success/failure tallies for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunCounts {
    pub success: usize,
    pub failed: usize,
}

/// The sequential hydration loop, generic over the fetch operation so
/// tests can drive it without a live session.
///
/// Successes and failures both advance the flush cadence: the store is
/// flushed every `batch_size` processed ids and once more at the end if
/// anything is still buffered. Failures hit the failure log immediately.
pub fn hydrate_all(
    work_set: &[String],
    mut fetch: impl FnMut(&str) -> Result<TweetRecord, FetchFailure>,
    writer: &mut CsvBatchWriter<TweetRecord>,
    failure_log: &FailureLog,
    pacer: &Pacer,
    batch_size: usize,
    progress: &SharedProgress,
) -> RunCounts {
    let total = work_set.len();
    let pb = progress.run_bar(total as u64);
    let mut counts = RunCounts::default();

    for (index, id) in work_set.iter().enumerate() {
        let index = index + 1;
        match fetch(id) {
            Ok(record) => {
                writer.push(record);
                counts.success += 1;
            }
            Err(failure) => {
                counts.failed += 1;
                if let Err(e) = failure_log.record(&failure.id) {
                    log::error!("Error writing {}: {e}", failure_log.path().display());
                }
            }
        }

        if batch_size > 0 && index % batch_size == 0 {
            // A failed flush already dropped its rows; the next run
            // re-fetches them.
            match writer.flush() {
                Err(e) => log::error!("Error saving batch at index {index}: {e}"),
                Ok(rows) if rows > 0 => log::info!("Batch saved: {index}/{total}"),
                Ok(_) => {}
            }
        }

        pb.set_position(index as u64);
        pb.set_message(format!("{} ok / {} failed", counts.success, counts.failed));

        pacer.pause();
    }

    if !writer.is_empty() {
        if let Err(e) = writer.flush() {
            log::error!("Error saving final batch: {e}");
        }
    }
    pb.finish_and_clear();
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    use birdbath_core::ProgressContext;

    fn record(id: &str) -> TweetRecord {
        TweetRecord {
            id: id.to_string(),
            text: format!("tweet {id}"),
            created_at: "Mon Jan 01 00:00:00 +0000 2024".to_string(),
            like_count: 1,
            retweet_count: 0,
            lang: "en".to_string(),
            username: "wren".to_string(),
        }
    }

    fn failure(id: &str) -> FetchFailure {
        FetchFailure {
            id: id.to_string(),
            message: "tweet not available".to_string(),
        }
    }

    fn ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| i.to_string()).collect()
    }

    fn quiet_pacer() -> Pacer {
        Pacer::new(Duration::ZERO, Duration::ZERO)
    }

    fn progress() -> SharedProgress {
        Arc::new(ProgressContext::new())
    }

    #[test]
    fn counts_split_success_and_failure() {
        let dir = TempDir::new().unwrap();
        let mut writer = CsvBatchWriter::new(dir.path().join("out.csv"));
        let failure_log = FailureLog::new(dir.path().join("failed.txt"));

        let work = ids(4);
        let counts = hydrate_all(
            &work,
            |id| {
                if id == "2" {
                    Err(failure(id))
                } else {
                    Ok(record(id))
                }
            },
            &mut writer,
            &failure_log,
            &quiet_pacer(),
            25,
            &progress(),
        );

        assert_eq!(counts, RunCounts { success: 3, failed: 1 });
        let failed = std::fs::read_to_string(failure_log.path()).unwrap();
        assert_eq!(failed, "2\n");
    }

    #[test]
    fn batch_boundary_flushes_at_modulus_and_end() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.csv");
        let mut writer = CsvBatchWriter::new(&out);
        let failure_log = FailureLog::new(dir.path().join("failed.txt"));

        // Observe the store from inside the fetch closure: row counts at
        // ids 26 and 51 prove the intermediate flushes landed at 25 and 50.
        let out_probe = out.clone();
        let rows_on_disk = move || -> usize {
            if !out_probe.exists() {
                return 0;
            }
            std::fs::read_to_string(&out_probe)
                .unwrap()
                .lines()
                .count()
                .saturating_sub(1) // header
        };

        let work = ids(60);
        let mut seen_at_26 = None;
        let mut seen_at_51 = None;
        let counts = hydrate_all(
            &work,
            |id| {
                match id {
                    "26" => seen_at_26 = Some(rows_on_disk()),
                    "51" => seen_at_51 = Some(rows_on_disk()),
                    _ => {}
                }
                Ok(record(id))
            },
            &mut writer,
            &failure_log,
            &quiet_pacer(),
            25,
            &progress(),
        );

        assert_eq!(counts.success, 60);
        assert_eq!(seen_at_26, Some(25));
        assert_eq!(seen_at_51, Some(50));

        let content = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 61); // header + 60 rows
        let header = "id,text,created_at,like_count,retweet_count,lang,username";
        assert_eq!(lines[0], header);
        assert_eq!(lines.iter().filter(|l| **l == header).count(), 1);
    }

    #[test]
    fn failures_advance_the_flush_cadence() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.csv");
        let mut writer = CsvBatchWriter::new(&out);
        let failure_log = FailureLog::new(dir.path().join("failed.txt"));

        // 3 ids, batch 2, second one fails: flush fires after id 2
        // with a single buffered row.
        let out_probe = out.clone();
        let mut rows_at_3 = None;
        let work = ids(3);
        hydrate_all(
            &work,
            |id| {
                if id == "3" {
                    rows_at_3 = Some(
                        std::fs::read_to_string(&out_probe)
                            .unwrap()
                            .lines()
                            .count(),
                    );
                }
                if id == "2" {
                    Err(failure(id))
                } else {
                    Ok(record(id))
                }
            },
            &mut writer,
            &failure_log,
            &quiet_pacer(),
            2,
            &progress(),
        );

        assert_eq!(rows_at_3, Some(2)); // header + row for id 1
    }

    #[test]
    fn zero_batch_size_flushes_only_at_end() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.csv");
        let mut writer = CsvBatchWriter::new(&out);
        let failure_log = FailureLog::new(dir.path().join("failed.txt"));

        let work = ids(5);
        let counts = hydrate_all(
            &work,
            |id| Ok(record(id)),
            &mut writer,
            &failure_log,
            &quiet_pacer(),
            0,
            &progress(),
        );

        assert_eq!(counts.success, 5);
        assert_eq!(std::fs::read_to_string(&out).unwrap().lines().count(), 6);
    }

    #[test]
    fn empty_work_set_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.csv");
        let mut writer = CsvBatchWriter::new(&out);
        let failure_log = FailureLog::new(dir.path().join("failed.txt"));

        let counts = hydrate_all(
            &[],
            |_| unreachable!("no ids to fetch"),
            &mut writer,
            &failure_log,
            &quiet_pacer(),
            25,
            &progress(),
        );

        assert_eq!(counts, RunCounts::default());
        assert!(!out.exists());
        assert!(!failure_log.path().exists());
    }

    #[test]
    fn flush_failure_is_survived_and_rows_are_lost() {
        let dir = TempDir::new().unwrap();
        // Output path is a directory: every flush fails
        let mut writer = CsvBatchWriter::new(dir.path());
        let failure_log = FailureLog::new(dir.path().join("failed.txt"));

        let work = ids(3);
        let counts = hydrate_all(
            &work,
            |id| Ok(record(id)),
            &mut writer,
            &failure_log,
            &quiet_pacer(),
            2,
            &progress(),
        );

        // The run completes and still reports what it fetched
        assert_eq!(counts.success, 3);
        assert!(writer.is_empty());
    }
}
