use crate::domain::models::IterationRecord;
use crate::services::layout::RunLayout;
use std::io::Write;
use std::path::Path;

/// Append-only run and per-iteration log files, mirrored to the `log` facade.
///
/// Writes are best-effort: a log file that cannot be opened never aborts a
/// run, it only produces a warning on stderr.
#[derive(Debug, Clone)]
pub struct RunLog {
    layout: RunLayout,
}

impl RunLog {
    pub fn new(layout: RunLayout) -> Self {
        Self { layout }
    }

    pub fn run(&self, msg: &str) {
        log::info!("{}", msg);
        append_line(&self.layout.run_log(), msg);
    }

    pub fn iteration(&self, iteration: usize, msg: &str) {
        log::info!("[It_{}] {}", iteration, msg);
        append_line(&self.layout.iteration_log(iteration), msg);
    }

    /// Decisions go to both files.
    pub fn decision(&self, iteration: usize, msg: &str) {
        log::info!("[It_{}] {}", iteration, msg);
        append_line(&self.layout.iteration_log(iteration), msg);
        append_line(&self.layout.run_log(), msg);
    }

    pub fn failure(&self, iteration: Option<usize>, msg: &str) {
        match iteration {
            Some(i) => {
                log::error!("[It_{}] {}", i, msg);
                append_line(&self.layout.iteration_log(i), msg);
            }
            None => log::error!("{}", msg),
        }
        append_line(&self.layout.run_log(), msg);
    }

    /// One JSON line per finalized iteration in `history.jsonl`.
    pub fn record(&self, record: &IterationRecord) {
        match serde_json::to_string(record) {
            Ok(line) => append_line(&self.layout.history(), &line),
            Err(e) => log::warn!("could not serialize iteration record: {}", e),
        }
    }
}

fn append_line(path: &Path, msg: &str) {
    let line = format!("{}\n", msg);
    let res = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut f| f.write_all(line.as_bytes()));
    if let Err(e) = res {
        log::warn!("could not append to {}: {}", path.display(), e);
    }
}

/// Reads `history.jsonl` back into the audit trail.
pub fn read_history(layout: &RunLayout) -> anyhow::Result<Vec<IterationRecord>> {
    let path = layout.history();
    if !path.exists() {
        return Ok(vec![]);
    }
    let mut out = Vec::new();
    for line in std::fs::read_to_string(path)?.lines() {
        let l = line.trim();
        if l.is_empty() {
            continue;
        }
        out.push(serde_json::from_str(l)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{read_history, RunLog};
    use crate::domain::models::{Decision, IterationRecord};
    use crate::services::layout::RunLayout;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn decisions_land_in_both_logs() {
        let tmp = TempDir::new().unwrap();
        let layout = RunLayout::new(tmp.path());
        let log = RunLog::new(layout.clone());

        log.iteration(0, "Simulating brain image for iteration 0 of 2");
        log.decision(0, "Not converging yet. Preparing for iteration 1 of 2");

        let it = std::fs::read_to_string(layout.iteration_log(0)).unwrap();
        let run = std::fs::read_to_string(layout.run_log()).unwrap();
        assert_eq!(it.lines().count(), 2);
        assert_eq!(
            run.lines().collect::<Vec<_>>(),
            vec!["Not converging yet. Preparing for iteration 1 of 2"]
        );
    }

    #[test]
    fn history_round_trips_in_order() {
        let tmp = TempDir::new().unwrap();
        let layout = RunLayout::new(tmp.path());
        let log = RunLog::new(layout.clone());
        let records: Vec<IterationRecord> = (0..3)
            .map(|i| IterationRecord {
                iteration: i,
                activity_map: PathBuf::from(format!("act_map_{}.hdr", i)),
                score: 0.5 + i as f64 * 0.1,
                decision: Decision::Continue,
            })
            .collect();
        for r in &records {
            log.record(r);
        }
        assert_eq!(read_history(&layout).unwrap(), records);
    }

    #[test]
    fn missing_directory_is_not_fatal() {
        let log = RunLog::new(RunLayout::new("/nonexistent/brainviset/run"));
        log.failure(Some(0), "engine produced nothing");
    }
}
