//! Line-oriented job record.
//!
//! One line per job, fields separated by whitespace:
//!
//! ```text
//! 3.2 1 0.1 2.0
//! P P 0.9 9.0
//! ```
//!
//! A completed job starts with its value and the flag `1`; a pending job
//! starts with `P P`. The remaining fields are the job's vector. A line is
//! pending exactly when its first field does not parse as a number.

use core::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::{JobLog, JobStore, MalformedLine, write_atomic};
use crate::error::{Error, Result};
use crate::job::{Job, JobStatus};
use crate::space::ParameterSpace;

/// Leading fields of a pending job's line.
pub const PENDING_MARKER: &str = "P P";

/// Second field of a completed job's line.
pub const COMPLETE_FLAG: &str = "1";

/// A [`JobStore`] backed by a line-oriented text file.
///
/// Malformed lines are skipped with a warning and reported in
/// [`JobLog::skipped`]; the lines after them are still read.
/// [`save_log`](JobStore::save_log) writes them back unchanged.
///
/// # Examples
///
/// ```no_run
/// use sequential_design::storage::TextJobStore;
///
/// let store = TextJobStore::new("experiment/jobs.txt");
/// ```
#[derive(Clone, Debug)]
pub struct TextJobStore {
    path: PathBuf,
}

impl TextJobStore {
    /// Creates a store for the record at `path`.
    ///
    /// The file does not need to exist yet; it is created on the first save.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JobStore for TextJobStore {
    fn load(&self, space: &ParameterSpace) -> Result<JobLog> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                trace_debug!(path = %self.path.display(), "no job record yet");
                return Ok(JobLog::default());
            }
            Err(e) => {
                return Err(Error::Storage(format!("{}: {e}", self.path.display())));
            }
        };

        let mut log = JobLog::default();
        for (i, line) in String::from_utf8_lossy(&bytes).lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match decode_line(space, line) {
                Ok(job) => log.jobs.push(job),
                Err(reason) => {
                    trace_warn!(line = i + 1, %reason, "skipping malformed job record line");
                    log.skipped.push(MalformedLine {
                        line_number: i + 1,
                        reason,
                        raw: line.to_string(),
                        job_position: log.jobs.len(),
                    });
                }
            }
        }

        trace_debug!(
            jobs = log.jobs.len(),
            skipped = log.skipped.len(),
            "loaded job record"
        );
        Ok(log)
    }

    fn save(&self, space: &ParameterSpace, jobs: &[Job]) -> Result<()> {
        write_atomic(&self.path, encode_record(space, jobs, &[])?.as_bytes())
    }

    fn save_log(&self, space: &ParameterSpace, log: &JobLog) -> Result<()> {
        write_atomic(
            &self.path,
            encode_record(space, &log.jobs, &log.skipped)?.as_bytes(),
        )
    }
}

/// Encodes `jobs` one per line, with each skipped line placed before the
/// job at its `job_position` (or at the end, past the last job).
fn encode_record(space: &ParameterSpace, jobs: &[Job], skipped: &[MalformedLine]) -> Result<String> {
    let mut skipped = skipped.iter().peekable();
    let mut contents = String::new();
    for (position, job) in jobs.iter().enumerate() {
        while let Some(line) = skipped.next_if(|line| line.job_position <= position) {
            contents.push_str(&line.raw);
            contents.push('\n');
        }
        contents.push_str(&encode_line(space, job)?);
        contents.push('\n');
    }
    for line in skipped {
        contents.push_str(&line.raw);
        contents.push('\n');
    }
    Ok(contents)
}

fn encode_line(space: &ParameterSpace, job: &Job) -> Result<String> {
    let vector = space.vectorify(&job.params)?;
    let mut line = match job.status() {
        JobStatus::Pending => PENDING_MARKER.to_string(),
        JobStatus::Complete { value } => format!("{value:?} {COMPLETE_FLAG}"),
    };
    for slot in vector {
        // Debug formatting is the shortest representation that parses back exactly.
        let _ = write!(line, " {slot:?}");
    }
    Ok(line)
}

fn decode_line(space: &ParameterSpace, line: &str) -> core::result::Result<Job, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(format!("expected at least 2 fields, found {}", fields.len()));
    }
    let vector = fields[2..]
        .iter()
        .map(|field| {
            field
                .parse::<f64>()
                .map_err(|_| format!("'{field}' is not a number"))
        })
        .collect::<core::result::Result<Vec<_>, _>>()?;
    let params = space.paramify(&vector).map_err(|e| e.to_string())?;
    Ok(match fields[0].parse::<f64>() {
        Ok(value) => Job::completed(params, value),
        Err(_) => Job::pending(params),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Variable;

    fn space() -> ParameterSpace {
        ParameterSpace::new(vec![
            Variable::float("x", 0.0, 1.0).unwrap(),
            Variable::int("y", 0, 10).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn encodes_pending_and_complete() {
        let space = space();
        let params = space.paramify(&[0.5, 5.0]).unwrap();
        assert_eq!(
            encode_line(&space, &Job::pending(params.clone())).unwrap(),
            "P P 0.5 5.0"
        );
        assert_eq!(
            encode_line(&space, &Job::completed(params, 3.2)).unwrap(),
            "3.2 1 0.5 5.0"
        );
    }

    #[test]
    fn first_field_decides_status() {
        let space = space();
        let job = decode_line(&space, "3.2 1 0.1 2.0").unwrap();
        assert_eq!(job.value(), Some(3.2));

        let job = decode_line(&space, "P P 0.9 9.0").unwrap();
        assert!(job.is_pending());

        // Any non-numeric first field means pending.
        let job = decode_line(&space, "pending - 0.9 9.0").unwrap();
        assert!(job.is_pending());

        // The second field of a completed line is not interpreted.
        let job = decode_line(&space, "-7 0 0.1 2.0").unwrap();
        assert_eq!(job.value(), Some(-7.0));
    }

    #[test]
    fn non_finite_values_round_trip() {
        let space = space();
        let params = space.paramify(&[0.5, 5.0]).unwrap();
        let line = encode_line(&space, &Job::completed(params, f64::NAN)).unwrap();
        assert_eq!(line, "NaN 1 0.5 5.0");
        let job = decode_line(&space, &line).unwrap();
        assert!(job.value().is_some_and(f64::is_nan));

        let job = decode_line(&space, "-inf 1 0.5 5.0").unwrap();
        assert_eq!(job.value(), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn skipped_lines_keep_their_place() {
        let space = space();
        let params = space.paramify(&[0.5, 5.0]).unwrap();
        let jobs = vec![Job::completed(params.clone(), 1.0), Job::pending(params)];
        let skipped = |raw: &str, job_position| MalformedLine {
            line_number: 0,
            reason: String::new(),
            raw: raw.to_string(),
            job_position,
        };
        let record = encode_record(
            &space,
            &jobs,
            &[skipped("first", 0), skipped("middle", 1), skipped("last", 2)],
        )
        .unwrap();
        assert_eq!(record, "first\n1.0 1 0.5 5.0\nmiddle\nP P 0.5 5.0\nlast\n");
    }

    #[test]
    fn malformed_lines_are_reported() {
        let space = space();
        assert!(decode_line(&space, "P").is_err());
        assert!(decode_line(&space, "P P 0.5").is_err());
        assert!(decode_line(&space, "P P 0.5 five").is_err());
        assert!(decode_line(&space, "1.0 1 2.5 5.0").is_err());
    }
}
