//! Reporting sink for evaluation verdicts.
//!
//! The core never renders verdicts itself. Callers inject a [`Reporter`]
//! (a terminal printer, a logger, a test recorder) and the engine hands it the
//! verdict together with the reason a rejected input stopped.

use crate::engine::Verdict;

/// Receives the verdict of each evaluated input.
pub trait Reporter {
    /// `reason` is set for rejected inputs.
    fn report(&mut self, verdict: Verdict, reason: Option<&str>);
}

impl<F> Reporter for F
where
    F: FnMut(Verdict, Option<&str>),
{
    fn report(&mut self, verdict: Verdict, reason: Option<&str>) {
        self(verdict, reason)
    }
}

/// Discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&mut self, _verdict: Verdict, _reason: Option<&str>) {}
}

/// Keeps every report it receives, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    pub reports: Vec<(Verdict, Option<String>)>,
}

impl RecordingReporter {
    /// Number of accepted verdicts seen so far.
    pub fn accepted(&self) -> usize {
        self.reports.iter().filter(|(v, _)| v.is_accepted()).count()
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, verdict: Verdict, reason: Option<&str>) {
        self.reports.push((verdict, reason.map(str::to_string)));
    }
}
