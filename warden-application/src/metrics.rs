use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    ingest_events: AtomicU64,
    ingest_errors: AtomicU64,
    events_evaluated: AtomicU64,
    rules_matched: AtomicU64,
    violations_recorded: AtomicU64,
    activities_emitted: AtomicU64,
    score_submissions: AtomicU64,
    score_improvements: AtomicU64,
    poll_cycles: AtomicU64,
}

impl Metrics {
    pub fn record_ingest(&self) {
        self.ingest_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ingest_error(&self) {
        self.ingest_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evaluation(&self, matched: usize) {
        self.events_evaluated.fetch_add(1, Ordering::Relaxed);
        self.rules_matched
            .fetch_add(matched as u64, Ordering::Relaxed);
    }

    pub fn record_violation(&self) {
        self.violations_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_activity(&self) {
        self.activities_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_score_submission(&self, improved: bool) {
        self.score_submissions.fetch_add(1, Ordering::Relaxed);
        if improved {
            self.score_improvements.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_poll_cycle(&self) {
        self.poll_cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let ingest = self.ingest_events.load(Ordering::Relaxed);
        let ingest_errors = self.ingest_errors.load(Ordering::Relaxed);
        let evaluated = self.events_evaluated.load(Ordering::Relaxed);
        let matched = self.rules_matched.load(Ordering::Relaxed);
        let violations = self.violations_recorded.load(Ordering::Relaxed);
        let activities = self.activities_emitted.load(Ordering::Relaxed);
        let submissions = self.score_submissions.load(Ordering::Relaxed);
        let improvements = self.score_improvements.load(Ordering::Relaxed);
        let cycles = self.poll_cycles.load(Ordering::Relaxed);

        format!(
            "# TYPE warden_ingest_events_total counter\n\
warden_ingest_events_total {}\n\
# TYPE warden_ingest_errors_total counter\n\
warden_ingest_errors_total {}\n\
# TYPE warden_events_evaluated_total counter\n\
warden_events_evaluated_total {}\n\
# TYPE warden_rules_matched_total counter\n\
warden_rules_matched_total {}\n\
# TYPE warden_violations_recorded_total counter\n\
warden_violations_recorded_total {}\n\
# TYPE warden_activities_emitted_total counter\n\
warden_activities_emitted_total {}\n\
# TYPE warden_score_submissions_total counter\n\
warden_score_submissions_total {}\n\
# TYPE warden_score_improvements_total counter\n\
warden_score_improvements_total {}\n\
# TYPE warden_poll_cycles_total counter\n\
warden_poll_cycles_total {}\n",
            ingest,
            ingest_errors,
            evaluated,
            matched,
            violations,
            activities,
            submissions,
            improvements,
            cycles
        )
    }
}
