use metrics_util::{
    CompositeKey,
    debugging::{DebugValue, DebuggingRecorder, Snapshotter},
};

/// Creates a debugging recorder and its snapshotter.
///
/// Install the recorder with `metrics::with_local_recorder` around the code
/// under test, then take one [`MetricsSnapshot`].
#[must_use]
pub fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

/// Metrics captured by a single snapshot.
///
/// Taking a snapshot drains the recorder's counters, so a test takes one
/// and queries it as often as it needs.
pub struct MetricsSnapshot {
    entries: Vec<(CompositeKey, DebugValue)>,
}

impl MetricsSnapshot {
    /// Drain `snapshotter` into a new snapshot.
    #[must_use]
    pub fn take(snapshotter: &Snapshotter) -> Self {
        let entries = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .map(|(key, _, _, value)| (key, value))
            .collect();
        Self { entries }
    }

    /// Value of counter `name` carrying the label `key=value`, if recorded.
    #[must_use]
    pub fn counter(&self, name: &str, (key, value): (&str, &str)) -> Option<u64> {
        self.entries.iter().find_map(|(composite, recorded)| {
            let metric = composite.key();
            let labelled = metric
                .labels()
                .any(|label| label.key() == key && label.value() == value);
            match recorded {
                DebugValue::Counter(count) if metric.name() == name && labelled => Some(*count),
                _ => None,
            }
        })
    }
}
