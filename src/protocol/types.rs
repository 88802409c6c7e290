/// Sample rate assumed when a line carries no `|@rate` suffix.
pub const DEFAULT_SAMPLE_RATE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Counter,
    Gauge,
    Timer,
}

impl MetricKind {
    /// Maps a wire type suffix (`c`, `g`, `ms`) to a kind.
    #[must_use]
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "c" => Some(MetricKind::Counter),
            "g" => Some(MetricKind::Gauge),
            "ms" => Some(MetricKind::Timer),
            _ => None,
        }
    }
}

/// A single decoded sample.
///
/// The value stays textual until the aggregator applies it, so a malformed
/// number only invalidates the one event that carries it.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEvent {
    pub bucket: String,
    pub value: String,
    pub kind: MetricKind,
    pub sample_rate: f64,
}

impl MetricEvent {
    #[must_use]
    pub fn new(bucket: impl Into<String>, value: impl Into<String>, kind: MetricKind) -> Self {
        Self {
            bucket: bucket.into(),
            value: value.into(),
            kind,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    #[must_use]
    pub const fn with_sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }
}
