/// Conventional statsd port on every interface.
pub(crate) const DEFAULT_ADDRESS: &str = "0.0.0.0:8125";
pub(crate) const DEFAULT_FLUSH_INTERVAL: &str = "10s";
pub(crate) const DEFAULT_BACKEND_TIMEOUT: &str = "5s";
pub(crate) const DEFAULT_PERCENT_THRESHOLD: &str = "90";
pub(crate) const DEFAULT_QUEUE_CAPACITY: &str = "10000";
/// Large enough for jumbo frames; a typical statsd client stays under 1500.
pub(crate) const DEFAULT_MAX_DATAGRAM_SIZE: &str = "8192";
pub(crate) const DEFAULT_SELF_PREFIX: &str = "tallyd";
