#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for event in tallyd::fuzzing::decode_payload_input(data) {
        debug_assert!(!event.bucket.is_empty());
        debug_assert!(event.bucket.chars().all(|ch| ch.is_ascii_alphanumeric()
            || ch == '_'
            || ch == '.'
            || ch == '-'));
        debug_assert!(event.sample_rate > 0.0 && event.sample_rate <= 1.0);
        if event.kind == tallyd::protocol::MetricKind::Timer {
            debug_assert!(event.value.parse::<f64>().is_ok());
        }
    }
});
