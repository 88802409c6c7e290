#![no_main]

use libfuzzer_sys::fuzz_target;
use tallyd::metrics::GaugePolicy;

fuzz_target!(|data: &[u8]| {
    let Some((selector, payload)) = data.split_first() else {
        return;
    };
    let policy = match selector % 3 {
        0 => GaugePolicy::Persist,
        1 => GaugePolicy::Clear,
        _ => GaugePolicy::Accumulate,
    };
    let snapshot = tallyd::fuzzing::aggregate_payload_input(payload, policy);
    for (_, distribution) in &snapshot.timers {
        if distribution.count > 0 {
            debug_assert!(distribution.min <= distribution.p50);
            debug_assert!(distribution.p50 <= distribution.p75);
            debug_assert!(distribution.p75 <= distribution.p90);
            debug_assert!(distribution.p90 <= distribution.p95);
            debug_assert!(distribution.p95 <= distribution.max);
        }
    }
});
