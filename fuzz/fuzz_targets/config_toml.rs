#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(args) = tallyd::fuzzing::apply_config_from_toml(input) {
            debug_assert!(!args.flush_interval.is_zero());
            debug_assert!(!args.backend_timeout.is_zero());
            debug_assert!(args.max_datagram_size.get() > 0);
            let threshold = args.percent_threshold.get();
            debug_assert!((1..=100).contains(&threshold));
        }
    }
});
