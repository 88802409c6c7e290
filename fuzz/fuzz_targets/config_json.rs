#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(args) = tallyd::fuzzing::apply_config_from_json(data) {
        debug_assert!(!args.flush_interval.is_zero());
        debug_assert!(args.queue_capacity.get() > 0);
    }
});
