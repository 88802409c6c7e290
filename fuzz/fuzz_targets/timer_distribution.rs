#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((threshold, rest)) = data.split_first() else {
        return;
    };
    let samples: Vec<f64> = rest
        .chunks_exact(4)
        .map(|chunk| f64::from(i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])))
        .collect();
    let len = samples.len() as u64;
    let distribution = tallyd::fuzzing::summarize_samples_input(samples, Some(*threshold));
    debug_assert_eq!(distribution.count, len);
    if len > 0 {
        debug_assert!(distribution.min <= distribution.max);
        debug_assert!(distribution.mean >= distribution.min);
        debug_assert!(distribution.mean <= distribution.max);
    }
});
