use super::*;

fn single_event(payload: &[u8]) -> Result<MetricEvent, String> {
    let mut events = decode(payload);
    if events.len() != 1 {
        return Err(format!("Expected exactly one event, got {:?}", events));
    }
    events
        .pop()
        .ok_or_else(|| "Expected one event".to_owned())
}

#[test]
fn decodes_counter_with_default_rate() -> Result<(), String> {
    let event = single_event(b"app.requests:1|c")?;
    if event != MetricEvent::new("app.requests", "1", MetricKind::Counter) {
        return Err(format!("Unexpected event: {:?}", event));
    }
    Ok(())
}

#[test]
fn decodes_gauge_and_timer_with_rate() -> Result<(), String> {
    let events = decode(b"app.queue_depth:42|g\napp.latency:13.5|ms|@0.1");
    let expected = vec![
        MetricEvent::new("app.queue_depth", "42", MetricKind::Gauge),
        MetricEvent::new("app.latency", "13.5", MetricKind::Timer).with_sample_rate(0.1),
    ];
    if events != expected {
        return Err(format!("Unexpected events: {:?}", events));
    }
    Ok(())
}

#[test]
fn skips_garbage_prefix() -> Result<(), String> {
    let event = single_event(b"garbage;;;foo:5|c")?;
    if event.bucket != "foo" || event.value != "5" || event.kind != MetricKind::Counter {
        return Err(format!("Unexpected event: {:?}", event));
    }
    if event.sample_rate.to_bits() != DEFAULT_SAMPLE_RATE.to_bits() {
        return Err(format!("Unexpected sample rate: {}", event.sample_rate));
    }
    Ok(())
}

#[test]
fn extracts_concatenated_lines() -> Result<(), String> {
    let events = decode(b"a:1|cb:2|g c:3|ms\r\nd:oops|c");
    let buckets: Vec<&str> = events.iter().map(|event| event.bucket.as_str()).collect();
    if buckets != ["a", "b", "c"] {
        return Err(format!("Unexpected buckets: {:?}", buckets));
    }
    Ok(())
}

#[test]
fn returns_nothing_for_pure_garbage() -> Result<(), String> {
    let events = decode(b"\xff\xfe not a metric |c :|g");
    if !events.is_empty() {
        return Err(format!("Expected no events, got {:?}", events));
    }
    Ok(())
}

#[test]
fn malformed_sample_rate_falls_back_to_one() -> Result<(), String> {
    for payload in [&b"x:1|c|@1.2.3"[..], b"x:1|c|@0", b"x:1|c|@2", b"x:1|c|@."] {
        let event = single_event(payload)?;
        if event.sample_rate.to_bits() != DEFAULT_SAMPLE_RATE.to_bits() {
            return Err(format!(
                "Expected fallback rate for {:?}, got {}",
                String::from_utf8_lossy(payload),
                event.sample_rate
            ));
        }
    }
    Ok(())
}

#[test]
fn unparseable_timer_value_becomes_zero() -> Result<(), String> {
    let event = single_event(b"t:1.2.3|ms")?;
    if event.value != "0" || event.kind != MetricKind::Timer {
        return Err(format!("Unexpected event: {:?}", event));
    }
    Ok(())
}

#[test]
fn unparseable_counter_value_is_kept_raw() -> Result<(), String> {
    let event = single_event(b"n:1.2.3|c")?;
    if event.value != "1.2.3" {
        return Err(format!("Unexpected value: {}", event.value));
    }
    Ok(())
}

#[test]
fn datagram_appends_packet_counter() -> Result<(), String> {
    let self_metrics = SelfMetrics {
        prefix: "tallyd".to_owned(),
    };
    let events = decode_datagram(b"foo:5|c", Some(&self_metrics));
    let last = events
        .last()
        .ok_or_else(|| "Expected events".to_owned())?;
    if events.len() != 2 || last.bucket != "tallyd.packets_received" || last.value != "1" {
        return Err(format!("Unexpected events: {:?}", events));
    }

    let garbage_only = decode_datagram(b"???", Some(&self_metrics));
    if garbage_only.len() != 1 {
        return Err(format!(
            "Expected packet counter for garbage datagram, got {:?}",
            garbage_only
        ));
    }

    let without = decode_datagram(b"foo:5|c", None);
    if without.len() != 1 {
        return Err(format!("Expected only decoded event, got {:?}", without));
    }
    Ok(())
}
