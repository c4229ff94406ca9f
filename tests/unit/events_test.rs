//! Tests for the event stream plumbing

use surgepool::core::{EventBus, InMemoryEventSink, SimEvent};

#[test]
fn test_events_keep_emission_order_across_threads() {
    let sink = InMemoryEventSink::new();
    let log = sink.log();
    let mut bus = EventBus::new(Box::new(sink));

    let mut handles = Vec::new();
    for source in 0..4u32 {
        let emitter = bus.emitter();
        handles.push(std::thread::spawn(move || {
            for seq in 0..25u64 {
                emitter.emit(SimEvent::TaskArrived {
                    task: seq,
                    source,
                    depth: 0,
                });
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }
    bus.close();

    let records = log.snapshot();
    assert_eq!(records.len(), 100);

    // Every stamp was handed out exactly once.
    let mut seqs: Vec<u64> = records.iter().map(|r| r.seq).collect();
    seqs.sort_unstable();
    assert_eq!(seqs, (0..100).collect::<Vec<u64>>());

    // Each emitter's own events arrive in the order it sent them.
    for wanted in 0..4u32 {
        let tasks: Vec<u64> = records
            .iter()
            .filter_map(|r| match r.event {
                SimEvent::TaskArrived { task, source, .. } if source == wanted => Some(task),
                _ => None,
            })
            .collect();
        assert_eq!(tasks, (0..25).collect::<Vec<u64>>());
    }
}

#[test]
fn test_events_serialize_as_tagged_json() {
    let event = SimEvent::CapacityChanged {
        capacity: 6,
        delta: 1,
    };
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("\"kind\":\"capacity_changed\""));
    let back: SimEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(back, event);
}
