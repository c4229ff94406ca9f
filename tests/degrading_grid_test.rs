//! Scenario test: a degrading processing grid halting on total exhaustion.
//!
//! Three units serve a priority-ordered feed from six sources. The failure
//! script breaks every unit on its first service, so the run must reach
//! the terminal all-broken halt: the running flag flips exactly once, no
//! service starts afterward, and the summary names every broken unit.

use std::sync::Arc;
use std::time::Duration;

use surgepool::builders::CoordinatorBuilder;
use surgepool::config::{QueueDiscipline, SimConfig};
use surgepool::core::{InMemoryEventSink, SimEvent};
use surgepool::infra::stimulus::ScriptedStimulus;

fn grid_config() -> SimConfig {
    SimConfig {
        base_capacity: 3,
        producers: 6,
        tasks_per_producer: 20,
        consumers: 3,
        discipline: QueueDiscipline::Priority,
        priority_cycle: vec![1, 2],
        queue_high_watermark: 10_000,
        queue_low_watermark: 0,
        grow_step: 1,
        completion_low_watermark: 0,
        service_floor_ms: 1,
        acquire_timeout_ms: 100,
        shrink_wait_ms: 50,
        idle_backoff_ms: 10,
    }
}

#[test]
fn exhaustion_halts_exactly_once() {
    let sink = InMemoryEventSink::new();
    let log = sink.log();

    // Every unit breaks on its first service: with three units and three
    // consumers the first wave of services wipes the grid.
    let stimulus = Arc::new(
        ScriptedStimulus::new(Duration::from_millis(10), Duration::from_millis(5))
            .with_failures([true, true, true]),
    );

    let summary = CoordinatorBuilder::new(grid_config())
        .with_stimulus(stimulus)
        .with_sink(Box::new(sink))
        .build()
        .expect("valid config")
        .run();

    assert!(summary.halted);
    assert_eq!(summary.completed, 0);
    assert_eq!(summary.aborted, 3);
    assert_eq!(summary.broken, vec![0, 1, 2]);
    assert_eq!(summary.healthy_remaining, 0);

    let records = log.snapshot();

    let halts: Vec<u64> = records
        .iter()
        .filter(|r| matches!(r.event, SimEvent::SystemHalted { .. }))
        .map(|r| r.seq)
        .collect();
    assert_eq!(halts.len(), 1, "terminal transition fires exactly once");

    let broken = records
        .iter()
        .filter(|r| matches!(r.event, SimEvent::ResourceBroken { .. }))
        .count();
    assert_eq!(broken, 3);

    // Nothing is granted once the grid is gone.
    let started_after_halt = records
        .iter()
        .filter(|r| matches!(r.event, SimEvent::ServiceStarted { .. }))
        .filter(|r| r.seq > halts[0])
        .count();
    assert_eq!(started_after_halt, 0);

    // Producers notice the halt cooperatively and stop early, but every
    // one of them reports its exit.
    let finished = records
        .iter()
        .filter(|r| matches!(r.event, SimEvent::ProducerFinished { .. }))
        .count();
    assert_eq!(finished, 6);

    let arrivals = records
        .iter()
        .filter(|r| matches!(r.event, SimEvent::TaskArrived { .. }))
        .count();
    assert!(arrivals < 120, "the full workload never arrives");
}
