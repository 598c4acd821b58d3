use crate::{
    ArgumentError, Backoff, Error, Flake, FlakeGenerator, FlakeSource, IdGenStatus,
    MonotonicClock, TimeSource, default_generator, next_flake,
};
use core::cell::Cell;
use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread::scope;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

#[derive(Clone)]
struct SharedMockStepTime {
    clock: Rc<MockStepTime>,
}

impl TimeSource for SharedMockStepTime {
    fn current_millis(&self) -> u64 {
        self.clock.values[self.clock.index.get()]
    }
}

struct MockStepTime {
    values: Vec<u64>,
    index: Cell<usize>,
}

fn step_time(values: Vec<u64>) -> SharedMockStepTime {
    SharedMockStepTime {
        clock: Rc::new(MockStepTime {
            values,
            index: Cell::new(0),
        }),
    }
}

/// Reads 42 for the first `advance_after` reads, 43 afterwards.
struct CountingTime {
    reads: Cell<usize>,
    advance_after: usize,
}

impl TimeSource for CountingTime {
    fn current_millis(&self) -> u64 {
        let n = self.reads.get();
        self.reads.set(n + 1);
        if n < self.advance_after { 42 } else { 43 }
    }
}

struct AtomicTime {
    millis: AtomicU64,
}

impl TimeSource for AtomicTime {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::Acquire)
    }
}

trait IdGenStatusExt {
    fn unwrap_ready(self) -> Flake;
    fn unwrap_pending(self) -> u64;
}

impl IdGenStatusExt for IdGenStatus {
    fn unwrap_ready(self) -> Flake {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_until } => {
                panic!("unexpected pending (yield until: {yield_until})")
            }
        }
    }

    fn unwrap_pending(self) -> u64 {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_until } => yield_until,
        }
    }
}

fn run_id_sequence_increments_within_same_tick<G: FlakeSource>(generator: &G) {
    let id1 = generator.next_id().unwrap();
    let id2 = generator.next_id().unwrap();
    let id3 = generator.poll_id().unwrap().unwrap_ready();

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 42);
    assert_eq!(id3.timestamp(), 42);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert_eq!(id1.machine_id(), generator.machine_id());
    assert!(id1 < id2 && id2 < id3);
}

fn run_generator_monotonic<G: FlakeSource>(generator: &G) {
    const TOTAL_IDS: usize = 4096 * 64;

    let mut last_timestamp = 0;
    let mut sequence = 0;
    for _ in 0..TOTAL_IDS {
        let id = generator.next_id().unwrap();
        let ts = id.timestamp();
        if ts > last_timestamp {
            sequence = 0;
        }

        assert!(ts >= last_timestamp);
        assert_eq!(id.machine_id(), generator.machine_id());
        assert_eq!(id.sequence(), sequence);

        last_timestamp = ts;
        sequence += 1;
    }
}

#[test]
fn sequence_increments_within_same_tick() {
    let generator = FlakeGenerator::with_clock(5, MockTime { millis: 42 }).unwrap();
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn poll_reports_pending_when_sequence_exhausted() {
    let generator =
        FlakeGenerator::from_components(42, 0, Flake::MAX_SEQUENCE, MockTime { millis: 42 })
            .unwrap();
    assert_eq!(generator.poll_id().unwrap().unwrap_pending(), 43);
    // state is untouched by a pending poll
    assert_eq!(generator.poll_id().unwrap().unwrap_pending(), 43);
}

#[test]
fn poll_rolls_over_once_clock_advances() {
    let time = step_time(vec![42, 43]);
    let generator = FlakeGenerator::with_clock(1, time.clone()).unwrap();

    for i in 0..=Flake::MAX_SEQUENCE {
        let id = generator.poll_id().unwrap().unwrap_ready();
        assert_eq!(id.sequence(), i);
        assert_eq!(id.timestamp(), 42);
    }
    assert_eq!(generator.poll_id().unwrap().unwrap_pending(), 43);

    time.clock.index.set(1);

    let id = generator.poll_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn next_id_waits_out_exhausted_millisecond() {
    let per_tick = (Flake::MAX_SEQUENCE + 1) as usize;
    let time = CountingTime {
        reads: Cell::new(0),
        advance_after: per_tick + 4,
    };
    let generator = FlakeGenerator::with_clock(1, &time)
        .unwrap()
        .with_backoff(Backoff::Spin);

    for i in 0..=Flake::MAX_SEQUENCE {
        let id = generator.next_id().unwrap();
        assert_eq!((id.timestamp(), id.sequence()), (42, i));
    }
    assert_eq!(time.reads.get(), per_tick);

    let id = generator.next_id().unwrap();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
    assert_eq!(id.machine_id(), 1);
    // one read to notice exhaustion, four more until the clock passed 42
    assert_eq!(time.reads.get(), per_tick + 5);
}

#[test]
fn next_id_blocks_until_clock_advances() {
    let time = Arc::new(AtomicTime {
        millis: AtomicU64::new(42),
    });
    let generator =
        FlakeGenerator::from_components(42, 3, Flake::MAX_SEQUENCE, Arc::clone(&time))
            .unwrap()
            .with_backoff(Backoff::Yield);

    let start = Instant::now();
    let id = scope(|s| {
        s.spawn(|| {
            std::thread::sleep(Duration::from_millis(20));
            time.millis.store(43, Ordering::Release);
        });
        generator.next_id().unwrap()
    });

    assert!(start.elapsed() >= Duration::from_millis(20));
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
    assert_eq!(id.machine_id(), 3);
}

#[test]
fn clock_regression_is_reported_and_leaves_state() {
    let time = step_time(vec![42, 41, 42]);
    let generator = FlakeGenerator::with_clock(2, time.clone()).unwrap();

    let first = generator.next_id().unwrap();
    assert_eq!((first.timestamp(), first.sequence()), (42, 0));

    time.clock.index.set(1);
    let err = generator.next_id().unwrap_err();
    assert_eq!(err, Error::ClockRegression { now: 41, last: 42 });
    assert!(err.is_clock_regression());
    assert_eq!(
        generator.poll_id().unwrap_err(),
        Error::ClockRegression { now: 41, last: 42 }
    );

    time.clock.index.set(2);
    let next = generator.next_id().unwrap();
    assert_eq!((next.timestamp(), next.sequence()), (42, 1));
    assert!(next > first);
}

#[test]
fn resumed_generator_continues_after_last_id() {
    let generator = FlakeGenerator::from_components(42, 7, 10, MockTime { millis: 42 }).unwrap();
    let id = generator.next_id().unwrap();
    assert_eq!((id.timestamp(), id.machine_id(), id.sequence()), (42, 7, 11));
}

#[test]
fn rejects_invalid_components() {
    for machine_id in [-1, 16] {
        assert_eq!(
            FlakeGenerator::new(machine_id).unwrap_err(),
            Error::InvalidArgument(ArgumentError::MachineIdOutOfRange(machine_id))
        );
    }
    assert_eq!(
        FlakeGenerator::from_components(0, 0, 2048, MockTime { millis: 0 }).unwrap_err(),
        Error::InvalidArgument(ArgumentError::SequenceOutOfRange(2048))
    );
    assert!(FlakeGenerator::new(0).is_ok());
    assert!(FlakeGenerator::new(15).is_ok());
}

#[test]
fn clones_share_state() {
    let a = FlakeGenerator::with_clock(4, Arc::new(MockTime { millis: 42 })).unwrap();
    let b = a.clone();
    assert_eq!(a.next_id().unwrap().sequence(), 0);
    assert_eq!(b.next_id().unwrap().sequence(), 1);
    assert_eq!(a.next_id().unwrap().sequence(), 2);
}

#[test]
fn monotonic_clock_sequence_increments() {
    let generator = FlakeGenerator::with_clock(1, MonotonicClock::default()).unwrap();
    run_generator_monotonic(&generator);
}

#[test]
fn threaded_ids_are_unique_and_ordered() {
    const THREADS: usize = 8;
    const TOTAL_IDS: usize = 4096 * 32;
    const IDS_PER_THREAD: usize = TOTAL_IDS / THREADS;

    let generator = FlakeGenerator::new(9).unwrap();

    let per_thread: Vec<Vec<Flake>> = scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let generator = generator.clone();
                s.spawn(move || {
                    (0..IDS_PER_THREAD)
                        .map(|_| generator.next_id().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut seen = HashSet::with_capacity(TOTAL_IDS);
    for ids in &per_thread {
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        for id in ids {
            assert_eq!(id.machine_id(), 9);
            assert!(seen.insert(*id));
        }
    }
    assert_eq!(seen.len(), TOTAL_IDS, "Expected {TOTAL_IDS} unique IDs");
}

#[test]
fn threaded_completion_order_matches_id_order() {
    const THREADS: usize = 8;
    const IDS_PER_THREAD: usize = 1250;

    let generator = FlakeGenerator::new(2).unwrap();
    let completed = Mutex::new(Vec::with_capacity(THREADS * IDS_PER_THREAD));

    scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..IDS_PER_THREAD {
                    let mut completed = completed.lock().unwrap();
                    let id = generator.next_id().unwrap();
                    completed.push(id);
                }
            });
        }
    });

    let completed = completed.into_inner().unwrap();
    assert_eq!(completed.len(), THREADS * IDS_PER_THREAD);
    assert!(completed.windows(2).all(|w| w[0] < w[1]));

    let mut sorted = completed.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, completed);
}

#[test]
fn new_generator_starts_at_sequence_zero() {
    let generator = FlakeGenerator::with_clock(0, MockTime { millis: 42 }).unwrap();
    let id = generator.next_id().unwrap();
    assert_eq!((id.timestamp(), id.sequence()), (42, 0));
}

#[test]
fn default_generator_uses_machine_zero() {
    let generator = default_generator();
    assert_eq!(FlakeSource::machine_id(generator), 0);
    assert!(core::ptr::eq(generator, default_generator()));

    let a = next_flake().unwrap();
    let b = generator.next_id().unwrap();
    let c = next_flake().unwrap();
    assert!(a < b && b < c);
    assert_eq!(c.machine_id(), 0);
}

#[cfg(not(feature = "parking-lot"))]
#[test]
fn poisoned_lock_is_reported() {
    struct PanickingTime {
        armed: Cell<bool>,
    }

    impl TimeSource for PanickingTime {
        fn current_millis(&self) -> u64 {
            assert!(!self.armed.replace(false), "clock failure");
            42
        }
    }

    let generator = FlakeGenerator::with_clock(
        0,
        PanickingTime {
            armed: Cell::new(true),
        },
    )
    .unwrap();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| generator.next_id()));
    assert!(result.is_err());
    assert_eq!(generator.next_id().unwrap_err(), Error::LockPoisoned);
}
