use core::time::Duration;
use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
    thread::scope,
    vec::Vec,
};

use crate::{
    ConfigError, Error, InterruptibleSleep, Reservation, Sonyflake, SonyflakeId, SystemClock,
    TICK, TimeSource, from_ticks,
};

const EPOCH: i64 = 1_749_081_600;

/// A settable clock, shared by all of its clones.
#[derive(Clone, Debug, Default)]
struct MockTime {
    nanos: Arc<AtomicU64>,
}

impl MockTime {
    /// A clock reading `since_epoch` after [`EPOCH`].
    fn at(since_epoch: Duration) -> Self {
        let time = Self::default();
        time.set(since_epoch);
        time
    }

    fn set(&self, since_epoch: Duration) {
        let now = Duration::from_secs(EPOCH as u64) + since_epoch;
        self.nanos.store(now.as_nanos() as u64, Ordering::Relaxed);
    }
}

impl TimeSource for MockTime {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Relaxed))
    }
}

/// Replays a fixed list of readings, repeating the last one.
#[derive(Debug)]
struct MockStepTime {
    values: Vec<Duration>,
    index: AtomicUsize,
}

impl TimeSource for MockStepTime {
    fn now(&self) -> Duration {
        let i = self.index.fetch_add(1, Ordering::Relaxed);
        let since_epoch = self.values[i.min(self.values.len() - 1)];
        Duration::from_secs(EPOCH as u64) + since_epoch
    }
}

fn mocked(machine_ids: &[u16], time: MockTime) -> Sonyflake<MockTime> {
    Sonyflake::builder()
        .machine_ids(machine_ids.iter().copied())
        .epoch_secs(EPOCH)
        .clock(time)
        .build()
        .unwrap()
}

trait ReservationExt<V> {
    fn unwrap_ready(self) -> V;
    fn unwrap_pending(self) -> (V, Duration);
}

impl<V> ReservationExt<V> for Reservation<V> {
    fn unwrap_ready(self) -> V {
        assert!(self.is_ready(), "unexpected wait of {:?}", self.wait);
        self.value
    }

    fn unwrap_pending(self) -> (V, Duration) {
        assert!(!self.is_ready(), "unexpected ready");
        self.into_parts()
    }
}

#[test]
fn first_id_claims_current_tick() {
    let time = MockTime::at(from_ticks(1_000) + Duration::from_millis(3));
    let sf = mocked(&[0x0000, 0x7F7F, 0xFFFF], time);

    let id = sf.try_next_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 1_000);
    assert_eq!(id.machine_id(), 0x0000);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn sequence_increments_within_same_tick() {
    let sf = mocked(&[7], MockTime::at(from_ticks(5)));

    for expected in 0..=255u8 {
        let id = sf.try_next_id().unwrap().unwrap_ready();
        assert_eq!(id.timestamp(), 5);
        assert_eq!(id.machine_id(), 7);
        assert_eq!(id.sequence(), expected);
    }
}

#[test]
fn sequence_resets_on_new_tick() {
    let time = MockTime::at(from_ticks(5));
    let sf = mocked(&[7], time.clone());

    for _ in 0..10 {
        sf.try_next_id().unwrap().unwrap_ready();
    }
    time.set(from_ticks(9));
    let id = sf.try_next_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 9);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn cycles_through_sorted_machine_ids_before_waiting() {
    let sf = mocked(&[3, 1], MockTime::at(from_ticks(50)));

    let ids: Vec<_> = (0..512)
        .map(|_| sf.try_next_id().unwrap().unwrap_ready())
        .collect();

    assert!(ids[..256].iter().all(|id| id.machine_id() == 1));
    assert!(ids[256..].iter().all(|id| id.machine_id() == 3));
    assert!(ids.iter().all(|id| id.timestamp() == 50));
    assert_eq!(ids[256].sequence(), 0);
}

#[test]
fn exhausted_tick_claims_next_tick_and_reports_wait() {
    let sf = mocked(&[0], MockTime::at(from_ticks(100) + Duration::from_millis(3)));

    for _ in 0..256 {
        sf.try_next_id().unwrap().unwrap_ready();
    }
    let (id, wait) = sf.try_next_id().unwrap().unwrap_pending();
    assert_eq!(id.timestamp(), 101);
    assert_eq!(id.sequence(), 0);
    assert_eq!(wait, Duration::from_millis(7));

    // Only the call that wrapped reports a wait.
    let id = sf.try_next_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 101);
    assert_eq!(id.sequence(), 1);
}

#[test]
fn clock_going_backwards_never_regresses_timestamp() {
    let time = MockTime::at(from_ticks(500));
    let sf = mocked(&[1, 2], time.clone());

    let before = sf.try_next_id().unwrap().unwrap_ready();
    time.set(from_ticks(400));
    let after = sf.try_next_id().unwrap().unwrap_ready();

    assert!(after > before);
    assert_eq!(after.timestamp(), 500);
}

#[test]
fn readings_before_epoch_clamp_to_tick_zero() {
    let time = MockTime::default();
    let sf = mocked(&[1], time);
    let id = sf.try_next_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 0);
}

#[test]
fn custom_epoch_shifts_timestamp() {
    let sf = mocked(&[1], MockTime::at(Duration::from_secs(1)));
    assert_eq!(sf.try_next_id().unwrap().value.timestamp(), 100);
    assert_eq!(sf.epoch(), Duration::from_secs(EPOCH as u64));
}

#[test]
fn batch_matches_sequential_calls() {
    let at = from_ticks(77) + Duration::from_millis(1);
    let sequential = mocked(&[0x0000, 0x7F7F, 0xFFFF], MockTime::at(at));
    let batched = mocked(&[0x0000, 0x7F7F, 0xFFFF], MockTime::at(at));

    let expected: Vec<_> = (0..2_000)
        .map(|_| sequential.try_next_id().unwrap().value)
        .collect();
    let actual = batched.try_next_ids(2_000).unwrap().value;

    assert_eq!(actual, expected);
    assert_eq!(
        batched.generator().snapshot().unwrap(),
        sequential.generator().snapshot().unwrap()
    );
}

#[test]
fn batch_within_tick_is_ready() {
    let sf = mocked(&[1, 2], MockTime::at(from_ticks(9)));
    let ids = sf.try_next_ids(512).unwrap().unwrap_ready();
    assert_eq!(ids.len(), 512);
    assert!(ids.iter().all(|id| id.timestamp() == 9));
}

#[test]
fn batch_spilling_one_tick_waits_from_first_reading() {
    let sf = mocked(&[0], MockTime::at(from_ticks(20) + Duration::from_millis(4)));
    let (ids, wait) = sf.try_next_ids(300).unwrap().unwrap_pending();
    assert_eq!(ids.last().unwrap().timestamp(), 21);
    assert_eq!(wait, Duration::from_millis(6));
}

#[test]
fn batch_spanning_several_ticks_resamples_clock() {
    let clock = MockStepTime {
        values: vec![
            from_ticks(20) + Duration::from_millis(3),
            from_ticks(21) + Duration::from_millis(5),
        ],
        index: AtomicUsize::new(0),
    };
    let sf = Sonyflake::builder()
        .machine_id(0)
        .epoch_secs(EPOCH)
        .clock(clock)
        .build()
        .unwrap();

    // 600 IDs at 256 per tick claim ticks 20, 21 and 22.
    let (ids, wait) = sf.try_next_ids(600).unwrap().unwrap_pending();
    assert_eq!(ids.last().unwrap().timestamp(), 22);
    assert_eq!(wait, Duration::from_millis(5));
}

#[test]
fn zero_batch_is_rejected_without_consuming() {
    let sf = mocked(&[1], MockTime::at(from_ticks(3)));
    assert_eq!(sf.try_next_ids(0).unwrap_err(), Error::InvalidBatchSize);
    assert_eq!(sf.next_n(0).unwrap_err(), Error::InvalidBatchSize);
    assert_eq!(sf.try_next_id().unwrap().value.sequence(), 0);
}

#[test]
fn oversized_batch_fails_and_leaves_generator_usable() {
    let sf = mocked(&[1], MockTime::at(from_ticks(3)));
    assert_eq!(sf.next().unwrap().sequence(), 0);

    assert_eq!(
        sf.try_next_ids(usize::MAX).unwrap_err(),
        Error::BatchTooLarge { n: usize::MAX }
    );
    assert_eq!(
        sf.next_n(usize::MAX).unwrap_err(),
        Error::BatchTooLarge { n: usize::MAX }
    );

    // Nothing was reserved and the lock is intact, for every clone.
    let clone = sf.clone();
    assert_eq!(clone.next().unwrap().sequence(), 1);
    assert_eq!(sf.next_n(2).unwrap().len(), 2);
}

#[test]
fn ids_are_unique_and_increasing_in_real_time() {
    let sf = Sonyflake::new([0x0000, 0x7F7F, 0xFFFF]).unwrap();
    let ids: Vec<SonyflakeId> = sf.iter().take(5_000).collect::<Result<_, _>>().unwrap();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let set: HashSet<_> = ids.iter().collect();
    assert_eq!(set.len(), ids.len());
    assert!(
        ids.iter()
            .all(|id| [0x0000, 0x7F7F, 0xFFFF].contains(&id.machine_id()))
    );
}

#[test]
fn single_machine_id_advances_tick_after_256_ids() {
    let sf = Sonyflake::new([0]).unwrap();
    let ids: Vec<_> = (0..257).map(|_| sf.next().unwrap()).collect();
    assert!(ids[256].timestamp() >= ids[0].timestamp() + 1);
    assert!(ids.iter().all(|id| id.machine_id() == 0));
}

#[test]
fn blocking_call_waits_for_claimed_tick() {
    let sf = Sonyflake::new([42]).unwrap();
    let ids = sf.next_n(256 * 3).unwrap();
    let last = ids.last().unwrap();
    // The call only returns once the wall clock has reached the last tick.
    let now = sf.generator().clock().current_tick();
    assert!(now >= last.timestamp());
}

#[test]
fn generates_unique_ids_across_threads() {
    const THREADS: usize = 8;
    const IDS_PER_THREAD: usize = 5_000;

    let sf: Sonyflake<SystemClock> = Sonyflake::new([1, 2]).unwrap();
    let seen = Mutex::new(HashSet::with_capacity(THREADS * IDS_PER_THREAD));

    scope(|s| {
        for _ in 0..THREADS {
            let sf = sf.clone();
            let seen = &seen;
            s.spawn(move || {
                let mut local = Vec::with_capacity(IDS_PER_THREAD);
                for _ in 0..IDS_PER_THREAD {
                    local.push(sf.next().unwrap());
                }
                // Each thread observes its own IDs in order.
                assert!(local.windows(2).all(|w| w[0] < w[1]));
                let mut seen = seen.lock().unwrap();
                for id in local {
                    assert!(seen.insert(id), "duplicate ID: {id:?}");
                }
            });
        }
    });

    assert_eq!(seen.lock().unwrap().len(), THREADS * IDS_PER_THREAD);
}

#[test]
fn interrupted_wait_fails_without_rollback() {
    let sleep = InterruptibleSleep::new();
    let interrupter = sleep.interrupter();
    let time = MockTime::at(from_ticks(10));
    let sf = Sonyflake::builder()
        .machine_id(0)
        .epoch_secs(EPOCH)
        .clock(time)
        .blocking_sleep(sleep)
        .build()
        .unwrap();

    scope(|s| {
        // 1000 ticks worth of IDs: a ten second wait.
        let waiter = s.spawn(|| sf.next_n(256 * 1_000));
        while !waiter.is_finished() {
            interrupter.interrupt();
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(waiter.join().unwrap(), Err(Error::Interrupted));
    });

    let state = sf.generator().snapshot().unwrap();
    assert_eq!(state.elapsed_time(), 1_009);
    let next = sf.try_next_id().unwrap().value;
    assert_eq!(next.timestamp(), 1_010);
}

#[test]
fn builder_rejects_bad_machine_ids() {
    let build = |ids: Vec<i64>| Sonyflake::builder().machine_ids(ids).build().unwrap_err();

    assert_eq!(build(vec![]), Error::Config(ConfigError::NoMachineIds));
    assert_eq!(
        build(vec![1, 2, 2]),
        Error::Config(ConfigError::DuplicateMachineId { value: 2 })
    );
    assert_eq!(
        build(vec![65_536]),
        Error::Config(ConfigError::MachineIdOutOfRange { value: 65_536 })
    );
    assert_eq!(
        build(vec![-1]),
        Error::Config(ConfigError::MachineIdOutOfRange { value: -1 })
    );
    assert_eq!(
        build((0..=65_536).collect()),
        Error::Config(ConfigError::TooManyMachineIds { count: 65_537 })
    );
}

#[test]
fn builder_bounds_huge_machine_id_inputs() {
    let err = Sonyflake::builder()
        .machine_ids(0..(1i64 << 61))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::TooManyMachineIds { count }) if count > 65_536
    ));

    let err = Sonyflake::builder()
        .machine_ids(0..65_536)
        .machine_id(70_000)
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        Error::Config(ConfigError::TooManyMachineIds { count: 65_537 })
    );

    // A later call replaces a rejected set.
    let sf = Sonyflake::builder()
        .machine_ids(0..(1i64 << 61))
        .machine_ids([4, 5])
        .build()
        .unwrap();
    assert_eq!(&sf.machine_ids()[..], &[4, 5]);
}

#[test]
fn builder_accepts_every_machine_id() {
    let sf = Sonyflake::new(0..=65_535).unwrap();
    assert_eq!(sf.machine_ids().len(), 65_536);
    assert_eq!(sf.generator().snapshot().unwrap().slots_per_tick(), 1 << 24);
}

#[test]
fn builder_rejects_negative_epoch() {
    let err = Sonyflake::builder()
        .machine_id(1)
        .epoch_secs(-1)
        .build()
        .unwrap_err();
    assert_eq!(err, Error::Config(ConfigError::InvalidEpoch { secs: -1 }));
}

#[test]
fn displays_sorted_machine_ids_and_epoch() {
    let sf = Sonyflake::builder()
        .machine_ids([65_535, 0, 32_639])
        .epoch_secs(EPOCH)
        .build()
        .unwrap();
    assert_eq!(sf.to_string(), "Sonyflake(0, 32639, 65535, epoch=1749081600)");
}

#[test]
fn tick_is_ten_milliseconds() {
    assert_eq!(TICK, Duration::from_millis(10));
}

#[cfg(feature = "futures")]
mod suspending {
    use futures::{
        StreamExt,
        executor::block_on,
        future::{Ready, ready},
    };

    use super::*;
    use crate::SleepFn;

    type Recorded = Arc<Mutex<Vec<Duration>>>;

    fn recording(machine_ids: &[u16], time: MockTime) -> (Sonyflake<MockTime>, Recorded) {
        let waits = Recorded::default();
        let sink = Arc::clone(&waits);
        let provider = SleepFn::new(move |dur: Duration| -> Ready<()> {
            sink.lock().unwrap().push(dur);
            ready(())
        });

        let sf = Sonyflake::builder()
            .machine_ids(machine_ids.iter().copied())
            .epoch_secs(EPOCH)
            .clock(time)
            .sleep_provider(provider)
            .build()
            .unwrap();
        (sf, waits)
    }

    #[test]
    fn no_provider_fails_without_consuming() {
        let sf = mocked(&[1], MockTime::at(from_ticks(3)));
        assert!(!sf.is_async());
        assert_eq!(block_on(sf.next_async()), Err(Error::MissingSleepProvider));
        assert_eq!(
            block_on(sf.next_n_async(4)),
            Err(Error::MissingSleepProvider)
        );
        assert!(matches!(sf.stream(), Err(Error::MissingSleepProvider)));
        assert_eq!(sf.try_next_id().unwrap().value.sequence(), 0);
    }

    #[test]
    fn ready_ids_never_touch_provider() {
        let (sf, waits) = recording(&[1], MockTime::at(from_ticks(3)));
        assert!(sf.is_async());

        for expected in 0..=255u8 {
            let id = block_on(sf.next_async()).unwrap();
            assert_eq!(id.sequence(), expected);
        }
        assert!(waits.lock().unwrap().is_empty());
    }

    #[test]
    fn exhausted_tick_suspends_for_sequencer_wait() {
        let time = MockTime::at(from_ticks(3) + Duration::from_millis(2));
        let (sf, waits) = recording(&[0], time);

        let mut last = None;
        for _ in 0..257 {
            last = Some(block_on(sf.next_async()).unwrap());
        }
        assert_eq!(last.unwrap().timestamp(), 4);
        assert_eq!(*waits.lock().unwrap(), [Duration::from_millis(8)]);
    }

    #[test]
    fn batch_suspends_once() {
        let time = MockTime::at(from_ticks(3) + Duration::from_millis(2));
        let (sf, waits) = recording(&[0], time);

        let ids = block_on(sf.next_n_async(300)).unwrap();
        assert_eq!(ids.len(), 300);
        assert_eq!(*waits.lock().unwrap(), [Duration::from_millis(8)]);
        assert_eq!(block_on(sf.next_n_async(0)), Err(Error::InvalidBatchSize));
    }

    #[test]
    fn dropped_future_skips_reserved_id() {
        let (sf, _) = recording(&[0], MockTime::at(from_ticks(3)));

        // The slot is taken when the future is created, not when polled.
        drop(sf.next_async());
        assert_eq!(block_on(sf.next_async()).unwrap().sequence(), 1);
    }

    #[test]
    fn stream_yields_increasing_ids() {
        let (sf, waits) = recording(&[5, 6], MockTime::at(from_ticks(8)));
        let ids: Vec<_> = block_on(sf.stream().unwrap().take(600).collect::<Vec<_>>())
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(ids.len(), 600);
        assert!(ids.windows(2).all(|w: &[SonyflakeId]| w[0] < w[1]));
        assert_eq!(waits.lock().unwrap().len(), 1);
    }
}
