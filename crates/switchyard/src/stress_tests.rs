//! Randomized concurrency stress tests.
//!
//! Writers churn the registry while readers dispatch in a tight loop;
//! every observed snapshot must be totally ordered, duplicate-free, and
//! internally consistent.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use switchyard_core::{Engine, Outcome, RuleSpec};

const BUCKETS: u32 = 8;
const WRITER_OPS: usize = 2_000;

fn bucket_rule(engine: &Engine<u32, u32>, bucket: u32, priority: i32) {
    engine
        .register(
            RuleSpec::new(format!("bucket-{bucket}"), priority)
                .when(move |x: &u32| x % BUCKETS == bucket)
                .then(move |_| bucket),
        )
        .unwrap();
}

#[test]
fn concurrent_mutation_never_tears_a_snapshot() {
    let engine: Engine<u32, u32> = Engine::builder()
        .with_default_action(|_| u32::MAX)
        .build();
    for bucket in 0..BUCKETS {
        bucket_rule(&engine, bucket, bucket as i32);
    }

    let stop = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4u64)
        .map(|seed| {
            let engine = engine.clone();
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut rng = fastrand::Rng::with_seed(seed);
                while !stop.load(Ordering::Relaxed) {
                    let request = rng.u32(..);
                    match engine.dispatch(&request) {
                        // A bucket rule only ever claims its own residue;
                        // everything else lands on the default.
                        Outcome::Handled(bucket) if bucket != u32::MAX => {
                            assert_eq!(bucket, request % BUCKETS);
                        }
                        Outcome::Handled(_) => {}
                        other => panic!("unexpected outcome kind {:?}", other.kind()),
                    }

                    // Every published listing is sorted and duplicate-free.
                    let infos = engine.rules();
                    for pair in infos.windows(2) {
                        assert!(
                            (pair[0].priority, pair[0].seq) < (pair[1].priority, pair[1].seq),
                            "snapshot out of order"
                        );
                    }
                    let names: HashSet<&str> =
                        infos.iter().map(|info| info.name.as_str()).collect();
                    assert_eq!(names.len(), infos.len(), "duplicate rule name in snapshot");
                }
            })
        })
        .collect();

    let writers: Vec<_> = (0..2u64)
        .map(|seed| {
            let engine = engine.clone();
            thread::spawn(move || {
                let mut rng = fastrand::Rng::with_seed(100 + seed);
                for _ in 0..WRITER_OPS {
                    let bucket = rng.u32(..BUCKETS);
                    if rng.bool() {
                        bucket_rule(&engine, bucket, rng.i32(-100..100));
                    } else {
                        engine.unregister(&format!("bucket-{bucket}"));
                    }
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }
    stop.store(true, Ordering::Relaxed);
    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn replace_storm_keeps_exactly_one_rule_per_name() {
    let engine: Engine<u32, u64> = Engine::new();
    engine
        .register(RuleSpec::new("hot", 0).when(|_| true).then(|_| 0u64))
        .unwrap();

    let stop = Arc::new(AtomicBool::new(false));

    let reader = {
        let engine = engine.clone();
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                // Always exactly one version of the hot rule, and it handles.
                let infos = engine.rules();
                assert_eq!(infos.len(), 1);
                assert_eq!(infos[0].name, "hot");
                assert!(engine.dispatch(&1).is_handled());
            }
        })
    };

    let writers: Vec<_> = (0..2)
        .map(|writer: u64| {
            let engine = engine.clone();
            thread::spawn(move || {
                for version in 0..WRITER_OPS as u64 {
                    let stamp = writer << 32 | version;
                    engine
                        .register(
                            RuleSpec::new("hot", 0).when(|_| true).then(move |_| stamp),
                        )
                        .unwrap();
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }
    stop.store(true, Ordering::Relaxed);
    reader.join().unwrap();
}
