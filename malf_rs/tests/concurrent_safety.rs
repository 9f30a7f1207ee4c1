//! Concurrency tests: thread-count invariance and sharing inputs across
//! threads.

use std::sync::Arc;
use std::thread;

use malf_core::GridGeometry;
use malf_io::{FusionConfig, SignedDistanceMap, Volume};
use malf_rs::{fuse, VotingEngine};

/// Cube large enough to split into several rayon chunks.
fn inputs(n: usize) -> (Volume, Vec<(Volume, SignedDistanceMap)>) {
    let geometry = GridGeometry::with_dims([n, n, n]).unwrap();
    let c = (n as f64 - 1.0) / 2.0;
    let target = Volume::from_fn(geometry.clone(), |v| (v.x + 2 * v.y + 3 * v.z) as f32);

    let atlases = (0..4)
        .map(|k| {
            let shift = k as f32 * 7.0;
            let radius = n as f64 / 4.0 + k as f64;
            let intensity = Volume::from_fn(geometry.clone(), |v| {
                (v.x + 2 * v.y + 3 * v.z) as f32 + shift
            });
            let distance = Volume::from_physical_fn(geometry.clone(), |p| {
                (((p.x - c).powi(2) + (p.y - c).powi(2) + (p.z - c).powi(2)).sqrt() - radius)
                    as f32
            });
            (intensity, SignedDistanceMap::from_volume(distance).unwrap())
        })
        .collect();

    (target, atlases)
}

fn run(config: FusionConfig, target: &Volume, atlases: &[(Volume, SignedDistanceMap)]) -> Vec<f32> {
    let output = fuse(config, target.clone(), atlases.iter().map(|(i, d)| (i, d))).unwrap();
    output.weight_map.as_slice().to_vec()
}

#[test]
fn test_results_independent_of_thread_count() {
    let (target, atlases) = inputs(24);
    let reference = run(FusionConfig::new().with_num_threads(1), &target, &atlases);

    for threads in [0, 2, 4, 8] {
        let weights = run(
            FusionConfig::new().with_num_threads(threads),
            &target,
            &atlases,
        );
        assert_eq!(weights, reference, "num_threads = {}", threads);
    }
}

#[test]
fn test_accumulators_independent_of_thread_count() {
    let (target, atlases) = inputs(20);

    let accumulate = |threads: usize| {
        let mut engine = VotingEngine::new(FusionConfig::new().with_num_threads(threads)).unwrap();
        engine.bind_target(target.clone());
        for (intensity, distance) in &atlases {
            engine.vote(intensity, distance).unwrap();
        }
        let acc = engine.accumulator().unwrap();
        (acc.like_outside.to_vec(), acc.like_inside.to_vec())
    };

    assert_eq!(accumulate(1), accumulate(3));
}

#[test]
fn test_engines_share_inputs_across_threads() {
    let (target, atlases) = inputs(16);
    let target = Arc::new(target);
    let atlases = Arc::new(atlases);
    let reference = run(FusionConfig::default(), &target, &atlases);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let target = Arc::clone(&target);
            let atlases = Arc::clone(&atlases);
            thread::spawn(move || run(FusionConfig::default(), &target, &atlases))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), reference);
    }
}

#[test]
fn test_engine_moves_between_threads() {
    let (target, atlases) = inputs(8);
    let mut engine = VotingEngine::default();
    engine.bind_target(target);

    let atlases = Arc::new(atlases);
    let worker_atlases = Arc::clone(&atlases);
    let mut engine = thread::spawn(move || {
        engine.vote(&worker_atlases[0].0, &worker_atlases[0].1).unwrap();
        engine
    })
    .join()
    .unwrap();

    engine.vote(&atlases[1].0, &atlases[1].1).unwrap();
    engine.normalize().unwrap();
    assert_eq!(engine.votes_cast(), 2);
}

#[test]
fn test_independent_sessions_in_parallel() {
    // Each thread binds its own target; sessions never observe each other
    let handles: Vec<_> = (0..4)
        .map(|k| {
            thread::spawn(move || {
                let geometry = GridGeometry::with_dims([6, 6, 6]).unwrap();
                let target = Volume::filled(geometry.clone(), 10.0);
                let value = if k % 2 == 0 { -100.0 } else { 100.0 };
                let distance =
                    SignedDistanceMap::from_volume(Volume::filled(geometry, value)).unwrap();

                let mut engine = VotingEngine::default();
                engine.bind_target(target.clone());
                engine.vote(&target, &distance).unwrap();
                engine.normalize().unwrap();
                (k, engine.finish().unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (k, weights) = handle.join().unwrap();
        let expected = if k % 2 == 0 { 1.0 } else { 0.0 };
        assert!(weights.as_slice().iter().all(|&w| w == expected), "thread {}", k);
    }
}
