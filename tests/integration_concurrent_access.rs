//! Concurrent access integration tests
//!
//! The process-wide handle serializes access behind one lock; these tests
//! check that threads see consistent singletons and distinct transients.

use scene_di::{
    global, implements, ConstructError, ConstructorArgs, Injectable, Lifetime, Scope,
};
use serial_test::serial;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

trait Counter: Send + Sync {
    fn increment(&self) -> u32;
    fn get_count(&self) -> u32;
}

#[derive(Default)]
struct CounterService {
    count: AtomicU32,
}

impl Counter for CounterService {
    fn increment(&self) -> u32 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn get_count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }
}

impl Injectable for CounterService {}

struct Ticket {
    number: u32,
}

static TICKETS: AtomicU32 = AtomicU32::new(0);

impl Injectable for Ticket {
    const LIFETIME: Lifetime = Lifetime::Transient;
    const SCOPE: Scope = Scope::Scene;

    fn construct(_: &ConstructorArgs) -> Result<Self, ConstructError> {
        Ok(Ticket {
            number: TICKETS.fetch_add(1, Ordering::SeqCst),
        })
    }
}

implements!(dyn Counter => CounterService);

const THREADS: usize = 8;
const ITERATIONS: u32 = 50;

#[test]
#[serial]
fn test_singleton_shared_across_threads() {
    global::clear();
    global::bind::<dyn Counter, _>(CounterService::default()).unwrap();

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ITERATIONS {
                    global::resolve::<dyn Counter>().unwrap().increment();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let counter = global::resolve::<dyn Counter>().unwrap();
    assert_eq!(counter.get_count(), THREADS as u32 * ITERATIONS);
    global::clear();
}

#[test]
#[serial]
fn test_transients_unique_across_threads() {
    global::clear();
    global::bind::<Ticket, _>(Ticket { number: u32::MAX }).unwrap();

    let numbers: Vec<u32> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    (0..ITERATIONS)
                        .map(|_| global::resolve::<Ticket>().unwrap().number)
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });

    let mut unique = numbers.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), numbers.len());
    assert!(!numbers.contains(&u32::MAX));
    global::clear();
}

#[test]
#[serial]
fn test_scene_clear_while_reading() {
    global::clear();
    global::bind::<dyn Counter, _>(CounterService::default()).unwrap();

    let reader = thread::spawn(|| {
        for _ in 0..ITERATIONS {
            // Global binding is never affected by scene teardown
            assert!(global::resolve::<dyn Counter>().is_ok());
        }
    });

    for _ in 0..ITERATIONS {
        global::bind::<Ticket, _>(Ticket { number: 0 }).unwrap();
        global::clear_scene_container();
    }

    reader.join().unwrap();
    assert!(global::resolve::<Ticket>().is_err());
    global::clear();
}
