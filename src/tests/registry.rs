use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crate::{GrowthPolicy, Registry, TypeKey};

struct Svc;
struct Other;

fn key(name: &str) -> TypeKey {
    TypeKey::named::<Svc>(name)
}

#[test]
fn empty_registry() {
    let registry: Registry<i32> = Registry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
    assert_eq!(registry.try_get(&key("a")), None);
}

#[test]
fn get_or_add_creates_then_returns_existing() {
    let registry = Registry::new();
    assert_eq!(registry.get_or_add(&key("a"), || 7), 7);
    // Second call must not invoke the factory.
    assert_eq!(registry.get_or_add(&key("a"), || unreachable!()), 7);
    assert_eq!(registry.len(), 1);
}

#[test]
fn add_or_replace_reports_replacement() {
    let registry = Registry::new();
    assert!(!registry.add_or_replace(&key("a"), 1));
    assert!(registry.add_or_replace(&key("a"), 2));
    assert_eq!(registry.try_get(&key("a")), Some(2));
    assert_eq!(registry.len(), 1);
}

#[test]
fn failed_factory_leaves_registry_untouched() {
    let registry: Registry<i32> = Registry::new();
    let result = registry.try_get_or_add(&key("a"), || Err("boom"));
    assert_eq!(result.unwrap_err(), "boom");
    assert!(registry.is_empty());
    assert_eq!(registry.try_get(&key("a")), None);

    // The failed attempt has no lasting effect; a later create succeeds.
    let value = registry.try_get_or_add(&key("a"), || Ok::<_, &str>(5));
    assert_eq!(value.unwrap(), 5);
}

/// For N racing callers, exactly one factory runs and all callers observe
/// its result.
#[test]
fn single_writer_wins() {
    let registry: Arc<Registry<usize>> = Arc::new(Registry::new());
    let call_count = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(std::sync::Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let call_count = Arc::clone(&call_count);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.get_or_add(&key("raced"), || {
                    call_count.fetch_add(1, Ordering::SeqCst);
                    i * 100
                })
            })
        })
        .collect();

    let results: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(call_count.load(Ordering::SeqCst), 1);
    assert!(results.windows(2).all(|w| w[0] == w[1]), "{results:?}");
    assert_eq!(registry.try_get(&key("raced")), Some(results[0]));
}

/// Readers racing a writer only ever observe valid snapshots: entry counts
/// never go backwards, and an observed key stays resolvable.
#[test]
fn reads_never_observe_torn_state() {
    let registry: Arc<Registry<u64>> = Arc::new(Registry::new());
    let writer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for i in 0..500_u64 {
                registry.add_or_replace(&key(&i.to_string()), i);
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let mut last_len = 0;
                let mut seen = 0_u64;
                while last_len < 500 {
                    let len = registry.len();
                    assert!(len >= last_len, "snapshot went backwards");
                    last_len = len;

                    // Once a key has been observed, it must stay observable.
                    while seen < 500 {
                        match registry.try_get(&key(&seen.to_string())) {
                            Some(value) => {
                                assert_eq!(value, seen);
                                seen += 1;
                            }
                            None => break,
                        }
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(registry.len(), 500);
}

#[test]
fn values_view_is_a_stable_snapshot() {
    let registry = Registry::new();
    for i in 0..3 {
        registry.add_or_replace(&key(&i.to_string()), i);
    }
    let view = registry.values();
    assert_eq!(view.len(), 3);

    registry.add_or_replace(&key("extra"), 99);
    // The previously materialized view is per-snapshot and unchanged.
    assert_eq!(view.len(), 3);
    assert_eq!(registry.values().len(), 4);
}

#[test]
fn keys_view_matches_len() {
    let registry = Registry::new();
    for i in 0..10 {
        registry.add_or_replace(&key(&i.to_string()), i);
    }
    let keys = registry.keys();
    assert_eq!(keys.len(), registry.len());
    for k in keys.iter() {
        assert!(registry.try_get(k).is_some());
    }
}

#[test]
fn entries_of_filters_one_type_across_names() {
    let registry = Registry::new();
    registry.add_or_replace(&TypeKey::of::<Svc>(), 1);
    registry.add_or_replace(&TypeKey::named::<Svc>("x"), 2);
    registry.add_or_replace(&TypeKey::named::<Svc>("y"), 3);
    registry.add_or_replace(&TypeKey::of::<Other>(), 4);

    let mut of_svc: Vec<i32> = registry.entries_of(TypeKey::of::<Svc>().type_id()).collect();
    of_svc.sort_unstable();
    assert_eq!(of_svc, [1, 2, 3]);

    // Restartable: a second pass sees the then-current snapshot.
    registry.add_or_replace(&TypeKey::named::<Svc>("z"), 5);
    assert_eq!(registry.entries_of(TypeKey::of::<Svc>().type_id()).count(), 4);
}

#[test]
fn fork_is_independent_both_ways() {
    let original = Registry::new();
    original.add_or_replace(&key("shared"), 1);

    let forked = original.fork();
    assert_eq!(forked.try_get(&key("shared")), Some(1));

    original.add_or_replace(&key("parent-only"), 2);
    forked.add_or_replace(&key("child-only"), 3);

    assert_eq!(original.try_get(&key("child-only")), None);
    assert_eq!(forked.try_get(&key("parent-only")), None);
    assert_eq!(original.len(), 2);
    assert_eq!(forked.len(), 2);
}

#[test]
fn custom_policy_is_carried() {
    let registry: Registry<i32> =
        Registry::with_policy(GrowthPolicy::with_table(&[4, 8], 2));
    assert_eq!(registry.snapshot().bucket_count(), 4);
}

#[test]
fn registry_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Registry<i32>>();
}
