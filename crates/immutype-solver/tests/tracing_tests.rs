//! Classification under an installed subscriber.

use super::*;
use crate::query_trace;
use tracing::Level;

fn with_trace_subscriber<R>(f: impl FnOnce() -> R) -> R {
    let subscriber = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::TRACE)
        .finish();
    tracing::subscriber::with_default(subscriber, f)
}

#[test]
fn test_query_events_are_enabled_at_trace() {
    with_trace_subscriber(|| assert!(query_trace::enabled()));
}

#[test]
fn test_tracing_does_not_change_results() {
    let store = TypeStore::new();
    let element = store.object(vec![PropertyInfo::new("foo", TypeId::STRING)]);
    let ty = store.readonly_array(element);

    let traced = with_trace_subscriber(|| {
        let mut checker = TypeImmutabilityChecker::new(&store);
        let first = checker.get_type_immutability(ty, Immutability::Immutable);
        let second = checker.get_type_immutability(ty, Immutability::Immutable);
        (first, second)
    });
    let plain = get_type_immutability(&store, ty, &[], CacheScope::Disabled, Immutability::Immutable);

    assert_eq!(traced, (Immutability::ReadonlyShallow, Immutability::ReadonlyShallow));
    assert_eq!(plain, Immutability::ReadonlyShallow);
}
