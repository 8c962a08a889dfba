mod common;

use common::{chart, dataset};
use docsearch_core::config::{CustomSearchConfig, SearchConfig};
use docsearch_query::{HandlerRegistry, SearchRequestHandler};
use std::collections::HashMap;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_lookups_share_one_handler() {
    const THREADS: usize = 16;

    let registry = HandlerRegistry::new(SearchConfig::default(), CustomSearchConfig::default());
    let barrier = Barrier::new(THREADS);

    let handlers: Vec<Arc<SearchRequestHandler>> = thread::scope(|scope| {
        let (registry, barrier) = (&registry, &barrier);
        let workers = (0..THREADS)
            .map(|_| {
                scope.spawn(move || {
                    barrier.wait();
                    registry.get_handler(&[dataset(), chart()], None)
                })
            })
            .collect::<Vec<_>>();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect()
    });

    assert_eq!(registry.len(), 1);
    assert!(handlers
        .iter()
        .all(|handler| Arc::ptr_eq(handler, &handlers[0])));
}

#[test]
fn test_custom_override_applies_on_first_construction_only() {
    let registry = HandlerRegistry::new(SearchConfig::default(), CustomSearchConfig::default());
    let boosted = CustomSearchConfig {
        field_boosts: HashMap::from([("name".to_string(), 3.0)]),
    };

    let first = registry.get_handler(&[dataset()], Some(&boosted));
    let second = registry.get_handler(&[dataset()], None);

    assert!(Arc::ptr_eq(&first, &second));
    assert!(registry.get_handler(&[chart()], None).entity_types()[0].name == "chart");
    assert_eq!(registry.len(), 2);
}
