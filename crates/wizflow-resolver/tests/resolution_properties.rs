use proptest::prelude::*;
use std::sync::Arc;
use wizflow_resolver::{Category, Resolver, TemplatePack};

fn base_id() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

proptest! {
    #[test]
    fn prop_registered_id_with_suffix_falls_back(id in base_id(), suffix in "[a-z0-9_]{1,8}") {
        let pack = TemplatePack::new("base").with_flow_step(id.clone(), 1_u32);
        let resolver = Resolver::with_packs([pack]).unwrap();

        let res = resolver.resolve(Category::FlowStep, &format!("{id}-{suffix}"));
        prop_assert_eq!(res.component, Some(1));
        prop_assert_eq!(res.resolved_id, Some(id));
    }

    #[test]
    fn prop_resolution_is_stable_across_repeats(id in base_id(), repeats in 1..10usize) {
        let pack = TemplatePack::new("base").with_flow_step(id.clone(), 7_u32);
        let resolver = Resolver::with_packs([pack]).unwrap();

        for _ in 0..repeats {
            prop_assert_eq!(resolver.resolve(Category::FlowStep, &id).component, Some(7));
        }
        let stats = resolver.cache_stats();
        prop_assert_eq!(stats.misses, 1);
        prop_assert_eq!(stats.hits, (repeats - 1) as u64);
    }

    #[test]
    fn prop_first_pack_in_priority_wins(priorities in proptest::collection::vec(-5..5i32, 1..6)) {
        let packs = priorities.iter().enumerate().map(|(n, &priority)| {
            TemplatePack::new(format!("pack-{n}"))
                .with_priority(priority)
                .with_flow_step("shared", n)
        });
        let resolver = Resolver::with_packs(packs).unwrap();

        let max = priorities.iter().copied().max().unwrap();
        let expected = priorities.iter().position(|&p| p == max).unwrap();
        prop_assert_eq!(resolver.resolve(Category::FlowStep, "shared").component, Some(expected));
    }
}

#[test]
fn concurrent_resolution_and_registration() {
    let resolver = Arc::new(
        Resolver::with_packs([TemplatePack::new("base").with_flow_step("x", "base")]).unwrap(),
    );

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    assert!(resolver.resolve(Category::FlowStep, "x").is_resolved());
                }
            })
        })
        .collect();

    resolver
        .register(TemplatePack::new("brand").with_priority(1).with_flow_step("x", "brand"))
        .unwrap();

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(resolver.resolve(Category::FlowStep, "x").component, Some("brand"));
}
