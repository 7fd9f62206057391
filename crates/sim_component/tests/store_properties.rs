use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use sim_component::{component_types, Component, Entity, Store};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct A;

impl Component for A {
    fn type_name() -> &'static str {
        "a"
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct B;

impl Component for B {
    fn type_name() -> &'static str {
        "b"
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct C;

impl Component for C {
    fn type_name() -> &'static str {
        "c"
    }
}

/// Which of the three kinds each entity holds, plus whether it gets removed.
fn arb_membership() -> impl Strategy<Value = Vec<(bool, bool, bool, bool)>> {
    prop::collection::vec((any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()), 0..60)
}

fn build(membership: &[(bool, bool, bool, bool)]) -> (Store, Vec<Entity>) {
    let mut store = Store::new();
    let mut expected = Vec::new();
    for &(has_a, has_b, has_c, removed) in membership {
        let e = store.create_entity();
        if has_a {
            store.add_component(e, A);
        }
        if has_b {
            store.add_component(e, B);
        }
        if has_c {
            store.add_component(e, C);
        }
        if removed {
            store.remove_entity(e);
        } else if has_a && has_b && has_c {
            expected.push(e);
        }
    }
    (store, expected)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_ids_strictly_increase(count in 1usize..200) {
        let mut store = Store::new();
        let ids: Vec<_> = (0..count).map(|_| store.create_entity()).collect();
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(store.entity_count(), count);
    }

    #[test]
    fn test_intersection_matches_brute_force(membership in arb_membership()) {
        let (store, expected) = build(&membership);

        let mut result = store.entities_with_components(&component_types![A, B, C]).to_vec();
        result.sort();
        prop_assert_eq!(&result, &expected);

        // Argument order never changes the answer.
        let mut shuffled = store.entities_with_components(&component_types![C, A, B]).to_vec();
        shuffled.sort();
        prop_assert_eq!(&shuffled, &expected);
    }

    #[test]
    fn test_cached_results_track_mutations(membership in arb_membership(), extra in 0usize..5) {
        let (mut store, _) = build(&membership);
        let before = store.entities_with::<A>().len();

        for _ in 0..extra {
            let e = store.create_entity();
            store.add_component(e, A);
        }
        prop_assert_eq!(store.entities_with::<A>().len(), before + extra);
    }
}
