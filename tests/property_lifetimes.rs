//! Property-based tests for lifetime and scope-routing laws.

use proptest::prelude::*;
use scene_di::{
    ConstructError, ConstructorArgs, Container, DiContext, Injectable, Lifetime, Resolver, Scope,
    ServicePolicy,
};
use std::sync::Arc;

#[derive(Debug)]
struct Tagged {
    id: u32,
}

impl Injectable for Tagged {
    fn construct(args: &ConstructorArgs) -> Result<Self, ConstructError> {
        Ok(Tagged {
            id: *args.required::<u32>(0)?,
        })
    }
}

#[derive(Debug, Clone)]
enum Op {
    Bind(Scope, u32),
    Unbind,
    ClearScene,
}

fn scope_strategy() -> impl Strategy<Value = Scope> {
    prop_oneof![Just(Scope::Global), Just(Scope::Scene)]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (scope_strategy(), 0u32..1000).prop_map(|(scope, id)| Op::Bind(scope, id)),
        1 => Just(Op::Unbind),
        1 => Just(Op::ClearScene),
    ]
}

// Property: the first singleton bind wins until the contract is unbound
proptest! {
    #[test]
    fn singleton_first_bind_wins(ids in prop::collection::vec(0u32..1000, 1..10)) {
        let mut container = Container::new();

        for id in &ids {
            container.bind::<Tagged, _>(Tagged { id: *id }, Lifetime::Singleton).unwrap();
        }

        let resolved = container.resolve::<Tagged>().unwrap();
        prop_assert_eq!(resolved.id, ids[0]);
        prop_assert_eq!(container.len(), 1);
    }
}

// Property: every transient resolution is a distinct instance built from its args
proptest! {
    #[test]
    fn transient_instances_are_distinct(ids in prop::collection::vec(0u32..1000, 1..20)) {
        let mut container = Container::new();
        container.bind::<Tagged, _>(Tagged { id: 0 }, Lifetime::Transient).unwrap();

        let instances: Vec<Arc<Tagged>> = ids
            .iter()
            .map(|id| {
                container
                    .resolve_with::<Tagged>(&ConstructorArgs::new().with(*id))
                    .unwrap()
            })
            .collect();

        for (instance, id) in instances.iter().zip(&ids) {
            prop_assert_eq!(instance.id, *id);
        }
        for (i, a) in instances.iter().enumerate() {
            for b in &instances[i + 1..] {
                prop_assert!(!Arc::ptr_eq(a, b));
            }
        }
    }
}

// Property: routing matches a two-slot model (global first, scene fallback,
// unbind scene first, scene clear leaves global)
proptest! {
    #[test]
    fn routing_matches_model(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut context = DiContext::new();
        let mut global: Option<u32> = None;
        let mut scene: Option<u32> = None;

        for op in ops {
            match op {
                Op::Bind(scope, id) => {
                    let bound = context
                        .bind_with::<Tagged, _>(Tagged { id }, ServicePolicy::singleton(scope))
                        .unwrap();
                    let slot = match scope {
                        Scope::Global => &mut global,
                        Scope::Scene => &mut scene,
                    };
                    let expected = *slot.get_or_insert(id);
                    prop_assert_eq!(bound.id, expected);
                }
                Op::Unbind => {
                    let removed = context.unbind::<Tagged>();
                    let expected = scene.take().is_some() || global.take().is_some();
                    prop_assert_eq!(removed, expected);
                }
                Op::ClearScene => {
                    context.clear_scene_container();
                    scene = None;
                }
            }

            let resolved = context.resolve_or_default::<Tagged>().map(|t| t.id);
            prop_assert_eq!(resolved, global.or(scene));
        }
    }
}
