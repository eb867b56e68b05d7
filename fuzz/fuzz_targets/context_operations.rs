#![no_main]

use libfuzzer_sys::fuzz_target;
use scene_di::{
    implements, injection_points, ConstructError, ConstructorArgs, DiContext, DiError, Injectable,
    Lifetime, Resolver, Scope, ServicePolicy,
};
use std::sync::Arc;

trait TestTrait: Send + Sync {
    fn get_value(&self) -> u8;
}

struct TestServiceImpl {
    value: u8,
}

impl TestTrait for TestServiceImpl {
    fn get_value(&self) -> u8 {
        self.value
    }
}

impl Injectable for TestServiceImpl {
    fn construct(args: &ConstructorArgs) -> Result<Self, ConstructError> {
        match args.get::<u8>(0) {
            Some(0) => Err(ConstructError::failed("zero")),
            Some(value) => Ok(TestServiceImpl { value: *value }),
            None => Ok(TestServiceImpl { value: 1 }),
        }
    }
}

implements!(dyn TestTrait => TestServiceImpl);

#[derive(Default)]
struct Consumer {
    service: Option<Arc<dyn TestTrait>>,
}

injection_points!(Consumer { service: dyn TestTrait });

fn scope_of(byte: u8) -> Scope {
    if byte & 1 == 0 {
        Scope::Global
    } else {
        Scope::Scene
    }
}

fuzz_target!(|data: &[u8]| {
    let mut context = DiContext::new();

    // Each pair of bytes is one operation
    for chunk in data.chunks(2) {
        let op = chunk[0] % 8;
        let arg = chunk.get(1).copied().unwrap_or(0);

        match op {
            0 | 1 => {
                let lifetime = if op == 0 {
                    Lifetime::Singleton
                } else {
                    Lifetime::Transient
                };
                let policy = ServicePolicy::new(lifetime, scope_of(arg));
                let bound = context
                    .bind_with::<dyn TestTrait, _>(TestServiceImpl { value: arg }, policy)
                    .unwrap();
                let _ = bound.get_value();
            }
            2 => {
                let _ = context.unbind::<dyn TestTrait>();
            }
            3 => match context.resolve_with::<dyn TestTrait>(&ConstructorArgs::new().with(arg)) {
                Ok(service) => {
                    let _ = service.get_value();
                }
                Err(DiError::CannotResolve(_))
                | Err(DiError::TransientClassInstantiationFailed { .. }) => {}
                Err(other) => panic!("unexpected error: {}", other),
            },
            4 => context.clear_scene_container(),
            5 => context.declare_contract_scope::<dyn TestTrait>(scope_of(arg)),
            6 => {
                let mut consumer = Consumer::default();
                let report = context.inject_dependencies(&mut consumer);
                assert_eq!(consumer.service.is_some(), report.is_complete());
            }
            _ => context.clear(),
        }

        // Resolution never panics, whatever the state
        let _ = context.resolve_or_default::<dyn TestTrait>();
    }
});
