#![cfg(feature = "config")]

use scene_di::{
    implements, key_of, ConstructError, ConstructorArgs, DiContext, Injectable, Lifetime,
    PolicyOverride, PolicyTable, Resolver, Scope,
};
use std::sync::Arc;

trait Audio: Send + Sync {
    fn name(&self) -> &'static str;
}

struct Mixer;
impl Audio for Mixer {
    fn name(&self) -> &'static str {
        "mixer"
    }
}
impl Injectable for Mixer {
    fn construct(_: &ConstructorArgs) -> Result<Self, ConstructError> {
        Ok(Mixer)
    }
}

struct Jukebox;
impl Audio for Jukebox {
    fn name(&self) -> &'static str {
        "jukebox"
    }
}
impl Injectable for Jukebox {
    const SCOPE: Scope = Scope::Scene;
}

implements!(dyn Audio => Mixer, Jukebox);

#[test]
fn test_service_override_changes_lifetime_and_scope() {
    let table = PolicyTable::new().with_service(
        std::any::type_name::<Mixer>(),
        PolicyOverride {
            lifetime: Some(Lifetime::Transient),
            scope: Some(Scope::Scene),
        },
    );
    let mut context = DiContext::new().with_policies(table);

    context.bind::<dyn Audio, _>(Mixer).unwrap();

    assert!(context.has_scene());
    let a = context.resolve::<dyn Audio>().unwrap();
    let b = context.resolve::<dyn Audio>().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn test_contract_scope_from_table() {
    let json = format!(
        r#"{{ "contracts": {{ "{}": "scene" }} }}"#,
        std::any::type_name::<dyn Audio>()
    );
    let mut context = DiContext::new();
    context.set_policies(PolicyTable::from_json_str(&json).unwrap());

    assert_eq!(context.contract_scope(&key_of::<dyn Audio>()), Scope::Scene);

    context.bind::<dyn Audio, _>(Mixer).unwrap();
    context.bind::<dyn Audio, _>(Jukebox).unwrap();
    assert_eq!(context.resolve::<dyn Audio>().unwrap().name(), "jukebox");
}

#[test]
fn test_declared_scope_beats_table() {
    let table = PolicyTable::new().with_contract(std::any::type_name::<dyn Audio>(), Scope::Scene);
    let mut context = DiContext::new().with_policies(table);
    context.declare_contract_scope::<dyn Audio>(Scope::Global);

    context.bind::<dyn Audio, _>(Mixer).unwrap();
    context.bind::<dyn Audio, _>(Jukebox).unwrap();
    assert_eq!(context.resolve::<dyn Audio>().unwrap().name(), "mixer");
}

#[test]
fn test_yaml_policy_file() {
    let path = std::env::temp_dir().join("scene_di_policies_test.yaml");
    let yaml = format!(
        "services:\n  \"{}\":\n    scope: global\n",
        std::any::type_name::<Jukebox>()
    );
    std::fs::write(&path, yaml).unwrap();

    let table = PolicyTable::from_path(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let context = DiContext::new().with_policies(table);
    assert_eq!(context.policy_for::<Jukebox>().scope, Scope::Global);
    assert_eq!(context.policy_for::<Mixer>().scope, Scope::Global);
    assert_eq!(context.policy_for::<Jukebox>().lifetime, Lifetime::Singleton);
}
