//! A host loop that loads two scenes in turn.
//!
//! Global services survive scene changes; scene services are dropped by the
//! host calling `clear_scene_container` when a scene unloads.

use scene_di::{
    global, implements, injection_points, ConstructError, ConstructorArgs, Injectable, Lifetime,
    MetricsObserver, Scope,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

trait SaveSystem: Send + Sync {
    fn slot(&self) -> u32;
}

trait LevelMusic: Send + Sync {
    fn track(&self) -> String;
}

trait Spawner: Send + Sync {
    fn spawn(&self) -> u32;
}

struct DiskSaves;
impl SaveSystem for DiskSaves {
    fn slot(&self) -> u32 {
        1
    }
}
impl Injectable for DiskSaves {}

struct SceneMusic {
    track: String,
}
impl LevelMusic for SceneMusic {
    fn track(&self) -> String {
        self.track.clone()
    }
}
impl Injectable for SceneMusic {
    const SCOPE: Scope = Scope::Scene;
}

static NEXT_ENEMY: AtomicU32 = AtomicU32::new(1);

struct EnemySpawner {
    id: u32,
}
impl Spawner for EnemySpawner {
    fn spawn(&self) -> u32 {
        self.id
    }
}
impl Injectable for EnemySpawner {
    const LIFETIME: Lifetime = Lifetime::Transient;
    const SCOPE: Scope = Scope::Scene;

    fn construct(_: &ConstructorArgs) -> Result<Self, ConstructError> {
        Ok(EnemySpawner {
            id: NEXT_ENEMY.fetch_add(1, Ordering::Relaxed),
        })
    }
}

implements!(dyn SaveSystem => DiskSaves);
implements!(dyn LevelMusic => SceneMusic);
implements!(dyn Spawner => EnemySpawner);

#[derive(Default)]
struct Hud {
    saves: Option<Arc<dyn SaveSystem>>,
    music: Option<Arc<dyn LevelMusic>>,
}

injection_points!(Hud {
    saves: dyn SaveSystem,
    music: dyn LevelMusic,
});

fn load_scene(name: &str) {
    global::bind::<dyn LevelMusic, _>(SceneMusic {
        track: format!("{}-theme", name),
    })
    .expect("scene music binds");
    global::bind::<dyn Spawner, _>(EnemySpawner { id: 0 }).expect("spawner binds");
}

fn run_scene(name: &str) {
    let mut hud = Hud::default();
    let report = global::inject_dependencies(&mut hud);
    println!("[{}] injected {:?}, skipped {:?}", name, report.injected(), report.skipped());

    if let Some(music) = &hud.music {
        println!("[{}] playing {}", name, music.track());
    }
    if let Some(saves) = &hud.saves {
        println!("[{}] saving to slot {}", name, saves.slot());
    }

    for _ in 0..2 {
        let spawner = global::resolve_or_panic::<dyn Spawner>();
        println!("[{}] spawned enemy #{}", name, spawner.spawn());
    }
}

fn unload_scene(name: &str) {
    global::clear_scene_container();
    println!("[{}] unloaded, scene container present: {}", name, global::has_scene());
}

fn main() {
    let metrics = Arc::new(MetricsObserver::new());
    global::add_observer(metrics.clone());

    global::bind::<dyn SaveSystem, _>(DiskSaves).expect("save system binds");

    for scene in ["forest", "castle"] {
        load_scene(scene);
        run_scene(scene);
        unload_scene(scene);
    }

    // Between scenes only the global service is reachable
    let mut hud = Hud::default();
    let report = global::inject_dependencies(&mut hud);
    println!("[menu] injected {:?}, skipped {:?}", report.injected(), report.skipped());

    println!(
        "binds: {}, resolutions: {}, failures: {}",
        metrics.bind_count(),
        metrics.resolution_count(),
        metrics.failure_count()
    );

    global::clear();
}
