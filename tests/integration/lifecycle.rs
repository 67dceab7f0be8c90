//! Package lifecycle: scan, load, unload, reload.

use std::rc::Rc;

use kindling::addon::{AddonError, AddonManager};
use kindling::package::{PackageError, PackageRegistry};
use kindling::util::config::RuntimeConfig;

use crate::common::{addon, events_of, library, EventLog, StubEngine};

fn manager_with(
    packages: Vec<kindling::package::Package>,
    events: &EventLog,
) -> AddonManager {
    let mut registry = PackageRegistry::new();
    for package in packages {
        registry.insert(package);
    }
    AddonManager::new(registry, Box::new(StubEngine::new(events)))
}

#[test]
fn test_load_boots_dependencies_first() {
    let events: EventLog = Rc::default();
    let mut manager = manager_with(
        vec![addon("a", &[]), addon("b", &["a"]), addon("c", &["a"])],
        &events,
    );

    manager.load(&["b", "c"]).unwrap();

    let boots: Vec<_> = events_of(&events)
        .into_iter()
        .filter(|e| e.starts_with("boot"))
        .collect();
    assert_eq!(boots.len(), 3);
    assert_eq!(boots[0], "boot a");
    assert!(boots.contains(&"boot b".to_string()));
    assert!(boots.contains(&"boot c".to_string()));
    assert!(manager.is_loaded("a"));
    assert!(manager.is_loaded("b"));
    assert!(manager.is_loaded("c"));
}

#[test]
fn test_loaded_tasks_run_on_pump() {
    let events: EventLog = Rc::default();
    let mut manager = manager_with(vec![addon("solo", &[])], &events);

    manager.load(&["solo"]).unwrap();
    manager.run_until_idle().unwrap();

    assert!(events_of(&events).contains(&"solo ran".to_string()));
}

#[test]
fn test_unload_takes_dependents_down_first() {
    let events: EventLog = Rc::default();
    let mut manager = manager_with(vec![addon("base", &[]), addon("ui", &["base"])], &events);
    manager.load(&["ui"]).unwrap();

    // Unloading the dependency sweeps its dependents along.
    manager.unload(&["base"]).unwrap();
    assert!(!manager.is_loaded("base"));
    assert!(!manager.is_loaded("ui"));
    assert!(manager.loaded().is_empty());
}

#[test]
fn test_reload_leaf_touches_only_the_leaf() {
    let events: EventLog = Rc::default();
    let mut manager = manager_with(vec![addon("base", &[]), addon("ui", &["base"])], &events);
    manager.load(&["ui"]).unwrap();
    events.borrow_mut().clear();

    manager.reload(&["ui"]).unwrap();

    // The still-loaded dependency is not rebooted.
    assert_eq!(events_of(&events), vec!["boot ui"]);
    assert!(manager.is_loaded("base"));
    assert!(manager.is_loaded("ui"));
}

#[test]
fn test_reload_dependency_revives_swept_dependents() {
    let events: EventLog = Rc::default();
    let mut manager = manager_with(vec![addon("base", &[]), addon("ui", &["base"])], &events);
    manager.load(&["ui"]).unwrap();
    events.borrow_mut().clear();

    manager.reload(&["base"]).unwrap();

    assert_eq!(events_of(&events), vec!["boot base", "boot ui"]);
    assert!(manager.is_loaded("base"));
    assert!(manager.is_loaded("ui"));
}

#[test]
fn test_libraries_order_but_never_boot() {
    let events: EventLog = Rc::default();
    let mut manager = manager_with(vec![library("lib", &[]), addon("app", &["lib"])], &events);
    manager.load(&["app"]).unwrap();

    assert_eq!(events_of(&events), vec!["boot app"]);
    assert!(manager.is_loaded("app"));
    assert!(!manager.is_loaded("lib"));
}

#[test]
fn test_missing_required_dependency_leaves_set_unchanged() {
    let events: EventLog = Rc::default();
    let mut manager = manager_with(vec![addon("ok", &[]), addon("broken", &["ghost"])], &events);
    manager.load(&["ok"]).unwrap();

    let err = manager.load(&["broken"]).unwrap_err();
    match err {
        AddonError::Package(PackageError::MissingDependency { name, required_by }) => {
            assert_eq!(name, "ghost");
            assert_eq!(required_by, "broken");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(manager.loaded(), vec!["ok"]);
}

#[test]
fn test_cycle_reported_by_member_names() {
    let events: EventLog = Rc::default();
    let mut manager = manager_with(vec![addon("x", &["y"]), addon("y", &["x"])], &events);

    let err = manager.load(&["x"]).unwrap_err();
    match err {
        AddonError::Package(PackageError::DependencyCycle(members)) => {
            assert!(members.contains(&"x".to_string()));
            assert!(members.contains(&"y".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(manager.loaded().is_empty());
}

#[test]
fn test_instantiate_failure_keeps_earlier_packages() {
    let events: EventLog = Rc::default();
    let mut registry = PackageRegistry::new();
    registry.insert(addon("base", &[]));
    registry.insert(addon("flaky", &["base"]));
    let mut engine = StubEngine::new(&events);
    engine.fail_for.push("flaky".to_string());
    let mut manager = AddonManager::new(registry, Box::new(engine));

    let err = manager.load(&["flaky"]).unwrap_err();
    match err {
        AddonError::Instantiate { name, .. } => assert_eq!(name, "flaky"),
        other => panic!("unexpected error: {other}"),
    }
    // The dependency loaded before the failure stays up.
    assert_eq!(manager.loaded(), vec!["base"]);
}

#[test]
fn test_unload_all_empties_the_set() {
    let events: EventLog = Rc::default();
    let mut manager = manager_with(
        vec![addon("a", &[]), addon("b", &["a"]), addon("c", &[])],
        &events,
    );
    manager.load(&["b", "c"]).unwrap();

    manager.unload_all().unwrap();
    assert!(manager.loaded().is_empty());
}

#[test]
fn test_config_scan_and_autoload() {
    let dir = tempfile::tempdir().unwrap();
    for (name, body) in [
        ("distance", "[package]\nname = \"distance\"\n"),
        (
            "timers",
            "[package]\nname = \"timers\"\n\n[[dependency]]\nname = \"distance\"\n",
        ),
    ] {
        let pkg = dir.path().join(name);
        std::fs::create_dir(&pkg).unwrap();
        std::fs::write(pkg.join("addon.toml"), body).unwrap();
    }

    let config = RuntimeConfig {
        addon_dirs: vec![dir.path().to_path_buf()],
        autoload: vec!["timers".to_string()],
        ..RuntimeConfig::default()
    };
    let registry = config.build_registry().unwrap();
    assert_eq!(registry.len(), 2);

    let events: EventLog = Rc::default();
    let mut manager = AddonManager::new(registry, Box::new(StubEngine::new(&events)));
    manager.load(&config.autoload).unwrap();
    assert_eq!(events_of(&events), vec!["boot distance", "boot timers"]);
}
