//! Fault isolation: a faulty addon degrades to "that addon is gone".

use std::rc::Rc;
use std::sync::Arc;

use kindling::addon::{AddonManager, ScriptEngine};
use kindling::package::{Package, PackageRegistry};
use kindling::runtime::{Fault, FrameClock, Tag, Task};
use kindling::script::SleepRequest;

use crate::common::{
    addon, EventLog, GuestStep, RecordingCommands, RecordingSink, ScriptedEngine,
};

fn fault_fixture(
    scripts: Vec<(&str, Vec<GuestStep>)>,
) -> (AddonManager, RecordingSink, RecordingCommands, EventLog) {
    let events: EventLog = Rc::default();
    let mut registry = PackageRegistry::new();
    let mut engine = ScriptedEngine::new(&events);
    for (name, steps) in scripts {
        registry.insert(addon(name, &[]));
        engine = engine.with_script(name, steps);
    }
    let mut manager = AddonManager::new(registry, Box::new(engine));
    let sink = RecordingSink::default();
    let commands = RecordingCommands::default();
    manager.set_fault_sink(Box::new(sink.clone()));
    manager.set_command_sink(Box::new(commands.clone()));
    (manager, sink, commands, events)
}

#[test]
fn test_fault_reports_and_unloads_the_owner() {
    let (mut manager, sink, commands, _events) =
        fault_fixture(vec![("crasher", vec![GuestStep::Fail("boom")])]);
    manager.load(&["crasher"]).unwrap();

    manager.run_until_idle().unwrap();

    let reports = sink.reports.borrow();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, "crasher");
    assert!(reports[0].1.contains("boom"));
    assert!(!manager.is_loaded("crasher"));
    assert_eq!(*commands.purged.borrow(), vec!["crasher"]);
}

#[test]
fn test_other_addons_survive_a_faulting_one() {
    let (mut manager, sink, _commands, _events) = fault_fixture(vec![
        ("crasher", vec![GuestStep::Fail("boom")]),
        ("steady", vec![GuestStep::Sleep(SleepRequest::Frames(100))]),
    ]);
    manager.load(&["crasher", "steady"]).unwrap();

    manager.run_until_idle().unwrap();

    assert_eq!(sink.reports.borrow().len(), 1);
    assert!(!manager.is_loaded("crasher"));
    assert!(manager.is_loaded("steady"));
}

#[test]
fn test_foreign_context_sleep_is_a_fault() {
    let (mut manager, sink, _commands, _events) = fault_fixture(vec![(
        "nested",
        vec![GuestStep::SleepForeign(SleepRequest::Frames(1))],
    )]);
    manager.load(&["nested"]).unwrap();

    manager.run_until_idle().unwrap();

    let reports = sink.reports.borrow();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, "nested");
    assert!(reports[0].1.contains("unschedulable"));
    assert!(!manager.is_loaded("nested"));
}

/// Engine whose packages boot two tasks that both fault on first resume.
struct TwinCrashEngine;

impl ScriptEngine for TwinCrashEngine {
    fn instantiate(
        &mut self,
        _package: &Arc<Package>,
        _clock: &FrameClock,
    ) -> Result<Vec<Task>, Fault> {
        Ok(vec![
            Task::new(|| Err(anyhow::anyhow!("first boom"))),
            Task::new(|| Err(anyhow::anyhow!("second boom"))),
        ])
    }
}

#[test]
fn test_every_fault_from_one_package_keeps_its_attribution() {
    let mut registry = PackageRegistry::new();
    registry.insert(addon("dual", &[]));
    let mut manager = AddonManager::new(registry, Box::new(TwinCrashEngine));
    let sink = RecordingSink::default();
    let commands = RecordingCommands::default();
    manager.set_fault_sink(Box::new(sink.clone()));
    manager.set_command_sink(Box::new(commands.clone()));
    manager.load(&["dual"]).unwrap();

    manager.run_until_idle().unwrap();

    // Both faults land in one pump; unloading after the first must not
    // strip the owner from the second.
    let reports = sink.reports.borrow();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].0, "dual");
    assert!(reports[0].1.contains("first boom"));
    assert_eq!(reports[1].0, "dual");
    assert!(reports[1].1.contains("second boom"));
    assert!(!manager.is_loaded("dual"));
    // One owner, one unload, one command purge.
    assert_eq!(*commands.purged.borrow(), vec!["dual"]);
}

#[test]
fn test_unattributed_fault_reports_under_host_name() {
    let (mut manager, sink, commands, _events) =
        fault_fixture(vec![("steady", vec![GuestStep::Sleep(SleepRequest::Frames(100))])]);
    manager.load(&["steady"]).unwrap();
    manager
        .scheduler_mut()
        .schedule(Task::new(|| Err(anyhow::anyhow!("ambient boom"))), Tag::HOST);

    manager.run_until_idle().unwrap();

    let reports = sink.reports.borrow();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, "host");
    assert!(reports[0].1.contains("ambient boom"));
    assert!(manager.is_loaded("steady"));
    assert!(commands.purged.borrow().is_empty());
}

#[test]
fn test_faulting_addon_stops_getting_resumed() {
    let (mut manager, sink, _commands, events) = fault_fixture(vec![(
        "crasher",
        vec![GuestStep::Yield, GuestStep::Fail("boom"), GuestStep::Yield],
    )]);
    manager.load(&["crasher"]).unwrap();

    manager.run_until_idle().unwrap();
    assert_eq!(sink.reports.borrow().len(), 1);

    // Resumes stop at the fault; the trailing step never runs.
    let count = events
        .borrow()
        .iter()
        .filter(|e| **e == "crasher resumed")
        .count();
    assert_eq!(count, 2);

    manager.tick().unwrap();
    let after = events
        .borrow()
        .iter()
        .filter(|e| **e == "crasher resumed")
        .count();
    assert_eq!(after, 2);
}
