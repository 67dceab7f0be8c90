//! Addon manager: load, unload, reload and the fault-to-unload policy.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::package::{Package, PackageError, PackageKind, PackageRegistry};
use crate::runtime::{Fault, FrameClock, Scheduler, Tag, WaitState};

use crate::addon::engine::ScriptEngine;
use crate::addon::report::{CommandSink, FaultSink, LogSink, NullCommands, HOST_PSEUDO_NAME};

/// Errors raised by addon lifecycle operations.
#[derive(Debug, Error)]
pub enum AddonError {
    /// Resolution failed; the loaded set is unchanged.
    #[error(transparent)]
    Package(#[from] PackageError),

    /// The script engine failed to boot a package. Packages earlier in the
    /// load order stay loaded.
    #[error("Failed to instantiate '{name}': {fault}")]
    Instantiate {
        /// Package that failed to boot
        name: String,
        /// The underlying fault
        fault: Fault,
    },
}

/// Result type for addon lifecycle operations
pub type AddonResult<T> = Result<T, AddonError>;

/// One loaded, executable package.
#[derive(Debug, Clone)]
struct LoadedAddon {
    package: Arc<Package>,
    tag: Tag,
}

/// Faults captured during a pump, attributed by tag. Shared with the
/// scheduler's recovery handler.
type FaultLog = Rc<RefCell<Vec<(Tag, String)>>>;

/// Orchestrates the registry, resolver, scheduler and script engine.
///
/// The default fault policy degrades gracefully: a captured fault is
/// reported through the [`FaultSink`] under the owning package's name, then
/// that package alone is unloaded, purging its remaining tasks.
pub struct AddonManager {
    registry: PackageRegistry,
    scheduler: Scheduler,
    engine: Box<dyn ScriptEngine>,
    loaded: Vec<LoadedAddon>,
    faults: FaultLog,
    fault_sink: Box<dyn FaultSink>,
    commands: Box<dyn CommandSink>,
}

impl AddonManager {
    /// Create a manager over `registry`, using `engine` to boot guest code.
    pub fn new(
        registry: PackageRegistry,
        engine: Box<dyn ScriptEngine>,
    ) -> Self {
        let faults: FaultLog = Rc::default();
        let mut scheduler = Scheduler::new();
        let log = Rc::clone(&faults);
        // Capture and recover every fault; attribution and the unload
        // happen after the pump, outside scheduler bookkeeping.
        scheduler.set_error_handler(move |fault, tag| {
            log.borrow_mut().push((tag, format!("{fault:#}")));
            true
        });
        Self {
            registry,
            scheduler,
            engine,
            loaded: Vec::new(),
            faults,
            fault_sink: Box::new(LogSink),
            commands: Box::new(NullCommands),
        }
    }

    /// Replace the fault reporting sink.
    pub fn set_fault_sink(
        &mut self,
        sink: Box<dyn FaultSink>,
    ) {
        self.fault_sink = sink;
    }

    /// Replace the command-surface collaborator.
    pub fn set_command_sink(
        &mut self,
        sink: Box<dyn CommandSink>,
    ) {
        self.commands = sink;
    }

    /// Get the installed package registry.
    #[inline]
    pub fn registry(&self) -> &PackageRegistry {
        &self.registry
    }

    /// Get mutable access to the registry (install/uninstall surface).
    #[inline]
    pub fn registry_mut(&mut self) -> &mut PackageRegistry {
        &mut self.registry
    }

    /// Get the scheduler's frame clock.
    #[inline]
    pub fn clock(&self) -> FrameClock {
        self.scheduler.clock().clone()
    }

    /// Get mutable access to the scheduler, for ambient host tasks.
    #[inline]
    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Names of loaded executable packages, oldest first.
    pub fn loaded(&self) -> Vec<String> {
        self.loaded
            .iter()
            .map(|addon| addon.package.name().to_string())
            .collect()
    }

    /// Check whether `name` is currently loaded.
    pub fn is_loaded(
        &self,
        name: &str,
    ) -> bool {
        self.loaded.iter().any(|addon| addon.package.name() == name)
    }

    /// Load `names` and their required dependencies, dependencies first.
    ///
    /// Library-kind packages participate in ordering but are never
    /// instantiated. Resolution failure leaves the loaded set unchanged.
    pub fn load<S: AsRef<str>>(
        &mut self,
        names: &[S],
    ) -> AddonResult<()> {
        let order = self.registry.load_order(names)?;
        self.load_ordered(&order)
    }

    /// Unload `names` and everything that depends on them, dependents first.
    pub fn unload<S: AsRef<str>>(
        &mut self,
        names: &[S],
    ) -> AddonResult<()> {
        let order = self.registry.unload_order(names)?;
        self.unload_ordered(&order);
        Ok(())
    }

    /// Unload then load `names` again.
    ///
    /// Dependents swept away by the teardown come back up afterwards, as
    /// does the load closure of `names`. Both orders are resolved before any
    /// teardown, so a resolution failure leaves the loaded set unchanged.
    pub fn reload<S: AsRef<str>>(
        &mut self,
        names: &[S],
    ) -> AddonResult<()> {
        let teardown: Vec<_> = self
            .registry
            .unload_order(names)?
            .into_iter()
            .filter(|package| self.is_loaded(package.name()))
            .collect();
        let mut revive: Vec<String> = teardown
            .iter()
            .map(|package| package.name().to_string())
            .collect();
        for name in names {
            let name = name.as_ref();
            if !revive.iter().any(|n| n == name) {
                revive.push(name.to_string());
            }
        }
        let load = self.registry.load_order(&revive)?;
        self.unload_ordered(&teardown);
        self.load_ordered(&load)
    }

    /// Tear down every loaded package, dependents first.
    pub fn unload_all(&mut self) -> AddonResult<()> {
        let order = self.registry.unload_order_all()?;
        self.unload_ordered(&order);
        Ok(())
    }

    /// Reload every loaded package.
    pub fn reload_all(&mut self) -> AddonResult<()> {
        let names = self.loaded();
        self.reload(&names)
    }

    /// Advance one host tick: bump the frame counter, then pump.
    pub fn tick(&mut self) -> Result<WaitState, Fault> {
        self.scheduler.clock().next_frame();
        self.run_until_idle()
    }

    /// Pump the scheduler, then apply the fault policy: report each captured
    /// fault and unload the owning package. Faults with no owning package
    /// are reported under [`HOST_PSEUDO_NAME`] and nothing is unloaded.
    pub fn run_until_idle(&mut self) -> Result<WaitState, Fault> {
        let wait = self.scheduler.run_until_idle()?;
        let captured: Vec<(Tag, String)> = self.faults.borrow_mut().drain(..).collect();
        // Attribute every fault against the loaded set as it stood at pump
        // end, before any unload shrinks it: a package whose tasks fault
        // more than once in the same pump owns all of those faults.
        let attributed: Vec<(Option<String>, String)> = captured
            .into_iter()
            .map(|(tag, fault)| {
                let owner = self
                    .loaded
                    .iter()
                    .find(|addon| addon.tag == tag)
                    .map(|addon| addon.package.name().to_string());
                (owner, fault)
            })
            .collect();
        let mut faulted: Vec<String> = Vec::new();
        for (owner, fault) in &attributed {
            match owner {
                Some(name) => {
                    self.fault_sink.report(name, fault);
                    if !faulted.iter().any(|n| n == name) {
                        faulted.push(name.clone());
                    }
                }
                None => self.fault_sink.report(HOST_PSEUDO_NAME, fault),
            }
        }
        for name in faulted {
            if let Err(e) = self.unload(&[name.as_str()]) {
                warn!(target: "addon", "unload after fault failed for '{}': {}", name, e);
            }
        }
        Ok(wait)
    }

    fn load_ordered(
        &mut self,
        order: &[Arc<Package>],
    ) -> AddonResult<()> {
        for package in order {
            if package.kind() == PackageKind::Library || self.is_loaded(package.name()) {
                continue;
            }
            let tag = Tag::next();
            let clock = self.scheduler.clock().clone();
            match self.engine.instantiate(package, &clock) {
                Ok(tasks) => {
                    for task in tasks {
                        self.scheduler.schedule(task, tag);
                    }
                    self.loaded.push(LoadedAddon {
                        package: Arc::clone(package),
                        tag,
                    });
                    info!(target: "addon", "{} loaded", package.name());
                }
                Err(fault) => {
                    self.scheduler.purge(tag);
                    return Err(AddonError::Instantiate {
                        name: package.name().to_string(),
                        fault,
                    });
                }
            }
        }
        Ok(())
    }

    fn unload_ordered(
        &mut self,
        order: &[Arc<Package>],
    ) {
        for package in order {
            if package.kind() == PackageKind::Library {
                continue;
            }
            let name = package.name();
            if let Some(position) = self
                .loaded
                .iter()
                .position(|addon| addon.package.name() == name)
            {
                let addon = self.loaded.remove(position);
                self.scheduler.purge(addon.tag);
                self.commands.purge_package(name);
                info!(target: "addon", "{} unloaded", name);
            }
        }
    }
}
