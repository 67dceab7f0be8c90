//! Load and unload order resolution.
//!
//! Three-color depth-first topological sort seeded from the requested names:
//! forward over dependency edges for load order, reverse over dependent-of
//! edges for unload order. Coloring state is local to each call, so the
//! resolver is re-entrant and a failed resolution never poisons the
//! registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::package::error::{PackageError, PackageResult};
use crate::package::manifest::Package;
use crate::package::registry::PackageRegistry;

/// DFS visit state. White: unvisited, gray: on the current visit path,
/// black: emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

type Colors<'a> = HashMap<&'a str, Color>;

fn color_of(
    colors: &Colors<'_>,
    name: &str,
) -> Color {
    colors.get(name).copied().unwrap_or(Color::White)
}

impl PackageRegistry {
    /// Dependency-respecting instantiation order for `names`.
    ///
    /// Every required edge places the dependency strictly before its
    /// dependent; a dependency's emission happens before its dependent's.
    /// All requested names must be installed. A required edge to a missing
    /// package, or a required-dependency cycle reachable from the request,
    /// fails the whole resolution; optional edges that fail to resolve are
    /// skipped with no diagnostic.
    pub fn load_order<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> PackageResult<Vec<Arc<Package>>> {
        let mut colors = Colors::new();
        let mut order = Vec::new();
        for name in names {
            let name = name.as_ref();
            if self.get(name).is_none() {
                return Err(PackageError::UnknownPackage(name.to_string()));
            }
            self.visit_dependencies(name, true, name, &mut colors, &mut order)?;
        }
        Ok(order)
    }

    /// Instantiation order for the full installed set.
    pub fn load_order_all(&self) -> PackageResult<Vec<Arc<Package>>> {
        self.load_order(&self.names())
    }

    /// Dependency-respecting teardown order for `names`: every dependent is
    /// emitted before anything it depends on, transitively.
    ///
    /// Names that are not installed are skipped; tearing down something that
    /// does not exist is a no-op, not an error.
    pub fn unload_order<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> PackageResult<Vec<Arc<Package>>> {
        let mut colors = Colors::new();
        let mut order = Vec::new();
        for name in names {
            self.visit_dependents(name.as_ref(), &mut colors, &mut order);
        }
        Ok(order)
    }

    /// Teardown order for the full installed set.
    pub fn unload_order_all(&self) -> PackageResult<Vec<Arc<Package>>> {
        self.unload_order(&self.names())
    }

    /// Post-order DFS over forward dependency edges.
    fn visit_dependencies<'a>(
        &'a self,
        name: &str,
        required: bool,
        required_by: &str,
        colors: &mut Colors<'a>,
        order: &mut Vec<Arc<Package>>,
    ) -> PackageResult<()> {
        let Some(package) = self.get(name) else {
            if required {
                return Err(PackageError::MissingDependency {
                    name: name.to_string(),
                    required_by: required_by.to_string(),
                });
            }
            return Ok(());
        };
        // Keys borrow from registry storage so they outlive the recursion.
        let key = package.name();
        match color_of(colors, key) {
            // Re-entry over a required edge while still on the visit path.
            Color::Gray if required => Err(self.cycle_error(key, colors)),
            Color::White => {
                colors.insert(key, Color::Gray);
                for dependency in package.dependencies() {
                    self.visit_dependencies(
                        &dependency.name,
                        dependency.required,
                        key,
                        colors,
                        order,
                    )?;
                }
                colors.insert(key, Color::Black);
                order.push(Arc::clone(package));
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Pre-order-reversed DFS over reverse (dependent-of) edges.
    fn visit_dependents<'a>(
        &'a self,
        name: &str,
        colors: &mut Colors<'a>,
        order: &mut Vec<Arc<Package>>,
    ) {
        let Some(package) = self.get(name) else {
            return;
        };
        let key = package.name();
        if color_of(colors, key) != Color::White {
            return;
        }
        colors.insert(key, Color::Gray);
        for candidate in self.iter() {
            let depends_on_key = candidate
                .dependencies()
                .iter()
                .any(|dependency| dependency.name == key);
            if depends_on_key && color_of(colors, candidate.name()) == Color::White {
                self.visit_dependents(candidate.name(), colors, order);
            }
        }
        colors.insert(key, Color::Black);
        order.push(Arc::clone(package));
    }

    /// Walk the gray chain from the re-entry point to name every package on
    /// the cycle for diagnostics.
    fn cycle_error(
        &self,
        start: &str,
        colors: &Colors<'_>,
    ) -> PackageError {
        let mut members = vec![start.to_string()];
        let mut current = start.to_string();
        loop {
            let next = self.get(&current).and_then(|package| {
                package.dependencies().iter().find_map(|dependency| {
                    let installed = self.get(&dependency.name)?;
                    (color_of(colors, installed.name()) == Color::Gray)
                        .then(|| installed.name().to_string())
                })
            });
            match next {
                Some(name) if name != start => {
                    members.push(name.clone());
                    current = name;
                }
                _ => break,
            }
        }
        PackageError::DependencyCycle(members)
    }
}
