use crate::cache::PackageCache;
use limn_core::Error;
use limn_semver::{Constraint, Version};
use log::debug;
use std::collections::BTreeMap;

/// `PackageName -> Version`.
pub type Solution = BTreeMap<String, Version>;

/// Backtracking depth-first search over the package cache, picking the
/// newest version of each package that keeps every constraint collected
/// so far satisfiable.
///
/// Returns [`Error::Unsolvable`] if no assignment satisfies every direct
/// and transitive constraint.
pub fn solve(
    root: BTreeMap<String, Constraint>,
    cache: &dyn PackageCache,
) -> Result<Solution, Error> {
    let mut partial = BTreeMap::new();
    solve_step(root, &mut partial, cache)?;
    Ok(partial)
}

fn solve_step(
    pending: BTreeMap<String, Constraint>,
    partial: &mut BTreeMap<String, Version>,
    cache: &dyn PackageCache,
) -> Result<(), Error> {
    // Lexicographically smallest pending name.
    let Some(name) = pending.keys().next().cloned() else {
        return Ok(());
    };

    let constraint = pending[&name].clone();
    let mut remaining = pending;
    remaining.remove(&name);

    let releases = cache.get(&name)?;

    let mut candidates: Vec<_> = releases
        .into_iter()
        .filter(|release| constraint.satisfies(&release.version))
        .collect();

    // Newest wins: descending version order.
    candidates.sort_by(|a, b| b.version.cmp(&a.version));

    if let Some(already_chosen) = partial.get(&name) {
        candidates.retain(|release| &release.version == already_chosen);
    }

    for candidate in candidates {
        debug!("trying {} = {}", name, candidate.version);

        let merged = match combine(&remaining, &candidate.dependencies) {
            Some(merged) => merged,
            None => continue,
        };

        partial.insert(name.clone(), candidate.version.clone());

        match solve_step(merged, partial, cache) {
            Ok(()) => return Ok(()),
            Err(Error::Unsolvable) => {
                partial.remove(&name);
                continue;
            }
            Err(other) => return Err(other),
        }
    }

    Err(Error::Unsolvable)
}

/// Union two constraint maps, intersecting where keys overlap. Returns
/// `None` if any intersection is empty.
fn combine(
    remaining: &BTreeMap<String, Constraint>,
    new_deps: &BTreeMap<String, Constraint>,
) -> Option<BTreeMap<String, Constraint>> {
    let mut merged = remaining.clone();

    for (name, constraint) in new_deps {
        match merged.get(name) {
            Some(existing) => {
                let intersected = existing.intersect(constraint)?;
                merged.insert(name.clone(), intersected);
            }
            None => {
                merged.insert(name.clone(), constraint.clone());
            }
        }
    }

    Some(merged)
}
