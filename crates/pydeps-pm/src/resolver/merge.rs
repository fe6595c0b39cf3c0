use indexmap::IndexMap;
use pydeps_semver::{Constraint, Spec};

/// One package's requirements folded together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedSpec {
    /// Name as first seen, the union of extras, and every distinct predicate
    pub spec: Spec,
    /// Packages that required it, in first-seen order
    pub sources: Vec<String>,
}

impl MergedSpec {
    /// Whether every pair of predicates can hold at once.
    ///
    /// A pairwise check; it does not prove the whole conjunction has a
    /// solution.
    pub fn is_satisfiable(&self) -> bool {
        let preds = self.spec.preds();
        preds
            .iter()
            .enumerate()
            .all(|(i, a)| preds[i + 1..].iter().all(|b| a.intersects(b)))
    }
}

#[derive(Default)]
struct Accumulator {
    name: String,
    extras: Vec<String>,
    preds: Vec<Constraint>,
    sources: Vec<String>,
}

/// Fold a resolved spec list into one entry per normalized package name,
/// keeping first-seen order.
pub fn merge_specs(specs: &[Spec]) -> Vec<MergedSpec> {
    let mut merged: IndexMap<String, Accumulator> = IndexMap::new();

    for spec in specs {
        let entry = merged.entry(spec.key()).or_insert_with(|| Accumulator {
            name: spec.name().to_string(),
            ..Default::default()
        });

        entry.extras.extend(spec.extras().iter().cloned());
        for pred in spec.preds() {
            if !entry.preds.contains(pred) {
                entry.preds.push(pred.clone());
            }
        }
        if let Some(source) = spec.source() {
            if !entry.sources.iter().any(|s| s == source) {
                entry.sources.push(source.to_string());
            }
        }
    }

    merged
        .into_values()
        .map(|acc| {
            let spec = acc
                .extras
                .into_iter()
                .fold(Spec::new(acc.name), |spec, extra| spec.with_extra(extra));
            let spec = acc.preds.into_iter().fold(spec, Spec::with_predicate);
            MergedSpec {
                spec,
                sources: acc.sources,
            }
        })
        .collect()
}
