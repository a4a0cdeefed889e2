//! Implicit controller-method resolution.
//!
//! There is no URL-pattern table. A method is selected from the combination
//! of the request phase and the set of parameter names present on the
//! request, with an explicit routing id as escape hatch. The rule is
//! deterministic: ties are reported as ambiguity, never broken arbitrarily.

use std::collections::HashSet;
use std::sync::Arc;

use crate::descriptor::{ApplicationDescriptor, ControllerMethod, Phase};
use crate::error::ResolveError;

struct Candidate {
    method: Arc<ControllerMethod>,
    names: HashSet<String>,
}

/// Pure resolution function over the immutable application method table.
pub struct ControllerResolver {
    candidates: Vec<Candidate>,
}

impl ControllerResolver {
    pub fn new(descriptor: &ApplicationDescriptor) -> Self {
        let candidates = descriptor
            .methods()
            .map(|method| Candidate {
                names: method.parameter_names().map(str::to_string).collect(),
                method: Arc::clone(method),
            })
            .collect();
        Self { candidates }
    }

    /// Resolve the unique method for a phase, an optional explicit id and the
    /// set of parameter names present on the request.
    ///
    /// With an explicit id, resolution is exact id equality within the phase;
    /// more than one hit means the descriptor table carries duplicate ids
    /// across controllers, a build defect surfaced as ambiguity.
    ///
    /// Without an id, a method matches when its declared parameter-name set
    /// is a subset of the available names; among matches, only those not
    /// strictly included in another match survive (maximal matches). One
    /// survivor wins; several incomparable survivors are ambiguous.
    pub fn resolve(
        &self,
        phase: Phase,
        explicit_id: Option<&str>,
        available: &HashSet<&str>,
    ) -> Result<Arc<ControllerMethod>, ResolveError> {
        let in_phase = self
            .candidates
            .iter()
            .filter(|candidate| candidate.method.phase() == phase);

        let matches: Vec<&Candidate> = match explicit_id {
            Some(id) => in_phase
                .filter(|candidate| candidate.method.id() == Some(id))
                .collect(),
            None => {
                let subset_matches: Vec<&Candidate> = in_phase
                    .filter(|candidate| {
                        candidate.names.iter().all(|name| available.contains(name.as_str()))
                    })
                    .collect();
                maximal(subset_matches)
            }
        };

        match matches.as_slice() {
            [] => Err(ResolveError::NoMatch),
            [only] => Ok(Arc::clone(&only.method)),
            several => Err(ResolveError::Ambiguous {
                candidates: several
                    .iter()
                    .map(|candidate| candidate.method.display_name())
                    .collect(),
            }),
        }
    }
}

/// Keep only matches whose parameter set is not a strict subset of another
/// match's. Equal sets are incomparable and both survive.
fn maximal(matches: Vec<&Candidate>) -> Vec<&Candidate> {
    matches
        .iter()
        .filter(|candidate| {
            !matches.iter().any(|other| {
                other.names.len() > candidate.names.len()
                    && candidate.names.is_subset(&other.names)
            })
        })
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::test_support::method;
    use crate::descriptor::{ApplicationDescriptor, ControllerDescriptor};

    fn table(methods: Vec<crate::descriptor::ControllerMethod>) -> ControllerResolver {
        let descriptor = ControllerDescriptor::new("Controller", methods).expect("descriptor");
        let app = ApplicationDescriptor::new("templates", vec![descriptor], vec![]);
        ControllerResolver::new(&app)
    }

    fn names<'a>(entries: &[&'a str]) -> HashSet<&'a str> {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_explicit_id_hit_and_miss() {
        let resolver = table(vec![method(Some("show"), Phase::Render, &["a"])]);

        let hit = resolver
            .resolve(Phase::Render, Some("show"), &names(&["unrelated"]))
            .unwrap();
        assert_eq!(hit.id(), Some("show"));

        let miss = resolver
            .resolve(Phase::Render, Some("other"), &names(&[]))
            .unwrap_err();
        assert_eq!(miss, ResolveError::NoMatch);
    }

    #[test]
    fn test_explicit_id_respects_phase() {
        let resolver = table(vec![method(Some("show"), Phase::Render, &[])]);
        let err = resolver
            .resolve(Phase::Action, Some("show"), &names(&[]))
            .unwrap_err();
        assert_eq!(err, ResolveError::NoMatch);
    }

    #[test]
    fn test_duplicate_ids_across_controllers_are_ambiguous() {
        let a = ControllerDescriptor::new("A", vec![method(Some("show"), Phase::Render, &[])])
            .unwrap();
        let b = ControllerDescriptor::new("B", vec![method(Some("show"), Phase::Render, &[])])
            .unwrap();
        let app = ApplicationDescriptor::new("templates", vec![a, b], vec![]);
        let resolver = ControllerResolver::new(&app);

        let err = resolver
            .resolve(Phase::Render, Some("show"), &names(&[]))
            .unwrap_err();
        match err {
            ResolveError::Ambiguous { candidates } => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn test_maximal_match_wins() {
        let resolver = table(vec![
            method(None, Phase::Render, &["a"]),
            method(None, Phase::Render, &["a", "b"]),
        ]);

        // Both subset-match {a, b}; the larger set dominates.
        let both = resolver.resolve(Phase::Render, None, &names(&["a", "b"])).unwrap();
        assert_eq!(both.parameter_names().collect::<Vec<_>>(), vec!["a", "b"]);

        // Only {a} subset-matches {a}.
        let narrow = resolver.resolve(Phase::Render, None, &names(&["a"])).unwrap();
        assert_eq!(narrow.parameter_names().collect::<Vec<_>>(), vec!["a"]);

        // b is absent, so {a, b} is not a subset of {a, c}.
        let extra = resolver
            .resolve(Phase::Render, None, &names(&["a", "c"]))
            .unwrap();
        assert_eq!(extra.parameter_names().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_disjoint_matches_are_ambiguous() {
        let resolver = table(vec![
            method(None, Phase::Render, &["a"]),
            method(None, Phase::Render, &["b"]),
        ]);
        let err = resolver
            .resolve(Phase::Render, None, &names(&["a", "b"]))
            .unwrap_err();
        match err {
            ResolveError::Ambiguous { candidates } => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn test_equal_parameter_sets_are_ambiguous() {
        let a = ControllerDescriptor::new("A", vec![method(None, Phase::Render, &["a"])]).unwrap();
        let b = ControllerDescriptor::new("B", vec![method(None, Phase::Render, &["a"])]).unwrap();
        let app = ApplicationDescriptor::new("templates", vec![a, b], vec![]);
        let resolver = ControllerResolver::new(&app);

        let err = resolver
            .resolve(Phase::Render, None, &names(&["a"]))
            .unwrap_err();
        assert!(matches!(err, ResolveError::Ambiguous { .. }));
    }

    #[test]
    fn test_no_candidate_in_phase() {
        let resolver = table(vec![method(None, Phase::Render, &[])]);
        let err = resolver
            .resolve(Phase::Resource, None, &names(&[]))
            .unwrap_err();
        assert_eq!(err, ResolveError::NoMatch);
    }

    #[test]
    fn test_parameterless_method_matches_empty_request() {
        let resolver = table(vec![method(None, Phase::Render, &[])]);
        let hit = resolver.resolve(Phase::Render, None, &names(&[])).unwrap();
        assert_eq!(hit.parameter_names().count(), 0);
    }
}
