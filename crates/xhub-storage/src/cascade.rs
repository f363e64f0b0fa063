//! Which keys a delete has to cover.
//!
//! Descendants of a resource are not all filed under its own key. Trial-scoped
//! files live under the parallel `/files/{study}/{trial}/` root, so deleting a
//! trial (or its study) has to scan that root as well. The roots scanned for
//! each kind are listed in one table, [`roots_for`], instead of being spread
//! across the delete code.
//!
//! | Kind       | Exact keys                              | Scanned prefixes                    |
//! |------------|-----------------------------------------|-------------------------------------|
//! | study      | `/studies/s`, `/created/studies/s`      | `/studies/s/`, `/files/s/`          |
//! | trial      | `/studies/s/trials/t`                   | `/studies/s/trials/t/`, `/files/s/t/` |
//! | study file | `/studies/s/files/f`                    | `/studies/s/files/f/`               |
//! | trial file | `/files/s/t/f`                          | `/files/s/t/f/`                     |

use xhub_core::keys::trial_file_root;
use xhub_core::{CoreError, ResourcePath, Scope};

/// A key-space root that may hold descendants of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeRoot {
    /// Everything nested under the resource's own key.
    Subtree,
    /// `/files/{study}/`: trial-scoped files of every trial in the study.
    StudyTrialFiles,
    /// `/files/{study}/{trial}/`: trial-scoped files of one trial.
    TrialFiles,
}

const STUDY_ROOTS: &[CascadeRoot] = &[CascadeRoot::Subtree, CascadeRoot::StudyTrialFiles];
const TRIAL_ROOTS: &[CascadeRoot] = &[CascadeRoot::Subtree, CascadeRoot::TrialFiles];
const FILE_ROOTS: &[CascadeRoot] = &[CascadeRoot::Subtree];

/// The roots scanned when `path` is deleted.
pub fn roots_for(path: &ResourcePath) -> &'static [CascadeRoot] {
    match path {
        ResourcePath::Study { .. } => STUDY_ROOTS,
        ResourcePath::Trial { .. } => TRIAL_ROOTS,
        ResourcePath::StudyFile { .. } | ResourcePath::TrialFile { .. } => FILE_ROOTS,
    }
}

/// Keys to remove directly plus prefixes to scan for a single delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadePlan {
    /// The resource key first, then its creation index entry if any.
    pub exact: Vec<Vec<u8>>,
    pub prefixes: Vec<Vec<u8>>,
}

impl CascadeRoot {
    fn prefix(self, path: &ResourcePath) -> Result<Option<Vec<u8>>, CoreError> {
        let prefix = match (self, path) {
            (CascadeRoot::Subtree, _) => path.subtree_prefix()?,
            (CascadeRoot::StudyTrialFiles, ResourcePath::Study { study }) => {
                trial_file_root(study)?
            }
            (CascadeRoot::TrialFiles, ResourcePath::Trial { study, trial }) => {
                Scope::trial_files(study.clone(), trial.clone()).prefix()?
            }
            _ => return Ok(None),
        };
        Ok(Some(prefix))
    }
}

/// Builds the delete plan for `path`, validating its identity.
pub fn cascade_plan(path: &ResourcePath) -> Result<CascadePlan, CoreError> {
    let mut exact = vec![path.encode()?];
    exact.extend(path.creation_key()?);

    let mut prefixes = Vec::new();
    for root in roots_for(path) {
        prefixes.extend(root.prefix(path)?);
    }
    Ok(CascadePlan { exact, prefixes })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(keys: &[Vec<u8>]) -> Vec<String> {
        keys.iter()
            .map(|k| String::from_utf8(k.clone()).unwrap())
            .collect()
    }

    #[test]
    fn study_plan_covers_both_roots_and_index() {
        let plan = cascade_plan(&ResourcePath::study("S1")).unwrap();
        assert_eq!(strings(&plan.exact), ["/studies/S1", "/created/studies/S1"]);
        assert_eq!(strings(&plan.prefixes), ["/studies/S1/", "/files/S1/"]);
    }

    #[test]
    fn trial_plan_covers_parallel_file_root() {
        let plan = cascade_plan(&ResourcePath::trial("S1", "T1")).unwrap();
        assert_eq!(strings(&plan.exact), ["/studies/S1/trials/T1"]);
        assert_eq!(
            strings(&plan.prefixes),
            ["/studies/S1/trials/T1/", "/files/S1/T1/"]
        );
    }

    #[test]
    fn file_plans_cover_only_their_subtree() {
        let plan = cascade_plan(&ResourcePath::study_file("S1", "F1")).unwrap();
        assert_eq!(strings(&plan.exact), ["/studies/S1/files/F1"]);
        assert_eq!(strings(&plan.prefixes), ["/studies/S1/files/F1/"]);

        let plan = cascade_plan(&ResourcePath::trial_file("S1", "T1", "F1")).unwrap();
        assert_eq!(strings(&plan.exact), ["/files/S1/T1/F1"]);
        assert_eq!(strings(&plan.prefixes), ["/files/S1/T1/F1/"]);
    }

    #[test]
    fn trial_plan_does_not_reach_study_files() {
        let plan = cascade_plan(&ResourcePath::trial("S1", "T1")).unwrap();
        let study_file = ResourcePath::study_file("S1", "F1").encode().unwrap();
        assert!(!plan.prefixes.iter().any(|p| study_file.starts_with(p)));
        assert!(!plan.exact.contains(&study_file));
    }

    #[test]
    fn invalid_identity_is_rejected() {
        assert!(matches!(
            cascade_plan(&ResourcePath::trial("S1", "a/b")),
            Err(CoreError::InvalidIdentity { .. })
        ));
    }

    #[test]
    fn table_is_kind_indexed() {
        assert_eq!(roots_for(&ResourcePath::study("S")), STUDY_ROOTS);
        assert_eq!(roots_for(&ResourcePath::trial("S", "T")), TRIAL_ROOTS);
        assert_eq!(roots_for(&ResourcePath::trial_file("S", "T", "F")), FILE_ROOTS);
    }
}
