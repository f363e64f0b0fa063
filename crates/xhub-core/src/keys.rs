//! Key encoding for the shared resource keyspace.
//!
//! Every resource kind lives in one ordered keyspace. The kind travels as a
//! path segment, and the key of a resource is its id verbatim:
//!
//! - `/studies/{study}` - Study
//! - `/studies/{study}/trials/{trial}` - Trial
//! - `/studies/{study}/files/{file}` - File scoped to a study
//! - `/files/{study}/{trial}/{file}` - File scoped to a trial
//! - `/created/studies/{study}` - Creation index entry for a study
//!
//! Scan prefixes always end in the separator. The prefix for the subtree of
//! study `S1` is `/studies/S1/`, which sorts after `/studies/S1` but never
//! matches `/studies/S10`.

use std::fmt;

use crate::error::CoreError;
use crate::model::ResourceKind;

/// Separator between key segments.
pub const SEPARATOR: char = '/';

/// Root segment for studies and everything filed beneath them.
pub const STUDIES: &str = "studies";

/// Segment introducing trials within a study.
pub const TRIALS: &str = "trials";

/// Segment for files: nested under a study, or the root of trial-scoped files.
pub const FILES: &str = "files";

/// Root segment of the creation index.
pub const CREATED: &str = "created";

/// Prefix of the parallel root holding every trial-scoped file of a study.
pub fn trial_file_root(study: &str) -> Result<Vec<u8>, CoreError> {
    validate_component(study)?;
    let mut prefix = join(&[FILES, study]).into_bytes();
    prefix.push(SEPARATOR as u8);
    Ok(prefix)
}

/// Checks that a single id component can be embedded in a key.
///
/// Components are rejected rather than escaped: an empty component or one
/// containing `/` would make prefix boundaries ambiguous.
pub fn validate_component(component: &str) -> Result<(), CoreError> {
    let reason = if component.is_empty() {
        "component is empty"
    } else if component.contains(SEPARATOR) {
        "component contains the path separator '/'"
    } else if component.chars().any(char::is_control) {
        "component contains a control character"
    } else {
        return Ok(());
    };
    Err(CoreError::InvalidIdentity {
        component: component.to_string(),
        reason,
    })
}

fn join(segments: &[&str]) -> String {
    let mut out = String::with_capacity(segments.iter().map(|s| s.len() + 1).sum());
    for segment in segments {
        out.push(SEPARATOR);
        out.push_str(segment);
    }
    out
}

fn validate_all(components: &[&str]) -> Result<(), CoreError> {
    components.iter().try_for_each(|c| validate_component(c))
}

/// Returns the exclusive upper bound of the range of keys starting with `prefix`.
///
/// The last byte below `0xFF` is incremented and everything after it dropped.
/// `None` means the range is unbounded above (empty or all-`0xFF` prefix).
pub fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

/// Hierarchical identity of a single stored resource.
///
/// Construction does not validate; [`ResourcePath::encode`] does, so an
/// invalid component is rejected before any key reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourcePath {
    Study {
        study: String,
    },
    Trial {
        study: String,
        trial: String,
    },
    StudyFile {
        study: String,
        file: String,
    },
    TrialFile {
        study: String,
        trial: String,
        file: String,
    },
}

impl ResourcePath {
    pub fn study(study: impl Into<String>) -> Self {
        ResourcePath::Study {
            study: study.into(),
        }
    }

    pub fn trial(study: impl Into<String>, trial: impl Into<String>) -> Self {
        ResourcePath::Trial {
            study: study.into(),
            trial: trial.into(),
        }
    }

    pub fn study_file(study: impl Into<String>, file: impl Into<String>) -> Self {
        ResourcePath::StudyFile {
            study: study.into(),
            file: file.into(),
        }
    }

    pub fn trial_file(
        study: impl Into<String>,
        trial: impl Into<String>,
        file: impl Into<String>,
    ) -> Self {
        ResourcePath::TrialFile {
            study: study.into(),
            trial: trial.into(),
            file: file.into(),
        }
    }

    /// The resource kind this path addresses.
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourcePath::Study { .. } => ResourceKind::Study,
            ResourcePath::Trial { .. } => ResourceKind::Trial,
            ResourcePath::StudyFile { .. } | ResourcePath::TrialFile { .. } => ResourceKind::File,
        }
    }

    /// The resource's own id component (the last one).
    pub fn name(&self) -> &str {
        match self {
            ResourcePath::Study { study } => study,
            ResourcePath::Trial { trial, .. } => trial,
            ResourcePath::StudyFile { file, .. } | ResourcePath::TrialFile { file, .. } => file,
        }
    }

    /// The listing scope this resource is a direct child of.
    pub fn scope(&self) -> Scope {
        match self {
            ResourcePath::Study { .. } => Scope::Studies,
            ResourcePath::Trial { study, .. } => Scope::Trials {
                study: study.clone(),
            },
            ResourcePath::StudyFile { study, .. } => Scope::StudyFiles {
                study: study.clone(),
            },
            ResourcePath::TrialFile { study, trial, .. } => Scope::TrialFiles {
                study: study.clone(),
                trial: trial.clone(),
            },
        }
    }

    fn segments(&self) -> Vec<&str> {
        match self {
            ResourcePath::Study { study } => vec![STUDIES, study.as_str()],
            ResourcePath::Trial { study, trial } => {
                vec![STUDIES, study.as_str(), TRIALS, trial.as_str()]
            }
            ResourcePath::StudyFile { study, file } => {
                vec![STUDIES, study.as_str(), FILES, file.as_str()]
            }
            ResourcePath::TrialFile { study, trial, file } => {
                vec![FILES, study.as_str(), trial.as_str(), file.as_str()]
            }
        }
    }

    fn components(&self) -> Vec<&str> {
        match self {
            ResourcePath::Study { study } => vec![study.as_str()],
            ResourcePath::Trial { study, trial } => vec![study.as_str(), trial.as_str()],
            ResourcePath::StudyFile { study, file } => vec![study.as_str(), file.as_str()],
            ResourcePath::TrialFile { study, trial, file } => {
                vec![study.as_str(), trial.as_str(), file.as_str()]
            }
        }
    }

    /// Validates every id component.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_all(&self.components())
    }

    /// The external id, e.g. `/studies/S1/trials/T1`. Not validated.
    pub fn id(&self) -> String {
        join(&self.segments())
    }

    /// Encodes the storage key for this resource.
    pub fn encode(&self) -> Result<Vec<u8>, CoreError> {
        self.validate()?;
        Ok(self.id().into_bytes())
    }

    /// Prefix covering every key nested beneath this resource's own key.
    pub fn subtree_prefix(&self) -> Result<Vec<u8>, CoreError> {
        let mut prefix = self.encode()?;
        prefix.push(SEPARATOR as u8);
        Ok(prefix)
    }

    /// Key of the creation index entry. Only studies are indexed.
    pub fn creation_key(&self) -> Result<Option<Vec<u8>>, CoreError> {
        match self {
            ResourcePath::Study { study } => {
                validate_component(study)?;
                Ok(Some(join(&[CREATED, STUDIES, study.as_str()]).into_bytes()))
            }
            _ => Ok(None),
        }
    }

    /// Parses an external id back into a path.
    pub fn parse(id: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidKey { key: id.to_string() };
        let rest = id.strip_prefix(SEPARATOR).ok_or_else(invalid)?;
        let segments: Vec<&str> = rest.split(SEPARATOR).collect();
        let path = match segments.as_slice() {
            [STUDIES, study] => Self::study(*study),
            [STUDIES, study, TRIALS, trial] => Self::trial(*study, *trial),
            [STUDIES, study, FILES, file] => Self::study_file(*study, *file),
            [FILES, study, trial, file] => Self::trial_file(*study, *trial, *file),
            _ => return Err(invalid()),
        };
        path.validate()?;
        Ok(path)
    }

    /// Decodes a storage key. Fails for index entries and foreign keys.
    pub fn decode(key: &[u8]) -> Result<Self, CoreError> {
        let id = std::str::from_utf8(key).map_err(|_| CoreError::InvalidKey {
            key: String::from_utf8_lossy(key).into_owned(),
        })?;
        Self::parse(id)
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// A listable collection: the parent context of a set of sibling resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Studies,
    Trials { study: String },
    StudyFiles { study: String },
    TrialFiles { study: String, trial: String },
}

impl Scope {
    pub fn trials(study: impl Into<String>) -> Self {
        Scope::Trials {
            study: study.into(),
        }
    }

    pub fn study_files(study: impl Into<String>) -> Self {
        Scope::StudyFiles {
            study: study.into(),
        }
    }

    pub fn trial_files(study: impl Into<String>, trial: impl Into<String>) -> Self {
        Scope::TrialFiles {
            study: study.into(),
            trial: trial.into(),
        }
    }

    /// Kind of the resources held in this collection.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Scope::Studies => ResourceKind::Study,
            Scope::Trials { .. } => ResourceKind::Trial,
            Scope::StudyFiles { .. } | Scope::TrialFiles { .. } => ResourceKind::File,
        }
    }

    fn segments(&self) -> Vec<&str> {
        match self {
            Scope::Studies => vec![STUDIES],
            Scope::Trials { study } => vec![STUDIES, study.as_str(), TRIALS],
            Scope::StudyFiles { study } => vec![STUDIES, study.as_str(), FILES],
            Scope::TrialFiles { study, trial } => vec![FILES, study.as_str(), trial.as_str()],
        }
    }

    fn components(&self) -> Vec<&str> {
        match self {
            Scope::Studies => vec![],
            Scope::Trials { study } | Scope::StudyFiles { study } => vec![study.as_str()],
            Scope::TrialFiles { study, trial } => vec![study.as_str(), trial.as_str()],
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate_all(&self.components())
    }

    /// Collection path without trailing separator, e.g. `/studies/S1/trials`.
    pub fn path(&self) -> String {
        join(&self.segments())
    }

    /// Scan prefix for the collection, e.g. `/studies/S1/trials/`.
    pub fn prefix(&self) -> Result<Vec<u8>, CoreError> {
        self.validate()?;
        let mut prefix = self.path().into_bytes();
        prefix.push(SEPARATOR as u8);
        Ok(prefix)
    }

    /// The path of a direct child named `name`. Not validated.
    pub fn child(&self, name: impl Into<String>) -> ResourcePath {
        let name = name.into();
        match self {
            Scope::Studies => ResourcePath::study(name),
            Scope::Trials { study } => ResourcePath::trial(study.clone(), name),
            Scope::StudyFiles { study } => ResourcePath::study_file(study.clone(), name),
            Scope::TrialFiles { study, trial } => {
                ResourcePath::trial_file(study.clone(), trial.clone(), name)
            }
        }
    }

    /// Parses a collection path such as `/studies/S1/trials`.
    ///
    /// A single trailing separator is accepted.
    pub fn parse(path: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidKey {
            key: path.to_string(),
        };
        let rest = path.strip_prefix(SEPARATOR).ok_or_else(invalid)?;
        let rest = rest.strip_suffix(SEPARATOR).unwrap_or(rest);
        let segments: Vec<&str> = rest.split(SEPARATOR).collect();
        let scope = match segments.as_slice() {
            [STUDIES] => Scope::Studies,
            [STUDIES, study, TRIALS] => Self::trials(*study),
            [STUDIES, study, FILES] => Self::study_files(*study),
            [FILES, study, trial] => Self::trial_files(*study, *trial),
            _ => return Err(invalid()),
        };
        scope.validate()?;
        Ok(scope)
    }

    /// Whether `path` is a direct child of this collection.
    pub fn contains(&self, path: &ResourcePath) -> bool {
        path.scope() == *self
    }

    /// Resolves a client-supplied id against this collection.
    ///
    /// A full id (leading `/`) must parse and be a direct child; anything else
    /// is taken as the bare name of a new child.
    pub fn resolve(&self, id: &str) -> Result<ResourcePath, CoreError> {
        let path = if id.starts_with(SEPARATOR) {
            let path = ResourcePath::parse(id)?;
            if !self.contains(&path) {
                return Err(CoreError::ScopeMismatch {
                    id: id.to_string(),
                    scope: self.path(),
                });
            }
            path
        } else {
            self.child(id)
        };
        path.validate()?;
        Ok(path)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
