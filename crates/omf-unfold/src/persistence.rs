use std::fs;
use std::path::{Path, PathBuf};

use omf_core::errors::{ErrorInfo, OmfError};
use omf_core::{ArtifactProvenance, IterationObserver, SchemaVersion, Step};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::PersistenceConfig;

/// Schema version written into every model artifact.
pub const ARTIFACT_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

const WRITE_PROBE: &str = ".omf-write-probe";

/// Models trained during Step 1 of one iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step1Bundle<C, R> {
    /// Schema the payload was written with.
    pub schema: SchemaVersion,
    /// Run and iteration the models belong to.
    pub provenance: ArtifactProvenance,
    /// Reco-level classifier.
    pub classifier: C,
    /// Fallback regressor, present only when some events failed reco cuts.
    pub regressor: Option<R>,
}

/// Model trained during Step 2 of one iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step2Bundle<C> {
    /// Schema the payload was written with.
    pub schema: SchemaVersion,
    /// Run and iteration the model belongs to.
    pub provenance: ArtifactProvenance,
    /// Gen-level classifier.
    pub classifier: C,
}

// Borrowed mirrors of the bundles; field order must match for bincode.
#[derive(Serialize)]
struct Step1Ref<'a, C, R> {
    schema: SchemaVersion,
    provenance: &'a ArtifactProvenance,
    classifier: &'a C,
    regressor: Option<&'a R>,
}

#[derive(Serialize)]
struct Step2Ref<'a, C> {
    schema: SchemaVersion,
    provenance: &'a ArtifactProvenance,
    classifier: &'a C,
}

trait Versioned {
    fn schema(&self) -> &SchemaVersion;
}

impl<C, R> Versioned for Step1Bundle<C, R> {
    fn schema(&self) -> &SchemaVersion {
        &self.schema
    }
}

impl<C> Versioned for Step2Bundle<C> {
    fn schema(&self) -> &SchemaVersion {
        &self.schema
    }
}

/// Directory of per-iteration model artifacts.
///
/// Artifacts are named `{name}_iter{N}_step{1|2}.bin` with a one-indexed `N`
/// and hold a bincode encoded bundle. Used as an [`IterationObserver`] the
/// store writes each step's models as soon as the step completes.
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
    name: String,
    provenance: ArtifactProvenance,
    written: Vec<PathBuf>,
}

impl ModelStore {
    /// Creates a store rooted at `root` using `name` as artifact prefix.
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        let mut tool_versions = std::collections::BTreeMap::new();
        tool_versions.insert(
            env!("CARGO_PKG_NAME").to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        Self {
            root: root.into(),
            name: name.into(),
            provenance: ArtifactProvenance {
                tool_versions,
                ..ArtifactProvenance::default()
            },
            written: Vec::new(),
        }
    }

    /// Creates a store from the persistence section of a configuration.
    pub fn from_config(config: &PersistenceConfig) -> Self {
        Self::new(config.model_save_path.clone(), config.model_save_name.clone())
    }

    /// Records the configuration hash and master seed in every artifact.
    pub fn with_provenance(mut self, config_hash: impl Into<String>, seed: u64) -> Self {
        self.provenance.config_hash = config_hash.into();
        self.provenance.seed = seed;
        self
    }

    /// Directory holding the artifacts.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Artifact prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Paths written so far, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Creates or reuses the artifact directory and checks that it is writable.
    pub fn prepare(&self) -> Result<(), OmfError> {
        let root = self.root.display().to_string();
        if self.root.is_dir() {
            info!(path = %root, "reusing model directory");
        } else if self.root.exists() {
            return Err(OmfError::Io(
                ErrorInfo::new("model-dir", "model path exists and is not a directory")
                    .with_context("path", root),
            ));
        } else {
            fs::create_dir_all(&self.root).map_err(|err| {
                OmfError::Io(
                    ErrorInfo::new("model-dir", err.to_string()).with_context("path", root.clone()),
                )
            })?;
            info!(path = %root, "created model directory");
        }
        let probe = self.root.join(WRITE_PROBE);
        fs::write(&probe, b"").map_err(|err| {
            OmfError::Io(
                ErrorInfo::new("model-dir-readonly", err.to_string())
                    .with_context("path", root.clone())
                    .with_hint("choose a writable model_save_path"),
            )
        })?;
        fs::remove_file(&probe).map_err(|err| {
            OmfError::Io(ErrorInfo::new("model-dir-readonly", err.to_string()).with_context("path", root))
        })
    }

    /// Location of the artifact for one iteration and step.
    pub fn artifact_path(&self, iteration: usize, step: Step) -> PathBuf {
        self.root.join(format!(
            "{}_iter{}_step{}.bin",
            self.name,
            iteration,
            step.as_u8()
        ))
    }

    /// Writes the Step 1 models of `iteration`.
    pub fn save_step1<C: Serialize, R: Serialize>(
        &mut self,
        iteration: usize,
        classifier: &C,
        regressor: Option<&R>,
    ) -> Result<PathBuf, OmfError> {
        let provenance = self.provenance_for(iteration, Step::One);
        let payload = Step1Ref {
            schema: ARTIFACT_SCHEMA,
            provenance: &provenance,
            classifier,
            regressor,
        };
        self.write_artifact(iteration, Step::One, &payload)
    }

    /// Writes the Step 2 classifier of `iteration`.
    pub fn save_step2<C: Serialize>(
        &mut self,
        iteration: usize,
        classifier: &C,
    ) -> Result<PathBuf, OmfError> {
        let provenance = self.provenance_for(iteration, Step::Two);
        let payload = Step2Ref {
            schema: ARTIFACT_SCHEMA,
            provenance: &provenance,
            classifier,
        };
        self.write_artifact(iteration, Step::Two, &payload)
    }

    /// Loads the Step 1 models of `iteration`.
    pub fn load_step1<C: DeserializeOwned, R: DeserializeOwned>(
        &self,
        iteration: usize,
    ) -> Result<Step1Bundle<C, R>, OmfError> {
        self.read_artifact(iteration, Step::One)
    }

    /// Loads the Step 2 classifier of `iteration`.
    pub fn load_step2<C: DeserializeOwned>(
        &self,
        iteration: usize,
    ) -> Result<Step2Bundle<C>, OmfError> {
        self.read_artifact(iteration, Step::Two)
    }

    fn provenance_for(&self, iteration: usize, step: Step) -> ArtifactProvenance {
        ArtifactProvenance {
            iteration,
            step: step.as_u8(),
            ..self.provenance.clone()
        }
    }

    fn write_artifact<T: Serialize>(
        &mut self,
        iteration: usize,
        step: Step,
        payload: &T,
    ) -> Result<PathBuf, OmfError> {
        let path = self.artifact_path(iteration, step);
        let bytes = bincode::serialize(payload).map_err(|err| {
            OmfError::Serde(
                ErrorInfo::new("artifact-encode", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(&path, bytes).map_err(|err| {
            OmfError::Io(
                ErrorInfo::new("artifact-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        info!(path = %path.display(), iteration, step = step.as_u8(), "saved model artifact");
        self.written.push(path.clone());
        Ok(path)
    }

    fn read_artifact<T: DeserializeOwned + Versioned>(
        &self,
        iteration: usize,
        step: Step,
    ) -> Result<T, OmfError> {
        let path = self.artifact_path(iteration, step);
        if !path.is_file() {
            return Err(OmfError::MissingArtifact(
                ErrorInfo::new("artifact-missing", "no saved model for this iteration and step")
                    .with_context("path", path.display().to_string())
                    .with_context("iteration", iteration.to_string())
                    .with_context("step", step.as_u8().to_string())
                    .with_hint("run with persistence.save_models enabled first"),
            ));
        }
        let bytes = fs::read(&path).map_err(|err| {
            OmfError::Io(
                ErrorInfo::new("artifact-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        let bundle: T = bincode::deserialize(&bytes).map_err(|err| {
            OmfError::Serde(
                ErrorInfo::new("artifact-decode", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        if !ARTIFACT_SCHEMA.is_compatible_with(bundle.schema()) {
            return Err(OmfError::Serde(
                ErrorInfo::new("schema-mismatch", "artifact schema is incompatible")
                    .with_context("path", path.display().to_string())
                    .with_context("found", format!("{:?}", bundle.schema())),
            ));
        }
        info!(path = %path.display(), iteration, step = step.as_u8(), "loaded model artifact");
        Ok(bundle)
    }
}

impl<C: Serialize, R: Serialize> IterationObserver<C, R> for ModelStore {
    fn step1_complete(
        &mut self,
        iteration: usize,
        classifier: &C,
        regressor: Option<&R>,
    ) -> Result<(), OmfError> {
        self.save_step1(iteration, classifier, regressor).map(|_| ())
    }

    fn step2_complete(&mut self, iteration: usize, classifier: &C) -> Result<(), OmfError> {
        self.save_step2(iteration, classifier).map(|_| ())
    }
}
