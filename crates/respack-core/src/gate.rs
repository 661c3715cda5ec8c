use crate::CoreError;
use respack_schema::ConfigError;
use respack_store::{record_path_for, write_depfile, FingerprintRecord, FingerprintSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What [`StalenessGate::run_if_stale`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Inputs and outputs matched the previous record; nothing was run.
    Skipped,
    /// The action ran, for these reasons.
    Ran { reasons: Vec<String> },
}

impl GateOutcome {
    pub fn ran(&self) -> bool {
        matches!(self, Self::Ran { .. })
    }
}

/// Runs an action only when its fingerprinted inputs changed, and always
/// refreshes the depfile.
///
/// The record lives beside the first output. It is deleted before the action
/// runs and written again only once the action succeeds, so an interrupted or
/// failed run is always retried.
#[derive(Debug, Clone)]
pub struct StalenessGate {
    inputs: FingerprintSet,
    outputs: Vec<PathBuf>,
    depfile: Option<PathBuf>,
    depfile_deps: Vec<String>,
}

impl StalenessGate {
    pub fn new(outputs: Vec<PathBuf>) -> Result<Self, CoreError> {
        if outputs.is_empty() {
            return Err(ConfigError::NoOutputs.into());
        }
        Ok(Self {
            inputs: FingerprintSet::new(),
            outputs,
            depfile: None,
            depfile_deps: Vec::new(),
        })
    }

    pub fn inputs_mut(&mut self) -> &mut FingerprintSet {
        &mut self.inputs
    }

    #[must_use]
    pub fn with_depfile(mut self, path: impl Into<PathBuf>, deps: Vec<String>) -> Self {
        self.depfile = Some(path.into());
        self.depfile_deps = deps;
        self
    }

    pub fn first_output(&self) -> &Path {
        &self.outputs[0]
    }

    pub fn record_path(&self) -> PathBuf {
        record_path_for(self.first_output())
    }

    /// Fingerprint over the inputs plus output paths, which are hashed by
    /// name only.
    pub fn fingerprint(&self) -> Result<FingerprintRecord, CoreError> {
        let mut set = self.inputs.clone();
        for output in &self.outputs {
            set.add_literal(format!("output:{}", output.display()));
        }
        debug!(
            "fingerprinting {} inputs for {}",
            set.entries().len(),
            self.first_output().display()
        );
        Ok(set.compute()?)
    }

    /// Reasons the action must run; empty when up to date.
    pub fn stale_reasons(&self, current: &FingerprintRecord) -> Vec<String> {
        let mut reasons = match FingerprintRecord::load(&self.record_path()) {
            None => vec!["no previous fingerprint record".to_owned()],
            Some(previous) if previous.matches(current) => Vec::new(),
            Some(previous) => current.describe_changes(&previous),
        };
        for output in &self.outputs {
            if !output.exists() {
                reasons.push(format!("output missing: {}", output.display()));
            }
        }
        reasons
    }

    pub fn run_if_stale<F>(&self, action: F) -> Result<GateOutcome, CoreError>
    where
        F: FnOnce() -> Result<(), CoreError>,
    {
        let current = self.fingerprint()?;
        let reasons = self.stale_reasons(&current);
        let record_path = self.record_path();

        let outcome = if reasons.is_empty() {
            info!("{} is up to date", self.first_output().display());
            GateOutcome::Skipped
        } else {
            for reason in &reasons {
                debug!("stale: {reason}");
            }
            FingerprintRecord::remove(&record_path)?;
            action()?;
            current.persist(&record_path)?;
            GateOutcome::Ran { reasons }
        };

        if let Some(depfile) = &self.depfile {
            write_depfile(depfile, self.first_output(), &self.depfile_deps)?;
        }
        Ok(outcome)
    }
}
