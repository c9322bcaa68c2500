//! Persisted model artifacts.
//!
//! The classifier, scaler and encoder are stored as three independent
//! bincode files. Each file starts with an `ArtifactHeader` naming its kind,
//! the format version and the feature schema it was fitted against.
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ArtifactPaths;
use crate::error::{LoanError, Result};
use crate::models::SvmClassifier;
use crate::preprocessing::{CategoricalEncoder, FeatureScaler};
use crate::schema::{check_schema, schema_names, FEATURE_SCHEMA};

/// Column the persisted encoder must have been fitted on.
const SELF_EMPLOYED_COLUMN: &str = FEATURE_SCHEMA[3];

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Model,
    Scaler,
    Encoder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub format_version: u32,
    pub kind: ArtifactKind,
    pub feature_schema: Vec<String>,
    /// RFC 3339 timestamp of the training run.
    pub trained_at: String,
}

impl ArtifactHeader {
    pub fn new(kind: ArtifactKind, trained_at: &str) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            kind,
            feature_schema: schema_names(),
            trained_at: trained_at.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Artifact<T> {
    header: ArtifactHeader,
    payload: T,
}

/// The three fitted artifacts, loaded together and never mutated.
#[derive(Debug)]
pub struct ArtifactBundle {
    pub encoder: CategoricalEncoder,
    pub scaler: FeatureScaler,
    pub model: SvmClassifier,
    pub trained_at: String,
}

impl ArtifactBundle {
    /// Load all three artifacts. Any missing or inconsistent file fails the
    /// whole load, including files that come from different training runs.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let (model_header, model) = read_artifact::<SvmClassifier>(&paths.model(), ArtifactKind::Model)?;
        let (scaler_header, scaler) = read_artifact::<FeatureScaler>(&paths.scaler(), ArtifactKind::Scaler)?;
        let (encoder_header, encoder) =
            read_artifact::<CategoricalEncoder>(&paths.encoder(), ArtifactKind::Encoder)?;

        for (path, header) in [(paths.scaler(), &scaler_header), (paths.encoder(), &encoder_header)] {
            if header.trained_at != model_header.trained_at {
                return Err(LoanError::ArtifactCorrupt {
                    path,
                    reason: format!(
                        "trained at {} but the model was trained at {}",
                        header.trained_at, model_header.trained_at
                    ),
                });
            }
        }

        if encoder.field() != SELF_EMPLOYED_COLUMN {
            return Err(LoanError::ArtifactCorrupt {
                path: paths.encoder(),
                reason: format!(
                    "encoder was fitted on '{}', expected '{}'",
                    encoder.field(),
                    SELF_EMPLOYED_COLUMN
                ),
            });
        }

        log::info!(
            "Loaded artifacts from {} (trained at {})",
            paths.dir.display(),
            model_header.trained_at
        );

        Ok(Self {
            encoder,
            scaler,
            model,
            trained_at: model_header.trained_at,
        })
    }

    /// Write all three artifacts, or none of them.
    ///
    /// Each artifact goes to a `.tmp` sibling first. Existing artifacts are
    /// moved to `.bak` siblings while the temps are renamed into place, and
    /// are restored if any rename fails.
    pub fn save(&self, paths: &ArtifactPaths) -> Result<()> {
        fs::create_dir_all(&paths.dir)?;

        let targets = [paths.model(), paths.scaler(), paths.encoder()];
        let temps: Vec<PathBuf> = targets.iter().map(|p| sibling(p, "tmp")).collect();
        let backups: Vec<PathBuf> = targets.iter().map(|p| sibling(p, "bak")).collect();

        if let Err(e) = self.write_temps(&temps) {
            remove_all(&temps);
            return Err(e);
        }

        if let Err(e) = swap_into_place(&temps, &targets, &backups) {
            remove_all(&temps);
            return Err(e);
        }
        remove_all(&backups);

        for target in &targets {
            log::info!("Saved {}", target.display());
        }
        Ok(())
    }

    fn write_temps(&self, temps: &[PathBuf]) -> Result<()> {
        write_artifact(&temps[0], ArtifactKind::Model, &self.trained_at, &self.model)?;
        write_artifact(&temps[1], ArtifactKind::Scaler, &self.trained_at, &self.scaler)?;
        write_artifact(&temps[2], ArtifactKind::Encoder, &self.trained_at, &self.encoder)?;
        Ok(())
    }
}

/// Loads the artifact bundle at most once and hands out shared references.
///
/// A failed load leaves the cache empty, so requests keep failing until the
/// artifacts are fixed rather than running with a partial setup.
pub struct ArtifactCache {
    paths: ArtifactPaths,
    cell: OnceCell<ArtifactBundle>,
}

impl ArtifactCache {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self {
            paths,
            cell: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Result<&ArtifactBundle> {
        self.cell.get_or_try_init(|| ArtifactBundle::load(&self.paths))
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/// Move existing targets to their backups, then the temps onto the targets.
/// On failure every target is put back the way it was.
fn swap_into_place(temps: &[PathBuf], targets: &[PathBuf], backups: &[PathBuf]) -> Result<()> {
    let mut moved_aside = Vec::new();
    for (i, (target, backup)) in targets.iter().zip(backups.iter()).enumerate() {
        if target.is_file() {
            if let Err(e) = fs::rename(target, backup) {
                restore(targets, backups, &moved_aside, &[]);
                return Err(e.into());
            }
            moved_aside.push(i);
        }
    }

    let mut placed = Vec::new();
    for (i, (tmp, target)) in temps.iter().zip(targets.iter()).enumerate() {
        if let Err(e) = fs::rename(tmp, target) {
            log::warn!("Could not move {} into place: {}", target.display(), e);
            restore(targets, backups, &moved_aside, &placed);
            return Err(e.into());
        }
        placed.push(i);
    }
    Ok(())
}

fn restore(targets: &[PathBuf], backups: &[PathBuf], moved_aside: &[usize], placed: &[usize]) {
    for &i in placed {
        if let Err(e) = fs::remove_file(&targets[i]) {
            log::warn!("Failed to remove {}: {}", targets[i].display(), e);
        }
    }
    for &i in moved_aside {
        if let Err(e) = fs::rename(&backups[i], &targets[i]) {
            log::warn!("Failed to restore {}: {}", targets[i].display(), e);
        }
    }
}

fn remove_all(paths: &[PathBuf]) {
    for p in paths {
        if p.exists() {
            if let Err(e) = fs::remove_file(p) {
                log::warn!("Failed to remove {}: {}", p.display(), e);
            }
        }
    }
}

fn write_artifact<T: Serialize>(path: &Path, kind: ArtifactKind, trained_at: &str, payload: &T) -> Result<()> {
    let artifact = Artifact {
        header: ArtifactHeader::new(kind, trained_at),
        payload,
    };
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, &artifact)?;
    writer.flush()?;
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(path: &Path, kind: ArtifactKind) -> Result<(ArtifactHeader, T)> {
    if !path.is_file() {
        return Err(LoanError::ArtifactMissing(path.to_path_buf()));
    }
    let file = fs::File::open(path)?;
    let artifact: Artifact<T> =
        bincode::deserialize_from(BufReader::new(file)).map_err(|e| LoanError::ArtifactCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let header = artifact.header;
    if header.kind != kind {
        return Err(LoanError::ArtifactCorrupt {
            path: path.to_path_buf(),
            reason: format!("expected a {:?} artifact, found {:?}", kind, header.kind),
        });
    }
    if header.format_version != FORMAT_VERSION {
        return Err(LoanError::ArtifactCorrupt {
            path: path.to_path_buf(),
            reason: format!(
                "unsupported format version {} (expected {})",
                header.format_version, FORMAT_VERSION
            ),
        });
    }
    check_schema(&header.feature_schema)?;

    Ok((header, artifact.payload))
}
