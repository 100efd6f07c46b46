//! JSON file store with atomic replace-on-save.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use tracing::{debug, info};

use crate::{
    core::log::DiveLog,
    types::{LOG_MAJOR, LogSeq},
};

use super::{LogStore, LogVersion, PersistError, PersistResult, PersistedDiveLog};

const TEMP_PREFIX: &str = "divelog.";
const TEMP_SUFFIX: &str = ".tmp.json";

/// Location of the persisted log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the log file and its temporary siblings.
    pub data_dir: PathBuf,
    /// Canonical file name inside `data_dir`.
    pub file_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            file_name: "divelog.json".to_string(),
        }
    }
}

/// [`LogStore`] writing the whole log as one JSON document per generation.
///
/// Each save goes to a fresh temporary file in the data directory which is then renamed
/// over the canonical path, so readers see either the old or the new generation.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    config: StoreConfig,
}

impl JsonFileStore {
    /// Store at the location given by `config`.
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Store rooted at `data_dir` with the default file name.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(StoreConfig {
            data_dir: data_dir.into(),
            ..StoreConfig::default()
        })
    }

    /// Canonical log file path.
    pub fn path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.file_name)
    }

    /// Directory holding the log file.
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Writes an initial generation of `log` when no log file exists yet.
    ///
    /// Returns true when a file was created.
    pub fn init(&mut self, log: &mut DiveLog) -> PersistResult<bool> {
        if self.path().exists() {
            return Ok(false);
        }
        fs::create_dir_all(&self.config.data_dir)
            .map_err(PersistError::io("data directory creation failed"))?;
        let sequence = self.save(log)?;
        info!(path = %self.path().display(), sequence, "initialized empty dive log");
        Ok(true)
    }

    fn read_envelope(&self) -> PersistResult<PersistedDiveLog> {
        let file = File::open(self.path()).map_err(PersistError::io("read log operation failed"))?;
        serde_json::from_reader(BufReader::new(file)).map_err(PersistError::Decode)
    }
}

impl LogStore for JsonFileStore {
    fn load(&mut self, log: &mut DiveLog) -> PersistResult<()> {
        let plog = self.read_envelope()?;

        let version: LogVersion = plog.version.parse()?;
        if version.major != LOG_MAJOR {
            return Err(PersistError::Corrupted(format!(
                "unsupported major version {} (expected {LOG_MAJOR})",
                version.major
            )));
        }
        let modified = DateTime::parse_from_rfc3339(&plog.modified)
            .map_err(|err| {
                PersistError::Corrupted(format!("bad modified timestamp {:?}: {err}", plog.modified))
            })?
            .with_timezone(&Utc);

        log.reconstruct_all(plog.dives)?;
        log.restore_persistence(version.sequence, modified);

        info!(
            path = %self.path().display(),
            sequence = version.sequence,
            dives = log.len(),
            "loaded dive log"
        );
        Ok(())
    }

    fn save(&mut self, log: &mut DiveLog) -> PersistResult<LogSeq> {
        let sequence = log.sequence();
        let modified = Utc::now().trunc_subsecs(0);
        let plog = PersistedDiveLog {
            version: LogVersion::current(sequence).to_string(),
            modified: modified.to_rfc3339_opts(SecondsFormat::Secs, true),
            dives: log.records(),
        };

        // Dropping the temp file on any early return removes it.
        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.config.data_dir)
            .map_err(PersistError::io("temp log file creation failed"))?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut writer, &plog).map_err(PersistError::Encode)?;
            writer
                .flush()
                .map_err(PersistError::io("write log operation failed"))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(PersistError::io("write log operation failed"))?;
        tmp.persist(self.path()).map_err(|err| PersistError::Io {
            context: "rename log operation failed",
            source: err.error,
        })?;

        log.mark_persisted(sequence, modified);
        debug!(sequence, dives = plog.dives.len(), "persisted dive log");
        Ok(sequence)
    }
}
