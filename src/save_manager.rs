use crate::core::constants::WORLD_SAVE_MAGIC;
use crate::fishing::ledger::{CatchRecordEntry, CatchRecordStore, LegendaryLedger};
use crate::species::{LocationId, SpeciesId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const HEADER_LEN: usize = 8 + 4;
const CHECKSUM_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to access world save at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode world save: {0}")]
    Encode(#[source] bincode::Error),
    #[error("failed to decode world save: {0}")]
    Decode(#[source] bincode::Error),
    #[error("invalid world save version: expected 0x{expected:016X}, got 0x{found:016X}")]
    BadMagic { expected: u64, found: u64 },
    #[error("world save is truncated")]
    Truncated,
    #[error("world save checksum verification failed")]
    ChecksumMismatch,
}

/// World-scoped state that outlives any one engine: claimed legendaries and
/// every angler's personal bests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSave {
    pub legendary_claims: Vec<(SpeciesId, LocationId)>,
    pub catch_records: Vec<CatchRecordEntry>,
}

impl WorldSave {
    pub fn capture(ledger: &LegendaryLedger, records: &CatchRecordStore) -> Self {
        Self {
            legendary_claims: ledger.claims(),
            catch_records: records.entries(),
        }
    }

    /// Rebuild the shared stores, ready to hand to engines.
    pub fn restore(self) -> (LegendaryLedger, CatchRecordStore) {
        (
            LegendaryLedger::from_claims(self.legendary_claims),
            CatchRecordStore::from_entries(self.catch_records),
        )
    }

    /// Byte layout:
    /// - Version magic (8 bytes, LE)
    /// - Payload length (4 bytes, LE)
    /// - Bincode payload
    /// - SHA256 over everything above (32 bytes)
    pub fn encode(&self) -> Result<Vec<u8>, SaveError> {
        let data = bincode::serialize(self).map_err(SaveError::Encode)?;
        let data_len = data.len() as u32;

        let mut hasher = Sha256::new();
        hasher.update(WORLD_SAVE_MAGIC.to_le_bytes());
        hasher.update(data_len.to_le_bytes());
        hasher.update(&data);
        let checksum = hasher.finalize();

        let mut bytes = Vec::with_capacity(HEADER_LEN + data.len() + CHECKSUM_LEN);
        bytes.extend_from_slice(&WORLD_SAVE_MAGIC.to_le_bytes());
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.extend_from_slice(&data);
        bytes.extend_from_slice(&checksum);
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SaveError> {
        if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
            return Err(SaveError::Truncated);
        }

        let (version_bytes, rest) = bytes.split_at(8);
        let version = u64::from_le_bytes(version_bytes.try_into().map_err(|_| SaveError::Truncated)?);
        if version != WORLD_SAVE_MAGIC {
            return Err(SaveError::BadMagic {
                expected: WORLD_SAVE_MAGIC,
                found: version,
            });
        }

        let (length_bytes, rest) = rest.split_at(4);
        let data_len =
            u32::from_le_bytes(length_bytes.try_into().map_err(|_| SaveError::Truncated)?) as usize;
        if rest.len() != data_len + CHECKSUM_LEN {
            return Err(SaveError::Truncated);
        }
        let (data, stored_checksum) = rest.split_at(data_len);

        let mut hasher = Sha256::new();
        hasher.update(version_bytes);
        hasher.update(length_bytes);
        hasher.update(data);
        let computed_checksum = hasher.finalize();
        if stored_checksum != computed_checksum.as_slice() {
            return Err(SaveError::ChecksumMismatch);
        }

        bincode::deserialize(data).map_err(SaveError::Decode)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SaveError> {
        let bytes = self.encode()?;
        fs::write(path, bytes).map_err(|source| SaveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            target: "angler::save",
            path = %path.display(),
            claims = self.legendary_claims.len(),
            records = self.catch_records.len(),
            "world_save.written"
        );
        Ok(())
    }

    pub fn load_from(path: &Path) -> Result<Self, SaveError> {
        let bytes = fs::read(path).map_err(|source| SaveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let save = Self::decode(&bytes)?;
        tracing::info!(
            target: "angler::save",
            path = %path.display(),
            claims = save.legendary_claims.len(),
            records = save.catch_records.len(),
            "world_save.loaded"
        );
        Ok(save)
    }
}
