use std::{
    fs, io,
    path::{Path, PathBuf},
};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use deepdelve_system_session::{CollaboratorError, Persistence};
use deepdelve_world::GameSnapshot;
use thiserror::Error;

const SAVE_DOMAIN: &str = "delve";
const SAVE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded save payload.
pub(crate) const SAVE_HEADER: &str = "delve:v1";
/// Delimiter used to separate the prefix fields from the payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a snapshot into a single-line string.
pub(crate) fn encode(snapshot: &GameSnapshot) -> Result<String, SaveTransferError> {
    let json = serde_json::to_vec(snapshot).map_err(SaveTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{SAVE_HEADER}:{encoded}"))
}

/// Decodes a snapshot from its single-line representation.
pub(crate) fn decode(value: &str) -> Result<GameSnapshot, SaveTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SaveTransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().ok_or(SaveTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(SaveTransferError::MissingVersion)?;
    let payload = parts.next().ok_or(SaveTransferError::MissingPayload)?;

    if domain != SAVE_DOMAIN {
        return Err(SaveTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != SAVE_VERSION {
        return Err(SaveTransferError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(SaveTransferError::InvalidEncoding)?;
    serde_json::from_slice(&bytes).map_err(SaveTransferError::InvalidPayload)
}

/// Errors that can occur while encoding or decoding save strings.
#[derive(Debug, Error)]
pub(crate) enum SaveTransferError {
    /// The stored string was empty or contained only whitespace.
    #[error("save payload was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("save string is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("save string is missing the version")]
    MissingVersion,
    /// The payload segment was missing.
    #[error("save string is missing the payload")]
    MissingPayload,
    /// The prefix segment named another format.
    #[error("save prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The version segment named an unknown revision.
    #[error("save version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode save payload")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload was not a valid snapshot.
    #[error("could not parse save payload")]
    InvalidPayload(#[source] serde_json::Error),
}

/// Persistence provider storing the save string in a single file.
#[derive(Clone, Debug)]
pub(crate) struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    /// Creates a provider backed by `path`. The file is created on first save.
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the save file.
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for JsonFilePersistence {
    fn save(&mut self, snapshot: &GameSnapshot) -> Result<(), CollaboratorError> {
        let line = encode(snapshot)?;
        fs::write(&self.path, line + "\n")?;
        Ok(())
    }

    fn load(&mut self) -> Result<Option<GameSnapshot>, CollaboratorError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        Ok(Some(decode(&contents)?))
    }

    fn clear(&mut self) -> Result<(), CollaboratorError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use deepdelve_core::{ArchetypeId, Command, DungeonConfig, PartyMemberSpec};
    use deepdelve_world::{self as world, query, World};

    use super::*;

    fn snapshot() -> GameSnapshot {
        let mut world = World::new(DungeonConfig::default(), 77);
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::StartGame {
                party: vec![PartyMemberSpec::new("Nell", ArchetypeId::Rogue)],
            },
            &mut events,
        );
        query::snapshot(&world)
    }

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("deepdelve-{}-{name}", std::process::id()))
    }

    #[test]
    fn encoded_saves_are_single_prefixed_lines() {
        let snapshot = snapshot();
        let encoded = encode(&snapshot).expect("snapshot encodes");
        assert!(encoded.starts_with(&format!("{SAVE_HEADER}:")));
        assert!(!encoded.contains('\n'));
        assert_eq!(decode(&encoded).expect("save decodes"), snapshot);
    }

    #[test]
    fn foreign_strings_are_rejected() {
        assert!(matches!(decode("  "), Err(SaveTransferError::EmptyPayload)));
        assert!(matches!(
            decode("crypt:v1:abc"),
            Err(SaveTransferError::InvalidPrefix(prefix)) if prefix == "crypt"
        ));
        assert!(matches!(
            decode("delve:v2:abc"),
            Err(SaveTransferError::UnsupportedVersion(version)) if version == "v2"
        ));
        assert!(matches!(
            decode("delve:v1"),
            Err(SaveTransferError::MissingPayload)
        ));
        assert!(matches!(
            decode("delve:v1:@@@"),
            Err(SaveTransferError::InvalidEncoding(_))
        ));
        let not_a_snapshot = STANDARD_NO_PAD.encode(b"{\"hello\":1}");
        assert!(matches!(
            decode(&format!("delve:v1:{not_a_snapshot}")),
            Err(SaveTransferError::InvalidPayload(_))
        ));
    }

    #[test]
    fn file_store_survives_a_reopen() {
        let path = scratch_file("reopen.sav");
        let snapshot = snapshot();

        let mut store = JsonFilePersistence::new(&path);
        store.save(&snapshot).expect("save succeeds");

        let mut reopened = JsonFilePersistence::new(store.path());
        assert_eq!(reopened.load().expect("load succeeds"), Some(snapshot));

        reopened.clear().expect("clear succeeds");
        assert_eq!(reopened.load().expect("load succeeds"), None);
        reopened.clear().expect("clearing twice is fine");
    }

    #[test]
    fn damaged_files_report_an_error() {
        let path = scratch_file("damaged.sav");
        fs::write(&path, "delve:v1:not base64!").expect("scratch file writable");

        let mut store = JsonFilePersistence::new(&path);
        assert!(store.load().is_err());
        store.clear().expect("clear succeeds");
    }
}
