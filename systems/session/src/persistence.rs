use deepdelve_world::GameSnapshot;

use crate::CollaboratorError;

/// Storage collaborator holding at most one saved game.
pub trait Persistence {
    /// Stores the snapshot, replacing any previous record.
    fn save(&mut self, snapshot: &GameSnapshot) -> Result<(), CollaboratorError>;

    /// Reads the stored record.
    ///
    /// Returns `Ok(None)` when nothing was saved and an error when the
    /// record exists but cannot be decoded.
    fn load(&mut self) -> Result<Option<GameSnapshot>, CollaboratorError>;

    /// Removes the stored record.
    fn clear(&mut self) -> Result<(), CollaboratorError>;
}

/// Persistence that keeps the record in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryPersistence {
    record: Option<GameSnapshot>,
}

impl MemoryPersistence {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `snapshot`.
    #[must_use]
    pub fn with_record(snapshot: GameSnapshot) -> Self {
        Self {
            record: Some(snapshot),
        }
    }

    /// Stored record, if any.
    #[must_use]
    pub fn record(&self) -> Option<&GameSnapshot> {
        self.record.as_ref()
    }
}

impl Persistence for MemoryPersistence {
    fn save(&mut self, snapshot: &GameSnapshot) -> Result<(), CollaboratorError> {
        self.record = Some(snapshot.clone());
        Ok(())
    }

    fn load(&mut self) -> Result<Option<GameSnapshot>, CollaboratorError> {
        Ok(self.record.clone())
    }

    fn clear(&mut self) -> Result<(), CollaboratorError> {
        self.record = None;
        Ok(())
    }
}
