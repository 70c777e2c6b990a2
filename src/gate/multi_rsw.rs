use parking_lot::Mutex;

use crate::ConflictError;
use crate::ConsistencyError;
use crate::Result;

/// Diagnostic view of a [`MultiRSW`] gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Reading(usize),
    Writing,
}

#[derive(Debug, Default)]
struct ReaderWriterState {
    writer_active: bool,
    num_readers: usize,
}

/// Multiple-readers/single-writer admission gate.
///
/// Callers declare intent and are rejected on conflict instead of waiting.
/// Typical use is gating a snapshot install against in-flight reads and
/// writes of the same state.
#[derive(Debug, Default)]
pub struct MultiRSW {
    state: Mutex<ReaderWriterState>,
}

impl MultiRSW {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_read(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.writer_active {
            return Err(ConflictError::ReaderWriter.into());
        }
        state.num_readers += 1;
        Ok(())
    }

    pub fn end_read(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.num_readers = state
            .num_readers
            .checked_sub(1)
            .ok_or(ConsistencyError::NegativeReaderCount)?;
        Ok(())
    }

    pub fn begin_write(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.writer_active || state.num_readers > 0 {
            return Err(ConflictError::ReaderWriter.into());
        }
        state.writer_active = true;
        Ok(())
    }

    pub fn end_write(&self) -> Result<()> {
        let mut state = self.state.lock();
        if !state.writer_active {
            return Err(ConsistencyError::NoActiveWriter.into());
        }
        state.writer_active = false;
        Ok(())
    }

    /// Converts the single active reader into the writer.
    ///
    /// Fails if a writer is active or more than one reader is in flight, and
    /// with a distinct error if there is no reader to upgrade.
    pub fn upgrade_to_writer(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.writer_active || state.num_readers > 1 {
            return Err(ConflictError::ReaderWriter.into());
        }
        if state.num_readers == 0 {
            return Err(ConflictError::UpgradeWithoutReaders.into());
        }
        state.writer_active = true;
        state.num_readers = 0;
        Ok(())
    }

    pub fn state(&self) -> GateState {
        let state = self.state.lock();
        if state.writer_active {
            GateState::Writing
        } else if state.num_readers > 0 {
            GateState::Reading(state.num_readers)
        } else {
            GateState::Idle
        }
    }
}
