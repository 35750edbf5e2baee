//! Snapshot source abstraction.

use crate::error::EnvError;
use crate::types::TimeToken;

/// A producer-side collection of snapshot units, one per timestep.
///
/// The verification pass never touches the filesystem directly: it is handed
/// one source for the reference ephemeris and one for the simulation output.
///
/// # Implementations
///
/// - **Filesystem**: `DirectorySource` - one `<token>.<ext>` file per timestep
/// - **In-memory**: `MemorySource` - token → bytes map for tests and embedding
pub trait SnapshotSource: Send + Sync {
    /// Returns every time token in the source, lexically sorted.
    fn tokens(&self) -> Result<Vec<TimeToken>, EnvError>;

    /// Returns the raw snapshot bytes stored under `token`.
    fn read(&self, token: &TimeToken) -> Result<Vec<u8>, EnvError>;

    /// Returns true if a unit exists for `token`.
    fn contains(&self, token: &TimeToken) -> bool;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}
