pub mod container;

pub use container::VaultContainer;

use crate::error::Result;

/// Handle to a group inside a vault.
pub type GroupId = usize;

/// Handle to an entry inside a vault.
pub type EntryId = usize;

/// Key derivation function used to turn the passphrase into a cipher key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kdf {
    /// Memory-hard default; not every build can derive with it.
    Argon2id,
    /// Iterated SHA-256, available everywhere. The fallback choice.
    AesKdf,
}

/// On-disk container format revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    V3,
    V4,
}

/// Narrow capability interface over the encrypted-container backend.
///
/// The export builder only ever talks to this trait, so the tree walk can
/// be tested against a stub with no cryptography behind it. `serialize` may
/// fail with [`crate::MarkvaultError::UnsupportedKdf`] when the configured
/// KDF is not available; see the fallback policy in [`crate::export`].
pub trait Vault {
    fn set_kdf(&mut self, kdf: Kdf) -> Result<()>;
    fn set_version(&mut self, version: FormatVersion) -> Result<()>;

    /// The container's default group, under which root folders attach.
    fn root_group(&self) -> GroupId;

    fn add_group(&mut self, parent: GroupId, title: &str) -> Result<GroupId>;

    /// Create an empty entry; fields are set afterwards by name.
    fn add_entry(&mut self, parent: GroupId) -> Result<EntryId>;
    fn set_field(&mut self, entry: EntryId, name: &str, value: &str) -> Result<()>;

    /// Produce the raw bytes of the encrypted container.
    fn serialize(&mut self) -> Result<Vec<u8>>;
}
