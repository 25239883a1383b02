use chrono::{DateTime, Local};

use crate::error::{MarkvaultError, Result};
use crate::model::{count_bookmarks, Node};
use crate::vault::{FormatVersion, GroupId, Kdf, Vault, VaultContainer};

/// Filename prefix of generated vault files.
pub const FILE_PREFIX: &str = "bookmarks";
/// Filename extension of generated vault files.
pub const FILE_EXT: &str = "mvlt";

/// Outcome of a successful export: raw container bytes and the suggested
/// timestamped filename.
pub struct Export {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Walk a merged tree into `vault` and serialize it.
///
/// The universally supported fallback KDF and the older format version are
/// requested before the first serialization attempt, sidestepping
/// environments that lack the stronger default; a backend refusing the
/// request itself keeps its silent defaults. If serialization still fails
/// with an unsupported-KDF error, the fallback configuration is re-asserted
/// and serialization retried exactly once. Any further failure is terminal
/// and no bytes are produced.
pub fn build_vault<V: Vault>(tree: &[Node], vault: &mut V) -> Result<Vec<u8>> {
    if count_bookmarks(tree) == 0 {
        return Err(MarkvaultError::EmptyInput);
    }

    if vault.set_kdf(Kdf::AesKdf).is_err() || vault.set_version(FormatVersion::V3).is_err() {
        log::debug!("vault rejected the fallback KDF/version request, keeping its defaults");
    }

    walk(tree, vault.root_group(), vault)?;

    match vault.serialize() {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.is_unsupported_kdf() => {
            log::debug!("serialization failed ({err}), retrying once with forced fallback");
            if vault.set_kdf(Kdf::AesKdf).is_err() || vault.set_version(FormatVersion::V3).is_err()
            {
                log::debug!("fallback re-assertion rejected, retrying anyway");
            }
            vault
                .serialize()
                .map_err(|err| MarkvaultError::Export(err.to_string()))
        }
        Err(err) => Err(MarkvaultError::Export(err.to_string())),
    }
}

/// Export a merged tree into a fresh passphrase-protected container.
///
/// Folders become groups (root folders under the container's default
/// group), bookmarks become entries with verbatim `Title` and `URL` fields.
/// An empty passphrase is permitted.
pub fn export_tree(tree: &[Node], passphrase: &str) -> Result<Export> {
    let mut vault = VaultContainer::new(passphrase);
    let bytes = build_vault(tree, &mut vault)?;
    Ok(Export {
        filename: generated_filename(Local::now()),
        bytes,
    })
}

fn walk<V: Vault>(nodes: &[Node], parent: GroupId, vault: &mut V) -> Result<()> {
    for node in nodes {
        match node {
            Node::Folder { title, children } => {
                let group = vault.add_group(parent, title)?;
                walk(children, group, vault)?;
            }
            Node::Bookmark { title, url } => {
                let entry = vault.add_entry(parent)?;
                vault.set_field(entry, "Title", title)?;
                vault.set_field(entry, "URL", url)?;
            }
        }
    }
    Ok(())
}

fn generated_filename(now: DateTime<Local>) -> String {
    format!("{}_{}.{}", FILE_PREFIX, now.format("%Y%m%d_%H%M%S"), FILE_EXT)
}
