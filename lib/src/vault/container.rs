use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{EntryId, FormatVersion, GroupId, Kdf, Vault};
use crate::error::{MarkvaultError, Result};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const MAGIC: &[u8; 4] = b"MVLT";
const SALT_SIZE: usize = 0x20;
const IV_SIZE: usize = 0x10;
const DEFAULT_ROUNDS: u32 = 60_000;
// Upper bound on header-supplied KDF rounds; a hostile header must not be
// able to pin the CPU for minutes
const MAX_ROUNDS: u32 = 10_000_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub title: String,
    pub parent: Option<GroupId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    pub parent: GroupId,
    pub fields: Vec<(String, String)>,
}

impl Entry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Decrypted body of a container file.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payload {
    pub groups: Vec<Group>,
    pub entries: Vec<Entry>,
}

/// Encrypted credential container: nested groups holding entries with
/// named fields, serialized to AES-256-CBC ciphertext framed by a small
/// header (magic, format version, KDF rounds, salt, IV, payload hash).
///
/// A fresh container is configured with [`FormatVersion::V4`] and
/// [`Kdf::Argon2id`]; this build carries no Argon2 provider, so callers
/// must downgrade to [`Kdf::AesKdf`] (iterated SHA-256) before the
/// container can serialize. An empty passphrase is accepted as a valid,
/// if weak, credential.
pub struct VaultContainer {
    passphrase: String,
    kdf: Kdf,
    version: FormatVersion,
    rounds: u32,
    groups: Vec<Group>,
    entries: Vec<Entry>,
}

impl VaultContainer {
    pub fn new(passphrase: &str) -> Self {
        VaultContainer {
            passphrase: passphrase.to_string(),
            kdf: Kdf::Argon2id,
            version: FormatVersion::V4,
            rounds: DEFAULT_ROUNDS,
            groups: vec![Group {
                title: "Root".to_string(),
                parent: None,
            }],
            entries: Vec::new(),
        }
    }

    pub fn kdf(&self) -> Kdf {
        self.kdf
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    fn check_group(&self, id: GroupId) -> Result<()> {
        if id >= self.groups.len() {
            return Err(MarkvaultError::InvalidInput(format!(
                "unknown group handle {id}"
            )));
        }
        Ok(())
    }

    fn encrypt(&self) -> Result<Vec<u8>> {
        let payload = serde_json::to_vec(&Payload {
            groups: self.groups.clone(),
            entries: self.entries.clone(),
        })?;

        let mut salt = [0u8; SALT_SIZE];
        rand::rng().fill_bytes(&mut salt);
        let mut iv = [0u8; IV_SIZE];
        rand::rng().fill_bytes(&mut iv);

        let key = derive_key(&self.passphrase, &salt, self.rounds);
        let mut encryptor = Aes256CbcEnc::new(&key.into(), &iv.into());

        let payload_hash: [u8; 32] = Sha256::digest(&payload).into();

        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&version_code(self.version).to_le_bytes());
        out.extend_from_slice(&self.rounds.to_le_bytes());
        out.extend_from_slice(&salt);
        out.extend_from_slice(&iv);
        out.extend_from_slice(&payload_hash);
        out.extend_from_slice(&(payload.len() as u64).to_le_bytes());

        // Pad to the block size; real length is in the header
        let mut padded = payload;
        let pad = (16 - padded.len() % 16) % 16;
        padded.extend(std::iter::repeat_n(b' ', pad));

        for block_chunk in padded.chunks_mut(16) {
            let block = cbc::cipher::generic_array::GenericArray::from_mut_slice(block_chunk);
            encryptor.encrypt_block_mut(block);
        }
        out.extend_from_slice(&padded);

        Ok(out)
    }

    /// Decrypt container bytes back into their payload. Fails when the
    /// passphrase is wrong (the payload hash no longer matches) or the
    /// framing is not ours.
    pub fn decrypt(bytes: &[u8], passphrase: &str) -> Result<Payload> {
        let header_len = MAGIC.len() + 2 + 4 + SALT_SIZE + IV_SIZE + 32 + 8;
        if bytes.len() < header_len || &bytes[..4] != MAGIC {
            return Err(MarkvaultError::Crypto(
                "not a vault container".to_string(),
            ));
        }

        let version = u16::from_le_bytes(bytes[4..6].try_into().expect("sized slice"));
        if version != version_code(FormatVersion::V3) && version != version_code(FormatVersion::V4)
        {
            return Err(MarkvaultError::Crypto(format!(
                "unknown container version {version}"
            )));
        }

        let rounds = u32::from_le_bytes(bytes[6..10].try_into().expect("sized slice"));
        if rounds == 0 || rounds > MAX_ROUNDS {
            return Err(MarkvaultError::Crypto(format!(
                "implausible KDF round count {rounds}"
            )));
        }
        let salt = &bytes[10..10 + SALT_SIZE];
        let iv: [u8; IV_SIZE] = bytes[10 + SALT_SIZE..10 + SALT_SIZE + IV_SIZE]
            .try_into()
            .expect("sized slice");
        let hash_start = 10 + SALT_SIZE + IV_SIZE;
        let expected_hash = &bytes[hash_start..hash_start + 32];
        let payload_len =
            u64::from_le_bytes(bytes[hash_start + 32..header_len].try_into().expect("sized slice"))
                as usize;

        let ciphertext = &bytes[header_len..];
        if ciphertext.len() % 16 != 0 || payload_len > ciphertext.len() {
            return Err(MarkvaultError::Crypto("truncated container".to_string()));
        }

        let key = derive_key(passphrase, salt, rounds);
        let mut decryptor = Aes256CbcDec::new(&key.into(), &iv.into());

        let mut plain = ciphertext.to_vec();
        for block_chunk in plain.chunks_mut(16) {
            let block = cbc::cipher::generic_array::GenericArray::from_mut_slice(block_chunk);
            decryptor.decrypt_block_mut(block);
        }
        plain.truncate(payload_len);

        let actual_hash: [u8; 32] = Sha256::digest(&plain).into();
        if actual_hash.as_slice() != expected_hash {
            return Err(MarkvaultError::Crypto(
                "decryption failed: hash mismatch".to_string(),
            ));
        }

        Ok(serde_json::from_slice(&plain)?)
    }
}

impl Vault for VaultContainer {
    fn set_kdf(&mut self, kdf: Kdf) -> Result<()> {
        self.kdf = kdf;
        Ok(())
    }

    fn set_version(&mut self, version: FormatVersion) -> Result<()> {
        self.version = version;
        Ok(())
    }

    fn root_group(&self) -> GroupId {
        0
    }

    fn add_group(&mut self, parent: GroupId, title: &str) -> Result<GroupId> {
        self.check_group(parent)?;
        self.groups.push(Group {
            title: title.to_string(),
            parent: Some(parent),
        });
        Ok(self.groups.len() - 1)
    }

    fn add_entry(&mut self, parent: GroupId) -> Result<EntryId> {
        self.check_group(parent)?;
        self.entries.push(Entry {
            parent,
            fields: Vec::new(),
        });
        Ok(self.entries.len() - 1)
    }

    fn set_field(&mut self, entry: EntryId, name: &str, value: &str) -> Result<()> {
        let entry = self.entries.get_mut(entry).ok_or_else(|| {
            MarkvaultError::InvalidInput(format!("unknown entry handle {entry}"))
        })?;
        match entry.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => entry.fields.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn serialize(&mut self) -> Result<Vec<u8>> {
        match self.kdf {
            Kdf::Argon2id => Err(MarkvaultError::UnsupportedKdf(
                "argon2 key derivation is not available in this build".to_string(),
            )),
            Kdf::AesKdf => self.encrypt(),
        }
    }
}

fn version_code(version: FormatVersion) -> u16 {
    match version {
        FormatVersion::V3 => 3,
        FormatVersion::V4 => 4,
    }
}

fn derive_key(passphrase: &str, salt: &[u8], rounds: u32) -> [u8; 32] {
    let salt_str = String::from_utf8_lossy(salt);
    let mut current = format!("{passphrase}{salt_str}").into_bytes();

    for _ in 0..rounds {
        current = Sha256::digest(&current).to_vec();
    }

    let mut key = [0u8; 32];
    key.copy_from_slice(&current);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated(passphrase: &str) -> VaultContainer {
        let mut vault = VaultContainer::new(passphrase);
        vault.set_kdf(Kdf::AesKdf).unwrap();
        vault.set_version(FormatVersion::V3).unwrap();
        let root = vault.root_group();
        let work = vault.add_group(root, "Work").unwrap();
        let entry = vault.add_entry(work).unwrap();
        vault.set_field(entry, "Title", "Rust").unwrap();
        vault.set_field(entry, "URL", "https://www.rust-lang.org/").unwrap();
        vault
    }

    #[test]
    fn test_round_trip() {
        let mut vault = populated("hunter2");
        let bytes = vault.serialize().unwrap();

        let payload = VaultContainer::decrypt(&bytes, "hunter2").unwrap();
        assert_eq!(payload.groups.len(), 2);
        assert_eq!(payload.groups[1].title, "Work");
        assert_eq!(payload.groups[1].parent, Some(0));
        assert_eq!(payload.entries.len(), 1);
        assert_eq!(payload.entries[0].field("Title"), Some("Rust"));
        assert_eq!(
            payload.entries[0].field("URL"),
            Some("https://www.rust-lang.org/")
        );
    }

    #[test]
    fn test_empty_passphrase_is_a_valid_credential() {
        let mut vault = populated("");
        let bytes = vault.serialize().unwrap();
        assert!(VaultContainer::decrypt(&bytes, "").is_ok());
    }

    #[test]
    fn test_wrong_passphrase_rejected() {
        let mut vault = populated("correct");
        let bytes = vault.serialize().unwrap();
        let err = VaultContainer::decrypt(&bytes, "wrong").unwrap_err();
        assert!(matches!(err, MarkvaultError::Crypto(_)));
    }

    #[test]
    fn test_default_kdf_is_unsupported() {
        // a fresh container asks for Argon2id, which this build cannot derive
        let mut vault = VaultContainer::new("pw");
        assert_eq!(vault.kdf(), Kdf::Argon2id);
        let err = vault.serialize().unwrap_err();
        assert!(err.is_unsupported_kdf());
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = VaultContainer::decrypt(b"not a container", "pw").unwrap_err();
        assert!(matches!(err, MarkvaultError::Crypto(_)));
    }

    /// Header-shaped buffer with the given version and rounds fields,
    /// zeroed salt/IV/hash/length and one ciphertext block.
    fn forged_header(version: u16, rounds: u32) -> Vec<u8> {
        let header_len = MAGIC.len() + 2 + 4 + SALT_SIZE + IV_SIZE + 32 + 8;
        let mut bytes = vec![0u8; header_len + 16];
        bytes[..4].copy_from_slice(MAGIC);
        bytes[4..6].copy_from_slice(&version.to_le_bytes());
        bytes[6..10].copy_from_slice(&rounds.to_le_bytes());
        bytes
    }

    #[test]
    fn test_zero_rounds_header_rejected() {
        let err = VaultContainer::decrypt(&forged_header(3, 0), "pw").unwrap_err();
        assert!(matches!(err, MarkvaultError::Crypto(_)));
    }

    #[test]
    fn test_excessive_rounds_header_rejected() {
        let err =
            VaultContainer::decrypt(&forged_header(3, MAX_ROUNDS + 1), "pw").unwrap_err();
        assert!(matches!(err, MarkvaultError::Crypto(_)));
    }

    #[test]
    fn test_unknown_version_header_rejected() {
        let err = VaultContainer::decrypt(&forged_header(99, 1), "pw").unwrap_err();
        assert!(matches!(err, MarkvaultError::Crypto(_)));
    }

    #[test]
    fn test_set_field_replaces_existing_value() {
        let mut vault = VaultContainer::new("pw");
        let entry = vault.add_entry(vault.root_group()).unwrap();
        vault.set_field(entry, "Title", "old").unwrap();
        vault.set_field(entry, "Title", "new").unwrap();
        assert_eq!(vault.entries[0].field("Title"), Some("new"));
        assert_eq!(vault.entries[0].fields.len(), 1);
    }

    #[test]
    fn test_unknown_parent_group_rejected() {
        let mut vault = VaultContainer::new("pw");
        assert!(vault.add_group(42, "nope").is_err());
        assert!(vault.add_entry(42).is_err());
    }
}
