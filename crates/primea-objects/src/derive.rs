//! Content-addressed actor ids.
//!
//! An actor's id is derived from its parent's id and the nonce the parent
//! used to create it:
//!
//! ```text
//! id = SHA-256(cbor([nonce, parent_id_bytes | null]))[..20]
//! ```
//!
//! The root of a path has no parent and hashes an explicit CBOR null. A
//! full path is folded left to right, so `[0, 1, 0]` names the first child
//! of the second child of the first root actor.

use bytes::Bytes;
use ciborium::value::Value as CborValue;
use sha2::{Digest, Sha256};

use crate::cbor::canonical_bytes;
use crate::error::{ObjectError, Result};
use crate::id::Id;

impl Id {
    /// Derive the id of the child created by `parent` with `nonce`.
    pub fn derive_child(parent: Option<&Id>, nonce: u64) -> Id {
        let parent = match parent {
            Some(id) => CborValue::Bytes(id.as_bytes().to_vec()),
            None => CborValue::Null,
        };
        let preimage = canonical_bytes(&CborValue::Array(vec![
            CborValue::Integer(nonce.into()),
            parent,
        ]));
        let digest = Sha256::digest(&preimage);
        Id::new(Bytes::copy_from_slice(&digest[..Id::LEN]))
    }
}

/// Derive the id of the actor at `path`.
///
/// Fails with [`ObjectError::EmptyPath`] for an empty path; there is no
/// root sentinel id.
pub fn actor_path_to_id(path: &[u64]) -> Result<Id> {
    let (root, rest) = path.split_first().ok_or(ObjectError::EmptyPath)?;
    let id = rest
        .iter()
        .fold(Id::derive_child(None, *root), |parent, nonce| {
            Id::derive_child(Some(&parent), *nonce)
        });
    tracing::trace!(depth = path.len(), id = %id, "derived actor id");
    Ok(id)
}
