//! # Verification Keys
//!
//! A [`VerificationKey`] is the public artifact a backend produces when it
//! compiles a circuit. Registries only ever look at its
//! [`hash`](VerificationKey::hash); everything else in it is informational
//! but committed to by that hash.
//!
//! The blob is the JCS encoding of the backend tag plus the circuit
//! descriptor. The hash is `digest_to_field(blob)` and is cached at
//! construction. Two keys are equal iff their hashes are equal.
//!
//! ## Persistence
//!
//! Serialized as `{"data": <canonical blob>, "hash": <field element>}`.
//! Loading re-parses the blob, re-canonicalizes it, and recomputes the
//! hash. A blob that is not canonical or a hash that does not match is an
//! `Integrity` error.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use sideload_core::{digest_to_field, CanonicalBytes, FieldElement, ZkError, ZkResult};

use crate::capability::FeatureSet;
use crate::policy::ProofBackend;
use crate::traits::CircuitDescriptor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct KeyBody {
    backend: ProofBackend,
    circuit: CircuitDescriptor,
}

/// Compiled-circuit identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "KeyRepr", into = "KeyRepr")]
pub struct VerificationKey {
    body: KeyBody,
    data: CanonicalBytes,
    hash: FieldElement,
}

impl VerificationKey {
    pub(crate) fn new(backend: ProofBackend, circuit: CircuitDescriptor) -> ZkResult<Self> {
        let body = KeyBody { backend, circuit };
        let data = CanonicalBytes::new(&body)?;
        let hash = digest_to_field(&data);
        Ok(Self { body, data, hash })
    }

    /// Deterministic field hash of the key blob.
    pub fn hash(&self) -> FieldElement {
        self.hash
    }

    pub fn backend(&self) -> ProofBackend {
        self.body.backend
    }

    pub fn circuit(&self) -> &CircuitDescriptor {
        &self.body.circuit
    }

    pub fn name(&self) -> &str {
        &self.body.circuit.name
    }

    pub fn features(&self) -> FeatureSet {
        self.body.circuit.features
    }

    pub fn max_proofs_verified(&self) -> u8 {
        self.body.circuit.max_proofs_verified
    }

    /// The canonical key blob.
    pub fn data(&self) -> &[u8] {
        self.data.as_bytes()
    }
}

impl PartialEq for VerificationKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for VerificationKey {}

impl Hash for VerificationKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

#[derive(Serialize, Deserialize)]
struct KeyRepr {
    data: String,
    hash: FieldElement,
}

impl From<VerificationKey> for KeyRepr {
    fn from(key: VerificationKey) -> Self {
        Self {
            data: String::from_utf8_lossy(key.data.as_bytes()).into_owned(),
            hash: key.hash,
        }
    }
}

impl TryFrom<KeyRepr> for VerificationKey {
    type Error = ZkError;

    fn try_from(repr: KeyRepr) -> Result<Self, Self::Error> {
        let body: KeyBody = serde_json::from_str(&repr.data)
            .map_err(|e| ZkError::Integrity(format!("verification key blob: {e}")))?;
        let key = VerificationKey::new(body.backend, body.circuit)?;
        if key.data.as_bytes() != repr.data.as_bytes() {
            return Err(ZkError::Integrity(
                "verification key blob is not canonical".into(),
            ));
        }
        if key.hash != repr.hash {
            return Err(ZkError::Integrity(format!(
                "verification key hash mismatch: stored {}, computed {}",
                repr.hash, key.hash
            )));
        }
        Ok(key)
    }
}
