//! # Proof Backend Policy
//!
//! Decides whether proofs from a given backend may be treated as
//! authoritative.
//!
//! The mock backend (`MockProofSystem`) attests results with a SHA-256
//! commitment. Anyone who knows the public statement can produce one, so a
//! verifier running in production must refuse it outright. The
//! [`DynamicProofBinder`](crate::dynamic::DynamicProofBinder) consults its
//! [`ProofPolicy`] before every required sub-proof check.
//!
//! ## Configuration
//!
//! The mode is taken from, in order:
//! 1. Explicit construction (`ProofPolicy::new`, `production`, `development`)
//! 2. The `SIDELOAD_PROOF_POLICY` environment variable (`production` or `development`)
//! 3. The build profile: release builds default to `Production`, debug
//!    builds to `Development`

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sideload_core::ZkError;

/// Environment variable read by [`ProofPolicy::from_environment`].
pub const POLICY_ENV_VAR: &str = "SIDELOAD_PROOF_POLICY";

/// Errors from proof policy enforcement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Mock proof rejected in production mode.
    #[error("mock proof rejected: production mode requires a real proof backend ({backend})")]
    MockProofRejected {
        /// The proof backend that was rejected.
        backend: String,
    },
}

impl From<PolicyError> for ZkError {
    fn from(err: PolicyError) -> Self {
        ZkError::PolicyRejected(err.to_string())
    }
}

/// The type of proof backend that produced a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofBackend {
    /// Deterministic SHA-256 commitment. No cryptographic soundness.
    Mock,
}

impl ProofBackend {
    /// Whether this backend provides real cryptographic security.
    pub fn is_real(self) -> bool {
        match self {
            ProofBackend::Mock => false,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            ProofBackend::Mock => "mock-sha256",
        }
    }
}

impl std::fmt::Display for ProofBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Proof policy mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    /// Reject mock proofs unconditionally.
    Production,
    /// Accept mock proofs (tests and local runs only).
    Development,
}

impl std::str::FromStr for PolicyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(PolicyMode::Production),
            "development" | "dev" => Ok(PolicyMode::Development),
            other => Err(format!(
                "unknown proof policy '{other}', expected 'production' or 'development'"
            )),
        }
    }
}

/// Runtime proof policy.
///
/// ```rust
/// use sideload_zkp::policy::{ProofBackend, ProofPolicy};
///
/// let policy = ProofPolicy::production();
/// assert!(policy.validate(ProofBackend::Mock).is_err());
/// assert!(ProofPolicy::development().validate(ProofBackend::Mock).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofPolicy {
    mode: PolicyMode,
}

impl ProofPolicy {
    pub fn new(mode: PolicyMode) -> Self {
        Self { mode }
    }

    /// Rejects mock proofs.
    pub fn production() -> Self {
        Self {
            mode: PolicyMode::Production,
        }
    }

    /// Accepts mock proofs.
    pub fn development() -> Self {
        Self {
            mode: PolicyMode::Development,
        }
    }

    /// Policy from `SIDELOAD_PROOF_POLICY`, falling back to the build
    /// profile when the variable is unset or unrecognised.
    pub fn from_environment() -> Self {
        if let Ok(val) = std::env::var(POLICY_ENV_VAR) {
            match val.parse::<PolicyMode>() {
                Ok(mode) => return Self::new(mode),
                Err(reason) => tracing::warn!(env = POLICY_ENV_VAR, %reason, "ignoring proof policy override"),
            }
        }

        if cfg!(not(debug_assertions)) {
            Self::production()
        } else {
            Self::development()
        }
    }

    /// Whether proofs from `backend` are accepted under this policy.
    pub fn validate(&self, backend: ProofBackend) -> Result<(), PolicyError> {
        match self.mode {
            PolicyMode::Production if !backend.is_real() => Err(PolicyError::MockProofRejected {
                backend: backend.name().to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub fn mode(&self) -> PolicyMode {
        self.mode
    }
}

impl Default for ProofPolicy {
    fn default() -> Self {
        Self::from_environment()
    }
}
