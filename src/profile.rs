//! Client identity profile rotation
//!
//! Age-restriction bypass works by retrying a download under a different
//! client identity. The rotator tracks which profile is active and advances
//! cyclically when the retry policy asks for a new identity.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Named client identity used to vary how requests appear to the remote provider
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientProfile {
    /// Creator-app identity, the first tried for age-restriction bypass
    AndroidCreator,
    /// Stock mobile-app identity
    Android,
    /// Browser identity
    Web,
}

impl ClientProfile {
    /// The profile name as the remote provider expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientProfile::AndroidCreator => "ANDROID_CREATOR",
            ClientProfile::Android => "ANDROID",
            ClientProfile::Web => "WEB",
        }
    }
}

impl std::fmt::Display for ClientProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The fixed rotation order for bypass attempts
const ROTATION: [ClientProfile; 3] = [
    ClientProfile::AndroidCreator,
    ClientProfile::Android,
    ClientProfile::Web,
];

/// Cyclic rotator over the client identity profiles
///
/// Shared across all concurrently running jobs in a batch: an age-restriction
/// failure in any job advances the identity every subsequent attempt sees.
/// Clones share the same underlying index, and `advance` is atomic with
/// respect to concurrent callers.
///
/// # Examples
///
/// ```
/// use music_dl::profile::{ClientProfile, ClientProfileRotator};
///
/// let rotator = ClientProfileRotator::new();
/// assert_eq!(rotator.current(), ClientProfile::AndroidCreator);
///
/// rotator.advance();
/// assert_eq!(rotator.current(), ClientProfile::Android);
/// ```
#[derive(Clone)]
pub struct ClientProfileRotator {
    /// Monotonic advance counter; the active profile is `counter % 3`
    index: Arc<AtomicUsize>,
}

impl ClientProfileRotator {
    /// Create a new rotator starting at the first profile
    #[must_use]
    pub fn new() -> Self {
        Self {
            index: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The currently active profile
    pub fn current(&self) -> ClientProfile {
        ROTATION[self.index.load(Ordering::Relaxed) % ROTATION.len()]
    }

    /// Move to the next profile, wrapping to the first after the last
    ///
    /// Returns the newly active profile.
    pub fn advance(&self) -> ClientProfile {
        let next = self.index.fetch_add(1, Ordering::SeqCst) + 1;
        ROTATION[next % ROTATION.len()]
    }
}

impl Default for ClientProfileRotator {
    fn default() -> Self {
        Self::new()
    }
}
