//! Launch-plan resolution for the external connector.
//!
//! The core never opens sockets. It hands the connector an ordered plan:
//! establish the outermost prerequisite first, then tunnel each subsequent
//! step through it, ending with the target itself. Each step carries the
//! profile and its configured endpoint; when a step rides through a tunnel,
//! the connector substitutes the forwarded endpoint via the codec's
//! override parameters.

use serde::Serialize;

use crate::error::LaunchError;
use crate::profile::types::{Profile, ProfileCollection, ProfileId};

/// A connectable network endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    /// Hostname or IP address
    pub host: String,
    /// Resolved port (kind default applied when the profile left it unset)
    pub port: u16,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// One step of a launch plan: a profile and the endpoint to reach it at
#[derive(Debug, Clone, Serialize)]
pub struct LaunchStep {
    /// The profile to connect
    pub profile: Profile,
    /// Where to connect it
    pub endpoint: Endpoint,
}

/// Resolve the ordered launch plan for a persisted profile.
///
/// Returns the prerequisite chain as executable steps, outermost
/// prerequisite first, the target last.
///
/// # Errors
///
/// - [`LaunchError::UnknownProfile`] if `id` does not resolve.
/// - [`LaunchError::Chain`] if the prerequisite chain is cyclic or broken;
///   connecting is refused until the profile graph is fixed.
pub fn resolve_launch_plan(
    collection: &ProfileCollection,
    id: ProfileId,
) -> Result<Vec<LaunchStep>, LaunchError> {
    let target = collection
        .get_by_id(id)
        .ok_or(LaunchError::UnknownProfile { id })?;
    let chain = collection.chain(target.key)?;

    log::info!(
        "resolved launch plan for '{}': {} step(s)",
        target.name,
        chain.len()
    );
    Ok(chain
        .into_iter()
        .map(|profile| LaunchStep {
            endpoint: Endpoint {
                host: profile.host.clone(),
                port: profile.effective_port(),
            },
            profile: profile.clone(),
        })
        .collect())
}
