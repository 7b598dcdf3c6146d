//! Container configuration

use crate::cycle_detection::DEFAULT_MAX_RESOLUTION_DEPTH;
use serde::{Deserialize, Serialize};

/// Settings shared by a container and all of its children.
///
/// # Examples
///
/// ```
/// use reinhardt_ioc_core::ContainerConfig;
///
/// let config: ContainerConfig =
///     serde_json::from_str(r#"{ "implicit_empty_collections": true }"#).unwrap();
/// assert!(config.implicit_empty_collections);
/// assert_eq!(config.max_resolution_depth, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
	/// Resolve an unbound `Vec<T>` or `HashMap<K, V>` to an empty collection
	/// instead of failing.
	pub implicit_empty_collections: bool,
	/// Deepest nesting of builds allowed on one thread.
	pub max_resolution_depth: usize,
	/// Emit a trace event for every resolution step.
	pub log_resolution: bool,
}

impl Default for ContainerConfig {
	fn default() -> Self {
		Self {
			implicit_empty_collections: false,
			max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
			log_resolution: false,
		}
	}
}
