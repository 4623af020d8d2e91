//! Deep merge for layered YAML configuration.
//!
//! `.kiln/config.local.yml` is laid over `.kiln/config.yml` before the
//! result is deserialized.
//!
//! # Merge Rules
//!
//! - Mappings are merged recursively
//! - Sequences are replaced entirely
//! - `null` in the overlay deletes the key from the base
//! - Scalars in the overlay replace the base

use serde_yaml::Value;

/// Deep merge `overlay` onto `base`, returning a new value.
///
/// # Arguments
///
/// * `base` - The lower-precedence layer, usually `.kiln/config.yml`
/// * `overlay` - The higher-precedence layer, usually `.kiln/config.local.yml`
///
/// # Returns
///
/// A new value; neither input is modified.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    // `key: ~` in the overlay drops the base entry
                    result.remove(key);
                } else if let Some(base_value) = base_map.get(key) {
                    result.insert(key.clone(), deep_merge(base_value, overlay_value));
                } else {
                    result.insert(key.clone(), overlay_value.clone());
                }
            }

            Value::Mapping(result)
        }
        // Sequences and scalars replace wholesale
        (_, overlay) => overlay.clone(),
    }
}

/// Merge layers in order; later layers win.
///
/// # Arguments
///
/// * `layers` - Parsed config files, lowest precedence first
///
/// # Returns
///
/// The merged mapping, or an empty mapping when `layers` is empty.
pub fn merge_configs(layers: &[Value]) -> Value {
    layers
        .iter()
        .fold(Value::Mapping(Default::default()), |acc, layer| {
            deep_merge(&acc, layer)
        })
}
