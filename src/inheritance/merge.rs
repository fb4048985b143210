use serde_json::Value;

use super::AttributeMap;

/// Recursively merge `overlay` into `base`
///
/// Objects present on both sides are merged key by key; any other value in
/// `overlay` (scalars, lists, or an object replacing a scalar) overwrites the
/// value in `base` wholesale.
pub fn deep_merge(base: &mut AttributeMap, overlay: &AttributeMap) {
    for (key, incoming) in overlay {
        if let (Some(Value::Object(existing)), Value::Object(incoming)) =
            (base.get_mut(key), incoming)
        {
            deep_merge(existing, incoming);
            continue;
        }
        base.insert(key.clone(), incoming.clone());
    }
}
