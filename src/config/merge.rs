//! Tier merging for YAML configuration.
//!
//! Objects merge key by key; every other value in a higher tier replaces the
//! lower one. A `null` in a higher tier means "not specified".

use serde_json::Value;

/// Merge `overlay` on top of `base`.
///
/// ```
/// use serde_json::json;
/// use goal_tracker::config::deep_merge;
///
/// let base = json!({"server": {"host": "127.0.0.1", "port": 8000}});
/// let overlay = json!({"server": {"port": 9000}});
/// assert_eq!(
///     deep_merge(base, overlay),
///     json!({"server": {"host": "127.0.0.1", "port": 9000}})
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Fold tiers lowest-priority first.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_server_keys_merge() {
        let base = json!({"server": {"host": "127.0.0.1", "port": 8000}, "seed": {"on_startup": false}});
        let overlay = json!({"server": {"port": 8080}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({"server": {"host": "127.0.0.1", "port": 8080}, "seed": {"on_startup": false}})
        );
    }

    #[test]
    fn test_null_keeps_lower_tier() {
        let base = json!({"cors": {"allowed_origin": "http://localhost:3000"}});
        let overlay = json!({"cors": {"allowed_origin": null}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({"cors": {"allowed_origin": "http://localhost:3000"}})
        );
    }

    #[test]
    fn test_scalar_replaces_object() {
        let base = json!({"server": {"port": 8000}});
        let overlay = json!({"server": "disabled"});
        assert_eq!(deep_merge(base, overlay), json!({"server": "disabled"}));
    }

    #[test]
    fn test_merge_all_later_tiers_win() {
        let tiers = vec![
            json!({"server": {"port": 8000, "host": "127.0.0.1"}}),
            json!({"server": {"port": 8001}}),
            json!({"server": {"port": 8002}, "seed": {"on_startup": true}}),
        ];
        assert_eq!(
            deep_merge_all(tiers),
            json!({"server": {"port": 8002, "host": "127.0.0.1"}, "seed": {"on_startup": true}})
        );
    }
}
