//! Overlay a card configuration onto a dashboard-level template.

use serde_json::Value;

/// Deep-merge `overlay` onto `base`.
///
/// Objects merge recursively; arrays and scalars in `overlay` replace the
/// value in `base`; a `null` inside an overlay object removes the key. A
/// top-level `null` overlay leaves `base` unchanged.
pub fn deep_merge_keep_arrays(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (_, Value::Null) => base.clone(),
        (Value::Object(b), Value::Object(o)) => {
            let mut out = b.clone();
            for (key, value) in o {
                match value {
                    Value::Null => {
                        out.remove(key);
                    }
                    Value::Object(_) => {
                        let merged = match out.get(key) {
                            Some(existing @ Value::Object(_)) => {
                                deep_merge_keep_arrays(existing, value)
                            }
                            _ => value.clone(),
                        };
                        out.insert(key.clone(), merged);
                    }
                    _ => {
                        out.insert(key.clone(), value.clone());
                    }
                }
            }
            Value::Object(out)
        }
        _ => overlay.clone(),
    }
}
