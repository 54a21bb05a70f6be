#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::deep_merge_keep_arrays;

    #[test]
    fn nested_objects_merge() {
        let base = json!({ "desktop": { "mode": "floating", "min_width": 768 } });
        let overlay = json!({ "desktop": { "min_width": 1024 } });
        assert_eq!(
            deep_merge_keep_arrays(&base, &overlay),
            json!({ "desktop": { "mode": "floating", "min_width": 1024 } })
        );
    }

    #[test]
    fn arrays_are_replaced_not_concatenated() {
        let base = json!({ "routes": [ { "url": "/a" }, { "url": "/b" } ] });
        let overlay = json!({ "routes": [ { "url": "/c" } ] });
        assert_eq!(
            deep_merge_keep_arrays(&base, &overlay),
            json!({ "routes": [ { "url": "/c" } ] })
        );
    }

    #[test]
    fn null_removes_key() {
        let base = json!({ "haptic": true, "desktop": { "hidden": true, "mode": "docked" } });
        let overlay = json!({ "haptic": null, "desktop": { "hidden": null } });
        assert_eq!(
            deep_merge_keep_arrays(&base, &overlay),
            json!({ "desktop": { "mode": "docked" } })
        );
    }

    #[test]
    fn scalars_and_type_changes_replace() {
        let base = json!({ "a": { "b": 1 }, "c": "x" });
        let overlay = json!({ "a": 5, "c": { "d": true } });
        assert_eq!(
            deep_merge_keep_arrays(&base, &overlay),
            json!({ "a": 5, "c": { "d": true } })
        );
    }

    #[test]
    fn null_overlay_keeps_base() {
        let base = json!({ "a": 1 });
        assert_eq!(deep_merge_keep_arrays(&base, &json!(null)), base);
    }

    #[test]
    fn base_is_not_mutated() {
        let base = json!({ "a": { "b": 1 } });
        let _merged = deep_merge_keep_arrays(&base, &json!({ "a": { "c": 2 } }));
        assert_eq!(base, json!({ "a": { "b": 1 } }));
    }
}
