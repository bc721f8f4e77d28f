// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON merge-patch (RFC 7386) used for entity record updates.

use serde_json::Value;

/// Applies `patch` to `target` in place.
///
/// Object members in the patch replace or recurse into the matching target
/// member, `null` members remove the key, and every key absent from the patch
/// is left untouched. A non-object patch replaces the target wholesale.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };

    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }

    if let Value::Object(target_map) = target {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.remove(key);
            } else {
                merge_patch(
                    target_map.entry(key.clone()).or_insert(Value::Null),
                    value,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn adds_and_replaces_top_level_fields() {
        let mut record = json!({"title": "Opening", "asset_url": "old"});
        merge_patch(&mut record, &json!({"asset_url": "new", "model_used": "veo-3"}));
        assert_eq!(
            record,
            json!({"title": "Opening", "asset_url": "new", "model_used": "veo-3"})
        );
    }

    #[test]
    fn null_removes_key() {
        let mut record = json!({"a": 1, "b": 2});
        merge_patch(&mut record, &json!({"b": null}));
        assert_eq!(record, json!({"a": 1}));
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let mut record = json!({"meta": {"x": 1, "y": 2}});
        merge_patch(&mut record, &json!({"meta": {"y": 3}}));
        assert_eq!(record, json!({"meta": {"x": 1, "y": 3}}));
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let patch = json!({"asset_url": "u", "model_used": "m"});
        let mut once = json!({"keep": true});
        merge_patch(&mut once, &patch);
        let mut twice = once.clone();
        merge_patch(&mut twice, &patch);
        assert_eq!(once, twice);
    }

    proptest! {
        #[test]
        fn unrelated_fields_survive(
            fields in proptest::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..8),
            url in "[a-z/]{1,20}",
        ) {
            let mut record = serde_json::Map::new();
            for (k, v) in &fields {
                record.insert(format!("x_{k}"), json!(v));
            }
            let mut record = Value::Object(record);
            merge_patch(&mut record, &json!({"asset_url": url}));

            for (k, v) in &fields {
                prop_assert_eq!(&record[format!("x_{k}")], &json!(v));
            }
            prop_assert_eq!(&record["asset_url"], &json!(url));
        }
    }
}
