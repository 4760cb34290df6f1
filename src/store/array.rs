// Value-based array mutation shared by every backend.

use serde_json::{Map, Value};

use super::{DocRef, StoreError};

/// Run `f` against the array stored under `field`, creating it when absent.
pub fn with_array<T>(
    doc: &DocRef,
    data: &mut Map<String, Value>,
    field: &str,
    f: impl FnOnce(&mut Vec<Value>) -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    let slot = data
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));

    match slot {
        Value::Array(items) => f(items),
        _ => Err(StoreError::NotAnArray {
            doc: doc.clone(),
            field: field.to_string(),
        }),
    }
}

/// Append unless an equal element exists. Returns whether the array changed.
pub fn union(items: &mut Vec<Value>, value: Value) -> bool {
    if items.contains(&value) {
        return false;
    }
    items.push(value);
    true
}

/// Drop every element equal to `value`. Returns how many were removed.
pub fn remove(items: &mut Vec<Value>, value: &Value) -> usize {
    let before = items.len();
    items.retain(|item| item != value);
    before - items.len()
}

/// Replace the first element equal to `old` in place. Returns false when absent.
pub fn replace(items: &mut [Value], old: &Value, new: Value) -> bool {
    match items.iter().position(|item| item == old) {
        Some(pos) => {
            items[pos] = new;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn union_skips_equal_values() {
        let mut items = vec![json!({"id": "a"})];
        assert!(!union(&mut items, json!({"id": "a"})));
        assert!(union(&mut items, json!({"id": "b"})));
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn remove_requires_exact_match() {
        let mut items = vec![json!({"id": "a", "name": "x"}), json!({"id": "b"})];
        assert_eq!(remove(&mut items, &json!({"id": "a"})), 0);
        assert_eq!(remove(&mut items, &json!({"id": "a", "name": "x"})), 1);
        assert_eq!(items, vec![json!({"id": "b"})]);
    }

    #[test]
    fn replace_keeps_position() {
        let mut items = vec![json!(1), json!(2), json!(3)];
        assert!(replace(&mut items, &json!(2), json!(20)));
        assert_eq!(items, vec![json!(1), json!(20), json!(3)]);
        assert!(!replace(&mut items, &json!(2), json!(200)));
    }

    #[test]
    fn with_array_rejects_scalar_fields() {
        let doc = DocRef::new("portfolio", "skills");
        let mut data = Map::new();
        data.insert("categories".into(), json!("oops"));
        let err = with_array(&doc, &mut data, "categories", |_| Ok(())).unwrap_err();
        assert!(matches!(err, StoreError::NotAnArray { .. }));
    }
}
