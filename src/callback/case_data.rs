//! Path helpers over the loosely-typed case-data map.
//!
//! Case data arrives as an arbitrary JSON object. Handlers address nested
//! fields by path segments, e.g. `["workBasketFields", "hearingDate"]`.

use serde_json::{Map, Value};

use crate::constants::YES;

/// Key-value case-data snapshot
pub type CaseData = Map<String, Value>;

/// Look up a nested value
pub fn get_path<'a>(data: &'a CaseData, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = data.get(*first)?;
    for segment in rest {
        current = current.as_object()?.get(*segment)?;
    }
    Some(current)
}

/// Look up a nested string, treating empty strings as absent
pub fn str_at<'a>(data: &'a CaseData, path: &[&str]) -> Option<&'a str> {
    get_path(data, path)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Whether a nested field holds the platform "Yes" flag
pub fn is_yes(data: &CaseData, path: &[&str]) -> bool {
    str_at(data, path).is_some_and(|s| s.eq_ignore_ascii_case(YES))
}

/// Set a nested value, creating (or replacing non-object) intermediate nodes
pub fn set_path(data: &mut CaseData, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = data;
    for segment in parents {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = match entry.as_object_mut() {
            Some(map) => map,
            None => return,
        };
    }
    current.insert(last.to_string(), value);
}

/// Remove a nested value, returning it if it existed
pub fn remove_path(data: &mut CaseData, path: &[&str]) -> Option<Value> {
    let (last, parents) = path.split_last()?;
    let mut current = data;
    for segment in parents {
        current = current.get_mut(*segment)?.as_object_mut()?;
    }
    current.remove(*last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> CaseData {
        json!({
            "workBasketFields": { "hearingDate": "2026-03-01", "hearingEpimsId": "" },
            "ignoreCallbackWarnings": "Yes",
            "dwpState": null
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_nested_lookup() {
        let data = sample();
        assert_eq!(
            str_at(&data, &["workBasketFields", "hearingDate"]),
            Some("2026-03-01")
        );
        assert_eq!(str_at(&data, &["workBasketFields", "hearingEpimsId"]), None);
        assert_eq!(str_at(&data, &["dwpState"]), None);
        assert_eq!(get_path(&data, &[]), None);
        assert!(is_yes(&data, &["ignoreCallbackWarnings"]));
        assert!(!is_yes(&data, &["missing"]));
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut data = sample();
        set_path(&mut data, &["adjournment", "previewDocument"], json!({"url": "x"}));
        set_path(&mut data, &["dwpState", "inner"], json!(1));
        assert_eq!(
            get_path(&data, &["adjournment", "previewDocument", "url"]),
            Some(&json!("x"))
        );
        assert_eq!(get_path(&data, &["dwpState", "inner"]), Some(&json!(1)));
    }

    #[test]
    fn test_remove_path() {
        let mut data = sample();
        assert_eq!(
            remove_path(&mut data, &["workBasketFields", "hearingDate"]),
            Some(json!("2026-03-01"))
        );
        assert_eq!(remove_path(&mut data, &["workBasketFields", "hearingDate"]), None);
        assert_eq!(remove_path(&mut data, &["nope", "deeper"]), None);
    }
}
