//! Nested JSON field extraction.
//!
//! Upstream responses are navigated along fixed key paths. A missing key is a
//! protocol error ([`Error::BadJson`]) naming the path, which keeps it
//! distinguishable from transport failures.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Returns the value at `path` inside `value`.
///
/// Each segment is an object key. When the current value is an array the
/// segment is read as an index instead, so `["list", "0", "name"]` addresses
/// the first element's `name`.
///
/// # Errors
///
/// Returns [`Error::BadJson`] if any segment is absent.
pub fn extract<'a>(value: &'a Value, path: &[&str]) -> Result<&'a Value> {
    let mut current = value;

    for (depth, segment) in path.iter().enumerate() {
        let next = match current {
            Value::Object(map) => map.get(*segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };

        current = next.ok_or_else(|| missing(&path[..=depth]))?;
    }

    Ok(current)
}

/// Extracts the value at `path` and deserializes it into `T`.
///
/// # Errors
///
/// Returns [`Error::BadJson`] if the path is absent or the value has the
/// wrong type.
pub fn extract_as<T>(value: &Value, path: &[&str]) -> Result<T>
where
    T: DeserializeOwned,
{
    let leaf = extract(value, path)?;
    T::deserialize(leaf).map_err(|err| {
        Error::BadJson(format!("unexpected value at `{}`: {err}", dotted(path)))
    })
}

/// Extracts the array at `path`.
///
/// # Errors
///
/// Returns [`Error::BadJson`] if the path is absent or is not an array.
pub fn extract_array<'a>(value: &'a Value, path: &[&str]) -> Result<&'a [Value]> {
    extract(value, path)?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| Error::BadJson(format!("expected an array at `{}`", dotted(path))))
}

/// Extracts the value at `path` and reads it as a flag.
///
/// Upstream flags are loosely typed, so JSON truthiness applies: `false`,
/// `null`, zero, the empty string and empty containers are false.
///
/// # Errors
///
/// Returns [`Error::BadJson`] if the path is absent.
pub fn extract_flag(value: &Value, path: &[&str]) -> Result<bool> {
    Ok(match extract(value, path)? {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    })
}

fn missing(path: &[&str]) -> Error {
    Error::BadJson(format!("missing `{}`", dotted(path)))
}

fn dotted(path: &[&str]) -> String {
    path.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "data": { "interval_generation_data": "2024_01_01_00_00" },
            "controlCenter": { "alertDeploymentId": null },
            "_embedded": {
                "deployedAlertResourceList": [
                    { "data": [ { "bannerTitle": "Storm" } ] }
                ]
            }
        })
    }

    #[test]
    fn test_extract_nested_key() {
        let value = sample();
        let id = extract(&value, &["data", "interval_generation_data"]).unwrap();
        assert_eq!(id, &json!("2024_01_01_00_00"));
    }

    #[test]
    fn test_extract_through_arrays() {
        let value = sample();
        let title = extract(
            &value,
            &["_embedded", "deployedAlertResourceList", "0", "data", "0", "bannerTitle"],
        )
        .unwrap();
        assert_eq!(title, "Storm");
    }

    #[test]
    fn test_extract_present_null_is_not_missing() {
        let value = sample();
        let id = extract(&value, &["controlCenter", "alertDeploymentId"]).unwrap();
        assert!(id.is_null());
    }

    #[test]
    fn test_missing_key_names_the_path() {
        let value = sample();
        let err = extract(&value, &["file_data", "areas"]).unwrap_err();
        assert_eq!(err, Error::BadJson("missing `file_data`".to_string()));

        let err = extract(&value, &["data", "nope", "deeper"]).unwrap_err();
        assert_eq!(err, Error::BadJson("missing `data.nope`".to_string()));
    }

    #[test]
    fn test_out_of_range_index_is_missing() {
        let value = json!({ "list": [] });
        let err = extract(&value, &["list", "0"]).unwrap_err();
        assert!(matches!(err, Error::BadJson(_)));
    }

    #[test]
    fn test_descending_into_scalar_is_missing() {
        let value = json!({ "data": 5 });
        assert!(extract(&value, &["data", "x"]).is_err());
    }

    #[test]
    fn test_empty_path_returns_root() {
        let value = json!({ "a": 1 });
        assert_eq!(extract(&value, &[]).unwrap(), &value);
    }

    #[test]
    fn test_extract_as_typed_leaf() {
        let value = json!({ "cust_a": { "val": 42 }, "flag": true });
        let count: u64 = extract_as(&value, &["cust_a", "val"]).unwrap();
        assert_eq!(count, 42);
        assert!(extract_as::<bool>(&value, &["flag"]).unwrap());
    }

    #[test]
    fn test_extract_as_wrong_type_is_bad_json() {
        let value = json!({ "cust_a": { "val": "many" } });
        let err = extract_as::<u64>(&value, &["cust_a", "val"]).unwrap_err();
        assert!(matches!(err, Error::BadJson(ref msg) if msg.contains("cust_a.val")));
    }

    #[test]
    fn test_extract_flag_truthiness() {
        let value = json!({
            "t": true, "f": false, "null": null,
            "one": 1, "zero": 0, "text": "yes", "empty": "",
            "list": [0], "none": [], "obj": { "a": 1 }, "blank": {}
        });
        for key in ["t", "one", "text", "list", "obj"] {
            assert!(extract_flag(&value, &[key]).unwrap(), "{key} should be true");
        }
        for key in ["f", "null", "zero", "empty", "none", "blank"] {
            assert!(!extract_flag(&value, &[key]).unwrap(), "{key} should be false");
        }
        assert!(matches!(
            extract_flag(&value, &["absent"]),
            Err(Error::BadJson(_))
        ));
    }

    #[test]
    fn test_extract_array() {
        let value = json!({ "file_data": { "areas": [1, 2], "totals": {} } });
        assert_eq!(extract_array(&value, &["file_data", "areas"]).unwrap().len(), 2);
        assert!(extract_array(&value, &["file_data", "totals"]).is_err());
    }
}
