use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::{request::Body, HttpError};

/// Serializes a JSON body. Unit and `null` mean "no body".
pub(crate) fn encode_json_body<T: Serialize + ?Sized>(data: &T) -> Result<Body, HttpError> {
    let value = serde_json::to_value(data)
        .map_err(|err| HttpError::Encode(format!("invalid request body: {err}")))?;
    Ok(match value {
        JsonValue::Null => Body::Empty,
        value => Body::Json(value),
    })
}

/// Flattens query parameters into ordered key/value pairs.
///
/// Accepts unit, `null`, or a flat object. Arrays repeat the key; `null`
/// fields are skipped.
pub(crate) fn encode_query<T: Serialize + ?Sized>(
    params: &T,
) -> Result<Vec<(String, String)>, HttpError> {
    let value = serde_json::to_value(params)
        .map_err(|err| HttpError::Encode(format!("invalid query parameters: {err}")))?;

    let object = match value {
        JsonValue::Null => return Ok(Vec::new()),
        JsonValue::Object(object) => object,
        other => {
            return Err(HttpError::Encode(format!(
                "query parameters must be an object, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut pairs = Vec::with_capacity(object.len());
    for (key, value) in object {
        match value {
            JsonValue::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_to_string(&key, item)? {
                        pairs.push((key.clone(), text));
                    }
                }
            }
            value => {
                if let Some(text) = scalar_to_string(&key, value)? {
                    pairs.push((key, text));
                }
            }
        }
    }
    Ok(pairs)
}

fn scalar_to_string(key: &str, value: JsonValue) -> Result<Option<String>, HttpError> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::String(text) => Ok(Some(text)),
        JsonValue::Bool(flag) => Ok(Some(flag.to_string())),
        JsonValue::Number(number) => Ok(Some(number.to_string())),
        other => Err(HttpError::Encode(format!(
            "query parameter '{key}' must be a scalar, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Serialize;
    use serde_json::json;

    use super::{encode_json_body, encode_query};
    use crate::{request::Body, HttpError};

    #[derive(Serialize)]
    struct Filter {
        page: u32,
        active: bool,
        name: Option<String>,
        tags: Vec<&'static str>,
    }

    #[test]
    fn unit_means_no_query_and_no_body() {
        assert!(encode_query(&()).expect("unit query").is_empty());
        assert_eq!(encode_json_body(&()).expect("unit body"), Body::Empty);
    }

    #[test]
    fn struct_query_is_flattened() {
        let filter = Filter {
            page: 2,
            active: true,
            name: None,
            tags: vec!["a", "b"],
        };
        let pairs = encode_query(&filter).expect("query must encode");
        assert_eq!(
            pairs,
            vec![
                ("page".to_owned(), "2".to_owned()),
                ("active".to_owned(), "true".to_owned()),
                ("tags".to_owned(), "a".to_owned()),
                ("tags".to_owned(), "b".to_owned()),
            ]
        );
    }

    #[test]
    fn map_query_keeps_string_values() {
        let mut params = BTreeMap::new();
        params.insert("q", "kit");
        let pairs = encode_query(&params).expect("query must encode");
        assert_eq!(pairs, vec![("q".to_owned(), "kit".to_owned())]);
    }

    #[test]
    fn nested_query_values_are_rejected() {
        let err = encode_query(&json!({ "filter": { "a": 1 } })).expect_err("must reject");
        assert!(matches!(err, HttpError::Encode(message) if message.contains("filter")));
    }

    #[test]
    fn non_object_query_is_rejected() {
        let err = encode_query(&[1, 2]).expect_err("must reject");
        assert!(matches!(err, HttpError::Encode(message) if message.contains("array")));
    }

    #[test]
    fn json_body_keeps_value() {
        let body = encode_json_body(&json!({ "name": "Kit" })).expect("body must encode");
        assert_eq!(body, Body::Json(json!({ "name": "Kit" })));
    }
}
