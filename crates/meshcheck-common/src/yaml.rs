//! YAML loading on top of yaml-rust2
//!
//! Documents are converted into `serde_json::Value` so typed deserialization
//! goes through serde_json for every resource kind.

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use yaml_rust2::{Yaml, YamlLoader};

use crate::{Error, Result};

/// Parse every document in a YAML stream.
///
/// Empty documents (a bare `---` or a comment-only section) are dropped so
/// callers only see real objects.
pub fn parse_yaml_multi(input: &str) -> Result<Vec<Value>> {
    let docs = YamlLoader::load_from_str(input).map_err(|e| Error::yaml(e.to_string()))?;
    let mut values = Vec::with_capacity(docs.len());
    for doc in docs {
        let value = to_json(doc)?;
        if !value.is_null() {
            values.push(value);
        }
    }
    Ok(values)
}

/// Parse a single YAML document. Empty input yields `Value::Null`.
pub fn parse_yaml(input: &str) -> Result<Value> {
    Ok(parse_yaml_multi(input)?
        .into_iter()
        .next()
        .unwrap_or(Value::Null))
}

/// Parse a single YAML document straight into a typed value.
pub fn from_yaml<T: DeserializeOwned>(input: &str) -> Result<T> {
    let value = parse_yaml(input)?;
    Ok(serde_json::from_value(value)?)
}

fn to_json(yaml: Yaml) -> Result<Value> {
    let value = match yaml {
        Yaml::Null => Value::Null,
        Yaml::Boolean(b) => Value::Bool(b),
        Yaml::Integer(i) => Value::Number(i.into()),
        Yaml::Real(raw) => real_to_json(&raw)?,
        Yaml::String(s) => Value::String(s),
        Yaml::Array(items) => Value::Array(
            items
                .into_iter()
                .map(to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        Yaml::Hash(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (k, v) in entries {
                map.insert(key_to_string(k)?, to_json(v)?);
            }
            Value::Object(map)
        }
        Yaml::Alias(_) => return Err(Error::yaml("YAML aliases are not supported")),
        Yaml::BadValue => return Err(Error::yaml("bad YAML value")),
    };
    Ok(value)
}

fn real_to_json(raw: &str) -> Result<Value> {
    let f: f64 = raw
        .parse()
        .map_err(|e: std::num::ParseFloatError| Error::yaml(format!("{}: {}", raw, e)))?;
    // NaN and infinities have no JSON form
    Ok(Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null))
}

// Label maps in routing objects routinely use unquoted numeric or boolean
// values as keys, so scalar keys are stringified rather than rejected.
fn key_to_string(key: Yaml) -> Result<String> {
    match key {
        Yaml::String(s) | Yaml::Real(s) => Ok(s),
        Yaml::Integer(i) => Ok(i.to_string()),
        Yaml::Boolean(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        _ => Err(Error::yaml("mapping keys must be scalars")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_manifest() {
        let yaml = r#"
apiVersion: networking.istio.io/v1beta1
kind: DestinationRule
metadata:
  name: reviews
  namespace: bookinfo
spec:
  host: reviews
  subsets:
  - name: v1
    labels:
      version: v1
"#;
        let value = parse_yaml(yaml).unwrap();
        assert_eq!(value["kind"], "DestinationRule");
        assert_eq!(value["metadata"]["namespace"], "bookinfo");
        assert_eq!(value["spec"]["subsets"][0]["labels"]["version"], "v1");
    }

    #[test]
    fn multi_document_stream_skips_empty_documents() {
        let yaml = "kind: A\n---\n---\n# only a comment\n---\nkind: B\n";
        let docs = parse_yaml_multi(yaml).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["kind"], "A");
        assert_eq!(docs[1]["kind"], "B");
    }

    #[test]
    fn empty_input_is_null() {
        assert_eq!(parse_yaml("").unwrap(), Value::Null);
        assert!(parse_yaml_multi("").unwrap().is_empty());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let err = parse_yaml("not: valid: yaml: {{").unwrap_err();
        assert!(matches!(err, Error::Yaml { .. }));
    }

    #[test]
    fn durations_and_weights_keep_their_types() {
        let value = parse_yaml("timeout: 0.5s\nweight: 25\nratio: 0.25").unwrap();
        assert_eq!(value["timeout"], "0.5s");
        assert_eq!(value["weight"], 25);
        assert!((value["ratio"].as_f64().unwrap() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn scalar_keys_are_stringified() {
        let value = parse_yaml("labels:\n  1: one\n  true: yes-value").unwrap();
        assert_eq!(value["labels"]["1"], "one");
        assert_eq!(value["labels"]["true"], "yes-value");
    }

    #[test]
    fn from_yaml_deserializes_typed_value() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Entry {
            hostname: String,
        }

        let entry: Entry = from_yaml("hostname: reviews.prod.svc.cluster.local").unwrap();
        assert_eq!(entry.hostname, "reviews.prod.svc.cluster.local");
    }
}
