//! YAML front-end backed by `serde_yaml`.

use serde_json::Value;

use crate::Error;

/// Parses a YAML document straight into the generic tree.
///
/// Mapping keys must be strings; YAML 1.2 reads `no`, `on` and friends as
/// strings already, so locale codes such as `no` survive.
pub fn parse(input: &str, name: &str) -> Result<Value, Error> {
    serde_yaml::from_str::<Value>(input)
        .map_err(|e| Error::parse_error(name, "invalid YAML", Some(Box::new(e))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_key_order() {
        let value = parse("zeta: 1\nalpha: 2\nmid: 3\n", "order.yaml").unwrap();
        let keys = value.as_object().unwrap().keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_norwegian_code_stays_a_string_key() {
        let value = parse("hello:\n  no: Hei\n  en: Hi\n", "no.yaml").unwrap();
        assert_eq!(value["hello"]["no"], "Hei");
    }

    #[test]
    fn test_syntax_error_is_document_parse() {
        let err = parse("a: [1, 2\n", "broken.yaml").unwrap_err();
        match err {
            Error::DocumentParse { path, source, .. } => {
                assert_eq!(path, "broken.yaml");
                assert!(source.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
