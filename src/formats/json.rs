//! JSON front-end.

use serde_json::Value;

use crate::Error;

pub fn parse(input: &str, name: &str) -> Result<Value, Error> {
    serde_json::from_str::<Value>(input)
        .map_err(|e| Error::parse_error(name, "invalid JSON", Some(Box::new(e))))
}
