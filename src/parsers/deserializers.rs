use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Custom deserializer for notebook text fields that accepts either a string
/// or an array of strings (nbformat stores multi-line text both ways)
pub fn deserialize_multiline_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    multiline_text(&value).map_err(Error::custom)
}

/// Join a string or array-of-strings value into one string
pub fn multiline_text(value: &Value) -> Result<String, String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Array(parts) => {
            let mut text = String::new();
            for part in parts {
                match part {
                    Value::String(s) => text.push_str(s),
                    other => return Err(format!("expected string in text array, found {}", other)),
                }
            }
            Ok(text)
        }
        other => Err(format!("text must be a string or an array of strings, found {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Deserialize)]
    struct Cell {
        #[serde(default, deserialize_with = "deserialize_multiline_text")]
        source: String,
    }

    #[test]
    fn test_source_as_string() {
        let cell: Cell = serde_json::from_str(r##"{"source": "# Tabu GRASP\nbody"}"##).unwrap();
        assert_eq!(cell.source, "# Tabu GRASP\nbody");
    }

    #[test]
    fn test_source_as_array() {
        let cell: Cell = serde_json::from_str(r##"{"source": ["# Tabu GRASP\n", "body"]}"##).unwrap();
        assert_eq!(cell.source, "# Tabu GRASP\nbody");
    }

    #[test]
    fn test_source_missing_defaults_to_empty() {
        let cell: Cell = serde_json::from_str("{}").unwrap();
        assert!(cell.source.is_empty());
    }

    #[test]
    fn test_source_wrong_type_rejected() {
        assert!(serde_json::from_str::<Cell>(r#"{"source": 42}"#).is_err());
        assert!(serde_json::from_str::<Cell>(r#"{"source": ["a", 1]}"#).is_err());
    }

    #[test]
    fn test_multiline_text_null() {
        assert_eq!(multiline_text(&json!(null)).unwrap(), "");
    }
}
