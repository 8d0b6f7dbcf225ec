//! Address component value object.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One level of a place's address hierarchy (street, city, country, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    /// Semantic tags such as `country` or `locality`.
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    pub fn has_type(&self, kind: &str) -> bool {
        self.types.iter().any(|candidate| candidate == kind)
    }

    /// Store wire form.
    pub fn to_value(&self) -> Value {
        json!({
            "long_name": self.long_name,
            "short_name": self.short_name,
            "types": self.types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::AddressComponent;
    use serde_json::json;

    #[test]
    fn wire_form_carries_every_field() {
        let component = AddressComponent {
            long_name: "United States".to_string(),
            short_name: "US".to_string(),
            types: vec!["country".to_string(), "political".to_string()],
        };
        assert_eq!(
            component.to_value(),
            json!({
                "long_name": "United States",
                "short_name": "US",
                "types": ["country", "political"],
            })
        );
    }
}
