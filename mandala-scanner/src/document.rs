use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A provider's self-description, as published at its mantela address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Mantela {
    pub about_me: AboutMe,
    #[serde(default)]
    pub extensions: Vec<ExtensionEntry>,
    #[serde(default)]
    pub providers: Vec<ProviderEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AboutMe {
    pub identifier: String,
    pub name: String,
}

/// A capability the provider offers, reachable by dialing `extension`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtensionEntry {
    pub name: String,
    pub extension: String,
}

/// A peer the provider routes to through `prefix`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderEntry {
    pub identifier: String,
    pub name: String,
    pub prefix: String,
    pub mantela: String,
}

impl Mantela {
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let body = r#"{
            "version": "0.0.0",
            "aboutMe": { "identifier": "tokyo", "name": "Tokyo Exchange", "preferredPrefix": "03" },
            "extensions": [
                { "name": "Reception", "extension": "100", "type": "phone" }
            ],
            "providers": [
                { "identifier": "osaka", "name": "Osaka", "prefix": "6", "mantela": "https://osaka.example/mantela.json" }
            ]
        }"#;

        let doc = Mantela::from_json(body).unwrap();
        assert_eq!(doc.about_me.identifier, "tokyo");
        assert_eq!(doc.about_me.name, "Tokyo Exchange");
        assert_eq!(doc.extensions.len(), 1);
        assert_eq!(doc.extensions[0].extension, "100");
        assert_eq!(doc.providers[0].mantela, "https://osaka.example/mantela.json");
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let doc = Mantela::from_json(r#"{ "aboutMe": { "identifier": "a", "name": "A" } }"#).unwrap();
        assert!(doc.extensions.is_empty());
        assert!(doc.providers.is_empty());
    }

    #[test]
    fn test_missing_about_me_is_parse_error() {
        let err = Mantela::from_json(r#"{ "extensions": [] }"#).unwrap_err();
        assert!(err.is_parse_failure());
    }

    #[test]
    fn test_malformed_extension_is_parse_error() {
        let body = r#"{ "aboutMe": { "identifier": "a", "name": "A" }, "extensions": [ { "name": "x" } ] }"#;
        assert!(Mantela::from_json(body).unwrap_err().is_parse_failure());
    }
}
