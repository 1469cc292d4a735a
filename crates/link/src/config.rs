use serde::Deserialize;

use crate::error::LinkError;
use crate::mapping::{CompareKind, Mapping, DEFAULT_PREFIX_LEN};
use crate::profile::Profile;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// A match profile written as TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    #[serde(default)]
    pub name: Option<String>,
    /// Shared prefix threshold; overrides every mapping's own length.
    #[serde(default)]
    pub prefix_len: Option<usize>,
    #[serde(rename = "mapping", default)]
    pub mappings: Vec<MappingConfig>,
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MappingConfig {
    pub key: String,
    #[serde(default)]
    pub master_key: Option<String>,
    #[serde(default)]
    pub compare: CompareKind,
    #[serde(default = "default_points")]
    pub points: u32,
    #[serde(default = "default_strip")]
    pub strip: bool,
}

fn default_points() -> u32 {
    1
}

fn default_strip() -> bool {
    true
}

impl MappingConfig {
    fn to_mapping(&self) -> Mapping {
        let mut mapping = Mapping::new(self.key.as_str(), self.compare)
            .with_points(self.points)
            .with_strip(self.strip);
        if let Some(master_key) = &self.master_key {
            mapping = mapping.with_master_key(master_key.as_str());
        }
        mapping
    }
}

// ---------------------------------------------------------------------------
// Parsing + validation
// ---------------------------------------------------------------------------

impl ProfileConfig {
    pub fn from_toml(input: &str) -> Result<Self, LinkError> {
        let config: ProfileConfig =
            toml::from_str(input).map_err(|e| LinkError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LinkError> {
        if self.mappings.is_empty() {
            return Err(LinkError::ConfigValidation(
                "profile must contain at least one [[mapping]]".to_string(),
            ));
        }

        if self.prefix_len == Some(0) {
            return Err(LinkError::ConfigValidation(
                "prefix_len must be at least 1".to_string(),
            ));
        }

        for (i, mapping) in self.mappings.iter().enumerate() {
            if mapping.key.trim().is_empty() {
                return Err(LinkError::ConfigValidation(format!(
                    "mapping #{} has an empty key",
                    i + 1
                )));
            }
            if mapping.master_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
                return Err(LinkError::ConfigValidation(format!(
                    "mapping #{} ('{}') has an empty master_key",
                    i + 1,
                    mapping.key
                )));
            }
        }

        Ok(())
    }

    pub fn into_profile(self) -> Profile {
        let mappings = self.mappings.iter().map(MappingConfig::to_mapping).collect();
        Profile::new(mappings).with_prefix_len(self.prefix_len.unwrap_or(DEFAULT_PREFIX_LEN))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const DONORS: &str = r#"
name = "donors"
prefix_len = 4

[[mapping]]
key = "Name"
master_key = "Full Name"
compare = "prefix"
points = 2

[[mapping]]
key = "Email"

[[mapping]]
key = "Address"
compare = "fuzzy"
strip = false
"#;

    #[test]
    fn parse_valid_profile() {
        let config = ProfileConfig::from_toml(DONORS).unwrap();
        assert_eq!(config.name.as_deref(), Some("donors"));
        assert_eq!(config.mappings.len(), 3);
        assert_eq!(config.mappings[1].compare, CompareKind::Exact);
        assert_eq!(config.mappings[1].points, 1);
        assert!(config.mappings[1].strip);

        let profile = config.into_profile();
        assert_eq!(profile.prefix_len(), 4);
        assert_eq!(
            profile.mappings()[0],
            Mapping::new("Name", CompareKind::Prefix)
                .with_master_key("Full Name")
                .with_points(2)
                .with_prefix_len(4)
        );
        assert_eq!(profile.mappings()[1].master_key, "Email");
        assert!(!profile.mappings()[2].strip);
        assert!(profile.mappings().iter().all(|m| m.prefix_len == 4));
    }

    #[test]
    fn prefix_len_defaults() {
        let config = ProfileConfig::from_toml("[[mapping]]\nkey = \"Name\"\ncompare = \"prefix\"\n").unwrap();
        assert_eq!(config.into_profile().prefix_len(), DEFAULT_PREFIX_LEN);
    }

    #[test]
    fn rejects_unknown_compare_kind() {
        let err = ProfileConfig::from_toml("[[mapping]]\nkey = \"Name\"\ncompare = \"soundex\"\n")
            .unwrap_err();
        assert!(matches!(err, LinkError::ConfigParse(_)));
    }

    #[test]
    fn rejects_empty_profile() {
        let err = ProfileConfig::from_toml("name = \"empty\"\n").unwrap_err();
        assert!(matches!(err, LinkError::ConfigValidation(_)));
    }

    #[test]
    fn rejects_zero_prefix_len() {
        let input = "prefix_len = 0\n[[mapping]]\nkey = \"Name\"\n";
        let err = ProfileConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, LinkError::ConfigValidation(msg) if msg.contains("prefix_len")));
    }

    #[test]
    fn rejects_blank_keys() {
        let err = ProfileConfig::from_toml("[[mapping]]\nkey = \" \"\n").unwrap_err();
        assert!(matches!(err, LinkError::ConfigValidation(msg) if msg.contains("#1")));

        let input = "[[mapping]]\nkey = \"Name\"\n[[mapping]]\nkey = \"ID\"\nmaster_key = \"\"\n";
        let err = ProfileConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, LinkError::ConfigValidation(msg) if msg.contains("#2")));
    }
}
