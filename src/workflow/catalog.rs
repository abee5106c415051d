//! Stage Catalog
//!
//! Direction-keyed, ordered stage definitions loaded once at startup from
//! YAML. The compiled-in default lives in `config/stage_catalog.yaml`.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::info;

use fleet_types::{StageDefinition, TripDirection};

use crate::error::CatalogError;

const BUILTIN_CATALOG: &str = include_str!("../../config/stage_catalog.yaml");

/// On-disk shape of the catalog document
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    version: Option<String>,
    /// Defaults to the first outbound entry
    #[serde(default)]
    first_outbound: Option<String>,
    stages: BTreeMap<TripDirection, Vec<StageDefinition>>,
}

/// Immutable stage catalog
#[derive(Debug, Clone)]
pub struct StageCatalog {
    version: String,
    first_outbound_tag: String,
    stages: BTreeMap<TripDirection, Vec<StageDefinition>>,
}

impl StageCatalog {
    /// The catalog compiled into the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::load_from_str(BUILTIN_CATALOG)
    }

    /// Load from a YAML file
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let catalog = Self::load_from_str(&content)?;
        info!(
            path = %path.display(),
            version = %catalog.version,
            "Loaded stage catalog"
        );
        Ok(catalog)
    }

    /// Load from a YAML string
    pub fn load_from_str(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        Self::from_file(file)
    }

    fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        for direction in TripDirection::ALL {
            let entries = file.stages.get(direction).map(Vec::as_slice).unwrap_or(&[]);
            validate_direction(*direction, entries)?;
        }

        let outbound = file
            .stages
            .get(&TripDirection::Outbound)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let first_outbound_tag = match file.first_outbound {
            Some(tag) => {
                if !outbound.iter().any(|d| d.tag == tag) {
                    return Err(CatalogError::UnknownFirstOutbound(tag));
                }
                tag
            }
            None => outbound
                .first()
                .map(|d| d.tag.clone())
                .ok_or_else(|| CatalogError::EmptyDirection(TripDirection::Outbound.to_string()))?,
        };

        Ok(Self {
            version: file.version.unwrap_or_else(|| "1.0".to_string()),
            first_outbound_tag,
            stages: file.stages,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Ordered stage definitions for a direction
    pub fn for_direction(&self, direction: TripDirection) -> &[StageDefinition] {
        self.stages
            .get(&direction)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Definition for a tag within a direction; `None` for unknown tags
    pub fn definition(&self, direction: TripDirection, tag: &str) -> Option<&StageDefinition> {
        self.for_direction(direction).iter().find(|d| d.tag == tag)
    }

    /// Tag of the stage whose completion puts a trip on the road
    pub fn first_outbound_tag(&self) -> &str {
        &self.first_outbound_tag
    }
}

fn validate_direction(
    direction: TripDirection,
    entries: &[StageDefinition],
) -> Result<(), CatalogError> {
    if entries.is_empty() {
        return Err(CatalogError::EmptyDirection(direction.to_string()));
    }

    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.tag.as_str()) {
            return Err(CatalogError::DuplicateTag {
                direction: direction.to_string(),
                tag: entry.tag.clone(),
            });
        }
        if entry.has_location_menu() && direction != TripDirection::Return {
            return Err(CatalogError::MenuOutsideReturn {
                tag: entry.tag.clone(),
            });
        }
        if entry.requires_location
            && entry.location_category.is_none()
            && !entry.has_location_menu()
        {
            return Err(CatalogError::MissingLocationRule {
                tag: entry.tag.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
stages:
  outbound:
    - tag: pickup
      name: Pickup
      requires_location: true
      location_category: port
    - tag: delivery
      name: Delivery
  return:
    - tag: drop_off
      name: Drop off
"#;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = StageCatalog::builtin().unwrap();
        assert_eq!(catalog.first_outbound_tag(), "container_pickup");
        assert_eq!(catalog.for_direction(TripDirection::Outbound).len(), 4);
        assert_eq!(
            catalog.for_direction(TripDirection::Outbound)[0].tag,
            "container_pickup"
        );

        let drop = catalog
            .definition(TripDirection::Return, "empty_container_return")
            .unwrap();
        assert!(drop.has_location_menu());
        assert!(catalog
            .definition(TripDirection::Outbound, "empty_container_return")
            .is_none());
    }

    #[test]
    fn test_first_outbound_defaults_to_first_entry() {
        let catalog = StageCatalog::load_from_str(MINIMAL).unwrap();
        assert_eq!(catalog.first_outbound_tag(), "pickup");
        assert_eq!(catalog.version(), "1.0");
    }

    #[test]
    fn test_unknown_tag_is_none() {
        let catalog = StageCatalog::load_from_str(MINIMAL).unwrap();
        assert!(catalog.definition(TripDirection::Outbound, "teleport").is_none());
    }

    #[test]
    fn test_rejects_empty_direction() {
        let yaml = r#"
stages:
  outbound:
    - tag: pickup
      name: Pickup
"#;
        let err = StageCatalog::load_from_str(yaml).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyDirection(d) if d == "return"));
    }

    #[test]
    fn test_rejects_duplicate_tag() {
        let yaml = r#"
stages:
  outbound:
    - { tag: pickup, name: Pickup }
    - { tag: pickup, name: Pickup again }
  return:
    - { tag: drop_off, name: Drop off }
"#;
        let err = StageCatalog::load_from_str(yaml).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTag { tag, .. } if tag == "pickup"));
    }

    #[test]
    fn test_rejects_location_without_rule() {
        let yaml = r#"
stages:
  outbound:
    - { tag: pickup, name: Pickup, requires_location: true }
  return:
    - { tag: drop_off, name: Drop off }
"#;
        let err = StageCatalog::load_from_str(yaml).unwrap_err();
        assert!(matches!(err, CatalogError::MissingLocationRule { .. }));
    }

    #[test]
    fn test_rejects_menu_on_outbound() {
        let yaml = r#"
stages:
  outbound:
    - tag: pickup
      name: Pickup
      requires_location: true
      location_options:
        - { name: Yard, city: Valencia, country: Spain }
  return:
    - { tag: drop_off, name: Drop off }
"#;
        let err = StageCatalog::load_from_str(yaml).unwrap_err();
        assert!(matches!(err, CatalogError::MenuOutsideReturn { .. }));
    }

    #[test]
    fn test_rejects_unknown_first_outbound() {
        let yaml = format!("first_outbound: drop_off\n{}", MINIMAL);
        let err = StageCatalog::load_from_str(&yaml).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownFirstOutbound(t) if t == "drop_off"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let catalog = StageCatalog::load_from_file(file.path()).unwrap();
        assert_eq!(catalog.for_direction(TripDirection::Return).len(), 1);

        let missing = StageCatalog::load_from_file(Path::new("/nonexistent/catalog.yaml"));
        assert!(matches!(missing, Err(CatalogError::Io { .. })));
    }
}
