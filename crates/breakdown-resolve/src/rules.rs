//! Path parsing rules
//!
//! Reference paths encode the logical entity they point at, and usually a
//! version token (`bunny_geo_v003.abc`). Engines and studios differ in
//! their naming templates, so the rules are data: a version-token regex
//! plus an extension→entity-type table, both overridable per session.

use crate::ResolveError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Default version token: `v` followed by digits, preceded by a separator.
/// Case-insensitive, e.g. `_v003`, `.V12`, `-v1`.
static DEFAULT_VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[._-]v(\d+)").expect("default version pattern is valid"));

/// Entity data derived from one reference path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    /// Logical entity name (version token stripped)
    pub entity_name: String,
    /// Logical entity type, from the extension table or the default
    pub entity_type: String,
    /// Version number bound in the path, if the path carries a token
    pub version: Option<i64>,
}

/// Configurable parsing rules for reference paths
#[derive(Debug, Clone)]
pub struct PathRules {
    version_pattern: Regex,
    default_entity_type: String,
    type_by_extension: BTreeMap<String, String>,
}

impl PathRules {
    /// Create rules with the default version pattern
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a custom version-token pattern
    ///
    /// The pattern's first capture group must be the version digits.
    #[inline]
    #[must_use]
    pub fn with_version_pattern(mut self, pattern: Regex) -> Self {
        self.version_pattern = pattern;
        self
    }

    /// With a default entity type for unmapped extensions
    #[inline]
    #[must_use]
    pub fn with_default_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.default_entity_type = entity_type.into();
        self
    }

    /// Map a file extension (without dot, case-insensitive) to an entity type
    #[inline]
    #[must_use]
    pub fn with_type_for_extension(
        mut self,
        extension: impl Into<String>,
        entity_type: impl Into<String>,
    ) -> Self {
        self.type_by_extension
            .insert(extension.into().to_ascii_lowercase(), entity_type.into());
        self
    }

    /// Parse a reference path into entity data
    ///
    /// # Errors
    /// [`ResolveError::UnparsablePath`] when no entity name can be
    /// extracted (empty path, or a name that is nothing but a version
    /// token).
    pub fn parse(&self, path: &str) -> Result<ParsedPath, ResolveError> {
        let file_name = file_name_of(path);
        if file_name.is_empty() {
            return Err(ResolveError::UnparsablePath(path.to_string()));
        }

        let (stem, extension) = split_extension(file_name);

        let mut version = None;
        let mut entity_name = stem.to_string();
        if let Some(caps) = self.version_pattern.captures(stem) {
            // Unparsable digits (overflow) are treated as no token
            version = caps.get(1).and_then(|m| m.as_str().parse::<i64>().ok());
            if version.is_some() {
                let token = caps.get(0).expect("capture 0 always present");
                entity_name = format!("{}{}", &stem[..token.start()], &stem[token.end()..]);
            }
        }
        let entity_name = entity_name.trim_matches(['.', '_', '-']).to_string();
        if entity_name.is_empty() {
            return Err(ResolveError::UnparsablePath(path.to_string()));
        }

        let entity_type = extension
            .and_then(|ext| self.type_by_extension.get(&ext.to_ascii_lowercase()))
            .cloned()
            .unwrap_or_else(|| self.default_entity_type.clone());

        Ok(ParsedPath {
            entity_name,
            entity_type,
            version,
        })
    }
}

impl Default for PathRules {
    fn default() -> Self {
        Self {
            version_pattern: DEFAULT_VERSION_PATTERN.clone(),
            default_entity_type: "Published File".to_string(),
            type_by_extension: BTreeMap::new(),
        }
    }
}

/// Final path component, tolerant of both separators and URI-ish inputs
fn file_name_of(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path).trim()
}

/// Split `name.ext` into stem and optional extension
fn split_extension(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_version_token_and_strips_it() {
        let rules = PathRules::new();
        let parsed = rules.parse("/publish/caches/bunny_geo_v003.abc").unwrap();
        assert_eq!(parsed.entity_name, "bunny_geo");
        assert_eq!(parsed.version, Some(3));
    }

    #[test]
    fn version_token_is_case_insensitive() {
        let rules = PathRules::new();
        let parsed = rules.parse("shot010-V12.nk").unwrap();
        assert_eq!(parsed.entity_name, "shot010");
        assert_eq!(parsed.version, Some(12));
    }

    #[test]
    fn path_without_token_has_no_version() {
        let rules = PathRules::new();
        let parsed = rules.parse("/tex/wood_diffuse.png").unwrap();
        assert_eq!(parsed.entity_name, "wood_diffuse");
        assert_eq!(parsed.version, None);
    }

    #[test]
    fn windows_separators_are_accepted() {
        let rules = PathRules::new();
        let parsed = rules.parse(r"C:\proj\publish\env_v002.max").unwrap();
        assert_eq!(parsed.entity_name, "env");
        assert_eq!(parsed.version, Some(2));
    }

    #[test]
    fn extension_table_drives_entity_type() {
        let rules = PathRules::new()
            .with_type_for_extension("abc", "Alembic Cache")
            .with_default_entity_type("Image");
        assert_eq!(
            rules.parse("a_v001.abc").unwrap().entity_type,
            "Alembic Cache"
        );
        assert_eq!(rules.parse("a_v001.exr").unwrap().entity_type, "Image");
        // lookup is case-insensitive
        assert_eq!(
            rules.parse("a_v001.ABC").unwrap().entity_type,
            "Alembic Cache"
        );
    }

    #[test]
    fn empty_path_is_unparsable() {
        let rules = PathRules::new();
        assert!(matches!(
            rules.parse(""),
            Err(ResolveError::UnparsablePath(_))
        ));
        assert!(matches!(
            rules.parse("/publish/caches/"),
            Err(ResolveError::UnparsablePath(_))
        ));
    }

    #[test]
    fn bare_version_token_is_unparsable() {
        let rules = PathRules::new();
        assert!(matches!(
            rules.parse("/publish/_v003.abc"),
            Err(ResolveError::UnparsablePath(_))
        ));
    }

    #[test]
    fn custom_version_pattern() {
        let rules =
            PathRules::new().with_version_pattern(Regex::new(r"\.(\d{4})$").unwrap());
        // pattern applies to the stem, extension already split off
        let parsed = rules.parse("/cache/fluid.0042.bgeo").unwrap();
        assert_eq!(parsed.version, Some(42));
        assert_eq!(parsed.entity_name, "fluid");
    }
}
