//! Term-specific lookup tables: course abbreviations and room assignments.
//!
//! Both tables are plain data. The bundled defaults live in
//! `data/default_tables.toml`; a replacement file with the same shape can be
//! loaded per run.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;

const BUILTIN_TABLES: &str = include_str!("../data/default_tables.toml");

/// Location key for regular lectures.
pub const LECTURE_LOCATION: &str = "lecture";
/// Location key for examinations.
pub const EXAM_LOCATION: &str = "exam";
/// Location key for PBL sessions and interviews.
pub const PBL_LOCATION: &str = "pbl";
/// Location key for the clinical skills block.
pub const BCS_LOCATION: &str = "bcs";
/// Location key for lectures without an assigned lecturer.
pub const UNKNOWN_LOCATION: &str = "unknown";

/// Which of the two tables an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Abbreviation,
    Location,
}

impl TableKind {
    pub fn label(self) -> &'static str {
        match self {
            TableKind::Abbreviation => "abbreviations",
            TableKind::Location => "locations",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTables {
    #[serde(default)]
    pub abbreviations: BTreeMap<String, String>,
    #[serde(default)]
    pub locations: BTreeMap<String, String>,
}

impl LookupTables {
    /// Tables shipped with the crate.
    pub fn builtin() -> Self {
        toml::from_str(BUILTIN_TABLES).unwrap_or_else(|err| {
            warn!(error = %err, "Bundled lookup tables are invalid; using empty tables");
            Self::default()
        })
    }

    /// Load tables from an external TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Display abbreviation for a course; unknown courses are returned unchanged.
    pub fn abbreviate<'a>(&'a self, course: &'a str) -> &'a str {
        match self.abbreviations.get(course) {
            Some(abbrev) => abbrev.as_str(),
            None => {
                debug!(course, "No abbreviation configured");
                course
            }
        }
    }

    /// Room for a location key; unknown keys resolve to an empty string.
    pub fn location(&self, key: &str) -> &str {
        match self.locations.get(key) {
            Some(room) => room.as_str(),
            None => {
                debug!(key, "No location configured");
                ""
            }
        }
    }

    pub fn table(&self, kind: TableKind) -> &BTreeMap<String, String> {
        match kind {
            TableKind::Abbreviation => &self.abbreviations,
            TableKind::Location => &self.locations,
        }
    }

    pub fn table_mut(&mut self, kind: TableKind) -> &mut BTreeMap<String, String> {
        match kind {
            TableKind::Abbreviation => &mut self.abbreviations,
            TableKind::Location => &mut self.locations,
        }
    }
}
