use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DefaultsError {
    #[error("failed to read care guide file: {0}")]
    Read(std::io::Error),
    #[error("failed to parse care guide toml: {0}")]
    Parse(toml::de::Error),
    #[error("care guide file {0} has an empty flower name")]
    EmptyName(PathBuf),
    #[error("care guide entry {0} has empty care text")]
    EmptyCare(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CareFile {
    pub flower: CareFileEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CareFileEntry {
    pub name: String,
    #[serde(default)]
    pub order: i32,
    pub care: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultCare {
    pub name: String,
    pub order: i32,
    pub care: String,
    pub source: PathBuf,
}

#[derive(Debug, Clone)]
pub struct EmbeddedCareFile {
    pub file: &'static str,
    pub content: &'static str,
}

include!(concat!(env!("OUT_DIR"), "/embedded_care_guide.rs"));

impl DefaultCare {
    fn from_file(file: CareFile, source: PathBuf) -> Result<DefaultCare, DefaultsError> {
        let name = file.flower.name.trim().to_string();
        if name.is_empty() {
            return Err(DefaultsError::EmptyName(source));
        }
        if file.flower.care.trim().is_empty() {
            return Err(DefaultsError::EmptyCare(name));
        }
        Ok(DefaultCare {
            name,
            order: file.flower.order,
            care: file.flower.care,
            source,
        })
    }
}

pub fn load_embedded_care() -> Result<Vec<DefaultCare>, DefaultsError> {
    let mut entries = Vec::new();
    for embedded in EMBEDDED_CARE_GUIDE {
        let file: CareFile = toml::from_str(embedded.content).map_err(DefaultsError::Parse)?;
        let source = PathBuf::from(format!("<embedded:{}>", embedded.file));
        entries.push(DefaultCare::from_file(file, source)?);
    }
    Ok(entries)
}

pub fn load_care_from_dir(path: &Path) -> Result<Vec<DefaultCare>, DefaultsError> {
    let mut entries = Vec::new();
    let read_dir = match std::fs::read_dir(path) {
        Ok(read_dir) => read_dir,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
        Err(err) => return Err(DefaultsError::Read(err)),
    };

    let mut paths = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(DefaultsError::Read)?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("toml") {
            paths.push(path);
        }
    }
    paths.sort();

    for path in paths {
        let content = std::fs::read_to_string(&path).map_err(DefaultsError::Read)?;
        let file: CareFile = toml::from_str(&content).map_err(DefaultsError::Parse)?;
        entries.push(DefaultCare::from_file(file, path)?);
    }

    Ok(entries)
}

/// Orders each group by `order` then name and flattens the groups into one
/// seed map. Later groups override earlier ones for the same name.
pub fn merge_care(groups: Vec<Vec<DefaultCare>>) -> IndexMap<String, String> {
    let mut merged = IndexMap::new();
    for mut group in groups {
        group.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        for entry in group {
            merged.insert(entry.name, entry.care);
        }
    }
    merged
}

/// The built-in care guide, in seeding order.
pub fn load_embedded_defaults() -> Result<IndexMap<String, String>, DefaultsError> {
    Ok(merge_care(vec![load_embedded_care()?]))
}

pub fn load_defaults(extra_dirs: &[PathBuf]) -> Result<IndexMap<String, String>, DefaultsError> {
    let mut groups = vec![load_embedded_care()?];
    for dir in extra_dirs {
        groups.push(load_care_from_dir(dir)?);
    }
    Ok(merge_care(groups))
}
