use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single radio station.  Owned by the caller; the controller only reads
/// it for the duration of a play request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Cover image shown on the OS media-control surface.
    #[serde(default)]
    pub cover_url: Option<String>,
    /// Searchable tags (genre, style, language, etc.)
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Station {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            cover_url: None,
            tags: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

// ── TOML station loader ───────────────────────────────────────────────────────

/// Intermediate struct that matches the TOML `[[station]]` table.  Kept
/// separate from `Station` so the file schema can diverge from the in-memory
/// struct without breaking either.
#[derive(Debug, Deserialize)]
struct TomlStationFile {
    station: Vec<TomlStation>,
}

#[derive(Debug, Deserialize)]
struct TomlStation {
    id: Option<String>,
    name: String,
    url: String,
    #[serde(default)]
    cover_url: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

pub fn load_stations_from_toml(path: &std::path::Path) -> anyhow::Result<Vec<Station>> {
    let content = std::fs::read_to_string(path)?;
    parse_stations_from_toml_str(&content)
}

pub fn parse_stations_from_toml_str(content: &str) -> anyhow::Result<Vec<Station>> {
    let file: TomlStationFile = toml::from_str(content)?;
    let stations = file
        .station
        .into_iter()
        .map(|s| Station {
            // Stations without an explicit id are keyed by their URL.
            id: s.id.unwrap_or_else(|| s.url.clone()),
            name: s.name,
            url: s.url,
            cover_url: s.cover_url,
            tags: s.tags,
            created_at: Utc::now(),
        })
        .collect();
    Ok(stations)
}
