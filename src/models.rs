use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Identifier for a dance category, as it appears in the dance catalog
pub type DanceId = String;

/// A dance category with the attributes available from the dance catalog file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dance {
    pub id: DanceId,
    pub name: String,
    #[serde(rename = "isFast")]
    pub is_fast: bool,
    pub tags: Vec<String>,
    #[serde(rename = "timeSignature")]
    pub time_signature: Option<String>,
    pub rating: Option<u32>, // Popularity rating (1-10)
    pub level: Option<u32>,  // Difficulty level (1-10)
    #[serde(rename = "songCount")]
    pub song_count: u32, // Number of songs of this category in the library
}

impl Dance {
    /// Get all tags for this dance, normalized to lowercase
    pub fn get_all_tags(&self) -> Vec<String> {
        let mut all_tags: Vec<String> = self.tags.iter().map(|t| t.to_lowercase()).collect();
        all_tags.sort();
        all_tags.dedup();
        all_tags
    }

    /// Check if this dance shares any tag with the given tag set
    pub fn shares_tag_with(&self, tags: &[String]) -> bool {
        let own_tags = self.get_all_tags();
        tags.iter()
            .any(|tag| own_tags.iter().any(|own| own == &tag.to_lowercase()))
    }
}

impl Default for Dance {
    fn default() -> Self {
        Dance {
            id: String::new(),
            name: "Unknown".to_string(),
            is_fast: false,
            tags: Vec::new(),
            time_signature: None,
            rating: None,
            level: None,
            song_count: 0,
        }
    }
}

/// Read-only collection of dance categories keyed by id.
///
/// The selection engine queries attributes by value and never mutates the
/// catalog; order of entries matches the catalog file.
#[derive(Debug, Clone, Default)]
pub struct DanceCatalog {
    dances: Vec<Dance>,
}

impl DanceCatalog {
    pub fn new(dances: Vec<Dance>) -> Self {
        Self { dances }
    }

    /// Load a dance catalog from a JSON array file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dance catalog '{path}'"))?;
        let dances: Vec<Dance> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse dance catalog '{path}'"))?;
        Ok(Self::new(dances))
    }

    pub fn get(&self, id: &str) -> Option<&Dance> {
        self.dances.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Is the dance flagged as high-tempo? Unknown ids count as not fast.
    pub fn is_fast(&self, id: &str) -> bool {
        self.get(id).is_some_and(|d| d.is_fast)
    }

    /// Tags of a dance, normalized; empty for unknown ids
    pub fn tags_of(&self, id: &str) -> Vec<String> {
        self.get(id).map(|d| d.get_all_tags()).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dance> {
        self.dances.iter()
    }

    pub fn len(&self) -> usize {
        self.dances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dances.is_empty()
    }
}
