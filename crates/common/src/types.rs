// Core domain types shared across the bookmemory crates.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Kind of record a bookmark points at.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookmarkType {
    #[default]
    Link,
    Note,
    File,
}

impl BookmarkType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Note => "note",
            Self::File => "file",
        }
    }
}

/// Tag filter combinator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TagMode {
    /// Match bookmarks carrying at least one of the tags.
    Any,
    /// Match bookmarks carrying every tag.
    All,
    /// No tag filtering.
    #[default]
    Ignore,
}

impl TagMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::All => "all",
            Self::Ignore => "ignore",
        }
    }
}

/// List ordering.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Sort {
    Alphabetical,
    #[default]
    Recent,
}

impl Sort {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alphabetical => "alphabetical",
            Self::Recent => "recent",
        }
    }
}

/// Returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} `{}`", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for BookmarkType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "link" => Ok(Self::Link),
            "note" => Ok(Self::Note),
            "file" => Ok(Self::File),
            other => Err(UnknownVariant { kind: "bookmark type", value: other.to_string() }),
        }
    }
}

impl FromStr for TagMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(Self::Any),
            "all" => Ok(Self::All),
            "ignore" => Ok(Self::Ignore),
            other => Err(UnknownVariant { kind: "tag mode", value: other.to_string() }),
        }
    }
}

impl FromStr for Sort {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alphabetical" => Ok(Self::Alphabetical),
            "recent" => Ok(Self::Recent),
            other => Err(UnknownVariant { kind: "sort", value: other.to_string() }),
        }
    }
}

/// Fields only a preview (unsaved) record carries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreviewDetails {
    /// How the service extracted the page (`http`, `playwright`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_method: Option<String>,
    /// Sample of the extracted text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_preview: Option<String>,
}

/// A bookmark as held by the collection store.
///
/// Persisted records have a non-empty `id`. A preview produced by inspecting a
/// URL has no id yet and carries `preview`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: BookmarkType,
    /// Tag names in server order. The service sends `[{id, name}]`.
    #[serde(default, deserialize_with = "deserialize_tag_names")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Highlighted match context, present on search and related results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<PreviewDetails>,
}

impl Bookmark {
    pub fn is_preview(&self) -> bool {
        self.preview.is_some()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagRef {
    Name(String),
    Record { name: String },
}

fn deserialize_tag_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags: Option<Vec<TagRef>> = Option::deserialize(deserializer)?;
    Ok(tags
        .unwrap_or_default()
        .into_iter()
        .map(|tag| match tag {
            TagRef::Name(name) | TagRef::Record { name } => name,
        })
        .collect())
}

/// A tag name with the number of bookmarks using it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub count: u64,
}

/// The signed-in user as returned by `GET /api/v1/users/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
