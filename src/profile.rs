//! Person profile data model
//!
//! This module defines the shapes shared across the pipeline: the
//! schema.org-Person-style `PersonProfile` synthesized by the model, the
//! custom career arrays (`Credit`, `Project`, `Episode`, `Engagement`)
//! attached to it, and the per-run `RunStats` summary.
//!
//! The model's JSON output has no compile-time contract, so
//! [`PersonProfile::from_value`] acts as the parse-and-validate boundary:
//! every field the model may or may not return is normalized here, and the
//! four custom arrays always come out present (possibly empty), never
//! missing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A synthesized person profile in schema.org Person shape.
///
/// Fields the pipeline itself reads are typed; everything else the model
/// returns (performerIn, worksFor, knowsAbout, award, birthDate, ...) is
/// carried through untouched in `extra` and round-trips on serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonProfile {
    /// schema.org context, normally "https://schema.org"
    #[serde(rename = "@context", default = "default_context")]
    pub context: String,

    /// schema.org type, normally "Person"
    #[serde(rename = "@type", default = "default_type")]
    pub schema_type: String,

    /// Full name of the person
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// URL of a profile image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Headline or profession
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,

    /// Free-text biography
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Authoritative alternate-identity URLs (LinkedIn, IMDb, Wikipedia, ...)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub same_as: Vec<String>,

    /// Every other schema.org Person field the model returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Custom top-level array: long-form projects
    #[serde(default)]
    pub projects: Vec<Project>,

    /// Custom top-level array: individual episodes
    #[serde(default)]
    pub episodes: Vec<Episode>,

    /// Custom top-level array: speaking/press/other engagements
    #[serde(default)]
    pub engagements: Vec<Engagement>,

    /// Custom top-level array: flat filmography-style credits
    #[serde(default)]
    pub credits: Vec<Credit>,
}

fn default_context() -> String {
    "https://schema.org".to_string()
}

fn default_type() -> String {
    "Person".to_string()
}

impl Default for PersonProfile {
    fn default() -> Self {
        Self {
            context: default_context(),
            schema_type: default_type(),
            name: None,
            image: None,
            job_title: None,
            description: None,
            same_as: Vec::new(),
            extra: Map::new(),
            projects: Vec::new(),
            episodes: Vec::new(),
            engagements: Vec::new(),
            credits: Vec::new(),
        }
    }
}

impl PersonProfile {
    /// Normalize an arbitrary JSON value from the model into a profile.
    ///
    /// Rejects non-objects; missing custom arrays default to empty so
    /// downstream consumers never see an absent array.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

/// A single filmography-style credit. Identity for deduplication is the
/// `title`, compared exactly (case-sensitive).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Credit {
    pub title: Option<String>,
    pub year: Option<String>,
    pub url: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl Credit {
    /// Mirror this credit into a project. Returns `None` when the credit
    /// has no title, since `name` is the project identity key.
    pub fn to_project(&self) -> Option<Project> {
        let name = self.title.clone()?;
        Some(Project {
            name: Some(name),
            year: self.year.clone(),
            url: self.url.clone(),
            role: self.role.clone(),
            department: self.department.clone(),
            status: None,
            description: None,
            episodes: Vec::new(),
        })
    }
}

/// A project the person worked on. Identity for deduplication is `name`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Project {
    pub name: Option<String>,
    pub year: Option<String>,
    pub url: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

/// A single episode within a series project.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Episode {
    pub name: Option<String>,
    #[serde(rename = "seriesName")]
    pub series_name: Option<String>,
    pub season: Option<i64>,
    pub episode: Option<i64>,
    pub year: Option<String>,
    pub url: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub engagements: Vec<Engagement>,
}

/// A speaking, press, or other professional engagement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Engagement {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub organization: Option<String>,
    pub date: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
}

/// Statistics for a single pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Secondary sources returned by the search step
    pub secondary_sources_found: usize,

    /// Secondary sources that actually scraped successfully
    pub secondary_sources_scraped: usize,

    /// Credits derived deterministically from the scraped pages
    pub local_credits: usize,

    /// Projects derived deterministically from the scraped pages
    pub local_projects: usize,
}
