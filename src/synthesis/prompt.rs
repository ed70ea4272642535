//! Prompt construction for profile synthesis
//!
//! Two prompts: one building the initial Person JSON from the primary
//! page, one refining it with secondary pages. Page text is truncated by
//! character count so a long page cannot blow through the model's context
//! window.

use crate::scrape::ScrapedPage;
use serde_json::{json, Value};

/// Character cap on primary page text
const PRIMARY_TEXT_CHARS: usize = 12_000;

/// Character cap on each secondary page's text
const SECONDARY_TEXT_CHARS: usize = 8_000;

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Prompt for the initial profile from the primary page.
pub(crate) fn person_prompt(page: &ScrapedPage, industry: &str) -> String {
    let json_ld = serde_json::to_string(&page.json_ld).unwrap_or_else(|_| "[]".to_string());
    let text = truncate_chars(&page.text_content, PRIMARY_TEXT_CHARS);
    let image = page.image_hint().unwrap_or_else(|| "null".to_string());
    let credits =
        serde_json::to_string(page.credit_hints()).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"You are an AI Data Extraction and Synthesis Agent that outputs ONLY a single JSON object in the schema.org Person format.

Industry context: "{industry}"
Primary page URL: {url}

Structured JSON-LD blocks:
{json_ld}

Raw text (truncated):
{text}

Scraped hints:
- image: {image}
- credits (CreativeWork[]): {credits}

REQUIREMENTS:
- Return ONE JSON object following schema.org/Person.
- Populate: name, description, jobTitle, image (URL), sameAs (include LinkedIn/Wikipedia/IMDb), performerIn (credits as CreativeWork with name, startDate, url if available), worksFor/affiliation, knowsAbout, award (when found).
- If unknown, use null or [] appropriately.

ADDITIONALLY include the following custom arrays as top-level keys (next to Person fields). If a value is not found, return an empty array:
- "projects": [{{ "name": string, "year": string|null, "url": string|null, "role": string|null, "department": string|null, "status": string|null, "description": string|null, "episodes": [] }}]
- "episodes": [{{ "name": string|null, "seriesName": string|null, "season": number|null, "episode": number|null, "year": string|null, "url": string|null, "role": string|null, "department": string|null, "engagements": [] }}]
- "engagements": [{{ "type": string|null, "title": string|null, "organization": string|null, "date": string|null, "summary": string|null, "url": string|null }}]
- "credits": [{{ "title": string, "year": string|null, "url": string|null, "role": string|null, "department": string|null, "type": string|null }}]

OUTPUT:
- Output ONLY a single JSON object with Person fields (e.g., "@context", "@type", "name", "image", etc.) AND these arrays at the top level.
"#,
        industry = industry,
        url = page.url,
        json_ld = json_ld,
        text = text,
        image = image,
        credits = credits,
    )
}

/// Prompt that merges secondary page text into an existing profile.
pub(crate) fn refine_prompt(profile: &Value, pages: &[ScrapedPage], industry: &str) -> String {
    let base = serde_json::to_string(profile).unwrap_or_else(|_| "{}".to_string());

    let secondary_text = pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            format!(
                "#{} {}\n{}",
                i + 1,
                page.url,
                truncate_chars(&page.text_content, SECONDARY_TEXT_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let hints = json!({
        "secondaryCredits": pages
            .iter()
            .flat_map(|p| p.credit_hints().iter().cloned())
            .collect::<Vec<_>>(),
        "secondaryImages": pages
            .iter()
            .filter_map(|p| p.image_hint())
            .collect::<Vec<_>>(),
        "urls": pages.iter().map(|p| p.url.as_str()).collect::<Vec<_>>(),
    });

    format!(
        r#"You update a schema.org Person JSON to be MORE COMPLETE. Output ONLY the final Person JSON.
Industry context: "{industry}"

Base JSON (trust unless clearly improved):
{base}

Secondary scraped text (truncated):
{secondary_text}

Hints:
{hints}

Rules:
- Keep "@context":"https://schema.org" and "@type":"Person".
- Merge "sameAs" (dedupe).
- Merge "performerIn" with new credits (dedupe by name+url+startDate).
- Prefer valid/high-res image URLs.
- No hallucination; if unsure, leave null/[].

### IMPORTANT: Also populate and MERGE the custom arrays: projects, episodes, engagements, credits.
- Merge by name/title (case-insensitive). Deduplicate.
- Prefer structured sources (JSON-LD, infoboxes).
- Preserve existing entries but enrich missing fields (e.g., add {{year, role, department, url}}).
- If a project clearly belongs to a TV series with numbered episodes, add episodes under the project with {{seriesName, season, episode, year, url}}.
- Keep arrays at the top level of the returned object.

Return ONLY JSON.
"#,
        industry = industry,
        base = base,
        secondary_text = secondary_text,
        hints = hints,
    )
}
