//! Domain-specific structured extraction
//!
//! Known profile hosts (LinkedIn, IMDb, Wikipedia) get a bespoke parser
//! that lifts person details and credit lists out of their markup. Parsers
//! implement [`DomainParser`] and are looked up through a registry keyed by
//! the page's [`Domain`] classification; supporting a new host means
//! registering a new strategy, not branching deeper into one function.
//!
//! All selector heuristics here are best-effort: page layouts drift, and a
//! parser that finds nothing simply yields no `extracted` record.

use crate::profile::Credit;
use crate::scrape::extract::{collapse_whitespace, selector};
use crate::scrape::{Domain, Extracted, ExtractedPerson, PageMeta, ProfileSource};
use scraper::{ElementRef, Html};
use serde_json::Value;
use url::Url;

/// Everything a domain parser may draw on: the parsed document plus the
/// generic extraction layers already computed for the page.
pub struct ParseContext<'a> {
    pub url: &'a str,
    pub document: &'a Html,
    pub json_ld: &'a [Value],
    pub meta: &'a PageMeta,
}

/// A per-host extraction strategy.
pub trait DomainParser: Sync {
    /// The domain this parser handles.
    fn domain(&self) -> Domain;

    /// Parse the page, returning `None` when nothing useful was found.
    fn parse(&self, ctx: &ParseContext<'_>) -> Option<Extracted>;
}

static PARSERS: [&'static dyn DomainParser; 3] = [&LinkedInParser, &ImdbParser, &WikipediaParser];

/// Run the registered parser for `domain`, if any.
pub fn extract_for_domain(domain: Domain, ctx: &ParseContext<'_>) -> Option<Extracted> {
    PARSERS
        .iter()
        .find(|p| p.domain() == domain)
        .and_then(|p| p.parse(ctx))
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

fn select_text(root: &Html, css: &str) -> Option<String> {
    root.select(&selector(css))
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

fn select_attr(root: &Html, css: &str, attr: &str) -> Option<String> {
    root.select(&selector(css))
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Find the first JSON-LD block whose @type is (or includes) Person.
fn json_ld_person(json_ld: &[Value]) -> Option<&Value> {
    json_ld.iter().find(|block| match block.get("@type") {
        Some(Value::String(t)) => t == "Person",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Person")),
        _ => false,
    })
}

/// Person.image may be a string, an ImageObject, or an array of either.
fn json_ld_image(block: &Value) -> Option<String> {
    match block.get("image")? {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj
            .get("contentUrl")
            .and_then(Value::as_str)
            .map(str::to_owned),
        Value::Array(items) => items.first().and_then(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => obj
                .get("contentUrl")
                .and_then(Value::as_str)
                .map(str::to_owned),
            _ => None,
        }),
        _ => None,
    }
}

struct LinkedInParser;

impl DomainParser for LinkedInParser {
    fn domain(&self) -> Domain {
        Domain::LinkedIn
    }

    // Public LinkedIn pages expose very little HTML; lean on the Person
    // JSON-LD block and og/twitter meta. Film credits never appear here.
    fn parse(&self, ctx: &ParseContext<'_>) -> Option<Extracted> {
        let person_block = json_ld_person(ctx.json_ld);

        let image = person_block
            .and_then(json_ld_image)
            .or_else(|| ctx.meta.og_image.clone())
            .or_else(|| ctx.meta.twitter_image.clone());

        let name = person_block
            .and_then(|b| b.get("name").and_then(Value::as_str))
            .map(str::to_owned)
            .or_else(|| select_text(ctx.document, "h1"))
            .or_else(|| {
                ctx.meta
                    .og_title
                    .as_deref()
                    .and_then(|t| t.split(" - ").next())
                    .map(|t| t.trim().to_owned())
                    .filter(|t| !t.is_empty())
            });

        let job_title = person_block
            .and_then(|b| b.get("jobTitle").and_then(Value::as_str))
            .map(str::to_owned)
            .or_else(|| ctx.meta.og_description.clone())
            .or_else(|| ctx.meta.twitter_description.clone());

        if name.is_none() && image.is_none() && job_title.is_none() {
            return None;
        }

        Some(Extracted {
            source: ProfileSource::LinkedIn,
            person: ExtractedPerson {
                name,
                image,
                job_title,
                same_as: vec![ctx.url.to_owned()],
            },
            credits: Vec::new(),
            known_for: Vec::new(),
        })
    }
}

struct ImdbParser;

impl ImdbParser {
    fn title_url(href: &str) -> Option<String> {
        let href = href.split('?').next().unwrap_or(href);
        if !href.contains("/title/") {
            return None;
        }
        if href.starts_with("http") {
            Some(href.to_owned())
        } else {
            Some(format!("https://www.imdb.com{href}"))
        }
    }

    /// Strip IMDb's resize suffix and request a fixed-width rendition.
    fn upscale_image(src: &str) -> String {
        match src.split("._V1_").next() {
            Some(base) if base != src => format!("{base}._V1_SX300.jpg"),
            _ => src.to_owned(),
        }
    }

    fn known_for(document: &Html) -> Vec<Credit> {
        let mut items = Vec::new();
        for tile in document.select(&selector(r#"[data-testid="knownfor-item"]"#)) {
            let title = tile
                .select(&selector(r#"[data-testid="knownfor-item-title"]"#))
                .next()
                .or_else(|| tile.select(&selector("a")).next())
                .map(element_text)
                .filter(|t| !t.is_empty());
            let Some(title) = title else { continue };

            let year = tile
                .select(&selector(r#"[data-testid="knownfor-item-year"]"#))
                .next()
                .map(element_text)
                .map(|y| y.replace(['(', ')'], ""))
                .filter(|y| !y.is_empty());
            let role = tile
                .select(&selector(r#"[data-testid="knownfor-item-character"]"#))
                .next()
                .map(element_text)
                .filter(|r| !r.is_empty());
            let url = tile
                .select(&selector(r#"a[href*="/title/"]"#))
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(Self::title_url);

            items.push(Credit {
                title: Some(title),
                year,
                url,
                role,
                department: None,
                kind: Some("film".to_owned()),
            });
        }
        items
    }

    fn filmography(document: &Html) -> Vec<Credit> {
        let mut credits = Vec::new();
        for row in document.select(&selector(r#"[data-testid="filmography-item"], .filmo-row"#)) {
            let link = row.select(&selector(r#"a[href*="/title/"]"#)).next();
            let title = link.map(element_text).filter(|t| !t.is_empty());
            let Some(title) = title else { continue };

            let year = row
                .select(&selector(r#"[data-testid="year"], .year_column, .year"#))
                .next()
                .map(element_text)
                .map(|y| y.replace(['(', ')'], ""))
                .filter(|y| !y.is_empty());
            let role = row
                .select(&selector(r#"[data-testid="characters"], .character, .characters"#))
                .next()
                .map(element_text)
                .filter(|r| !r.is_empty());
            let url = link
                .and_then(|a| a.value().attr("href"))
                .and_then(Self::title_url);

            credits.push(Credit {
                title: Some(title),
                year,
                url,
                role,
                department: None,
                kind: Some("film".to_owned()),
            });
        }
        credits
    }
}

impl DomainParser for ImdbParser {
    fn domain(&self) -> Domain {
        Domain::Imdb
    }

    fn parse(&self, ctx: &ParseContext<'_>) -> Option<Extracted> {
        let name = select_text(ctx.document, "h1 span.hero__primary-text")
            .or_else(|| select_text(ctx.document, "h1"));

        let image = select_attr(
            ctx.document,
            r#"img[data-testid="hero-media__poster"]"#,
            "src",
        )
        .or_else(|| select_attr(ctx.document, r#"div[data-testid="hero-media"] img"#, "src"))
        .or_else(|| select_attr(ctx.document, "img.ipc-image", "src"))
        .map(|src| Self::upscale_image(&src));

        let professions: Vec<String> = {
            let mut seen = Vec::new();
            for el in ctx
                .document
                .select(&selector(r#"[data-testid="hero-profession-items"] a"#))
            {
                let p = element_text(el);
                if !p.is_empty() && !seen.contains(&p) {
                    seen.push(p);
                }
            }
            seen
        };
        let job_title = (!professions.is_empty()).then(|| professions.join(", "));

        let known_for = Self::known_for(ctx.document);
        let mut credits = Self::filmography(ctx.document);
        if credits.is_empty() && !known_for.is_empty() {
            credits = known_for
                .iter()
                .cloned()
                .map(|mut c| {
                    c.department = Some("Known For".to_owned());
                    c
                })
                .collect();
        }

        if name.is_none() && credits.is_empty() {
            return None;
        }

        Some(Extracted {
            source: ProfileSource::Imdb,
            person: ExtractedPerson {
                name,
                image,
                job_title,
                same_as: vec![ctx.url.to_owned()],
            },
            credits,
            known_for,
        })
    }
}

struct WikipediaParser;

impl DomainParser for WikipediaParser {
    fn domain(&self) -> Domain {
        Domain::Wikipedia
    }

    fn parse(&self, ctx: &ParseContext<'_>) -> Option<Extracted> {
        let mut credits = Vec::new();

        // Filmography tables: naive year | title | role column mapping.
        for table in ctx.document.select(&selector("table.wikitable")) {
            let caption = table
                .select(&selector("caption"))
                .next()
                .map(element_text)
                .unwrap_or_default()
                .to_lowercase();
            if !caption.contains("filmography") {
                continue;
            }

            for row in table.select(&selector("tr")) {
                let cells: Vec<String> = row
                    .select(&selector("td"))
                    .map(element_text)
                    .collect();
                if cells.is_empty() {
                    continue;
                }
                let title = cells.get(1).filter(|t| !t.is_empty());
                let Some(title) = title else { continue };

                let url = row
                    .select(&selector(r#"td a[href^="/wiki/"]"#))
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .and_then(|href| {
                        Url::parse("https://en.wikipedia.org")
                            .ok()?
                            .join(href)
                            .ok()
                            .map(|u| u.to_string())
                    });

                credits.push(Credit {
                    title: Some(title.clone()),
                    year: cells.first().filter(|y| !y.is_empty()).cloned(),
                    url,
                    role: cells.get(2).filter(|r| !r.is_empty()).cloned(),
                    department: None,
                    kind: None,
                });
            }
        }

        let name = select_text(ctx.document, "h1#firstHeading")
            .or_else(|| select_text(ctx.document, "table.infobox caption"));

        let image = select_attr(ctx.document, "table.infobox img", "src").map(|src| {
            if src.starts_with("http") {
                src
            } else {
                format!("https:{src}")
            }
        });

        if name.is_none() && credits.is_empty() {
            return None;
        }

        Some(Extracted {
            source: ProfileSource::Wikipedia,
            person: ExtractedPerson {
                name,
                image,
                job_title: None,
                same_as: vec![ctx.url.to_owned()],
            },
            credits,
            known_for: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::extract::{extract_json_ld, extract_meta};
    use serde_json::json;

    fn context<'a>(
        url: &'a str,
        document: &'a Html,
        json_ld: &'a [Value],
        meta: &'a PageMeta,
    ) -> ParseContext<'a> {
        ParseContext {
            url,
            document,
            json_ld,
            meta,
        }
    }

    #[test]
    fn test_linkedin_person_from_json_ld() {
        let html = r#"<html><head>
            <script type="application/ld+json">
              {"@type": "Person", "name": "Jane Doe", "jobTitle": "Director",
               "image": {"contentUrl": "https://media.linkedin.com/jane.jpg"}}
            </script>
        </head><body><h1>ignored fallback</h1></body></html>"#;
        let document = Html::parse_document(html);
        let json_ld = extract_json_ld(&document);
        let meta = extract_meta(&document);
        let ctx = context(
            "https://www.linkedin.com/in/janedoe",
            &document,
            &json_ld,
            &meta,
        );

        let extracted = LinkedInParser.parse(&ctx).unwrap();
        assert_eq!(extracted.source, ProfileSource::LinkedIn);
        assert_eq!(extracted.person.name.as_deref(), Some("Jane Doe"));
        assert_eq!(extracted.person.job_title.as_deref(), Some("Director"));
        assert_eq!(
            extracted.person.image.as_deref(),
            Some("https://media.linkedin.com/jane.jpg")
        );
        assert_eq!(
            extracted.person.same_as,
            vec!["https://www.linkedin.com/in/janedoe".to_string()]
        );
        assert!(extracted.credits.is_empty());
    }

    #[test]
    fn test_linkedin_name_from_og_title_split() {
        let html = r#"<html><head>
            <meta property="og:title" content="Jane Doe - Film Director | LinkedIn">
            <meta property="og:image" content="https://media.linkedin.com/jane.jpg">
        </head><body></body></html>"#;
        let document = Html::parse_document(html);
        let json_ld = extract_json_ld(&document);
        let meta = extract_meta(&document);
        let ctx = context("https://linkedin.com/in/janedoe", &document, &json_ld, &meta);

        let extracted = LinkedInParser.parse(&ctx).unwrap();
        assert_eq!(extracted.person.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_imdb_name_image_and_known_for() {
        let html = r#"<html><body>
            <h1 data-testid="hero__pageTitle"><span class="hero__primary-text">Jane Doe</span></h1>
            <img data-testid="hero-media__poster"
                 src="https://m.media-amazon.com/images/M/abc._V1_QL75_UX140.jpg">
            <div data-testid="knownfor-item">
              <a href="/title/tt1234567/?ref_=nm"><span data-testid="knownfor-item-title">Movie A</span></a>
              <span data-testid="knownfor-item-year">(2020)</span>
            </div>
        </body></html>"#;
        let document = Html::parse_document(html);
        let json_ld = Vec::new();
        let meta = PageMeta::default();
        let ctx = context(
            "https://www.imdb.com/name/nm0000001/",
            &document,
            &json_ld,
            &meta,
        );

        let extracted = ImdbParser.parse(&ctx).unwrap();
        assert_eq!(extracted.person.name.as_deref(), Some("Jane Doe"));
        assert_eq!(
            extracted.person.image.as_deref(),
            Some("https://m.media-amazon.com/images/M/abc._V1_SX300.jpg")
        );

        // no filmography rows, so known-for tiles back the credit list
        assert_eq!(extracted.credits.len(), 1);
        let credit = &extracted.credits[0];
        assert_eq!(credit.title.as_deref(), Some("Movie A"));
        assert_eq!(credit.year.as_deref(), Some("2020"));
        assert_eq!(credit.department.as_deref(), Some("Known For"));
        assert_eq!(
            credit.url.as_deref(),
            Some("https://www.imdb.com/title/tt1234567/")
        );
    }

    #[test]
    fn test_wikipedia_filmography_table() {
        let html = r#"<html><body>
            <h1 id="firstHeading">Jane Doe</h1>
            <table class="infobox"><tbody><tr>
              <td><img src="//upload.wikimedia.org/jane.jpg"></td>
            </tr></tbody></table>
            <table class="wikitable">
              <caption>Selected filmography</caption>
              <tr><th>Year</th><th>Title</th><th>Role</th></tr>
              <tr><td>2019</td><td><a href="/wiki/Movie_A">Movie A</a></td><td>Director</td></tr>
              <tr><td>2021</td><td>Movie B</td><td></td></tr>
            </table>
            <table class="wikitable">
              <caption>Awards</caption>
              <tr><td>2020</td><td>Best Director</td></tr>
            </table>
        </body></html>"#;
        let document = Html::parse_document(html);
        let json_ld = Vec::new();
        let meta = PageMeta::default();
        let ctx = context(
            "https://en.wikipedia.org/wiki/Jane_Doe",
            &document,
            &json_ld,
            &meta,
        );

        let extracted = WikipediaParser.parse(&ctx).unwrap();
        assert_eq!(extracted.person.name.as_deref(), Some("Jane Doe"));
        assert_eq!(
            extracted.person.image.as_deref(),
            Some("https://upload.wikimedia.org/jane.jpg")
        );

        // the awards table is not a filmography and contributes nothing
        assert_eq!(extracted.credits.len(), 2);
        assert_eq!(extracted.credits[0].title.as_deref(), Some("Movie A"));
        assert_eq!(extracted.credits[0].year.as_deref(), Some("2019"));
        assert_eq!(extracted.credits[0].role.as_deref(), Some("Director"));
        assert_eq!(
            extracted.credits[0].url.as_deref(),
            Some("https://en.wikipedia.org/wiki/Movie_A")
        );
        assert_eq!(extracted.credits[1].title.as_deref(), Some("Movie B"));
        assert!(extracted.credits[1].role.is_none());
    }

    #[test]
    fn test_parser_yields_none_on_empty_page() {
        let document = Html::parse_document("<html><body></body></html>");
        let json_ld = Vec::new();
        let meta = PageMeta::default();
        let ctx = context(
            "https://www.imdb.com/name/nm0000001/",
            &document,
            &json_ld,
            &meta,
        );
        assert!(ImdbParser.parse(&ctx).is_none());
    }

    #[test]
    fn test_json_ld_image_shapes() {
        assert_eq!(
            json_ld_image(&json!({"image": "https://x/pic.jpg"})).as_deref(),
            Some("https://x/pic.jpg")
        );
        assert_eq!(
            json_ld_image(&json!({"image": {"contentUrl": "https://x/obj.jpg"}})).as_deref(),
            Some("https://x/obj.jpg")
        );
        assert_eq!(
            json_ld_image(&json!({"image": [{"contentUrl": "https://x/arr.jpg"}]})).as_deref(),
            Some("https://x/arr.jpg")
        );
        assert!(json_ld_image(&json!({"image": 42})).is_none());
    }
}
