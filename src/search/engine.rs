//! Query engine - substring/token filter over the catalog / 查询引擎
//!
//! A location is kept when any of these match, checked in order:
//! 1. title or folder name contains the whole phrase
//! 2. a location tag contains any single term
//! 3. a flavor display name contains the phrase, or a flavor tag contains any term
//! 4. the free-text blob contains the phrase
//!
//! No ranking: the result is a stable filter of catalog order.

use serde::{Deserialize, Serialize};

use crate::catalog::{Flavor, Location};

use super::tokenizer::{normalize_for_search, tokenize_query};

/// Filter toggles / 过滤开关
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggles {
    #[serde(default)]
    pub animated_only: bool,
}

/// Parsed, lowercased query / 解析后的查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Whole query, trimmed and lowercase / 完整短语
    pub phrase: String,
    /// Non-empty lowercase terms / 查询词
    pub terms: Vec<String>,
}

impl SearchQuery {
    /// Returns `None` for an empty or blank query / 空查询返回 None
    pub fn parse(raw: &str) -> Option<Self> {
        let terms = tokenize_query(raw);
        if terms.is_empty() {
            return None;
        }
        Some(Self {
            phrase: normalize_for_search(raw),
            terms,
        })
    }

    fn any_term_in(&self, tags: &[String]) -> bool {
        tags.iter()
            .any(|tag| self.terms.iter().any(|term| tag.contains(term.as_str())))
    }

    fn phrase_in(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.phrase)
    }

    fn matches_flavor(&self, flavor: &Flavor) -> bool {
        self.phrase_in(&flavor.display_name) || self.any_term_in(&flavor.smart_tags)
    }

    /// Multi-field match, cheapest checks first / 多字段匹配
    pub fn matches(&self, location: &Location) -> bool {
        if self.phrase_in(&location.title) || self.phrase_in(&location.folder_name) {
            return true;
        }
        if self.any_term_in(&location.smart_tags) {
            return true;
        }
        if location.flavors.iter().any(|f| self.matches_flavor(f)) {
            return true;
        }
        location
            .searchable_text
            .as_deref()
            .map(|text| self.phrase_in(text))
            .unwrap_or(false)
    }
}

/// Filter locations by query and toggles, preserving input order / 过滤地点
pub fn filter<'a, I>(locations: I, query: &str, toggles: Toggles) -> Vec<&'a Location>
where
    I: IntoIterator<Item = &'a Location>,
{
    let parsed = SearchQuery::parse(query);

    locations
        .into_iter()
        .filter(|location| !toggles.animated_only || location.has_animated)
        .filter(|location| match &parsed {
            Some(q) => q.matches(location),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::search::tags;
    use serde_json::json;

    fn sample() -> Catalog {
        let mut catalog: Catalog = serde_json::from_value(json!({
            "locations": [
                {
                    "id": "fire-temple",
                    "title": "Ashur Fire Temple",
                    "folder_name": "Ashur Fire Temple",
                    "has_animated": true,
                    "flavors": [
                        { "name": "Original", "files": [{ "filename": "temple.webm", "animated": true }] },
                        { "name": "Night", "display_name": "Night Variant", "files": [{ "filename": "night.webp" }] }
                    ]
                },
                {
                    "id": "harbor",
                    "title": "Smuggler Harbor",
                    "folder_name": "Harbor_01",
                    "smart_tags": ["docks", "coast"],
                    "flavors": [
                        { "name": "Winter", "display_name": "Frozen Docks", "files": [], "smart_tags": ["snow", "ice"] }
                    ]
                },
                {
                    "id": "crypt",
                    "title": "Old Crypt",
                    "folder_name": "Crypt",
                    "smart_tags": ["undead"],
                    "flavors": [],
                    "searchable_text": "A forgotten tomb beneath the fire temple district"
                }
            ]
        }))
        .unwrap();
        tags::backfill(&mut catalog);
        catalog
    }

    fn ids(result: &[&Location]) -> Vec<String> {
        result.iter().map(|l| l.id.clone()).collect()
    }

    #[test]
    fn test_blank_query_passes_through() {
        let catalog = sample();
        let result = filter(&catalog.locations, "   ", Toggles::default());
        assert_eq!(ids(&result), vec!["fire-temple", "harbor", "crypt"]);
    }

    #[test]
    fn test_animated_only() {
        let catalog = sample();
        let toggles = Toggles { animated_only: true };
        assert_eq!(ids(&filter(&catalog.locations, "", toggles)), vec!["fire-temple"]);
        assert!(filter(&catalog.locations, "harbor", toggles).is_empty());
    }

    #[test]
    fn test_phrase_in_title() {
        let catalog = sample();
        let result = filter(&catalog.locations, "fire temple", Toggles::default());
        // crypt matches through searchable_text
        assert_eq!(ids(&result), vec!["fire-temple", "crypt"]);
    }

    #[test]
    fn test_case_insensitive() {
        let catalog = sample();
        let upper = filter(&catalog.locations, "Fire Temple", Toggles::default());
        let lower = filter(&catalog.locations, "fire temple", Toggles::default());
        assert_eq!(ids(&upper), ids(&lower));
    }

    #[test]
    fn test_any_term_in_location_tags() {
        let catalog = sample();
        let result = filter(&catalog.locations, "zzz coas", Toggles::default());
        assert_eq!(ids(&result), vec!["harbor"]);
    }

    #[test]
    fn test_flavor_display_name_and_tags() {
        let catalog = sample();
        assert_eq!(
            ids(&filter(&catalog.locations, "frozen docks", Toggles::default())),
            vec!["harbor"]
        );
        assert_eq!(
            ids(&filter(&catalog.locations, "ice", Toggles::default())),
            vec!["harbor"]
        );
        assert_eq!(
            ids(&filter(&catalog.locations, "variant", Toggles::default())),
            vec!["fire-temple"]
        );
    }

    #[test]
    fn test_searchable_text_phrase_only() {
        let catalog = sample();
        assert_eq!(
            ids(&filter(&catalog.locations, "forgotten tomb", Toggles::default())),
            vec!["crypt"]
        );
        // words split across the blob do not match as a phrase
        assert!(filter(&catalog.locations, "tomb forgotten", Toggles::default()).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let catalog = sample();
        for query in ["fire", "docks", "temple night", "undead"] {
            let once = filter(&catalog.locations, query, Toggles::default());
            let twice = filter(once.iter().copied(), query, Toggles::default());
            assert_eq!(ids(&once), ids(&twice));
        }
    }

    #[test]
    fn test_parse_blank_query() {
        assert!(SearchQuery::parse("").is_none());
        assert!(SearchQuery::parse(" \t ").is_none());
        let q = SearchQuery::parse(" Fire  Temple ").unwrap();
        assert_eq!(q.phrase, "fire  temple");
        assert_eq!(q.terms, vec!["fire", "temple"]);
    }

    #[test]
    fn test_phrase_keeps_inner_whitespace() {
        let location: Location = serde_json::from_value(json!({
            "id": "t", "title": "Fire Temple", "folder_name": "T", "flavors": []
        }))
        .unwrap();

        assert!(SearchQuery::parse("  Fire Temple ").unwrap().matches(&location));
        assert!(!SearchQuery::parse("fire  temple").unwrap().matches(&location));
    }
}
