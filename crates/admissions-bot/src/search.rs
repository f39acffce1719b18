//! Keyword retrieval over the in-memory program catalog.
//!
//! The query is lowercased and split on whitespace into a set of keywords. Each program
//! is scored by how many distinct keywords appear anywhere inside its lowercased
//! "name category schedule" text. Matching is plain substring containment, so short
//! keywords such as "of" or "in" also hit inside longer words. There is no stop-word
//! list and no whole-word check.

use std::collections::HashSet;

use crate::model::{Record, ScoredCandidate};

/// Number of catalog entries returned as general context when nothing matches.
pub const FALLBACK_COUNT: usize = 3;

/// Rank catalog records against a free-text query.
///
/// Returns matching records by descending score; equal scores keep catalog order. When
/// nothing matches, the first [`FALLBACK_COUNT`] records are returned instead. An empty
/// catalog always yields an empty result.
pub fn rank<'a>(query: &str, catalog: &'a [Record]) -> Vec<&'a Record> {
    let keywords = keywords(query);

    let mut candidates: Vec<ScoredCandidate<'a>> = catalog
        .iter()
        .map(|record| ScoredCandidate {
            record,
            score: score(&keywords, record),
        })
        .filter(|c| c.score > 0)
        .collect();

    if candidates.is_empty() {
        return catalog.iter().take(FALLBACK_COUNT).collect();
    }

    // `sort_by` is stable.
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates.into_iter().map(|c| c.record).collect()
}

pub fn keywords(query: &str) -> HashSet<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

pub fn searchable_text(record: &Record) -> String {
    [&record.name, &record.category, &record.schedule]
        .iter()
        .map(|field| field.as_deref().unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn score(keywords: &HashSet<String>, record: &Record) -> usize {
    if keywords.is_empty() {
        return 0;
    }
    let text = searchable_text(record);
    keywords.iter().filter(|k| text.contains(k.as_str())).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(name: &str, category: &str, schedule: &str) -> Record {
        Record {
            name: Some(name.to_string()),
            category: Some(category.to_string()),
            schedule: Some(schedule.to_string()),
            ..Record::default()
        }
    }

    fn names<'a>(records: &[&'a Record]) -> Vec<&'a str> {
        records
            .iter()
            .map(|r| r.name.as_deref().unwrap_or(""))
            .collect()
    }

    fn catalog() -> Vec<Record> {
        vec![
            program("DVM", "Faculty of Veterinary Science", "Morning"),
            program("BSc Agricultural Engineering", "Faculty of Agricultural Engineering", "Morning"),
            program("BSc Food Science", "National Institute of Food Science", "Evening"),
            program("BSc Agronomy", "Faculty of Agriculture", "Evening"),
        ]
    }

    #[test]
    fn single_match_from_name_or_category() {
        let catalog = vec![Record {
            name: Some("Agricultural Engineering".to_string()),
            category: Some("Faculty of Agricultural Engineering".to_string()),
            ..Record::default()
        }];
        let ranked = rank("agricultural", &catalog);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0], &catalog[0]);
    }

    #[test]
    fn higher_scores_first() {
        let catalog = catalog();
        let ranked = rank("food evening", &catalog);
        assert_eq!(names(&ranked), vec!["BSc Food Science", "BSc Agronomy"]);
    }

    #[test]
    fn equal_scores_keep_catalog_order() {
        let catalog = catalog();
        let ranked = rank("morning", &catalog);
        assert_eq!(names(&ranked), vec!["DVM", "BSc Agricultural Engineering"]);

        let ranked = rank("bsc", &catalog);
        assert_eq!(
            names(&ranked),
            vec!["BSc Agricultural Engineering", "BSc Food Science", "BSc Agronomy"]
        );
    }

    #[test]
    fn keywords_are_case_insensitive_and_deduplicated() {
        let kw = keywords("  Food   FOOD\tscience\n");
        assert_eq!(kw.len(), 2);
        assert!(kw.contains("food"));
        assert!(kw.contains("science"));

        let catalog = catalog();
        assert_eq!(score(&kw, &catalog[2]), 2);
    }

    #[test]
    fn repeated_occurrences_count_once() {
        let record = program("Science of Science", "Science", "Science");
        assert_eq!(score(&keywords("science"), &record), 1);
    }

    #[test]
    fn short_keywords_match_inside_longer_words() {
        let catalog = vec![
            program("DVM", "Veterinary", "Morning"),
            program("Zoology", "Faculty of Sciences", "Evening"),
        ];
        // "in" hits "morning", "evening"; "of" hits "faculty of".
        let ranked = rank("in of", &catalog);
        assert_eq!(names(&ranked), vec!["Zoology", "DVM"]);
    }

    #[test]
    fn other_fields_are_not_searched() {
        let mut record = program("DVM", "Faculty of Veterinary Science", "Morning");
        record.eligibility = Some("FSc Pre-Medical".to_string());
        record.notes = Some("hostel available".to_string());
        assert_eq!(score(&keywords("hostel medical"), &record), 0);
    }

    #[test]
    fn empty_query_falls_back_to_first_three() {
        let catalog = catalog();
        let ranked = rank("", &catalog);
        assert_eq!(
            names(&ranked),
            vec!["DVM", "BSc Agricultural Engineering", "BSc Food Science"]
        );
    }

    #[test]
    fn no_match_falls_back_to_first_three() {
        let catalog = catalog();
        let ranked = rank("xylophone", &catalog);
        assert_eq!(ranked.len(), FALLBACK_COUNT);
        assert_eq!(ranked[0], &catalog[0]);
        assert_eq!(ranked[2], &catalog[2]);
    }

    #[test]
    fn fallback_on_small_catalog_returns_everything() {
        let catalog = vec![program("DVM", "Veterinary", "Morning")];
        assert_eq!(rank("xylophone", &catalog).len(), 1);
    }

    #[test]
    fn empty_catalog_yields_nothing() {
        for query in ["", "agriculture", "anything at all"] {
            assert!(rank(query, &[]).is_empty());
        }
    }

    #[test]
    fn absent_fields_are_empty_text() {
        let record = Record {
            schedule: Some("Weekend".to_string()),
            ..Record::default()
        };
        assert_eq!(searchable_text(&record), "  weekend");
        assert_eq!(score(&keywords("weekend"), &record), 1);
        assert_eq!(score(&keywords("weekend"), &Record::default()), 0);
    }

    #[test]
    fn ranking_is_deterministic() {
        let catalog = catalog();
        let first = rank("faculty bsc evening", &catalog);
        for _ in 0..10 {
            assert_eq!(rank("faculty bsc evening", &catalog), first);
        }
    }
}
