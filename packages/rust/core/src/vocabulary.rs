//! News Distributor helpers: day grouping of articles and vocabulary views.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use contenthub_shared::{Article, ContentHubError, Result, VocabularyEntry};

/// Articles bucketed by publication day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleDays {
    pub days: BTreeMap<NaiveDate, Vec<Article>>,
    /// Articles with a missing or unreadable publication date.
    pub undated: Vec<Article>,
}

impl ArticleDays {
    /// Days from newest to oldest.
    pub fn newest_first(&self) -> impl Iterator<Item = (&NaiveDate, &Vec<Article>)> {
        self.days.iter().rev()
    }

    pub fn get(&self, day: NaiveDate) -> &[Article] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Parse an article timestamp (RFC 3339, RFC 2822, or a bare `YYYY-MM-DD`)
/// to its UTC calendar day.
pub fn publication_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Group `articles` by publication day, keeping feed order within a day.
pub fn group_articles_by_day(articles: impl IntoIterator<Item = Article>) -> ArticleDays {
    let mut grouped = ArticleDays::default();
    for article in articles {
        match article.published_date.as_deref().and_then(publication_day) {
            Some(day) => grouped.days.entry(day).or_default().push(article),
            None => grouped.undated.push(article),
        }
    }
    grouped
}

/// Validate a `YYYY-MM-DD` day selector.
pub fn parse_selected_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        ContentHubError::validation(format!("invalid date '{raw}', expected YYYY-MM-DD"))
    })
}

/// Drop repeated words, keeping the first occurrence. Comparison ignores case
/// and surrounding whitespace.
pub fn dedup_vocabulary(entries: Vec<VocabularyEntry>) -> Vec<VocabularyEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.original_word.trim().to_lowercase()))
        .collect()
}

/// Entries whose word or definition contains `term`, ignoring case. A blank
/// term matches everything.
pub fn filter_vocabulary<'a>(
    entries: &'a [VocabularyEntry],
    term: &str,
) -> Vec<&'a VocabularyEntry> {
    let needle = term.trim().to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            needle.is_empty()
                || entry.original_word.to_lowercase().contains(&needle)
                || entry.vietnamese_definition.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: &str, published: Option<&str>) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Article {id}"),
            description: String::new(),
            link: format!("https://news.example.com/{id}"),
            published_date: published.map(str::to_string),
        }
    }

    fn entry(word: &str, definition: &str) -> VocabularyEntry {
        VocabularyEntry {
            original_word: word.to_string(),
            vietnamese_definition: definition.to_string(),
            source_article_title: None,
            created_at: None,
        }
    }

    #[test]
    fn groups_by_day_with_mixed_formats() {
        let grouped = group_articles_by_day(vec![
            article("a", Some("2025-10-02T07:00:00+00:00")),
            article("b", Some("Wed, 01 Oct 2025 22:30:00 +0000")),
            article("c", Some("2025-10-02")),
            article("d", Some("yesterday")),
            article("e", None),
        ]);

        let oct2 = NaiveDate::from_ymd_opt(2025, 10, 2).unwrap();
        let oct1 = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let ids: Vec<_> = grouped.get(oct2).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(grouped.get(oct1).len(), 1);
        assert_eq!(grouped.undated.len(), 2);

        let order: Vec<_> = grouped.newest_first().map(|(day, _)| *day).collect();
        assert_eq!(order, [oct2, oct1]);
    }

    #[test]
    fn offset_timestamps_land_on_utc_day() {
        assert_eq!(
            publication_day("2025-10-02T01:00:00+07:00"),
            NaiveDate::from_ymd_opt(2025, 10, 1)
        );
    }

    #[test]
    fn selected_date_must_be_iso_day() {
        assert!(parse_selected_date("2025-10-01").is_ok());
        let err = parse_selected_date("01/10/2025").unwrap_err();
        assert!(matches!(err, ContentHubError::Validation { .. }));
    }

    #[test]
    fn dedup_keeps_first_case_insensitive() {
        let deduped = dedup_vocabulary(vec![
            entry("Staking", "đặt cược"),
            entry(" staking ", "khác"),
            entry("Validator", "người xác thực"),
        ]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].vietnamese_definition, "đặt cược");
    }

    #[test]
    fn filter_matches_word_or_definition() {
        let entries = vec![entry("Staking", "đặt cược"), entry("Ledger", "sổ cái")];
        assert_eq!(filter_vocabulary(&entries, "STAK").len(), 1);
        assert_eq!(filter_vocabulary(&entries, "sổ")[0].original_word, "Ledger");
        assert_eq!(filter_vocabulary(&entries, "  ").len(), 2);
        assert!(filter_vocabulary(&entries, "mining").is_empty());
    }
}
