//! Flattening of article ⟷ tag join rows into [`Article`] aggregates.
//!
//! A join returns one row per (article, tag) pair. [`group_article_rows`]
//! reduces those rows to one article per ID:
//!
//! 1. Groups are created in the order their article ID is first seen.
//! 2. Each distinct tag is added to its group once; rows without a tag
//!    (outer-join rows for untagged articles) only create the group.
//! 3. Groups are stably sorted newest first (ties by descending ID).
//!
//! When the rows are already sorted, step 3 leaves the first-seen order intact.

use std::collections::{HashMap, HashSet};

use newsdesk_core::{ArticleId, TagId};

use crate::models::{Article, ArticleTagRow};

/// Accumulator for one article while rows are being grouped.
struct Group {
    article: Article,
    seen_tags: HashSet<TagId>,
}

/// Group join rows by article, deduplicating tags and ordering newest first.
#[must_use]
pub fn group_article_rows<I>(rows: I) -> Vec<Article>
where
    I: IntoIterator<Item = ArticleTagRow>,
{
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<ArticleId, usize> = HashMap::new();

    for row in rows {
        let tag = row.tag();

        let slot = match index.get(&row.id) {
            Some(&slot) => slot,
            None => {
                let slot = groups.len();
                index.insert(row.id, slot);
                groups.push(Group {
                    article: Article {
                        id: row.id,
                        title: row.title,
                        body: row.body,
                        author: row.author,
                        url: row.url,
                        created_at: row.created_at,
                        tags: Vec::new(),
                    },
                    seen_tags: HashSet::new(),
                });
                slot
            }
        };

        if let (Some(tag), Some(group)) = (tag, groups.get_mut(slot))
            && group.seen_tags.insert(tag.id)
        {
            group.article.tags.push(tag);
        }
    }

    let mut articles: Vec<Article> = groups.into_iter().map(|g| g.article).collect();
    sort_newest_first(&mut articles);
    articles
}

/// Stable sort by creation time descending, then ID descending.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()
    }

    fn row(id: i32, hour: u32, tag: Option<(i32, &str)>) -> ArticleTagRow {
        ArticleTagRow {
            id: ArticleId::new(id),
            title: format!("article {id}"),
            body: "body".to_owned(),
            author: "desk".to_owned(),
            url: None,
            created_at: at(hour),
            tag_id: tag.map(|(t, _)| TagId::new(t)),
            tag_name: tag.map(|(_, n)| n.to_owned()),
        }
    }

    fn tag_ids(article: &Article) -> Vec<i32> {
        article.tags.iter().map(|t| t.id.as_i32()).collect()
    }

    #[test]
    fn test_untagged_and_tagged_articles() {
        // Article 1 has no tags, article 2 has sports and tech.
        let rows = vec![
            row(2, 10, Some((1, "sports"))),
            row(2, 10, Some((2, "tech"))),
            row(1, 9, None),
        ];

        let articles = group_article_rows(rows);

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].id, ArticleId::new(2));
        assert_eq!(tag_ids(&articles[0]), vec![1, 2]);
        assert_eq!(articles[1].id, ArticleId::new(1));
        assert!(articles[1].tags.is_empty());
    }

    #[test]
    fn test_duplicate_tag_rows_collapse() {
        // The same (article, tag) pair reached through two favorite paths.
        let rows = vec![
            row(5, 8, Some((3, "world"))),
            row(5, 8, Some((3, "world"))),
            row(5, 8, Some((4, "politics"))),
            row(5, 8, Some((3, "world"))),
        ];

        let articles = group_article_rows(rows);

        assert_eq!(articles.len(), 1);
        assert_eq!(tag_ids(&articles[0]), vec![3, 4]);
    }

    #[test]
    fn test_unsorted_input_is_reordered_newest_first() {
        let rows = vec![
            row(1, 1, Some((1, "a"))),
            row(3, 3, Some((1, "a"))),
            row(2, 2, None),
            row(1, 1, Some((2, "b"))),
            row(3, 3, Some((2, "b"))),
        ];

        let articles = group_article_rows(rows);

        let ids: Vec<i32> = articles.iter().map(|a| a.id.as_i32()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(tag_ids(&articles[0]), vec![1, 2]);
        assert_eq!(tag_ids(&articles[2]), vec![1, 2]);
    }

    #[test]
    fn test_same_timestamp_breaks_ties_by_id() {
        let rows = vec![row(1, 5, None), row(7, 5, None), row(4, 5, None)];

        let ids: Vec<i32> = group_article_rows(rows)
            .iter()
            .map(|a| a.id.as_i32())
            .collect();
        assert_eq!(ids, vec![7, 4, 1]);
    }

    #[test]
    fn test_row_order_does_not_change_result() {
        let forward = vec![
            row(1, 1, Some((1, "a"))),
            row(1, 1, Some((2, "b"))),
            row(2, 2, Some((2, "b"))),
            row(3, 3, None),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let a = group_article_rows(forward);
        let mut b = group_article_rows(backward);

        // Tag order inside a group follows first-seen order; compare as sets.
        for article in &mut b {
            article.tags.sort_by_key(|t| t.id);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_article_rows(Vec::new()).is_empty());
    }
}
