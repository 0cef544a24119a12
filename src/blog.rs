//! Derives blog post dates, slugs, and URLs from post identifiers and orders
//! posts newest first. The same ordering feeds both the listing pages and the
//! feed (see [`newest_first`]).

use chrono::{Local, NaiveDate};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})-(.+)$").unwrap()
});

const FALLBACK_YEAR: &str = "2024";
const FALLBACK_MONTH: &str = "01";
const FALLBACK_DAY: &str = "01";

/// The date and slug of a blog post, derived from its identifier (the file
/// name without extension, e.g. `2024-06-20-version-4-0-released`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlogIdentity {
    pub date: NaiveDate,

    /// Zero-padded date components, exactly as they appear in the identifier.
    pub year: String,
    pub month: String,
    pub day: String,

    pub slug: String,

    /// Set when the identifier didn't carry a usable date and `date` is
    /// today's. Such posts sort as the newest.
    pub fallback: bool,
}

impl BlogIdentity {
    /// Derives the identity of the post named `id`. This never fails:
    /// identifiers that don't match `YYYY-MM-DD-<slug>` get the fixed
    /// `2024/01/01` components, today's date, and the whole identifier as
    /// slug.
    pub fn derive(id: &str) -> BlogIdentity {
        BlogIdentity::derive_on(id, Local::now().naive_local().date())
    }

    /// Like [`BlogIdentity::derive`] with `today` standing in for the current
    /// date.
    pub fn derive_on(id: &str, today: NaiveDate) -> BlogIdentity {
        let captures = match IDENTIFIER.captures(id) {
            Some(captures) => captures,
            None => {
                return BlogIdentity {
                    date: today,
                    year: FALLBACK_YEAR.to_owned(),
                    month: FALLBACK_MONTH.to_owned(),
                    day: FALLBACK_DAY.to_owned(),
                    slug: id.to_owned(),
                    fallback: true,
                }
            }
        };

        let year = captures[1].to_owned();
        let month = captures[2].to_owned();
        let day = captures[3].to_owned();
        let date = NaiveDate::parse_from_str(&format!("{}-{}-{}", year, month, day), "%Y-%m-%d");
        BlogIdentity {
            fallback: date.is_err(),
            date: date.unwrap_or(today),
            year,
            month,
            day,
            slug: captures[4].to_owned(),
        }
    }

    /// The site-relative URL of the post: `/blog/{year}/{month}/{day}/{slug}/`.
    pub fn url(&self) -> String {
        format!(
            "/blog/{}/{}/{}/{}/",
            self.year, self.month, self.day, self.slug
        )
    }
}

/// A migrated blog post as loaded from the blog collection.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The post's identifier: its path relative to the collection root,
    /// without extension.
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub draft: bool,
    pub identity: BlogIdentity,
}

/// Orders posts newest first. Both the listing and the feed sort with this
/// comparator so they can't disagree.
pub fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.identity.date.cmp(&a.identity.date)
}

/// Sorts `posts` newest first. The sort is stable: posts with the same date
/// keep their relative order.
pub fn sequence(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(newest_first);
    posts
}

/// One page of the blog listing.
#[derive(Debug, PartialEq)]
pub struct ListingPage<'a> {
    /// Zero-based page number.
    pub number: usize,
    pub url: String,
    pub posts: &'a [Post],
    pub prev: Option<String>,
    pub next: Option<String>,
}

/// Splits already-sequenced `posts` into listing pages of `page_size` posts.
/// The first page lives at `/blog/`, later ones at `/blog/{n}/` counting from
/// two.
pub fn paginate(posts: &[Post], page_size: usize) -> Vec<ListingPage<'_>> {
    let page_size = page_size.max(1);
    let total_pages = posts.chunks(page_size).len();
    posts
        .chunks(page_size)
        .enumerate()
        .map(|(i, chunk)| ListingPage {
            number: i,
            url: listing_url(i),
            posts: chunk,
            prev: match i {
                0 => None,
                _ => Some(listing_url(i - 1)),
            },
            next: match i + 1 < total_pages {
                false => None,
                true => Some(listing_url(i + 1)),
            },
        })
        .collect()
}

fn listing_url(page: usize) -> String {
    match page {
        0 => String::from("/blog/"),
        _ => format!("/blog/{}/", page + 1),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    fn post(id: &str) -> Post {
        Post {
            id: id.to_owned(),
            title: id.to_owned(),
            author: String::from("nick"),
            description: None,
            image: None,
            draft: false,
            identity: BlogIdentity::derive_on(id, today()),
        }
    }

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_derive() {
        let identity = BlogIdentity::derive_on("2024-06-20-version-4-0-released", today());
        assert_eq!(
            BlogIdentity {
                date: NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
                year: String::from("2024"),
                month: String::from("06"),
                day: String::from("20"),
                slug: String::from("version-4-0-released"),
                fallback: false,
            },
            identity
        );
        assert_eq!("/blog/2024/06/20/version-4-0-released/", identity.url());
    }

    #[test]
    fn test_derive_older_post() {
        let identity = BlogIdentity::derive_on("2013-10-16-version-0-2-0-released", today());
        assert_eq!(NaiveDate::from_ymd_opt(2013, 10, 16).unwrap(), identity.date);
        assert_eq!("/blog/2013/10/16/version-0-2-0-released/", identity.url());
    }

    #[test]
    fn test_derive_fallback() {
        for _ in 0..2 {
            let identity = BlogIdentity::derive_on("invalid-filename", today());
            assert_eq!("2024", identity.year);
            assert_eq!("01", identity.month);
            assert_eq!("01", identity.day);
            assert_eq!("invalid-filename", identity.slug);
            assert_eq!(today(), identity.date);
            assert!(identity.fallback);
        }
    }

    #[test]
    fn test_derive_uses_current_date_for_fallback() {
        let before = Local::now().naive_local().date();
        let identity = BlogIdentity::derive("welcome");
        let after = Local::now().naive_local().date();
        assert!(before <= identity.date && identity.date <= after);
    }

    #[test]
    fn test_derive_impossible_date() {
        let identity = BlogIdentity::derive_on("2024-13-45-broken", today());
        assert_eq!("/blog/2024/13/45/broken/", identity.url());
        assert_eq!(today(), identity.date);
        assert!(identity.fallback);
    }

    #[test]
    fn test_sequence() {
        let posts = sequence(vec![
            post("2013-10-16-old"),
            post("2024-06-20-first"),
            post("undated"),
            post("2024-06-20-second"),
        ]);
        assert_eq!(
            vec!["undated", "2024-06-20-first", "2024-06-20-second", "2013-10-16-old"],
            ids(&posts)
        );
    }

    #[test]
    fn test_sequence_is_stable() {
        let posts = sequence(vec![post("2020-01-01-b"), post("2020-01-01-a")]);
        assert_eq!(vec!["2020-01-01-b", "2020-01-01-a"], ids(&posts));
    }

    #[test]
    fn test_paginate() {
        let posts: Vec<Post> = (1..=5).map(|d| post(&format!("2020-01-0{}-p", d))).collect();
        let pages = paginate(&posts, 2);
        assert_eq!(3, pages.len());

        assert_eq!("/blog/", pages[0].url);
        assert_eq!(None, pages[0].prev);
        assert_eq!(Some(String::from("/blog/2/")), pages[0].next);

        assert_eq!("/blog/2/", pages[1].url);
        assert_eq!(Some(String::from("/blog/")), pages[1].prev);
        assert_eq!(Some(String::from("/blog/3/")), pages[1].next);

        assert_eq!(1, pages[2].posts.len());
        assert_eq!(Some(String::from("/blog/2/")), pages[2].prev);
        assert_eq!(None, pages[2].next);
    }

    #[test]
    fn test_paginate_empty() {
        assert!(paginate(&[], 10).is_empty());
    }

    #[test]
    fn test_paginate_huge_page_size() {
        let posts = vec![post("2020-01-02-b"), post("2020-01-01-a")];
        let pages = paginate(&posts, usize::MAX);
        assert_eq!(1, pages.len());
        assert_eq!(2, pages[0].posts.len());
        assert_eq!(None, pages[0].next);
    }
}
