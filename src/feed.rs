//! Support for creating RSS feeds from a list of blog posts.

use crate::blog::Post;
use chrono::{NaiveDate, TimeZone, Utc};
use rss::validation::{Validate, ValidationError};
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use std::fmt;
use std::io::Write;
use url::Url;

/// Bundled configuration for creating a feed.
pub struct FeedConfig {
    pub title: String,
    pub description: String,

    /// The site root; item links are resolved against it.
    pub site: Url,
}

/// A single syndication item. `link` is site-relative.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedItem {
    pub title: String,
    pub pub_date: NaiveDate,

    /// The post description, or an empty string when it has none.
    pub description: String,
    pub link: String,
}

impl From<&Post> for FeedItem {
    fn from(post: &Post) -> FeedItem {
        FeedItem {
            title: post.title.clone(),
            pub_date: post.identity.date,
            description: post.description.clone().unwrap_or_default(),
            link: post.identity.url(),
        }
    }
}

/// Converts sequenced posts into feed items, preserving their order.
pub fn feed_items(posts: &[Post]) -> Vec<FeedItem> {
    posts.iter().map(FeedItem::from).collect()
}

/// Creates a feed from some configuration ([`FeedConfig`]) and a list of
/// already-sequenced [`Post`]s and writes the result to a
/// [`std::io::Write`]. The channel is validated before anything is written.
pub fn write_feed<W: Write>(config: FeedConfig, posts: &[Post], w: W) -> Result<()> {
    feed(config, posts)?.write_to(w)?;
    Ok(())
}

fn feed(config: FeedConfig, posts: &[Post]) -> Result<Channel> {
    let items = feed_items(posts)
        .into_iter()
        .map(|item| rss_item(&config.site, item))
        .collect::<Result<Vec<Item>>>()?;

    let channel = ChannelBuilder::default()
        .title(config.title)
        .link(config.site.to_string())
        .description(config.description)
        .generator(String::from("mdmigrate"))
        .items(items)
        .build();
    channel.validate()?;
    Ok(channel)
}

fn rss_item(site: &Url, item: FeedItem) -> Result<Item> {
    let link = site.join(&item.link)?.to_string();

    // Posts only carry a calendar date; publish them at midnight UTC.
    let pub_date = item
        .pub_date
        .and_hms_opt(0, 0, 0)
        .map(|midnight| Utc.from_utc_datetime(&midnight).to_rfc2822());

    Ok(ItemBuilder::default()
        .title(item.title)
        .link(link.clone())
        .guid(GuidBuilder::default().permalink(true).value(link).build())
        .description(item.description)
        .pub_date(pub_date)
        .build())
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when the feed can't be serialized or written.
    Rss(rss::Error),

    /// Returned when the assembled channel isn't valid RSS.
    Validation(ValidationError),

    /// Returned when a post link can't be resolved against the site URL.
    UrlParse(url::ParseError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Rss(err) => err.fmt(f),
            Error::Validation(err) => write!(f, "rss validation failed: {}", err),
            Error::UrlParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Rss(err) => Some(err),
            Error::Validation(err) => Some(err),
            Error::UrlParse(err) => Some(err),
        }
    }
}

impl From<rss::Error> for Error {
    /// Converts [`rss::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: rss::Error) -> Error {
        Error::Rss(err)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Error {
        Error::Validation(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::blog::{sequence, BlogIdentity};

    fn post(id: &str, title: &str, description: Option<&str>) -> Post {
        Post {
            id: id.to_owned(),
            title: title.to_owned(),
            author: String::from("nick"),
            description: description.map(String::from),
            image: None,
            draft: false,
            identity: BlogIdentity::derive(id),
        }
    }

    fn config() -> FeedConfig {
        FeedConfig {
            title: String::from("Node-RED Blog"),
            description: String::from("Low-code programming for event-driven applications"),
            site: Url::parse("https://nodered.org").unwrap(),
        }
    }

    #[test]
    fn test_feed_items() {
        let posts = sequence(vec![
            post("2013-10-16-version-0-2-0-released", "0.2.0", None),
            post("2024-06-20-version-4-0-released", "4.0", Some("Now available")),
        ]);
        assert_eq!(
            vec![
                FeedItem {
                    title: String::from("4.0"),
                    pub_date: NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
                    description: String::from("Now available"),
                    link: String::from("/blog/2024/06/20/version-4-0-released/"),
                },
                FeedItem {
                    title: String::from("0.2.0"),
                    pub_date: NaiveDate::from_ymd_opt(2013, 10, 16).unwrap(),
                    description: String::new(),
                    link: String::from("/blog/2013/10/16/version-0-2-0-released/"),
                },
            ],
            feed_items(&posts)
        );
    }

    #[test]
    fn test_write_feed() -> Result<()> {
        let posts = vec![post(
            "2024-06-20-version-4-0-released",
            "Version 4.0 released",
            None,
        )];
        let mut out = Vec::new();
        write_feed(config(), &posts, &mut out)?;
        let xml = String::from_utf8(out).unwrap();

        assert!(xml.contains("<title>Node-RED Blog</title>"), "{}", xml);
        assert!(
            xml.contains("<link>https://nodered.org/blog/2024/06/20/version-4-0-released/</link>"),
            "{}",
            xml
        );
        assert!(xml.contains("Thu, 20 Jun 2024 00:00:00 +0000"), "{}", xml);
        Ok(())
    }

    #[test]
    fn test_feed_item_order_matches_sequence() -> Result<()> {
        let posts = sequence(vec![
            post("2020-01-01-a", "A", None),
            post("2021-01-01-b", "B", None),
        ]);
        let channel = feed(config(), &posts)?;
        let titles: Vec<Option<&str>> = channel.items().iter().map(|i| i.title()).collect();
        assert_eq!(vec![Some("B"), Some("A")], titles);
        Ok(())
    }
}
