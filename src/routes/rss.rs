/**
 * RSS Feed
 * RSS 2.0 document of the newest posts
 */
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use crate::config::SiteConfig;
use crate::db::models::BlogPost;
use crate::error::AppError;
use crate::state::AppState;

/// Items in the feed.
const FEED_POSTS: i64 = 50;

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn rfc822(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

/// Render the channel for `posts`, newest first.
pub fn render_feed(site: &SiteConfig, posts: &[BlogPost]) -> String {
    let mut items = String::new();
    for post in posts {
        let post_url = format!("{}/post/{}", site.url, post.id);
        items.push_str(&format!(
            "    <item>\n\
                   <title>{}</title>\n\
                   <link>{}</link>\n\
                   <description>{}</description>\n\
                   <pubDate>{}</pubDate>\n\
                   <guid isPermaLink=\"true\">{}</guid>\n\
                 </item>\n",
            escape_xml(&post.title),
            escape_xml(&post_url),
            escape_xml(&post.lead),
            rfc822(&post.created),
            escape_xml(&post_url),
        ));
    }

    let feed_url = format!("{}/feed", site.url);
    let blog_url = format!("{}/post", site.url);

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>{}</title>
    <link>{}</link>
    <description>{}</description>
    <language>en-us</language>
    <atom:link href="{}" rel="self" type="application/rss+xml"/>
    <lastBuildDate>{}</lastBuildDate>
{}  </channel>
</rss>"#,
        escape_xml(&site.title),
        escape_xml(&blog_url),
        escape_xml(&site.description),
        escape_xml(&feed_url),
        posts.first().map(|p| rfc822(&p.last_update)).unwrap_or_default(),
        items,
    )
}

/// GET /feed
pub async fn feed(State(state): State<AppState>) -> Result<Response, AppError> {
    let posts = state.models().posts.latest(FEED_POSTS).await?;
    let xml = render_feed(&state.config().site, &posts);

    Ok((
        [
            (header::CONTENT_TYPE, "application/rss+xml; charset=utf-8"),
            (
                header::CACHE_CONTROL,
                "public, max-age=3600, stale-while-revalidate=600",
            ),
        ],
        xml,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn site() -> SiteConfig {
        SiteConfig {
            url: "https://blog.example".to_string(),
            title: "Tom & Jerry".to_string(),
            description: "Latest posts".to_string(),
        }
    }

    fn post(id: i64, title: &str) -> BlogPost {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        BlogPost {
            id,
            title: title.to_string(),
            lead: "lead".to_string(),
            post: "body".to_string(),
            created: dt,
            last_update: dt,
        }
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<title>"), "&lt;title&gt;");
        assert_eq!(escape_xml("\"quote\""), "&quot;quote&quot;");
    }

    #[test]
    fn test_rfc822_format() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(rfc822(&dt), "Mon, 15 Jan 2024 12:00:00 +0000");
    }

    #[test]
    fn test_feed_lists_posts_with_links() {
        let xml = render_feed(&site(), &[post(2, "Second <post>"), post(1, "First")]);

        assert!(xml.contains("<title>Tom &amp; Jerry</title>"));
        assert!(xml.contains("<link>https://blog.example/post/2</link>"));
        assert!(xml.contains("<title>Second &lt;post&gt;</title>"));
        assert_eq!(xml.matches("<item>").count(), 2);
        assert!(xml.find("/post/2").unwrap() < xml.find("/post/1").unwrap());
    }

    #[test]
    fn test_empty_feed_is_valid_channel() {
        let xml = render_feed(&site(), &[]);
        assert!(xml.contains("<lastBuildDate></lastBuildDate>"));
        assert!(!xml.contains("<item>"));
    }
}
