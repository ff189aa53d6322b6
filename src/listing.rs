//! Composes the listing pages, the index and the sitemap, from a post
//! collection ordered most recent first. See [`crate::feed`] for the third
//! listing, the RSS feed.

use crate::derive;
use crate::post::Post;
use crate::write::{Metadata, Result, Writer};
use url::Url;

/// The number of posts on the index page and in the feed.
pub const RECENT_POSTS: usize = 10;

/// The `RECENT_POSTS` most recent posts of a collection ordered most recent
/// first.
pub fn recent(posts: &[Post]) -> &[Post] {
    &posts[..posts.len().min(RECENT_POSTS)]
}

/// The index page body: the shortened HTML of each recent post with a
/// permalink in its heading, each wrapped in an `<article>`.
pub fn index(posts: &[Post]) -> String {
    recent(posts)
        .iter()
        .map(|post| {
            format!(
                "<article>{}</article>",
                derive::inject_permalink(&post.shortened_html(), &post.output_file_name())
            )
        })
        .collect()
}

/// The sitemap page body: every post as a list item, grouped under a month
/// header whenever a post's creation month differs from the previous one's.
/// Posts must be ordered by creation time for the grouping to make sense.
pub fn sitemap(posts: &[Post]) -> String {
    let mut items = String::new();
    let mut current_month = String::new();
    for post in posts {
        let month = post.creation_time().format("%b %Y").to_string();
        if month != current_month {
            if !current_month.is_empty() {
                items.push_str("</ul>");
            }
            items.push_str(&format!("<h2>{}</h2><ul>", month));
            current_month = month;
        }
        items.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>",
            post.output_file_name(),
            post.title()
        ));
    }
    if !current_month.is_empty() {
        items.push_str("</ul>");
    }
    format!("<section class=\"sitemap\">{}</section>", items)
}

/// Writes `index.html`.
pub fn write_index(writer: &Writer, posts: &[Post], target_url: &Url) -> Result<()> {
    let mut metadata = Metadata::new();
    metadata.insert("og:title".to_owned(), writer.page_name.to_owned());
    metadata.insert("og:type".to_owned(), "website".to_owned());
    metadata.insert("og:url".to_owned(), target_url.to_string());
    writer.write("index.html", "", &index(posts), &metadata)?;
    tracing::info!(posts = recent(posts).len(), "wrote index");
    Ok(())
}

/// Writes `sitemap.html`.
pub fn write_sitemap(writer: &Writer, posts: &[Post]) -> Result<()> {
    writer.write("sitemap.html", "Article list", &sitemap(posts), &Metadata::new())?;
    tracing::info!(posts = posts.len(), "wrote sitemap");
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::test::post;

    // 2023-01-15, 2023-01-02, 2023-02-10
    const JAN_15: u64 = 1673740800;
    const JAN_02: u64 = 1672617600;
    const FEB_10: u64 = 1675987200;

    fn many(count: usize) -> Vec<Post> {
        (0..count)
            .rev()
            .map(|i| post(&format!("p{}", i), i as u64, &format!("# Post {}", i)))
            .collect()
    }

    #[test]
    fn test_index_caps_at_ten() {
        for &count in &[0usize, 1, 10, 11, 25] {
            let posts = many(count);
            let html = index(&posts);
            assert_eq!(html.matches("<article>").count(), count.min(RECENT_POSTS));
        }
    }

    #[test]
    fn test_index_keeps_given_order() {
        let posts = many(3);
        let html = index(&posts);
        let p2 = html.find("Post 2").unwrap();
        let p1 = html.find("Post 1").unwrap();
        let p0 = html.find("Post 0").unwrap();
        assert!(p2 < p1 && p1 < p0, "{}", html);
    }

    #[test]
    fn test_index_article_markup() {
        let posts = vec![post("hello", 0, "# Hello\n\nIntro.\n\n## More\n\nBody.")];
        assert_eq!(
            index(&posts),
            "<article><h1><a href=\"posts/hello.html\" title=\"Permalink\">[l]</a> Hello</h1>\n\
             <p>Intro.</p>\n<p class=\"more\"><a href=\"posts/hello.html\">Read more...</a></p>\
             </article>"
        );
    }

    #[test]
    fn test_index_empty() {
        assert_eq!(index(&[]), "");
    }

    #[test]
    fn test_sitemap_groups_by_month() {
        let posts = vec![
            post("feb", FEB_10, "# February"),
            post("late-jan", JAN_15, "# Late January"),
            post("early-jan", JAN_02, ""),
        ];
        assert_eq!(
            sitemap(&posts),
            "<section class=\"sitemap\">\
             <h2>Feb 2023</h2><ul><li><a href=\"posts/feb.html\">February</a></li></ul>\
             <h2>Jan 2023</h2><ul><li><a href=\"posts/late-jan.html\">Late January</a></li>\
             <li><a href=\"posts/early-jan.html\">early-jan</a></li></ul>\
             </section>"
        );
    }

    #[test]
    fn test_sitemap_ascending_input() {
        let posts = vec![
            post("a", JAN_02, ""),
            post("b", JAN_15, ""),
            post("c", FEB_10, ""),
        ];
        let html = sitemap(&posts);
        assert_eq!(html.matches("<h2>").count(), 2);
        assert!(html.find("Jan 2023").unwrap() < html.find("Feb 2023").unwrap());
    }

    #[test]
    fn test_sitemap_empty() {
        assert_eq!(sitemap(&[]), "<section class=\"sitemap\"></section>");
    }
}
