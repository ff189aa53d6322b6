//! Makes post slugs, and with them output file names, unique.

use crate::post::Post;
use std::collections::HashSet;

/// Rewrites slugs in place so that no two posts share one. `posts` is walked
/// in order (callers pass it oldest first), so the earliest post keeps a
/// contested slug and later ones become `{slug}-1`, `{slug}-2`, ..., taking
/// the first suffix nobody has claimed yet.
///
/// A suffixed slug can take a name that a later post carries natively
/// (`a`, `a`, `a-1` becomes `a`, `a-1`, `a-1-1`).
pub fn dedup_slugs(posts: &mut [Post]) {
    let mut claimed: HashSet<String> = HashSet::with_capacity(posts.len());
    for post in posts.iter_mut() {
        if claimed.contains(&post.slug) {
            let alternative = (1u64..)
                .map(|i| format!("{}-{}", post.slug, i))
                .find(|candidate| !claimed.contains(candidate))
                .unwrap_or_default();
            tracing::debug!(from = %post.slug, to = %alternative, "renamed duplicate slug");
            post.slug = alternative;
        }
        claimed.insert(post.slug.clone());
    }
}
