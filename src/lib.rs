//! The library code for the `smolblog` static blog generator. A build runs
//! once, start to finish, and either produces the whole site or fails:
//!
//! 1. Loading the [`config::Config`]
//! 2. Parsing posts from source files on disk ([`crate::parser`]), which
//!    resolves each post's slug and timestamps ([`crate::identity`]) and
//!    renders its Markdown ([`crate::markdown`])
//! 3. Deduplicating slugs ([`crate::dedup`])
//! 4. Writing the post pages, the index, the sitemap and the RSS feed
//!    ([`crate::post`], [`crate::listing`], [`crate::feed`]) through the page
//!    template ([`crate::write`])
//!
//! Post titles, excerpts and descriptions are not stored but derived from the
//! rendered HTML whenever they are needed ([`crate::derive`]).

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod assets;
pub mod build;
pub mod config;
pub mod dedup;
pub mod derive;
pub mod feed;
pub mod identity;
pub mod listing;
pub mod markdown;
pub mod parser;
pub mod post;
pub mod write;
