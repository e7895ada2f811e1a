//! noirfeed library
//!
//! Fetches the best Hacker News stories through an on-disk cache, illustrates
//! each one with a generated image and assembles the JSON feed document.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod feed;
pub mod images;
