#![forbid(unsafe_code)]

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod docs;
pub mod export;
pub mod fetch;
pub mod formats;
pub mod frontmatter;
pub mod highlight;
pub mod logging;
pub mod render;
pub mod sanitize;
pub mod toc;
