//! Kiln Core Library
//!
//! Core types, metadata, configuration and error handling for the Kiln static
//! site compiler.

pub mod config;
pub mod error;
pub mod frontmatter;
pub mod item;
pub mod metadata;
pub mod rule;
pub mod site;
pub mod source;

pub use config::Config;
pub use error::{CoreError, Result};
pub use item::{Body, ContentItem};
pub use metadata::{MetaValue, Metadata};
pub use rule::{FilterOptions, Guard, LayoutRuleDecl, OutputPolicy, RuleDecl, Step};
pub use site::{PageEntry, SiteIndex};
pub use source::ItemSource;
