#![forbid(unsafe_code)]
//! Lightweight internationalization toolkit for Rust.
//!
//! Translations live in YAML (or JSON) documents shaped as trees: `+name`
//! keys open sections, plain keys hold one text per locale code, and `$name`
//! keys declare variables usable from `{name}` placeholders.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tie::Tie;
//!
//! let tie = Tie::builder()
//!     .default_locale("en")
//!     .open(["locales/base.yaml", "locales/menu.yaml"])?;
//!
//! let open = tie.get("menu")?.get("open")?;
//! println!("{}", open.set_locale(Some("fr"))?.render()?);
//! println!("{}", tie.render_tree(true)?);
//! # Ok::<(), tie::Error>(())
//! ```
//!
//! # Document layout
//!
//! ```yaml
//! tie:
//!   version: 0.1.0
//!   default_locale: en
//!   merge_conflict: raise
//!   section: app
//! $import: [common.yaml]
//! $brand: Tie
//! +menu:
//!   open:
//!     en: Open {brand}
//!     fr: Ouvrir {brand}
//! ```
//!
//! # Features
//!
//! - Locale matching from exact code down to language-family fallback
//! - `$import` directives resolved relative to the importing document, with cycle detection
//! - Deep merging under `raise`, `override` or `ignore` conflict policies
//! - Immutable, cheaply cloned [`Node`] handles for navigation and rendering

pub mod builder;
pub mod error;
pub mod formats;
pub mod instance;
pub mod loader;
pub mod locale;
pub mod node;
mod render;
pub mod template;
pub mod traits;
mod tree;
pub mod types;
pub mod version;

// Re-export most used types for easy consumption
pub use crate::{
    builder::TieBuilder,
    error::{Error, Result},
    formats::FormatType,
    instance::Tie,
    loader::{LoadOptions, Loader},
    node::{Node, RenderSettings},
    types::{ConflictStrategy, Mode},
    version::Version,
};
