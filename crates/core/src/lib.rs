//! Core library for restruct
//!
//! This crate implements the **Functional Core** of restruct: it turns an
//! already-extracted Span Stream (pages of blocks of lines of positioned,
//! styled text fragments) into an outline of numbered sections with their
//! body text. It performs no I/O; PDF decoding lives in the `pdf` crate and
//! file handling in the `restruct` binary (the Imperative Shell).
//!
//! # Pipeline
//!
//! ```text
//! Document ─▶ RegionFilter ─▶ HeadingMatcher ─▶ stitch_title
//!          ─▶ BoundaryValidator (is_successor + TOC) ─▶ SectionAccumulator
//!          ─▶ Vec<Section> ─▶ build_hierarchy ─▶ Vec<HierarchyNode>
//! ```
//!
//! # Module Organization
//!
//! - [`numbering`]: dotted-decimal heading numbers
//! - [`sequence`]: successor rules and the boundary decision
//! - [`toc`]: table-of-contents hints
//! - [`matcher`]: heading pattern matching on single fragments
//! - [`stitch`]: multi-fragment title reconstruction
//! - [`region`]: header/footer and hyperlink filtering
//! - [`accumulator`]: the section state machine
//! - [`hierarchy`]: flat list to tree
//! - [`extract`]: the driver tying the above together
//!
//! # Example Usage
//!
//! ```rust
//! use restruct_core::{Block, Document, ExtractOptions, Extractor, Fragment, Line, Page, Rect};
//!
//! let line = |text: &str, y: f32| {
//!     Line::new(vec![Fragment::new(text, 12.0, Rect::new(72.0, y, 300.0, y + 12.0))])
//! };
//! let page = Page::new(1, 842.0).with_block(Block::from_lines(vec![
//!     line("1 Scope", 100.0),
//!     line("This document covers...", 120.0),
//!     line("2 Terms", 140.0),
//! ]));
//!
//! let extractor = Extractor::new(ExtractOptions::default()).unwrap();
//! let sections = extractor.extract(&Document::new(vec![page]));
//!
//! assert_eq!(sections.len(), 2);
//! assert_eq!(sections[0].title, "Scope");
//! assert_eq!(sections[0].content, "This document covers...\n");
//! ```

pub mod accumulator;
pub mod config;
pub mod error;
pub mod extract;
pub mod hierarchy;
pub mod matcher;
pub mod numbering;
pub mod region;
pub mod sequence;
pub mod stitch;
pub mod toc;
pub mod types;

pub use config::{ExtractOptions, PageRange};
pub use error::ConfigError;
pub use extract::{extract_hierarchy, extract_sections, Extractor};
pub use hierarchy::{build_hierarchy, flatten, HierarchyNode};
pub use numbering::{numbering_level, parse_numbering, MalformedNumbering, Numbering};
pub use sequence::{is_successor, is_successor_with, BoundaryValidator, SequencePolicy};
pub use toc::{TocEntry, TocHint};
pub use types::*;
