#![doc = "tree-to-pdf-core: layout engine and document assembly for tree-to-pdf."]

//! This crate contains the pagination engine, font metrics, PDF page emission
//! and the pipeline that turns a directory tree into one PDF document.
//! The CLI crate only parses arguments and configuration and calls into
//! [`compile::compile_folder`].
//!
//! # Layout
//! - [`paginate`]: greedy word-wrap and page flushing, independent of any PDF library
//! - [`metrics`]: text measurement for the builtin Helvetica face
//! - [`render`]: printpdf-backed page emission (content, title, image and footer pages)
//! - [`collect`], [`preprocess`], [`compile`]: directory walk, per-file preparation, assembly

pub mod collect;
pub mod compile;
pub mod config;
pub mod contract;
pub mod metrics;
pub mod paginate;
pub mod preprocess;
pub mod render;
