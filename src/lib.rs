//! # class-depend
//!
//! Package dependency metrics and cycle reports computed from compiled Java
//! class files.
//!
//! ## Architecture
//!
//! - **reader**: Big-endian byte cursor and modified UTF-8 decoding
//! - **constant_pool**: Tagged constant pool entries and typed lookups
//! - **descriptor**: Field/method descriptor scanning and package resolution
//! - **annotation**: `RuntimeVisibleAnnotations` walker collecting referenced packages
//! - **parse**: Class-file decoder producing a `ParsedClass` and its imported packages
//! - **filter**: Package filter patterns (`java.*`, exact names)
//! - **package**: `JavaClass` / `JavaPackage` entities
//! - **graph**: Package arena with two-sided, insertion-ordered edges
//! - **metrics**: Coupling, abstractness, instability and distance
//! - **cycle**: Path-tracing cycle detection and reporting
//! - **analyzer**: Groups classes into packages or components and wires edges
//! - **constraint**: Expected-graph constraints checked against an analysis
//! - **scan**: Directory/archive discovery and class file name acceptance
//! - **catalog**: Class bytes from files and memory-mapped archives
//! - **pipeline**: Parallel decoding feeding a single graph writer
//! - **config**: Property-file configuration
//! - **report**: Text and JSON reports
//! - **logging**: `tracing` subscriber setup

pub mod analyzer;
pub mod annotation;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod constant_pool;
pub mod constraint;
pub mod cycle;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod graph;
pub mod logging;
pub mod metrics;
pub mod package;
pub mod parse;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod scan;
