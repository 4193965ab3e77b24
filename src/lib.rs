//! Astro Guide — conversational birth-chart assistant core.

pub mod advice;
pub mod chart;
pub mod config;
pub mod engine;
pub mod error;
pub mod llm;
pub mod model;
pub mod parsers;
pub mod store;
