//! Slate runtime: fetch stats, score picks, filter, summarise, explain.

pub mod slate;

pub use slate::{explain_top, PickFilter, Slate, SlateService, SlateSummary};
