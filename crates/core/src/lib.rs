//! Pure domain logic for course market classification and career roadmaps.
//!
//! This crate has zero internal dependencies so the scoring engines can be
//! used by the pipeline services, the worker, and any future tooling alike.
//! Every weight and threshold lives in [`market_data::MarketDataTable`],
//! which is passed explicitly into each component.

pub mod analysis;
pub mod assessment;
pub mod career;
pub mod classifier;
pub mod course;
pub mod error;
pub mod event_types;
pub mod market_data;
pub mod roadmap;
pub mod scheduling;
pub mod similarity;
pub mod skill_gap;
pub mod transfer;
pub mod types;
