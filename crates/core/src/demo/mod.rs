//! Demo data seeding.

mod demo_service;

pub use demo_service::{DemoDataService, DemoSeedResult, SAMPLE_HOLDINGS};
