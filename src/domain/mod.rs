//! Domain layer - pricing math and pool risk scoring

pub mod pricing;
pub mod risk;
