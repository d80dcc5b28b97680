// src/analyst/mod.rs

pub mod adapter;
pub mod collaborator;
pub mod groq;
pub mod moving_average;

pub use adapter::RecommendationAdapter;
pub use collaborator::{AnalysisRequest, Analyst, LiveAnalyst, parse_response};
pub use groq::GroqAnalyst;
pub use moving_average::MovingAverageRule;
