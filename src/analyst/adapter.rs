// src/analyst/adapter.rs

use super::collaborator::{AnalysisRequest, Analyst, LiveAnalyst};
use super::moving_average::MovingAverageRule;
use crate::config::SignalConfig;
use crate::types::{MarketState, Recommendation, SignalSource};
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns the market state into exactly one well-formed recommendation per step.
///
/// In live mode the analyst is asked first; any failure (timeout, bad answer,
/// missing credential, transport) is logged and replaced by the moving-average
/// rule, tagged `SignalSource::Degraded`. Nothing here can fail a step.
pub struct RecommendationAdapter {
    rule: MovingAverageRule,
    history_window: usize,
    live: Option<LiveAnalyst>,
}

impl RecommendationAdapter {
    pub fn fallback(config: &SignalConfig) -> Self {
        Self {
            rule: MovingAverageRule::from_config(config),
            history_window: config.history_window,
            live: None,
        }
    }

    pub fn live(config: &SignalConfig, analyst: Arc<dyn Analyst>) -> Self {
        Self {
            live: Some(LiveAnalyst::new(analyst, config.live_timeout())),
            ..Self::fallback(config)
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    pub fn get_signal(&self, state: &MarketState) -> Recommendation {
        let Some(live) = &self.live else {
            return self.rule.evaluate(state.history(), SignalSource::Fallback);
        };

        let request = AnalysisRequest::from_state(state, self.history_window);
        match live.recommend(request) {
            Ok(recommendation) => {
                debug!(
                    step = state.step(),
                    analyst = live.name(),
                    action = %recommendation.action(),
                    confidence = recommendation.confidence(),
                    source = %SignalSource::Live,
                    "live recommendation"
                );
                recommendation
            }
            Err(err) => {
                warn!(
                    step = state.step(),
                    analyst = live.name(),
                    source = %SignalSource::Degraded,
                    reason = %err,
                    "live analyst failed, using moving-average fallback"
                );
                let fallback = self.rule.evaluate(state.history(), SignalSource::Degraded);
                let rationale = format!(
                    "live analyst failed ({err}); {}",
                    fallback.rationale().unwrap_or_default()
                );
                fallback.with_rationale(rationale)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalystError;
    use crate::types::Action;

    struct Scripted(&'static str);

    impl Analyst for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }
        fn analyze(&self, _request: &AnalysisRequest) -> Result<String, AnalystError> {
            Ok(self.0.to_string())
        }
    }

    struct Offline;

    impl Analyst for Offline {
        fn name(&self) -> &str {
            "offline"
        }
        fn analyze(&self, _request: &AnalysisRequest) -> Result<String, AnalystError> {
            Err(AnalystError::Unavailable("no route to host".into()))
        }
    }

    fn config() -> SignalConfig {
        SignalConfig {
            short_window: 2,
            long_window: 5,
            threshold: 0.01,
            confidence_gain: 20.0,
            history_window: 10,
            live_timeout_ms: 1_000,
        }
    }

    fn state(prices: &[f64]) -> MarketState {
        let mut state = MarketState::new(100.0);
        for &p in prices {
            state.record_price(p);
        }
        state
    }

    #[test]
    fn fallback_mode_uses_crossover_rule() {
        let adapter = RecommendationAdapter::fallback(&config());
        assert!(!adapter.is_live());

        let rec = adapter.get_signal(&state(&[100.0, 101.0, 99.0, 98.0, 102.0]));
        assert_eq!(rec.action(), Action::Hold);
        assert_eq!(rec.confidence(), 0.0);
        assert_eq!(rec.source(), SignalSource::Fallback);
    }

    #[test]
    fn live_mode_returns_analyst_signal() {
        let adapter = RecommendationAdapter::live(
            &config(),
            Arc::new(Scripted(r#"{"action":"SELL","confidence":0.6,"reasoning":"top"}"#)),
        );
        let rec = adapter.get_signal(&state(&[101.0]));
        assert_eq!(rec.action(), Action::Sell);
        assert_eq!(rec.confidence(), 0.6);
        assert_eq!(rec.source(), SignalSource::Live);
    }

    #[test]
    fn failed_live_call_degrades_to_fallback() {
        let adapter = RecommendationAdapter::live(&config(), Arc::new(Offline));
        let prices = [100.0, 100.0, 100.0, 110.0, 120.0];
        let rec = adapter.get_signal(&state(&prices));

        let expected = RecommendationAdapter::fallback(&config()).get_signal(&state(&prices));
        assert_eq!(rec.source(), SignalSource::Degraded);
        assert_eq!(rec.action(), expected.action());
        assert_eq!(rec.confidence(), expected.confidence());
        assert!(rec.rationale().unwrap().contains("no route to host"));
    }

    #[test]
    fn malformed_live_answer_degrades_to_fallback() {
        let adapter =
            RecommendationAdapter::live(&config(), Arc::new(Scripted("buy buy buy!!!")));
        let rec = adapter.get_signal(&state(&[100.0]));
        assert_eq!(rec.source(), SignalSource::Degraded);
        assert_eq!(rec.action(), Action::Hold);
        assert!((0.0..=1.0).contains(&rec.confidence()));
    }
}
