// src/analyst/collaborator.rs

use crate::error::AnalystError;
use crate::types::{Action, MarketState, Recommendation, SignalSource};
use crossbeam_channel::RecvTimeoutError;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// What the live analyst is shown each step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub step: u64,
    /// The bounded window of most recent prices, oldest first.
    pub prices: Vec<f64>,
    pub last_return: f64,
    /// Standard deviation of the window's log returns (0 with fewer than two).
    pub realized_volatility: f64,
}

impl AnalysisRequest {
    pub fn from_state(state: &MarketState, window: usize) -> Self {
        let prices = state.recent(window).to_vec();
        let log_returns: Vec<f64> = prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
        let realized_volatility = if log_returns.len() < 2 {
            0.0
        } else {
            log_returns.iter().std_dev()
        };
        Self {
            step: state.step(),
            prices,
            last_return: state.last_return(),
            realized_volatility,
        }
    }

    pub fn prompt(&self) -> String {
        let prices = self
            .prices
            .iter()
            .map(|p| format!("{p:.2}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "You advise investors trading a single asset.\n\
             Step: {}\n\
             Recent prices (oldest first): [{}]\n\
             Last log return: {:.5}\n\
             Realized volatility per step: {:.5}\n\n\
             Decide whether investors should BUY, SELL or HOLD.\n\
             Respond ONLY with JSON: \
             {{\"action\": \"BUY|SELL|HOLD\", \"confidence\": <number between 0 and 1>, \"reasoning\": \"<one sentence>\"}}",
            self.step, prices, self.last_return, self.realized_volatility
        )
    }
}

/// The external analysis service, seen as a black box returning free text.
///
/// Implementations may block, but should bound their own latency (the Groq
/// client uses a request timeout). The caller stops waiting after its own
/// deadline, and while an overrunning call is still in flight no new one is
/// started.
pub trait Analyst: Send + Sync {
    fn name(&self) -> &str;

    fn analyze(&self, request: &AnalysisRequest) -> Result<String, AnalystError>;
}

#[derive(Debug, Deserialize)]
struct RawSignal {
    action: String,
    confidence: serde_json::Value,
    #[serde(default, alias = "reasoning")]
    rationale: Option<String>,
}

/// Parses an analyst answer into a live recommendation.
///
/// The JSON object may be surrounded by prose or a code fence. The action is
/// case-insensitive; the confidence may be a number or a numeric string but
/// must land in `[0, 1]`.
pub fn parse_response(text: &str) -> Result<Recommendation, AnalystError> {
    let json = extract_json_object(text)
        .ok_or_else(|| AnalystError::malformed("no JSON object in response"))?;
    let raw: RawSignal =
        serde_json::from_str(json).map_err(|e| AnalystError::malformed(e.to_string()))?;

    let action: Action = raw.action.parse().map_err(AnalystError::malformed)?;
    let confidence = match &raw.confidence {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| AnalystError::malformed(format!("confidence `{}` is not a number", raw.confidence)))?;
    if !(confidence.is_finite() && (0.0..=1.0).contains(&confidence)) {
        return Err(AnalystError::malformed(format!(
            "confidence {confidence} outside [0, 1]"
        )));
    }

    let recommendation = Recommendation::new(action, confidence, SignalSource::Live);
    Ok(match raw.rationale {
        Some(text) if !text.trim().is_empty() => recommendation.with_rationale(text),
        _ => recommendation,
    })
}

fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// An analyst plus the deadline it must answer within.
#[derive(Clone)]
pub struct LiveAnalyst {
    analyst: Arc<dyn Analyst>,
    timeout: Duration,
    in_flight: Arc<AtomicBool>,
}

// Clears the in-flight flag when the worker finishes, panics included.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl LiveAnalyst {
    pub fn new(analyst: Arc<dyn Analyst>, timeout: Duration) -> Self {
        Self {
            analyst,
            timeout,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn name(&self) -> &str {
        self.analyst.name()
    }

    /// Whether an earlier call that overran its deadline is still running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Runs the call on a worker thread and waits at most `timeout` for it.
    ///
    /// A worker that overruns is left to finish on its own and its late answer
    /// is dropped with the channel. Until it does, further calls fail fast with
    /// `Unavailable` instead of starting another worker.
    pub fn recommend(&self, request: AnalysisRequest) -> Result<Recommendation, AnalystError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AnalystError::Unavailable(
                "previous analyst call still running".into(),
            ));
        }

        let (tx, rx) = crossbeam_channel::bounded(1);
        let analyst = Arc::clone(&self.analyst);
        let guard = InFlight(Arc::clone(&self.in_flight));
        thread::Builder::new()
            .name("live-analyst".into())
            .spawn(move || {
                let answer = analyst.analyze(&request);
                drop(guard);
                let _ = tx.send(answer);
            })
            .map_err(|e| AnalystError::Unavailable(format!("could not start analyst worker: {e}")))?;

        match rx.recv_timeout(self.timeout) {
            Ok(answer) => parse_response(&answer?),
            Err(RecvTimeoutError::Timeout) => Err(AnalystError::Timeout(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(AnalystError::Unavailable(
                "analyst worker exited without answering".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(Result<String, AnalystError>);

    impl Analyst for Canned {
        fn name(&self) -> &str {
            "canned"
        }
        fn analyze(&self, _request: &AnalysisRequest) -> Result<String, AnalystError> {
            self.0.clone()
        }
    }

    struct Sleepy(Duration);

    impl Analyst for Sleepy {
        fn name(&self) -> &str {
            "sleepy"
        }
        fn analyze(&self, _request: &AnalysisRequest) -> Result<String, AnalystError> {
            thread::sleep(self.0);
            Ok(r#"{"action":"BUY","confidence":1.0}"#.into())
        }
    }

    struct Panicky;

    impl Analyst for Panicky {
        fn name(&self) -> &str {
            "panicky"
        }
        fn analyze(&self, _request: &AnalysisRequest) -> Result<String, AnalystError> {
            panic!("analyst blew up")
        }
    }

    fn request() -> AnalysisRequest {
        let mut state = MarketState::new(100.0);
        for p in [101.0, 102.0, 100.0] {
            state.record_price(p);
        }
        AnalysisRequest::from_state(&state, 30)
    }

    #[test]
    fn parses_plain_json() {
        let rec =
            parse_response(r#"{"action": "SELL", "confidence": 0.7, "reasoning": "overbought"}"#)
                .unwrap();
        assert_eq!(rec.action(), Action::Sell);
        assert_eq!(rec.confidence(), 0.7);
        assert_eq!(rec.rationale(), Some("overbought"));
        assert_eq!(rec.source(), SignalSource::Live);
    }

    #[test]
    fn parses_fenced_json_with_string_confidence() {
        let text = "Sure!\n```json\n{\"action\": \"buy\", \"confidence\": \"0.25\", \"rationale\": \"dip\"}\n```";
        let rec = parse_response(text).unwrap();
        assert_eq!(rec.action(), Action::Buy);
        assert_eq!(rec.confidence(), 0.25);
        assert_eq!(rec.rationale(), Some("dip"));
    }

    #[test]
    fn rejects_malformed_answers() {
        for text in [
            "I think you should buy.",
            r#"{"action": "YOLO", "confidence": 0.5}"#,
            r#"{"action": "BUY", "confidence": 1.5}"#,
            r#"{"action": "BUY", "confidence": "lots"}"#,
            r#"{"action": "BUY"}"#,
            r#"{"action": "BUY", "confidence": 0.5"#,
        ] {
            assert!(
                matches!(parse_response(text), Err(AnalystError::Malformed { .. })),
                "accepted: {text}"
            );
        }
    }

    #[test]
    fn request_carries_window_and_volatility() {
        let req = request();
        assert_eq!(req.step, 3);
        assert_eq!(req.prices, vec![101.0, 102.0, 100.0]);
        assert!((req.last_return - (100.0f64 / 102.0).ln()).abs() < 1e-12);
        assert!(req.realized_volatility > 0.0);
        assert!(req.prompt().contains("[101.00, 102.00, 100.00]"));
    }

    #[test]
    fn live_answer_is_parsed() {
        let live = LiveAnalyst::new(
            Arc::new(Canned(Ok(r#"{"action":"HOLD","confidence":0.4}"#.into()))),
            Duration::from_secs(1),
        );
        let rec = live.recommend(request()).unwrap();
        assert_eq!(rec.action(), Action::Hold);
        assert_eq!(rec.confidence(), 0.4);
    }

    #[test]
    fn analyst_errors_pass_through() {
        let live = LiveAnalyst::new(
            Arc::new(Canned(Err(AnalystError::MissingCredential("KEY")))),
            Duration::from_secs(1),
        );
        assert!(matches!(
            live.recommend(request()),
            Err(AnalystError::MissingCredential("KEY"))
        ));
    }

    #[test]
    fn slow_analyst_times_out() {
        let live = LiveAnalyst::new(
            Arc::new(Sleepy(Duration::from_millis(500))),
            Duration::from_millis(20),
        );
        assert!(matches!(live.recommend(request()), Err(AnalystError::Timeout(_))));
    }

    #[test]
    fn overrunning_call_blocks_new_workers_until_it_finishes() {
        let live = LiveAnalyst::new(
            Arc::new(Sleepy(Duration::from_millis(200))),
            Duration::from_millis(20),
        );

        assert!(matches!(live.recommend(request()), Err(AnalystError::Timeout(_))));
        assert!(live.is_busy());
        assert!(matches!(
            live.recommend(request()),
            Err(AnalystError::Unavailable(_))
        ));

        thread::sleep(Duration::from_millis(400));
        assert!(!live.is_busy());
        assert!(matches!(live.recommend(request()), Err(AnalystError::Timeout(_))));
    }

    #[test]
    fn answered_call_frees_the_worker_slot() {
        let live = LiveAnalyst::new(
            Arc::new(Canned(Ok(r#"{"action":"BUY","confidence":0.3}"#.into()))),
            Duration::from_secs(1),
        );
        for _ in 0..3 {
            assert_eq!(live.recommend(request()).unwrap().action(), Action::Buy);
        }
    }

    #[test]
    fn panicking_analyst_is_unavailable() {
        let live = LiveAnalyst::new(Arc::new(Panicky), Duration::from_secs(1));
        assert!(matches!(
            live.recommend(request()),
            Err(AnalystError::Unavailable(_))
        ));
    }
}
