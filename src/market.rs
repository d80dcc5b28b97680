// src/market.rs

use crate::agents::action::{ActionTaken, MarketView};
use crate::agents::investor_agent::InvestorAgent;
use crate::analyst::RecommendationAdapter;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::simulators::gbm::GBMSimulator;
use crate::simulators::price_process::PriceProcess;
use crate::types::{Action, MarketState, Recommendation, SimulationRecord, Snapshot};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info};

/// This is the main simulation engine. It owns the world state (price and
/// history), the participants, and the record, and runs the per-step loop:
/// advance price, get one recommendation, activate every investor, record.
pub struct MarketModel {
    config: SimConfig,
    state: MarketState,
    process: Box<dyn PriceProcess>,
    adapter: RecommendationAdapter,
    agents: Vec<InvestorAgent>,
    record: SimulationRecord,
    signal: Option<Recommendation>,
}

impl MarketModel {
    /// Seeded GBM and the moving-average rule, straight from the config.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let adapter = RecommendationAdapter::fallback(&config.signal);
        Self::with_adapter(config, adapter)
    }

    pub fn with_adapter(config: SimConfig, adapter: RecommendationAdapter) -> Result<Self, SimError> {
        config.validate()?;
        let process = Box::new(GBMSimulator::new(&config.price));
        Self::with_parts(config, process, adapter)
    }

    /// Full control over the collaborators. The config is still validated
    /// before anything is built.
    pub fn with_parts(
        config: SimConfig,
        process: Box<dyn PriceProcess>,
        adapter: RecommendationAdapter,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let agents = Self::spawn_population(&config);
        info!(
            agents = agents.len(),
            initial_price = config.price.initial_price,
            live = adapter.is_live(),
            "market model ready"
        );
        Ok(Self {
            state: MarketState::new(config.price.initial_price),
            record: SimulationRecord::with_capacity(config.num_steps),
            process,
            adapter,
            agents,
            signal: None,
            config,
        })
    }

    // Private helper: agent ids are their index in the arena.
    fn spawn_population(config: &SimConfig) -> Vec<InvestorAgent> {
        (0..config.num_agents)
            .map(|id| InvestorAgent::from_config(id, &config.agents, config.price.initial_price))
            .collect()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> &MarketState {
        &self.state
    }

    pub fn agents(&self) -> &[InvestorAgent] {
        &self.agents
    }

    pub fn agent(&self, id: usize) -> Option<&InvestorAgent> {
        self.agents.get(id)
    }

    pub fn record(&self) -> &SimulationRecord {
        &self.record
    }

    /// The recommendation every investor acted on in the last step.
    pub fn active_signal(&self) -> Option<&Recommendation> {
        self.signal.as_ref()
    }

    /// This is the core "tick" of the simulation.
    pub fn step(&mut self) -> Result<&Snapshot, SimError> {
        // 1. Price.
        let next_price = self.process.advance(self.state.price())?;
        self.state.record_price(next_price);

        // 2. One recommendation for everybody, from the post-advance state.
        let recommendation = self.adapter.get_signal(&self.state);

        // 3. Investors, all against the same view.
        let view = MarketView {
            step: self.state.step(),
            price: next_price,
            recommendation: &recommendation,
        };
        let actions = activate_all(&mut self.agents, &view);

        // 4. Aggregates.
        let snapshot = self.snapshot(&view, &actions);
        debug!(
            step = snapshot.step,
            price = snapshot.price,
            signal = %snapshot.signal_action,
            source = %snapshot.signal_source,
            buys = snapshot.buys,
            sells = snapshot.sells,
            volume = snapshot.volume,
            "step complete"
        );

        self.signal = Some(recommendation);
        let index = self.record.len();
        self.record.push(snapshot);
        Ok(&self.record.snapshots()[index])
    }

    /// Runs `num_steps` steps and hands back the finished record. The model is
    /// consumed, so nothing can touch the result afterwards.
    pub fn run(mut self, num_steps: usize) -> Result<SimulationRecord, SimError> {
        for _ in 0..num_steps {
            self.step()?;
        }
        let summary = self.record.summary(self.state.initial_price());
        info!(
            steps = summary.steps,
            final_price = summary.final_price,
            total_return = summary.total_return,
            degraded_steps = summary.degraded_steps,
            "run finished"
        );
        Ok(self.record)
    }

    /// Back to the initial price, population and generator state.
    pub fn reset(&mut self) {
        self.state.reset();
        self.process.reset();
        self.agents = Self::spawn_population(&self.config);
        self.record.clear();
        self.signal = None;
    }

    fn snapshot(&self, view: &MarketView, actions: &[ActionTaken]) -> Snapshot {
        let aggregate_holdings: f64 = self.agents.iter().map(|a| a.portfolio().holdings()).sum();
        let aggregate_cash: f64 = self.agents.iter().map(|a| a.portfolio().cash()).sum();
        let count = |action: Action| actions.iter().filter(|t| t.action() == action).count();

        Snapshot {
            step: view.step,
            price: view.price,
            aggregate_holdings,
            aggregate_cash,
            aggregate_wealth: aggregate_holdings * view.price + aggregate_cash,
            mean_holdings: aggregate_holdings / self.agents.len().max(1) as f64,
            volume: actions.iter().map(ActionTaken::qty).sum(),
            buys: count(Action::Buy),
            sells: count(Action::Sell),
            holds: count(Action::Hold),
            signal_action: view.recommendation.action(),
            signal_confidence: view.recommendation.confidence(),
            signal_source: view.recommendation.source(),
        }
    }
}

// Every investor reads the same view and writes only its own portfolio, so
// activation order does not matter.
#[cfg(feature = "parallel")]
fn activate_all(agents: &mut [InvestorAgent], view: &MarketView) -> Vec<ActionTaken> {
    agents.par_iter_mut().map(|agent| agent.activate(view)).collect()
}

#[cfg(not(feature = "parallel"))]
fn activate_all(agents: &mut [InvestorAgent], view: &MarketView) -> Vec<ActionTaken> {
    agents.iter_mut().map(|agent| agent.activate(view)).collect()
}
