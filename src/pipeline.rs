//! Scoring pipeline
//!
//! A run passes one batch of picks through a sequence of [`Stage`]s. Each
//! stage moves through `Uninitialized -> Ready -> Executed -> Cleaned`; the
//! pipeline holds that state per stage and rejects out-of-order calls.

use tracing::{debug, info, warn};

use crate::config::ScoringConfig;
use crate::core::edge::EdgeCalculator;
use crate::core::kelly::KellyCalculator;
use crate::core::selector::select_best_picks;
use crate::error::EdgeError;
use crate::models::Pick;

/// Lifecycle state of a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Uninitialized,
    Ready,
    Executed,
    Cleaned,
}

impl StageState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageState::Uninitialized => "uninitialized",
            StageState::Ready => "ready",
            StageState::Executed => "executed",
            StageState::Cleaned => "cleaned",
        }
    }
}

/// One step of a scoring run
pub trait Stage {
    fn name(&self) -> &'static str;

    fn setup(&mut self) -> Result<(), EdgeError> {
        Ok(())
    }

    fn execute(&mut self, picks: Vec<Pick>) -> Result<Vec<Pick>, EdgeError>;

    /// Check the stage's own output contract
    fn validate(&self, _output: &[Pick]) -> Result<(), EdgeError> {
        Ok(())
    }

    fn cleanup(&mut self) {}
}

/// Attaches EV and capped Kelly to every pick
pub struct ScoreStage {
    calculator: EdgeCalculator,
}

impl ScoreStage {
    pub fn new(calculator: EdgeCalculator) -> Self {
        Self { calculator }
    }
}

impl Stage for ScoreStage {
    fn name(&self) -> &'static str {
        "score"
    }

    fn execute(&mut self, picks: Vec<Pick>) -> Result<Vec<Pick>, EdgeError> {
        match self.calculator.score_all(&picks) {
            Ok(scored) => Ok(scored),
            Err(e) => {
                warn!("Failed to score picks: {}", e);
                Err(e)
            }
        }
    }

    fn validate(&self, output: &[Pick]) -> Result<(), EdgeError> {
        let cap = self.calculator.kelly_cap;
        for (i, pick) in output.iter().enumerate() {
            if !(0.0..=cap).contains(&pick.kelly_fraction) {
                return Err(EdgeError::MalformedPick {
                    row: i + 1,
                    reason: format!("kelly_fraction {} outside [0, {}]", pick.kelly_fraction, cap),
                });
            }
        }
        Ok(())
    }
}

/// Drops picks whose EV is below a threshold
pub struct MinEvFilter {
    pub min_ev: f64,
}

impl Stage for MinEvFilter {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn execute(&mut self, picks: Vec<Pick>) -> Result<Vec<Pick>, EdgeError> {
        let before = picks.len();
        let kept: Vec<Pick> = picks
            .into_iter()
            .filter(|p| p.expected_value >= self.min_ev)
            .collect();
        debug!(before, after = kept.len(), min_ev = self.min_ev, "Applied EV threshold");
        Ok(kept)
    }
}

/// Keeps one pick per bet identity
pub struct SelectStage;

impl Stage for SelectStage {
    fn name(&self) -> &'static str {
        "select"
    }

    fn execute(&mut self, picks: Vec<Pick>) -> Result<Vec<Pick>, EdgeError> {
        select_best_picks(&picks)
    }

    fn validate(&self, output: &[Pick]) -> Result<(), EdgeError> {
        let sorted = output
            .windows(2)
            .all(|w| w[0].expected_value >= w[1].expected_value);
        if !sorted {
            return Err(EdgeError::Lifecycle {
                stage: "select",
                state: "executed",
                action: "emit unsorted picks",
            });
        }
        Ok(())
    }
}

/// A stage together with its lifecycle state
pub struct StageSlot {
    stage: Box<dyn Stage>,
    state: StageState,
}

impl StageSlot {
    pub fn new(stage: Box<dyn Stage>) -> Self {
        Self {
            stage,
            state: StageState::Uninitialized,
        }
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn name(&self) -> &'static str {
        self.stage.name()
    }

    fn transition_error(&self, action: &'static str) -> EdgeError {
        EdgeError::Lifecycle {
            stage: self.stage.name(),
            state: self.state.as_str(),
            action,
        }
    }

    pub fn setup(&mut self) -> Result<(), EdgeError> {
        if self.state != StageState::Uninitialized {
            return Err(self.transition_error("set up"));
        }
        self.stage.setup()?;
        self.state = StageState::Ready;
        Ok(())
    }

    pub fn execute(&mut self, picks: Vec<Pick>) -> Result<Vec<Pick>, EdgeError> {
        if self.state != StageState::Ready {
            return Err(self.transition_error("execute"));
        }
        let output = self.stage.execute(picks)?;
        self.stage.validate(&output)?;
        self.state = StageState::Executed;
        Ok(output)
    }

    /// Cleanup is allowed from any state except `Cleaned`
    pub fn cleanup(&mut self) -> Result<(), EdgeError> {
        if self.state == StageState::Cleaned {
            return Err(self.transition_error("clean up"));
        }
        self.stage.cleanup();
        self.state = StageState::Cleaned;
        Ok(())
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub input_count: usize,
    pub picks: Vec<Pick>,
}

/// Ordered stages for one scoring run
pub struct ScoringPipeline {
    slots: Vec<StageSlot>,
}

impl ScoringPipeline {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn with_stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.slots.push(StageSlot::new(stage));
        self
    }

    /// Score, filter by `min_ev`, select best picks
    pub fn from_config(config: &ScoringConfig) -> Result<Self, EdgeError> {
        let calculator = EdgeCalculator::new(config.kelly_cap)?;
        Ok(Self::new()
            .with_stage(Box::new(ScoreStage::new(calculator)))
            .with_stage(Box::new(MinEvFilter {
                min_ev: config.min_ev,
            }))
            .with_stage(Box::new(SelectStage)))
    }

    pub fn stage_states(&self) -> Vec<(&'static str, StageState)> {
        self.slots.iter().map(|s| (s.name(), s.state())).collect()
    }

    /// Run every stage once; stages are cleaned up even when one fails
    pub fn run(&mut self, picks: Vec<Pick>) -> Result<RunOutput, EdgeError> {
        let input_count = picks.len();
        info!(picks = input_count, stages = self.slots.len(), "Starting scoring run");

        let result = self.run_stages(picks);

        for slot in &mut self.slots {
            if slot.state() != StageState::Cleaned {
                slot.cleanup()?;
            }
        }

        let picks = result?;
        info!(input = input_count, selected = picks.len(), "Scoring run complete");
        Ok(RunOutput { input_count, picks })
    }

    fn run_stages(&mut self, mut picks: Vec<Pick>) -> Result<Vec<Pick>, EdgeError> {
        for slot in &mut self.slots {
            slot.setup()?;
            picks = slot.execute(picks)?;
            debug!(stage = slot.name(), picks = picks.len(), "Stage executed");
        }
        Ok(picks)
    }
}

impl Default for ScoringPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Stakes for selected picks, scaled to the slate's exposure limit
pub fn attach_stakes(picks: &[Pick], kelly: &KellyCalculator) -> Result<Vec<f64>, EdgeError> {
    let bets: Vec<(f64, i32)> = picks
        .iter()
        .map(|p| (p.model_probability, p.market_odds))
        .collect();
    Ok(kelly
        .calculate_multiple(&bets)?
        .into_iter()
        .map(|s| s.stake)
        .collect())
}
