use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use lavarun_core::{Level, LevelParser, Status};

use crate::Session;
use crate::config::GameConfig;
use crate::controller::PlayerInput;
use crate::levels::LevelText;

/// Chooses the held keys for each frame.
pub trait InputPolicy {
    fn input(&mut self, level: &Level) -> PlayerInput;
}

impl<F> InputPolicy for F
where
    F: FnMut(&Level) -> PlayerInput,
{
    fn input(&mut self, level: &Level) -> PlayerInput {
        self(level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum LevelResult {
    Won { attempts: u32 },
    GaveUp { attempts: u32 },
}

impl LevelResult {
    pub fn is_won(&self) -> bool {
        matches!(self, Self::Won { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignOutcome {
    pub levels: Vec<LevelResult>,
}

impl CampaignOutcome {
    /// Every level in the pack was won.
    pub fn completed(&self) -> bool {
        self.levels.iter().all(LevelResult::is_won)
    }

    pub fn levels_won(&self) -> usize {
        self.levels.iter().filter(|r| r.is_won()).count()
    }
}

/// Plays a pack of levels in order.
///
/// A won level advances to the next one. A lost level is retried until
/// `max_attempts` is used up, which ends the campaign.
pub struct Campaign {
    levels: Vec<LevelText>,
    parser: LevelParser,
    config: GameConfig,
    rng: StdRng,
}

impl Campaign {
    pub fn new(levels: Vec<LevelText>, parser: LevelParser, config: GameConfig) -> Self {
        let config = GameConfig {
            session: config.session.sanitized(),
            ..config
        };
        let rng = match config.session.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            levels,
            parser,
            config,
            rng,
        }
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn run<P: InputPolicy + ?Sized>(&mut self, policy: &mut P) -> CampaignOutcome {
        let mut results = Vec::with_capacity(self.levels.len());
        for index in 0..self.levels.len() {
            let result = self.play_level(index, policy);
            results.push(result);
            if !result.is_won() {
                tracing::info!(level = index + 1, "out of attempts, campaign over");
                break;
            }
        }
        CampaignOutcome { levels: results }
    }

    fn play_level<P: InputPolicy + ?Sized>(&mut self, index: usize, policy: &mut P) -> LevelResult {
        let max_attempts = self.config.session.max_attempts;
        for attempt in 1..=max_attempts {
            let status = self.play_attempt(index, policy);
            tracing::info!(level = index + 1, attempt, %status, "attempt finished");
            if status == Status::Won {
                return LevelResult::Won { attempts: attempt };
            }
        }
        LevelResult::GaveUp {
            attempts: max_attempts,
        }
    }

    /// Run one attempt until the level finishes. Running past the attempt
    /// timeout without a status counts as lost. A status reached before the
    /// timeout stands even if its finish delay has not run out.
    fn play_attempt<P: InputPolicy + ?Sized>(&mut self, index: usize, policy: &mut P) -> Status {
        let level = self.parser.parse_with_rng(&self.levels[index], &mut self.rng);
        let mut session = Session::new(level, &self.config);
        let frame = self.config.session.frame_secs;

        while !session.is_finished() {
            if session.elapsed() >= self.config.session.attempt_timeout_secs {
                tracing::debug!(elapsed = session.elapsed(), "attempt timed out");
                break;
            }
            let input = policy.input(session.level());
            session.update(frame, &input);
        }
        session.level().status().unwrap_or(Status::Lost)
    }
}
