use crate::config::EngineConfig;
use crate::core::catalog::Catalog;
use crate::core::diet::DietRules;
use crate::core::sampler::{DraftAssignment, RandomSampler, Sampler};
use crate::core::types::{DietProfile, MenuAssignment};
use crate::daily_log::{DailyLog, DailyLogEntry, LogQuery};
use crate::error::{MenuError, StartupError};
use crate::ledger::UniquenessLedger;
use chrono::{DateTime, FixedOffset, Local};
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

/// Steps of one generation call. `Success` and `Exhausted` are terminal.
#[derive(Debug)]
enum GenerationState {
    CheckFeasibility,
    Sampling { attempt: usize },
    KeyCheck { attempt: usize, draft: DraftAssignment },
    Retry { attempt: usize },
    Success(MenuAssignment),
    Exhausted(MenuError),
}

// The engine owns its stores explicitly; nothing here is process-global.
// NOTE: single writer only. Two engines over the same files can both pass the
// key check before either persists and issue the same combination.
pub struct MenuEngine<S: Sampler = RandomSampler<StdRng>> {
    catalog: Catalog,
    rules: DietRules,
    ledger: UniquenessLedger,
    log: DailyLog,
    sampler: S,
    attempt_budget: usize,
}

impl MenuEngine {
    /// Loads catalog, ledger and daily log as described by `config`.
    pub fn open(config: &EngineConfig) -> Result<Self, StartupError> {
        config.diet_rules.validate()?;
        let catalog = config.load_catalog()?;
        let ledger = UniquenessLedger::load(&config.ledger_path())?;
        let log = DailyLog::open(&config.log_path())?;
        let sampler = match config.seed {
            Some(seed) => RandomSampler::seeded(seed),
            None => RandomSampler::from_entropy(),
        };
        info!(
            issued = ledger.len(),
            logged = log.len(),
            data_dir = %config.data_dir.display(),
            "menu engine loaded"
        );
        Ok(MenuEngine::with_parts(catalog, config.diet_rules.clone(), ledger, log, sampler)
            .with_attempt_budget(config.attempt_budget))
    }
}

impl<S: Sampler> MenuEngine<S> {
    pub fn with_parts(
        catalog: Catalog,
        rules: DietRules,
        ledger: UniquenessLedger,
        log: DailyLog,
        sampler: S,
    ) -> Self {
        Self {
            catalog,
            rules,
            ledger,
            log,
            sampler,
            attempt_budget: crate::config::DEFAULT_ATTEMPT_BUDGET,
        }
    }

    pub fn with_attempt_budget(mut self, attempts: usize) -> Self {
        self.attempt_budget = attempts.max(1);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &DietRules {
        &self.rules
    }

    pub fn ledger(&self) -> &UniquenessLedger {
        &self.ledger
    }

    pub fn log(&self) -> &DailyLog {
        &self.log
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn attempt_budget(&self) -> usize {
        self.attempt_budget
    }

    /// Issues a never-before-seen menu for `profile`, stamped with the local time.
    pub fn generate(&mut self, profile: DietProfile) -> Result<MenuAssignment, MenuError> {
        let now: DateTime<FixedOffset> = Local::now().into();
        self.generate_at(profile, now)
    }

    pub fn generate_at(
        &mut self,
        profile: DietProfile,
        issued_at: DateTime<FixedOffset>,
    ) -> Result<MenuAssignment, MenuError> {
        let view = self.catalog.view(&self.rules, profile);
        let mut state = GenerationState::CheckFeasibility;

        loop {
            state = match state {
                GenerationState::CheckFeasibility => match view.shortfall() {
                    Some(shortfall) => GenerationState::Exhausted(MenuError::InfeasibleProfile {
                        profile,
                        category: shortfall.category,
                        eligible: shortfall.eligible,
                        required: shortfall.required,
                    }),
                    None => GenerationState::Sampling { attempt: 1 },
                },
                GenerationState::Sampling { attempt } => GenerationState::KeyCheck {
                    attempt,
                    draft: self.sampler.sample(&view),
                },
                GenerationState::KeyCheck { attempt, draft } => {
                    let key = draft.key();
                    if self.ledger.contains(&key) {
                        debug!(attempt, %key, "combination already issued");
                        GenerationState::Retry { attempt }
                    } else {
                        let menu = MenuAssignment {
                            issued_at,
                            profile,
                            stations: draft.stations(&view),
                        };

                        // The ledger write commits first; the log entry follows.
                        self.ledger.record(key.clone())?;
                        if let Err(e) = self.log.append(DailyLogEntry::from(&menu)) {
                            self.ledger.remove(&key);
                            if let Err(rollback) = self.ledger.persist() {
                                warn!(%key, error = %rollback, "ledger rollback was not persisted");
                            }
                            return Err(e.into());
                        }

                        info!(%profile, attempt, %key, "issued menu");
                        GenerationState::Success(menu)
                    }
                }
                GenerationState::Retry { attempt } => {
                    if attempt >= self.attempt_budget {
                        GenerationState::Exhausted(MenuError::BudgetExhausted {
                            profile,
                            attempts: attempt,
                        })
                    } else {
                        GenerationState::Sampling {
                            attempt: attempt + 1,
                        }
                    }
                }
                GenerationState::Success(menu) => return Ok(menu),
                GenerationState::Exhausted(err) => {
                    warn!(%profile, error = %err, "no menu available");
                    return Err(err);
                }
            };
        }
    }

    /// Forgets every issued combination. Irreversible. Returns how many were cleared.
    pub fn reset_ledger(&mut self) -> Result<usize, MenuError> {
        let cleared = self.ledger.clear_and_persist()?;
        info!(cleared, "uniqueness ledger reset");
        Ok(cleared)
    }

    pub fn query_log(&self, query: &LogQuery) -> Vec<&DailyLogEntry> {
        self.log.query(query)
    }

    /// Total distinct combinations possible under `profile`.
    pub fn capacity(&self, profile: DietProfile) -> u128 {
        self.catalog.view(&self.rules, profile).combination_count()
    }

    /// Combinations under `profile` not yet issued. Walks the ledger, never the
    /// key space.
    pub fn remaining(&self, profile: DietProfile) -> u128 {
        let view = self.catalog.view(&self.rules, profile);
        let issued = self.ledger.keys().filter(|key| view.reaches(key)).count();
        view.combination_count().saturating_sub(issued as u128)
    }
}
