// File: src/weekly.rs
use crate::core::engine::MenuEngine;
use crate::core::sampler::Sampler;
use crate::core::types::{DietProfile, MenuAssignment};
use crate::error::MenuError;
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Longest batch `WeekRequest::parse` accepts.
pub const MAX_BATCH_DAYS: usize = 366;

/// Which profile each planned day uses, starting at `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekRequest {
    pub start: NaiveDate,
    pub profiles: Vec<DietProfile>,
}

impl WeekRequest {
    pub fn explicit(start: NaiveDate, profiles: Vec<DietProfile>) -> Self {
        Self { start, profiles }
    }

    pub fn uniform(start: NaiveDate, days: usize, profile: DietProfile) -> Self {
        Self::explicit(start, vec![profile; days])
    }

    /// Expands per-profile day counts into consecutive days, in the order given.
    /// `[(Jain, 2), (None, 5)]` plans two Jain days followed by five unrestricted ones.
    pub fn from_counts(start: NaiveDate, counts: &[(DietProfile, usize)]) -> Self {
        let profiles = counts
            .iter()
            .flat_map(|&(profile, n)| std::iter::repeat(profile).take(n))
            .collect();
        Self::explicit(start, profiles)
    }

    /// Reads a day plan from command words:
    /// nothing or a bare number plans that many `default_profile` days,
    /// `jain=2 none=5` gives counts, and `none jain none` lists each day.
    pub fn parse(
        start: NaiveDate,
        default_days: usize,
        default_profile: DietProfile,
        words: &[&str],
    ) -> Result<Self, String> {
        match words {
            [] => {
                return Ok(Self::uniform(start, check_days(default_days)?, default_profile))
            }
            [single] if single.chars().all(|c| c.is_ascii_digit()) => {
                let days = single.parse().map_err(|_| format!("bad day count '{}'", single))?;
                return Ok(Self::uniform(start, check_days(days)?, default_profile));
            }
            _ => {}
        }

        let counted = words.iter().filter(|w| w.contains('=')).count();
        if counted == words.len() {
            let mut counts = Vec::with_capacity(words.len());
            for word in words {
                let (name, n) = word.split_once('=').unwrap_or((*word, ""));
                let profile: DietProfile = name.parse()?;
                let n: usize = n
                    .parse()
                    .map_err(|_| format!("bad day count in '{}'", word))?;
                counts.push((profile, n));
            }
            let total = counts
                .iter()
                .try_fold(0usize, |acc, &(_, n)| acc.checked_add(n))
                .unwrap_or(usize::MAX);
            check_days(total)?;
            Ok(Self::from_counts(start, &counts))
        } else if counted == 0 {
            let profiles = words
                .iter()
                .map(|w| w.parse::<DietProfile>())
                .collect::<Result<Vec<_>, _>>()?;
            check_days(profiles.len())?;
            Ok(Self::explicit(start, profiles))
        } else {
            Err("mix of profile=count and plain profiles".to_string())
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn check_days(days: usize) -> Result<usize, String> {
    if days > MAX_BATCH_DAYS {
        return Err(format!("at most {} days per batch, got {}", MAX_BATCH_DAYS, days));
    }
    Ok(days)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayLabel {
    /// 1-based position in the batch.
    pub index: usize,
    pub date: NaiveDate,
}

impl fmt::Display for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Day {} ({} {})", self.index, self.date.weekday(), self.date)
    }
}

/// Why a day in the batch has no menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GapReason {
    InfeasibleProfile { category: String },
    BudgetExhausted { attempts: usize },
}

impl fmt::Display for GapReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GapReason::InfeasibleProfile { category } => {
                write!(f, "no eligible dishes to fill '{}'", category)
            }
            GapReason::BudgetExhausted { attempts } => {
                write!(f, "all combinations used ({} attempts)", attempts)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayOutcome {
    Menu(MenuAssignment),
    Gap(GapReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPlan {
    pub label: DayLabel,
    pub profile: DietProfile,
    pub outcome: DayOutcome,
}

impl DayPlan {
    pub fn menu(&self) -> Option<&MenuAssignment> {
        match &self.outcome {
            DayOutcome::Menu(menu) => Some(menu),
            DayOutcome::Gap(_) => None,
        }
    }
}

/// One entry per requested day, in request order. Gaps are kept in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekPlan {
    pub days: Vec<DayPlan>,
}

impl WeekPlan {
    pub fn successes(&self) -> impl Iterator<Item = &DayPlan> {
        self.days.iter().filter(|d| d.menu().is_some())
    }

    pub fn gaps(&self) -> impl Iterator<Item = &DayPlan> {
        self.days.iter().filter(|d| d.menu().is_none())
    }

    pub fn is_complete(&self) -> bool {
        self.gaps().next().is_none()
    }
}

impl<S: Sampler> MenuEngine<S> {
    /// Runs one generation per requested day against the shared ledger.
    ///
    /// Infeasible and exhausted days become gaps and the batch carries on. A
    /// persistence failure stops the batch and is returned as is.
    pub fn generate_week(&mut self, request: &WeekRequest) -> Result<WeekPlan, MenuError> {
        let mut plan = WeekPlan {
            days: Vec::with_capacity(request.len()),
        };

        let mut date = request.start;
        for (i, &profile) in request.profiles.iter().enumerate() {
            let label = DayLabel { index: i + 1, date };
            let outcome = match self.generate(profile) {
                Ok(menu) => DayOutcome::Menu(menu),
                Err(MenuError::InfeasibleProfile { category, .. }) => {
                    DayOutcome::Gap(GapReason::InfeasibleProfile { category })
                }
                Err(MenuError::BudgetExhausted { attempts, .. }) => {
                    DayOutcome::Gap(GapReason::BudgetExhausted { attempts })
                }
                Err(e) => return Err(e),
            };
            if let DayOutcome::Gap(reason) = &outcome {
                warn!(%label, %profile, %reason, "day left empty");
            }
            plan.days.push(DayPlan {
                label,
                profile,
                outcome,
            });
            date = date.checked_add_days(Days::new(1)).unwrap_or(date);
        }

        info!(
            requested = request.len(),
            planned = plan.successes().count(),
            "week generated"
        );
        Ok(plan)
    }
}
