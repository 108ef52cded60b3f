//! Action providers for controlled teams
//!
//! The scheduler asks a team's `Controller` for a choice whenever one of its
//! externally controlled combatants acts. Implementations:
//! - `ChannelController` forwards prompts over tokio channels and waits for
//!   an answer with a timeout (interactive front ends)
//! - `ScriptedController` replays a fixed list of choices (tests, replays)
//! - `AutoPilot` picks the strongest affordable skill on the first target

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::combatant::CombatantId;
use super::events::ActionEvent;
use super::stats::FinalMeter;
use crate::roster::{preferred_skill, SkillInfo, TargetKind};

/// A skill to use and, when needed, its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillChoice {
    pub skill: usize,
    pub target: Option<CombatantId>,
}

impl SkillChoice {
    pub fn new(skill: usize, target: Option<CombatantId>) -> Self {
        Self { skill, target }
    }
}

/// What a controller answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChoiceOutcome {
    Chosen(SkillChoice),
    /// Skip the turn
    Pass,
    /// No answer within the input timeout
    TimedOut,
    /// Give up the whole encounter
    Forfeit,
}

/// Someone that can be targeted, as shown to a controller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetOption {
    pub id: CombatantId,
    pub name: String,
    pub health: f64,
    pub max_health: f64,
    pub balance: f64,
}

/// Everything a controller needs to pick an action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionPrompt {
    pub actor: CombatantId,
    pub actor_name: String,
    pub skills: Vec<SkillInfo>,
    pub enemies: Vec<TargetOption>,
    pub allies: Vec<TargetOption>,
    pub skill_points: u32,
    pub max_skill_points: u32,
    pub final_meter: Option<FinalMeter>,
    /// Events logged for the team since its previous prompt
    pub events: Vec<ActionEvent>,
    /// Failed choices already made this turn
    pub attempt: u32,
}

/// Source of choices for a controlled team
#[async_trait]
pub trait Controller: Send + Sync {
    async fn choose(&self, prompt: &ActionPrompt) -> ChoiceOutcome;
}

/// Replays queued outcomes; an empty queue passes
#[derive(Debug, Default)]
pub struct ScriptedController {
    script: Mutex<VecDeque<ChoiceOutcome>>,
    prompts: Mutex<Vec<ActionPrompt>>,
}

impl ScriptedController {
    pub fn new(script: impl IntoIterator<Item = ChoiceOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, outcome: ChoiceOutcome) {
        self.script.lock().push_back(outcome);
    }

    /// Outcomes not consumed yet
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }

    /// Every prompt received so far
    pub fn prompts(&self) -> Vec<ActionPrompt> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Controller for ScriptedController {
    async fn choose(&self, prompt: &ActionPrompt) -> ChoiceOutcome {
        self.prompts.lock().push(prompt.clone());
        self.script.lock().pop_front().unwrap_or(ChoiceOutcome::Pass)
    }
}

/// Plays like an automatic combatant using only the prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoPilot;

#[async_trait]
impl Controller for AutoPilot {
    async fn choose(&self, prompt: &ActionPrompt) -> ChoiceOutcome {
        let Some(skill) = preferred_skill(&prompt.skills, prompt.skill_points) else {
            return ChoiceOutcome::Pass;
        };
        let target = match skill.target {
            TargetKind::Enemy => match prompt.enemies.first() {
                Some(t) => Some(t.id),
                None => return ChoiceOutcome::Pass,
            },
            TargetKind::Ally => prompt.allies.first().map(|t| t.id),
            TargetKind::Caster => Some(prompt.actor),
            TargetKind::None => None,
        };
        ChoiceOutcome::Chosen(SkillChoice::new(skill.index, target))
    }
}

/// A message tagged with the prompt it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct Ticketed<T> {
    pub ticket: u64,
    pub body: T,
}

impl<T> Ticketed<T> {
    /// Answer carrying the same ticket
    pub fn reply<U>(&self, body: U) -> Ticketed<U> {
        Ticketed {
            ticket: self.ticket,
            body,
        }
    }
}

/// Front-end side of a `ChannelController`
#[derive(Debug)]
pub struct ChannelHandle {
    pub prompts: mpsc::Receiver<Ticketed<ActionPrompt>>,
    pub choices: mpsc::Sender<Ticketed<ChoiceOutcome>>,
}

/// Forwards prompts to a front end and waits for its answer
#[derive(Debug)]
pub struct ChannelController {
    prompts: mpsc::Sender<Ticketed<ActionPrompt>>,
    choices: tokio::sync::Mutex<mpsc::Receiver<Ticketed<ChoiceOutcome>>>,
    next_ticket: AtomicU64,
    timeout: Duration,
}

impl ChannelController {
    /// Create a controller and the handle a front end talks through
    pub fn pair(timeout: Duration) -> (Self, ChannelHandle) {
        let (prompt_tx, prompt_rx) = mpsc::channel(8);
        let (choice_tx, choice_rx) = mpsc::channel(8);
        let controller = Self {
            prompts: prompt_tx,
            choices: tokio::sync::Mutex::new(choice_rx),
            next_ticket: AtomicU64::new(0),
            timeout,
        };
        let handle = ChannelHandle {
            prompts: prompt_rx,
            choices: choice_tx,
        };
        (controller, handle)
    }
}

#[async_trait]
impl Controller for ChannelController {
    async fn choose(&self, prompt: &ActionPrompt) -> ChoiceOutcome {
        let mut choices = self.choices.lock().await;
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let pending = Ticketed {
            ticket,
            body: prompt.clone(),
        };
        if self.prompts.send(pending).await.is_err() {
            tracing::warn!(actor = %prompt.actor, "front end closed, forfeiting");
            return ChoiceOutcome::Forfeit;
        }

        let answer = async {
            while let Some(choice) = choices.recv().await {
                if choice.ticket == ticket {
                    return Some(choice.body);
                }
                // Arrived after an earlier prompt timed out
                tracing::debug!(stale = choice.ticket, ticket, "discarding late choice");
            }
            None
        };
        match tokio::time::timeout(self.timeout, answer).await {
            Ok(Some(outcome)) => outcome,
            Ok(None) => ChoiceOutcome::Forfeit,
            Err(_) => ChoiceOutcome::TimedOut,
        }
    }
}
