//! The court simulation engine.
//!
//! A single linear proceeding: twelve named phases from SETUP to COMPLETED,
//! each with exactly one successor. Advancing out of a phase generates one
//! line of dialogue from the role that owns that phase's speaking turn and
//! appends it to the transcript. Generation failure never stalls the
//! proceeding; the transition table carries a canned line for every
//! exchange, so a run under a total service outage still completes with
//! placeholder dialogue.
//!
//! One engine instance owns one run. Hosts serving several sessions give
//! each its own engine; there is no process-wide state here.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::generator::ActorResponseGenerator;
use crate::llm::CompletionClient;
use crate::personas::{CounselStrategy, JudgePersonality};
use crate::scenario::{Scenario, ScenarioStore};

pub const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_secs(3);
pub const MIN_ADVANCE_DELAY: Duration = Duration::from_secs(1);
pub const MAX_ADVANCE_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Setup,
    Introduction,
    PlaintiffOpening,
    DefendantOpening,
    PlaintiffEvidence,
    DefendantEvidence,
    JudgeQuestioning,
    PlaintiffRebuttal,
    DefendantRebuttal,
    PlaintiffClosing,
    DefendantClosing,
    Ruling,
    Completed,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Setup => "SETUP",
            Phase::Introduction => "INTRODUCTION",
            Phase::PlaintiffOpening => "PLAINTIFF_OPENING",
            Phase::DefendantOpening => "DEFENDANT_OPENING",
            Phase::PlaintiffEvidence => "PLAINTIFF_EVIDENCE",
            Phase::DefendantEvidence => "DEFENDANT_EVIDENCE",
            Phase::JudgeQuestioning => "JUDGE_QUESTIONING",
            Phase::PlaintiffRebuttal => "PLAINTIFF_REBUTTAL",
            Phase::DefendantRebuttal => "DEFENDANT_REBUTTAL",
            Phase::PlaintiffClosing => "PLAINTIFF_CLOSING",
            Phase::DefendantClosing => "DEFENDANT_CLOSING",
            Phase::Ruling => "RULING",
            Phase::Completed => "COMPLETED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Judge,
    PlaintiffCounsel,
    DefendantCounsel,
    System,
}

impl Role {
    pub fn key(&self) -> &'static str {
        match self {
            Role::Judge => "judge",
            Role::PlaintiffCounsel => "plaintiff_counsel",
            Role::DefendantCounsel => "defendant_counsel",
            Role::System => "system",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Judge => "Judge",
            Role::PlaintiffCounsel => "Plaintiff counsel",
            Role::DefendantCounsel => "Defendant counsel",
            Role::System => "System",
        }
    }
}

/// One transcript entry.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// One row of the proceeding: who speaks when leaving `phase`, which phase
/// their prompt is framed against, the canned substitute line, and where the
/// run goes next.
struct Exchange {
    phase: Phase,
    speaker: Role,
    prompt_phase: Phase,
    canned: &'static str,
    next_phase: Phase,
    next_speaker: Option<Role>,
}

const EXCHANGES: [Exchange; 11] = [
    Exchange {
        phase: Phase::Introduction,
        speaker: Role::PlaintiffCounsel,
        prompt_phase: Phase::Introduction,
        canned: "Plaintiff's counsel is preparing their opening statement.",
        next_phase: Phase::PlaintiffOpening,
        next_speaker: Some(Role::DefendantCounsel),
    },
    Exchange {
        phase: Phase::PlaintiffOpening,
        speaker: Role::DefendantCounsel,
        prompt_phase: Phase::PlaintiffOpening,
        canned: "Defendant's counsel is preparing their opening statement.",
        next_phase: Phase::DefendantOpening,
        next_speaker: Some(Role::Judge),
    },
    // The judge speaks here to open the evidence phase, so the prompt is
    // framed against the phase being entered rather than the one ending.
    Exchange {
        phase: Phase::DefendantOpening,
        speaker: Role::Judge,
        prompt_phase: Phase::PlaintiffEvidence,
        canned: "Thank you for your opening statements. We will now proceed to the evidence phase. Plaintiff's counsel, please present your evidence.",
        next_phase: Phase::PlaintiffEvidence,
        next_speaker: Some(Role::PlaintiffCounsel),
    },
    Exchange {
        phase: Phase::PlaintiffEvidence,
        speaker: Role::PlaintiffCounsel,
        prompt_phase: Phase::PlaintiffEvidence,
        canned: "Your Honor, the plaintiff would like to present the following evidence...",
        next_phase: Phase::DefendantEvidence,
        next_speaker: Some(Role::DefendantCounsel),
    },
    Exchange {
        phase: Phase::DefendantEvidence,
        speaker: Role::DefendantCounsel,
        prompt_phase: Phase::DefendantEvidence,
        canned: "Your Honor, the defendant would like to present the following evidence...",
        next_phase: Phase::JudgeQuestioning,
        next_speaker: Some(Role::Judge),
    },
    Exchange {
        phase: Phase::JudgeQuestioning,
        speaker: Role::Judge,
        prompt_phase: Phase::JudgeQuestioning,
        canned: "I have some questions for both counsels based on the evidence presented...",
        next_phase: Phase::PlaintiffRebuttal,
        next_speaker: Some(Role::PlaintiffCounsel),
    },
    Exchange {
        phase: Phase::PlaintiffRebuttal,
        speaker: Role::PlaintiffCounsel,
        prompt_phase: Phase::PlaintiffRebuttal,
        canned: "Your Honor, in response to the defendant's arguments...",
        next_phase: Phase::DefendantRebuttal,
        next_speaker: Some(Role::DefendantCounsel),
    },
    Exchange {
        phase: Phase::DefendantRebuttal,
        speaker: Role::DefendantCounsel,
        prompt_phase: Phase::DefendantRebuttal,
        canned: "Your Honor, in response to the plaintiff's arguments...",
        next_phase: Phase::PlaintiffClosing,
        next_speaker: Some(Role::PlaintiffCounsel),
    },
    Exchange {
        phase: Phase::PlaintiffClosing,
        speaker: Role::PlaintiffCounsel,
        prompt_phase: Phase::PlaintiffClosing,
        canned: "Your Honor, in conclusion, I would like to emphasize...",
        next_phase: Phase::DefendantClosing,
        next_speaker: Some(Role::DefendantCounsel),
    },
    Exchange {
        phase: Phase::DefendantClosing,
        speaker: Role::DefendantCounsel,
        prompt_phase: Phase::DefendantClosing,
        canned: "Your Honor, in conclusion, I would like to emphasize...",
        next_phase: Phase::Ruling,
        next_speaker: Some(Role::Judge),
    },
    Exchange {
        phase: Phase::Ruling,
        speaker: Role::Judge,
        prompt_phase: Phase::Ruling,
        canned: "Having considered all evidence and arguments presented, the court rules as follows...",
        next_phase: Phase::Completed,
        next_speaker: None,
    },
];

fn exchange_for(phase: Phase) -> Option<&'static Exchange> {
    EXCHANGES.iter().find(|exchange| exchange.phase == phase)
}

/// Time source for auto-advance bookkeeping. The default reads the system
/// clock; tests substitute a manual one.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct RunState {
    scenario: Scenario,
    phase: Phase,
    transcript: Vec<Turn>,
    active_speaker: Option<Role>,
    paused: bool,
    auto_advance: bool,
    advance_delay: Duration,
    last_advance: Instant,
}

/// Read-only view of the current run, safe to hand to any caller.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSnapshot {
    pub scenario_id: String,
    pub scenario_title: String,
    pub case_type: String,
    pub description: String,
    pub phase: Phase,
    pub transcript: Vec<Turn>,
    pub active_speaker: Option<Role>,
    pub paused: bool,
    pub auto_advance: bool,
    pub advance_delay: Duration,
    pub completed: bool,
}

fn snapshot(run: &RunState) -> SimulationSnapshot {
    SimulationSnapshot {
        scenario_id: run.scenario.id.clone(),
        scenario_title: run.scenario.title.clone(),
        case_type: run.scenario.case_type.clone(),
        description: run.scenario.description.clone(),
        phase: run.phase,
        transcript: run.transcript.clone(),
        active_speaker: run.active_speaker,
        paused: run.paused,
        auto_advance: run.auto_advance,
        advance_delay: run.advance_delay,
        completed: run.phase == Phase::Completed,
    }
}

fn introduction_template(scenario: &Scenario) -> String {
    format!(
        "All rise. The Superior Court for the State of Connecticut is now in session, \
         the Honorable Judge presiding.\n\n\
         We are here today regarding Case {id}: {title}. \
         This is a {case_type} matter. \
         Counsel for the plaintiff, please prepare to present your opening statement.",
        id = scenario.id,
        title = scenario.title,
        case_type = scenario.case_type,
    )
}

pub struct CourtSimulator<C> {
    store: ScenarioStore,
    generator: ActorResponseGenerator<C>,
    clock: Box<dyn Clock>,
    custom_judge: Option<JudgePersonality>,
    custom_plaintiff: Option<CounselStrategy>,
    custom_defendant: Option<CounselStrategy>,
    run: Option<RunState>,
}

impl<C: CompletionClient> CourtSimulator<C> {
    pub fn new(store: ScenarioStore, generator: ActorResponseGenerator<C>) -> Self {
        Self::with_clock(store, generator, Box::new(SystemClock))
    }

    pub fn with_clock(
        store: ScenarioStore,
        generator: ActorResponseGenerator<C>,
        clock: Box<dyn Clock>,
    ) -> Self {
        CourtSimulator {
            store,
            generator,
            clock,
            custom_judge: None,
            custom_plaintiff: None,
            custom_defendant: None,
            run: None,
        }
    }

    pub fn load_scenarios(&self) -> Vec<Scenario> {
        self.store.scenarios()
    }

    /// The scenario backing the current run, overrides applied.
    pub fn active_scenario(&self) -> Option<&Scenario> {
        self.run.as_ref().map(|run| &run.scenario)
    }

    /// Persona overrides for the next `start_simulation` call. Unknown keys
    /// resolve to the neutral/standard defaults; `None` leaves the
    /// scenario's own default in place.
    pub fn set_custom_personas(
        &mut self,
        judge: Option<&str>,
        plaintiff: Option<&str>,
        defendant: Option<&str>,
    ) {
        self.custom_judge = judge.map(JudgePersonality::from_key);
        self.custom_plaintiff = plaintiff.map(CounselStrategy::from_key);
        self.custom_defendant = defendant.map(CounselStrategy::from_key);
    }

    /// Starts a fresh run. An unknown scenario id is reported without
    /// touching any previously active run.
    pub async fn start_simulation(
        &mut self,
        scenario_id: &str,
    ) -> Result<SimulationSnapshot, EngineError> {
        let mut scenario =
            self.store
                .find(scenario_id)
                .ok_or_else(|| EngineError::ScenarioNotFound {
                    id: scenario_id.to_string(),
                })?;

        if let Some(judge) = self.custom_judge {
            scenario.judge_personality = judge;
        }
        if let Some(strategy) = self.custom_plaintiff {
            scenario.plaintiff_counsel_strategy = strategy;
        }
        if let Some(strategy) = self.custom_defendant {
            scenario.defendant_counsel_strategy = strategy;
        }

        let introduction = self.generate_introduction(&scenario).await;

        // Auto-advance settings survive from one run to the next.
        let (auto_advance, advance_delay) = match &self.run {
            Some(previous) => (previous.auto_advance, previous.advance_delay),
            None => (false, DEFAULT_ADVANCE_DELAY),
        };

        let run = RunState {
            scenario,
            phase: Phase::Introduction,
            transcript: vec![Turn {
                role: Role::Judge,
                content: introduction,
            }],
            active_speaker: Some(Role::PlaintiffCounsel),
            paused: true,
            auto_advance,
            advance_delay,
            last_advance: self.clock.now(),
        };
        debug!(scenario = %run.scenario.id, "simulation started");

        let view = snapshot(&run);
        self.run = Some(run);
        Ok(view)
    }

    /// Generates the current speaker's line, appends it, and moves to the
    /// next phase. A failed generation substitutes the exchange's canned
    /// line; the transition happens either way.
    pub async fn advance_simulation(&mut self) -> Result<SimulationSnapshot, EngineError> {
        let run = self.run.as_mut().ok_or(EngineError::NoActiveSimulation)?;
        let Some(exchange) = exchange_for(run.phase) else {
            return Err(EngineError::AlreadyCompleted);
        };

        let content = match self
            .generator
            .generate(
                exchange.speaker,
                &run.scenario,
                exchange.prompt_phase,
                &run.transcript,
            )
            .await
        {
            Some(text) => text,
            None => {
                warn!(
                    phase = run.phase.name(),
                    speaker = exchange.speaker.key(),
                    "generation failed, substituting canned line"
                );
                exchange.canned.to_string()
            }
        };

        run.transcript.push(Turn {
            role: exchange.speaker,
            content,
        });
        debug!(
            from = run.phase.name(),
            to = exchange.next_phase.name(),
            "phase transition"
        );
        run.phase = exchange.next_phase;
        run.active_speaker = exchange.next_speaker;
        if run.phase == Phase::Completed {
            run.paused = true;
        }
        run.last_advance = self.clock.now();

        Ok(snapshot(run))
    }

    /// Flips the pause flag. Resuming restarts the auto-advance timer so a
    /// long pause does not trigger an immediate advance.
    pub fn toggle_pause(&mut self) -> Result<SimulationSnapshot, EngineError> {
        let run = self.run.as_mut().ok_or(EngineError::NoActiveSimulation)?;
        run.paused = !run.paused;
        if !run.paused {
            run.last_advance = self.clock.now();
        }
        Ok(snapshot(run))
    }

    /// Sets the auto-advance flag; a supplied delay is clamped to the
    /// 1-10 s range. Does not itself trigger an advance.
    pub fn set_auto_advance(
        &mut self,
        enabled: bool,
        delay: Option<Duration>,
    ) -> Result<SimulationSnapshot, EngineError> {
        let run = self.run.as_mut().ok_or(EngineError::NoActiveSimulation)?;
        run.auto_advance = enabled;
        if let Some(delay) = delay {
            run.advance_delay = delay.clamp(MIN_ADVANCE_DELAY, MAX_ADVANCE_DELAY);
        }
        Ok(snapshot(run))
    }

    /// Pure predicate for the driver's polling loop; the engine performs no
    /// background scheduling of its own.
    pub fn should_auto_advance(&self) -> bool {
        let Some(run) = &self.run else {
            return false;
        };
        if run.paused || !run.auto_advance || run.phase == Phase::Completed {
            return false;
        }
        self.clock.now().duration_since(run.last_advance) >= run.advance_delay
    }

    pub fn get_state(&self) -> Result<SimulationSnapshot, EngineError> {
        self.run
            .as_ref()
            .map(snapshot)
            .ok_or(EngineError::NoActiveSimulation)
    }

    async fn generate_introduction(&self, scenario: &Scenario) -> String {
        let template = introduction_template(scenario);
        // Simple matters keep the fixed template; anything richer gets an
        // LLM attempt with the template as fallback.
        if matches!(scenario.case_type.as_str(), "simple" | "basic") {
            return template;
        }
        match self
            .generator
            .generate(Role::Judge, scenario, Phase::Introduction, &[])
            .await
        {
            Some(text) => text,
            None => template,
        }
    }
}
