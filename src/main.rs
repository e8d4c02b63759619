use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use courtsim::config::LlmConfig;
use courtsim::{
    ActorResponseGenerator, CounselStrategy, CourtSimulator, FeedbackCategory, FeedbackGenerator,
    HttpCompletionClient, JudgePersonality, Role, ScenarioStore, SimulationSnapshot,
};

const DEFAULT_SCENARIO_DIR: &str = "data/scenarios";

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush().ok();
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}

fn print_turn(state: &SimulationSnapshot) {
    if let Some(turn) = state.transcript.last() {
        println!("\n[{}] {}:", state.phase.name(), turn.role.display_name());
        println!("{}\n", turn.content);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = LlmConfig::from_env()?;
    let scenario_dir =
        std::env::var("COURTSIM_SCENARIO_DIR").unwrap_or_else(|_| DEFAULT_SCENARIO_DIR.to_string());
    let store = ScenarioStore::new(scenario_dir);

    let client = HttpCompletionClient::new(cfg);
    let mut sim = CourtSimulator::new(store, ActorResponseGenerator::new(client.clone()));

    let scenarios = sim.load_scenarios();
    if scenarios.is_empty() {
        println!("No scenarios found. Add case records under {DEFAULT_SCENARIO_DIR}/.");
        return Ok(());
    }

    println!("Available scenarios:");
    for scenario in &scenarios {
        println!(
            "  {id} - {title} ({difficulty})",
            id = scenario.id,
            title = scenario.title,
            difficulty = scenario.difficulty
        );
    }

    let scenario_id = prompt_line("\nEnter a scenario id: ")?;

    println!("\nJudge personalities:");
    for personality in JudgePersonality::ALL {
        println!(
            "  {key} - {desc}",
            key = personality.key(),
            desc = personality.description()
        );
    }
    println!("Counsel strategies:");
    for strategy in CounselStrategy::ALL {
        println!(
            "  {key} - {desc}",
            key = strategy.key(),
            desc = strategy.description()
        );
    }

    let judge = prompt_line("\nJudge personality (blank for scenario default): ")?;
    let plaintiff = prompt_line("Plaintiff counsel strategy (blank for default): ")?;
    let defendant = prompt_line("Defendant counsel strategy (blank for default): ")?;
    sim.set_custom_personas(
        (!judge.is_empty()).then_some(judge.as_str()),
        (!plaintiff.is_empty()).then_some(plaintiff.as_str()),
        (!defendant.is_empty()).then_some(defendant.as_str()),
    );

    let state = sim.start_simulation(&scenario_id).await?;
    println!(
        "\nCourt is in session: {title} ({case_type})",
        title = state.scenario_title,
        case_type = state.case_type
    );
    print_turn(&state);

    loop {
        if sim.get_state()?.completed {
            break;
        }

        let command = prompt_line("[Enter] advance | a auto | p pause | q quit > ")?;
        match command.as_str() {
            "" => {
                let state = sim.advance_simulation().await?;
                print_turn(&state);
            }
            "a" => {
                sim.set_auto_advance(true, Some(Duration::from_secs(3)))?;
                if sim.get_state()?.paused {
                    sim.toggle_pause()?;
                }
                println!("Auto-advance on; running to the ruling.\n");
                while !sim.get_state()?.completed {
                    if sim.should_auto_advance() {
                        let state = sim.advance_simulation().await?;
                        print_turn(&state);
                    } else {
                        tokio::time::sleep(Duration::from_millis(200)).await;
                    }
                }
            }
            "p" => {
                let state = sim.toggle_pause()?;
                println!(
                    "Simulation {}.",
                    if state.paused { "paused" } else { "resumed" }
                );
            }
            "q" => {
                println!("Adjourned early.");
                return Ok(());
            }
            other => println!("Unknown command: {other}"),
        }
    }

    println!("===== Proceeding complete =====");

    let state = sim.get_state()?;
    let plaintiff_turns: Vec<_> = state
        .transcript
        .iter()
        .filter(|turn| turn.role == Role::PlaintiffCounsel)
        .cloned()
        .collect();

    if let Some(scenario) = sim.active_scenario() {
        println!("\nEvaluating plaintiff counsel's performance...");
        let feedback = FeedbackGenerator::new(client)
            .evaluate(scenario, &state.transcript, &plaintiff_turns)
            .await;

        println!("\n===== Performance Feedback =====");
        for category in FeedbackCategory::ALL {
            println!(
                "{label}: {score} ({desc})",
                label = category.label(),
                score = feedback.scores.get(category),
                desc = category.description()
            );
        }
        if !feedback.highlights.is_empty() {
            println!("\nHighlights:");
            for highlight in &feedback.highlights {
                println!("  - {highlight}");
            }
        }
        if !feedback.suggestions.is_empty() {
            println!("\nSuggestions:");
            for suggestion in &feedback.suggestions {
                println!("  - {suggestion}");
            }
        }
        println!("\nFull evaluation:\n{}", feedback.summary);
    }

    Ok(())
}
