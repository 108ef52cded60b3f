//! skirmish - sandbox encounter
//!
//! Pits one hero against a team of target bots. The hero is driven from
//! stdin (or by the autopilot with `--auto`); events are printed as JSON
//! lines and the outcome as a final JSON object.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skirmish::combat::{
    ActionEvent, ActionPrompt, AutoPilot, ChannelController, ChannelHandle, ChoiceOutcome,
    Controller, EncounterState, Roller, Scheduler, SkillChoice, Team,
};
use skirmish::config::CombatConfig;
use skirmish::roster::{CharacterSheet, HeroKind, SimpleMonster, TargetKind};

/// Sandbox encounter against target bots
#[derive(Parser, Debug)]
#[command(
    name = "skirmish",
    version,
    about = "Fight target bots in a sandbox encounter"
)]
struct Args {
    /// TOML file with combat tuning overrides
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hero to play (delta, moonlark, or a hero id)
    #[arg(long, default_value = "delta")]
    hero: String,

    /// JSON character sheet; overrides --hero
    #[arg(long)]
    sheet: Option<PathBuf>,

    /// Level of the target bots
    #[arg(short = 'l', long, default_value_t = 1)]
    monster_level: u32,

    /// Number of target bots
    #[arg(short = 'n', long, default_value_t = 1)]
    monster_count: usize,

    /// Seed for reproducible rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Let the autopilot play the hero
    #[arg(long)]
    auto: bool,
}

fn load_sheet(args: &Args) -> Result<CharacterSheet> {
    match &args.sheet {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;
            serde_json::from_str(&raw)
                .map_err(|e| anyhow!("Invalid character sheet {}: {}", path.display(), e))
        }
        None => {
            let hero: HeroKind = args
                .hero
                .parse()
                .map_err(|_| anyhow!("Unknown hero: {}", args.hero))?;
            Ok(CharacterSheet::new(hero))
        }
    }
}

fn print_events(events: &[ActionEvent]) {
    for event in events {
        match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!(error = %e, "failed to encode event"),
        }
    }
}

fn print_prompt(prompt: &ActionPrompt) {
    println!(
        "-- {} acts (skill points {}/{}) --",
        prompt.actor_name, prompt.skill_points, prompt.max_skill_points
    );
    for skill in &prompt.skills {
        println!("  [{}] {} ({:?})", skill.index, skill.name, skill.cost);
    }
    for (i, enemy) in prompt.enemies.iter().enumerate() {
        println!(
            "  target {}: {} {:.0}/{:.0} hp, balance {:.0}",
            i, enemy.name, enemy.health, enemy.max_health, enemy.balance
        );
    }
    println!("  enter `<skill> [target]`, `pass` or `quit`");
}

/// Parse `<skill> [target]`, `pass` or `quit`
fn parse_choice(line: &str, prompt: &ActionPrompt) -> Option<ChoiceOutcome> {
    let mut words = line.split_whitespace();
    let first = words.next()?;
    match first {
        "pass" | "skip" => return Some(ChoiceOutcome::Pass),
        "quit" | "forfeit" => return Some(ChoiceOutcome::Forfeit),
        _ => {}
    }
    let skill: usize = first.parse().ok()?;
    let target_index: Option<usize> = match words.next() {
        Some(word) => Some(word.parse().ok()?),
        None => None,
    };
    let kind = prompt
        .skills
        .iter()
        .find(|s| s.index == skill)
        .map(|s| s.target)
        .unwrap_or(TargetKind::Enemy);
    let target = match kind {
        TargetKind::Enemy => prompt.enemies.get(target_index.unwrap_or(0)).map(|t| t.id),
        TargetKind::Ally => prompt.allies.get(target_index.unwrap_or(0)).map(|t| t.id),
        TargetKind::Caster => Some(prompt.actor),
        TargetKind::None => None,
    };
    Some(ChoiceOutcome::Chosen(SkillChoice::new(skill, target)))
}

/// Answer prompts from stdin until the encounter or stdin ends
async fn stdin_front_end(mut handle: ChannelHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(pending) = handle.prompts.recv().await {
        let prompt = &pending.body;
        print_events(&prompt.events);
        print_prompt(prompt);
        let outcome = loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_choice(&line, prompt) {
                    Some(outcome) => break outcome,
                    None => println!("  could not parse `{}`", line.trim()),
                },
                _ => break ChoiceOutcome::Forfeit,
            }
        };
        if handle.choices.send(pending.reply(outcome)).await.is_err() {
            break;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; stdout is reserved for events
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skirmish=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    if args.monster_count == 0 {
        bail!("--monster-count must be at least 1");
    }

    let config = CombatConfig::load(args.config.as_deref())
        .map_err(|e| anyhow!("Failed to load config: {}", e))?;
    let sheet = load_sheet(&args)?;
    let (hero_level, weapon_level) = (sheet.level(), sheet.weapon.level());

    let controller: Arc<dyn Controller> = if args.auto {
        Arc::new(AutoPilot)
    } else {
        let (controller, handle) = ChannelController::pair(config.input_timeout());
        tokio::spawn(stdin_front_end(handle));
        Arc::new(controller)
    };

    let roller = match args.seed {
        Some(seed) => Roller::seeded(seed),
        None => Roller::from_entropy(),
    };
    let mut scheduler = Scheduler::with_roller(config.clone(), roller);

    let heroes = Team::controlled("heroes", &config, controller)
        .with_combatant(sheet.into_combatant(&config));
    let mut bots = Team::new("bots", &config);
    for _ in 0..args.monster_count {
        bots.register_combatant(SimpleMonster::target_bot(args.monster_level, &config));
    }

    let heroes = scheduler.register_team(heroes)?;
    scheduler.register_team(bots)?;
    scheduler.setup()?;

    info!(encounter = %scheduler.id(), hero_level, weapon_level, "sandbox started");
    let winner = scheduler.run().await?;
    print_events(&scheduler.drain_events(heroes)?);

    let outcome = match scheduler.state() {
        EncounterState::Won(team) if team == heroes => "win",
        EncounterState::Won(_) => "lose",
        EncounterState::Draw => "draw",
        EncounterState::TimedOut => "timeout",
        EncounterState::Setup | EncounterState::Running => "unfinished",
    };
    let summary = serde_json::json!({
        "encounter": scheduler.id(),
        "outcome": outcome,
        "winner": winner.map(|t| t.0),
        "actions": scheduler.actions(),
        "hero_level": hero_level,
        "weapon_level": weapon_level,
    });
    println!("{}", summary);
    Ok(())
}
