//! pet-runner: headless runner for a Regenmon pet.
//!
//! Usage:
//!   pet-runner --user alice --name Mochi --species fire --ticks 60 --db pets.db
//!   pet-runner --seed 7 --ticks 120 --care-every 4
//!   pet-runner --user alice --db pets.db --ipc-mode
//!   pet-runner --hub ...   (talk to the real Hub instead of playing offline)
//!   pet-runner --realtime --seconds 45   (wall clock, live decay and sync timers)
//!   pet-runner --evaluate drawing.png --category diseño   (needs EVALUATOR_API_KEY)

use anyhow::Result;
use chrono::{TimeZone, Utc};
use regenmon_core::{
    action::PetAction,
    clock::{Clock, ManualClock, SystemClock},
    config::GameConfig,
    evaluator::{EvaluationCategory, EvaluationResult, Upload, VisionEvaluator},
    hub::{HubApi, HubClient, OfflineHub},
    progress::evolution_progress,
    rng::PetRng,
    snapshot::{PetSnapshot, Species},
    store::SqliteStore,
    LifecycleController, Phase,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick { count: u64 },
    Action { action: PetAction },
    Evaluate { score: u8 },
    TogglePublic,
    Reset,
    Start { name: String, species: Species },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    phase:     Phase,
    now:       i64,
    pet:       Option<PetSnapshot>,
    emotion:   Option<regenmon_core::snapshot::Emotion>,
    countdown: Option<regenmon_core::progress::EvolutionProgress>,
}

struct RunArgs {
    rng:        PetRng,
    ticks:      u64,
    care_every: u64,
    user:       String,
    name:       String,
    species:    Species,
    ipc_mode:   bool,
    realtime:   Option<u64>,
    evaluate:   Option<(String, EvaluationCategory)>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let rng = match args.windows(2).find(|w| w[0] == "--seed").and_then(|w| w[1].parse().ok()) {
        Some(seed) => PetRng::new(seed),
        None => PetRng::from_entropy(),
    };
    let ticks = parse_arg(&args, "--ticks", 60u64);
    let care_every = parse_arg(&args, "--care-every", 0u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let use_hub = args.iter().any(|a| a == "--hub");
    let db = string_arg(&args, "--db", ":memory:");
    let data_dir = string_arg(&args, "--data-dir", "./data");
    let user = string_arg(&args, "--user", "local-user");
    let name = string_arg(&args, "--name", "Regenmon");
    let species: Species = string_arg(&args, "--species", "fire").parse()?;
    let realtime = args
        .iter()
        .any(|a| a == "--realtime" && !ipc_mode)
        .then(|| parse_arg(&args, "--seconds", 60u64));
    let evaluate = match args.windows(2).find(|w| w[0] == "--evaluate") {
        Some(w) => Some((w[1].clone(), parse_category(string_arg(&args, "--category", "letras"))?)),
        None => None,
    };

    let config = if std::path::Path::new(&format!("{data_dir}/game.json")).exists() {
        GameConfig::load(data_dir)?
    } else {
        log::warn!("{data_dir}/game.json not found, using built-in defaults");
        GameConfig::default()
    };

    if !ipc_mode {
        println!("Regenmon pet-runner");
        println!("  seed:      {}", rng.seed());
        match realtime {
            Some(secs) => println!("  realtime:  {secs}s"),
            None => println!("  ticks:     {ticks}"),
        }
        println!("  db:        {db}");
        println!("  user:      {user}");
        println!("  hub:       {}", if use_hub { config.hub.base_url.as_str() } else { "offline" });
        println!();
    }

    let store = if db == ":memory:" {
        SqliteStore::in_memory()?
    } else {
        SqliteStore::open(db)?
    };
    store.migrate()?;

    let run = RunArgs {
        rng,
        ticks,
        care_every,
        user: user.to_string(),
        name: name.to_string(),
        species,
        ipc_mode,
        realtime,
        evaluate,
    };

    if use_hub {
        let hub = HubClient::new(&config.hub)?;
        run_with(config, Arc::new(store), Arc::new(hub), run).await
    } else {
        run_with(config, Arc::new(store), Arc::new(OfflineHub), run).await
    }
}

async fn run_with<H: HubApi>(
    config: GameConfig,
    store: Arc<SqliteStore>,
    hub: Arc<H>,
    run: RunArgs,
) -> Result<()> {
    let manual = Arc::new(ManualClock::new(Utc::now().timestamp_millis()));
    let clock: Arc<dyn Clock> = match run.realtime {
        Some(_) => Arc::new(SystemClock),
        None => manual.clone(),
    };
    let step = config.timing.decay_interval_ms as i64;
    let evaluator_config = config.evaluator.clone();
    let controller = LifecycleController::new(
        config,
        Arc::clone(&store),
        hub,
        Arc::clone(&clock),
        Box::new(run.rng),
    );

    controller.sign_in(&run.user).await;
    if controller.load().await?.is_none() && !run.ipc_mode {
        controller.start_game(&run.name, run.species).await?;
    }

    if let Some((path, category)) = &run.evaluate {
        let evaluator = VisionEvaluator::from_env(&evaluator_config)?;
        let upload = Upload { bytes: std::fs::read(path)?, mime: mime_for(path).to_string() };
        let (result, _) = controller.evaluate_upload(&evaluator, &upload, *category).await?;
        println!("  evaluation:     {}/100  {}", result.score, result.feedback);
    }

    if run.ipc_mode {
        run_ipc_loop(&controller, &manual, step).await?;
    } else if let Some(secs) = run.realtime {
        controller.spawn_timers();
        tokio::time::sleep(Duration::from_secs(secs)).await;
        print_summary(&controller, &store, clock.as_ref(), &format!("{secs}s realtime")).await?;
    } else {
        let care = [PetAction::Eat, PetAction::Play, PetAction::Train];
        for i in 1..=run.ticks {
            manual.advance(step);
            controller.tick().await?;
            if run.care_every > 0 && i % run.care_every == 0 {
                let action = care[((i / run.care_every) % care.len() as u64) as usize];
                controller.perform_action(action).await?;
            }
        }
        print_summary(&controller, &store, clock.as_ref(), &format!("{} ticks", run.ticks)).await?;
    }

    controller.shutdown().await;
    Ok(())
}

async fn run_ipc_loop<H: HubApi>(
    controller: &LifecycleController<SqliteStore, H>,
    clock: &ManualClock,
    step: i64,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = stdin.lock().read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let outcome = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => Ok(()),
            IpcCommand::Tick { count } => {
                for _ in 0..count {
                    clock.advance(step);
                    controller.tick().await?;
                }
                Ok(())
            }
            IpcCommand::Action { action } => controller.perform_action(action).await.map(|_| ()),
            IpcCommand::Evaluate { score } => {
                let result = EvaluationResult { score, feedback: String::new() };
                controller.handle_evaluation(&result).await.map(|_| ())
            }
            IpcCommand::TogglePublic => controller.toggle_public().await.map(|_| ()),
            IpcCommand::Reset => controller.reset_game().await,
            IpcCommand::Start { name, species } => {
                controller.start_game(&name, species).await.map(|_| ())
            }
        };

        match outcome {
            Ok(()) => {
                let state = build_ui_state(controller, clock).await;
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
            Err(e) => {
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

async fn build_ui_state<H: HubApi>(
    controller: &LifecycleController<SqliteStore, H>,
    clock: &ManualClock,
) -> UiState {
    let now = clock.now();
    let rules = &controller.config().rules;
    let pet = controller.snapshot().await;
    UiState {
        phase: controller.phase().await,
        now,
        emotion: pet.as_ref().map(|p| p.emotion(rules.happy_threshold)),
        countdown: pet.as_ref().and_then(|p| evolution_progress(p, now, rules)),
        pet,
    }
}

async fn print_summary<H: HubApi>(
    controller: &LifecycleController<SqliteStore, H>,
    store: &SqliteStore,
    clock: &dyn Clock,
    ran: &str,
) -> Result<()> {
    let now = clock.now();
    let rules = &controller.config().rules;

    println!("=== RUN SUMMARY ===");
    println!("  ran:            {ran}");
    println!("  database:       {}", store.path().unwrap_or(":memory:"));
    println!("  phase:          {:?}", controller.phase().await);
    println!("  users stored:   {}", store.user_count()?);

    let Some(pet) = controller.snapshot().await else {
        println!("  (no pet)");
        return Ok(());
    };

    println!();
    println!("=== {} the {} ===", pet.name, pet.species);
    println!("  stage:          {}", pet.stage);
    println!("  emotion:        {:?}", pet.emotion(rules.happy_threshold));
    println!(
        "  stats:          hunger {} | happiness {} | energy {}",
        pet.stats.hunger, pet.stats.happiness, pet.stats.energy
    );
    println!("  coins:          {}", pet.coins);
    println!("  total points:   {}", pet.hub.total_points);
    println!("  trainings:      {}", pet.total_trainings);
    println!("  happy time:     {}s", pet.happy_time_accumulated / 1000);
    match pet.death_timer {
        Some(at) => println!("  death timer:    armed {}s ago", (now - at) / 1000),
        None => println!("  death timer:    -"),
    }
    match evolution_progress(&pet, now, rules) {
        Some(p) => println!(
            "  evolves to {}:  {} left ({:.0}%){}",
            p.next_stage,
            p.remaining_label(),
            p.percent,
            if p.paused { " [paused]" } else { "" }
        ),
        None => println!("  evolution:      final stage"),
    }
    if let Some(born) = Utc.timestamp_millis_opt(pet.birth_time).single() {
        println!("  born:           {}", born.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str, default: &'a str) -> &'a str {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
        .unwrap_or(default)
}

fn parse_category(s: &str) -> Result<EvaluationCategory> {
    match s {
        "letras" => Ok(EvaluationCategory::Letters),
        "poemas" => Ok(EvaluationCategory::Poems),
        "diseño" | "diseno" => Ok(EvaluationCategory::Design),
        other => anyhow::bail!("unknown category '{other}' (letras, poemas, diseño)"),
    }
}

fn mime_for(path: &str) -> &'static str {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}
