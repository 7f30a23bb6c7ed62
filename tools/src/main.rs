//! sim-runner: headless simulation runner for Ashgrove.
//!
//! Usage:
//!   sim-runner --seed 12345 --ticks 200 --data-dir ./data
//!   sim-runner --seed 12345 --builtin
//!   sim-runner --seed 12345 --ipc-mode

use anyhow::Result;
use ashgrove_core::{
    config::SimConfig,
    engine::SimEngine,
    snapshot::WorldSnapshot,
    weather::WeatherState,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick {
        count: u64,
    },
    SetWeather {
        weather: WeatherState,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    paused: bool,
    journal_entries: usize,
    #[serde(flatten)]
    snapshot: WorldSnapshot,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 200u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let builtin = args.iter().any(|a| a == "--builtin");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    if !ipc_mode {
        println!("Ashgrove — sim-runner");
        println!("  seed:      {seed}");
        println!("  ticks:     {ticks}");
        println!("  data_dir:  {}", if builtin { "(builtin)" } else { data_dir });
        println!();
    }

    let config = if builtin { SimConfig::default_test() } else { SimConfig::load(data_dir)? };
    let run_id = format!("run-{seed}");
    let mut engine = SimEngine::build(run_id, seed, &config)?;

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        engine.run_ticks(ticks)?;
        print_summary(&engine, ticks);
    }

    Ok(())
}

fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
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

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Tick { count } => {
                engine.run_ticks(count)?;
            }
            IpcCommand::GetState => {}
            IpcCommand::SetWeather { weather } => {
                engine.set_weather(weather)?;
            }
        }
        writeln!(stdout, "{}", serde_json::to_string(&build_ui_state(engine))?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state(engine: &SimEngine) -> UiState {
    UiState {
        paused: engine.clock.paused,
        journal_entries: engine.journal().len(),
        snapshot: engine.snapshot(),
    }
}

fn print_summary(engine: &SimEngine, ticks: u64) {
    let journal = engine.journal();
    let snapshot = engine.snapshot();

    println!("=== RUN SUMMARY ===");
    println!("  run_id:          {}", engine.run_id);
    println!("  ticks run:       {ticks}");
    println!("  final tick:      {}", engine.clock.current_tick);
    println!("  weather:         {:?}", snapshot.weather);
    println!("  spawns:          {}", journal.count_of("actor_spawned"));
    println!("  blocked spawns:  {}", journal.count_of("spawn_blocked"));
    println!("  actions:         {}", journal.count_of("action_taken"));
    println!("  defeats:         {}", journal.count_of("actor_defeated"));
    println!("  weather changes: {}", journal.count_of("weather_changed"));
    println!("  player revivals: {}", journal.count_of("player_revived"));

    if let Some(player) = &snapshot.player {
        println!();
        println!(
            "  {} on {} at ({}, {}) | HP {}/{} | stamina {}",
            player.name,
            player.map,
            player.x,
            player.y,
            player.hit_points,
            player.max_hit_points,
            player.stamina.map_or_else(|| "-".to_string(), |s| s.to_string())
        );
    }

    for map in &snapshot.maps {
        println!();
        println!(
            "=== {} === actors: {} | spawned: {} | items: {}",
            map.name, map.actors, map.spawned, map.items
        );
        print!("{}", map.render);
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
