use kb_tile_games::games;
use kb_tile_games::logging;
use kb_tile_games::storage::Store;
use std::env;

fn main()
{
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String>
{
    let mut args = env::args().skip(1);
    let command = args.next();
    let rest: Vec<String> = args.collect();
    match command.as_deref() {
        None => interactive_menu(),
        Some("list") => {
            list_games();
            Ok(())
        }
        Some("-h") | Some("--help") => {
            print_help();
            Ok(())
        }
        Some(other) => match games::lookup(other) {
            Some(name) => run_game(name, &rest),
            None => Err(format!("Unknown command '{other}'. Run with --help.")),
        },
    }
}

fn run_game(name: &str, args: &[String]) -> Result<(), String>
{
    let store = Store::from_env().map_err(|err| err.to_string())?;
    if let Err(err) = logging::init(&store) {
        eprintln!("Warning: logging disabled ({err}).");
    }

    match name {
        "2048" => {
            let config = games::twenty48::Twenty48Config::from_args(args)?;
            games::twenty48::run_with_config(&store, config)
        }
        "snake" => {
            let config = games::snake::SnakeConfig::from_args(args)?;
            games::snake::run_with_config(config)
        }
        "typing" => {
            let config = games::typing::TypingConfig::from_args(args)?;
            games::typing::run_with_config(config)
        }
        _ => Err(format!("Unknown game '{name}'. Run with --help.")),
    }
}

fn interactive_menu() -> Result<(), String>
{
    let registry = games::registry();
    println!("KB Games");
    println!();
    println!("Select a game:");
    for (idx, game) in registry.iter().enumerate() {
        println!("  {}. {} - {}", idx + 1, game.name, game.description);
    }
    println!();
    print!("Enter number or name (default 1, q to quit): ");
    std::io::Write::flush(&mut std::io::stdout())
        .map_err(|err| format!("Failed to flush stdout: {err}"))?;

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .map_err(|err| format!("Failed to read input: {err}"))?;
    let choice = input.trim();

    if choice.is_empty() {
        return run_game(registry[0].name, &[]);
    }
    if choice.eq_ignore_ascii_case("q") {
        return Ok(());
    }
    if let Ok(index) = choice.parse::<usize>() {
        if index >= 1 && index <= registry.len() {
            return run_game(registry[index - 1].name, &[]);
        }
    }

    match games::lookup(choice) {
        Some(name) => run_game(name, &[]),
        None => Err("Invalid selection.".to_string()),
    }
}

fn list_games()
{
    println!("Available games:");
    for game in games::registry() {
        println!("  {:<10} - {}", game.name, game.description);
    }
}

fn print_help()
{
    println!("kb-tile-games");
    println!("\nUsage:");
    println!("  kb-tile-games list");
    println!("  kb-tile-games 2048 [--seed=N] [--new]");
    println!("  kb-tile-games snake [--seed=N] [--size=20]");
    println!("  kb-tile-games typing [--seed=N] [--seconds=60]");
    println!("\nNotes:");
    println!("  2048 progress and best score are kept in the data directory.");
    println!("  Set KB_GAMES_DATA_DIR to override it (default ~/.local/share/kb-tile-games).");
    println!("  Set KB_GAMES_LOG to a filter such as 'debug' for a more verbose log file.");
}
