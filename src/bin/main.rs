use chrono::Local;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use menu_core::core::types::MenuAssignment;
use menu_core::daily_log::LogQuery;
use menu_core::weekly::{DayOutcome, WeekPlan, WeekRequest};
use menu_core::{DietProfile, EngineConfig, MenuEngine};
use std::io::{stdin, stdout, Write};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args().nth(1);
    let config = EngineConfig::load(config_path.as_deref().map(Path::new))?;
    let mut engine = MenuEngine::open(&config)?;
    let mut profile = DietProfile::None;
    let mut output = String::from("Press [Enter] for today's menu.");

    loop {
        print_ui(&engine, profile, &output)?;

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let words: Vec<&str> = input.split_whitespace().collect();

        output = match words.as_slice() {
            ["exit"] | ["quit"] => break,
            [] | ["today"] => today(&mut engine, profile),
            ["today", name] => match name.parse() {
                Ok(p) => today(&mut engine, p),
                Err(e) => e,
            },
            ["profile", name] => match name.parse() {
                Ok(p) => {
                    profile = p;
                    format!("Diet profile set to {}.", profile)
                }
                Err(e) => e,
            },
            ["week", rest @ ..] => {
                let start = Local::now().date_naive();
                match WeekRequest::parse(start, config.week_length, profile, rest) {
                    Ok(request) => match engine.generate_week(&request) {
                        Ok(plan) => render_week(&plan),
                        Err(e) => format!("{}", format!("Week aborted: {}", e).red()),
                    },
                    Err(e) => e,
                }
            }
            ["log", rest @ ..] => match LogQuery::parse_words(rest) {
                Ok(query) => render_log(&engine, &query),
                Err(e) => e,
            },
            ["status"] => render_status(&engine),
            ["reset"] => "Type 'reset yes' to forget every issued combination.".to_string(),
            ["reset", "yes"] => match engine.reset_ledger() {
                Ok(n) => format!("Ledger cleared ({} combinations forgotten).", n),
                Err(e) => format!("{}", format!("Reset failed: {}", e).red()),
            },
            _ => "Unknown command.".to_string(),
        };
    }

    println!("\nLedger and log are saved on every menu; nothing left to flush.");
    Ok(())
}

fn today(engine: &mut MenuEngine, profile: DietProfile) -> String {
    match engine.generate(profile) {
        Ok(menu) => render_menu(&menu),
        Err(e) if e.is_unavailable() => format!(
            "{}\n{}",
            "No combination available.".yellow(),
            e
        ),
        Err(e) => format!("{}", format!("Menu was not issued: {}", e).red()),
    }
}

fn render_menu(menu: &MenuAssignment) -> String {
    let mut out = format!(
        "{} ({} profile, issued {})\n",
        "Today's menu".bold(),
        menu.profile,
        menu.issued_at.format("%Y-%m-%d %H:%M %:z")
    );
    for slot in &menu.stations {
        out.push_str(&format!("  {:<8} {}\n", slot.station.as_str().bold(), slot.dish));
    }
    out
}

fn render_week(plan: &WeekPlan) -> String {
    let mut out = String::new();
    for day in &plan.days {
        out.push_str(&format!("{} [{}]\n", day.label.to_string().bold(), day.profile));
        match &day.outcome {
            DayOutcome::Menu(menu) => {
                let line: Vec<String> = menu
                    .stations
                    .iter()
                    .map(|s| format!("{}: {}", s.station, s.dish))
                    .collect();
                out.push_str(&format!("  {}\n", line.join(" | ")));
            }
            DayOutcome::Gap(reason) => {
                out.push_str(&format!("  {}\n", format!("-- gap: {}", reason).yellow()));
            }
        }
    }
    out.push_str(&format!(
        "{} of {} days planned.",
        plan.successes().count(),
        plan.days.len()
    ));
    out
}

fn render_log(engine: &MenuEngine, query: &LogQuery) -> String {
    let entries = engine.query_log(query);
    if entries.is_empty() {
        return "No matching history.".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let dishes: Vec<&str> = entry.stations.iter().map(|s| s.dish.as_str()).collect();
        out.push_str(&format!(
            "{} [{}] {}\n",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.diet_profile,
            dishes.join(", ")
        ));
    }
    out
}

fn render_status(engine: &MenuEngine) -> String {
    let mut out = format!("Issued combinations: {}\n", engine.ledger().len());
    for profile in DietProfile::ALL {
        out.push_str(&format!(
            "  {:<13} {} of {} remaining\n",
            profile.as_str(),
            engine.remaining(profile),
            engine.capacity(profile)
        ));
    }
    out
}

fn print_ui(
    engine: &MenuEngine,
    profile: DietProfile,
    output: &str,
) -> std::io::Result<()> {
    let mut stdout = stdout();
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    println!("{}", "Curry Shack Menu Generator".bold());
    println!("---------------------------------------------------------------");
    println!("[Enter] today's menu  | today <profile> | profile <none|jain|swaminarayan>");
    println!("week [n | profile=n ... | profile ...] | log [<from> <to>] [dish <name>]");
    println!("status | reset | exit\n");
    println!(
        "Profile: {}   Issued so far: {}\n",
        profile.as_str().cyan(),
        engine.ledger().len()
    );
    println!("{}", output);
    print!("\n> ");
    stdout.flush()
}
