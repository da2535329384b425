// Line protocol for a presentation layer: one command per stdin line, one
// JSON reply per stdout line. Logs go to stderr so stdout stays clean.
use chrono::{Local, NaiveDate};
use menu_core::daily_log::LogQuery;
use menu_core::weekly::{DayOutcome, WeekRequest};
use menu_core::{DietProfile, EngineConfig, MenuEngine, MenuError};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{debug, error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config_path = std::env::args().nth(1);
    let config = EngineConfig::load(config_path.as_deref().map(Path::new))?;
    let mut engine = MenuEngine::open(&config)?;
    info!("menu bridge ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let input = line?;
        debug!(command = %input, "bridge <-");
        let parts: Vec<&str> = input.split_whitespace().collect();
        let command = parts.first().copied().unwrap_or("");
        let args = parts.get(1..).unwrap_or(&[]);

        let reply = match command.to_ascii_uppercase().as_str() {
            "GENERATE" => generate(&mut engine, args),
            "WEEK" => week(&mut engine, args, &config),
            "RESET" => match engine.reset_ledger() {
                Ok(cleared) => json!({ "status": "ok", "cleared": cleared }),
                Err(e) => failure(&e),
            },
            "QUERY" => match LogQuery::parse_words(args) {
                Ok(query) => json!({ "status": "ok", "entries": engine.query_log(&query) }),
                Err(message) => bad_request(message),
            },
            "STATUS" => status(&engine),
            "EXIT" => {
                info!("bridge received EXIT");
                break;
            }
            "" => continue,
            other => bad_request(format!("unknown command '{}'", other)),
        };

        writeln!(stdout, "{}", reply)?;
        stdout.flush()?;
    }
    info!("menu bridge shutting down");
    Ok(())
}

fn generate(engine: &mut MenuEngine, args: &[&str]) -> Value {
    let profile = match args {
        [] => DietProfile::None,
        [name] => match name.parse() {
            Ok(p) => p,
            Err(message) => return bad_request(message),
        },
        _ => return bad_request("usage: GENERATE [profile]".to_string()),
    };
    match engine.generate(profile) {
        Ok(menu) => json!({ "status": "ok", "menu": menu }),
        Err(e) => failure(&e),
    }
}

/// `WEEK [YYYY-MM-DD] [n | profile=n ... | profile ...]`; start defaults to today.
fn week(engine: &mut MenuEngine, args: &[&str], config: &EngineConfig) -> Value {
    let (start, rest) = match args.split_first() {
        Some((first, rest)) => match NaiveDate::parse_from_str(first, "%Y-%m-%d") {
            Ok(date) => (date, rest),
            Err(_) => (Local::now().date_naive(), args),
        },
        None => (Local::now().date_naive(), args),
    };
    let request = match WeekRequest::parse(start, config.week_length, DietProfile::None, rest) {
        Ok(request) => request,
        Err(message) => return bad_request(message),
    };

    match engine.generate_week(&request) {
        Ok(plan) => {
            let days: Vec<Value> = plan
                .days
                .iter()
                .map(|day| {
                    let mut value = json!({
                        "label": day.label.to_string(),
                        "index": day.label.index,
                        "date": day.label.date,
                        "profile": day.profile,
                    });
                    match &day.outcome {
                        DayOutcome::Menu(menu) => value["menu"] = json!(menu),
                        DayOutcome::Gap(reason) => {
                            value["gap"] = json!(reason);
                            value["message"] = json!(reason.to_string());
                        }
                    }
                    value
                })
                .collect();
            json!({
                "status": "ok",
                "planned": plan.successes().count(),
                "requested": plan.days.len(),
                "days": days,
            })
        }
        Err(e) => failure(&e),
    }
}

fn status(engine: &MenuEngine) -> Value {
    let profiles: Vec<Value> = DietProfile::ALL
        .iter()
        .map(|&profile| {
            json!({
                "profile": profile,
                "capacity": engine.capacity(profile).to_string(),
                "remaining": engine.remaining(profile).to_string(),
            })
        })
        .collect();
    json!({
        "status": "ok",
        "issued": engine.ledger().len(),
        "logged": engine.log().len(),
        "last_issued": engine.log().latest().map(|e| e.timestamp),
        "profiles": profiles,
    })
}

fn failure(e: &MenuError) -> Value {
    if e.is_unavailable() {
        json!({
            "status": "unavailable",
            "message": "No combination available",
            "reason": e.to_string(),
        })
    } else {
        error!(error = %e, "command failed");
        json!({ "status": "error", "message": e.to_string() })
    }
}

fn bad_request(message: String) -> Value {
    json!({ "status": "bad_request", "message": message })
}
