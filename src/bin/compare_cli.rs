use std::io::{self, Write};

use model_compare::ClientConfig;
use model_compare::session::clipboard::Osc52Clipboard;
use model_compare::session::{ComparisonSession, FORM_LANGUAGES, FormField};
use tracing_subscriber::EnvFilter;

const MAX_STARS: usize = 5;
const RANK_RANGE: std::ops::RangeInclusive<i32> = 1..=8;
const STAR_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

struct CliArgs {
    language: Option<String>,
    classification: Option<String>,
    record_service: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1).collect())?;
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = args.record_service {
        config.record_service_url = url;
    }

    let mut session = config.build_session()?;
    if let Some(language) = args.language {
        session.update_form(FormField::Language, &language);
    }
    if let Some(classification) = args.classification {
        session.update_form(FormField::Classification, &classification);
    }

    eprintln!(
        "compare_cli: {} models, language={}, classification={}, type /help for commands",
        session.catalog().len(),
        session.form().language,
        session.form().classification
    );

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        let bytes = stdin.read_line(&mut input)?;
        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command.to_ascii_lowercase().as_str() {
            "/quit" | "/exit" => break,
            "/help" => print_help(),
            "/lang" => {
                if rest.is_empty() {
                    println!("languages: {}", FORM_LANGUAGES.join(", "));
                } else {
                    session.update_form(FormField::Language, rest);
                    println!("(language set to {})", session.form().language);
                }
            }
            "/class" => {
                session.update_form(FormField::Classification, rest);
                println!("(classification set to {})", session.form().classification);
            }
            "/generate" => {
                if !rest.is_empty() {
                    session.update_form(FormField::Message, rest);
                }
                generate(&mut session).await;
            }
            "/rank" => match parse_rank(rest) {
                Some((model, value)) => session.set_ranking(&model, value),
                None => eprintln!("usage: /rank MODEL 1-8"),
            },
            "/rate" => match parse_stars(rest) {
                Some((model, value)) => session.set_rating(&model, value),
                None => eprintln!("usage: /rate MODEL 1-5"),
            },
            "/show" => print_cards(&session),
            "/submit" => {
                let report = session.submit().await;
                println!("(saved {}, failed {})", report.saved, report.failed);
            }
            "/export" => {
                let dir = config.export_dir.clone();
                match session.export_to_csv(&dir).await {
                    Ok(path) => println!("(exported to {})", path.display()),
                    Err(_) => print_session_error(&session),
                }
            }
            "/copy" => {
                let mut clipboard = Osc52Clipboard::stdout();
                if session.copy_to_clipboard(&mut clipboard).is_ok()
                    && session.copied_notice_visible()
                {
                    println!("\n(Copied!)");
                }
            }
            other if other.starts_with('/') => eprintln!("unknown command: {other}"),
            _ => {
                session.update_form(FormField::Message, line);
                generate(&mut session).await;
            }
        }
    }

    Ok(())
}

async fn generate(session: &mut ComparisonSession) {
    println!("(loading...)");
    match session.generate().await {
        Ok(report) => {
            print_cards(session);
            if report.skipped > 0 {
                println!("({} model(s) skipped for questions)", report.skipped);
            }
            print_session_error(session);
        }
        Err(_) => print_session_error(session),
    }
}

fn print_session_error(session: &ComparisonSession) {
    if let Some(error) = session.error() {
        eprintln!("error: {error}");
    }
}

fn print_cards(session: &ComparisonSession) {
    for model in session.catalog().model_ids() {
        let text = session
            .translations()
            .get(model)
            .map(String::as_str)
            .unwrap_or("No translation yet");
        let rank = session
            .rankings()
            .get(model)
            .map(|rank| rank.to_string())
            .unwrap_or_else(|| "-".to_string());
        let rating = session.ratings().get(model).copied().unwrap_or(0.0);

        println!("[{model}] rank {rank} {}", star_bar(rating));
        println!("  {text}");
    }
}

fn star_bar(rating: f64) -> String {
    let filled = (rating.round().clamp(0.0, MAX_STARS as f64)) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(MAX_STARS - filled))
}

fn parse_score<T: std::str::FromStr>(rest: &str) -> Option<(String, T)> {
    let (model, value) = rest.rsplit_once(char::is_whitespace)?;
    let model = model.trim();
    if model.is_empty() {
        return None;
    }
    Some((model.to_string(), value.trim().parse().ok()?))
}

/// `MODEL N` with N between 1 and the number of compared models.
fn parse_rank(rest: &str) -> Option<(String, i32)> {
    parse_score::<i32>(rest).filter(|(_, value)| RANK_RANGE.contains(value))
}

/// `MODEL N` with N whole stars, stored as a rating.
fn parse_stars(rest: &str) -> Option<(String, f64)> {
    parse_score::<u8>(rest)
        .filter(|(_, stars)| STAR_RANGE.contains(stars))
        .map(|(model, stars)| (model, f64::from(stars)))
}

fn parse_args(args: Vec<String>) -> Result<CliArgs, Box<dyn std::error::Error>> {
    let mut parsed = CliArgs {
        language: None,
        classification: None,
        record_service: None,
    };

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--language" => {
                let value = args.get(i + 1).ok_or("missing value for --language")?;
                parsed.language = Some(value.trim().to_string());
                i += 2;
            }
            "--classification" => {
                let value = args
                    .get(i + 1)
                    .ok_or("missing value for --classification (translation|question)")?;
                parsed.classification = Some(value.trim().to_string());
                i += 2;
            }
            "--record-service" => {
                let value = args
                    .get(i + 1)
                    .ok_or("missing value for --record-service")?
                    .trim()
                    .to_string();
                if value.is_empty() {
                    return Err("--record-service must be non-empty".into());
                }
                parsed.record_service = Some(value);
                i += 2;
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                return Err(format!("unknown argument: {other}").into());
            }
        }
    }

    Ok(parsed)
}

fn print_usage() {
    println!(
        "Usage:\n  cargo run --bin compare_cli -- [--language LANG] [--classification translation|question] [--record-service URL]\n\nEnv:\n  OPENAI_API_KEY / GOOGLE_API_KEY / DEEPL_API_KEY\n  OPENAI_BASE_URL / GEMINI_BASE_URL / DEEPL_BASE_URL\n  RECORD_SERVICE_URL\n  MODEL_COMPARE_TIMEOUT_MS\n  MODEL_COMPARE_EXPORT_DIR\n  MODEL_COMPARE_MODELS (e.g. openai:gpt-4,deepl:deepl)\n"
    );
    print_help();
}

fn print_help() {
    println!(
        "Commands:\n  TEXT              use TEXT as the message and generate\n  /generate [TEXT]  run every model on the current message\n  /lang [LANG]      set the target language (no argument lists them)\n  /class KIND       translation or question\n  /rank MODEL 1-8   rank one model's output\n  /rate MODEL 1-5   rate one model's output\n  /show             print the result cards\n  /submit           save every result to the record service\n  /export           download the records as output_file.csv\n  /copy             copy the results as JSON\n  /quit             quit"
    );
}
