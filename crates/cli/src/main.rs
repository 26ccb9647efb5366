// NeuralCalc CLI - scientific calculator with an optional AI assistant

mod exit_codes;
mod keys;
mod tui;
mod util;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use neuralcalc_assistant::AssistantClient;
use neuralcalc_config::ai::{self, AiConfigStatus, AiDiagnostics, ResolvedAiConfig};
use neuralcalc_config::settings::Settings;
use neuralcalc_engine::{evaluate_expression, AngleUnit};

use exit_codes::{
    EXIT_AI_DISABLED, EXIT_AI_KEYCHAIN_ERR, EXIT_AI_MISSING_KEY, EXIT_AI_REQUEST, EXIT_ERROR,
    EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "ncalc")]
#[command(about = "Scientific calculator with an AI assistant (terminal mode)")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression and print the result
    #[command(after_help = "\
Examples:
  ncalc eval '2+2'
  ncalc eval 'sin(90)'
  ncalc eval --angle rad 'sin(PI/2)'
  ncalc eval 'sqrt(2)^2'")]
    Eval {
        /// Expression to evaluate
        expression: String,

        /// Angle unit for trig functions (deg or rad)
        #[arg(long, default_value = "deg")]
        angle: String,
    },

    /// Ask the AI assistant a one-shot question
    #[command(after_help = "\
Examples:
  ncalc ask 'why does 0.1+0.2 show as 0.3 here?'
  ncalc ask 'convert 3 radians to degrees'")]
    Ask {
        /// Question for the assistant
        message: String,
    },

    /// AI configuration and diagnostics
    Ai {
        #[command(subcommand)]
        command: AiCommands,
    },
}

#[derive(Subcommand)]
enum AiCommands {
    /// Check assistant configuration
    Doctor {
        /// Output as JSON for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Store the Gemini API key in the system keychain (reads stdin)
    SetKey,

    /// Remove the Gemini API key from the system keychain
    ClearKey,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => cmd_tui(),
        Some(Commands::Eval { expression, angle }) => cmd_eval(expression, angle),
        Some(Commands::Ask { message }) => cmd_ask(message),
        Some(Commands::Ai { command }) => match command {
            AiCommands::Doctor { json } => cmd_ai_doctor(json),
            AiCommands::SetKey => cmd_ai_set_key(),
            AiCommands::ClearKey => cmd_ai_clear_key(),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError {
            code,
            message,
            hint,
        }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn eval(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_ERROR,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// eval
// ============================================================================

fn cmd_eval(expression: String, angle: String) -> Result<(), CliError> {
    let angle: AngleUnit = angle
        .parse()
        .map_err(|e: String| CliError::args(e).with_hint("use --angle deg or --angle rad"))?;

    let result = evaluate_expression(&expression, angle).map_err(|e| CliError::eval(e.to_string()))?;

    if !result.is_empty() {
        println!("{}", result);
    }
    Ok(())
}

// ============================================================================
// ask
// ============================================================================

fn cmd_ask(message: String) -> Result<(), CliError> {
    let client = resolve_client()?;

    let reply = client.send_message(&message, &[]).map_err(|e| CliError {
        code: EXIT_AI_REQUEST,
        message: e.to_string(),
        hint: None,
    })?;

    println!("{}", reply);
    Ok(())
}

/// Resolve the assistant configuration into a ready client, or a CliError
/// carrying the right exit code.
fn resolve_client() -> Result<AssistantClient, CliError> {
    let config = ResolvedAiConfig::load();

    match config.status {
        AiConfigStatus::Disabled => Err(CliError {
            code: EXIT_AI_DISABLED,
            message: "assistant is disabled".to_string(),
            hint: Some("set ai.enabled in ~/.config/neuralcalc/settings.json".to_string()),
        }),
        AiConfigStatus::MissingKey => Err(CliError {
            code: EXIT_AI_MISSING_KEY,
            message: config
                .blocking_reason
                .unwrap_or_else(|| "no API key found".to_string()),
            hint: Some(format!(
                "run `ncalc ai set-key` or set {}",
                ai::ENV_KEY_NAME
            )),
        }),
        AiConfigStatus::Ready => {
            let api_key = config.api_key.unwrap_or_default();
            AssistantClient::new(config.endpoint, api_key, config.model).map_err(|e| CliError {
                code: EXIT_AI_REQUEST,
                message: e.to_string(),
                hint: None,
            })
        }
    }
}

// ============================================================================
// ai doctor / set-key / clear-key
// ============================================================================

fn cmd_ai_doctor(json: bool) -> Result<(), CliError> {
    let config = ResolvedAiConfig::load();
    let diag = AiDiagnostics::from_resolved(&config);

    if json {
        let json_output = serde_json::json!({
            "schema_version": 1,
            "status": diag.status.as_str(),
            "blocking_reason": diag.blocking_reason,
            "model": diag.model,
            "endpoint": diag.endpoint,
            "key": if diag.key_present { "present" } else { "missing" },
            "key_source": diag.key_source.as_str(),
            "keychain": if diag.keychain_available { "ok" } else { "unavailable" },
        });
        match serde_json::to_string_pretty(&json_output) {
            Ok(out) => println!("{}", out),
            Err(e) => return Err(CliError::eval(e.to_string())),
        }
    } else {
        print!("{}", diag);

        // Actionable fix suggestions
        match diag.status {
            AiConfigStatus::Disabled => {
                println!();
                println!("Assistant is disabled. To enable:");
                println!("  Set ai.enabled in {}", Settings::config_path_display());
            }
            AiConfigStatus::MissingKey => {
                println!();
                println!("Fix: run `ncalc ai set-key` or set {}", ai::ENV_KEY_NAME);
            }
            AiConfigStatus::Ready => {}
        }
    }

    match config.status {
        AiConfigStatus::Ready => Ok(()),
        AiConfigStatus::Disabled => Err(CliError {
            code: EXIT_AI_DISABLED,
            message: String::new(),
            hint: None,
        }),
        AiConfigStatus::MissingKey => Err(CliError {
            code: EXIT_AI_MISSING_KEY,
            message: String::new(),
            hint: None,
        }),
    }
}

fn cmd_ai_set_key() -> Result<(), CliError> {
    eprint!("Paste API key: ");
    let _ = io::stderr().flush();

    let mut key = String::new();
    io::stdin()
        .lock()
        .read_line(&mut key)
        .map_err(|e| CliError::eval(format!("cannot read stdin: {}", e)))?;
    let key = key.trim();

    if key.is_empty() {
        return Err(CliError::args("no key provided"));
    }

    ai::set_api_key(key).map_err(|e| CliError {
        code: EXIT_AI_KEYCHAIN_ERR,
        message: e,
        hint: None,
    })?;

    eprintln!("Key stored in keychain.");
    Ok(())
}

fn cmd_ai_clear_key() -> Result<(), CliError> {
    ai::delete_api_key().map_err(|e| CliError {
        code: EXIT_AI_KEYCHAIN_ERR,
        message: e,
        hint: None,
    })?;

    eprintln!("Key removed from keychain.");
    Ok(())
}

// ============================================================================
// interactive calculator (default command)
// ============================================================================

fn cmd_tui() -> Result<(), CliError> {
    let mut settings = Settings::load();

    let angle_unit: AngleUnit = settings
        .angle_unit
        .parse()
        .unwrap_or(AngleUnit::Deg);

    let app = tui::state::AppState::new(angle_unit, settings.history_limit);

    // The assistant panel degrades to an in-chat notice when unconfigured;
    // the calculator itself never requires a key.
    let config = ResolvedAiConfig::from_settings(&settings.ai);
    let (client, offline_reason) = match config.status {
        AiConfigStatus::Ready => {
            let api_key = config.api_key.unwrap_or_default();
            match AssistantClient::new(config.endpoint, api_key, config.model) {
                Ok(client) => (Some(client), None),
                Err(e) => (None, Some(e.to_string())),
            }
        }
        _ => (None, config.blocking_reason),
    };

    let final_state = tui::run(app, client, offline_reason).map_err(CliError::eval)?;

    // Remember the angle unit across sessions
    let final_angle = match final_state.angle_unit {
        AngleUnit::Deg => "deg",
        AngleUnit::Rad => "rad",
    };
    if settings.angle_unit != final_angle {
        settings.angle_unit = final_angle.to_string();
        if let Err(e) = settings.save() {
            eprintln!("warning: could not save settings: {}", e);
        }
    }

    Ok(())
}
