use brainviset::cli::Cli;
use brainviset::commands::handle_runtime_commands;
use brainviset::domain::models::JsonOut;
use brainviset::error::RunError;
use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;

#[derive(Serialize)]
struct ErrorOut {
    kind: String,
    message: String,
}

fn describe(e: &anyhow::Error) -> ErrorOut {
    match e.downcast_ref::<RunError>() {
        Some(run_err) => ErrorOut {
            kind: run_err.kind().to_string(),
            message: run_err.to_string(),
        },
        None => ErrorOut {
            kind: "error".to_string(),
            message: format!("{:#}", e),
        },
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let Err(e) = handle_runtime_commands(&cli) else {
        return ExitCode::SUCCESS;
    };
    let out = describe(&e);
    let message = out.message.split_whitespace().collect::<Vec<_>>().join(" ");
    if cli.json {
        let body = JsonOut {
            ok: false,
            data: ErrorOut {
                kind: out.kind,
                message,
            },
        };
        match serde_json::to_string_pretty(&body) {
            Ok(s) => println!("{}", s),
            Err(_) => eprintln!("error: {}", body.data.message),
        }
    } else {
        eprintln!("error[{}]: {}", out.kind, message);
    }
    ExitCode::FAILURE
}
