#![forbid(unsafe_code)]

//! Counter demo binary entry point.
//!
//! Drives a [`CounterModel`] through a simulated screen lifecycle:
//! `pause`/`resume` gate observation, and `recreate` destroys the
//! lifecycle and attaches a fresh one while the model survives —
//! counter state replays to the new screen, already-consumed notices
//! do not.

use std::io::{self, BufRead, Write};

use tracing::info;
use uistate::{Lifecycle, Producer};

mod cli;
mod model;

use model::CounterModel;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let opts = cli::Opts::parse();

    // The holder is built through a typed producer, the same wiring a
    // host with a retention store would use for arguments-bearing
    // holders.
    let prefix = opts.prefix.clone();
    let initial = opts.initial;
    let producer = Producer::new(move || CounterModel::new(prefix.clone(), initial));
    let model: CounterModel = match producer.create() {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Failed to construct model: {e}");
            std::process::exit(1);
        }
    };

    let mut lifecycle = attach_screen(&model, 1);

    match opts.script {
        Some(script) => {
            for command in script.split(';') {
                if run_command(command.trim(), &model, &mut lifecycle) {
                    break;
                }
            }
        }
        None => {
            println!("Commands: print, pause, resume, recreate, status, quit");
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if run_command(line.trim(), &model, &mut lifecycle) {
                    break;
                }
                let _ = io::stdout().flush();
            }
        }
    }
}

/// Register the "screen side" observers against a fresh lifecycle.
fn attach_screen(model: &CounterModel, screen_no: u32) -> Lifecycle {
    let lifecycle = Lifecycle::new();

    model.number().observe_required(&lifecycle, move |n| {
        println!("[screen {screen_no}] number: {n}");
    });
    model.multitude().observe_required(&lifecycle, move |n| {
        println!("[screen {screen_no}] multitude: {n}");
    });
    model.notices().observe_event(&lifecycle, move |msg| {
        println!("[screen {screen_no}] notice: {msg}");
    });
    lifecycle.on_destroy(move || info!(screen_no, "screen destroyed"));

    lifecycle
}

/// Execute one command. Returns `true` when the loop should stop.
fn run_command(command: &str, model: &CounterModel, lifecycle: &mut Lifecycle) -> bool {
    use uistate::LifecycleState;

    static SCREEN_COUNTER: std::sync::atomic::AtomicU32 = std::sync::atomic::AtomicU32::new(1);

    match command {
        "" => {}
        "print" | "p" => match model.generate() {
            Ok(line) => println!("generated: {line}"),
            Err(e) => eprintln!("cannot generate: {e}"),
        },
        "pause" => {
            lifecycle.set_state(LifecycleState::Inactive);
            println!("(paused — writes are gated)");
        }
        "resume" => {
            lifecycle.set_state(LifecycleState::Active);
            // Consumers that cannot wait for the next notification can
            // resynchronize immediately.
            match model.number().require() {
                Ok(n) => println!("(resumed — current number {n})"),
                Err(e) => eprintln!("resume without state: {e}"),
            }
        }
        "recreate" => {
            lifecycle.destroy();
            let next = SCREEN_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed) + 1;
            *lifecycle = attach_screen(model, next);
            println!("(recreated as screen {next})");
        }
        "status" => {
            println!(
                "number={:?} multitude={:?} lifecycle={}",
                model.number().get(),
                model.multitude().get(),
                lifecycle.state()
            );
        }
        "quit" | "q" | "exit" => {
            lifecycle.destroy();
            return true;
        }
        other => eprintln!("unknown command: {other} (try: print, pause, resume, recreate, status, quit)"),
    }
    false
}
