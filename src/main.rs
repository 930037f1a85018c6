#![allow(clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod acquisition;
mod config;
mod control;
mod fusion;
mod health;
mod keychain;
mod logger;
mod output;
mod position;
mod sim;
#[cfg(test)]
mod test_support;

use crate::config::Config;
use crate::control::ControlLoop;
use crate::keychain::Keychain;
use std::{future::Future, process::ExitCode, time::Duration};
use tokio::{
    runtime::{Builder, Runtime},
    signal::unix::{SignalKind, signal},
};
use tokio_util::sync::CancellationToken;

const WORKER_THREADS: usize = 4;

fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    let runtime = match Builder::new_multi_thread().worker_threads(WORKER_THREADS).enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Could not start the async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    let grace = config.acquisition_timeout();
    run_to_completion(runtime, grace, serve(config))
}

/// Drives `task` to completion on `runtime`, then shuts the runtime down.
///
/// Blocking workers still running at that point (an abandoned instrument read)
/// get at most `grace` before they are left behind.
fn run_to_completion<F: Future>(runtime: Runtime, grace: Duration, task: F) -> F::Output {
    let output = runtime.block_on(task);
    runtime.shutdown_timeout(grace);
    output
}

async fn serve(config: Config) -> ExitCode {
    let shutdown = CancellationToken::new();
    if let Err(e) = forward_signals(shutdown.clone()) {
        error!("Could not install signal handlers: {e}");
        return ExitCode::FAILURE;
    }

    let keychain = Keychain::new(config, &shutdown);
    let control = tokio::spawn(ControlLoop::new(keychain).run(shutdown));
    match control.await {
        Ok(exit) => {
            info!("Control loop {} after {} cycles, {} samples logged.", exit.state, exit.cycles, exit.logged);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Control loop aborted: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Installs SIGINT and SIGTERM handlers that cancel `shutdown` on the first signal.
fn forward_signals(shutdown: CancellationToken) -> std::io::Result<()> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::spawn(async move {
        tokio::select! {
            _ = interrupt.recv() => log!("Interrupt received."),
            _ = terminate.recv() => log!("Termination requested."),
        }
        shutdown.cancel();
    });
    Ok(())
}
