use std::io::{BufRead, Write};
use std::sync::Arc;

use async_trait::async_trait;
use clap::Subcommand;
use ecomonitor_core::biometric::{
    biometric_kind, is_biometric_lock_enabled, set_biometric_lock, ChallengeOutcome,
    ChallengePrompt, GateView, HardwareAuth, UnlockGate, UnlockState,
};
use ecomonitor_core::error::AuthError;
use ecomonitor_core::{Config, KeyValueStore};
use serde::Serialize;
use tracing::debug;

use super::{open_store, print_json, CommandResult};

#[derive(Subcommand)]
pub enum LockAction {
    /// Require authentication when the app opens
    Enable,
    /// Turn the app lock off
    Disable,
    /// Print the lock preference and authenticator label
    Status,
    /// Run the unlock gate against a console prompt
    Unlock {
        /// Prompts to attempt before giving up
        #[arg(long, default_value = "3")]
        attempts: u32,
    },
}

/// Stand-in for the platform prompt: asks for confirmation on stdin.
///
/// `y` succeeds, `p` takes the passcode fallback (treated as a failure,
/// there is no passcode to check here), empty input or EOF cancels.
struct ConsoleAuth;

fn read_answer(prompt: ChallengePrompt) -> std::io::Result<Option<String>> {
    let mut stderr = std::io::stderr();
    write!(
        stderr,
        "{} [y = confirm, p = {}, n = {}]: ",
        prompt.message, prompt.fallback_label, prompt.cancel_label
    )?;
    stderr.flush()?;

    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_lowercase()))
}

#[async_trait]
impl HardwareAuth for ConsoleAuth {
    async fn is_available(&self) -> bool {
        true
    }

    async fn challenge(&self, prompt: &ChallengePrompt) -> Result<ChallengeOutcome, AuthError> {
        let prompt = prompt.clone();
        let answer = tokio::task::spawn_blocking(move || read_answer(prompt))
            .await
            .map_err(|e| AuthError::PromptFailed(e.to_string()))?
            .map_err(|e| AuthError::PromptFailed(e.to_string()))?;

        debug!(?answer, "Console challenge answered");
        Ok(match answer.as_deref() {
            Some("y") | Some("yes") => ChallengeOutcome::Success,
            None | Some("") | Some("n") | Some("no") => ChallengeOutcome::Cancelled,
            Some(_) => ChallengeOutcome::Failed,
        })
    }
}

#[derive(Serialize)]
struct LockStatus {
    enabled: bool,
    authenticator: Option<&'static str>,
}

#[derive(Serialize)]
struct UnlockReport {
    state: UnlockState,
    view: GateView,
    checks: u32,
}

async fn toggle(store: &dyn KeyValueStore, enabled: bool) -> CommandResult {
    set_biometric_lock(store, enabled).await?;
    print_json(&LockStatus {
        enabled,
        authenticator: biometric_kind(&ConsoleAuth).await,
    })
}

pub async fn run(action: LockAction, config: &Config) -> CommandResult {
    let store = open_store(config)?;

    match action {
        LockAction::Enable => toggle(store.as_ref(), true).await?,
        LockAction::Disable => toggle(store.as_ref(), false).await?,
        LockAction::Status => {
            print_json(&LockStatus {
                enabled: is_biometric_lock_enabled(store.as_ref()).await,
                authenticator: biometric_kind(&ConsoleAuth).await,
            })?;
        }
        LockAction::Unlock { attempts } => {
            let gate = UnlockGate::new(
                store,
                Arc::new(ConsoleAuth),
                ChallengePrompt::from(&config.biometric),
            );

            let mount = gate.mount().await;
            let mut used = 1;
            while let UnlockState::AuthError { message } = gate.state() {
                if used >= attempts {
                    break;
                }
                eprintln!("{message}");
                gate.retry(mount).await;
                used += 1;
            }

            let report = UnlockReport {
                state: gate.state(),
                view: gate.view(),
                checks: used,
            };
            print_json(&report)?;
            if !gate.is_unlocked() {
                return Err("app remains locked".into());
            }
        }
    }
    Ok(())
}
