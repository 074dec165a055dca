use clap::Subcommand;
use ecomonitor_core::quota::{feature_access, run_gated, FeatureAccess, GatedError};
use ecomonitor_core::session::{Identity, SessionContext, SubscriptionStatus};
use ecomonitor_core::Config;
use serde::Serialize;

use super::{open_store, print_json, CommandResult};

#[derive(Subcommand)]
pub enum GuestAction {
    /// Print identity, usage count and remaining free uses
    Status {
        /// Evaluate access as a subscribed account
        #[arg(long)]
        subscribed: bool,
    },
    /// Spend one gated-feature use
    Use {
        /// Evaluate access as a subscribed account
        #[arg(long)]
        subscribed: bool,
    },
    /// Zero the guest usage counter
    Reset,
    /// Upgrade the guest session to an account
    SignUp,
}

#[derive(Serialize)]
struct GuestStatus {
    identity: Identity,
    guest_usage_count: u32,
    remaining: Option<u32>,
    access: FeatureAccess,
}

fn subscription(subscribed: bool) -> SubscriptionStatus {
    if subscribed {
        SubscriptionStatus::Subscribed
    } else {
        SubscriptionStatus::Free
    }
}

fn status(session: &SessionContext, subscription: SubscriptionStatus) -> GuestStatus {
    let snapshot = session.snapshot();
    GuestStatus {
        identity: snapshot.identity,
        guest_usage_count: snapshot.guest_usage_count,
        remaining: session.remaining_guest_uses(),
        access: feature_access(session, subscription),
    }
}

pub async fn run(action: GuestAction, config: &Config) -> CommandResult {
    let session = SessionContext::load(open_store(config)?).await;

    match action {
        GuestAction::Status { subscribed } => {
            print_json(&status(&session, subscription(subscribed)))?;
        }
        GuestAction::Use { subscribed } => {
            let subscription = subscription(subscribed);
            let out: Result<(), GatedError<String>> =
                run_gated(&session, subscription, || async { Ok(()) }).await;
            match out {
                Ok(()) => print_json(&status(&session, subscription))?,
                Err(GatedError::Denied(FeatureAccess::SignUpRequired)) => {
                    return Err("free uses exhausted; run `guest sign-up` to continue".into())
                }
                Err(GatedError::Denied(_)) => {
                    return Err("subscription required; rerun with --subscribed".into())
                }
                Err(GatedError::Action(e)) => return Err(e.into()),
            }
        }
        GuestAction::Reset => {
            session.reset_guest_usage().await?;
            print_json(&status(&session, SubscriptionStatus::Free))?;
        }
        GuestAction::SignUp => {
            session.create_account().await?;
            print_json(&status(&session, SubscriptionStatus::Free))?;
        }
    }
    Ok(())
}
