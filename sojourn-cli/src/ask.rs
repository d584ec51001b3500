//! One-shot turn: `sojourn ask "<text>"`.

use anyhow::{Result, bail};
use serde::Serialize;
use sojourn_core::{
    ConversationSession, Identity, Itinerary, ProfileNotice, ProfileStore, TurnOutcome, apply_profile_update,
};

use crate::config::Config;
use crate::store::open_default_store;
use crate::transcript::{ChatLog, warn_on_failure};

#[derive(Debug, Serialize)]
struct AskReport<'a> {
    outcome: &'a TurnOutcome,
    reply: &'a str,
    itinerary: Option<&'a Itinerary>,
    profile_notice: Option<&'a ProfileNotice>,
}

struct Answered {
    session: ConversationSession,
    outcome: TurnOutcome,
    notice: Option<ProfileNotice>,
}

impl Answered {
    fn reply(&self) -> &str {
        self.session
            .messages()
            .last()
            .map(|m| m.text.as_str())
            .unwrap_or_default()
    }
}

async fn answer<S: ProfileStore>(
    text: &str,
    cfg: &Config,
    identity: &Identity,
    store: &mut S,
    log: &mut ChatLog,
) -> Result<Answered> {
    let mut session = match &cfg.chat.greeting {
        Some(g) => ConversationSession::with_greeting(g.clone()),
        None => ConversationSession::new(),
    };

    let Some(outcome) = session.submit(text, cfg.chat.latency()).await else {
        bail!("nothing to send: the message is blank");
    };
    let notice = outcome
        .profile_update
        .as_ref()
        .map(|request| apply_profile_update(store, identity, request, chrono::Utc::now()));

    let answered = Answered {
        session,
        outcome,
        notice,
    };
    warn_on_failure(log.append_user(text));
    warn_on_failure(log.append_assistant(answered.reply()));
    if let Some(n) = &answered.notice {
        warn_on_failure(log.append_system(&n.to_string()));
    }
    Ok(answered)
}

pub async fn run_ask(text: &str, json: bool, cfg: &Config, identity: &Identity, log: &mut ChatLog) -> Result<()> {
    let mut store = open_default_store()?;
    let answered = answer(text, cfg, identity, &mut store, log).await?;
    let itinerary = answered.session.current_itinerary();

    if json {
        let report = AskReport {
            outcome: &answered.outcome,
            reply: answered.reply(),
            itinerary,
            profile_notice: answered.notice.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", answered.reply());
    if let Some(it) = itinerary {
        println!("\n{}", render_itinerary(it));
    }
    if let Some(n) = &answered.notice {
        eprintln!("\n[{}] {}", n.title(), n.description());
    }
    Ok(())
}

pub fn render_itinerary(it: &Itinerary) -> String {
    let mut s = String::from("Your Sojourn Itinerary\n");
    for (i, seg) in it.iter().enumerate() {
        s.push_str(&format!(
            "{:>2}. [{}] {}\n    {} | {}\n    {}\n",
            i + 1,
            seg.category,
            seg.title,
            seg.date_label,
            seg.time_label,
            seg.description
        ));
        if let Some(loc) = &seg.location {
            s.push_str(&format!("    @ {loc}\n"));
        }
    }
    s
}
