use std::fmt::Write as _;
use tokio::sync::watch;

use crate::api::ApiClient;
use crate::i18n::{self, Language};
use crate::models::{Choice, StatsSnapshot};
use crate::tasks::stats_poller::StatsPoller;

/// Live statistics panel. Polling runs for as long as the view is mounted.
pub struct StatsView {
    snapshot: watch::Receiver<Option<StatsSnapshot>>,
    poller: Option<StatsPoller>,
}

impl StatsView {
    pub fn mount(api: ApiClient) -> Self {
        let (tx, rx) = watch::channel(None);
        let poller = StatsPoller::spawn(api, tx);
        Self { snapshot: rx, poller: Some(poller) }
    }

    pub fn unmount(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
    }

    #[cfg(test)]
    pub fn is_polling(&self) -> bool {
        self.poller.is_some()
    }

    pub fn snapshot(&self) -> Option<StatsSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn render(&self, lang: Language) -> String {
        render_snapshot(&self.snapshot().unwrap_or_default(), lang)
    }
}

impl Drop for StatsView {
    fn drop(&mut self) {
        self.unmount();
    }
}

pub fn render_snapshot(snapshot: &StatsSnapshot, lang: Language) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", i18n::t(lang, "currentResults"));

    for choice in [Choice::For, Choice::Against] {
        let (percentage, count) = snapshot
            .for_choice(choice)
            .map(|s| (s.percentage.as_str(), s.count))
            .unwrap_or(("0", 0));
        let percentage = if percentage.is_empty() { "0" } else { percentage };
        let _ = writeln!(
            out,
            "{}: {}% ({} {})",
            choice.label(lang),
            percentage,
            count,
            i18n::t(lang, "votes")
        );
    }

    let _ = writeln!(out, "-- {} --", i18n::t(lang, "recentOpinions"));
    for vote in snapshot.recent_activity() {
        let _ = write!(
            out,
            "* {} ({}: {}) {} - {}",
            vote.display_name(lang),
            i18n::t(lang, "matricule"),
            vote.matricule,
            vote.formatted_date(lang),
            vote.choice.label(lang)
        );
        if let Some(opinion) = vote.opinion_label(lang) {
            let _ = write!(out, " \"{}\"", opinion);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "{}: {}", i18n::t(lang, "totalVotes"), snapshot.total);
    let _ = writeln!(out, "[{}: /votes]", i18n::t(lang, "viewAllVotes"));
    out
}
