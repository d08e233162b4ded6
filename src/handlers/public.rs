use log::error;
use std::fmt::Write as _;

use crate::api::ApiClient;
use crate::error::AppError;
use crate::i18n::{self, Language};
use crate::models::Vote;

/// Public vote list, fetched once per mount.
#[derive(Debug, Default)]
pub struct PublicVotesView {
    pub votes: Vec<Vote>,
    pub loading: bool,
    pub error: Option<String>,
}

impl PublicVotesView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, api: &ApiClient) -> Result<(), AppError> {
        self.loading = true;
        self.error = None;
        let result = api.fetch_public_votes().await;
        self.loading = false;

        match result {
            Ok(votes) => {
                self.votes = votes;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching votes: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn render(&self, lang: Language) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== {} ==", i18n::t(lang, "allVotes"));
        let _ = writeln!(out, "{}", i18n::t(lang, "allVotesDesc"));

        if self.loading {
            let _ = writeln!(out, "{}", i18n::t(lang, "loading"));
            return out;
        }
        if self.error.is_some() {
            let _ = writeln!(out, "! {}", i18n::t(lang, "fetchVotesError"));
            return out;
        }
        if self.votes.is_empty() {
            let _ = writeln!(out, "{}", i18n::t(lang, "noVotes"));
            return out;
        }

        for vote in &self.votes {
            out.push_str(&render_card(vote, lang));
        }
        out
    }
}

fn render_card(vote: &Vote, lang: Language) -> String {
    let mut card = String::new();
    let _ = writeln!(card, "+ {} [{}]", vote.name, vote.choice.label(lang));
    let _ = writeln!(card, "  {}: {}", i18n::t(lang, "matricule"), vote.matricule);
    if let Some(opinion) = vote.opinion_label(lang) {
        let _ = writeln!(card, "  {}: {}", i18n::t(lang, "opinion"), opinion);
    }
    let _ = writeln!(card, "  {}", vote.formatted_date(lang));
    card
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeTransport;
    use crate::api::AuthScheme;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn renders_every_record_once() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond_json(
            Method::GET,
            "/api/public/votes",
            200,
            json!({ "data": [
                { "_id": "1", "matricule": 22001, "name": "Sidi", "choice": "for", "createdAt": "2024-02-01T08:00:00Z" },
                { "_id": "2", "matricule": 22002, "name": "Mariem", "choice": "against", "opinion": "Trop de retard" }
            ] }),
        );
        let api = ApiClient::new(fake.clone(), AuthScheme::Bearer);

        let mut view = PublicVotesView::new();
        view.load(&api).await.unwrap();
        assert_eq!(fake.count(Method::GET, "/api/public/votes"), 1);

        let text = view.render(Language::Fr);
        assert!(text.contains("+ Sidi [Pour]"));
        assert!(text.contains("01/02/2024"));
        assert!(text.contains("+ Mariem [Contre]"));
        assert!(text.contains("Votre avis: Trop de retard"));
    }

    #[tokio::test]
    async fn non_array_data_renders_empty_list() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond_json(Method::GET, "/api/public/votes", 200, json!({ "data": null }));
        let api = ApiClient::new(fake, AuthScheme::Bearer);

        let mut view = PublicVotesView::new();
        view.load(&api).await.unwrap();
        assert!(view.votes.is_empty());
        assert!(view.render(Language::Fr).contains("Aucun vote pour le moment"));
    }

    #[tokio::test]
    async fn failed_fetch_sets_inline_error() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond_json(Method::GET, "/api/public/votes", 500, json!({ "message": "boom" }));
        let api = ApiClient::new(fake, AuthScheme::Bearer);

        let mut view = PublicVotesView::new();
        assert!(view.load(&api).await.is_err());
        assert!(view.error.is_some());
        assert!(!view.loading);
        assert!(view.render(Language::Fr).contains("Impossible de charger les votes"));
    }
}
