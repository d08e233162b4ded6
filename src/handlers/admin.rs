use log::{error, info, warn};
use std::fmt::Write as _;

use crate::api::ApiClient;
use crate::error::AppError;
use crate::i18n::{self, Language};
use crate::models::{Choice, Credentials, Opinion, Vote, VoteUpdate};
use crate::notify::Notifier;
use crate::router::Route;
use crate::session::AdminSession;

#[derive(Debug, Default)]
pub struct LoginView {
    pub loading: bool,
    pub error: Option<String>,
}

impl LoginView {
    pub fn new() -> Self {
        Self::default()
    }

    /// On success the token is stored and the dashboard route is returned.
    pub async fn login(
        &mut self,
        credentials: Credentials,
        api: &ApiClient,
        session: &AdminSession,
        notifier: &Notifier,
        lang: Language,
    ) -> Result<Route, AppError> {
        self.loading = true;
        self.error = None;
        let result = api.login(&credentials).await;
        self.loading = false;

        let outcome = result.and_then(|token| session.sign_in(&token));
        match outcome {
            Ok(()) => {
                info!("Admin '{}' logged in", credentials.username);
                notifier.success(i18n::t(lang, "loginSuccess"));
                Ok(Route::AdminDashboard)
            }
            Err(err) => {
                warn!("Admin login failed: {}", err);
                let message = match &err {
                    AppError::Auth(message) if !message.is_empty() => message.clone(),
                    _ => i18n::t(lang, "loginFailed").to_string(),
                };
                self.error = Some(message.clone());
                notifier.error(message);
                Err(err)
            }
        }
    }

    pub fn render(&self, lang: Language) -> String {
        let mut out = format!("== {} ==\nlogin <username> <password>\n", i18n::t(lang, "adminLogin"));
        if let Some(error) = &self.error {
            let _ = writeln!(out, "! {}", error);
        }
        out
    }
}

/// Forget the stored token. The caller navigates to the returned route.
pub fn logout(session: &AdminSession) -> Route {
    if let Err(e) = session.sign_out() {
        error!("Failed to clear admin token: {}", e);
    }
    Route::AdminLogin
}

/// Local edit buffer seeded from the selected record.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDialog {
    pub vote_id: String,
    pub choice: Choice,
    pub opinion: String,
}

impl EditDialog {
    pub fn set_choice(&mut self, choice: Choice) {
        self.choice = choice;
        if choice == Choice::For {
            self.opinion.clear();
        }
    }

    fn to_update(&self) -> VoteUpdate {
        VoteUpdate { choice: self.choice, opinion: self.opinion.trim().to_string() }
    }
}

/// Admin vote table. Edits and deletes are applied locally first and rolled
/// back if the backend refuses them.
#[derive(Debug, Default)]
pub struct DashboardView {
    pub votes: Vec<Vote>,
    pub loading: bool,
    pub error: Option<String>,
    pub editing: Option<EditDialog>,
    pub selected: Option<Vote>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    fn require_token(session: &AdminSession) -> Result<String, AppError> {
        session.token().ok_or(AppError::Unauthenticated)
    }

    /// Fetch the full vote list. Without a stored token this fails with
    /// `Unauthenticated` before any request; the caller redirects.
    pub async fn load(
        &mut self,
        api: &ApiClient,
        session: &AdminSession,
        notifier: &Notifier,
        lang: Language,
    ) -> Result<(), AppError> {
        let token = Self::require_token(session)?;
        self.loading = true;
        let result = api.fetch_votes(&token).await;
        self.loading = false;

        match result {
            Ok(votes) => {
                info!("Loaded {} votes for admin dashboard", votes.len());
                self.votes = votes;
                self.error = None;
                Ok(())
            }
            Err(err) => {
                let message = err.localized(lang);
                self.error = Some(message.clone());
                notifier.error(message);
                Err(err)
            }
        }
    }

    pub fn find(&self, id: &str) -> Option<&Vote> {
        self.votes.iter().find(|v| v.id.as_deref() == Some(id))
    }

    /// Open the edit dialog seeded from the record.
    pub fn begin_edit(&mut self, vote: &Vote) -> Result<(), AppError> {
        let vote_id = vote.id.clone().ok_or(AppError::MissingVoteId)?;
        self.editing = Some(EditDialog {
            vote_id,
            choice: vote.choice,
            opinion: vote.opinion.clone().map(String::from).unwrap_or_default(),
        });
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub async fn submit_edit(
        &mut self,
        api: &ApiClient,
        session: &AdminSession,
        notifier: &Notifier,
        lang: Language,
    ) -> Result<(), AppError> {
        let Some(dialog) = self.editing.clone() else {
            return Err(AppError::MissingVoteId);
        };
        let token = Self::require_token(session)?;
        let update = dialog.to_update();

        // Patch locally, keep the old record for rollback
        let position = self.votes.iter().position(|v| v.id.as_deref() == Some(dialog.vote_id.as_str()));
        let previous = position.map(|idx| {
            let record = &mut self.votes[idx];
            let before = record.clone();
            record.choice = update.choice;
            record.opinion = Some(update.opinion.clone())
                .filter(|o| !o.is_empty())
                .map(Opinion::from);
            (idx, before)
        });

        match api.update_vote(&token, &dialog.vote_id, &update).await {
            Ok(()) => {
                info!("Vote {} updated", dialog.vote_id);
                self.editing = None;
                notifier.success(i18n::t(lang, "updateSuccess"));
                Ok(())
            }
            Err(err) => {
                warn!("Updating vote {} failed: {}", dialog.vote_id, err);
                if let Some((idx, before)) = previous {
                    self.votes[idx] = before;
                }
                // Dialog stays open so the admin can retry
                notifier.error(match &err {
                    AppError::Fetch(message) => message.clone(),
                    _ => i18n::t(lang, "updateError").to_string(),
                });
                Err(err)
            }
        }
    }

    /// Open the delete confirmation for the record. Nothing is sent until
    /// `confirm_delete`.
    pub fn select_for_delete(&mut self, vote: &Vote) {
        self.selected = Some(vote.clone());
    }

    pub fn cancel_delete(&mut self) {
        self.selected = None;
    }

    /// Delete the selected record. A record without an id fails before any
    /// request is sent.
    pub async fn confirm_delete(
        &mut self,
        api: &ApiClient,
        session: &AdminSession,
        notifier: &Notifier,
        lang: Language,
    ) -> Result<(), AppError> {
        let Some(vote_id) = self
            .selected
            .as_ref()
            .and_then(|v| v.id.clone())
            .filter(|id| !id.is_empty())
        else {
            error!("Invalid vote data: {:?}", self.selected);
            notifier.error(AppError::MissingVoteId.localized(lang));
            return Err(AppError::MissingVoteId);
        };
        let token = Self::require_token(session)?;

        let position = self.votes.iter().position(|v| v.id.as_deref() == Some(vote_id.as_str()));
        let removed = position.map(|idx| (idx, self.votes.remove(idx)));

        match api.delete_vote(&token, &vote_id).await {
            Ok(()) => {
                info!("Vote {} deleted", vote_id);
                self.selected = None;
                notifier.success(i18n::t(lang, "deleteSuccess"));
                Ok(())
            }
            Err(err) => {
                warn!("Deleting vote {} failed: {}", vote_id, err);
                if let Some((idx, vote)) = removed {
                    self.votes.insert(idx, vote);
                }
                let message = match &err {
                    AppError::Fetch(message) => message.clone(),
                    _ => i18n::t(lang, "deleteError").to_string(),
                };
                notifier.error(message);
                Err(err)
            }
        }
    }

    pub fn render(&self, lang: Language) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== {} ==", i18n::t(lang, "dashboard"));
        if self.loading {
            let _ = writeln!(out, "{}", i18n::t(lang, "loading"));
            return out;
        }
        if let Some(error) = &self.error {
            let _ = writeln!(out, "! {}", error);
        }
        for vote in &self.votes {
            let _ = writeln!(
                out,
                "{:<26} {:>6}  {:<24} {:<8} {:<30} {}",
                vote.id.as_deref().unwrap_or("-"),
                vote.matricule,
                vote.name,
                vote.choice.label(lang),
                vote.opinion_label(lang).unwrap_or_default(),
                vote.formatted_date(lang)
            );
        }
        if let Some(dialog) = &self.editing {
            let _ = writeln!(out, "editing {}: {} {}", dialog.vote_id, dialog.choice, dialog.opinion);
            let _ = writeln!(out, "[{}: cancel]", i18n::t(lang, "cancel"));
        }
        if let Some(vote) = &self.selected {
            let _ = writeln!(out, "-- {} --", i18n::t(lang, "confirmDelete"));
            let _ = writeln!(out, "{}", i18n::t(lang, "deleteConfirmation"));
            let _ = writeln!(out, "  {} ({})", vote.display_name(lang), vote.matricule);
            let _ = writeln!(
                out,
                "[{}: confirm] [{}: cancel]",
                i18n::t(lang, "delete"),
                i18n::t(lang, "cancel")
            );
        }
        let _ = writeln!(out, "{}: logout", i18n::t(lang, "logout"));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeTransport;
    use crate::api::{Auth, AuthScheme};
    use crate::notify::Level;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    struct Harness {
        fake: Arc<FakeTransport>,
        api: ApiClient,
        session: AdminSession,
        notifier: Notifier,
    }

    fn harness() -> Harness {
        let fake = Arc::new(FakeTransport::new());
        let api = ApiClient::new(fake.clone(), AuthScheme::Bearer);
        Harness { fake, api, session: AdminSession::in_memory(), notifier: Notifier::new() }
    }

    fn three_votes() -> serde_json::Value {
        json!([
            { "_id": "a", "matricule": 22001, "name": "A", "choice": "for" },
            { "_id": "b", "matricule": 22002, "name": "B", "choice": "against", "opinion": "pv_issue" },
            { "_id": "c", "matricule": 22003, "name": "C", "choice": "for" }
        ])
    }

    async fn loaded(h: &Harness) -> DashboardView {
        h.session.sign_in("tok").unwrap();
        h.fake.respond_json(Method::GET, "/api/votes", 200, three_votes());
        let mut view = DashboardView::new();
        view.load(&h.api, &h.session, &h.notifier, Language::Fr).await.unwrap();
        view
    }

    fn ids(view: &DashboardView) -> Vec<&str> {
        view.votes.iter().filter_map(|v| v.id.as_deref()).collect()
    }

    #[tokio::test]
    async fn login_stores_token_and_routes_to_dashboard() {
        let h = harness();
        h.fake.respond_json(Method::POST, "/api/admin/login", 200, json!({ "token": "jwt-1" }));
        let mut view = LoginView::new();
        let creds = Credentials { username: "admin".to_string(), password: "pw".to_string() };

        let route = view.login(creds, &h.api, &h.session, &h.notifier, Language::Fr).await.unwrap();
        assert_eq!(route, Route::AdminDashboard);
        assert_eq!(h.session.token().as_deref(), Some("jwt-1"));
        assert_eq!(h.notifier.visible()[0].level, Level::Success);
    }

    #[tokio::test]
    async fn failed_login_shows_backend_message() {
        let h = harness();
        h.fake.respond_json(Method::POST, "/api/admin/login", 401, json!({ "message": "Invalid credentials" }));
        let mut view = LoginView::new();
        let creds = Credentials { username: "admin".to_string(), password: "bad".to_string() };

        assert!(view.login(creds, &h.api, &h.session, &h.notifier, Language::Fr).await.is_err());
        assert_eq!(view.error.as_deref(), Some("Invalid credentials"));
        assert!(!h.session.is_authenticated());
    }

    #[tokio::test]
    async fn load_without_token_sends_nothing() {
        let h = harness();
        let mut view = DashboardView::new();
        let err = view.load(&h.api, &h.session, &h.notifier, Language::Fr).await.unwrap_err();
        assert_eq!(err, AppError::Unauthenticated);
        assert!(h.fake.requests().is_empty());
    }

    #[tokio::test]
    async fn failed_list_fetch_is_visible() {
        let h = harness();
        h.session.sign_in("expired").unwrap();
        h.fake.respond_json(Method::GET, "/api/votes", 401, json!({ "message": "Unauthorized" }));
        let mut view = DashboardView::new();

        assert!(view.load(&h.api, &h.session, &h.notifier, Language::Fr).await.is_err());
        assert_eq!(view.error.as_deref(), Some("Failed to fetch votes"));
        assert_eq!(h.notifier.visible()[0].level, Level::Error);
        assert_eq!(
            h.fake.requests()[0].auth,
            Some(Auth { scheme: AuthScheme::Bearer, token: "expired".to_string() })
        );
    }

    #[tokio::test]
    async fn delete_removes_only_the_matching_record() {
        let h = harness();
        let mut view = loaded(&h).await;
        h.fake.respond_json(Method::DELETE, "/api/votes/b", 200, json!({ "message": "deleted" }));

        let target = view.find("b").cloned().unwrap();
        view.select_for_delete(&target);
        view.confirm_delete(&h.api, &h.session, &h.notifier, Language::Fr).await.unwrap();

        assert_eq!(ids(&view), vec!["a", "c"]);
        assert!(view.selected.is_none());
        // No re-fetch after delete
        assert_eq!(h.fake.count(Method::GET, "/api/votes"), 1);
    }

    #[tokio::test]
    async fn delete_without_id_sends_no_request() {
        let h = harness();
        let mut view = loaded(&h).await;
        let mut orphan = view.votes[0].clone();
        orphan.id = None;

        view.select_for_delete(&orphan);
        let err = view.confirm_delete(&h.api, &h.session, &h.notifier, Language::Fr).await.unwrap_err();

        assert_eq!(err, AppError::MissingVoteId);
        assert_eq!(h.fake.count(Method::DELETE, "/api/votes/a"), 0);
        assert_eq!(h.fake.requests().len(), 1);
        assert_eq!(ids(&view), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn failed_delete_restores_list_and_reports_backend_message() {
        let h = harness();
        let mut view = loaded(&h).await;
        h.fake.respond_json(Method::DELETE, "/api/votes/c", 404, json!({ "message": "Vote not found" }));

        let target = view.find("c").cloned().unwrap();
        view.select_for_delete(&target);
        assert!(view.confirm_delete(&h.api, &h.session, &h.notifier, Language::Fr).await.is_err());

        assert_eq!(ids(&view), vec!["a", "b", "c"]);
        assert_eq!(h.notifier.visible()[0].message, "Vote not found");
    }

    #[tokio::test]
    async fn edit_patches_record_and_closes_dialog() {
        let h = harness();
        let mut view = loaded(&h).await;
        h.fake.respond_json(Method::PUT, "/api/votes/a", 200, json!({}));

        let target = view.find("a").cloned().unwrap();
        view.begin_edit(&target).unwrap();
        if let Some(dialog) = view.editing.as_mut() {
            dialog.set_choice(Choice::Against);
            dialog.opinion = "english_exam".to_string();
        }
        view.submit_edit(&h.api, &h.session, &h.notifier, Language::Fr).await.unwrap();

        assert!(view.editing.is_none());
        let patched = view.find("a").unwrap();
        assert_eq!(patched.choice, Choice::Against);
        assert_eq!(patched.opinion, Some(Opinion::EnglishExam));
        let put = h.fake.requests().into_iter().find(|r| r.method == Method::PUT).unwrap();
        assert_eq!(put.body, Some(json!({ "choice": "against", "opinion": "english_exam" })));
        assert_eq!(put.auth.map(|a| a.scheme), Some(AuthScheme::Bearer));
    }

    #[tokio::test]
    async fn failed_edit_rolls_back_and_keeps_dialog_open() {
        let h = harness();
        let mut view = loaded(&h).await;
        h.fake.respond_json(Method::PUT, "/api/votes/b", 500, json!({}));

        let target = view.find("b").cloned().unwrap();
        view.begin_edit(&target).unwrap();
        assert_eq!(view.editing.as_ref().map(|d| d.opinion.as_str()), Some("pv_issue"));
        if let Some(dialog) = view.editing.as_mut() {
            dialog.set_choice(Choice::For);
        }
        assert!(view.submit_edit(&h.api, &h.session, &h.notifier, Language::Fr).await.is_err());

        assert!(view.editing.is_some());
        assert_eq!(view.find("b"), Some(&target));
        assert_eq!(h.notifier.visible()[0].message, "Failed to update vote");
    }

    #[tokio::test]
    async fn edit_failure_without_backend_message_uses_translated_text() {
        let h = harness();
        let mut view = loaded(&h).await;
        h.fake.fail_with(
            Method::PUT,
            "/api/votes/a",
            AppError::MalformedResponse("truncated body".to_string()),
        );

        let target = view.find("a").cloned().unwrap();
        view.begin_edit(&target).unwrap();
        assert!(view.submit_edit(&h.api, &h.session, &h.notifier, Language::Fr).await.is_err());
        assert_eq!(h.notifier.visible()[0].message, "Échec de la mise à jour du vote");

        view.cancel_edit();
        assert!(view.editing.is_none());
        assert_eq!(view.find("a"), Some(&target));
    }

    #[test]
    fn delete_dialog_renders_confirmation_until_cancelled() {
        let mut view = DashboardView::new();
        let vote: Vote = serde_json::from_value(
            json!({ "_id": "z", "matricule": 22999, "name": "", "choice": "against" }),
        )
        .unwrap();
        view.votes.push(vote.clone());

        view.select_for_delete(&vote);
        let text = view.render(Language::Fr);
        assert!(text.contains("Confirmer la suppression"));
        assert!(text.contains("Anonyme (22999)"));

        view.cancel_delete();
        assert!(!view.render(Language::Fr).contains("Confirmer la suppression"));
        assert_eq!(view.votes.len(), 1);
    }

    #[test]
    fn logout_clears_token() {
        let session = AdminSession::in_memory();
        session.sign_in("tok").unwrap();
        assert_eq!(logout(&session), Route::AdminLogin);
        assert!(!session.is_authenticated());
    }
}
