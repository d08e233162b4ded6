use log::{info, warn};
use std::fmt::Write as _;
use std::str::FromStr;

use crate::api::ApiClient;
use crate::error::{AppError, ValidationError};
use crate::i18n::{self, Language};
use crate::models::{self, Choice, NewVote, Opinion};
use crate::notify::Notifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Matricule,
    Name,
    Choice,
    Opinion,
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "matricule" => Ok(FormField::Matricule),
            "name" => Ok(FormField::Name),
            "choice" => Ok(FormField::Choice),
            "opinion" => Ok(FormField::Opinion),
            other => Err(format!("Unknown field: {}", other)),
        }
    }
}

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteForm {
    pub matricule: String,
    pub name: String,
    pub choice: Option<Choice>,
    pub opinion: String,
}

impl Default for VoteForm {
    fn default() -> Self {
        Self {
            matricule: String::new(),
            name: String::new(),
            choice: Some(Choice::For),
            opinion: String::new(),
        }
    }
}

impl VoteForm {
    /// Switching to "for" drops any opinion typed for "against".
    pub fn set_choice(&mut self, choice: Option<Choice>) {
        self.choice = choice;
        if choice == Some(Choice::For) {
            self.opinion.clear();
        }
    }

    /// Checks run in order: required fields first, then the matricule range.
    pub fn validate(&self) -> Result<NewVote, ValidationError> {
        let choice = match self.choice {
            Some(choice) if !self.matricule.trim().is_empty() && !self.name.trim().is_empty() => choice,
            _ => return Err(ValidationError::FieldsRequired),
        };

        let matricule =
            models::parse_matricule(&self.matricule).ok_or(ValidationError::MatriculeOutOfRange)?;

        let opinion = match choice {
            Choice::For => String::new(),
            Choice::Against => self.opinion.trim().to_string(),
        };

        Ok(NewVote {
            matricule: matricule.to_string(),
            name: self.name.trim().to_string(),
            choice,
            opinion,
        })
    }
}

#[derive(Debug, Default)]
pub struct VoteFormView {
    pub form: VoteForm,
    pub loading: bool,
    pub error: Option<String>,
}

impl VoteFormView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_field(&mut self, field: FormField, value: &str) -> Result<(), String> {
        match field {
            FormField::Matricule => self.form.matricule = value.trim().to_string(),
            FormField::Name => self.form.name = value.to_string(),
            FormField::Choice => {
                let choice = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.parse::<Choice>()?)
                };
                self.form.set_choice(choice);
            }
            FormField::Opinion => self.form.opinion = value.to_string(),
        }
        Ok(())
    }

    /// Validate, send, and report the outcome through a notification.
    /// Validation failures never reach the network.
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        notifier: &Notifier,
        lang: Language,
    ) -> Result<(), AppError> {
        let payload = match self.form.validate() {
            Ok(payload) => payload,
            Err(e) => {
                let err = AppError::from(e);
                self.fail(&err, notifier, lang);
                return Err(err);
            }
        };

        self.loading = true;
        self.error = None;
        let result = api.submit_vote(&payload).await;
        self.loading = false;

        match result {
            Ok(()) => {
                info!("Vote recorded for matricule {}", payload.matricule);
                self.form = VoteForm::default();
                notifier.success(i18n::t(lang, "success"));
                Ok(())
            }
            Err(err) => {
                warn!("Vote submission for {} failed: {}", payload.matricule, err);
                self.fail(&err, notifier, lang);
                Err(err)
            }
        }
    }

    fn fail(&mut self, err: &AppError, notifier: &Notifier, lang: Language) {
        let message = err.localized(lang);
        self.error = Some(message.clone());
        notifier.error(message);
    }

    pub fn render(&self, lang: Language) -> String {
        let form = &self.form;
        let mut out = String::new();
        let _ = writeln!(out, "== {} ==", i18n::t(lang, "title"));
        let _ = writeln!(out, "{}: {}", i18n::t(lang, "matricule"), form.matricule);
        let _ = writeln!(out, "{}: {}", i18n::t(lang, "name"), form.name);
        let choice = form.choice.map(|c| c.label(lang)).unwrap_or("-");
        let _ = writeln!(out, "{}: {}", i18n::t(lang, "position"), choice);
        if form.choice == Some(Choice::Against) {
            let opinion = if form.opinion.is_empty() {
                "-".to_string()
            } else {
                Opinion::from(form.opinion.as_str()).label(lang)
            };
            let _ = writeln!(out, "{}: {}", i18n::t(lang, "opinion"), opinion);
            let _ = writeln!(
                out,
                "  (english_exam = {}, pv_issue = {})",
                i18n::t(lang, "englishExamIssue"),
                i18n::t(lang, "pvIssue")
            );
        }
        if self.loading {
            let _ = writeln!(out, "{}", i18n::t(lang, "loading"));
        } else {
            let _ = writeln!(out, "[{}: submit]", i18n::t(lang, "submit"));
        }
        if let Some(error) = &self.error {
            let _ = writeln!(out, "! {}", error);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeTransport;
    use crate::api::AuthScheme;
    use crate::notify::Level;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn fill(view: &mut VoteFormView, matricule: &str, name: &str, choice: &str, opinion: &str) {
        view.set_field(FormField::Matricule, matricule).unwrap();
        view.set_field(FormField::Name, name).unwrap();
        view.set_field(FormField::Choice, choice).unwrap();
        view.set_field(FormField::Opinion, opinion).unwrap();
    }

    fn setup() -> (Arc<FakeTransport>, ApiClient, Notifier) {
        let fake = Arc::new(FakeTransport::new());
        let api = ApiClient::new(fake.clone(), AuthScheme::Bearer);
        (fake, api, Notifier::new())
    }

    #[test]
    fn switching_to_for_clears_opinion() {
        let mut form = VoteForm::default();
        form.set_choice(Some(Choice::Against));
        form.opinion = "pv_issue".to_string();
        form.set_choice(Some(Choice::For));
        assert_eq!(form.opinion, "");
    }

    #[test]
    fn for_votes_never_carry_an_opinion() {
        let form = VoteForm {
            matricule: "22500".to_string(),
            name: "Test".to_string(),
            choice: Some(Choice::For),
            opinion: "left over".to_string(),
        };
        assert_eq!(form.validate().unwrap().opinion, "");
    }

    #[test]
    fn required_fields_are_checked_before_range() {
        let mut form = VoteForm::default();
        form.matricule = "99999".to_string();
        assert_eq!(form.validate(), Err(ValidationError::FieldsRequired));

        form.name = "Test".to_string();
        assert_eq!(form.validate(), Err(ValidationError::MatriculeOutOfRange));

        form.choice = None;
        assert_eq!(form.validate(), Err(ValidationError::FieldsRequired));
    }

    #[tokio::test]
    async fn successful_submission_resets_form() {
        let (fake, api, notifier) = setup();
        fake.respond_json(Method::POST, "/api/vote", 201, json!({ "message": "Vote recorded" }));

        let mut view = VoteFormView::new();
        fill(&mut view, "22500", "Test", "against", "pv_issue");
        view.submit(&api, &notifier, Language::Fr).await.unwrap();

        assert_eq!(view.form, VoteForm::default());
        assert!(!view.loading);
        let sent = fake.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].body,
            Some(json!({ "matricule": "22500", "name": "Test", "choice": "against", "opinion": "pv_issue" }))
        );
        let shown = notifier.visible();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].level, Level::Success);
    }

    #[tokio::test]
    async fn out_of_range_matricule_is_rejected_locally() {
        let (fake, api, notifier) = setup();

        let mut view = VoteFormView::new();
        fill(&mut view, "99999", "Test", "for", "");
        let err = view.submit(&api, &notifier, Language::Fr).await.unwrap_err();

        assert_eq!(err, AppError::Validation(ValidationError::MatriculeOutOfRange));
        assert!(fake.requests().is_empty());
        let shown = notifier.visible();
        assert_eq!(shown[0].level, Level::Error);
        assert_eq!(shown[0].message, i18n::t(Language::Fr, "matriculeError"));
        // Input is kept so the user can fix it
        assert_eq!(view.form.matricule, "99999");
    }

    #[tokio::test]
    async fn duplicate_vote_notification_names_matricule() {
        let (fake, api, notifier) = setup();
        fake.respond_text(Method::POST, "/api/vote", 409, "Conflict");

        let mut view = VoteFormView::new();
        fill(&mut view, "22017", "Test", "for", "");
        let err = view.submit(&api, &notifier, Language::Ar).await.unwrap_err();

        assert_eq!(err, AppError::DuplicateVote { matricule: "22017".to_string() });
        assert!(notifier.visible()[0].message.contains("22017"));
        assert!(view.error.as_deref().unwrap_or_default().contains("22017"));
        assert_eq!(view.form.name, "Test");
    }

    #[test]
    fn rejects_unknown_choice_text() {
        let mut view = VoteFormView::new();
        assert!(view.set_field(FormField::Choice, "maybe").is_err());
        assert_eq!(view.form.choice, Some(Choice::For));
        assert_eq!("Opinion".parse::<FormField>(), Ok(FormField::Opinion));
    }
}
