use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{Command, USAGE};
use crate::api::ApiClient;
use crate::error::AppError;
use crate::handlers::admin::{self, DashboardView, LoginView};
use crate::handlers::public::PublicVotesView;
use crate::handlers::stats::StatsView;
use crate::handlers::vote::VoteFormView;
use crate::handlers::render_not_found;
use crate::i18n::Language;
use crate::models::Credentials;
use crate::notify::{Level, Notifier};
use crate::router::{self, Route};
use crate::session::AdminSession;

/// Home page: live statistics above the vote form.
struct HomeView {
    stats: StatsView,
    form: VoteFormView,
}

enum Page {
    Home(HomeView),
    Votes(PublicVotesView),
    Login(LoginView),
    Dashboard(DashboardView),
    NotFound,
}

/// Terminal host for the pages. Owns the language and the current page;
/// the API client, session and notifier are injected.
pub struct Shell {
    api: ApiClient,
    session: AdminSession,
    notifier: Notifier,
    lang: Language,
    route: Route,
    page: Page,
}

impl Shell {
    pub fn new(api: ApiClient, session: AdminSession, notifier: Notifier, lang: Language) -> Self {
        Self { api, session, notifier, lang, route: Route::NotFound, page: Page::NotFound }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    #[cfg(test)]
    pub fn language(&self) -> Language {
        self.lang
    }

    /// Leave the current page and mount the one at `path`, applying the
    /// admin guard.
    pub async fn navigate(&mut self, path: &str) -> String {
        let mut target = router::guard(Route::parse(path), &self.session);

        loop {
            // Dropping the old page stops its background work
            self.page = Page::NotFound;
            self.route = target;
            info!("Navigating to {}", target);

            self.page = match target {
                Route::Home => Page::Home(HomeView {
                    stats: StatsView::mount(self.api.clone()),
                    form: VoteFormView::new(),
                }),
                Route::Votes => {
                    let mut view = PublicVotesView::new();
                    // Failure is kept on the view and rendered inline
                    let _ = view.load(&self.api).await;
                    Page::Votes(view)
                }
                Route::AdminLogin => Page::Login(LoginView::new()),
                Route::AdminDashboard => {
                    let mut view = DashboardView::new();
                    match view.load(&self.api, &self.session, &self.notifier, self.lang).await {
                        Err(AppError::Unauthenticated) => {
                            target = Route::AdminLogin;
                            continue;
                        }
                        _ => Page::Dashboard(view),
                    }
                }
                Route::NotFound => Page::NotFound,
            };
            break;
        }

        self.render()
    }

    pub fn render(&self) -> String {
        let lang = self.lang;
        let body = match &self.page {
            Page::Home(home) => format!("{}\n{}", home.stats.render(lang), home.form.render(lang)),
            Page::Votes(view) => view.render(lang),
            Page::Login(view) => view.render(lang),
            Page::Dashboard(view) => view.render(lang),
            Page::NotFound => render_not_found(lang),
        };
        let direction = if lang.is_rtl() { " rtl" } else { "" };
        format!("[{}{}] {}\n{}", lang, direction, self.route, body)
    }

    pub async fn execute(&mut self, command: Command) -> String {
        debug!("Executing {:?}", command);
        let lang = self.lang;

        match command {
            Command::Help => USAGE.to_string(),
            Command::Quit => String::new(),
            Command::Go(path) => self.navigate(&path).await,
            Command::Refresh => {
                let path = self.route.path();
                self.navigate(path).await
            }
            Command::Lang(lang) => {
                self.lang = lang;
                self.render()
            }
            Command::Set(field, value) => match &mut self.page {
                Page::Home(home) => match home.form.set_field(field, &value) {
                    Ok(()) => home.form.render(lang),
                    Err(e) => e,
                },
                _ => unavailable(),
            },
            Command::Submit => match &mut self.page {
                Page::Home(home) => {
                    let _ = home.form.submit(&self.api, &self.notifier, lang).await;
                    home.form.render(lang)
                }
                _ => unavailable(),
            },
            Command::Stats => match &self.page {
                Page::Home(home) => home.stats.render(lang),
                _ => unavailable(),
            },
            Command::Login { username, password } => {
                let Page::Login(view) = &mut self.page else {
                    return unavailable();
                };
                let credentials = Credentials { username, password };
                match view.login(credentials, &self.api, &self.session, &self.notifier, lang).await {
                    Ok(next) => self.navigate(next.path()).await,
                    Err(_) => view.render(lang),
                }
            }
            Command::Logout => {
                if !matches!(self.page, Page::Dashboard(_)) {
                    return unavailable();
                }
                let next = admin::logout(&self.session);
                self.navigate(next.path()).await
            }
            Command::Edit { id, choice, opinion } => {
                let Page::Dashboard(view) = &mut self.page else {
                    return unavailable();
                };
                let Some(vote) = view.find(&id).cloned() else {
                    self.notifier.error(AppError::MissingVoteId.localized(lang));
                    return view.render(lang);
                };
                if view.begin_edit(&vote).is_ok() {
                    if let Some(dialog) = view.editing.as_mut() {
                        dialog.set_choice(choice);
                        if !opinion.is_empty() {
                            dialog.opinion = opinion;
                        }
                    }
                    let _ = view.submit_edit(&self.api, &self.session, &self.notifier, lang).await;
                }
                view.render(lang)
            }
            Command::Delete { id } => {
                let Page::Dashboard(view) = &mut self.page else {
                    return unavailable();
                };
                match view.find(&id).cloned() {
                    Some(vote) => view.select_for_delete(&vote),
                    None => {
                        view.cancel_delete();
                        self.notifier.error(AppError::MissingVoteId.localized(lang));
                    }
                }
                view.render(lang)
            }
            Command::Confirm => {
                let Page::Dashboard(view) = &mut self.page else {
                    return unavailable();
                };
                let _ = view.confirm_delete(&self.api, &self.session, &self.notifier, lang).await;
                view.render(lang)
            }
            Command::Cancel => {
                let Page::Dashboard(view) = &mut self.page else {
                    return unavailable();
                };
                view.cancel_edit();
                view.cancel_delete();
                view.render(lang)
            }
        }
    }

    /// Notifications raised since the last call, one per line.
    pub fn drain_notifications(&self) -> String {
        self.notifier
            .take_unseen()
            .into_iter()
            .map(|n| match n.level {
                Level::Success => format!("[ok] {}\n", n.message),
                Level::Error => format!("[!!] {}\n", n.message),
            })
            .collect()
    }

    #[cfg(test)]
    pub fn is_polling_stats(&self) -> bool {
        matches!(&self.page, Page::Home(home) if home.stats.is_polling())
    }
}

fn unavailable() -> String {
    "This command is not available on the current page (try `help`).".to_string()
}

/// Read commands from stdin until `quit` or end of input.
pub async fn run(mut shell: Shell, start: &str) -> std::io::Result<()> {
    println!("{}", shell.navigate(start).await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match super::parse(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => println!("{}", shell.execute(command).await),
            Err(message) => println!("{}", message),
        }
        print!("{}", shell.drain_notifications());
    }

    info!("Shell closed on {}", shell.route());
    Ok(())
}
