use std::fmt;

use crate::session::AdminSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Votes,
    AdminLogin,
    AdminDashboard,
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = path.trim();
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::Home,
            "/votes" => Route::Votes,
            "/admin" | "/admin/login" => Route::AdminLogin,
            "/admin/dashboard" => Route::AdminDashboard,
            _ => Route::NotFound,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Votes => "/votes",
            Route::AdminLogin => "/admin",
            Route::AdminDashboard => "/admin/dashboard",
            Route::NotFound => "/404",
        }
    }

    pub fn requires_admin(self) -> bool {
        matches!(self, Route::AdminDashboard)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Redirect guarded routes to the login page when no token is stored.
/// Only presence is checked; a stale token fails on the first admin call.
pub fn guard(route: Route, session: &AdminSession) -> Route {
    if route.requires_admin() && !session.is_authenticated() {
        log::info!("No admin token, redirecting {} to {}", route, Route::AdminLogin);
        return Route::AdminLogin;
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/votes/"), Route::Votes);
        assert_eq!(Route::parse("/admin"), Route::AdminLogin);
        assert_eq!(Route::parse("/admin/login"), Route::AdminLogin);
        assert_eq!(Route::parse("/admin/dashboard?tab=1"), Route::AdminDashboard);
        assert_eq!(Route::parse("/nowhere"), Route::NotFound);
    }

    #[test]
    fn dashboard_requires_a_stored_token() {
        let session = AdminSession::in_memory();
        assert_eq!(guard(Route::AdminDashboard, &session), Route::AdminLogin);
        assert_eq!(guard(Route::Votes, &session), Route::Votes);

        session.sign_in("anything").unwrap();
        assert_eq!(guard(Route::AdminDashboard, &session), Route::AdminDashboard);
    }
}
