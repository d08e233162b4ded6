pub mod admin;
pub mod public;
pub mod stats;
pub mod vote;

use crate::i18n::{self, Language};

pub fn render_not_found(lang: Language) -> String {
    format!(
        "404\n{}\n{}\n[{}: go /]\n",
        i18n::t(lang, "pageNotFound"),
        i18n::t(lang, "pageNotFoundDesc"),
        i18n::t(lang, "backToHome")
    )
}
