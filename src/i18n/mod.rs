use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// UI language selected for the running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Fr,
    Ar,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::Ar => "ar",
        }
    }

    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Ar)
    }

    /// Date pattern used when rendering vote timestamps.
    pub fn date_format(self) -> &'static str {
        match self {
            Language::Fr => "%d/%m/%Y",
            Language::Ar => "%Y/%m/%d",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" => Ok(Language::Fr),
            "ar" => Ok(Language::Ar),
            other => Err(format!("Unsupported language: {}", other)),
        }
    }
}

type Table = HashMap<&'static str, &'static str>;

lazy_static! {
    static ref FR: Table = {
        let mut t = HashMap::new();
        // Vote form
        t.insert("title", "Exprimez votre position");
        t.insert("matricule", "Matricule");
        t.insert("name", "Nom complet");
        t.insert("position", "Votre position");
        t.insert("for", "Pour");
        t.insert("against", "Contre");
        t.insert("opinion", "Votre avis");
        t.insert("englishExamIssue", "Problème de l'examen d'anglais");
        t.insert("pvIssue", "Problème du PV");
        t.insert("submit", "Envoyer");
        t.insert("success", "Votre vote a été enregistré avec succès");
        t.insert("error", "Une erreur est survenue, veuillez réessayer");
        t.insert("allFieldsRequired", "Tous les champs sont obligatoires");
        t.insert("matriculeError", "Le matricule doit être compris entre 22001 et 23119");
        t.insert("alreadyVoted", "Ce matricule a déjà voté");
        t.insert("invalidMatricule", "Format de matricule invalide");
        t.insert("matriculeRequired", "Le matricule est obligatoire");
        t.insert("nameRequired", "Le nom est obligatoire");
        // Statistics
        t.insert("currentResults", "Résultats en direct");
        t.insert("votes", "votes");
        t.insert("recentOpinions", "Avis récents");
        t.insert("anonymous", "Anonyme");
        t.insert("totalVotes", "Total des votes");
        t.insert("viewAllVotes", "Voir tous les votes");
        // Public list
        t.insert("allVotes", "Tous les votes");
        t.insert("allVotesDesc", "La liste publique de tous les votes exprimés");
        t.insert("noVotes", "Aucun vote pour le moment");
        t.insert("fetchVotesError", "Impossible de charger les votes");
        // Not found
        t.insert("pageNotFound", "Page introuvable");
        t.insert("pageNotFoundDesc", "La page que vous cherchez n'existe pas ou a été déplacée.");
        t.insert("backToHome", "Retour à l'accueil");
        // Admin
        t.insert("adminLogin", "Connexion administrateur");
        t.insert("loginSuccess", "Connexion réussie");
        t.insert("loginFailed", "Échec de la connexion");
        t.insert("dashboard", "Tableau de bord");
        t.insert("updateSuccess", "Vote mis à jour avec succès");
        t.insert("updateError", "Échec de la mise à jour du vote");
        t.insert("deleteSuccess", "Vote supprimé avec succès");
        t.insert("deleteError", "Échec de la suppression du vote");
        t.insert("invalidVoteId", "Identifiant de vote invalide");
        t.insert("confirmDelete", "Confirmer la suppression");
        t.insert("deleteConfirmation", "Voulez-vous vraiment supprimer ce vote ? Cette action est irréversible.");
        t.insert("cancel", "Annuler");
        t.insert("delete", "Supprimer");
        t.insert("logout", "Déconnexion");
        t.insert("loading", "Chargement...");
        t
    };

    static ref AR: Table = {
        let mut t = HashMap::new();
        // Vote form
        t.insert("title", "عبّر عن موقفك");
        t.insert("matricule", "رقم التسجيل");
        t.insert("name", "الاسم الكامل");
        t.insert("position", "موقفك");
        t.insert("for", "مع");
        t.insert("against", "ضد");
        t.insert("opinion", "رأيك");
        t.insert("englishExamIssue", "مشكلة امتحان اللغة الإنجليزية");
        t.insert("pvIssue", "مشكلة المحضر");
        t.insert("submit", "إرسال");
        t.insert("success", "تم تسجيل صوتك بنجاح");
        t.insert("error", "حدث خطأ، يرجى المحاولة مرة أخرى");
        t.insert("allFieldsRequired", "جميع الحقول مطلوبة");
        t.insert("matriculeError", "يجب أن يكون رقم التسجيل بين 22001 و 23119");
        t.insert("alreadyVoted", "لقد صوّت رقم التسجيل هذا مسبقاً");
        t.insert("invalidMatricule", "صيغة رقم التسجيل غير صحيحة");
        t.insert("matriculeRequired", "رقم التسجيل مطلوب");
        t.insert("nameRequired", "الاسم مطلوب");
        // Statistics
        t.insert("currentResults", "النتائج المباشرة");
        t.insert("votes", "أصوات");
        t.insert("recentOpinions", "آخر الآراء");
        t.insert("anonymous", "مجهول");
        t.insert("totalVotes", "مجموع الأصوات");
        t.insert("viewAllVotes", "عرض جميع الأصوات");
        // Public list
        t.insert("allVotes", "جميع الأصوات");
        t.insert("allVotesDesc", "القائمة العامة لجميع الأصوات");
        t.insert("noVotes", "لا توجد أصوات حتى الآن");
        t.insert("fetchVotesError", "تعذّر تحميل الأصوات");
        // Not found
        t.insert("pageNotFound", "الصفحة غير موجودة");
        t.insert("pageNotFoundDesc", "الصفحة التي تبحث عنها غير موجودة أو تم نقلها.");
        t.insert("backToHome", "العودة إلى الصفحة الرئيسية");
        // Admin
        t.insert("adminLogin", "دخول المشرف");
        t.insert("loginSuccess", "تم تسجيل الدخول بنجاح");
        t.insert("loginFailed", "فشل تسجيل الدخول");
        t.insert("dashboard", "لوحة التحكم");
        t.insert("updateSuccess", "تم تحديث الصوت بنجاح");
        t.insert("updateError", "فشل تحديث الصوت");
        t.insert("deleteSuccess", "تم حذف الصوت بنجاح");
        t.insert("deleteError", "فشل حذف الصوت");
        t.insert("invalidVoteId", "معرّف الصوت غير صالح");
        t.insert("confirmDelete", "تأكيد الحذف");
        t.insert("deleteConfirmation", "هل أنت متأكد من حذف هذا الصوت؟ لا يمكن التراجع عن هذا الإجراء.");
        t.insert("cancel", "إلغاء");
        t.insert("delete", "حذف");
        t.insert("logout", "تسجيل الخروج");
        t.insert("loading", "جارٍ التحميل...");
        t
    };
}

fn table(lang: Language) -> &'static Table {
    match lang {
        Language::Fr => &*FR,
        Language::Ar => &*AR,
    }
}

/// Look up a UI string. Falls back to French, then to the key itself.
pub fn t(lang: Language, key: &'static str) -> &'static str {
    if let Some(value) = table(lang).get(key).copied() {
        return value;
    }
    if let Some(value) = FR.get(key).copied() {
        log::debug!("Translation key '{}' missing for '{}', using fr", key, lang);
        return value;
    }
    log::warn!("Translation key '{}' missing in every table", key);
    key
}

/// Lookup for keys that come from data rather than code (opinion values).
pub fn lookup(lang: Language, key: &str) -> Option<&'static str> {
    table(lang).get(key).copied()
}
