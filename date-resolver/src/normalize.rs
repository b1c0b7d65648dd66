//! Dialect and spelling normalization.
//!
//! Lowercases, folds Venezuelan contractions (`pa'l`, `pa' el`, `pa`) into `para el` / `para`,
//! restores accents commonly dropped when typing on a phone, and collapses whitespace.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PA_EL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bpa'?\s+el\b").expect("pa-el regex must be valid"));
static PAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bpa'?l\b").expect("pal regex must be valid"));
static PA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bpa(?:'|\b)(\s|$)").expect("pa regex must be valid"));
static UNACCENTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(proximo|proxima|manana|miercoles|sabado|dia|dias|mediodia|despues)\b")
        .expect("accent regex must be valid")
});
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("space regex must be valid"));

fn accented(word: &str) -> &'static str {
    match word {
        "proximo" => "próximo",
        "proxima" => "próxima",
        "manana" => "mañana",
        "miercoles" => "miércoles",
        "sabado" => "sábado",
        "dia" => "día",
        "dias" => "días",
        "mediodia" => "mediodía",
        _ => "después",
    }
}

/// Returns the normalized form of `text` used by the grammar and the idioms.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase().replace(['’', '´', '`'], "'");
    let s = PA_EL.replace_all(&lower, "para el");
    let s = PAL.replace_all(&s, "para el");
    let s = PA.replace_all(&s, "para$1");
    let s = UNACCENTED.replace_all(&s, |caps: &Captures| accented(&caps[1]).to_string());
    SPACES.replace_all(s.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_contractions() {
        assert_eq!(normalize("Pa'l viernes"), "para el viernes");
        assert_eq!(normalize("pal lunes"), "para el lunes");
        assert_eq!(normalize("pa' el sabado"), "para el sábado");
        assert_eq!(normalize("pa manana"), "para mañana");
        assert_eq!(normalize("pa' mañana"), "para mañana");
    }

    #[test]
    fn test_normalize_leaves_words_containing_pa_alone() {
        assert_eq!(normalize("mapa del pais"), "mapa del pais");
        assert_eq!(normalize("papa"), "papa");
    }

    #[test]
    fn test_normalize_restores_accents() {
        assert_eq!(normalize("la proxima semana"), "la próxima semana");
        assert_eq!(normalize("el proximo miercoles"), "el próximo miércoles");
        assert_eq!(normalize("en 3 dias"), "en 3 días");
        assert_eq!(normalize("MANANA al mediodia"), "mañana al mediodía");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  25   de\n diciembre "), "25 de diciembre");
    }
}
