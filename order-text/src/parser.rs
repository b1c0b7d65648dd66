//! One-shot parsing of order messages and extraction of print details.

use chrono::{DateTime, FixedOffset};
use date_resolver::{DateParser, ResolvedDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Hashtag that marks a message as an order.
pub const ORDER_HASHTAG: &str = "#pedido";

/// Titles longer than this are cut to `TITLE_LIMIT - 3` chars plus `...`.
const TITLE_LIMIT: usize = 100;
const FALLBACK_TITLE: &str = "Nuevo pedido";

const MATERIALS: [&str; 6] = ["pla", "abs", "petg", "tpu", "nylon", "resina"];
const COLORS: [&str; 13] = [
    "negro",
    "blanco",
    "rojo",
    "azul",
    "verde",
    "amarillo",
    "naranja",
    "morado",
    "rosa",
    "gris",
    "transparente",
    "dorado",
    "plateado",
];

static HASHTAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("(?i){}", regex::escape(ORDER_HASHTAG))).expect("hashtag regex must be valid")
});
static LEADING_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s\-:]+").expect("leading punctuation regex must be valid"));
static URGENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(urgente|asap|para ya|lo antes posible|r[aá]pido)\b")
        .expect("urgency regex must be valid")
});
static GRAMS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:gramos?|grs?|g)\b").expect("grams regex must be valid")
});
static QUANTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:unidades?|piezas?|copias?)\b").expect("quantity regex must be valid")
});
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("word regex must be valid"));

/// True when `text` carries the order hashtag (any case).
pub fn is_order(text: &str) -> bool {
    HASHTAG.is_match(text)
}

/// Print details mentioned anywhere in an order text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub grams: Option<f64>,
    /// Upper-case material name, e.g. `PETG`.
    pub material: Option<String>,
    /// Capitalized Spanish colour, e.g. `Rojo`.
    pub color: Option<String>,
    pub quantity: u32,
    pub urgent: bool,
}

impl Default for OrderDetails {
    fn default() -> Self {
        Self {
            grams: None,
            material: None,
            color: None,
            quantity: 1,
            urgent: false,
        }
    }
}

impl OrderDetails {
    pub fn has_specs(&self) -> bool {
        self.quantity > 1 || self.material.is_some() || self.color.is_some() || self.grams.is_some()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Matches `rojo`, `rojos`, `roja`, `rojas` for the colour `rojo`.
fn is_color_word(word: &str, color: &str) -> bool {
    if word == color || word.strip_suffix('s') == Some(color) {
        return true;
    }
    match color.strip_suffix('o') {
        Some(stem) => word.strip_prefix(stem).is_some_and(|rest| rest == "a" || rest == "as"),
        None => false,
    }
}

pub fn extract_details(text: &str) -> OrderDetails {
    let lower = text.to_lowercase();
    let words: Vec<&str> = WORD.find_iter(&lower).map(|m| m.as_str()).collect();

    let grams = GRAMS
        .captures(text)
        .and_then(|c| c[1].replace(',', ".").parse::<f64>().ok());
    let quantity = QUANTITY
        .captures(text)
        .and_then(|c| c[1].parse::<u32>().ok())
        .filter(|q| *q > 0)
        .unwrap_or(1);
    let material = MATERIALS
        .iter()
        .find(|m| words.contains(*m))
        .map(|m| m.to_uppercase());
    let color = COLORS
        .iter()
        .find(|c| words.iter().any(|w| is_color_word(w, c)))
        .map(|c| capitalize(c));

    OrderDetails {
        grams,
        material,
        color,
        quantity,
        urgent: URGENT.is_match(text),
    }
}

/// An order read from a single message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedOrder {
    pub title: String,
    pub description: String,
    pub delivery_date: Option<ResolvedDate>,
    pub details: OrderDetails,
    pub original: String,
}

fn clean_title(line: &str) -> String {
    let without_tag = HASHTAG.replace_all(line, "");
    LEADING_PUNCT.replace(&without_tag, "").trim().to_string()
}

fn limit_title(title: String) -> String {
    if title.chars().count() > TITLE_LIMIT {
        let cut: String = title.chars().take(TITLE_LIMIT - 3).collect();
        format!("{}...", cut)
    } else {
        title
    }
}

/// Parses a whole order from one message. `None` for blank text.
///
/// The title is the line carrying the hashtag (else the first line), the description is whatever
/// follows it, and the delivery date is looked up in the whole message.
pub fn parse_order(
    text: &str,
    dates: &dyn DateParser,
    reference: DateTime<FixedOffset>,
) -> Option<ParsedOrder> {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.is_empty() {
        return None;
    }

    let title_at = lines.iter().position(|l| is_order(l)).unwrap_or(0);
    let mut title = clean_title(lines[title_at]);
    let mut rest = &lines[title_at + 1..];

    if title.is_empty() {
        if let Some((next, tail)) = rest.split_first() {
            title = next.to_string();
            rest = tail;
        }
    }
    if title.is_empty() {
        title = FALLBACK_TITLE.to_string();
    }

    let description = if rest.is_empty() {
        text.trim().to_string()
    } else {
        rest.join("\n")
    };

    Some(ParsedOrder {
        title: limit_title(title),
        description,
        delivery_date: dates.parse(text, reference),
        details: extract_details(text),
        original: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use date_resolver::DateResolver;

    fn reference() -> DateTime<FixedOffset> {
        FixedOffset::west_opt(4 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 19, 9, 0, 0)
            .unwrap()
    }

    fn parse(text: &str) -> Option<ParsedOrder> {
        let resolver = DateResolver::new(*reference().offset());
        parse_order(text, &resolver, reference())
    }

    #[test]
    fn test_is_order() {
        assert!(is_order("#PEDIDO llavero"));
        assert!(is_order("hola #pedido"));
        assert!(!is_order("pedido sin hashtag"));
    }

    #[test]
    fn test_title_from_hashtag_line() {
        let order = parse("Hola!\n#pedido - Llavero Pikachu\n3 unidades\nen PLA amarillo").unwrap();
        assert_eq!(order.title, "Llavero Pikachu");
        assert_eq!(order.description, "3 unidades\nen PLA amarillo");
        assert_eq!(order.details.quantity, 3);
        assert_eq!(order.details.material.as_deref(), Some("PLA"));
        assert_eq!(order.details.color.as_deref(), Some("Amarillo"));
    }

    #[test]
    fn test_bare_hashtag_uses_next_line() {
        let order = parse("#pedido\nSoporte de monitor\nnegro mate").unwrap();
        assert_eq!(order.title, "Soporte de monitor");
        assert_eq!(order.description, "negro mate");
    }

    #[test]
    fn test_only_hashtag_falls_back() {
        let order = parse("#pedido").unwrap();
        assert_eq!(order.title, "Nuevo pedido");
        assert_eq!(order.description, "#pedido");
    }

    #[test]
    fn test_long_title_is_cut() {
        let order = parse(&format!("#pedido {}", "a".repeat(150))).unwrap();
        assert_eq!(order.title.chars().count(), 100);
        assert!(order.title.ends_with("..."));
    }

    #[test]
    fn test_blank_is_none() {
        assert!(parse("  \n ").is_none());
    }

    #[test]
    fn test_date_from_whole_message() {
        let order = parse("#pedido Maceta\npara el viernes").unwrap();
        assert_eq!(order.delivery_date.unwrap().date().to_string(), "2026-10-23");
    }

    #[test]
    fn test_details() {
        let d = extract_details("Necesito 2 piezas de 45.5 gr en PETG, rojas. URGENTE");
        assert_eq!(d.grams, Some(45.5));
        assert_eq!(d.quantity, 2);
        assert_eq!(d.material.as_deref(), Some("PETG"));
        assert_eq!(d.color.as_deref(), Some("Rojo"));
        assert!(d.urgent);
        assert!(d.has_specs());
    }

    #[test]
    fn test_details_need_whole_words() {
        let d = extract_details("un adorno de plata con 3 grandes detalles");
        assert_eq!(d.material, None);
        assert_eq!(d.grams, None);
        assert_eq!(d.quantity, 1);
        assert!(!d.urgent);
        assert!(!d.has_specs());
    }
}
