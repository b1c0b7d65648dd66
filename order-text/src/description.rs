//! Markdown card description for the task board.

use chrono::{DateTime, FixedOffset, Utc};
use date_resolver::{format_long, is_urgent};
use intake_core::FinalizedOrder;

use crate::parser::{extract_details, OrderDetails};

/// Renders a card body.
///
/// `delivery` and `attachments` describe what came with the order; `received_at` is printed in the
/// footer in its own offset.
pub fn card_description(
    description: &str,
    details: &OrderDetails,
    delivery: Option<&DateTime<FixedOffset>>,
    attachments: usize,
    received_at: DateTime<FixedOffset>,
) -> String {
    let mut sections: Vec<String> = vec!["## 📦 Detalles del Pedido\n".to_string()];

    sections.push("### Descripción".to_string());
    sections.push(description.to_string());
    sections.push(String::new());

    if details.has_specs() {
        let mut specs = Vec::new();
        if details.quantity > 1 {
            specs.push(format!("**Cantidad:** {}", details.quantity));
        }
        if let Some(material) = &details.material {
            specs.push(format!("**Material:** {}", material));
        }
        if let Some(color) = &details.color {
            specs.push(format!("**Color:** {}", color));
        }
        if let Some(grams) = details.grams {
            specs.push(format!("**Peso estimado:** {}g", grams));
        }
        sections.push("### Especificaciones".to_string());
        sections.push(specs.join("\n"));
        sections.push(String::new());
    }

    if let Some(date) = delivery {
        sections.push("### 📅 Entrega".to_string());
        sections.push(format_long(date));
        sections.push(String::new());
    }

    if details.urgent {
        sections.push("### ⚠️ Prioridad".to_string());
        sections.push("**URGENTE**".to_string());
        sections.push(String::new());
    }

    if attachments > 0 {
        sections.push(format!("*Imágenes:* {} adjunta(s)", attachments));
        sections.push(String::new());
    }

    sections.push("---".to_string());
    sections.push(format!(
        "*Recibido vía WhatsApp: {}*",
        received_at.format("%d/%m/%Y %H:%M")
    ));

    sections.join("\n")
}

/// Card body for a finalized conversation. Details are read from the fragments; an order due within
/// two days is marked urgent even if nobody said so.
pub fn describe_order(order: &FinalizedOrder, offset: &FixedOffset, now: DateTime<Utc>) -> String {
    let description = order.description();
    let mut details = extract_details(&description);
    if let Some(date) = &order.delivery_date {
        details.urgent |= is_urgent(date, now);
    }
    card_description(
        if description.is_empty() {
            &order.title
        } else {
            &description
        },
        &details,
        order.delivery_date.as_ref(),
        order.attachments.len(),
        order.finalized_at.with_timezone(offset),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use intake_core::Attachment;

    fn offset() -> FixedOffset {
        FixedOffset::west_opt(4 * 3600).unwrap()
    }

    fn order(delivery_day: u32) -> FinalizedOrder {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap();
        FinalizedOrder {
            chat_id: "grupo".to_string(),
            author_name: "Ana".to_string(),
            title: "Llavero".to_string(),
            fragments: vec!["Llavero".to_string(), "2 piezas en TPU azul".to_string()],
            attachments: vec![Attachment::new("m1")],
            delivery_date: Some(offset().with_ymd_and_hms(2026, 10, delivery_day, 12, 0, 0).unwrap()),
            delivery_date_text: Some("el viernes".to_string()),
            started_at: now,
            finalized_at: now,
        }
    }

    #[test]
    fn test_card_sections() {
        let o = order(23);
        let text = describe_order(&o, &offset(), o.finalized_at);
        assert!(text.starts_with("## 📦 Detalles del Pedido"));
        assert!(text.contains("### Descripción\nLlavero\n2 piezas en TPU azul"));
        assert!(text.contains("**Cantidad:** 2\n**Material:** TPU\n**Color:** Azul"));
        assert!(text.contains("viernes, 23 de octubre de 2026"));
        assert!(text.contains("1 adjunta(s)"));
        assert!(text.ends_with("*Recibido vía WhatsApp: 19/10/2026 09:00*"));
        assert!(!text.contains("URGENTE"));
    }

    #[test]
    fn test_near_delivery_is_urgent() {
        let o = order(20);
        let text = describe_order(&o, &offset(), o.finalized_at);
        assert!(text.contains("### ⚠️ Prioridad\n**URGENTE**"));
    }

    #[test]
    fn test_plain_description_has_no_specs() {
        let received = offset().with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
        let text = card_description("Algo sencillo", &OrderDetails::default(), None, 0, received);
        assert!(!text.contains("Especificaciones"));
        assert!(!text.contains("Entrega"));
        assert!(!text.contains("Imágenes"));
    }
}
