//! Reply texts. All user-facing wording lives here.

use chrono::{DateTime, Utc};
use date_resolver::format_long;
use intake_core::FinalizedOrder;

use crate::session::Session;
use crate::transition::Prompt;

pub const CANCELLED: &str = "❌ Pedido cancelado.";
pub const DECLINED: &str = "👍 Entendido, no se creó ningún pedido.";
pub const SEND_CONTENT: &str = "✍️ Envía el texto o las imágenes que quieras agregar.";
pub const WRITE_TITLE: &str = "✏️ Escribe el nuevo título del pedido.";
pub const DELIVERY_DATE: &str = "📅 ¿Para cuándo es la entrega?";
pub const DELIVERY_DATE_RETRY: &str = "🤔 No entendí la fecha. Prueba con algo como:\n\
• mañana\n\
• el viernes\n\
• 25 de diciembre\n\
• 15/03\n\
• en 3 días";

pub fn start_confirmation(session: &Session) -> String {
    let kind = if session.fragments.is_empty() && !session.attachments.is_empty() {
        "esta 📷 imagen"
    } else {
        "este 📄 mensaje"
    };
    format!("¿Iniciar pedido con {}? (sí/no)", kind)
}

pub fn more_content(session: &Session) -> String {
    format!(
        "✅ Recibido ({} mensaje(s), {} imagen(es)).\n\n¿Deseas *agregar algo más*? (sí/no)",
        session.fragments.len(),
        session.attachments.len()
    )
}

pub fn title_confirmation(session: &Session) -> String {
    format!(
        "¿Usar el título:\n*\"{}\"*?\n\nResponde *sí* o *otro* para cambiarlo.",
        session.proposed_title()
    )
}

/// Summary sent when the order is finalized.
pub fn finalized(order: &FinalizedOrder) -> String {
    let description = order.description();
    let date = order
        .delivery_date
        .as_ref()
        .map(format_long)
        .unwrap_or_else(|| "No especificada".to_string());
    [
        "📦 *Resumen del Pedido*".to_string(),
        String::new(),
        format!("*Título:* {}", order.title),
        String::new(),
        "*Descripción:*".to_string(),
        if description.is_empty() {
            "Sin descripción".to_string()
        } else {
            description
        },
        String::new(),
        format!("*Fecha de entrega:* {}", date),
        format!("*Imágenes:* {} adjunta(s)", order.attachments.len()),
    ]
    .join("\n")
}

/// Renders `prompt` against the session as it stands after the transition.
/// `Finalized` needs the order snapshot and is rendered by [`finalized`] instead.
pub fn render(prompt: Prompt, session: &Session, now: DateTime<Utc>) -> String {
    match prompt {
        Prompt::StartConfirmation => start_confirmation(session),
        Prompt::MoreContent => more_content(session),
        Prompt::SendContent => SEND_CONTENT.to_string(),
        Prompt::TitleConfirmation => title_confirmation(session),
        Prompt::WriteTitle => WRITE_TITLE.to_string(),
        Prompt::DeliveryDate => DELIVERY_DATE.to_string(),
        Prompt::DeliveryDateRetry => DELIVERY_DATE_RETRY.to_string(),
        Prompt::Declined => DECLINED.to_string(),
        Prompt::Cancelled => CANCELLED.to_string(),
        Prompt::Finalized => finalized(&session.to_order(now)),
    }
}
