use serde::Serialize;

use super::status::OperatingStatus;

/// User-facing copy shown while a status is in effect.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
}

const OPEN: StatusMessage = StatusMessage {
    title: "✅ Loja Aberta",
    subtitle: "Bem-vindo!",
    description: "Estamos prontos para servi-lo!",
    emoji: "✅",
};

const NIGHT_CLOSED: StatusMessage = StatusMessage {
    title: "😴 Nossas lojas estão a descansar",
    subtitle: "Voltamos logo pela manhã!",
    description: "Durante a madrugada as operações de compra e venda ficam pausadas. Volte a partir da hora de reabertura.",
    emoji: "😴",
};

const SABBATH_CLOSED: StatusMessage = StatusMessage {
    title: "🌅 Feliz Sábado!",
    subtitle: "Shalom! 🕊️",
    description: "Em observância aos princípios bíblicos, nossas operações de compra e venda estão pausadas até ao fim do sábado. Aproveite o dia para descanso e família.",
    emoji: "🌅",
};

pub fn status_message(status: OperatingStatus) -> StatusMessage {
    match status {
        OperatingStatus::Open => OPEN,
        OperatingStatus::NightClosed => NIGHT_CLOSED,
        OperatingStatus::SabbathClosed => SABBATH_CLOSED,
    }
}
