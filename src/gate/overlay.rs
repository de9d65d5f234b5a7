use std::{fmt, sync::Arc};

use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use super::{
    gate::{GateSnapshot, StoreHoursGate},
    message::{status_message, StatusMessage},
    status::OperatingStatus,
};

const WEEKDAYS: [&str; 7] = [
    "segunda-feira",
    "terça-feira",
    "quarta-feira",
    "quinta-feira",
    "sexta-feira",
    "sábado",
    "domingo",
];

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

pub const BROWSING_NOTICE: &str =
    "📱 Você pode continuar navegando, mas operações de compra/venda estão desativadas.";

/// Content of the blocking overlay shown while the store is closed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Overlay {
    pub status: OperatingStatus,
    pub message: StatusMessage,
    pub reopens_at: Option<String>,
}

impl Overlay {
    /// `None` when the store is open, meaning any overlay should be removed.
    pub fn new(status: OperatingStatus, reopens_at: Option<DateTime<Tz>>) -> Option<Self> {
        if status.is_open() {
            return None;
        }
        Some(Self {
            status,
            message: status_message(status),
            reopens_at: reopens_at.map(|at| format_reopening(status, &at)),
        })
    }

    pub fn from_snapshot(snapshot: &GateSnapshot) -> Option<Self> {
        Self::new(snapshot.status, snapshot.next_open_time)
    }
}

impl fmt::Display for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message.emoji)?;
        writeln!(f, "{}", self.message.title)?;
        writeln!(f, "{}", self.message.subtitle)?;
        writeln!(f, "{}", self.message.description)?;
        if let Some(reopens_at) = &self.reopens_at {
            writeln!(f, "⏰ Reabrimos em: {}", reopens_at)?;
        }
        write!(f, "{}", BROWSING_NOTICE)
    }
}

/// pt-BR reopening time. A Sabbath reopening is a day away, so it gets the full
/// date; a night reopening only needs the clock time.
pub fn format_reopening(status: OperatingStatus, at: &DateTime<Tz>) -> String {
    let time = format!("{:02}:{:02}", at.hour(), at.minute());
    match status {
        OperatingStatus::SabbathClosed => format!(
            "{}, {} de {} de {} às {}",
            WEEKDAYS[at.weekday().num_days_from_monday() as usize],
            at.day(),
            MONTHS[at.month0() as usize],
            at.year(),
            time
        ),
        _ => time,
    }
}

/// Something that can put the overlay on screen and take it off again.
pub trait OverlayRenderer {
    fn show(&mut self, overlay: &Overlay);
    fn clear(&mut self);

    fn render(&mut self, overlay: Option<&Overlay>) {
        match overlay {
            Some(overlay) => self.show(overlay),
            None => self.clear(),
        }
    }
}

/// Renders the current state, then re-renders on every status change until the
/// gate's event channel closes.
pub async fn follow_gate<R: OverlayRenderer>(gate: Arc<StoreHoursGate>, mut renderer: R) {
    let mut events = gate.subscribe();
    render_current(&gate, &mut renderer);
    loop {
        match events.recv().await {
            Ok(_) => render_current(&gate, &mut renderer),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "overlay renderer fell behind, rendering latest status");
                render_current(&gate, &mut renderer);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn render_current<R: OverlayRenderer>(gate: &StoreHoursGate, renderer: &mut R) {
    match gate.snapshot() {
        Ok(snapshot) => renderer.render(Overlay::from_snapshot(&snapshot).as_ref()),
        Err(err) => warn!(error = %err, "could not render store overlay"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;
    use chrono_tz::America::Sao_Paulo;

    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Tz> {
        Sao_Paulo
            .with_ymd_and_hms(2025, 1, day, hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn no_overlay_while_open() {
        assert_eq!(Overlay::new(OperatingStatus::Open, None), None);
    }

    #[test]
    fn sabbath_overlay_shows_full_date() {
        let overlay = Overlay::new(OperatingStatus::SabbathClosed, Some(at(4, 18, 0))).unwrap();
        assert_eq!(
            overlay.reopens_at.as_deref(),
            Some("sábado, 4 de janeiro de 2025 às 18:00")
        );
        let text = overlay.to_string();
        assert!(text.starts_with("🌅\n🌅 Feliz Sábado!\n"));
        assert!(text.contains("⏰ Reabrimos em: sábado, 4 de janeiro de 2025 às 18:00"));
        assert!(text.ends_with(BROWSING_NOTICE));
    }

    #[test]
    fn night_overlay_shows_time_only() {
        let overlay = Overlay::new(OperatingStatus::NightClosed, Some(at(9, 6, 0))).unwrap();
        assert_eq!(overlay.reopens_at.as_deref(), Some("06:00"));
        assert!(overlay.to_string().contains("⏰ Reabrimos em: 06:00"));

        let overlay = Overlay::new(OperatingStatus::NightClosed, None).unwrap();
        assert!(!overlay.to_string().contains("Reabrimos"));
    }

    #[derive(Default)]
    struct Recorder {
        frames: Arc<Mutex<Vec<Option<OperatingStatus>>>>,
    }

    impl OverlayRenderer for Recorder {
        fn show(&mut self, overlay: &Overlay) {
            self.frames.lock().unwrap().push(Some(overlay.status));
        }

        fn clear(&mut self) {
            self.frames.lock().unwrap().push(None);
        }
    }

    #[tokio::test]
    async fn follower_renders_initial_state_and_transitions() {
        use crate::{
            gate::config::GateConfig,
            timing::{clock::ManualClock, window::NightWindow},
        };

        let clock = Arc::new(ManualClock::new(at(3, 17, 59)));
        let config = GateConfig::new(NightWindow::LATE_NIGHT);
        let gate = Arc::new(StoreHoursGate::new(&config, clock.clone()).unwrap());
        gate.init();

        let recorder = Recorder::default();
        let frames = recorder.frames.clone();
        let follower = tokio::spawn(follow_gate(gate.clone(), recorder));
        while frames.lock().unwrap().is_empty() {
            tokio::task::yield_now().await;
        }

        clock.set(at(3, 18, 0));
        gate.refresh().unwrap();
        for _ in 0..10 {
            if frames.lock().unwrap().len() >= 2 {
                break;
            }
            tokio::task::yield_now().await;
        }
        follower.abort();

        let frames = frames.lock().unwrap().clone();
        assert_eq!(frames, vec![None, Some(OperatingStatus::SabbathClosed)]);
    }
}
