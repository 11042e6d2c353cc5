//! Ambient scene decoration: weather, time-of-day theme, particles.
//!
//! Purely decorative and owned by the controller that started it; close
//! the scene on teardown or the interval tasks keep ticking.

use rand::Rng;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use verdant_core::TimeStamp;

/// Ambient weather over the garden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Weather {
    /// Clear sky.
    #[default]
    Sunny,
    /// Drifting clouds.
    Cloudy,
    /// Light rain.
    Rainy,
}

impl Weather {
    fn random() -> Self {
        match rand::thread_rng().gen_range(0..3) {
            0 => Self::Sunny,
            1 => Self::Cloudy,
            _ => Self::Rainy,
        }
    }
}

/// Scene theme derived from the hour of day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DayTheme {
    /// Soft dawn light.
    Morning,
    /// Full daylight.
    #[default]
    Sunny,
    /// Golden hour.
    Evening,
    /// Night sky.
    Moonlit,
}

/// Theme for an hour in 0..24.
pub fn theme_for_hour(hour: u32) -> DayTheme {
    match hour % 24 {
        5..=10 => DayTheme::Morning,
        11..=16 => DayTheme::Sunny,
        17..=20 => DayTheme::Evening,
        _ => DayTheme::Moonlit,
    }
}

/// Particle count for a scene of the given size, bounded so small
/// viewports still shimmer and large ones do not swarm.
pub fn particle_count(width: f32, height: f32) -> usize {
    let raw = (width * height / 25_000.0) as usize;
    raw.clamp(8, 60)
}

fn current_hour() -> u32 {
    ((TimeStamp::now().as_millis() / 3_600_000) % 24) as u32
}

/// Running ambient tasks and their latest outputs.
pub struct AmbientScene {
    weather_rx: watch::Receiver<Weather>,
    theme_rx: watch::Receiver<DayTheme>,
    tasks: Vec<JoinHandle<()>>,
}

impl AmbientScene {
    /// Weather re-roll cadence.
    pub const WEATHER_INTERVAL: Duration = Duration::from_secs(30);
    /// Theme refresh cadence.
    pub const THEME_INTERVAL: Duration = Duration::from_secs(3_600);

    /// Start the weather and theme cycles.
    pub fn start() -> Self {
        Self::with_intervals(Self::WEATHER_INTERVAL, Self::THEME_INTERVAL)
    }

    /// Start with explicit cadences.
    pub fn with_intervals(weather_every: Duration, theme_every: Duration) -> Self {
        let (weather_tx, weather_rx) = watch::channel(Weather::default());
        let (theme_tx, theme_rx) = watch::channel(theme_for_hour(current_hour()));

        let weather_task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(weather_every).await;
                let next = Weather::random();
                // Watchers only wake on an actual change.
                let changed = weather_tx.send_if_modified(|current| {
                    if *current == next {
                        false
                    } else {
                        *current = next;
                        true
                    }
                });
                if changed {
                    debug!(?next, "weather shifted");
                }
            }
        });
        let theme_task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(theme_every).await;
                let next = theme_for_hour(current_hour());
                theme_tx.send_if_modified(|current| {
                    if *current == next {
                        false
                    } else {
                        *current = next;
                        true
                    }
                });
            }
        });

        Self {
            weather_rx,
            theme_rx,
            tasks: vec![weather_task, theme_task],
        }
    }

    /// Current weather.
    pub fn weather(&self) -> Weather {
        *self.weather_rx.borrow()
    }

    /// Current theme.
    pub fn theme(&self) -> DayTheme {
        *self.theme_rx.borrow()
    }

    /// Watch the weather for change-driven redraws.
    pub fn watch_weather(&self) -> watch::Receiver<Weather> {
        self.weather_rx.clone()
    }

    /// Stop the interval tasks.
    pub fn close(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    /// Whether the interval tasks are still running.
    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }
}

impl Drop for AmbientScene {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_bands_cover_the_day() {
        assert_eq!(theme_for_hour(6), DayTheme::Morning);
        assert_eq!(theme_for_hour(12), DayTheme::Sunny);
        assert_eq!(theme_for_hour(18), DayTheme::Evening);
        assert_eq!(theme_for_hour(23), DayTheme::Moonlit);
        assert_eq!(theme_for_hour(2), DayTheme::Moonlit);
        assert_eq!(theme_for_hour(26), DayTheme::Moonlit);
    }

    #[test]
    fn particle_count_is_bounded() {
        assert_eq!(particle_count(10.0, 10.0), 8);
        assert_eq!(particle_count(10_000.0, 10_000.0), 60);
        let mid = particle_count(1_000.0, 750.0);
        assert!((8..=60).contains(&mid));
    }

    #[tokio::test(start_paused = true)]
    async fn close_stops_the_cycles() {
        let mut scene = AmbientScene::with_intervals(
            Duration::from_millis(10),
            Duration::from_millis(10),
        );
        assert!(scene.is_running());
        scene.close();
        assert!(!scene.is_running());
    }
}
