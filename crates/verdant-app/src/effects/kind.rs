//! The effect vocabulary.

use std::time::Duration;

/// What happens when an effect is requested on a target that already has
/// one running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectPolicy {
    /// Run after the current effect finishes, in request order.
    Queue,
    /// Discard the request; the running effect already covers it.
    Drop,
}

/// One visual effect, with its marker class and its fallback budget.
///
/// The fallback is longer than the nominal animation so a completion
/// signal normally wins; it only exists so a swallowed signal cannot
/// leave a marker attached forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Brief scale pulse on a growing element.
    GrowPulse,
    /// Confetti burst on a completion.
    Celebrate,
    /// Flower bloom on a new goal node.
    Bloom,
    /// Entry card sliding into a feed.
    SlideUpFadeIn,
    /// Plant visibly growing after being watered.
    Growing,
    /// Water splash over a watered plant.
    WaterSplash,
    /// A sprout appearing in the garden.
    SproutAppear,
    /// Badge award toast.
    BadgeToast,
}

impl EffectKind {
    /// The marker class the render surface attaches.
    pub fn marker_class(&self) -> &'static str {
        match self {
            Self::GrowPulse => "grow-pulse",
            Self::Celebrate => "celebrate",
            Self::Bloom => "bloom",
            Self::SlideUpFadeIn => "slide-up-fade-in",
            Self::Growing => "growing",
            Self::WaterSplash => "water-splash",
            Self::SproutAppear => "sprout-appear",
            Self::BadgeToast => "badge-toast",
        }
    }

    /// Fallback cleanup budget.
    pub fn fallback(&self) -> Duration {
        let ms = match self {
            Self::GrowPulse => 600,
            Self::SlideUpFadeIn => 700,
            Self::WaterSplash => 900,
            Self::Bloom => 1_000,
            Self::Celebrate => 1_200,
            Self::SproutAppear => 1_500,
            Self::Growing => 2_000,
            Self::BadgeToast => 4_000,
        };
        Duration::from_millis(ms)
    }

    /// Contention policy against a running effect on the same target.
    pub fn policy(&self) -> EffectPolicy {
        match self {
            Self::GrowPulse | Self::SlideUpFadeIn | Self::WaterSplash => EffectPolicy::Drop,
            Self::Celebrate
            | Self::Bloom
            | Self::Growing
            | Self::SproutAppear
            | Self::BadgeToast => EffectPolicy::Queue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallbacks_stay_in_budget() {
        for kind in [
            EffectKind::GrowPulse,
            EffectKind::Celebrate,
            EffectKind::Bloom,
            EffectKind::SlideUpFadeIn,
            EffectKind::Growing,
            EffectKind::WaterSplash,
            EffectKind::SproutAppear,
            EffectKind::BadgeToast,
        ] {
            let ms = kind.fallback().as_millis();
            assert!((600..=4_000).contains(&ms), "{kind:?} out of budget");
        }
    }
}
