//! Route selection for one chat turn.

use sonar_core::models::intent::Intent;

/// The execution path chosen for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Parallel internal + web fetch with cited synthesis.
    Hybrid,
    /// Single web-research provider call.
    Research,
    /// Single fast-provider call with catalog enrichment.
    Fast,
    /// Catalog-only synthesis, always available.
    Local,
}

impl Route {
    pub fn label(self) -> &'static str {
        match self {
            Route::Hybrid => "hybrid",
            Route::Research => "research",
            Route::Fast => "fast",
            Route::Local => "local",
        }
    }
}

/// Mode hint supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Fast,
    Reasoning,
}

/// Which providers are actually usable this turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct Available {
    pub fast: bool,
    pub web: bool,
    pub intel: bool,
}

/// The route table. Hybrid needs both the internal and web providers;
/// research needs web; fast needs the fast provider; local always works.
pub fn choose_route(
    mode: Mode,
    web_search: bool,
    hybrid: bool,
    intent: &Intent,
    available: Available,
) -> Route {
    if (hybrid || web_search) && available.intel && available.web {
        return Route::Hybrid;
    }
    if (mode == Mode::Reasoning || web_search || intent.requires_research) && available.web {
        return Route::Research;
    }
    if available.fast {
        return Route::Fast;
    }
    Route::Local
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> Available {
        Available {
            fast: true,
            web: true,
            intel: true,
        }
    }

    #[test]
    fn hybrid_wins_when_flagged_and_both_providers_present() {
        let intent = Intent::general();
        assert_eq!(
            choose_route(Mode::Fast, false, true, &intent, all()),
            Route::Hybrid
        );
        assert_eq!(
            choose_route(Mode::Fast, true, false, &intent, all()),
            Route::Hybrid
        );
    }

    #[test]
    fn hybrid_downgrades_to_research_without_intel() {
        let intent = Intent::general();
        let available = Available {
            intel: false,
            ..all()
        };
        assert_eq!(
            choose_route(Mode::Fast, true, false, &intent, available),
            Route::Research
        );
    }

    #[test]
    fn research_requires_web_provider() {
        let mut intent = Intent::general();
        intent.requires_research = true;
        let available = Available {
            web: false,
            intel: false,
            fast: true,
        };
        assert_eq!(
            choose_route(Mode::Reasoning, false, false, &intent, available),
            Route::Fast
        );
    }

    #[test]
    fn nothing_configured_falls_back_to_local() {
        let intent = Intent::general();
        assert_eq!(
            choose_route(Mode::Fast, false, false, &intent, Available::default()),
            Route::Local
        );
    }
}
