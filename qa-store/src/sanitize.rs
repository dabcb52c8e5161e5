//! Pure sanitization of a loaded `TeamState`, called from both `Store::get_or_create`
//! (sanitize-on-read) and `Store::save` (sanitize-on-write). Kept as a small, directly
//! testable pure function rather than folded into the store's I/O path.

use qa_config::constants::clamp_parallelism;
use qa_core::model::{ProviderKey, TeamState};

/// Normalizes a freshly loaded or about-to-be-saved `TeamState` in place:
/// - clamps `settings.parallelism` to `[1, 250]`
/// - forces `settings.browser_provider` to `BrowserUseCloud` when Hyperbrowser is disabled
/// - migrates the legacy singular `active_test_run` into `active_test_runs`
pub fn sanitize(state: &mut TeamState) {
    state.settings.parallelism = clamp_parallelism(Some(state.settings.parallelism));

    if !state.settings.hyperbrowser_enabled && state.settings.browser_provider != ProviderKey::BrowserUseCloud {
        state.settings.browser_provider = ProviderKey::BrowserUseCloud;
    }

    if let Some((run_id, meta)) = state.active_test_run.take() {
        state.active_test_runs.entry(run_id).or_insert(meta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qa_core::model::Settings;

    #[test]
    fn clamps_out_of_range_parallelism() {
        let mut state = TeamState {
            settings: Settings {
                parallelism: 9000,
                ..Default::default()
            },
            ..Default::default()
        };
        sanitize(&mut state);
        assert_eq!(state.settings.parallelism, 250);
    }

    #[test]
    fn forces_cloud_provider_when_hyperbrowser_disabled() {
        let mut state = TeamState {
            settings: Settings {
                hyperbrowser_enabled: false,
                browser_provider: ProviderKey::Hyperbrowser,
                ..Default::default()
            },
            ..Default::default()
        };
        sanitize(&mut state);
        assert_eq!(state.settings.browser_provider, ProviderKey::BrowserUseCloud);
    }

    #[test]
    fn migrates_legacy_active_run_field() {
        let mut state = TeamState::default();
        state.active_test_run = Some((
            "run-1".to_string(),
            qa_core::model::ActiveRunMeta {
                project_id: "proj-1".to_string(),
                started_at: chrono::Utc::now(),
            },
        ));
        sanitize(&mut state);
        assert!(state.active_test_run.is_none());
        assert!(state.active_test_runs.contains_key("run-1"));
    }

    #[test]
    fn sanitize_is_idempotent() {
        let mut state = TeamState {
            settings: Settings {
                parallelism: 9000,
                hyperbrowser_enabled: false,
                browser_provider: ProviderKey::Hyperbrowser,
                ..Default::default()
            },
            ..Default::default()
        };
        sanitize(&mut state);
        let once = serde_json::to_string(&state).unwrap();
        sanitize(&mut state);
        let twice = serde_json::to_string(&state).unwrap();
        assert_eq!(once, twice);
    }
}
