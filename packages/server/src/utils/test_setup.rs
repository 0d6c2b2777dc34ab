use dotenvy::dotenv;
use std::sync::Once;

static INIT: Once = Once::new();

/// Loads `.env` once and pins the settings tests rely on.
pub fn setup_test_env() {
    INIT.call_once(|| {
        dotenv().ok();
        // タイマーによる自動進行はテストでは無効にする
        std::env::set_var("AUTO_ADVANCE_PHASES", "false");
        if std::env::var("CLOSE_WHEN_COMPLETE").is_err() {
            std::env::set_var("CLOSE_WHEN_COMPLETE", "true");
        }
        if std::env::var("EARLY_ADVANCE_POLICY").is_err() {
            std::env::set_var("EARLY_ADVANCE_POLICY", "unanimous");
        }
    });
}
