use tracing::warn;

/// Locales with translated notices
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "hu"];

/// Set the locale used for user-visible notices.
///
/// Unknown locales fall back to English. Returns the locale actually applied.
pub fn set_locale(locale: &str) -> &'static str {
    let normalized = locale.trim().to_ascii_lowercase();
    let applied = SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|supported| normalized == *supported || normalized.starts_with(&format!("{}-", supported)))
        .unwrap_or_else(|| {
            warn!("Unsupported locale {:?}, falling back to en", locale);
            "en"
        });
    rust_i18n::set_locale(applied);
    applied
}
