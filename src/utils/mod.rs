pub mod color;
pub mod i18n;
pub mod time;
