pub mod format;
pub mod qibla;
