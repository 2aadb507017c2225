// Job recommendations for the job-seeker dashboard.
// Scoring and settings merging are pure; storage lives behind `store::SettingsStore`.

pub mod handlers;
pub mod scorer;
pub mod settings;
pub mod store;
pub mod tier;
