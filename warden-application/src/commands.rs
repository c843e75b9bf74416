pub mod evaluate_commands;
pub mod ingest_commands;
pub mod rule_commands;
pub mod score_commands;
pub mod violation_commands;
