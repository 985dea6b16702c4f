pub mod base_commands;
pub mod compare_cmd;
pub mod project_cmd;
pub mod report_format;
