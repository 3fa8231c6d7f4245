//! Completion records: which trackers were done on which days.

mod db;

pub use db::{
    CompletionRecord, count_completions, create_completion, create_completion_table,
    get_all_completions, get_completed_dates, is_completed, toggle_completion,
};
