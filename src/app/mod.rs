mod output;

pub(crate) use output::{print_outcome, print_outcomes, print_summaries, print_summary};
