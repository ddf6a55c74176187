//! Terminal output helpers.

pub mod progress;
pub mod styling;

pub use progress::{create_progress_bar, create_spinner, finish_with_success, finish_with_warning};
pub use styling::{
    print_banner, print_completion, print_info, print_plan, print_step_header, print_success,
    print_warning, PlanSummary,
};
