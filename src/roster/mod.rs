//! Teachers, levels, level changes and salary cycles.

mod levels;
mod promotion;
mod salary_cycles;
mod teachers;

pub use levels::{create_level, delete_level, get_level, list_levels, update_level};
pub use promotion::{LevelChangeOutcome, LevelChangeRequest, demote, promote};
pub use salary_cycles::{
    create_salary_cycles, current_salary_cycle, delete_salary_cycle, get_salary_cycle,
    list_salary_cycles, update_salary_cycle,
};
pub use teachers::{
    find_teacher_by_email, get_teacher, level_history, list_teachers, onboard_teacher,
    soft_delete_teacher,
};
