pub mod portfolio;
pub mod skill_board;

pub use portfolio::{DashboardStats, Portfolio};
pub use skill_board::SkillBoard;
