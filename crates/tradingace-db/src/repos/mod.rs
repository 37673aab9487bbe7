//! Repository implementations

mod campaign;
mod task;
mod user_task;

pub use campaign::CampaignRepo;
pub use task::TaskRepo;
pub use user_task::UserTaskRepo;
