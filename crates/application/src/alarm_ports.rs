mod delete_status;
mod repository;

pub use delete_status::DeleteStatusRepository;
pub use repository::AlarmRepository;
