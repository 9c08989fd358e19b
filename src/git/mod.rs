pub mod commit;
pub mod gateway;
pub mod patch_id;
pub mod repository;
pub use gateway::VersionControl;
pub use repository::{Repository, find_repository, find_repository_in_path};
#[cfg(test)]
pub mod test_utils;
