//! Port for reading student records.

use async_trait::async_trait;

use crate::domain::{Student, StudentId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by student repository adapters.
    pub enum StudentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "student repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "student repository query failed: {message}",
    }
}

/// Read-only access to students.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Find a student by id.
    async fn find_by_id(&self, id: &StudentId) -> Result<Option<Student>, StudentRepositoryError>;
}
