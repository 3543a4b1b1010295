pub mod session_store;
pub mod course_store;

pub use session_store::SessionStore;
pub use course_store::CourseStore;
