pub mod auth;
pub mod course;
pub mod chat;

pub use auth::{
    AuthInstitution, AuthTokens, AuthUser, ChangePasswordRequest, LoginRequest, LoginResponse,
    ProfileUpdate, RegisterRequest, RegisterResponse, StoredSession, UserRole,
};
pub use course::{
    CourseDto, CourseEnrollment, CourseEnrollmentsResponse, CourseFileDto,
    CourseFileUploadResponse, CourseFilesResponse, CourseRole, CourseUpdatePayload,
};
pub use chat::{ChatRole, CourseChatMessage, CourseChatRequest, CourseChatResponse};
