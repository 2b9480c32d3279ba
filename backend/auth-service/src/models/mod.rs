/// Data models for authentication
pub mod response;
pub mod user;

pub use response::ApiResponse;
pub use user::{
    ChangePasswordRequest, LoginRequest, NewUser, PublicUser, RefreshTokenRequest,
    RegisterRequest, User,
};
