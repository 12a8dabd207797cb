pub use scholaris_models::auth::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RefreshTokenRequest,
};
