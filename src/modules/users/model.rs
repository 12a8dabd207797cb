pub use scholaris_models::users::{CreateUserDto, UpdateUserStatusDto, User, UserFilterParams, UserRole};
