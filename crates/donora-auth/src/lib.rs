pub mod error;
pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod profile;
pub mod resolver;
pub mod roles;
pub mod session;
pub mod store;
pub mod types;
pub mod validator;

pub use error::AuthError;
pub use gate::{ControlState, Gate, GateDecision, gate};
pub use jwt::{AuthClaims, create_jwt, verify_jwt};
pub use middleware::{AuthUser, require};
pub use password::{hash_password, verify_password};
pub use permissions::{Action, Module, PermissionKey, UnknownPermission, catalog};
pub use profile::{Profile, ProfileSource, StoreProfileSource};
pub use resolver::{DenyReason, Resolution, resolve, resolve_named};
pub use roles::{PROTECTED_ROLES, RoleLevel, is_protected, role_level};
pub use session::{SessionHandle, SessionSnapshot, SessionState};
pub use store::{AuthStore, SqliteAuthStore};
pub use types::*;
pub use validator::{RoleOperation, Validation, validate_role_operation};
