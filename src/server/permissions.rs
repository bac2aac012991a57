
//! Ownership rules for games.
//!
//! Anyone may read a game. Creating one needs an authenticated
//! caller, and only the owner may modify or delete it.

use super::auth::AuthenticatedUser;
use super::error::ApiError;
use crate::store::GameRecord;

use rocket::http::Method;

/// Trait for objects which have a user that owns them.
pub trait UserOwned {
  fn owner_id(&self) -> i32;

  /// Whether `caller` may apply `method` to this object. Safe
  /// methods are open to everyone.
  fn has_object_permission(&self, method: Method, caller: Option<&AuthenticatedUser>) -> bool {
    is_safe_method(method) || caller.is_some_and(|user| user.id == self.owner_id())
  }

  /// Checks a looked-up object before `requesting_user` applies
  /// `method` to it: a missing object is a 404, a refusal a 403.
  fn check_permission(object: Option<Self>, method: Method, requesting_user: &AuthenticatedUser) -> Result<Self, ApiError>
  where Self: Sized {
    let object = object.ok_or_else(ApiError::not_found)?;
    if object.has_object_permission(method, Some(requesting_user)) {
      Ok(object)
    } else {
      Err(ApiError::forbidden())
    }
  }
}

/// Extension trait for `Option<T>` where `T` implements [`UserOwned`].
pub trait UserOwnedExt: Sized {
  type Target: UserOwned;

  fn check_permission(self, method: Method, requesting_user: &AuthenticatedUser) -> Result<Self::Target, ApiError>;
}

impl UserOwned for GameRecord {
  fn owner_id(&self) -> i32 {
    self.game.owner_id
  }
}

impl<T: UserOwned + Sized> UserOwnedExt for Option<T> {
  type Target = T;

  fn check_permission(self, method: Method, requesting_user: &AuthenticatedUser) -> Result<T, ApiError> {
    T::check_permission(self, method, requesting_user)
  }
}

pub fn is_safe_method(method: Method) -> bool {
  matches!(method, Method::Get | Method::Head | Method::Options)
}
