//! Session
//!
//! A signed-in user's session: who they are, what they may do, and their
//! cart. Sessions are plain values created with [`Session::init`] and ended
//! with [`Session::teardown`]; callers pass them to whatever needs them.

use smallvec::SmallVec;
use thiserror::Error;

use rusty_money::iso::Currency;

use crate::cart::Cart;

/// Errors raised by session checks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The user lacks a required permission.
    #[error("User {user} lacks permission {permission}")]
    Forbidden {
        /// User identifier
        user: String,

        /// Missing permission
        permission: String,
    },
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    /// User identifier
    pub id: String,

    /// Email address, if known
    pub email: Option<String>,
}

impl SessionUser {
    /// Create a user with no email address.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }
}

/// Permission strings granted to a user, as computed by the store.
///
/// Kept sorted and de-duplicated so lookups are a binary search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permissions {
    permissions: SmallVec<[String; 8]>,
}

impl Permissions {
    /// Create a permission set from owned strings.
    #[must_use]
    pub fn new(permissions: impl IntoIterator<Item = String>) -> Self {
        let mut permissions: SmallVec<[String; 8]> = permissions.into_iter().collect();

        permissions.sort();
        permissions.dedup();

        Self { permissions }
    }

    /// Create a permission set from string slices.
    pub fn from_strs(permissions: &[&str]) -> Self {
        Self::new(permissions.iter().map(ToString::to_string))
    }

    /// Whether `permission` is granted.
    pub fn contains(&self, permission: &str) -> bool {
        self.permissions
            .binary_search_by(|granted| granted.as_str().cmp(permission))
            .is_ok()
    }

    /// Iterate over granted permissions in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(String::as_str)
    }

    /// Number of granted permissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Whether nothing is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

/// A user's session.
#[derive(Debug)]
pub struct Session {
    user: SessionUser,
    permissions: Permissions,
    cart: Cart,
}

impl Session {
    /// Start a session with an empty cart priced in `currency`.
    pub fn init(user: SessionUser, permissions: Permissions, currency: &'static Currency) -> Self {
        Self::with_cart(user, permissions, Cart::new(currency))
    }

    /// Start a session with a cart restored from the store.
    pub fn with_cart(user: SessionUser, permissions: Permissions, cart: Cart) -> Self {
        tracing::info!(
            user = %user.id,
            permissions = permissions.len(),
            lines = cart.len(),
            "session started"
        );

        Self {
            user,
            permissions,
            cart,
        }
    }

    /// The signed-in user.
    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    /// The user's permissions.
    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    /// Whether the user holds `permission`.
    pub fn is_permitted(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Require that the user holds `permission`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Forbidden`] if the permission is not granted.
    pub fn require(&self, permission: &str) -> Result<(), SessionError> {
        if self.is_permitted(permission) {
            return Ok(());
        }

        tracing::debug!(user = %self.user.id, permission, "permission denied");

        Err(SessionError::Forbidden {
            user: self.user.id.clone(),
            permission: permission.to_string(),
        })
    }

    /// The user's cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The user's cart, mutably.
    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// End the session, handing back the cart for the caller to persist.
    pub fn teardown(self) -> Cart {
        tracing::info!(user = %self.user.id, lines = self.cart.len(), "session ended");

        self.cart
    }
}
