mod identity;
mod middleware;
mod resolver;

pub use identity::{HeaderIdentityProvider, IdentityHeaders, IdentityProvider, Profile};
pub use middleware::{AuthError, MaybeUser, RequireUser, identity_scope};
pub use resolver::{
    IdentityContext, RequestIdentity, resolve_current_user_or_none, resolve_or_create_current_user,
};
