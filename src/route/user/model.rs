pub use crate::route::{
	auth::model::{Role, User},
	model::IdInput,
};

use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate, JsonSchema)]
pub struct UpdateRoleInput {
	pub role: Role,
}

/// Whether `actor` may move `target` from its current role to `role`.
///
/// Admins manage users and moderators. Only superadmins may grant or revoke
/// admin rights, and nobody changes their own role.
pub fn can_assign(actor: &User, target: &User, role: Role) -> bool {
	if actor.id == target.id || !actor.role.is_admin() {
		return false;
	}

	if actor.role == Role::Superadmin {
		return true;
	}

	target.role < Role::Admin && role < Role::Admin
}
