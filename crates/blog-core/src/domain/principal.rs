use super::{Role, User};

/// The authenticated caller for the duration of one request.
///
/// Always built from the live user record, never from token claims alone,
/// so a role change takes effect on the next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: i32,
    pub role: Role,
    pub email: String,
    pub name: String,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            email: user.email,
            name: user.name,
        }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}
