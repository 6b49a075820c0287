use serde::{Deserialize, Serialize};

/// A registered account.
///
/// Passwords are stored in plaintext: persistence is local to one machine
/// and the account model is not a security boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl User {
    /// First letter of the display name, used as the avatar glyph.
    pub fn avatar_initial(&self) -> Option<char> {
        self.name.chars().next().map(|c| c.to_ascii_uppercase())
    }
}
