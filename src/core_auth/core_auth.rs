/// One `username:bcrypt_hash` line of a passwd file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswdEntry {
    username: String,
    hashed_password: String,
}

impl PasswdEntry {
    pub fn from_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (username, hashed_password) = line.split_once(':')?;
        if username.is_empty() || hashed_password.is_empty() {
            return None;
        }
        Some(PasswdEntry {
            username: username.to_string(),
            hashed_password: hashed_password.to_string(),
        })
    }

    pub fn get_hashed_password(&self) -> &str {
        &self.hashed_password
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }
}
