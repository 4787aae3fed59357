use crate::core_auth::core_auth::PasswdEntry;
use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use log::warn;
use std::collections::HashMap;
use std::path::Path;

pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash(password, DEFAULT_COST)
}

pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match verify(password, hashed_password) {
        Ok(valid) => valid,
        Err(e) => {
            warn!("Unusable password hash: {}", e);
            false
        }
    }
}

pub fn parse_passwd(content: &str) -> HashMap<String, PasswdEntry> {
    content
        .lines()
        .filter_map(PasswdEntry::from_line)
        .map(|entry| (entry.get_username().to_string(), entry))
        .collect()
}

pub async fn load_passwd_file(path: &Path) -> Result<HashMap<String, PasswdEntry>, std::io::Error> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(parse_passwd(&content))
}
