use super::auth_secret;
use crate::auth::AuthConfig;
use crate::error::Result;
use crate::settings::load_settings;

/// Print a bearer token for `user_id` signed with the configured secret.
pub fn run(user_id: &str, hours: u64) -> Result<()> {
    let settings = load_settings();
    let auth = AuthConfig::from_secret(&auth_secret(&settings)?);
    let token = auth.issue(user_id, hours.saturating_mul(3600))?;
    println!("{token}");
    Ok(())
}
