use std::path::PathBuf;

use rand::RngCore;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        std::fs::create_dir_all(shellexpand_path(&dir))?;
        settings.data_dir = shellexpand_path(&dir);
    }
    let data_path = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&data_path)?;

    let conn = get_connection(&settings.db_path())?;
    init_db(&conn)?;

    // Local tokens need something to sign with until a provider secret is set.
    if settings.auth_secret.is_none() {
        settings.auth_secret = Some(generate_secret());
    }
    save_settings(&settings)?;

    tracing::info!(data_dir = %data_path.display(), "initialized");
    println!("Initialized Tally in {}", data_path.display());
    println!("Database: {}", settings.db_path().display());
    Ok(())
}
