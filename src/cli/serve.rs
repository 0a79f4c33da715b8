use std::net::{SocketAddr, ToSocketAddrs};

use super::auth_secret;
use crate::api::{self, AppState};
use crate::auth::AuthConfig;
use crate::db::create_pool;
use crate::error::{Result, TallyError};
use crate::settings::load_settings;

pub fn run(host: Option<String>, port: Option<u16>) -> Result<()> {
    let settings = load_settings();
    let secret = auth_secret(&settings)?;
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr: SocketAddr = (host.as_str(), port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| TallyError::Settings(format!("cannot resolve listen address {host}:{port}")))?;

    std::fs::create_dir_all(&settings.data_dir)?;
    let pool = create_pool(&settings.db_path(), settings.server.pool_size)?;
    let state = AppState::new(pool, AuthConfig::from_secret(&secret));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    println!("Serving Tally API on http://{addr} (Ctrl-C to stop)");
    runtime.block_on(api::serve(state, addr))
}
