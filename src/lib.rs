// src/lib.rs

pub mod antiscam;
pub mod config;
pub mod discord;
pub mod error;
pub mod logging;
pub mod shadowban;
pub mod store;
pub mod transport;

use anyhow::Result;
use std::sync::Arc;

use antiscam::AntiScam;
use config::Settings;
use shadowban::ShadowBan;

use serenity::all::GatewayIntents;

/// Globalny kontekst aplikacji: konfiguracja + gotowe serwisy.
pub struct AppContext {
    pub settings: Settings,
    pub antiscam: Arc<AntiScam>,
    pub shadowban: Arc<ShadowBan>,
}

impl AppContext {
    /// Bootstrap całej aplikacji:
    /// - logi
    /// - AntiScam (leksykon + rejestr z dysku)
    /// - ShadowBan (lista z dysku)
    pub async fn bootstrap(settings: Settings) -> Result<Arc<Self>> {
        logging::init(&settings);
        let ctx = Self::build(settings)?;
        tracing::info!(app = %ctx.settings.app.name, env = %ctx.settings.env, "bootstrap done");
        Ok(ctx)
    }

    /// Bez logów – wygodne w testach.
    pub fn build(settings: Settings) -> Result<Arc<Self>> {
        std::fs::create_dir_all(&settings.storage.data_dir)?;
        let antiscam = Arc::new(AntiScam::from_settings(&settings)?);
        let shadowban = Arc::new(ShadowBan::from_settings(&settings));
        Ok(Arc::new(Self {
            settings,
            antiscam,
            shadowban,
        }))
    }
}

/// Minimalny zestaw intents:
/// - GUILDS, GUILD_MESSAGES, MESSAGE_CONTENT (konieczne do filtrowania treści),
/// - GUILD_MEMBERS (role – potrzebne do sprawdzania adminów).
pub fn default_gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS
}

/// Start klienta Discorda (Gateway + slash commands).
pub async fn run(ctx: Arc<AppContext>) -> Result<()> {
    discord::run_bot(ctx).await
}
