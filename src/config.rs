use anyhow::Result;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::antiscam::lexicon::{self, Lexicon};
use crate::antiscam::sanctions::{DEFAULT_BAN_DELETE_DAYS, DEFAULT_SUSPEND_SECS};
use crate::error::GuardError;
use crate::shadowban;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub env: String,
    pub app: App,
    pub discord: Discord,
    pub logging: Logging,
    pub storage: Storage,
    pub audit: Audit,
    pub antiscam: AntiScamConfig,
    pub shadowban: ShadowBanConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct App {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Discord {
    pub token: String,
    pub intents: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logging {
    pub json: Option<bool>,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Storage {
    /// Katalog na pliki JSON (antiscam_db.json, shadowban_db.json).
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Audit {
    /// Kanał logów bezpieczeństwa; brak = logi tylko w tracing.
    pub channel_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AntiScamConfig {
    pub db_file: String,
    pub scammer_role_id: Option<u64>,
    pub suspend_seconds: u64,
    pub ban_delete_days: u8,
    pub confessions: Vec<String>,
    pub lexicon: Lexicon,
}

impl Default for AntiScamConfig {
    fn default() -> Self {
        Self {
            db_file: "antiscam_db.json".into(),
            scammer_role_id: None,
            suspend_seconds: DEFAULT_SUSPEND_SECS,
            ban_delete_days: DEFAULT_BAN_DELETE_DAYS,
            confessions: lexicon::default_confessions(),
            lexicon: Lexicon::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShadowBanConfig {
    pub db_file: String,
    pub nonsense: Vec<String>,
}

impl Default for ShadowBanConfig {
    fn default() -> Self {
        Self {
            db_file: "shadowban_db.json".into(),
            nonsense: shadowban::default_nonsense(),
        }
    }
}

impl Settings {
    /// Domyślne wartości – to samo, co ląduje w warstwie `Serialized::defaults`.
    pub fn defaults(env: &str) -> Self {
        Self {
            env: env.to_string(),
            app: App {
                name: "Tigris ScamGuard".into(),
            },
            discord: Discord {
                token: "".into(),
                intents: vec![
                    "GUILDS".into(),
                    "GUILD_MEMBERS".into(),
                    "GUILD_MESSAGES".into(),
                    "MESSAGE_CONTENT".into(),
                ],
            },
            logging: Logging {
                json: Some(false),
                level: Some("info".into()),
            },
            storage: Storage {
                data_dir: "data".into(),
            },
            audit: Audit::default(),
            antiscam: AntiScamConfig::default(),
            shadowban: ShadowBanConfig::default(),
        }
    }

    pub fn load() -> Result<Self> {
        // Które środowisko?
        let env = std::env::var("SCG_ENV").unwrap_or_else(|_| "development".to_string());

        // Załaduj .env.<env> i .env (jeśli są)
        let _ = dotenvy::from_filename(format!(".env.{}", env));
        let _ = dotenvy::dotenv();

        // Warstwy: domyślne -> plik TOML -> zmienne środowiskowe SCG_*
        let figment = Figment::from(Serialized::defaults(Self::defaults(&env)))
            .merge(Toml::file(format!("config/{}.toml", env)))
            // SCG_AUDIT__CHANNEL_ID => audit.channel_id itd.
            .merge(Env::prefixed("SCG_").split("__"));

        let mut s: Settings = figment.extract()?;
        s.env = env;
        s.apply_legacy_env();
        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> Result<(), GuardError> {
        if self.antiscam.lexicon.keyword_threshold == 0 {
            return Err(GuardError::Config(
                "antiscam.lexicon.keyword_threshold must be at least 1".into(),
            ));
        }
        if self.storage.data_dir.trim().is_empty() {
            return Err(GuardError::Config("storage.data_dir is empty".into()));
        }
        Ok(())
    }

    /// Stare nazwy zmiennych z poprzedniej wersji bota – tylko jako fallback.
    fn apply_legacy_env(&mut self) {
        if self.discord.token.is_empty() {
            if let Ok(t) = std::env::var("DISCORD_TOKEN") {
                self.discord.token = t;
            }
        }
        if self.audit.channel_id.is_none() {
            self.audit.channel_id = parse_id_var("SECURITY_LOG_CHANNEL_ID");
        }
        if self.antiscam.scammer_role_id.is_none() {
            self.antiscam.scammer_role_id = parse_id_var("SCAMMER_ROLE_ID");
        }
    }
}

fn parse_id_var(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|id| *id != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_lexicon_override_keeps_other_lists() {
        let toml = r#"
            [antiscam.lexicon]
            high_risk = ["gift card"]
            keyword_threshold = 3
        "#;
        let s: Settings = Figment::from(Serialized::defaults(Settings::defaults("test")))
            .merge(Toml::string(toml))
            .extract()
            .unwrap();
        assert_eq!(s.antiscam.lexicon.high_risk, vec!["gift card".to_string()]);
        assert_eq!(s.antiscam.lexicon.keyword_threshold, 3);
        assert_eq!(s.antiscam.lexicon.patterns, Lexicon::default().patterns);
        assert_eq!(s.antiscam.suspend_seconds, 3600);
    }

    #[test]
    fn audit_channel_from_toml() {
        let s: Settings = Figment::from(Serialized::defaults(Settings::defaults("test")))
            .merge(Toml::string("[audit]\nchannel_id = 1234"))
            .extract()
            .unwrap();
        assert_eq!(s.audit.channel_id, Some(1234));
        assert_eq!(s.storage.data_dir, "data");
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let mut s = Settings::defaults("test");
        assert!(s.validate().is_ok());
        s.antiscam.lexicon.keyword_threshold = 0;
        assert!(matches!(s.validate(), Err(GuardError::Config(_))));
    }
}
