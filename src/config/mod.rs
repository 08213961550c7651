use std::collections::HashSet;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use teloxide::types::UserId;
use url::Url;

pub const DEFAULT_AUTH_CODE: &str = "1234";
pub const DEFAULT_WEB_APP_URL: &str = "https://fragment-authentication.vercel.app/";
pub const DEFAULT_WEBHOOK_PORT: u16 = 8443;
pub const DEFAULT_CACHE_TIME: u32 = 1;

/// Errors that stop the bot from starting.
#[derive(Debug)]
pub enum ConfigError {
    /// Neither `BOT_TOKEN` nor `TELOXIDE_TOKEN` is set.
    MissingToken,
    InvalidUrl {
        var: &'static str,
        value: String,
        source: url::ParseError,
    },
    InvalidNumber {
        var: &'static str,
        value: String,
        source: ParseIntError,
    },
    UnknownButtonKind(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingToken => write!(f, "BOT_TOKEN should be set in the environment or .env.local"),
            Self::InvalidUrl { var, value, source } => {
                write!(f, "{var} is not a valid url '{value}': {source}")
            }
            Self::InvalidNumber { var, value, source } => {
                write!(f, "{var} is not a valid number '{value}': {source}")
            }
            Self::UnknownButtonKind(kind) => {
                write!(f, "unknown BUTTON_KIND '{kind}', expected url, web_app or callback")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidUrl { source, .. } => Some(source),
            Self::InvalidNumber { source, .. } => Some(source),
            Self::MissingToken | Self::UnknownButtonKind(_) => None,
        }
    }
}

/// What the button under a successful answer does when pressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ButtonKind {
    #[default]
    Url,
    WebApp,
    Callback,
}

impl ButtonKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ButtonKind::Url => "url",
            ButtonKind::WebApp => "web_app",
            ButtonKind::Callback => "callback",
        }
    }
}

impl FromStr for ButtonKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "url" => Ok(ButtonKind::Url),
            "web_app" | "webapp" => Ok(ButtonKind::WebApp),
            "callback" => Ok(ButtonKind::Callback),
            _ => Err(ConfigError::UnknownButtonKind(s.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub base_url: Url,
    pub port: u16,
}

impl WebhookConfig {
    /// Public url the platform posts updates to.
    pub fn endpoint(&self) -> Result<Url, url::ParseError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/webhook").parse()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    pub owners: HashSet<UserId>,
    pub auth_code: String,
    pub web_app_url: Url,
    pub button: ButtonKind,
    pub cache_time: u32,
    /// Echo the auth code back in wrong-code answers. Leaks the secret, off unless asked for.
    pub reveal_auth_code: bool,
    /// Webhook mode when set, long polling otherwise.
    pub webhook: Option<WebhookConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bot_token = var("BOT_TOKEN")
            .or_else(|| var("TELOXIDE_TOKEN"))
            .ok_or(ConfigError::MissingToken)?;

        let owners = match var("OWNER_IDS") {
            Some(raw) => parse_owner_ids(&raw).unwrap_or_else(|err| {
                log::warn!("OWNER_IDS '{raw}' is malformed ({err}), continuing without owners");
                HashSet::new()
            }),
            None => HashSet::new(),
        };

        let auth_code = lookup("AUTH_CODE").unwrap_or_else(|| DEFAULT_AUTH_CODE.to_string());
        if auth_code.is_empty() {
            log::warn!("AUTH_CODE is empty, no inline query can pass the code check");
        }

        let web_app_url = parse_url(
            "WEB_APP_URL",
            var("WEB_APP_URL").unwrap_or_else(|| DEFAULT_WEB_APP_URL.to_string()),
        )?;

        let button = match var("BUTTON_KIND") {
            Some(kind) => kind.parse()?,
            None => ButtonKind::default(),
        };

        let cache_time = match var("CACHE_TIME") {
            Some(raw) => parse_number("CACHE_TIME", raw)?,
            None => DEFAULT_CACHE_TIME,
        };

        let reveal_auth_code = var("REVEAL_AUTH_CODE")
            .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let webhook = match var("WEBHOOK_URL") {
            Some(raw) => {
                let port = match var("PORT") {
                    Some(port) => parse_number("PORT", port)?,
                    None => DEFAULT_WEBHOOK_PORT,
                };
                Some(WebhookConfig {
                    base_url: parse_url("WEBHOOK_URL", raw)?,
                    port,
                })
            }
            None => None,
        };

        Ok(Config {
            bot_token,
            owners,
            auth_code,
            web_app_url,
            button,
            cache_time,
            reveal_auth_code,
            webhook,
        })
    }

    pub fn is_owner(&self, user: UserId) -> bool {
        self.owners.contains(&user)
    }

    /// Human readable settings for owners. Never includes the token or the auth code.
    pub fn summary(&self) -> String {
        let mode = match &self.webhook {
            Some(hook) => format!("webhook {} (port {})", hook.base_url, hook.port),
            None => "long polling".to_string(),
        };
        format!(
            "Mode: {mode}\nButton: {}\nTarget: {}\nCache time: {}s\nOwners: {}\nReveal code on mismatch: {}",
            self.button.as_str(),
            self.web_app_url,
            self.cache_time,
            self.owners.len(),
            if self.reveal_auth_code { "yes" } else { "no" },
        )
    }
}

fn parse_owner_ids(raw: &str) -> Result<HashSet<UserId>, ParseIntError> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| id.parse::<u64>().map(UserId))
        .collect()
}

fn parse_url(var: &'static str, value: String) -> Result<Url, ConfigError> {
    let parsed = Url::parse(value.trim());
    parsed.map_err(|source| ConfigError::InvalidUrl { var, value, source })
}

fn parse_number<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr<Err = ParseIntError>,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|source| ConfigError::InvalidNumber { var, value, source })
}

#[cfg(test)]
pub(crate) fn test_config(pairs: &[(&str, &str)]) -> Config {
    let vars: std::collections::HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .chain(std::iter::once(("BOT_TOKEN".to_string(), "123:abc".to_string())))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}
