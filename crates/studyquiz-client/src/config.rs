//! Configuration loading and client factories.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use studyquiz_core::error::QuizError;
use studyquiz_core::session::UserContext;
use studyquiz_core::traits::{ProfileStore, QuizService, DEFAULT_QUIZ_PROMPT};

use crate::file_store::JsonFileStore;
use crate::firestore::FirestoreStore;
use crate::http::{HttpQuizService, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Where user profiles are kept.
///
/// Note: Custom Debug impl masks the API key.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Firestore {
        project_id: String,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        base_url: Option<String>,
    },
    File {
        #[serde(default = "default_store_dir")]
        dir: PathBuf,
    },
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreConfig::Firestore {
                project_id,
                api_key: _,
                base_url,
            } => f
                .debug_struct("Firestore")
                .field("project_id", project_id)
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            StoreConfig::File { dir } => f.debug_struct("File").field("dir", dir).finish(),
        }
    }
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("./studyquiz-profiles")
}

/// Generation service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// The signed-in user.
///
/// Note: Custom Debug impl masks the ID token.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub id_token: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl std::fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserConfig")
            .field("uid", &self.uid)
            .field("id_token", &"***")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Top-level studyquiz configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyquizConfig {
    /// Prompt sent with every generation call.
    #[serde(default = "default_prompt")]
    pub default_prompt: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub user: Option<UserConfig>,
    /// Profile store; counters are skipped when absent.
    #[serde(default)]
    pub store: Option<StoreConfig>,
}

fn default_prompt() -> String {
    DEFAULT_QUIZ_PROMPT.to_string()
}

impl Default for StudyquizConfig {
    fn default() -> Self {
        Self {
            default_prompt: default_prompt(),
            api: ApiConfig::default(),
            user: None,
            store: None,
        }
    }
}

impl StudyquizConfig {
    /// The signed-in user, or an error when no ID token is configured.
    pub fn user_context(&self) -> Result<UserContext> {
        let user = self
            .user
            .as_ref()
            .filter(|u| !u.uid.is_empty() && !u.id_token.is_empty())
            .ok_or(QuizError::NotSignedIn)?;

        Ok(UserContext {
            uid: user.uid.clone(),
            id_token: user.id_token.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            photo_url: user.photo_url.clone(),
        })
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

fn resolve_opt(value: &Option<String>) -> Option<String> {
    value.as_deref().map(resolve_env_vars)
}

fn resolve_all(config: &mut StudyquizConfig) {
    config.api.base_url = resolve_env_vars(&config.api.base_url);

    if let Some(user) = config.user.as_mut() {
        user.uid = resolve_env_vars(&user.uid);
        user.id_token = resolve_env_vars(&user.id_token);
        user.email = resolve_opt(&user.email);
        user.display_name = resolve_opt(&user.display_name);
        user.photo_url = resolve_opt(&user.photo_url);
    }

    if let Some(StoreConfig::Firestore {
        project_id,
        api_key,
        base_url,
    }) = config.store.as_mut()
    {
        *project_id = resolve_env_vars(project_id);
        *api_key = resolve_opt(api_key);
        *base_url = resolve_opt(base_url);
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `studyquiz.toml` in the current directory
/// 2. `~/.config/studyquiz/config.toml`
///
/// Environment variable overrides: `STUDYQUIZ_API_URL`, `STUDYQUIZ_UID`,
/// `STUDYQUIZ_ID_TOKEN`.
pub fn load_config() -> Result<StudyquizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<StudyquizConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("studyquiz.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<StudyquizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => StudyquizConfig::default(),
    };

    // Apply env var overrides
    if let Ok(url) = std::env::var("STUDYQUIZ_API_URL") {
        config.api.base_url = url;
    }
    if let Ok(uid) = std::env::var("STUDYQUIZ_UID") {
        config.user.get_or_insert_with(UserConfig::default).uid = uid;
    }
    if let Ok(token) = std::env::var("STUDYQUIZ_ID_TOKEN") {
        config.user.get_or_insert_with(UserConfig::default).id_token = token;
    }

    resolve_all(&mut config);
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("studyquiz"))
}

/// Create the generation service client for a signed-in user.
pub fn create_service(config: &StudyquizConfig, user: &UserContext) -> Box<dyn QuizService> {
    Box::new(HttpQuizService::new(
        &config.api.base_url,
        &user.id_token,
        config.api.timeout_secs,
    ))
}

/// Create the configured profile store, if any.
pub fn create_store(
    config: &StudyquizConfig,
    user: Option<&UserContext>,
) -> Option<Box<dyn ProfileStore>> {
    let store: Box<dyn ProfileStore> = match config.store.as_ref()? {
        StoreConfig::Firestore {
            project_id,
            api_key,
            base_url,
        } => Box::new(FirestoreStore::new(
            project_id,
            base_url.clone(),
            api_key.clone(),
            user.map(|u| u.id_token.clone()),
        )),
        StoreConfig::File { dir } => Box::new(JsonFileStore::new(dir.clone())),
    };
    Some(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_STUDYQUIZ_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_STUDYQUIZ_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_STUDYQUIZ_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("unterminated ${OOPS"), "unterminated ${OOPS");
        std::env::remove_var("_STUDYQUIZ_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = StudyquizConfig::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api.timeout_secs, 120);
        assert_eq!(config.default_prompt, DEFAULT_QUIZ_PROMPT);
        assert!(config.store.is_none());
        assert!(config.user_context().is_err());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
default_prompt = "Ten questions please."

[api]
base_url = "https://quiz.example.com"

[user]
uid = "uid-1"
id_token = "tok"
display_name = "Ada"

[store]
type = "firestore"
project_id = "demo"
api_key = "key"
"#;
        let config: StudyquizConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_prompt, "Ten questions please.");
        assert_eq!(config.api.timeout_secs, 120);
        assert!(matches!(
            config.store,
            Some(StoreConfig::Firestore { ref project_id, .. }) if project_id == "demo"
        ));

        let user = config.user_context().unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Ada"));
        assert!(create_store(&config, Some(&user)).is_some());
    }

    #[test]
    fn file_store_default_dir() {
        let config: StudyquizConfig = toml::from_str("[store]\ntype = \"file\"\n").unwrap();
        match config.store {
            Some(StoreConfig::File { dir }) => assert_eq!(dir, default_store_dir()),
            other => panic!("unexpected store: {other:?}"),
        }
    }

    #[test]
    fn debug_masks_secrets() {
        let store = StoreConfig::Firestore {
            project_id: "demo".into(),
            api_key: Some("super-secret".into()),
            base_url: None,
        };
        assert!(!format!("{store:?}").contains("super-secret"));

        let user = UserConfig {
            uid: "u".into(),
            id_token: "secret-token".into(),
            ..Default::default()
        };
        assert!(!format!("{user:?}").contains("secret-token"));
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studyquiz.toml");
        std::fs::write(
            &path,
            "[user]\nuid = \"uid-7\"\nid_token = \"${_STUDYQUIZ_TOKEN_FOR_TEST}\"\n",
        )
        .unwrap();
        std::env::set_var("_STUDYQUIZ_TOKEN_FOR_TEST", "from-env");

        let config = load_config_from(Some(&path)).unwrap();
        let user = config.user_context().unwrap();
        assert_eq!(user.uid, "uid-7");
        assert_eq!(user.id_token, "from-env");
        std::env::remove_var("_STUDYQUIZ_TOKEN_FOR_TEST");
    }

    #[test]
    fn missing_explicit_path_fails() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
