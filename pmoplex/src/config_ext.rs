//! Configuration du client Plex
//!
//! La configuration est chargée comme dans pmoconfig :
//! 1. configuration par défaut intégrée (`pmoplex.yaml`)
//! 2. fusion avec `config.yaml` du répertoire de configuration s'il existe
//! 3. surcharges par variables d'environnement `PMOPLEX_CONFIG__SECTION__CLE`
//!
//! ```yaml
//! server:
//!   url: http://192.168.1.10:32400
//!   token: xxxxxxxxxxxx
//!   timeout_secs: 30
//! ```

use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Result, anyhow};
use dirs::home_dir;
use serde_yaml::{Mapping, Value};
use tracing::{info, warn};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmoplex.yaml");

const ENV_CONFIG_DIR: &str = "PMOPLEX_CONFIG";
const ENV_PREFIX: &str = "PMOPLEX_CONFIG__";

const DEFAULT_SERVER_URL: &str = "http://localhost:32400";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration du client Plex
#[derive(Debug)]
pub struct PlexConfig {
    path: Option<PathBuf>,
    data: Mutex<Value>,
}

impl PlexConfig {
    /// Cherche le répertoire de configuration :
    /// 1. le paramètre `directory` s'il n'est pas vide
    /// 2. la variable d'environnement `PMOPLEX_CONFIG`
    /// 3. `.pmoplex` dans le répertoire courant
    /// 4. `.pmoplex` dans le répertoire de l'utilisateur
    fn find_config_dir(directory: &str) -> Option<PathBuf> {
        if !directory.is_empty() {
            return Some(PathBuf::from(directory));
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return Some(PathBuf::from(env_path));
        }

        let local = Path::new(".pmoplex");
        if local.exists() {
            return Some(local.to_path_buf());
        }

        home_dir()
            .map(|home| home.join(".pmoplex"))
            .filter(|p| p.exists())
    }

    /// Charge la configuration depuis `directory` (vide pour la recherche par défaut)
    pub fn load_config(directory: &str) -> Result<Self> {
        let dir = Self::find_config_dir(directory);
        Self::load_dir(dir, env::vars())
    }

    /// Charge `config.yaml` depuis `dir` avec les surcharges `vars` données
    /// au lieu de l'environnement du processus
    pub fn load_from(
        dir: &Path,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self> {
        Self::load_dir(Some(dir.to_path_buf()), vars)
    }

    fn load_dir(
        dir: Option<PathBuf>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self> {
        let mut config_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        let path = dir.map(|dir| dir.join("config.yaml"));
        match &path {
            Some(file) if file.exists() => {
                let data = fs::read(file)?;
                let external: Value = serde_yaml::from_slice(&data)?;
                merge_yaml(&mut config_value, &external);
                info!(config_file = %file.display(), "Loaded config file");
            }
            _ => info!("Config file not found, using default embedded config"),
        }

        let mut config_value = lower_keys_value(config_value);
        apply_overrides(&mut config_value, vars);

        Ok(Self {
            path,
            data: Mutex::new(config_value),
        })
    }

    /// Configuration construite depuis un texte YAML (sans fichier associé)
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        let external: Value = serde_yaml::from_str(yaml)?;
        merge_yaml(&mut config_value, &external);
        Ok(Self {
            path: None,
            data: Mutex::new(lower_keys_value(config_value)),
        })
    }

    /// Chemin du fichier `config.yaml` utilisé, s'il y en a un
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Sauvegarde la configuration dans son fichier
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| anyhow!("No config file associated with this configuration"))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = self.lock()?;
        fs::write(path, serde_yaml::to_string(&*data)?)?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Value>> {
        self.data
            .lock()
            .map_err(|_| anyhow!("Config mutex poisoned"))
    }

    /// Valeur à un chemin de clés (ex: `&["server", "url"]`)
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock()?;
        let mut current = &*data;
        for (i, key) in path.iter().enumerate() {
            current = current
                .as_mapping()
                .and_then(|map| map.get(Value::String(key.to_lowercase())))
                .ok_or_else(|| anyhow!("Path {} does not exist", path[..=i].join(".")))?;
        }
        Ok(current.clone())
    }

    /// Modifie une valeur en mémoire (voir [`PlexConfig::save`])
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.lock()?;
        set_value_internal(&mut data, path, value)
    }

    pub fn get_server_url(&self) -> Result<String> {
        match self.get_value(&["server", "url"]) {
            Ok(Value::String(url)) => Ok(url),
            _ => Ok(DEFAULT_SERVER_URL.to_string()),
        }
    }

    pub fn set_server_url(&self, url: &str) -> Result<()> {
        self.set_value(&["server", "url"], Value::String(url.to_string()))
    }

    /// Token d'authentification Plex (`X-Plex-Token`), None si non configuré
    pub fn get_server_token(&self) -> Result<Option<String>> {
        match self.get_value(&["server", "token"]) {
            Ok(Value::String(token)) if !token.is_empty() => Ok(Some(token)),
            _ => Ok(None),
        }
    }

    pub fn set_server_token(&self, token: &str) -> Result<()> {
        self.set_value(&["server", "token"], Value::String(token.to_string()))
    }

    /// Délai maximal d'une requête ; 0 ou une valeur invalide donne le défaut
    pub fn get_timeout_secs(&self) -> Result<u64> {
        match self.get_value(&["server", "timeout_secs"]) {
            Ok(Value::Number(n)) => match n.as_u64() {
                Some(secs) if secs > 0 => Ok(secs),
                _ => {
                    warn!(value = %n, "Invalid server.timeout_secs, using default");
                    Ok(DEFAULT_TIMEOUT_SECS)
                }
            },
            _ => Ok(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    let Some((first, rest)) = path.split_first() else {
        *data = value;
        return Ok(());
    };

    let Value::Mapping(map) = data else {
        return Err(anyhow!("Current node is not a map"));
    };

    let key = Value::String(first.to_lowercase());
    if rest.is_empty() {
        map.insert(key, value);
        Ok(())
    } else {
        let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
        set_value_internal(entry, rest, value)
    }
}

/// Applique les variables `PMOPLEX_CONFIG__SECTION__CLE=valeur`
fn apply_overrides(config: &mut Value, vars: impl IntoIterator<Item = (String, String)>) {
    for (key, value) in vars {
        if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
            let key_path = stripped.split("__").collect::<Vec<_>>();
            let yaml_value = serde_yaml::from_str::<Value>(&value)
                .unwrap_or_else(|_| Value::String(value.clone()));
            let _ = set_value_internal(config, &key_path, yaml_value);
        }
    }
}

/// Passe en minuscules toutes les clés (les chemins sont cherchés en minuscules)
fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| {
                    let k = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    (k, lower_keys_value(v))
                })
                .collect(),
        ),
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        other => other,
    }
}

fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        // scalaires et séquences : on remplace
        (d, e) => *d = e.clone(),
    }
}
