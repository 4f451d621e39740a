use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

use super::ai_service::{ApiKey, API_KEY_SETTING};

#[cfg(feature = "http-server")]
pub use preferences::NOTIFICATIONS_SETTING;

/// Key-value settings backed by a flat JSON object on disk.
///
/// Reads are served from memory; every mutation rewrites the file
/// (temp file + rename).
pub struct SettingsStore {
    path: PathBuf,
    values: RwLock<Map<String, Value>>,
}

impl SettingsStore {
    /// Load settings from `path`. A missing file is an empty store.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let values = if fs::try_exists(&path).await.unwrap_or(false) {
            let raw = fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
            let values: Map<String, Value> = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse settings JSON at: {}", path.display()))?;
            log::info!("⚙️ Loaded {} settings from {}", values.len(), path.display());
            values
        } else {
            log::debug!("Settings file {} does not exist, starting empty", path.display());
            Map::new()
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get_string(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .await
            .get(key)
            .and_then(|v| v.as_str())
            .map(String::from)
    }

    pub async fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let mut values = self.values.write().await;
        values.insert(key.to_string(), value.into());
        self.persist(&values).await
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write().await;
        if values.remove(key).is_some() {
            self.persist(&values).await?;
        }
        Ok(())
    }

    pub async fn api_key(&self) -> Option<ApiKey> {
        self.get_string(API_KEY_SETTING).await.and_then(ApiKey::new)
    }

    /// Store the credential. A blank value clears it.
    pub async fn set_api_key(&self, raw: &str) -> Result<()> {
        match ApiKey::new(raw) {
            Some(key) => self.set(API_KEY_SETTING, key.expose()).await,
            None => self.remove(API_KEY_SETTING).await,
        }
    }

    async fn persist(&self, values: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create settings directory: {}", parent.display())
                })?;
            }
        }

        let json = serde_json::to_string_pretty(values).context("Failed to serialize settings")?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).await.with_context(|| {
            format!("Failed to write temp settings file: {}", tmp_path.display())
        })?;
        fs::rename(&tmp_path, &self.path).await.with_context(|| {
            format!("Failed to move settings file into place: {}", self.path.display())
        })?;

        log::debug!("💾 Saved {} settings to {}", values.len(), self.path.display());
        Ok(())
    }
}


/// Notification flag, dietary preferences and clear-all, used by the settings routes.
#[cfg(feature = "http-server")]
mod preferences {
    use super::*;
    use crate::models::DietaryPreferences;

    pub const NOTIFICATIONS_SETTING: &str = "notifications_enabled";

    const PREF_VEGETARIAN: &str = "pref_vegetarian";
    const PREF_VEGAN: &str = "pref_vegan";
    const PREF_GLUTEN_FREE: &str = "pref_gluten_free";
    const PREF_DAIRY_FREE: &str = "pref_dairy_free";
    const PREF_KETO: &str = "pref_keto";
    const PREF_LOW_CARB: &str = "pref_low_carb";
    const PREF_ALLERGIES: &str = "pref_allergies";
    const PREF_CURRENCY: &str = "pref_currency";
    const PREF_DEFAULT_STORE: &str = "pref_default_store";
    const PREF_RECIPE_NOTIFICATIONS: &str = "pref_recipe_notifications";
    const PREF_NUTRITION_REMINDERS: &str = "pref_nutrition_reminders";
    const PREF_DEAL_NOTIFICATIONS: &str = "pref_deal_notifications";

    const PREFERENCE_KEYS: &[&str] = &[
        PREF_VEGETARIAN,
        PREF_VEGAN,
        PREF_GLUTEN_FREE,
        PREF_DAIRY_FREE,
        PREF_KETO,
        PREF_LOW_CARB,
        PREF_ALLERGIES,
        PREF_CURRENCY,
        PREF_DEFAULT_STORE,
        PREF_RECIPE_NOTIFICATIONS,
        PREF_NUTRITION_REMINDERS,
        PREF_DEAL_NOTIFICATIONS,
    ];

    impl SettingsStore {
        /// Missing or non-boolean values read as `false`.
        pub async fn get_bool(&self, key: &str) -> bool {
            self.values
                .read()
                .await
                .get(key)
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
        }

        pub async fn notifications_enabled(&self) -> bool {
            self.get_bool(NOTIFICATIONS_SETTING).await
        }

        pub async fn dietary_preferences(&self) -> DietaryPreferences {
            let values = self.values.read().await;
            let flag = |key: &str, default: bool| {
                values
                    .get(key)
                    .and_then(|v| v.as_bool())
                    .unwrap_or(default)
            };
            let text = |key: &str, default: &str| {
                values
                    .get(key)
                    .and_then(|v| v.as_str())
                    .unwrap_or(default)
                    .to_string()
            };

            let defaults = DietaryPreferences::default();
            DietaryPreferences {
                vegetarian: flag(PREF_VEGETARIAN, defaults.vegetarian),
                vegan: flag(PREF_VEGAN, defaults.vegan),
                gluten_free: flag(PREF_GLUTEN_FREE, defaults.gluten_free),
                dairy_free: flag(PREF_DAIRY_FREE, defaults.dairy_free),
                keto: flag(PREF_KETO, defaults.keto),
                low_carb: flag(PREF_LOW_CARB, defaults.low_carb),
                allergies: text(PREF_ALLERGIES, &defaults.allergies),
                currency: text(PREF_CURRENCY, &defaults.currency),
                default_store: text(PREF_DEFAULT_STORE, &defaults.default_store),
                recipe_notifications: flag(
                    PREF_RECIPE_NOTIFICATIONS,
                    defaults.recipe_notifications,
                ),
                nutrition_reminders: flag(
                    PREF_NUTRITION_REMINDERS,
                    defaults.nutrition_reminders,
                ),
                deal_notifications: flag(PREF_DEAL_NOTIFICATIONS, defaults.deal_notifications),
            }
        }

        pub async fn save_dietary_preferences(&self, prefs: &DietaryPreferences) -> Result<()> {
            let mut values = self.values.write().await;
            let entries: [(&str, Value); 12] = [
                (PREF_VEGETARIAN, prefs.vegetarian.into()),
                (PREF_VEGAN, prefs.vegan.into()),
                (PREF_GLUTEN_FREE, prefs.gluten_free.into()),
                (PREF_DAIRY_FREE, prefs.dairy_free.into()),
                (PREF_KETO, prefs.keto.into()),
                (PREF_LOW_CARB, prefs.low_carb.into()),
                (PREF_ALLERGIES, prefs.allergies.clone().into()),
                (PREF_CURRENCY, prefs.currency.clone().into()),
                (PREF_DEFAULT_STORE, prefs.default_store.clone().into()),
                (PREF_RECIPE_NOTIFICATIONS, prefs.recipe_notifications.into()),
                (PREF_NUTRITION_REMINDERS, prefs.nutrition_reminders.into()),
                (PREF_DEAL_NOTIFICATIONS, prefs.deal_notifications.into()),
            ];
            for (key, value) in entries {
                values.insert(key.to_string(), value);
            }
            self.persist(&values).await
        }

        /// Remove the credential, the notification flag and every dietary preference.
        /// Keys this app does not own are left alone.
        pub async fn clear_all_data(&self) -> Result<()> {
            let mut values = self.values.write().await;
            values.remove(API_KEY_SETTING);
            values.remove(NOTIFICATIONS_SETTING);
            for key in PREFERENCE_KEYS {
                values.remove(*key);
            }
            log::info!("🗑️ Cleared app settings");
            self.persist(&values).await
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_empty_store_uses_defaults() {
            let dir = tempfile::tempdir().unwrap();
            let store = SettingsStore::load(dir.path().join("settings.json")).await.unwrap();

            assert!(!store.notifications_enabled().await);
            assert_eq!(store.dietary_preferences().await, DietaryPreferences::default());
        }

        #[tokio::test]
        async fn test_notification_flag_survives_reload() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("settings.json");

            let store = SettingsStore::load(&path).await.unwrap();
            store.set(NOTIFICATIONS_SETTING, true).await.unwrap();

            let reloaded = SettingsStore::load(&path).await.unwrap();
            assert!(reloaded.notifications_enabled().await);
        }

        #[tokio::test]
        async fn test_dietary_preferences_round_trip() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("settings.json");
            let store = SettingsStore::load(&path).await.unwrap();

            let prefs = DietaryPreferences {
                vegan: true,
                keto: true,
                allergies: "peanuts".to_string(),
                currency: "EUR".to_string(),
                recipe_notifications: false,
                ..DietaryPreferences::default()
            };
            store.save_dietary_preferences(&prefs).await.unwrap();

            let reloaded = SettingsStore::load(&path).await.unwrap();
            assert_eq!(reloaded.dietary_preferences().await, prefs);
            assert_eq!(reloaded.get_string("pref_currency").await.as_deref(), Some("EUR"));
        }

        #[tokio::test]
        async fn test_clear_all_data_keeps_foreign_keys() {
            let dir = tempfile::tempdir().unwrap();
            let store = SettingsStore::load(dir.path().join("settings.json")).await.unwrap();

            store.set_api_key("sk-abc").await.unwrap();
            store.set(NOTIFICATIONS_SETTING, true).await.unwrap();
            store
                .save_dietary_preferences(&DietaryPreferences {
                    vegetarian: true,
                    ..DietaryPreferences::default()
                })
                .await
                .unwrap();
            store.set("theme", "dark").await.unwrap();

            store.clear_all_data().await.unwrap();

            assert!(store.api_key().await.is_none());
            assert!(!store.notifications_enabled().await);
            assert!(!store.get_bool("pref_vegetarian").await);
            assert_eq!(store.get_string("theme").await.as_deref(), Some("dark"));
        }
    }
}
