//! Running a batch of configured scenes one after another.

use std::path::Path;
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::Error;
use crate::random;
use crate::scene::{SceneContext, SceneKind};
use crate::types::{Parameter, Seconds};

type Result<T> = std::result::Result<T, Error>;

/// One entry of a scene batch.
///
/// ```
/// use lively_lights::SceneConfig;
///
/// let configs = SceneConfig::from_toml(r#"
///     [[scenes]]
///     title = "Rainbow"
///     description = "Cycle between three colors"
///     scene_name = "sequence"
///     duration = 12
///     properties = { brightness = 254, hue_sequence = [0, 40000, 30000] }
/// "#).unwrap();
/// assert_eq!(configs[0].scene_name, "sequence");
/// assert_eq!(configs[0].duration().unwrap().unwrap().as_secs(), 12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub scene_name: String,
    /// Seconds; runs until cancelled when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct SceneConfigFile {
    scenes: Vec<SceneConfig>,
}

impl SceneConfig {
    pub fn from_toml(text: &str) -> Result<Vec<SceneConfig>> {
        let file: SceneConfigFile = toml::from_str(text).map_err(Error::TomlLoad)?;
        Ok(file.scenes)
    }

    pub fn from_json(text: &str) -> Result<Vec<SceneConfig>> {
        serde_json::from_str(text).map_err(Error::JsonLoad)
    }

    /// Load a `.json` array or a TOML file with `[[scenes]]` tables.
    pub fn load(path: &Path) -> Result<Vec<SceneConfig>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::io(&format!("read {}", path.display()), e))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&text),
            _ => Self::from_toml(&text),
        }
    }

    pub fn duration(&self) -> Result<Option<Duration>> {
        self.duration
            .map(|seconds| Seconds::parse("duration", &Value::from(seconds)))
            .transpose()
            .map(|seconds| seconds.map(|s| s.as_duration()))
    }

    fn scene(&self, context: &SceneContext) -> Result<SceneKind> {
        self.duration()
            .and_then(|_| {
                SceneKind::with_properties(&self.scene_name, &self.properties, context.clone())
            })
            .map_err(|e| e.in_scene_config(&self.title))
    }
}

/// Runs scene configs in sequence, all sharing one context.
pub struct Launcher {
    context: SceneContext,
    configs: Vec<SceneConfig>,
}

impl Launcher {
    /// Every config is checked for a known scene name, known property names,
    /// valid values and consistent settings before anything runs.
    pub fn new(context: SceneContext, configs: Vec<SceneConfig>) -> Result<Self> {
        for config in &configs {
            config
                .scene(&context)?
                .validate()
                .map_err(|e| e.in_scene_config(&config.title))?;
        }
        Ok(Launcher { context, configs })
    }

    pub fn configs(&self) -> &[SceneConfig] {
        &self.configs
    }

    /// Build, configure and run one scene. Returns the time it ran.
    pub async fn launch_scene(
        &self,
        config: &SceneConfig,
        duration_override: Option<Duration>,
    ) -> Result<Duration> {
        let mut scene = config.scene(&self.context)?;
        scene
            .validate()
            .map_err(|e| e.in_scene_config(&config.title))?;

        let duration = match duration_override {
            Some(duration) => Some(duration),
            None => config.duration()?,
        };
        if config.description.is_empty() {
            info!("launching \"{}\"", config.title);
        } else {
            info!("launching \"{}\": {}", config.title, config.description);
        }
        scene
            .start(duration)
            .await
            .map_err(|e| e.in_scene_config(&config.title))
    }

    /// Run every config once, in order or shuffled, and repeat the whole
    /// pass if `endless`. Each pass is shuffled anew.
    pub async fn launch(
        &self,
        randomized: bool,
        endless: bool,
        duration_override: Option<Duration>,
    ) -> Result<()> {
        if self.configs.is_empty() {
            return Ok(());
        }

        loop {
            let mut order: Vec<&SceneConfig> = self.configs.iter().collect();
            if randomized {
                random::shuffle(&mut order);
            }
            for config in order {
                if self.context.cancel().is_cancelled() {
                    return Ok(());
                }
                self.launch_scene(config, duration_override).await?;
            }
            if !endless || self.context.cancel().is_cancelled() {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::scene::tests::{context, properties};
    use crate::testing::MockBridge;
    use serde_json::json;

    fn config(title: &str, hue: u16) -> SceneConfig {
        SceneConfig {
            title: title.to_string(),
            description: String::new(),
            scene_name: "sequence".to_string(),
            duration: Some(2.0),
            properties: properties(json!({
                "brightness": 100,
                "hue_sequence": [hue],
                "sleep_time": 1,
                "transition_time": 0.5,
            })),
        }
    }

    fn hues(bridge: &MockBridge) -> Vec<u16> {
        bridge
            .sent()
            .iter()
            .filter_map(|(_, state)| state.get_hue())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_launch_in_order() {
        let bridge = Arc::new(MockBridge::new(&[(1, true)]));
        let launcher = Launcher::new(
            context(&bridge),
            vec![config("first", 10), config("second", 20)],
        )
        .unwrap();

        let start = tokio::time::Instant::now();
        launcher.launch(false, false, None).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(4));
        assert_eq!(hues(&bridge), [10, 10, 20, 20]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_override() {
        let bridge = Arc::new(MockBridge::new(&[(1, true)]));
        let launcher = Launcher::new(context(&bridge), vec![config("only", 10)]).unwrap();

        let ran = launcher
            .launch_scene(&launcher.configs()[0], Some(Duration::from_secs(5)))
            .await
            .unwrap();
        assert_eq!(ran, Duration::from_secs(5));
        assert_eq!(hues(&bridge).len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_randomized_runs_everything_once() {
        let bridge = Arc::new(MockBridge::new(&[(1, true)]));
        let configs = (1..=4).map(|i| config(&format!("scene {i}"), i)).collect();
        let launcher = Launcher::new(context(&bridge), configs).unwrap();

        launcher.launch(true, false, Some(Duration::from_secs(1))).await.unwrap();
        let mut sent = hues(&bridge);
        sent.sort();
        assert_eq!(sent, [1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_endless_stops_on_cancel() {
        let bridge = Arc::new(MockBridge::new(&[(1, true)]));
        let context = context(&bridge);
        let cancel = context.cancel().clone();
        let launcher = Launcher::new(context, vec![config("a", 1), config("b", 2)]).unwrap();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(9)).await;
            cancel.cancel();
        });
        launcher.launch(false, true, None).await.unwrap();
        assert!(hues(&bridge).len() >= 8);
    }

    #[test]
    fn test_malformed_config_is_rejected_upfront() {
        let bridge = Arc::new(MockBridge::new(&[]));
        let mut broken = config("broken", 1);
        broken.properties.insert("xxx".to_string(), json!(1));

        let err = Launcher::new(context(&bridge), vec![config("fine", 1), broken])
            .err()
            .unwrap();
        match err {
            Error::InvalidSceneConfig { title, source } => {
                assert_eq!(title, "broken");
                assert_eq!(*source, Error::invalid_property("sequence", "xxx"));
            }
            other => panic!("unexpected error {other}"),
        }

        let mut overlapping = config("overlapping", 1);
        overlapping
            .properties
            .insert("transition_time".to_string(), json!(3));
        let err = Launcher::new(context(&bridge), vec![config("fine", 1), overlapping])
            .err()
            .unwrap();
        match err {
            Error::InvalidSceneConfig { title, source } => {
                assert_eq!(title, "overlapping");
                assert!(matches!(*source, Error::Configuration(_)));
            }
            other => panic!("unexpected error {other}"),
        }
        assert!(bridge.sent().is_empty());

        let mut unknown = config("unknown", 1);
        unknown.scene_name = "disco".to_string();
        let err = Launcher::new(context(&bridge), vec![unknown]).err().unwrap();
        assert!(err.to_string().contains("unknown scene \"disco\""));
    }

    #[test]
    fn test_json_configs() {
        let configs = SceneConfig::from_json(
            r#"[{"title": "Storm", "scene_name": "pendulum", "properties": {"color1": 1}}]"#,
        )
        .unwrap();
        assert_eq!(configs[0].title, "Storm");
        assert_eq!(configs[0].duration().unwrap(), None);
        assert_eq!(configs[0].properties["color1"], json!(1));
    }

    #[test]
    fn test_negative_duration() {
        let mut negative = config("negative", 1);
        negative.duration = Some(-1.0);
        assert!(negative.duration().is_err());
    }
}
