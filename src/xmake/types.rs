//! Typed results of the xmake query scripts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current `xmake f` configuration snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmakeConfig {
    /// Target platform (linux, windows, macosx, ...)
    pub plat: String,

    /// Target architecture
    pub arch: String,

    /// Build mode (debug, release, ...)
    pub mode: String,
}

/// An environment variable needed to run a target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEnv {
    pub name: String,
    pub value: String,
}

/// Everything needed to launch or debug a target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetInformations {
    /// Target name
    pub name: String,

    /// Directory the target runs in
    pub rundir: String,

    /// Path of the built artifact
    pub path: String,

    /// Extra run environment
    #[serde(deserialize_with = "deserialize_envs")]
    pub envs: Vec<TargetEnv>,
}

/// A target as shown in the project explorer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerTarget {
    pub name: String,

    /// Source files of the target
    pub files: Vec<String>,

    /// Explorer group (`set_group`), may be empty
    pub group: String,

    /// binary, static, shared, phony, ...
    pub kind: String,

    /// Directory of the `xmake.lua` defining the target
    pub scriptdir: String,
}

/// Data backing the project explorer view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerInformations {
    /// Project options, passed through untouched
    pub options: Vec<Value>,

    pub targets: Vec<ExplorerTarget>,
}

impl ExplorerInformations {
    /// Targets grouped by their explorer group, in first-seen order.
    pub fn groups(&self) -> Vec<(&str, Vec<&ExplorerTarget>)> {
        let mut groups: Vec<(&str, Vec<&ExplorerTarget>)> = Vec::new();
        for target in &self.targets {
            match groups.iter_mut().find(|(group, _)| *group == target.group) {
                Some((_, members)) => members.push(target),
                None => groups.push((target.group.as_str(), vec![target])),
            }
        }
        groups
    }
}

/// Accept run environments either as `[{name, value}]` or as a `{name: value}` map.
fn deserialize_envs<'de, D>(deserializer: D) -> Result<Vec<TargetEnv>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Envs {
        List(Vec<TargetEnv>),
        Map(serde_json::Map<String, Value>),
    }

    Ok(match Option::<Envs>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Envs::List(list)) => list,
        Some(Envs::Map(map)) => map
            .into_iter()
            .map(|(name, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                TargetEnv { name, value }
            })
            .collect(),
    })
}
