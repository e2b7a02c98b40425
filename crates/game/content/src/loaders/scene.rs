//! Scene graph loader.

use std::collections::BTreeSet;
use std::path::Path;

use adventure_core::SceneDefinition;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Scene graph structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneGraph {
    pub scenes: Vec<SceneDefinition>,
}

/// Loader for the scene graph from RON files.
pub struct SceneLoader;

impl SceneLoader {
    /// Load the scene graph from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<SceneDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse a scene graph, rejecting duplicate ids and exits into nowhere.
    pub fn parse(content: &str) -> LoadResult<Vec<SceneDefinition>> {
        let graph: SceneGraph = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scene graph RON: {}", e))?;

        let mut ids = BTreeSet::new();
        for scene in &graph.scenes {
            if !ids.insert(&scene.id) {
                anyhow::bail!("Duplicate scene id '{}'", scene.id);
            }
        }
        for scene in &graph.scenes {
            if let Some(exit) = scene.exits.iter().find(|exit| !ids.contains(&exit.target)) {
                anyhow::bail!(
                    "Exit '{}' of scene '{}' leads to unknown scene '{}'",
                    exit.direction,
                    scene.id,
                    exit.target
                );
            }
        }

        tracing::debug!(scenes = graph.scenes.len(), "loaded scene graph");
        Ok(graph.scenes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAPH: &str = r#"(
        scenes: [
            (
                id: "cellar",
                name: "Cellar",
                exits: [(direction: "north", target: "troll_room")],
            ),
            (
                id: "troll_room",
                name: "The Troll Room",
                lit: true,
                exits: [
                    (direction: "south", target: "cellar"),
                    (
                        direction: "east",
                        target: "cellar",
                        condition: Some("!flags.troll_blocking"),
                        blocked_message: Some("The troll fends you off."),
                    ),
                ],
            ),
        ],
    )"#;

    #[test]
    fn parses_exits_and_conditions() {
        let scenes = SceneLoader::parse(GRAPH).unwrap();
        assert_eq!(scenes.len(), 2);
        assert!(!scenes[0].lit);
        assert!(scenes[1].lit);
        assert_eq!(scenes[1].exits[1].condition.as_deref(), Some("!flags.troll_blocking"));
        assert_eq!(scenes[1].exits[0].key, None);
    }

    #[test]
    fn dangling_exits_are_rejected() {
        let err = SceneLoader::parse(
            r#"(scenes: [(id: "cellar", name: "Cellar", exits: [(direction: "down", target: "pit")])])"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("pit"));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenes.ron");
        std::fs::write(&path, GRAPH).unwrap();
        assert_eq!(SceneLoader::load(&path).unwrap().len(), 2);
    }
}
