//! In-memory scene graph.
use std::collections::BTreeMap;

use adventure_core::{SceneDefinition, SceneId, SceneOracle};

#[derive(Default)]
pub struct SceneOracleImpl {
    scenes: BTreeMap<SceneId, SceneDefinition>,
}

impl SceneOracleImpl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_scene(&mut self, scene: SceneDefinition) {
        self.scenes.insert(scene.id.clone(), scene);
    }
}

impl FromIterator<SceneDefinition> for SceneOracleImpl {
    fn from_iter<T: IntoIterator<Item = SceneDefinition>>(iter: T) -> Self {
        let mut oracle = Self::new();
        for scene in iter {
            oracle.add_scene(scene);
        }
        oracle
    }
}

impl SceneOracle for SceneOracleImpl {
    fn scene(&self, id: &SceneId) -> Option<&SceneDefinition> {
        self.scenes.get(id)
    }

    fn scene_ids(&self) -> Vec<SceneId> {
        self.scenes.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adventure_core::{Exit, OracleError};

    #[test]
    fn dangling_exits_fail_validation() {
        let oracle: SceneOracleImpl = [
            SceneDefinition::new("cellar", "Cellar").with_exit(Exit::new("up", "kitchen")),
            SceneDefinition::new("attic", "Attic").lit(),
        ]
        .into_iter()
        .collect();

        assert!(oracle.is_naturally_lit(&"attic".into()));
        assert_eq!(oracle.scene_ids(), vec![SceneId::from("attic"), SceneId::from("cellar")]);
        assert!(matches!(oracle.validate(), Err(OracleError::DanglingExit { .. })));
    }
}
