use std::collections::{BTreeMap, VecDeque};

use crate::state::SceneId;

/// Breadth-first search from `from` to `to`.
///
/// `neighbors` yields the scenes reachable in one step. The search expands at
/// most `max_depth` levels. Returns the scenes after `from`, ending at `to`.
pub(super) fn shortest_path<F>(
    from: &SceneId,
    to: &SceneId,
    max_depth: u32,
    mut neighbors: F,
) -> Vec<SceneId>
where
    F: FnMut(&SceneId) -> Vec<SceneId>,
{
    if from == to {
        return Vec::new();
    }

    let mut parents: BTreeMap<SceneId, SceneId> = BTreeMap::new();
    let mut queue = VecDeque::from([(from.clone(), 0u32)]);

    while let Some((scene, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for next in neighbors(&scene) {
            if &next == from || parents.contains_key(&next) {
                continue;
            }
            parents.insert(next.clone(), scene.clone());
            if &next == to {
                return unwind(&parents, from, to);
            }
            queue.push_back((next, depth + 1));
        }
    }

    Vec::new()
}

/// Number of steps between two scenes, if reachable.
pub(super) fn distance<F>(from: &SceneId, to: &SceneId, max_depth: u32, neighbors: F) -> Option<u32>
where
    F: FnMut(&SceneId) -> Vec<SceneId>,
{
    if from == to {
        return Some(0);
    }
    let path = shortest_path(from, to, max_depth, neighbors);
    (!path.is_empty()).then_some(path.len() as u32)
}

fn unwind(parents: &BTreeMap<SceneId, SceneId>, from: &SceneId, to: &SceneId) -> Vec<SceneId> {
    let mut path = vec![to.clone()];
    let mut cursor = to;
    while let Some(parent) = parents.get(cursor) {
        if parent == from {
            break;
        }
        path.push(parent.clone());
        cursor = parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(scene: &SceneId) -> Vec<SceneId> {
        let n: u32 = scene.as_str()[1..].parse().unwrap();
        let mut next = vec![SceneId::new(format!("s{}", n + 1))];
        if n > 0 {
            next.push(SceneId::new(format!("s{}", n - 1)));
        }
        next
    }

    #[test]
    fn finds_path_excluding_start() {
        let path = shortest_path(&"s0".into(), &"s3".into(), 10, line);
        assert_eq!(path, vec![SceneId::from("s1"), "s2".into(), "s3".into()]);
    }

    #[test]
    fn depth_limit_bounds_search() {
        assert!(shortest_path(&"s0".into(), &"s50".into(), 10, line).is_empty());
        assert_eq!(distance(&"s0".into(), &"s10".into(), 10, line), Some(10));
    }

    #[test]
    fn same_scene_is_empty_path() {
        assert!(shortest_path(&"s2".into(), &"s2".into(), 10, line).is_empty());
        assert_eq!(distance(&"s2".into(), &"s2".into(), 10, line), Some(0));
    }
}
