use crate::geometry::Position;
use super::SearchNode;

/// Construct the path from the start node to `end_index`
/// Returns the ordered cells from start to end, both included
/// nodes: &[SearchNode] - per-search arena, parent links are arena indices
/// end_index: usize - arena index of the last node on the path
pub(crate) fn shortest_path(nodes: &[SearchNode], end_index: usize) -> Vec<Position> {

    let mut path = Vec::new();
    let mut current_index = Some(end_index);

    // Trace back to the start, the only node without a parent
    while let Some(index) = current_index {
        let node = &nodes[index];
        path.push(node.position);
        current_index = node.parent;

        // parents form a tree rooted at start, a longer walk means corrupted links
        if path.len() > nodes.len() {
            log::error!("parent chain from {} does not terminate", nodes[end_index].position);
            return Vec::new();
        }
    }

    // The path is in reverse order, so reverse it
    path.reverse();
    path
}
