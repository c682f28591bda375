pub mod plan;
pub mod problem;

/// Node index. `0` is the hub, `1..=node_count` are delivery nodes.
pub type NodeId = usize;

pub const HUB: NodeId = 0;
