use uuid::Uuid;

use crate::geometry::Shape;

/// 碰撞盒唯一标识。
///
/// 两个几何完全相同的碰撞盒仍然是不同的对象：同一性由 `HitboxId` 决定，
/// 而不是由几何值决定。句柄在碰撞盒被移除或宿主对象销毁前保持有效。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HitboxId(Uuid);

impl HitboxId {
    /// 创建一个新的随机碰撞盒 ID。
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 生成一个更短、适合日志输出的字符串（前 8 个十六进制字符）。
    pub fn short(self) -> String {
        let s = self.0.simple().to_string();
        s.chars().take(8).collect()
    }
}

impl Default for HitboxId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HitboxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 挂在 [`GameObject`](crate::game::object::GameObject) 上的碰撞盒。
///
/// 每个碰撞盒恰好包装一个 [`Shape`]；形状的种类在构造后不变，几何字段可以
/// 原地修改（用于跟随宿主移动）。碰撞盒由宿主对象独占持有。
#[derive(Debug)]
pub struct Hitbox {
    id: HitboxId,
    shape: Shape,
}

impl Hitbox {
    pub(crate) fn new(shape: Shape) -> Self {
        Self {
            id: HitboxId::new(),
            shape,
        }
    }

    pub fn id(&self) -> HitboxId {
        self.id
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }

    /// 碰撞测试。纯函数，结果对称：`a.hits(b) == b.hits(a)`。
    pub fn hits(&self, other: &Hitbox) -> bool {
        self.shape.intersects(&other.shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_geometry_keeps_distinct_identity() {
        let a = Hitbox::new(Shape::rect(0, 0, 4, 4));
        let b = Hitbox::new(Shape::rect(0, 0, 4, 4));
        assert_ne!(a.id(), b.id(), "同几何的碰撞盒应有不同 id");
        assert!(a.hits(&b), "几何重合时应相交");
    }

    #[test]
    fn hits_is_symmetric_across_kinds() {
        let rect = Hitbox::new(Shape::rect(0, 0, 10, 10));
        let circle = Hitbox::new(Shape::circle(12, 5, 4));
        assert_eq!(rect.hits(&circle), circle.hits(&rect));
    }
}
