use std::any::Any;
use std::sync::Arc;

use nalgebra::Vector2;
use tracing::trace;

use super::hitbox::{Hitbox, HitboxId};
use crate::geometry::Shape;

/// 不透明绘制回调。
///
/// 渲染层提供该回调；核心在 [`GameObject::draw`] 中原样调用，不解释其参数。
/// 使用 `Arc` 承载以便对象拷贝时共享同一份回调（与事件载荷的承载方式一致）。
pub type DrawFn = Arc<dyn Fn(&mut dyn Any) + Send + Sync>;

/// 可移动的游戏对象：位置/尺寸 + 一组碰撞盒 + 可选绘制回调。
///
/// 位置与尺寸用 `f64` 存储以保留亚像素移动精度；碰撞盒几何是整数，
/// 移动增量在传给碰撞盒时按原样截断。
///
/// `track_on_move` 开启时（默认开启），对象的每次位置/尺寸变更都会在
/// **同一次调用内**以相同增量同步到所有碰撞盒；调用方观察不到
/// “位置已变、碰撞盒未变”的中间状态。
///
/// # 示例
///
/// ```
/// use mge_core::GameObject;
/// use mge_core::geometry::Shape;
///
/// let mut player = GameObject::new(0.0, 0.0, 10.0, 10.0);
/// let hitbox = player.add_hitbox(Shape::rect(0, 0, 10, 10));
/// player.move_down(3.0);
/// assert_eq!(player.y(), 3);
/// assert!(player.hitbox(hitbox).is_some());
/// ```
pub struct GameObject {
    position: Vector2<f64>,
    size: Vector2<f64>,
    hitboxes: Vec<Hitbox>,
    track_on_move: bool,
    draw_fn: Option<DrawFn>,
}

impl GameObject {
    /// 创建对象，`track_on_move` 默认开启。
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            position: Vector2::new(x, y),
            size: Vector2::new(w, h),
            hitboxes: Vec::new(),
            track_on_move: true,
            draw_fn: None,
        }
    }

    /// Builder 风格：设置碰撞盒是否跟随移动。
    pub fn with_track_on_move(mut self, track: bool) -> Self {
        self.track_on_move = track;
        self
    }

    /// Builder 风格：设置绘制回调。
    pub fn with_draw_fn(mut self, draw_fn: DrawFn) -> Self {
        self.draw_fn = Some(draw_fn);
        self
    }

    pub fn track_on_move(&self) -> bool {
        self.track_on_move
    }

    pub fn set_track_on_move(&mut self, track: bool) {
        self.track_on_move = track;
    }

    /// 当前位置（亚像素精度）。
    pub fn position(&self) -> Vector2<f64> {
        self.position
    }

    /// 当前尺寸（亚像素精度）。
    pub fn size(&self) -> Vector2<f64> {
        self.size
    }

    // 整数访问器截断小数部分，与碰撞盒的整数几何对应。
    pub fn x(&self) -> i32 {
        self.position.x as i32
    }

    pub fn y(&self) -> i32 {
        self.position.y as i32
    }

    pub fn w(&self) -> i32 {
        self.size.x as i32
    }

    pub fn h(&self) -> i32 {
        self.size.y as i32
    }

    pub fn move_up(&mut self, distance: f64) {
        self.position.y -= distance;
        if self.track_on_move {
            self.update_hitboxes(0, -(distance as i32), 0, 0);
        }
    }

    pub fn move_down(&mut self, distance: f64) {
        self.position.y += distance;
        if self.track_on_move {
            self.update_hitboxes(0, distance as i32, 0, 0);
        }
    }

    pub fn move_left(&mut self, distance: f64) {
        self.position.x -= distance;
        if self.track_on_move {
            self.update_hitboxes(-(distance as i32), 0, 0, 0);
        }
    }

    pub fn move_right(&mut self, distance: f64) {
        self.position.x += distance;
        if self.track_on_move {
            self.update_hitboxes(distance as i32, 0, 0, 0);
        }
    }

    pub fn set_x(&mut self, x: f64) {
        if self.track_on_move {
            self.update_hitboxes((x - self.position.x) as i32, 0, 0, 0);
        }
        self.position.x = x;
    }

    pub fn set_y(&mut self, y: f64) {
        if self.track_on_move {
            self.update_hitboxes(0, (y - self.position.y) as i32, 0, 0);
        }
        self.position.y = y;
    }

    pub fn set_w(&mut self, w: f64) {
        if self.track_on_move {
            self.update_hitboxes(0, 0, (w - self.size.x) as i32, 0);
        }
        self.size.x = w;
    }

    pub fn set_h(&mut self, h: f64) {
        if self.track_on_move {
            self.update_hitboxes(0, 0, 0, (h - self.size.y) as i32);
        }
        self.size.y = h;
    }

    /// 创建并注册一个新的碰撞盒，返回其稳定句柄。
    ///
    /// 形状构造器（[`Shape::rect`]/[`Shape::circle`]）承担了“种类 + 几何”
    /// 的工厂职责。
    pub fn add_hitbox(&mut self, shape: Shape) -> HitboxId {
        let hitbox = Hitbox::new(shape);
        let id = hitbox.id();
        trace!(target: "mge-core", hitbox = %id.short(), ?shape, "add hitbox");
        self.hitboxes.push(hitbox);
        id
    }

    /// 按句柄同一性移除第一个匹配的碰撞盒；找不到时静默跳过。
    pub fn remove_hitbox(&mut self, id: HitboxId) {
        if let Some(index) = self.hitboxes.iter().position(|h| h.id() == id) {
            self.hitboxes.remove(index);
            trace!(target: "mge-core", hitbox = %id.short(), "remove hitbox");
        }
    }

    /// 用给定形状整组替换碰撞盒，旧碰撞盒全部销毁，新碰撞盒分配新句柄。
    pub fn set_hitboxes<I>(&mut self, shapes: I)
    where
        I: IntoIterator<Item = Shape>,
    {
        self.hitboxes = shapes.into_iter().map(Hitbox::new).collect();
    }

    pub fn hitboxes(&self) -> &[Hitbox] {
        &self.hitboxes
    }

    pub fn hitbox(&self, id: HitboxId) -> Option<&Hitbox> {
        self.hitboxes.iter().find(|h| h.id() == id)
    }

    pub fn hitbox_mut(&mut self, id: HitboxId) -> Option<&mut Hitbox> {
        self.hitboxes.iter_mut().find(|h| h.id() == id)
    }

    /// 对每个碰撞盒应用同样的四个增量。
    ///
    /// 圆形碰撞盒把 `dw` 解释为半径增量并忽略 `dh`。
    pub fn update_hitboxes(&mut self, dx: i32, dy: i32, dw: i32, dh: i32) {
        for hitbox in &mut self.hitboxes {
            let shape = hitbox.shape_mut();
            shape.translate(dx, dy);
            shape.resize(dw, dh);
        }
    }

    /// 任意一对碰撞盒相交即视为命中；找到第一对就短路返回。
    pub fn hits(&self, other: &GameObject) -> bool {
        self.hitboxes
            .iter()
            .any(|h| other.hitboxes.iter().any(|o| h.hits(o)))
    }

    /// 调用渲染层提供的绘制回调；未设置回调时不做任何事。
    pub fn draw(&self, context: &mut dyn Any) {
        if let Some(draw_fn) = &self.draw_fn {
            draw_fn(context);
        }
    }

    pub fn set_draw_fn(&mut self, draw_fn: DrawFn) {
        self.draw_fn = Some(draw_fn);
    }
}

impl Clone for GameObject {
    /// 深拷贝：按源碰撞盒当前的几何重建整组碰撞盒并分配新句柄；
    /// 两个存活对象永远不会共享同一个碰撞盒实例。
    fn clone(&self) -> Self {
        Self {
            position: self.position,
            size: self.size,
            hitboxes: self
                .hitboxes
                .iter()
                .map(|h| Hitbox::new(*h.shape()))
                .collect(),
            track_on_move: self.track_on_move,
            draw_fn: self.draw_fn.clone(),
        }
    }
}

impl std::fmt::Debug for GameObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameObject")
            .field("position", &self.position)
            .field("size", &self.size)
            .field("hitboxes", &self.hitboxes)
            .field("track_on_move", &self.track_on_move)
            .field("draw_fn", &self.draw_fn.as_ref().map(|_| "..."))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn move_down_tracks_hitboxes() {
        // (0,0,10,10) + 矩形碰撞盒，move_down(3)。
        let mut object = GameObject::new(0.0, 0.0, 10.0, 10.0);
        let id = object.add_hitbox(Shape::rect(0, 0, 10, 10));

        object.move_down(3.0);

        assert_eq!(object.y(), 3);
        assert_eq!(object.x(), 0);
        let shape = *object.hitbox(id).expect("碰撞盒应仍然存在").shape();
        assert_eq!(shape, Shape::rect(0, 3, 10, 10));
    }

    #[test]
    fn pure_x_move_leaves_circle_radius_alone() {
        let mut object = GameObject::new(0.0, 0.0, 10.0, 10.0);
        let rect = object.add_hitbox(Shape::rect(0, 0, 10, 10));
        let circle = object.add_hitbox(Shape::circle(5, 5, 4));

        object.move_right(5.0);

        assert_eq!(
            *object.hitbox(rect).unwrap().shape(),
            Shape::rect(5, 0, 10, 10),
            "矩形 x 应增加 5"
        );
        assert_eq!(
            *object.hitbox(circle).unwrap().shape(),
            Shape::circle(10, 5, 4),
            "圆的半径不应被纯 X 移动影响"
        );
    }

    #[test]
    fn width_change_maps_to_circle_radius() {
        let mut object = GameObject::new(0.0, 0.0, 10.0, 10.0);
        let circle = object.add_hitbox(Shape::circle(0, 0, 4));

        object.set_w(13.0); // dw = 3
        object.set_h(99.0); // dh 对圆无效

        assert_eq!(*object.hitbox(circle).unwrap().shape(), Shape::circle(0, 0, 7));
    }

    #[test]
    fn track_on_move_disabled_leaves_hitboxes() {
        let mut object = GameObject::new(0.0, 0.0, 10.0, 10.0).with_track_on_move(false);
        let id = object.add_hitbox(Shape::rect(0, 0, 10, 10));

        object.move_right(20.0);

        assert_eq!(object.x(), 20);
        assert_eq!(*object.hitbox(id).unwrap().shape(), Shape::rect(0, 0, 10, 10));
    }

    #[test]
    fn hits_scans_the_cross_product() {
        let mut a = GameObject::new(0.0, 0.0, 10.0, 10.0);
        a.add_hitbox(Shape::rect(0, 0, 10, 10));
        a.add_hitbox(Shape::circle(40, 40, 3));

        let mut b = GameObject::new(0.0, 0.0, 10.0, 10.0);
        b.add_hitbox(Shape::rect(100, 100, 5, 5));
        assert!(!a.hits(&b));
        assert!(!b.hits(&a));

        // 只有第二个碰撞盒与 b 的新盒相交。
        b.add_hitbox(Shape::rect(38, 38, 4, 4));
        assert!(a.hits(&b));
        assert!(b.hits(&a));
    }

    #[test]
    fn remove_hitbox_is_identity_based() {
        let mut object = GameObject::new(0.0, 0.0, 1.0, 1.0);
        let first = object.add_hitbox(Shape::rect(0, 0, 4, 4));
        let second = object.add_hitbox(Shape::rect(0, 0, 4, 4)); // 相同几何

        object.remove_hitbox(first);
        assert_eq!(object.hitboxes().len(), 1);
        assert_eq!(object.hitboxes()[0].id(), second);

        // 不存在的句柄是 no-op。
        object.remove_hitbox(first);
        assert_eq!(object.hitboxes().len(), 1);
    }

    #[test]
    fn clone_deep_copies_hitboxes_with_fresh_ids() {
        let mut source = GameObject::new(1.5, 2.5, 3.0, 4.0);
        let id = source.add_hitbox(Shape::circle(1, 2, 3));

        let mut copy = source.clone();
        assert_eq!(copy.hitboxes().len(), 1);
        assert_ne!(copy.hitboxes()[0].id(), id, "拷贝应分配新句柄");
        assert_eq!(*copy.hitboxes()[0].shape(), Shape::circle(1, 2, 3));

        // 互不影响。
        copy.move_right(10.0);
        assert_eq!(*source.hitbox(id).unwrap().shape(), Shape::circle(1, 2, 3));
    }

    #[test]
    fn draw_invokes_opaque_callback() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let object = GameObject::new(0.0, 0.0, 1.0, 1.0).with_draw_fn(Arc::new(|context| {
            CALLS.fetch_add(1, Ordering::Relaxed);
            if let Some(count) = context.downcast_mut::<u32>() {
                *count += 1;
            }
        }));

        let mut frame_counter: u32 = 0;
        object.draw(&mut frame_counter);
        assert_eq!(CALLS.load(Ordering::Relaxed), 1);
        assert_eq!(frame_counter, 1);
    }
}
