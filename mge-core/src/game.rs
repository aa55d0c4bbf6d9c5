//! 游戏侧模块：碰撞盒、可移动对象与帧动画。

pub mod animation;
pub mod hitbox;
pub mod object;
