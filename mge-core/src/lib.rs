//! Meadow Engine 的核心库（`mge-core`）。
//!
//! 该 crate 提供三块实时模拟核心：碰撞几何（[`geometry`]）、游戏对象与帧动画
//! （[`game`]），以及独立后台线程驱动的周期回调调度器（[`scheduler`]）。
//!
//! 大多数游戏项目只需要：
//! - 用 [`game::object::GameObject`] 构建可移动对象并挂载碰撞盒
//! - 每帧调用 [`game::animation::Animation::update`] 推进动画
//! - 用 [`Scheduler`] 注册独立于主循环节奏的周期回调
//!
//! 渲染、窗口与音频不属于本库：它们通过 [`game::animation::ResourceBinder`]
//! 与对象上的绘制回调两个窄接口接入。

pub mod config;
pub mod game;
pub mod geometry;
pub mod logger;
pub mod scheduler;

pub use game::object::GameObject;
pub use scheduler::Scheduler;
