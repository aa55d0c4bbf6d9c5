//! 无窗口模板：一个“巡逻者”碰撞盒逼近静止目标的演示。
//!
//! 渲染层被一个只打日志的 [`ResourceBinder`] 和一个只打日志的绘制回调代替，
//! 因此它能在任何环境里直接运行，同时覆盖核心库的三块能力：
//! 碰撞几何、帧动画、后台调度器。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use parking_lot::Mutex;
use tracing::{info, trace};

use mge_core::game::animation::{Animation, FrameTable, ResourceBinder};
use mge_core::geometry::{Region, Shape};
use mge_core::scheduler::Repeat;
use mge_core::{GameObject, Scheduler, logger};

/// 把资源绑定变成日志输出的渲染层替身。
struct LoggingBinder;

impl ResourceBinder for LoggingBinder {
    fn bind(&mut self, key: &str) -> anyhow::Result<()> {
        info!(target: "mge-tpl", key, "绑定动画资源");
        Ok(())
    }

    fn set_clip(&mut self, clip: Option<Region>) {
        trace!(target: "mge-tpl", ?clip, "更新裁剪区域");
    }

    fn set_placement(&mut self, placement: Option<Region>) {
        trace!(target: "mge-tpl", ?placement, "更新摆放区域");
    }
}

fn main() -> anyhow::Result<()> {
    logger::init()?;

    // 静止目标：一个带矩形碰撞盒的方块。
    let mut goal = GameObject::new(200.0, 0.0, 20.0, 20.0);
    goal.add_hitbox(Shape::rect(200, 0, 20, 20));
    goal.set_draw_fn(Arc::new(|_context| {
        trace!(target: "mge-tpl", "draw goal");
    }));

    // 巡逻者：圆形碰撞盒，由调度器每 30ms 向右推进一次。
    let patroller = {
        let mut object = GameObject::new(0.0, 10.0, 16.0, 16.0);
        object.add_hitbox(Shape::circle(8, 10, 8));
        Arc::new(Mutex::new(object))
    };

    let mut scheduler = Scheduler::new();
    let patroller_for_callback = Arc::clone(&patroller);
    scheduler.make_callback(
        move || {
            patroller_for_callback.lock().move_right(4.0);
        },
        Duration::from_millis(30),
        Repeat::Forever,
    );

    // 行走动画：两个资源键轮换，帧时长 120ms。
    let table = FrameTable::new(
        vec!["patroller_walk_0".into(), "patroller_walk_1".into()],
        vec![Some(Region::new(0, 0, 16, 16)), Some(Region::new(16, 0, 16, 16))],
        vec![Duration::from_millis(120)],
    );
    let mut walk = Animation::new(table, LoggingBinder).context("初始化行走动画失败")?;
    walk.set_placement(Some(Region::new(0, 0, 16, 16)));

    info!(target: "mge-tpl", "demo 开始：巡逻者向目标推进");

    let mut was_hitting = false;
    for frame in 0..120u32 {
        std::thread::sleep(Duration::from_millis(16));

        walk.update()?;

        let patroller = patroller.lock();
        let hitting = patroller.hits(&goal);
        if hitting != was_hitting {
            info!(
                target: "mge-tpl",
                frame,
                x = patroller.x(),
                hitting,
                "碰撞状态变化"
            );
            was_hitting = hitting;
        }
        patroller.draw(&mut ());
        goal.draw(&mut ());
    }

    let callbacks = scheduler.get_all_callbacks();
    info!(
        target: "mge-tpl",
        callbacks = callbacks.len(),
        fired = callbacks.first().map(|c| c.fired).unwrap_or(0),
        elapsed_ms = scheduler.time_elapsed().as_millis() as u64,
        "demo 结束"
    );

    // scheduler 在此 drop：后台线程被 join，所有回调销毁。
    Ok(())
}
