//! 端到端验证调度器后台线程的行为：真实线程、真实时钟。
//! 时间断言都留了宽裕的余量，避免慢机器上的抖动。

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread::sleep;
use std::time::Duration;

use mge_core::Scheduler;
use mge_core::scheduler::Repeat;

#[test]
fn finite_budget_fires_exactly_then_disappears() {
    let count = Arc::new(AtomicU32::new(0));
    let mut scheduler = Scheduler::new();

    let count_in_callback = count.clone();
    scheduler.make_callback(
        move || {
            count_in_callback.fetch_add(1, Ordering::Relaxed);
        },
        Duration::from_millis(50),
        Repeat::Times(3),
    );

    // 500ms 足够 50ms 频率触发 3 次并被移除。
    sleep(Duration::from_millis(500));

    assert_eq!(count.load(Ordering::Relaxed), 3, "预算 3 次应恰好触发 3 次");
    assert!(
        scheduler.get_all_callbacks().is_empty(),
        "耗尽的回调应从快照中消失"
    );
}

#[test]
fn pause_then_start_produces_no_burst() {
    let count = Arc::new(AtomicU32::new(0));
    let mut scheduler = Scheduler::new();

    let count_in_callback = count.clone();
    scheduler.make_callback(
        move || {
            count_in_callback.fetch_add(1, Ordering::Relaxed);
        },
        Duration::from_millis(40),
        Repeat::Forever,
    );

    sleep(Duration::from_millis(150));
    scheduler.pause();
    assert!(scheduler.is_paused());
    // 暂停期间不应有任何触发。
    sleep(Duration::from_millis(20));
    let while_paused = count.load(Ordering::Relaxed);
    sleep(Duration::from_millis(200));
    assert_eq!(count.load(Ordering::Relaxed), while_paused, "暂停期间不应触发");

    scheduler.start();
    let at_resume = count.load(Ordering::Relaxed);
    sleep(Duration::from_millis(20));
    // 恢复后的前半个频率周期内，最多出现一次触发，绝无补偿连发。
    assert!(
        count.load(Ordering::Relaxed) <= at_resume + 1,
        "恢复后不应出现补偿式连发"
    );
}

#[test]
fn remove_callback_is_a_noop_for_stale_handles() {
    let mut scheduler = Scheduler::new();
    let id = scheduler.make_callback(|| {}, Duration::from_secs(3600), Repeat::Forever);

    assert_eq!(scheduler.get_all_callbacks().len(), 1);
    scheduler.remove_callback(id);
    assert!(scheduler.get_all_callbacks().is_empty());

    // 再移除一次：静默 no-op。
    scheduler.remove_callback(id);
    assert!(scheduler.get_all_callbacks().is_empty());
}

#[test]
fn stop_discards_every_callback_but_keeps_the_scheduler() {
    let mut scheduler = Scheduler::new();
    scheduler.make_callback(|| {}, Duration::from_secs(3600), Repeat::Forever);
    scheduler.make_callback(|| {}, Duration::from_secs(3600), Repeat::Times(5));
    assert_eq!(scheduler.get_all_callbacks().len(), 2);

    scheduler.stop();
    assert!(scheduler.get_all_callbacks().is_empty());
    assert!(
        scheduler.time_elapsed() < Duration::from_millis(500),
        "stop 应重置出生时钟"
    );

    // 空调度器仍然可用。
    let count = Arc::new(AtomicU32::new(0));
    let count_in_callback = count.clone();
    scheduler.make_callback(
        move || {
            count_in_callback.fetch_add(1, Ordering::Relaxed);
        },
        Duration::from_millis(10),
        Repeat::Times(1),
    );
    sleep(Duration::from_millis(100));
    assert_eq!(count.load(Ordering::Relaxed), 1);
}

#[test]
fn reset_zeroes_fire_counts_and_birth_clock() {
    let mut scheduler = Scheduler::new();
    let count = Arc::new(AtomicU32::new(0));
    let count_in_callback = count.clone();
    scheduler.make_callback(
        move || {
            count_in_callback.fetch_add(1, Ordering::Relaxed);
        },
        Duration::from_millis(20),
        Repeat::Forever,
    );

    sleep(Duration::from_millis(150));
    assert!(count.load(Ordering::Relaxed) > 0);

    scheduler.reset();
    let snapshot = scheduler.get_all_callbacks();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].fired, 0, "reset 后触发计数应归零");
    assert!(scheduler.time_elapsed() < Duration::from_millis(500));
}

#[test]
fn manual_tick_returns_synchronously() {
    let count = Arc::new(AtomicU32::new(0));
    let mut scheduler = Scheduler::new();
    let count_in_callback = count.clone();
    scheduler.make_callback(
        move || {
            count_in_callback.fetch_add(1, Ordering::Relaxed);
        },
        Duration::ZERO,
        Repeat::Forever,
    );

    // 同步 tick 与后台检查遵循同一门槛；这里只验证它会在有限时间内返回
    // 并推动回调执行。
    for _ in 0..3 {
        scheduler.tick();
        sleep(Duration::from_millis(5));
    }
    assert!(count.load(Ordering::Relaxed) > 0);
}

#[test]
fn drop_joins_the_worker_before_returning() {
    let count = Arc::new(AtomicU32::new(0));
    let count_in_callback = count.clone();
    {
        let mut scheduler = Scheduler::new();
        scheduler.make_callback(
            move || {
                count_in_callback.fetch_add(1, Ordering::Relaxed);
            },
            Duration::from_millis(5),
            Repeat::Forever,
        );
        sleep(Duration::from_millis(50));
    } // drop：通知、join、销毁记录

    let after_drop = count.load(Ordering::Relaxed);
    assert!(after_drop > 0, "后台线程存活期间应有触发");
    sleep(Duration::from_millis(50));
    assert_eq!(
        count.load(Ordering::Relaxed),
        after_drop,
        "join 返回后不应再有任何触发"
    );
}
