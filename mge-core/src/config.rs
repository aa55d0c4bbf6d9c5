use std::time::Duration;

/// 动画配置。
///
/// `frame_duration` 是帧表未显式给出间隔时使用的默认帧时长。
pub struct AnimationConfig {
    pub frame_duration: Duration,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frame_duration: Duration::from_millis(100),
        }
    }
}

/// 调度器配置。
///
/// `check_time` 控制后台线程两次检查之间的最小间隔；越小回调越接近目标频率，
/// 代价是后台线程被唤醒得更频繁。
pub struct SchedulerConfig {
    pub check_time: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_time: Duration::from_millis(1),
        }
    }
}

/// 核心库运行配置。
#[derive(Default)]
pub struct CoreConfig {
    pub animation: AnimationConfig,
    pub scheduler: SchedulerConfig,
}
