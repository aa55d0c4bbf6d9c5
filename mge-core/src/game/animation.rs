use std::time::{Duration, Instant};

use tracing::trace;

use crate::config::AnimationConfig;
use crate::geometry::Region;

/// 渲染层的资源绑定接口。
///
/// 核心不加载任何视觉资源；当帧表的资源游标变化时，它只调用一次
/// [`bind`](Self::bind)，并认为渲染层会把对应的视觉资源准备好。裁剪与
/// 摆放区域按原样转发，核心不解释其含义。
///
/// 资源层是整个核心里唯一会产生致命错误的地方（资源缺失、无法打开），
/// 因此 `bind` 返回 `anyhow::Result` 并由调用链向上传播。
pub trait ResourceBinder: Send {
    /// 绑定资源游标新指向的资源。只在游标值变化时被调用。
    fn bind(&mut self, key: &str) -> anyhow::Result<()>;

    /// 设置当前裁剪区域；`None` 表示取消裁剪。
    fn set_clip(&mut self, clip: Option<Region>);

    /// 设置摆放区域；`None` 表示交由渲染层决定。
    fn set_placement(&mut self, placement: Option<Region>);
}

/// 一次成功推进的结果。
///
/// `reload` 为 `Some(index)` 时，资源游标的值发生了变化，需要重新绑定
/// 第 `index` 个资源键；按索引缓存，索引不变就不重新加载。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStep {
    pub reload: Option<usize>,
}

/// 帧表：驱动动画的三条并行序列与三个独立游标。
///
/// - `keys`：资源键序列（资源游标）
/// - `clips`：裁剪区域序列（裁剪游标），元素可为 `None`
/// - `durations`：每步时长序列（时长游标）
///
/// 三条序列的长度可以不同；每个游标在超出自己序列的长度时独立绕回 0。
/// 推进由外部节拍驱动（每帧调用一次 [`advance`](Self::advance)），帧表
/// 自己不持有线程。
///
/// 空的 `clips`/`durations` 会替换为默认值（单个 `None` / 单个默认帧
/// 时长）；`keys` 允许为空，此时帧表只推进裁剪与时长游标，永远不要求
/// 重新绑定资源。
#[derive(Debug)]
pub struct FrameTable {
    keys: Vec<String>,
    clips: Vec<Option<Region>>,
    durations: Vec<Duration>,

    key_cursor: usize,
    clip_cursor: usize,
    duration_cursor: usize,

    /// 上一次实际绑定过的资源游标值（按索引缓存）。
    loaded: Option<usize>,

    last_update: Instant,
    running: bool,
}

impl FrameTable {
    pub fn new(keys: Vec<String>, clips: Vec<Option<Region>>, durations: Vec<Duration>) -> Self {
        let clips = if clips.is_empty() { vec![None] } else { clips };
        let durations = if durations.is_empty() {
            vec![AnimationConfig::default().frame_duration]
        } else {
            durations
        };

        Self {
            keys,
            clips,
            durations,
            key_cursor: 0,
            clip_cursor: 0,
            duration_cursor: 0,
            loaded: None,
            last_update: Instant::now(),
            running: true,
        }
    }

    /// 推进一步（若到期）。
    ///
    /// 只有处于运行状态、且距上次推进已过当前步时长时才生效；生效时记录
    /// `now`，三个游标各自前进一步并独立绕回，然后按索引缓存判断是否需要
    /// 重新绑定资源。同一个 `now` 重复调用最多推进一步。
    pub fn advance(&mut self, now: Instant) -> Option<FrameStep> {
        if !self.running {
            return None;
        }
        if now.duration_since(self.last_update) < self.durations[self.duration_cursor] {
            return None;
        }
        self.last_update = now;

        if !self.keys.is_empty() {
            self.key_cursor = (self.key_cursor + 1) % self.keys.len();
        }
        self.clip_cursor = (self.clip_cursor + 1) % self.clips.len();
        self.duration_cursor = (self.duration_cursor + 1) % self.durations.len();

        let reload = if !self.keys.is_empty() && self.loaded != Some(self.key_cursor) {
            self.loaded = Some(self.key_cursor);
            Some(self.key_cursor)
        } else {
            None
        };
        Some(FrameStep { reload })
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// 停止推进。停止期间不更新时钟，恢复后不会累积时间债。
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// 回到第一帧：游标全部清零、时钟重置为 `now`；运行状态不变。
    pub fn reset(&mut self, now: Instant) {
        self.key_cursor = 0;
        self.clip_cursor = 0;
        self.duration_cursor = 0;
        self.last_update = now;
    }

    /// 只重置时钟，游标保持原位。用于外部暂停后的恢复，避免跳帧。
    pub fn reset_timer(&mut self, now: Instant) {
        self.last_update = now;
    }

    pub fn key_cursor(&self) -> usize {
        self.key_cursor
    }

    pub fn clip_cursor(&self) -> usize {
        self.clip_cursor
    }

    pub fn duration_cursor(&self) -> usize {
        self.duration_cursor
    }

    // 游标设置器：越界时静默忽略，绝不中断调用方的循环。

    pub fn set_key_cursor(&mut self, cursor: usize) {
        if cursor < self.keys.len() {
            self.key_cursor = cursor;
        }
    }

    pub fn set_clip_cursor(&mut self, cursor: usize) {
        if cursor < self.clips.len() {
            self.clip_cursor = cursor;
        }
    }

    pub fn set_duration_cursor(&mut self, cursor: usize) {
        if cursor < self.durations.len() {
            self.duration_cursor = cursor;
        }
    }

    /// 整组替换裁剪序列；空序列替换为默认值，游标越界时回到 0。
    pub fn set_clips(&mut self, clips: Vec<Option<Region>>) {
        self.clips = if clips.is_empty() { vec![None] } else { clips };
        if self.clip_cursor >= self.clips.len() {
            self.clip_cursor = 0;
        }
    }

    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    pub fn current_key(&self) -> Option<&str> {
        self.key_at(self.key_cursor)
    }

    pub fn current_clip(&self) -> Option<Region> {
        self.clips[self.clip_cursor]
    }

    /// 把当前资源游标记为已绑定（初始绑定后由 [`Animation`] 调用）。
    pub fn note_loaded(&mut self) {
        if !self.keys.is_empty() {
            self.loaded = Some(self.key_cursor);
        }
    }
}

/// 动画：帧表 + 资源绑定器。
///
/// 构造时立即绑定初始资源与裁剪区域（与帧表按索引缓存的约定一致，之后
/// 只有游标值变化才会重新绑定）。每帧调用一次 [`update`](Self::update)。
///
/// # 示例
///
/// ```
/// use std::time::Duration;
/// use mge_core::game::animation::{Animation, FrameTable, ResourceBinder};
/// use mge_core::geometry::Region;
///
/// struct NullBinder;
///
/// impl ResourceBinder for NullBinder {
///     fn bind(&mut self, _key: &str) -> anyhow::Result<()> {
///         Ok(())
///     }
///     fn set_clip(&mut self, _clip: Option<Region>) {}
///     fn set_placement(&mut self, _placement: Option<Region>) {}
/// }
///
/// # fn main() -> anyhow::Result<()> {
/// let table = FrameTable::new(
///     vec!["walk_0".into(), "walk_1".into()],
///     vec![],
///     vec![Duration::from_millis(120)],
/// );
/// let mut animation = Animation::new(table, NullBinder)?;
/// animation.update()?; // 游戏循环里每帧调用
/// Ok(())
/// # }
/// ```
pub struct Animation {
    table: FrameTable,
    binder: Box<dyn ResourceBinder>,
    placement: Option<Region>,
}

impl Animation {
    pub fn new<B>(table: FrameTable, binder: B) -> anyhow::Result<Self>
    where
        B: ResourceBinder + 'static,
    {
        let mut table = table;
        let mut binder: Box<dyn ResourceBinder> = Box::new(binder);
        if let Some(key) = table.current_key() {
            binder.bind(key)?;
        }
        table.note_loaded();
        binder.set_clip(table.current_clip());

        Ok(Self {
            table,
            binder,
            placement: None,
        })
    }

    /// 推进动画。到期时同步裁剪区域，资源游标值变化时重新绑定资源。
    pub fn update(&mut self) -> anyhow::Result<()> {
        let Some(step) = self.table.advance(Instant::now()) else {
            return Ok(());
        };

        if let Some(index) = step.reload
            && let Some(key) = self.table.key_at(index)
        {
            trace!(target: "mge-core", key, index, "animation rebinds resource");
            self.binder.bind(key)?;
        }
        self.binder.set_clip(self.table.current_clip());
        Ok(())
    }

    /// 设置摆放区域，并原样转发给渲染层。
    pub fn set_placement(&mut self, placement: Option<Region>) {
        self.placement = placement;
        self.binder.set_placement(placement);
    }

    /// 整组替换裁剪序列并立即同步当前裁剪区域。
    pub fn set_clips(&mut self, clips: Vec<Option<Region>>) {
        self.table.set_clips(clips);
        self.binder.set_clip(self.table.current_clip());
    }

    pub fn placement(&self) -> Option<Region> {
        self.placement
    }

    pub fn start(&mut self) {
        self.table.start();
    }

    pub fn stop(&mut self) {
        self.table.stop();
    }

    pub fn is_running(&self) -> bool {
        self.table.is_running()
    }

    pub fn reset(&mut self) {
        self.table.reset(Instant::now());
    }

    pub fn reset_timer(&mut self) {
        self.table.reset_timer(Instant::now());
    }

    pub fn table(&self) -> &FrameTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut FrameTable {
        &mut self.table
    }
}
