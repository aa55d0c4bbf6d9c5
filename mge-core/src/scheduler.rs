use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::config::SchedulerConfig;

/// 回调唯一标识。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallbackId(Uuid);

impl CallbackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 生成适合日志输出的短字符串（前 8 个十六进制字符）。
    pub fn short(self) -> String {
        let s = self.0.simple().to_string();
        s.chars().take(8).collect()
    }
}

impl Default for CallbackId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CallbackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 回调的重复预算。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// 无限重复，永远不会自动移除。
    Forever,
    /// 触发指定次数后由调度器移除并销毁。
    Times(u32),
}

/// 回调的只读快照，由 [`Scheduler::get_all_callbacks`] 返回。
#[derive(Clone, Copy, Debug)]
pub struct CallbackInfo {
    pub id: CallbackId,
    pub frequency: Duration,
    pub repeat: Repeat,
    pub fired: u32,
}

type CallbackFn = Box<dyn FnMut() + Send>;

/// 工作线程独占持有的回调记录。
struct CallbackRecord {
    id: CallbackId,
    f: CallbackFn,
    frequency: Duration,
    repeat: Repeat,
    fired: u32,
    last_fired: Instant,
}

impl CallbackRecord {
    fn info(&self) -> CallbackInfo {
        CallbackInfo {
            id: self.id,
            frequency: self.frequency,
            repeat: self.repeat,
            fired: self.fired,
        }
    }

    fn exhausted(&self) -> bool {
        match self.repeat {
            Repeat::Forever => false,
            Repeat::Times(limit) => self.fired >= limit,
        }
    }
}

enum Command {
    Register(CallbackRecord),
    Remove(CallbackId),
    Tick { done: Sender<()> },
    Pause,
    Resume,
    Reset,
    ResetCallbacks,
    Clear,
    SetCheckTime(Duration),
    Snapshot { reply: Sender<Vec<CallbackInfo>> },
    Shutdown,
}

/// 后台周期回调调度器。
///
/// 构造时启动一个专属后台线程；回调记录由该线程独占持有，所有外部操作
/// 都通过命令通道按 FIFO 顺序送达，不存在跨线程共享的回调列表。
///
/// - 回调在后台线程上执行，应当保持短小，避免拖慢检查节奏。
/// - 回调体内**不得**调用同一个调度器上需要等待应答的操作
///   （[`tick`](Self::tick)、[`get_all_callbacks`](Self::get_all_callbacks)），
///   否则会死锁。
/// - `Drop` 会通知线程退出并阻塞等待其结束；回调记录在线程内部销毁，
///   join 返回后不可能再有任何回调执行。
///
/// # 示例
///
/// ```no_run
/// use std::time::Duration;
/// use mge_core::scheduler::{Repeat, Scheduler};
///
/// let mut scheduler = Scheduler::new();
/// scheduler.make_callback(
///     || println!("再见"),
///     Duration::from_millis(500),
///     Repeat::Times(3),
/// );
/// std::thread::sleep(Duration::from_secs(2));
/// // drop 时后台线程被 join，所有回调记录销毁。
/// ```
pub struct Scheduler {
    tx: Sender<Command>,
    worker: Option<JoinHandle<()>>,
    birth: Instant,
    check_time: Duration,
    paused: bool,
}

impl Scheduler {
    /// 用默认检查间隔（见 [`SchedulerConfig`]）创建调度器并启动后台线程。
    pub fn new() -> Self {
        Self::with_check_time(SchedulerConfig::default().check_time)
    }

    /// 用指定的最小检查间隔创建调度器。
    pub fn with_check_time(check_time: Duration) -> Self {
        let (tx, rx) = unbounded();
        let now = Instant::now();
        let worker = Worker {
            callbacks: Vec::new(),
            last_tick: now,
            check_time,
            paused: false,
        };
        let handle = thread::Builder::new()
            .name("mge-scheduler".into())
            .spawn(move || run_worker(rx, worker))
            .expect("failed to spawn scheduler thread");

        Self {
            tx,
            worker: Some(handle),
            birth: now,
            check_time,
            paused: false,
        }
    }

    /// 注册一个回调并返回其句柄。
    ///
    /// `frequency` 是两次触发之间的最小间隔；回调需要的上下文通过闭包
    /// 捕获传入。
    pub fn make_callback<F>(&mut self, f: F, frequency: Duration, repeat: Repeat) -> CallbackId
    where
        F: FnMut() + Send + 'static,
    {
        let id = CallbackId::new();
        let record = CallbackRecord {
            id,
            f: Box::new(f),
            frequency,
            repeat,
            fired: 0,
            last_fired: Instant::now(),
        };
        debug!(target: "mge-core", callback = %id.short(), ?frequency, ?repeat, "register callback");
        self.send(Command::Register(record));
        id
    }

    /// 注销并销毁一个回调；句柄已失效时是 no-op。
    pub fn remove_callback(&mut self, id: CallbackId) {
        self.send(Command::Remove(id));
    }

    /// 同步执行一个检查单元：命令送达工作线程执行，等待其完成后返回。
    ///
    /// 与后台自动检查遵循相同的门槛（未暂停、距上次检查至少过了
    /// `check_time`）。
    pub fn tick(&mut self) {
        let (done, ack) = bounded(1);
        if self.tx.send(Command::Tick { done }).is_ok() {
            let _ = ack.recv();
        }
    }

    /// 暂停触发，并把每个回调的“上次触发”时钟重置到当前时刻，
    /// 这样恢复后不会出现补偿式的连续触发。
    pub fn pause(&mut self) {
        self.paused = true;
        self.send(Command::Pause);
    }

    /// 恢复触发。
    pub fn start(&mut self) {
        self.paused = false;
        self.send(Command::Resume);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// 从头开始：出生时钟归零，每个回调的触发计数与时钟重置；
    /// 回调集合保持不变。
    pub fn reset(&mut self) {
        self.birth = Instant::now();
        self.send(Command::Reset);
    }

    /// 只重置回调的触发计数与时钟，不动调度器自己的出生时钟。
    pub fn reset_callbacks(&mut self) {
        self.send(Command::ResetCallbacks);
    }

    /// 丢弃并销毁所有回调，出生时钟归零；调度器本身保持可用（空集合）。
    pub fn stop(&mut self) {
        self.birth = Instant::now();
        self.send(Command::Clear);
    }

    /// 所有回调的只读快照（注册顺序）。
    pub fn get_all_callbacks(&self) -> Vec<CallbackInfo> {
        let (reply, rx) = bounded(1);
        if self.tx.send(Command::Snapshot { reply }).is_ok() {
            rx.recv().unwrap_or_default()
        } else {
            Vec::new()
        }
    }

    pub fn check_time(&self) -> Duration {
        self.check_time
    }

    pub fn set_check_time(&mut self, check_time: Duration) {
        self.check_time = check_time;
        self.send(Command::SetCheckTime(check_time));
    }

    /// 自（上一次归零以来的）出生时刻经过的时间。
    pub fn time_elapsed(&self) -> Duration {
        self.birth.elapsed()
    }

    fn send(&self, command: Command) {
        // 发送失败只可能发生在工作线程已经退出之后（例如 panic）。
        if self.tx.send(command).is_err() {
            debug!(target: "mge-core", "scheduler worker already gone, command dropped");
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        // 退出次序：通知 → join → 记录随线程栈销毁。join 返回后不再有
        // 任何回调执行。
        let _ = self.tx.send(Command::Shutdown);
        if let Some(handle) = self.worker.take()
            && handle.join().is_err()
        {
            warn!(target: "mge-core", "调度器线程在退出时 panic");
        }
    }
}

/// 工作线程的全部状态。只有 [`run_worker`] 循环会触碰它。
struct Worker {
    callbacks: Vec<CallbackRecord>,
    last_tick: Instant,
    check_time: Duration,
    paused: bool,
}

impl Worker {
    /// 检查单元：到期回调按注册顺序触发，之后移除预算耗尽的回调。
    fn tick(&mut self, now: Instant) {
        if self.paused {
            return;
        }
        if now.duration_since(self.last_tick) < self.check_time {
            return;
        }
        self.last_tick = now;

        for record in &mut self.callbacks {
            if now.duration_since(record.last_fired) >= record.frequency {
                record.last_fired = now;
                (record.f)();
                record.fired += 1;
                trace!(
                    target: "mge-core",
                    callback = %record.id.short(),
                    fired = record.fired,
                    "callback fired"
                );
            }
        }

        self.callbacks.retain(|record| {
            if record.exhausted() {
                debug!(
                    target: "mge-core",
                    callback = %record.id.short(),
                    "callback budget exhausted, removed"
                );
                false
            } else {
                true
            }
        });
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Register(record) => self.callbacks.push(record),
            Command::Remove(id) => {
                if let Some(index) = self.callbacks.iter().position(|r| r.id == id) {
                    self.callbacks.remove(index);
                    debug!(target: "mge-core", callback = %id.short(), "callback removed");
                }
            }
            Command::Tick { done } => {
                self.tick(Instant::now());
                let _ = done.send(());
            }
            Command::Pause => {
                self.paused = true;
                let now = Instant::now();
                for record in &mut self.callbacks {
                    record.last_fired = now;
                }
            }
            Command::Resume => self.paused = false,
            Command::Reset => {
                let now = Instant::now();
                self.last_tick = now;
                for record in &mut self.callbacks {
                    record.fired = 0;
                    record.last_fired = now;
                }
            }
            Command::ResetCallbacks => {
                let now = Instant::now();
                for record in &mut self.callbacks {
                    record.fired = 0;
                    record.last_fired = now;
                }
            }
            Command::Clear => {
                self.callbacks.clear();
                self.last_tick = Instant::now();
            }
            Command::SetCheckTime(check_time) => self.check_time = check_time,
            Command::Snapshot { reply } => {
                let _ = reply.send(self.callbacks.iter().map(CallbackRecord::info).collect());
            }
            // run_worker 在进入 apply 之前就处理 Shutdown。
            Command::Shutdown => {}
        }
    }
}

fn run_worker(rx: Receiver<Command>, mut worker: Worker) {
    loop {
        // 命令按 FIFO 应用；超时即运行一个检查单元。
        match rx.recv_timeout(worker.check_time.max(Duration::from_micros(100))) {
            Ok(Command::Shutdown) => break,
            Ok(command) => worker.apply(command),
            Err(RecvTimeoutError::Timeout) => worker.tick(Instant::now()),
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    trace!(target: "mge-core", "scheduler worker exits");
}
