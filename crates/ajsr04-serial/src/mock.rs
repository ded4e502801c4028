//! 脚本化内存链路
//!
//! `MockSerialLink` 的行为类似线缆另一端的传感器：每次写入（触发）
//! 弹出下一个预设的 [`MockReply`]，并使其字节可读。
//! 配对的 [`MockHandle`] 留在测试侧，在链路移交给会话
//! 或轮询线程之后，仍可预设应答并检查驱动的行为。
//!
//! ```
//! use ajsr04_serial::{MockReply, MockSerialLink, SerialLink};
//!
//! let (mut link, handle) = MockSerialLink::new();
//! handle.push_reply(MockReply::Bytes(vec![0x55, 0x00, 0xC8, 30]));
//!
//! link.write(&[0x55]).unwrap();
//! assert_eq!(link.bytes_available().unwrap(), 4);
//! assert_eq!(handle.written(), vec![0x55]);
//! ```

use crate::{SerialDeviceError, SerialDeviceErrorKind, SerialError, SerialLink};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

/// 模拟传感器对一次触发的响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// 使这些字节可读
    Bytes(Vec<u8>),
    /// 不应答
    Silent,
    /// 触发写入以超时失败
    WriteTimeout,
    /// 触发写入失败，如同设备被拔出
    Disconnected,
}

#[derive(Debug)]
struct MockState {
    open: bool,
    close_count: usize,
    replies: VecDeque<MockReply>,
    repeat: Option<MockReply>,
    rx: VecDeque<u8>,
    written: Vec<u8>,
    trigger_times: Vec<Instant>,
}

/// [`MockSerialLink`] 的测试侧视图
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockHandle {
    /// 为下一次触发排队一个应答。
    pub fn push_reply(&self, reply: MockReply) {
        self.state.lock().replies.push_back(reply);
    }

    /// 队列为空时使用的应答。未设置时，空队列等同于
    /// `MockReply::Silent`。
    pub fn set_repeat(&self, reply: Option<MockReply>) {
        self.state.lock().repeat = reply;
    }

    /// 不经触发直接向接收线放入字节。
    pub fn inject_rx(&self, bytes: &[u8]) {
        self.state.lock().rx.extend(bytes.iter().copied());
    }

    pub fn clear_rx(&self) {
        self.state.lock().rx.clear();
    }

    /// Bytes waiting to be read.
    pub fn rx_len(&self) -> usize {
        self.state.lock().rx.len()
    }

    /// Every byte written so far, in order.
    pub fn written(&self) -> Vec<u8> {
        self.state.lock().written.clone()
    }

    /// Number of write calls seen.
    pub fn trigger_count(&self) -> usize {
        self.state.lock().trigger_times.len()
    }

    /// Instant of every write call, in order.
    pub fn trigger_times(&self) -> Vec<Instant> {
        self.state.lock().trigger_times.clone()
    }

    /// Number of times the link transitioned from open to closed.
    pub fn close_count(&self) -> usize {
        self.state.lock().close_count
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    pub fn pending_replies(&self) -> usize {
        self.state.lock().replies.len()
    }
}

/// mock 对的链路一侧
#[derive(Debug)]
pub struct MockSerialLink {
    state: Arc<Mutex<MockState>>,
}

impl MockSerialLink {
    /// 创建已打开的链路及其控制句柄。
    pub fn new() -> (Self, MockHandle) {
        let state = Arc::new(Mutex::new(MockState {
            open: true,
            close_count: 0,
            replies: VecDeque::new(),
            repeat: None,
            rx: VecDeque::new(),
            written: Vec::new(),
            trigger_times: Vec::new(),
        }));
        (
            Self {
                state: state.clone(),
            },
            MockHandle { state },
        )
    }

    /// 对每次触发都给出相同应答的链路。
    pub fn repeating(reply: MockReply) -> (Self, MockHandle) {
        let (link, handle) = Self::new();
        handle.set_repeat(Some(reply));
        (link, handle)
    }
}

impl SerialLink for MockSerialLink {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, SerialError> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(SerialError::Closed);
        }

        state.trigger_times.push(Instant::now());

        let reply = state
            .replies
            .pop_front()
            .or_else(|| state.repeat.clone())
            .unwrap_or(MockReply::Silent);

        match reply {
            MockReply::Bytes(data) => state.rx.extend(data),
            MockReply::Silent => {},
            MockReply::WriteTimeout => return Err(SerialError::Timeout),
            MockReply::Disconnected => {
                return Err(SerialDeviceError::new(
                    SerialDeviceErrorKind::NotFound,
                    "mock device disconnected",
                )
                .into());
            },
        }

        state.written.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn bytes_available(&mut self) -> Result<usize, SerialError> {
        let state = self.state.lock();
        if !state.open {
            return Err(SerialError::Closed);
        }
        Ok(state.rx.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        let mut state = self.state.lock();
        if !state.open {
            return Err(SerialError::Closed);
        }
        if state.rx.is_empty() && !buf.is_empty() {
            return Err(SerialError::Timeout);
        }

        let n = buf.len().min(state.rx.len());
        for (slot, byte) in buf.iter_mut().zip(state.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn close(&mut self) {
        let mut state = self.state.lock();
        if state.open {
            state.open = false;
            state.close_count += 1;
        }
    }

    fn is_open(&self) -> bool {
        self.state.lock().open
    }
}
