//! 协作式取消
//!
//! `CancellationSource` 持有控制端，`CancellationToken` 可克隆并在任务间传递。
//! 取消后所有 `cancelled()` 等待者都会被唤醒。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct CancellationInner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// 取消控制端
///
/// 丢弃控制端不会触发取消
#[derive(Debug, Default)]
pub struct CancellationSource {
    inner: Arc<CancellationInner>,
}

impl CancellationSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取观察本控制端的令牌
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            inner: Arc::clone(&self.inner),
        }
    }

    /// 发出取消信号
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }
}

/// 取消令牌
///
/// `CancellationToken::default()` 永远不会被取消
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<CancellationInner>,
}

impl CancellationToken {
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// 等待取消信号
    pub async fn cancelled(&self) {
        loop {
            // 先注册再检查，避免错过 notify_waiters
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
