//! User-facing notification channel / 用户通知通道

/// Info / warning / error sink implemented by the host UI / 通知接口
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Routes notifications into the tracing log / 通知写入日志
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, message: &str) {
        tracing::info!(target: "mapshelf::notify", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "mapshelf::notify", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "mapshelf::notify", "{}", message);
    }
}
