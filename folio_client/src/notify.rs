#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Shows feedback to the user.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, notification: Notification);
}

/// Prints successes to stdout and errors to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => println!("{}", notification.message),
            NotificationKind::Error => eprintln!("{}", notification.message),
        }
    }
}

#[cfg(test)]
impl MockNotifier {
    pub fn with_notify(mut self, notification: Notification) -> Self {
        self.expect_notify()
            .once()
            .with(mockall::predicate::eq(notification))
            .return_const(());
        self
    }
}
