//! User-visible notices.
//!
//! Non-blocking warnings the user should see (a document skipped because it
//! changed under us, a front-matter block that could not be rewritten).
//! Diagnostics for developers go through `log_status!` instead.

use std::cell::RefCell;

pub trait Notifier {
    fn notice(&self, message: &str);
}

/// Collects notices so they can be reported alongside a result.
#[derive(Debug, Default)]
pub struct NoticeLog {
    messages: RefCell<Vec<String>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages.into_inner()
    }
}

impl Notifier for NoticeLog {
    fn notice(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_log_keeps_order() {
        let log = NoticeLog::new();
        log.notice("first");
        log.notice("second");
        assert_eq!(log.messages(), vec!["first", "second"]);
        assert_eq!(log.into_messages().len(), 2);
    }
}
