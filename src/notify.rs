// notify.rs

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// One transient toast-style message shown in the footer.
#[derive(Clone, Debug)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub body: String,
}

/// Collected notices for the current run; the TUI renders the most recent one
/// and keeps a short history for the log.
#[derive(Debug, Default)]
pub struct Notices {
    entries: Vec<Notice>,
}

const KEEP: usize = 50;

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, kind: NoticeKind, title: impl Into<String>, body: impl Into<String>) {
        let notice = Notice {
            kind,
            title: title.into(),
            body: body.into(),
        };
        match notice.kind {
            NoticeKind::Success => tracing::info!(title = %notice.title, "{}", notice.body),
            NoticeKind::Error => tracing::warn!(title = %notice.title, "{}", notice.body),
        }
        self.entries.push(notice);
        if self.entries.len() > KEEP {
            self.entries.remove(0);
        }
    }

    pub fn success(&mut self, body: impl Into<String>) {
        self.notify(NoticeKind::Success, "Success", body);
    }

    pub fn error(&mut self, body: impl Into<String>) {
        self.notify(NoticeKind::Error, "Error", body);
    }

    pub fn last(&self) -> Option<&Notice> {
        self.entries.last()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
