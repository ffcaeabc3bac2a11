use parking_lot::Mutex;
use std::{
    io::Write,
    sync::atomic::{AtomicUsize, Ordering},
};

pub const DEFAULT_BAR_LEN: usize = 50;
pub const DEFAULT_TITLE: &str = "Checking Domains";

const DONE_GLYPH: char = '█';
const TODO_GLYPH: char = '░';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub text: String,
    pub is_final: bool,
}

/// Renders one progress line. Intermediate frames end in `\r` so the next
/// one overwrites them; the frame for `completed == total` ends the line.
pub fn render_frame(completed: usize, total: usize, bar_len: usize, title: &str) -> Frame {
    let percent = if total == 0 {
        100.0
    } else {
        (completed as f64 / total as f64 * 1000.0).round() / 10.0
    };

    let done = if bar_len == 0 {
        0
    } else {
        ((percent / (100.0 / bar_len as f64)).round() as usize).min(bar_len)
    };
    let togo = bar_len - done;

    let is_final = completed >= total;
    let terminator = if is_final { "\n\n" } else { "\r" };

    let text = format!(
        "{}: [{}{}] {:.1}%{}",
        title,
        DONE_GLYPH.to_string().repeat(done),
        TODO_GLYPH.to_string().repeat(togo),
        percent,
        terminator
    );

    Frame { text, is_final }
}

/// Completion counter shared by all probe workers. Each completion
/// increments and redraws under one lock, so frames reach the sink in
/// counter order.
pub struct ProgressReporter {
    total: usize,
    completed: AtomicUsize,
    bar_len: usize,
    title: String,
    sink: Option<Mutex<Box<dyn Write + Send>>>,
}

impl ProgressReporter {
    pub fn new(total: usize, sink: Box<dyn Write + Send>) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            bar_len: DEFAULT_BAR_LEN,
            title: DEFAULT_TITLE.to_string(),
            sink: Some(Mutex::new(sink)),
        }
    }

    /// Counts completions without drawing anything.
    pub fn hidden(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            bar_len: DEFAULT_BAR_LEN,
            title: DEFAULT_TITLE.to_string(),
            sink: None,
        }
    }

    pub fn with_bar_len(mut self, bar_len: usize) -> Self {
        self.bar_len = bar_len;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn is_done(&self) -> bool {
        self.completed() >= self.total
    }

    pub fn on_probe_complete(&self) {
        let Some(sink) = &self.sink else {
            self.completed.fetch_add(1, Ordering::SeqCst);
            return;
        };

        let mut out = sink.lock();
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if completed > self.total {
            tracing::warn!(completed, total = self.total, "more completions than probes");
            return;
        }

        let frame = render_frame(completed, self.total, self.bar_len, &self.title);
        if let Err(e) = out
            .write_all(frame.text.as_bytes())
            .and_then(|_| out.flush())
        {
            tracing::debug!(error = %e, "failed to draw progress");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    #[test]
    fn test_frame_midway() {
        let frame = render_frame(1, 2, 10, "Checking Domains");
        assert_eq!(frame.text, "Checking Domains: [█████░░░░░] 50.0%\r");
        assert!(!frame.is_final);
    }

    #[test]
    fn test_frame_rounds_to_one_decimal() {
        let frame = render_frame(1, 3, 50, "T");
        assert!(frame.text.ends_with("] 33.3%\r"));
        let done = frame.text.chars().filter(|c| *c == '█').count();
        let togo = frame.text.chars().filter(|c| *c == '░').count();
        assert_eq!(done, 17);
        assert_eq!(done + togo, 50);
    }

    #[test]
    fn test_frame_final() {
        let frame = render_frame(7, 7, 4, "T");
        assert_eq!(frame.text, "T: [████] 100.0%\n\n");
        assert!(frame.is_final);
    }

    #[test]
    fn test_nearly_done_is_not_final() {
        let frame = render_frame(9999, 10000, 50, "T");
        assert!(!frame.is_final);
        assert!(frame.text.ends_with('\r'));
    }

    #[test]
    fn test_hidden_reporter_counts() {
        let progress = ProgressReporter::hidden(3);
        progress.on_probe_complete();
        progress.on_probe_complete();
        assert_eq!(progress.completed(), 2);
        assert!(!progress.is_done());
        progress.on_probe_complete();
        assert!(progress.is_done());
    }

    #[test]
    fn test_final_frame_emitted_once_under_contention() {
        let buf = SharedBuf::default();
        let progress = Arc::new(ProgressReporter::new(400, Box::new(buf.clone())));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let progress = Arc::clone(&progress);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        progress.on_probe_complete();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let out = buf.contents();
        assert_eq!(progress.completed(), 400);
        assert_eq!(out.matches("\n\n").count(), 1);
        assert!(out.ends_with("100.0%\n\n"));
        assert_eq!(out.matches('\r').count(), 399);
    }
}
