//! Fade primitives.
//!
//! A fade-out ends with its targets hidden, a fade-in with them shown. The
//! future resolves when the animation has finished.

use std::rc::Rc;
use std::time::Duration;

use super::LocalFuture;
use crate::dom::NodeId;
use crate::window::Window;

pub trait Animator {
    fn fade_out(&self, window: Rc<Window>, targets: Vec<NodeId>) -> LocalFuture<'static, ()>;
    fn fade_in(&self, window: Rc<Window>, targets: Vec<NodeId>) -> LocalFuture<'static, ()>;
}

fn set_shown(window: &Window, targets: &[NodeId], shown: bool) {
    let mut doc = window.document_mut();
    for target in targets {
        if shown {
            doc.show(*target);
        } else {
            doc.hide(*target);
        }
    }
}

/// Completes immediately.
pub struct InstantAnimator;

impl Animator for InstantAnimator {
    fn fade_out(&self, window: Rc<Window>, targets: Vec<NodeId>) -> LocalFuture<'static, ()> {
        Box::pin(async move { set_shown(&window, &targets, false) })
    }

    fn fade_in(&self, window: Rc<Window>, targets: Vec<NodeId>) -> LocalFuture<'static, ()> {
        Box::pin(async move { set_shown(&window, &targets, true) })
    }
}

/// Takes `duration` per fade.
pub struct TimedAnimator {
    pub duration: Duration,
}

impl Animator for TimedAnimator {
    fn fade_out(&self, window: Rc<Window>, targets: Vec<NodeId>) -> LocalFuture<'static, ()> {
        let duration = self.duration;
        Box::pin(async move {
            tokio::time::sleep(duration).await;
            set_shown(&window, &targets, false);
        })
    }

    fn fade_in(&self, window: Rc<Window>, targets: Vec<NodeId>) -> LocalFuture<'static, ()> {
        let duration = self.duration;
        Box::pin(async move {
            set_shown(&window, &targets, true);
            tokio::time::sleep(duration).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Selector;

    #[tokio::test(start_paused = true)]
    async fn test_timed_fade_out_hides_at_end() {
        let window = Window::load("<div class=\"a\">x</div>", "https://x.test/").unwrap();
        let div = window.document().query_selector(&Selector::parse(".a").unwrap()).unwrap();
        let animator = TimedAnimator {
            duration: Duration::from_millis(200),
        };

        let start = tokio::time::Instant::now();
        animator.fade_out(window.clone(), vec![div]).await;
        assert!(start.elapsed() >= Duration::from_millis(200));
        assert!(window.document().is_hidden(div));

        InstantAnimator.fade_in(window.clone(), vec![div]).await;
        assert!(!window.document().is_hidden(div));
    }
}
