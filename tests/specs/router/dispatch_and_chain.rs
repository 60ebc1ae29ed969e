//! Router dispatch order and chained short-circuit, wired together the way
//! the running fabric does it: a chain registered as one action alongside
//! a plain action under the same event type (spec.md §8 invariants 5, 6).

use crate::prelude::*;
use weft_router::action::Action;
use weft_router::{ActionChain, ActionResult, ActionRouter};

struct RecordingStep {
    name: &'static str,
    fails: bool,
    order: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait::async_trait]
impl Action for RecordingStep {
    fn name(&self) -> &str {
        self.name
    }

    async fn execute(&self, _event: &Event) -> weft_core::error::Result<ActionResult> {
        self.order.lock().await.push(self.name);
        if self.fails {
            Err(weft_core::error::Error::transient(format!("{} failed", self.name)))
        } else {
            Ok(ActionResult::success_result(serde_json::json!({ "step": self.name })))
        }
    }
}

#[tokio::test]
async fn higher_priority_chain_short_circuits_before_the_lower_priority_action_runs() {
    let bus = EventBus::new();
    let router = Arc::new(ActionRouter::new(bus.clone()));
    let order = Arc::new(Mutex::new(Vec::<&'static str>::new()));

    let chain = Arc::new(ActionChain::new(
        "remediation",
        vec![
            Arc::new(RecordingStep { name: "compute", fails: false, order: order.clone() }) as Arc<dyn Action>,
            Arc::new(RecordingStep { name: "apply", fails: true, order: order.clone() }) as Arc<dyn Action>,
            Arc::new(RecordingStep { name: "verify", fails: false, order: order.clone() }) as Arc<dyn Action>,
        ],
    ));
    let log_action = Arc::new(RecordingStep { name: "log", fails: false, order: order.clone() });

    router.register(vec![EventType::SessionFailed], chain, None, 10).await;
    router.register(vec![EventType::SessionFailed], log_action, None, 1).await;
    router.start().await;

    let event = Event::new(EventType::SessionFailed, std::collections::HashMap::new());
    bus.publish(event).await;

    let seen = order.lock().await.clone();
    assert_eq!(seen, vec!["compute", "apply", "log"], "verify never runs; log waits for the chain to finish");
    assert_eq!(router.history_len().await, 2, "one recorded result per registered rule, not per chain member");
    assert_eq!(router.dispatch_count().await, 2);
}

#[tokio::test]
async fn a_failing_chain_member_skips_every_member_after_it() {
    let order = Arc::new(Mutex::new(Vec::<&'static str>::new()));
    let chain = ActionChain::new(
        "remediation",
        vec![
            Arc::new(RecordingStep { name: "compute", fails: false, order: order.clone() }) as Arc<dyn Action>,
            Arc::new(RecordingStep { name: "apply", fails: true, order: order.clone() }) as Arc<dyn Action>,
            Arc::new(RecordingStep { name: "verify", fails: false, order: order.clone() }) as Arc<dyn Action>,
        ],
    );

    let event = Event::new(EventType::SessionFailed, std::collections::HashMap::new());
    let results = chain.run(&event).await;

    assert_eq!(results.len(), 3);
    assert!(results[0].success, "compute succeeded");
    assert!(!results[1].success, "apply failed");
    assert_eq!(results[2].status, weft_router::action::ActionStatus::Skipped);
    assert_eq!(results[2].error.as_deref(), Some("Previous action failed"));
    assert_eq!(*order.lock().await, vec!["compute", "apply"], "verify's body never executes");
}
