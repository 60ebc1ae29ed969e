//! Messages written to a real mailbox, listed back in arrival order, and
//! fed through the debounce buffer: a flush contains exactly the messages
//! added to its key since the previous flush, in arrival order
//! (spec.md §8 invariant 7).

use crate::prelude::*;
use weft_mailbox::{DebounceBuffer, MailboxStore, Message, MessageContent, MessageId, MessageType, SessionRef};

fn message(id: &str, seconds_offset: i64, text: &str) -> Message {
    Message {
        id: MessageId::from_string(id),
        provider: "dingtalk".to_string(),
        timestamp: chrono::Utc::now() + chrono::Duration::seconds(seconds_offset),
        message_type: MessageType::Text,
        content: MessageContent { text: Some(text.to_string()), markdown: None },
        session: Some(SessionRef { id: "thread-7".to_string(), session_type: "group".to_string(), thread_key: None }),
        participants: Vec::new(),
        correlation_id: None,
        reply_to: None,
        thread_root: None,
        artifacts: Vec::new(),
        mentions: Vec::new(),
        body: text.to_string(),
    }
}

#[tokio::test]
async fn a_flush_contains_exactly_the_messages_added_since_the_last_one_in_order() {
    let dir = tempdir().expect("tempdir");
    let store = MailboxStore::new(dir.path());

    let first = message("msg-1", 0, "first");
    let second = message("msg-2", 1, "second");
    let third = message("msg-3", 2, "third");
    store.create_inbound_atomic(&first).expect("write first");
    store.create_inbound_atomic(&second).expect("write second");
    store.create_inbound_atomic(&third).expect("write third");

    let located = store.list_inbound(None).expect("list inbound");
    assert_eq!(located.len(), 3);

    let flushes: Arc<Mutex<Vec<(String, Vec<String>)>>> = Arc::new(Mutex::new(Vec::new()));
    let flushes_cb = flushes.clone();
    let buffer = DebounceBuffer::new(Duration::from_millis(40), Duration::from_secs(5), move |key, messages| {
        let flushes_cb = flushes_cb.clone();
        async move {
            let ids: Vec<String> = messages.iter().map(|m| m.id.to_string()).collect();
            flushes_cb.lock().await.push((key, ids));
        }
    });

    for entry in &located {
        buffer.add(weft_mailbox::default_key(&entry.message), entry.message.clone());
    }

    buffer.notified().await;
    let recorded = flushes.lock().await.clone();
    assert_eq!(recorded.len(), 1, "all three arrived under one key before the idle window elapsed");
    let (key, ids) = &recorded[0];
    assert_eq!(key, "thread-7:_");
    assert_eq!(ids, &vec!["msg-1".to_string(), "msg-2".to_string(), "msg-3".to_string()]);

    // A second burst under the same key after the first flush is a
    // disjoint batch: it must not replay the first batch's messages.
    let fourth = message("msg-4", 3, "fourth");
    buffer.add(weft_mailbox::default_key(&fourth), fourth.clone());
    buffer.notified().await;

    let recorded = flushes.lock().await.clone();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[1].1, vec!["msg-4".to_string()]);
}
